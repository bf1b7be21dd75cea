// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! The framing of messages exchanged through a schema registry.

use crate::{AvroResult, bytes::ByteReader, error::Details};

/// The byte every framed message starts with.
pub const MAGIC_BYTE: u8 = 0x00;

const HEADER_LEN: usize = 5;

/// A payload tagged with the registry id of the schema it was written with.
///
/// On the wire this is the [`MAGIC_BYTE`], the id as a big-endian `u32` and then the payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WireEnvelope {
    pub schema_id: u32,
    pub payload: Vec<u8>,
}

impl WireEnvelope {
    pub fn new(schema_id: u32, payload: Vec<u8>) -> Self {
        Self { schema_id, payload }
    }

    pub fn to_binary(&self) -> Vec<u8> {
        let mut binary = Vec::with_capacity(HEADER_LEN + self.payload.len());
        binary.push(MAGIC_BYTE);
        binary.extend_from_slice(&self.schema_id.to_be_bytes());
        binary.extend_from_slice(&self.payload);
        binary
    }

    /// # Errors
    /// Will return a [`Details::WireEnvelopeTooShort`] if `binary` can't hold the header and a
    /// [`Details::MagicByteNotFound`] if it doesn't start with the [`MAGIC_BYTE`].
    pub fn from_binary(binary: &[u8]) -> AvroResult<Self> {
        if binary.len() < HEADER_LEN {
            return Err(Details::WireEnvelopeTooShort(binary.len()).into());
        }
        let mut reader = ByteReader::new(binary);
        let magic = reader.read_byte()?;
        if magic != MAGIC_BYTE {
            return Err(Details::MagicByteNotFound(magic).into());
        }
        let schema_id = u32::from_be_bytes(reader.read_array()?);
        let payload = reader.read(reader.remaining())?.to_vec();
        Ok(Self { schema_id, payload })
    }
}
