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

//! The byte source used while decoding.

use crate::{AvroResult, Error};

/// A forward-only reader over an in-memory buffer.
///
/// Every read either returns exactly the requested number of bytes or fails with
/// [`Details::ShortRead`](crate::error::Details::ShortRead) without consuming anything.
#[derive(Clone, Debug)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Reads the next `n` bytes.
    pub fn read(&mut self, n: usize) -> AvroResult<&'a [u8]> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(Error::ShortRead(n, remaining));
        }
        let start = self.position;
        self.position += n;
        Ok(&self.data[start..self.position])
    }

    pub fn read_byte(&mut self) -> AvroResult<u8> {
        self.read(1).map(|bytes| bytes[0])
    }

    /// Reads exactly `N` bytes into an array.
    pub fn read_array<const N: usize>(&mut self) -> AvroResult<[u8; N]> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.read(N)?);
        Ok(buf)
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }
}
