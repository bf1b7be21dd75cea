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

use crate::{
    AvroResult,
    error::Details,
    protocol::{Protocol, normalize, parser},
    schema::Context,
};
use digest::Digest;
use md5::Md5;

/// Reads and writes protocols as JSON text.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProtocolSerializer;

impl ProtocolSerializer {
    pub fn new() -> Self {
        Self
    }

    pub fn serialize(&self, protocol: &Protocol) -> AvroResult<String> {
        serde_json::to_string(&normalize(protocol))
            .map_err(|e| Details::SerializeSchemaJson(e).into())
    }

    /// Parses JSON text as a protocol, with the MD5 digest of the text as its hash.
    pub fn deserialize(&self, json: &str) -> AvroResult<Protocol> {
        let value = serde_json::from_str(json).map_err(Details::ParseSchemaJson)?;
        let protocol = parser::parse(&value, &mut Context::new())?;
        Ok(protocol.with_hash(Md5::digest(json.as_bytes()).to_vec()))
    }
}
