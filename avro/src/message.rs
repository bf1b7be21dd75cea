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

//! Whole messages in the Avro binary encoding.

use crate::{
    AvroResult,
    bytes::ByteReader,
    decode::decode_internal,
    encode::{EncodeConfig, encode_internal},
    error::Details,
    schema::{NamesRef, ResolvedSchema, Schema},
    types::Value,
};
use std::collections::HashMap;

/// Encodes and decodes single values.
///
/// Unlike [`decode`](crate::decode::decode), failures to decode the bytes are reported as
/// [`Details::InvalidMessage`], with the underlying error as its source.
#[derive(Clone, Debug, Default)]
pub struct MessageSerializer {
    config: EncodeConfig,
}

impl MessageSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EncodeConfig) -> Self {
        Self { config }
    }

    pub fn serialize(&self, schema: &Schema, value: &Value) -> AvroResult<Vec<u8>> {
        self.serialize_with_names(schema, &HashMap::new(), value)
    }

    /// Like [`serialize`](Self::serialize), resolving references in `schema` against `names`
    /// too.
    pub fn serialize_with_names(
        &self,
        schema: &Schema,
        names: &NamesRef<'_>,
        value: &Value,
    ) -> AvroResult<Vec<u8>> {
        let rs = ResolvedSchema::new_with_known_schemata(vec![schema], names)?;
        let mut buffer = Vec::new();
        encode_internal(value, schema, rs.get_names(), &self.config, &mut buffer)?;
        Ok(buffer)
    }

    pub fn deserialize(&self, bytes: &[u8], schema: &Schema) -> AvroResult<Value> {
        self.deserialize_with_names(bytes, schema, &HashMap::new())
    }

    /// Like [`deserialize`](Self::deserialize), resolving references in `schema` against
    /// `names` too.
    pub fn deserialize_with_names(
        &self,
        bytes: &[u8],
        schema: &Schema,
        names: &NamesRef<'_>,
    ) -> AvroResult<Value> {
        let rs = ResolvedSchema::new_with_known_schemata(vec![schema], names)?;
        decode_internal(schema, rs.get_names(), &mut ByteReader::new(bytes))
            .map_err(|e| Details::InvalidMessage(e).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, TestResult, schema::Name};
    use hex_literal::hex;
    use pretty_assertions::assert_eq;

    #[test]
    fn message_round_trip() -> TestResult {
        let serializer = MessageSerializer::with_config(
            EncodeConfig::builder().max_block_size(1).build(),
        );
        let schema = Schema::array(Schema::int());
        let value = Value::Array(vec![Value::Int(1), Value::Int(2)]);
        let bytes = serializer.serialize(&schema, &value)?;
        assert_eq!(bytes, hex!("01 02 02 01 02 04 00"));
        assert_eq!(serializer.deserialize(&bytes, &schema)?, value);
        Ok(())
    }

    #[test]
    fn malformed_bytes_are_an_invalid_message() {
        match MessageSerializer::new()
            .deserialize(&hex!("02"), &Schema::string())
            .map_err(Error::into_details)
        {
            Err(Details::InvalidMessage(source)) => {
                assert!(source.is_short_read());
            }
            other => panic!("Expected Details::InvalidMessage, got {other:?}"),
        }
    }

    #[test]
    fn unresolvable_schema_is_not_a_message_error() -> TestResult {
        let schema = Schema::Ref {
            name: Name::new("Nowhere")?,
        };
        match MessageSerializer::new()
            .deserialize(&[], &schema)
            .map_err(Error::into_details)
        {
            Err(Details::SchemaResolutionError(name)) => assert_eq!(name.fullname(), "Nowhere"),
            other => panic!("Expected Details::SchemaResolutionError, got {other:?}"),
        }
        Ok(())
    }
}
