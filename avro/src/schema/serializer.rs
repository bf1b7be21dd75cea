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

use crate::AvroResult;
use crate::error::Details;
use crate::schema::{Context, Schema, normalize};

/// Reads and writes schemas as JSON text.
#[derive(Clone, Copy, Debug, Default)]
pub struct SchemaSerializer;

impl SchemaSerializer {
    pub fn new() -> Self {
        Self
    }

    /// Writes `schema` as JSON, in [Parsing Canonical Form] when `canonical` is set.
    ///
    /// [Parsing Canonical Form]:
    /// https://avro.apache.org/docs/++version++/specification/#parsing-canonical-form-for-schemas
    pub fn serialize(&self, schema: &Schema, canonical: bool) -> AvroResult<String> {
        let json = normalize(schema, canonical, None);
        Ok(serde_json::to_string(&json).map_err(Details::SerializeSchemaJson)?)
    }

    /// Parses JSON text as a schema.
    pub fn deserialize(&self, json: &str) -> AvroResult<Schema> {
        self.deserialize_with_context(json, &mut Context::new())
    }

    /// Parses JSON text as a schema, resolving names with and adding names to `context`.
    pub fn deserialize_with_context(&self, json: &str, context: &mut Context) -> AvroResult<Schema> {
        let value = serde_json::from_str(json).map_err(Details::ParseSchemaJson)?;
        Schema::parse_with_context(&value, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, TestResult};
    use pretty_assertions::assert_eq;

    #[test]
    fn text_round_trip() -> TestResult {
        let serializer = SchemaSerializer::new();
        let text = r#"{"type":"enum","name":"Suit","namespace":"cards","symbols":["SPADES","HEARTS"],"doc":"suits"}"#;
        let schema = serializer.deserialize(text)?;
        assert_eq!(serializer.serialize(&schema, false)?, text);
        assert_eq!(
            serializer.serialize(&schema, true)?,
            r#"{"name":"cards.Suit","type":"enum","symbols":["SPADES","HEARTS"]}"#
        );
        Ok(())
    }

    #[test]
    fn malformed_json() {
        match SchemaSerializer::new()
            .deserialize("{\"type\":")
            .map_err(Error::into_details)
        {
            Err(Details::ParseSchemaJson(_)) => {}
            other => panic!("Expected Details::ParseSchemaJson, got {other:?}"),
        }
    }

    #[test]
    fn names_are_shared_through_the_context() -> TestResult {
        let serializer = SchemaSerializer::new();
        let mut context = Context::new();
        serializer.deserialize_with_context(
            r#"{"type":"fixed","name":"ns.Md5","size":16}"#,
            &mut context,
        )?;
        let schema = serializer
            .deserialize_with_context(r#"{"type":"array","items":"ns.Md5"}"#, &mut context)?;
        assert_eq!(
            serializer.serialize(&schema, false)?,
            r#"{"type":"array","items":"ns.Md5"}"#
        );
        Ok(())
    }
}
