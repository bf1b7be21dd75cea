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
    AvroResult, Error,
    envelope::WireEnvelope,
    error::Details,
    message::MessageSerializer,
    registry::{RegistryError, SchemaRegistryClient},
    schema::{Schema, SchemaSerializer},
    types::Value,
};
use log::debug;
use serde_json::Value as JsonValue;

const SCHEMA_PREVIEW_CHARS: usize = 50;

/// Options of a [`RegistrySerializer`].
#[derive(bon::Builder, Clone, Debug, Default)]
pub struct RegistrySerializerConfig {
    /// Register schemas the registry doesn't know yet instead of failing.
    #[builder(default)]
    pub auto_register: bool,
}

/// A decoded value together with the schema it was decoded with.
#[derive(Clone, Debug, PartialEq)]
pub struct TypedValue {
    pub value: Value,
    pub schema: Schema,
}

/// Encodes values into [`WireEnvelope`]s tagged with the registry id of their schema, and back.
pub struct RegistrySerializer<C> {
    client: C,
    config: RegistrySerializerConfig,
    schemas: SchemaSerializer,
    messages: MessageSerializer,
}

impl<C: SchemaRegistryClient> RegistrySerializer<C> {
    pub fn new(client: C, config: RegistrySerializerConfig) -> Self {
        Self::with_serializers(client, config, SchemaSerializer::new(), MessageSerializer::new())
    }

    /// Uses the given serializers for schemas and message payloads.
    pub fn with_serializers(
        client: C,
        config: RegistrySerializerConfig,
        schemas: SchemaSerializer,
        messages: MessageSerializer,
    ) -> Self {
        Self {
            client,
            config,
            schemas,
            messages,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Encodes `value` and frames it with the id `schema` has under `subject`.
    ///
    /// # Errors
    /// Will return a [`Details::UnknownSchema`] if the schema is not registered and
    /// [`RegistrySerializerConfig::auto_register`] is off.
    pub fn serialize(&self, subject: &str, schema: &Schema, value: &Value) -> AvroResult<Vec<u8>> {
        let json = self.schemas.serialize(schema, false)?;
        let id = match self.registered_id(subject, &json)? {
            Some(id) => id,
            None if self.config.auto_register => {
                debug!("Registering a new schema under subject {subject}");
                self.client.register_schema(subject, &json)?
            }
            None => {
                return Err(Details::UnknownSchema {
                    subject: subject.to_string(),
                    schema: preview(&json),
                }
                .into());
            }
        };
        let payload = self.messages.serialize(schema, value)?;
        Ok(WireEnvelope::new(id, payload).to_binary())
    }

    /// Decodes a framed value, with `reader` if given or else with the schema the registry
    /// has under the id of the frame.
    pub fn deserialize(&self, bytes: &[u8], reader: Option<&Schema>) -> AvroResult<TypedValue> {
        let envelope = WireEnvelope::from_binary(bytes)?;
        let schema = match reader {
            Some(schema) => schema.clone(),
            None => {
                debug!("Fetching the writer schema #{}", envelope.schema_id);
                let json = self.client.get_schema(envelope.schema_id)?;
                writer_schema(&json)?
            }
        };
        let value = self.messages.deserialize(&envelope.payload, &schema)?;
        Ok(TypedValue { value, schema })
    }

    fn registered_id(&self, subject: &str, json: &str) -> AvroResult<Option<u32>> {
        debug!("Looking up the schema id under subject {subject}");
        match self.client.get_registered_schema_id(subject, json) {
            Err(e) if is_not_found(&e) => Ok(None),
            other => other,
        }
    }
}

/// Parses a schema fetched from the registry. An error body handed back in its place is
/// reported as the [`RegistryError`] it describes.
fn writer_schema(json: &str) -> AvroResult<Schema> {
    let value: JsonValue = serde_json::from_str(json).map_err(Details::ParseSchemaJson)?;
    if RegistryError::is_error(&value) {
        return Err(RegistryError::from_response(&value)?.into());
    }
    Schema::parse(&value)
}

fn is_not_found(error: &Error) -> bool {
    matches!(error.details(), Details::Registry(e) if e.is_not_found())
}

fn preview(schema: &str) -> String {
    match schema.char_indices().nth(SCHEMA_PREVIEW_CHARS) {
        Some((end, _)) => format!("{}...", &schema[..end]),
        None => schema.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TestResult, registry::tests::InMemoryRegistry};
    use hex_literal::hex;
    use pretty_assertions::assert_eq;

    const RECORD: &str = r#"{
        "type": "record",
        "name": "Measurement",
        "namespace": "com.example.sensors",
        "fields": [{"name": "celsius", "type": "double"}, {"name": "station", "type": "string"}]
    }"#;

    fn measurement() -> Value {
        Value::Record(vec![
            ("celsius".into(), Value::Double(21.5)),
            ("station".into(), "north".into()),
        ])
    }

    #[test]
    fn auto_registration() -> TestResult {
        let schema = Schema::parse_str(RECORD)?;
        let serializer = RegistrySerializer::new(
            InMemoryRegistry::default(),
            RegistrySerializerConfig::builder().auto_register(true).build(),
        );
        let bytes = serializer.serialize("sensors", &schema, &measurement())?;
        assert_eq!(bytes[..5], hex!("00 00 00 00 01"));

        // the writer schema comes from the registry
        let typed = serializer.deserialize(&bytes, None)?;
        assert_eq!(typed.value, measurement());
        assert_eq!(typed.schema, schema);

        // a known schema is not registered again
        assert_eq!(serializer.serialize("sensors", &schema, &measurement())?, bytes);
        Ok(())
    }

    #[test]
    fn unknown_schema_without_auto_registration() -> TestResult {
        let schema = Schema::parse_str(RECORD)?;
        let serializer =
            RegistrySerializer::new(InMemoryRegistry::default(), RegistrySerializerConfig::default());
        match serializer
            .serialize("sensors", &schema, &measurement())
            .map_err(Error::into_details)
        {
            Err(Details::UnknownSchema { subject, schema }) => {
                assert_eq!(subject, "sensors");
                assert_eq!(
                    schema,
                    r#"{"type":"record","name":"Measurement","namespace":..."#
                );
            }
            other => panic!("Expected Details::UnknownSchema, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn reader_schema_skips_the_registry() -> TestResult {
        let serializer =
            RegistrySerializer::new(InMemoryRegistry::default(), RegistrySerializerConfig::default());
        let typed = serializer.deserialize(&hex!("00 00 00 00 09 54"), Some(&Schema::long()))?;
        assert_eq!(typed.value, Value::Long(42));
        assert_eq!(typed.schema, Schema::long());
        assert_eq!(serializer.client().calls(), 0);
        Ok(())
    }

    struct Failing(u32);

    impl SchemaRegistryClient for Failing {
        fn get_registered_schema_id(&self, _: &str, _: &str) -> AvroResult<Option<u32>> {
            Err(RegistryError::new(self.0, "").into())
        }

        fn register_schema(&self, _: &str, _: &str) -> AvroResult<u32> {
            Err(RegistryError::new(self.0, "").into())
        }

        fn get_schema(&self, _: u32) -> AvroResult<String> {
            Err(RegistryError::new(self.0, "").into())
        }
    }

    #[test]
    fn registry_errors() {
        let config = RegistrySerializerConfig::builder().auto_register(true).build();

        // subject not found means "not registered", so registration is attempted
        let serializer = RegistrySerializer::new(Failing(RegistryError::SUBJECT_NOT_FOUND), config.clone());
        match serializer
            .serialize("s", &Schema::int(), &Value::Int(1))
            .map_err(Error::into_details)
        {
            Err(Details::Registry(e)) => assert_eq!(e.code(), RegistryError::SUBJECT_NOT_FOUND),
            other => panic!("Expected Details::Registry, got {other:?}"),
        }

        let serializer = RegistrySerializer::new(Failing(RegistryError::SERVER_TIMEOUT), config);
        match serializer
            .serialize("s", &Schema::int(), &Value::Int(1))
            .map_err(Error::into_details)
        {
            Err(Details::Registry(e)) => assert_eq!(e.message(), "Operation timed out"),
            other => panic!("Expected Details::Registry, got {other:?}"),
        }
        match serializer
            .deserialize(&hex!("00 00 00 00 01 02"), None)
            .map_err(Error::into_details)
        {
            Err(Details::Registry(e)) => assert_eq!(e.code(), RegistryError::SERVER_TIMEOUT),
            other => panic!("Expected Details::Registry, got {other:?}"),
        }
    }

    struct ErrorBody;

    impl SchemaRegistryClient for ErrorBody {
        fn get_registered_schema_id(&self, _: &str, _: &str) -> AvroResult<Option<u32>> {
            Ok(None)
        }

        fn register_schema(&self, _: &str, _: &str) -> AvroResult<u32> {
            Ok(1)
        }

        fn get_schema(&self, _: u32) -> AvroResult<String> {
            Ok(r#"{"error_code": 40403, "message": "id 9"}"#.to_string())
        }
    }

    #[test]
    fn error_bodies_in_place_of_schemas() {
        let serializer = RegistrySerializer::new(ErrorBody, RegistrySerializerConfig::default());
        match serializer
            .deserialize(&hex!("00 00 00 00 09 02"), None)
            .map_err(Error::into_details)
        {
            Err(Details::Registry(e)) => {
                assert_eq!(e.code(), RegistryError::SCHEMA_NOT_FOUND);
                assert_eq!(e.message(), "Schema not found: id 9");
                assert!(e.is_not_found());
            }
            other => panic!("Expected Details::Registry, got {other:?}"),
        }
    }

    #[test]
    fn short_schemas_are_not_truncated() {
        assert_eq!(preview(r#""int""#), r#""int""#);
        assert_eq!(preview(&"x".repeat(50)), "x".repeat(50));
        assert_eq!(preview(&"x".repeat(51)), format!("{}...", "x".repeat(50)));
    }
}
