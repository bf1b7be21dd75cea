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

//! Top-level operations backed by serializers shared by the whole process.
//!
//! ```
//! use avro_serde::{facade, types::Value};
//!
//! let schema = facade::parse_schema(r#"{"type": "array", "items": "long"}"#)?;
//! let bytes = facade::encode_message(&schema, &Value::Array(vec![Value::Long(1)]))?;
//! assert_eq!(bytes, [0x01, 0x02, 0x02, 0x00]);
//! assert_eq!(facade::decode_message(&bytes, &schema)?, Value::Array(vec![Value::Long(1)]));
//! # Ok::<(), avro_serde::Error>(())
//! ```

use crate::{
    AvroResult,
    message::MessageSerializer,
    protocol::{Protocol, ProtocolSerializer},
    registry::{RegistrySerializer, RegistrySerializerConfig, SchemaRegistryClient, TypedValue},
    schema::{NamesRef, Schema, SchemaSerializer},
    types::Value,
};
use log::debug;
use std::sync::OnceLock;

fn schema_serializer() -> &'static SchemaSerializer {
    static SERIALIZER: OnceLock<SchemaSerializer> = OnceLock::new();
    SERIALIZER.get_or_init(|| {
        debug!("Creating the shared schema serializer");
        SchemaSerializer::new()
    })
}

fn protocol_serializer() -> &'static ProtocolSerializer {
    static SERIALIZER: OnceLock<ProtocolSerializer> = OnceLock::new();
    SERIALIZER.get_or_init(|| {
        debug!("Creating the shared protocol serializer");
        ProtocolSerializer::new()
    })
}

fn message_serializer() -> &'static MessageSerializer {
    static SERIALIZER: OnceLock<MessageSerializer> = OnceLock::new();
    SERIALIZER.get_or_init(|| {
        debug!("Creating the shared message serializer");
        MessageSerializer::new()
    })
}

fn registry_serializer<'c, C: SchemaRegistryClient>(
    client: &'c C,
    config: &RegistrySerializerConfig,
) -> RegistrySerializer<&'c C> {
    RegistrySerializer::with_serializers(
        client,
        config.clone(),
        *schema_serializer(),
        message_serializer().clone(),
    )
}

pub fn parse_schema(json: &str) -> AvroResult<Schema> {
    schema_serializer().deserialize(json)
}

pub fn dump_schema(schema: &Schema) -> AvroResult<String> {
    schema_serializer().serialize(schema, false)
}

/// Dumps the Parsing Canonical Form of `schema`.
pub fn dump_canonical_schema(schema: &Schema) -> AvroResult<String> {
    schema_serializer().serialize(schema, true)
}

/// Parses a protocol, hashing its JSON text with MD5.
pub fn parse_protocol(json: &str) -> AvroResult<Protocol> {
    protocol_serializer().deserialize(json)
}

pub fn dump_protocol(protocol: &Protocol) -> AvroResult<String> {
    protocol_serializer().serialize(protocol)
}

pub fn encode_message(schema: &Schema, value: &Value) -> AvroResult<Vec<u8>> {
    message_serializer().serialize(schema, value)
}

pub fn decode_message(bytes: &[u8], schema: &Schema) -> AvroResult<Value> {
    message_serializer().deserialize(bytes, schema)
}

/// Encodes `value` with a schema referring to named types declared elsewhere, such as the
/// types of a protocol.
pub fn encode_message_with_names(
    schema: &Schema,
    names: &NamesRef<'_>,
    value: &Value,
) -> AvroResult<Vec<u8>> {
    message_serializer().serialize_with_names(schema, names, value)
}

pub fn decode_message_with_names(
    bytes: &[u8],
    schema: &Schema,
    names: &NamesRef<'_>,
) -> AvroResult<Value> {
    message_serializer().deserialize_with_names(bytes, schema, names)
}

/// Encodes `value` framed with the registry id of `schema`.
///
/// See [`RegistrySerializer::serialize`].
pub fn encode_message_with_registry<C: SchemaRegistryClient>(
    client: &C,
    config: &RegistrySerializerConfig,
    subject: &str,
    schema: &Schema,
    value: &Value,
) -> AvroResult<Vec<u8>> {
    registry_serializer(client, config).serialize(subject, schema, value)
}

/// Decodes a framed value, fetching the writer schema from the registry when no `reader` is
/// given.
pub fn decode_message_with_registry<C: SchemaRegistryClient>(
    client: &C,
    bytes: &[u8],
    reader: Option<&Schema>,
) -> AvroResult<TypedValue> {
    registry_serializer(client, &RegistrySerializerConfig::default()).deserialize(bytes, reader)
}
