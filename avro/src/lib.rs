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

//! **[Apache Avro](https://avro.apache.org/)** schemas and binary encoding, together with the
//! framing used by Confluent-compatible schema registries.
//!
//! Data is handled through the generic [`Value`](types::Value) type. A typical round trip:
//!
//! ```
//! use avro_serde::{Schema, decode::decode_slice, encode::encode_to_vec, types::Value};
//!
//! let schema = Schema::parse_str(r#"
//!     {
//!         "type": "record",
//!         "name": "Reading",
//!         "fields": [
//!             {"name": "sensor", "type": "string"},
//!             {"name": "value", "type": ["null", "double"]}
//!         ]
//!     }
//! "#)?;
//! let reading = Value::Record(vec![
//!     ("sensor".to_string(), Value::String("s1".to_string())),
//!     ("value".to_string(), Value::Double(0.5)),
//! ]);
//! let bytes = encode_to_vec(&reading, &schema)?;
//! assert_eq!(decode_slice(&schema, &bytes)?, reading);
//! # Ok::<(), avro_serde::Error>(())
//! ```
//!
//! The main entry points:
//!
//! - [`Schema::parse_str`] and [`schema::normalize`] convert schemas from and to JSON. Named
//!   types are resolved through a [`schema::Context`].
//! - [`encode`] and [`decode`] implement the binary encoding.
//! - [`protocol::Protocol`] models Avro protocols.
//! - [`envelope::WireEnvelope`] and [`registry::RegistrySerializer`] prefix messages with the
//!   registry id of their schema.
//! - [`facade`] offers all of the above through serializers shared by the process.
//!
//! # MSRV
//!
//! The current MSRV is 1.88.0.
//!
//! The MSRV may be bumped in minor releases.

mod bytes;

pub mod decode;
pub mod encode;
pub mod envelope;
pub mod error;
pub mod facade;
pub mod message;
pub mod protocol;
pub mod registry;
pub mod schema;
pub mod types;
pub mod util;
pub mod validation;
pub mod validator;

pub use crate::{
    bytes::ByteReader,
    envelope::WireEnvelope,
    error::{Details, Error},
    message::MessageSerializer,
    protocol::{Protocol, ProtocolSerializer},
    registry::{RegistrySerializer, SchemaRegistryClient},
    schema::{Schema, SchemaSerializer},
};

pub type AvroResult<T> = Result<T, Error>;

#[cfg(test)]
pub(crate) type TestResult<T = ()> = anyhow::Result<T>;
