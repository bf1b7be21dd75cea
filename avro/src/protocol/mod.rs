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

//! Avro protocols: named types plus the messages exchanged with them.

mod normalizer;
mod parser;
mod serializer;

pub use crate::protocol::{normalizer::normalize, serializer::ProtocolSerializer};

use crate::{
    AvroResult,
    error::Details,
    schema::{
        Context, Documentation, Name, NamesRef, RecordField, ResolvedSchema, Schema, SchemaKind,
        UnionSchema,
    },
    validator::validate_message_name,
};
use serde_json::Value as JsonValue;

/// An Avro [protocol](https://avro.apache.org/docs/++version++/specification/#protocol-declaration).
///
/// Types and messages are kept in the order they were added; adding one with the name of an
/// existing one replaces it in place.
#[derive(Clone, Debug, PartialEq)]
pub struct Protocol {
    pub name: Name,
    pub doc: Documentation,
    types: Vec<Schema>,
    messages: Vec<Message>,
    hash: Option<Vec<u8>>,
}

impl Protocol {
    pub fn new(name: Name) -> Self {
        Self {
            name,
            doc: None,
            types: Vec::new(),
            messages: Vec::new(),
            hash: None,
        }
    }

    /// Parses a protocol from its JSON form.
    pub fn parse(value: &JsonValue) -> AvroResult<Self> {
        parser::parse(value, &mut Context::new())
    }

    pub fn with_doc(self, doc: impl Into<String>) -> Self {
        Self {
            doc: Some(doc.into()),
            ..self
        }
    }

    /// The MD5 digest of the JSON text the protocol was read from.
    pub fn hash(&self) -> Option<&[u8]> {
        self.hash.as_deref()
    }

    pub fn with_hash(self, hash: Vec<u8>) -> Self {
        Self {
            hash: Some(hash),
            ..self
        }
    }

    /// Adds a named type, keyed by its name.
    ///
    /// # Errors
    /// Will return a [`Details::ProtocolTypeNotNamed`] for anything but a record, an enum or a
    /// fixed, and a [`Details::ProtocolTypeWithNamespace`] for a type with its own namespace.
    pub fn with_type(mut self, schema: Schema) -> AvroResult<Self> {
        let name = match &schema {
            Schema::Record(record) => &record.name,
            Schema::Enum(enum_schema) => &enum_schema.name,
            Schema::Fixed(fixed) => &fixed.name,
            other => return Err(Details::ProtocolTypeNotNamed(SchemaKind::from(other)).into()),
        };
        if name.namespace().is_some() {
            return Err(Details::ProtocolTypeWithNamespace(name.clone()).into());
        }
        let position = self
            .types
            .iter()
            .position(|existing| existing.name().is_some_and(|n| n.name() == name.name()));
        match position {
            Some(position) => self.types[position] = schema,
            None => self.types.push(schema),
        }
        Ok(self)
    }

    pub fn types(&self) -> &[Schema] {
        &self.types
    }

    pub fn get_type(&self, name: &str) -> Option<&Schema> {
        self.types
            .iter()
            .find(|schema| schema.name().is_some_and(|n| n.name() == name))
    }

    /// Every named type declared by the protocol, nested ones included.
    ///
    /// The table resolves the references found in message schemas.
    pub fn names_ref(&self) -> AvroResult<NamesRef<'_>> {
        let rs = ResolvedSchema::try_from(self.types.iter().collect::<Vec<_>>())?;
        Ok(rs.get_names().clone())
    }

    /// Adds a message, keyed by its name.
    pub fn with_message(mut self, message: Message) -> Self {
        match self.messages.iter().position(|m| m.name == message.name) {
            Some(position) => self.messages[position] = message,
            None => self.messages.push(message),
        }
        self
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn message(&self, name: &str) -> Option<&Message> {
        self.messages.iter().find(|message| message.name == name)
    }
}

/// A message of a [`Protocol`].
///
/// A message without response and errors is one-way: no reply is sent for it.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub name: String,
    pub doc: Documentation,
    /// The parameters, in order.
    pub request: Vec<RecordField>,
    pub response: Option<Schema>,
    pub errors: Option<UnionSchema>,
}

impl Message {
    pub fn one_way(name: impl Into<String>, request: Vec<RecordField>) -> AvroResult<Self> {
        Self::new(name.into(), request, None, None)
    }

    pub fn two_way(
        name: impl Into<String>,
        request: Vec<RecordField>,
        response: Schema,
        errors: Option<UnionSchema>,
    ) -> AvroResult<Self> {
        Self::new(name.into(), request, Some(response), errors)
    }

    fn new(
        name: String,
        request: Vec<RecordField>,
        response: Option<Schema>,
        errors: Option<UnionSchema>,
    ) -> AvroResult<Self> {
        validate_message_name(&name)?;
        Ok(Self {
            name,
            doc: None,
            request,
            response,
            errors,
        })
    }

    pub fn with_doc(self, doc: impl Into<String>) -> Self {
        Self {
            doc: Some(doc.into()),
            ..self
        }
    }

    pub fn is_one_way(&self) -> bool {
        self.response.is_none() && self.errors.is_none()
    }

    /// The declared errors preceded by `string`, which any call may fail with.
    ///
    /// # Errors
    /// Will return a [`Details::GetUnionDuplicate`] if `string` is declared already.
    pub fn effective_errors(&self) -> AvroResult<UnionSchema> {
        let declared = self.errors.iter().flat_map(|errors| errors.variants().iter());
        UnionSchema::new(
            std::iter::once(Schema::string())
                .chain(declared.cloned())
                .collect(),
        )
    }
}
