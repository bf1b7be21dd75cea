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
    registry::RegistryError,
    schema::{Name, SchemaKind},
    types::ValueKind,
};
use std::{error::Error as _, fmt};

/// Errors encountered by this crate.
///
/// To inspect the details of the error use [`details`](Self::details) or [`into_details`](Self::into_details)
/// to get a [`Details`] which contains more precise error information.
///
/// See [`Details`] for all possible errors.
#[derive(thiserror::Error, Debug)]
#[repr(transparent)]
#[error(transparent)]
pub struct Error {
    details: Box<Details>,
}

impl Error {
    pub fn new(details: Details) -> Self {
        Self {
            details: Box::new(details),
        }
    }

    pub fn details(&self) -> &Details {
        &self.details
    }

    pub fn into_details(self) -> Details {
        *self.details
    }

    /// Whether this error was caused by running out of input while decoding.
    pub fn is_short_read(&self) -> bool {
        matches!(*self.details, Details::ShortRead { .. })
    }
}

/// Functions for constructing a specific error type.
#[allow(non_snake_case, reason = "Want to mimic the `Details` variants")]
impl Error {
    /// Construct a new [`Error`] with a [`Details::ShortRead`].
    pub(crate) fn ShortRead(needed: usize, remaining: usize) -> Self {
        Self {
            details: Box::new(Details::ShortRead { needed, remaining }),
        }
    }

    /// Construct a new [`Error`] with a [`Details::BoolValue`].
    pub(crate) fn BoolValue(value: u8) -> Self {
        Self {
            details: Box::new(Details::BoolValue(value)),
        }
    }

    /// Construct a new [`Error`] with a [`Details::MissingField`].
    pub(crate) fn MissingField(field: &'static str) -> Self {
        Self {
            details: Box::new(Details::MissingField(field)),
        }
    }

    /// Construct a new [`Error`] with a [`Details::WrongJsonType`].
    pub(crate) fn WrongJsonType(
        field: impl Into<String>,
        expected: &'static str,
        actual: &serde_json::Value,
    ) -> Self {
        Self {
            details: Box::new(Details::WrongJsonType {
                field: field.into(),
                expected,
                actual: actual.to_string(),
            }),
        }
    }
}

impl From<Details> for Error {
    fn from(details: Details) -> Self {
        Self::new(details)
    }
}

impl From<RegistryError> for Error {
    fn from(error: RegistryError) -> Self {
        Self::new(Details::Registry(error))
    }
}

#[derive(thiserror::Error)]
pub enum Details {
    #[error("Invalid schema name {0}. It must match the regex '{1}'")]
    InvalidSchemaName(String, &'static str),

    #[error("Invalid namespace {0}. It must match the regex '{1}'")]
    InvalidNamespace(String, &'static str),

    #[error("Invalid field name {0}")]
    FieldName(String),

    #[error("Invalid message name {0}")]
    MessageName(String),

    #[error("Invalid enum symbol name {0}")]
    EnumSymbolName(String),

    #[error("Duplicate enum symbol {0}")]
    EnumSymbolDuplicate(String),

    #[error("Duplicate field name {0}")]
    FieldNameDuplicate(String),

    #[error("Unions may not directly contain a union")]
    GetNestedUnion,

    #[error("Unions cannot contain duplicate types, found `{0}` twice")]
    GetUnionDuplicate(String),

    #[error("The decimal precision ({precision}) must be bigger or equal to the scale ({scale})")]
    DecimalPrecisionLessThanScale { precision: usize, scale: usize },

    #[error("The decimal precision ({precision}) must be a positive number")]
    DecimalPrecisionMustBePositive { precision: usize },

    #[error("Logical type `{logical_type}` cannot annotate a `{base}` schema")]
    IncompatibleLogicalType {
        logical_type: String,
        base: &'static str,
    },

    #[error("A reference cannot point to another reference: {0}")]
    ReferenceToReference(Name),

    #[error("Cannot denormalize data because it misses a \"{0}\" field")]
    MissingField(&'static str),

    #[error("Wrong type provided for attribute \"{field}\" (expected \"{expected}\", got {actual})")]
    WrongJsonType {
        field: String,
        expected: &'static str,
        actual: String,
    },

    #[error("Cannot denormalize data because default value {default} of field \"{field}\" is invalid")]
    InvalidDefault {
        field: String,
        default: serde_json::Value,
    },

    #[error("Cannot denormalize data because order value {order} of field \"{field}\" is invalid")]
    InvalidOrder {
        field: String,
        order: serde_json::Value,
    },

    #[error("Unable to resolve referenced type \"{0}\"")]
    UnresolvedReference(String),

    #[error("Name \"{0}\" is already in use")]
    NameCollision(String),

    #[error("Failed to parse schema from JSON")]
    ParseSchemaJson(#[source] serde_json::Error),

    #[error("Failed to serialize schema to JSON")]
    SerializeSchemaJson(#[source] serde_json::Error),

    #[error("Unresolved schema reference: {0}")]
    SchemaResolutionError(Name),

    #[error("Two named schema defined for same fullname: {0}.")]
    AmbiguousSchemaDefinition(Name),

    #[error("Not enough bytes to read: needed {needed}, remaining {remaining}")]
    ShortRead { needed: usize, remaining: usize },

    #[error("Invalid u8 for bool: {0}")]
    BoolValue(u8),

    #[error("Overflow when decoding integer value")]
    IntegerOverflow,

    #[error("Decoded integer out of range for i32: {1}: {0}")]
    ZagI32(#[source] std::num::TryFromIntError, i64),

    #[error("Cannot convert length to usize: {1}")]
    ConvertLengthToUsize(#[source] std::num::TryFromIntError, i64),

    #[error("Union index {index} out of bounds: {num_variants}")]
    GetUnionVariant { index: i64, num_variants: usize },

    #[error("Enum value index {index} is out of bounds {nsymbols}")]
    GetEnumValue { index: i64, nsymbols: usize },

    #[error("Invalid utf-8 string")]
    ConvertToUtf8(#[source] std::string::FromUtf8Error),

    #[error("Unable to allocate {desired} bytes (maximum allowed: {maximum})")]
    MemoryAllocation { desired: usize, maximum: usize },

    #[error("Invalid Avro message")]
    InvalidMessage(#[source] Error),

    #[error("Can only encode value type {value_kind:?} as one of {supported_schema}")]
    EncodeValueAsSchemaError {
        value_kind: ValueKind,
        supported_schema: String,
    },

    #[error("Could not find matching type in union for {0:?}")]
    FindUnionVariant(ValueKind),

    #[error("Missing field in record: {0:?}")]
    MissingRecordField(String),

    #[error("Enum symbol not found {0}")]
    GetEnumSymbol(String),

    #[error("Fixed size mismatch, expected: {size}, got: {n}")]
    CompareFixedSizes { size: usize, n: usize },

    #[error("Value {0} does not fit into an int")]
    IntOutOfRange(i64),

    #[error("Failed to write bytes: {0}")]
    WriteBytes(#[source] std::io::Error),

    #[error("Wire envelope needs at least 5 bytes, got {0}")]
    WireEnvelopeTooShort(usize),

    #[error("Magic byte not found, expected 0x00 but got {0:#04x}")]
    MagicByteNotFound(u8),

    #[error(transparent)]
    Registry(RegistryError),

    #[error("Schema \"{schema}\" cannot be found under subject \"{subject}\"")]
    UnknownSchema { subject: String, schema: String },

    #[error("A one-way message cannot have a response")]
    OneWayWithResponse,

    #[error("A one-way message cannot have errors")]
    OneWayWithErrors,

    #[error("Protocol types cannot have an own namespace: {0}")]
    ProtocolTypeWithNamespace(Name),

    #[error("Protocol types must be named schemas, got {0:?}")]
    ProtocolTypeNotNamed(SchemaKind),
}

impl fmt::Debug for Details {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut msg = self.to_string();
        if let Some(e) = self.source() {
            msg.extend([": ", &e.to_string()]);
        }
        write!(f, "{msg}")
    }
}
