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

//! # Custom name validation
//!
//! By default, names follow the rules of the [Avro specification](https://avro.apache.org/docs/++version++/specification/#names):
//! every identifier (the name part of a full name, a record field name, an enum symbol) must
//! match `^[A-Za-z_][A-Za-z0-9_]*$` and a namespace is a dot-separated list of such identifiers.
//!
//! Some producers are more lenient. For interoperability with them, the rules can be replaced
//! once per process:
//!
//! ```
//! # use avro_serde::validator::{NameValidator, set_name_validator};
//! # use regex_lite::Regex;
//! # use std::sync::OnceLock;
//! struct AllowDashes;
//!
//! impl NameValidator for AllowDashes {
//!     fn identifier_regex(&self) -> &'static Regex {
//!         static IDENTIFIER_ONCE: OnceLock<Regex> = OnceLock::new();
//!         IDENTIFIER_ONCE.get_or_init(|| {
//!             Regex::new(r"^[A-Za-z_][A-Za-z0-9_\-]*$").expect("Regex is valid")
//!         })
//!     }
//! }
//!
//! // don't parse any schema before registering the custom validator!
//!
//! if set_name_validator(Box::new(AllowDashes)).is_err() {
//!     panic!("There was already a name validator configured")
//! }
//! ```
//!
//! **Note**: the validator can be set only once per the application lifetime! If a schema is
//! built before a validator is set, the default one is registered and used from then on.

use crate::{AvroResult, error::Details};
use log::debug;
use regex_lite::Regex;
use std::sync::OnceLock;

/// What an identifier is used for. Selects the error reported on failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdentifierKind {
    SchemaName,
    FieldName,
    EnumSymbol,
    MessageName,
}

/// Validates identifiers and namespaces.
///
/// To register a custom one use [`set_name_validator`].
pub trait NameValidator: Send + Sync {
    /// The regex every single identifier must match.
    fn identifier_regex(&self) -> &'static Regex {
        static IDENTIFIER_ONCE: OnceLock<Regex> = OnceLock::new();
        IDENTIFIER_ONCE.get_or_init(|| {
            Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex is valid")
        })
    }

    /// The regex a namespace must match. The empty namespace is allowed.
    fn namespace_regex(&self) -> &'static Regex {
        static NAMESPACE_ONCE: OnceLock<Regex> = OnceLock::new();
        NAMESPACE_ONCE.get_or_init(|| {
            Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*)?$")
                .expect("namespace regex is valid")
        })
    }

    fn validate_identifier(&self, kind: IdentifierKind, identifier: &str) -> AvroResult<()> {
        let regex = self.identifier_regex();
        if regex.is_match(identifier) {
            return Ok(());
        }
        Err(match kind {
            IdentifierKind::SchemaName => {
                Details::InvalidSchemaName(identifier.to_string(), regex.as_str())
            }
            IdentifierKind::FieldName => Details::FieldName(identifier.to_string()),
            IdentifierKind::EnumSymbol => Details::EnumSymbolName(identifier.to_string()),
            IdentifierKind::MessageName => Details::MessageName(identifier.to_string()),
        }
        .into())
    }

    fn validate_namespace(&self, namespace: &str) -> AvroResult<()> {
        let regex = self.namespace_regex();
        if regex.is_match(namespace) {
            Ok(())
        } else {
            Err(Details::InvalidNamespace(namespace.to_string(), regex.as_str()).into())
        }
    }

    /// Validates a possibly dotted full name and returns the start byte of its name part.
    ///
    /// The name part follows the last `.`; everything before it is the namespace.
    fn validate_full_name(&self, full_name: &str) -> AvroResult<usize> {
        let index_of_name = full_name.rfind('.').map_or(0, |dot| dot + 1);
        let invalid =
            || Details::InvalidSchemaName(full_name.to_string(), self.identifier_regex().as_str());
        if index_of_name > 0 && self.validate_namespace(&full_name[..index_of_name - 1]).is_err() {
            return Err(invalid().into());
        }
        if !self.identifier_regex().is_match(&full_name[index_of_name..]) {
            return Err(invalid().into());
        }
        Ok(index_of_name)
    }
}

/// A validator that validates names and namespaces according to the Avro specification.
struct SpecificationValidator;

impl NameValidator for SpecificationValidator {}

static NAME_VALIDATOR_ONCE: OnceLock<Box<dyn NameValidator>> = OnceLock::new();

/// Sets a custom name validator.
///
/// Returns `Err(validator)` if a validator is already configured.
///
/// **Note**: This function must be called before parsing any schema because this will
/// register the default validator and the registration is one time only!
pub fn set_name_validator(
    validator: Box<dyn NameValidator>,
) -> Result<(), Box<dyn NameValidator>> {
    debug!("Setting a custom name validator.");
    NAME_VALIDATOR_ONCE.set(validator)
}

fn name_validator() -> &'static dyn NameValidator {
    NAME_VALIDATOR_ONCE
        .get_or_init(|| {
            debug!("Going to use the default name validator.");
            Box::new(SpecificationValidator)
        })
        .as_ref()
}

pub(crate) fn validate_schema_name(full_name: &str) -> AvroResult<usize> {
    name_validator().validate_full_name(full_name)
}

pub(crate) fn validate_namespace(namespace: &str) -> AvroResult<()> {
    name_validator().validate_namespace(namespace)
}

pub(crate) fn validate_record_field_name(field_name: &str) -> AvroResult<()> {
    name_validator().validate_identifier(IdentifierKind::FieldName, field_name)
}

pub(crate) fn validate_enum_symbol_name(symbol: &str) -> AvroResult<()> {
    name_validator().validate_identifier(IdentifierKind::EnumSymbol, symbol)
}

pub(crate) fn validate_message_name(name: &str) -> AvroResult<()> {
    name_validator().validate_identifier(IdentifierKind::MessageName, name)
}
