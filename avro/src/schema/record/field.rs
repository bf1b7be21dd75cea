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
use crate::schema::{Aliases, Documentation, NamesRef, Schema};
use crate::types::Value;
use crate::validation;
use crate::validator::validate_record_field_name;
use serde_json::Value as JsonValue;
use strum_macros::{EnumString, IntoStaticStr};

/// Represents a `field` in a `record` Avro schema.
///
/// Fields are built with [`RecordField::new`] and refined with the `with_*` methods, each
/// returning a new value.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordField {
    /// Name of the field.
    pub name: String,
    /// Schema of the field.
    pub schema: Schema,
    /// Documentation of the field.
    pub doc: Documentation,
    /// Default value of the field, as written in the JSON schema.
    ///
    /// It is used when encoding a record value that lacks this field and when the encoded
    /// data ends before this field.
    pub default: Option<JsonValue>,
    /// Order of the field.
    ///
    /// **NOTE** This currently has no effect.
    pub order: Option<RecordFieldOrder>,
    /// Aliases of the field's name. They have no namespace.
    pub aliases: Aliases,
}

/// Represents any valid order for a `field` in a `record` Avro schema.
#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumString, IntoStaticStr)]
#[strum(serialize_all = "kebab_case")]
pub enum RecordFieldOrder {
    Ascending,
    Descending,
    Ignore,
}

impl RecordField {
    /// Creates a field named `name`.
    ///
    /// # Errors
    /// Will return a [`Details::FieldName`] if `name` is not a valid identifier.
    pub fn new(name: impl Into<String>, schema: Schema) -> AvroResult<Self> {
        let name = name.into();
        validate_record_field_name(&name)?;
        Ok(Self {
            name,
            schema,
            doc: None,
            default: None,
            order: None,
            aliases: None,
        })
    }

    pub fn with_doc(self, doc: impl Into<String>) -> Self {
        Self {
            doc: Some(doc.into()),
            ..self
        }
    }

    /// Sets the default value of the field.
    ///
    /// The default must be a valid value of the field's schema or, when the schema is a
    /// union, of the first member of the union.
    ///
    /// # Errors
    /// Will return a [`Details::InvalidDefault`] if the value does not fit.
    pub fn with_default(self, default: JsonValue) -> AvroResult<Self> {
        let field = self.with_unchecked_default(default);
        field.check_default(&NamesRef::new())?;
        Ok(field)
    }

    /// Sets the default value without looking at it, for a default checked later with
    /// [`check_default`](Self::check_default).
    pub(crate) fn with_unchecked_default(self, default: JsonValue) -> Self {
        Self {
            default: Some(default),
            ..self
        }
    }

    /// Checks the default value, if any, with `names` resolving references.
    pub(crate) fn check_default(&self, names: &NamesRef<'_>) -> AvroResult<()> {
        let Some(default) = &self.default else {
            return Ok(());
        };
        let target = match &self.schema {
            Schema::Union(union) => union.variants().first(),
            schema => Some(schema),
        };
        if let Some(target) = target
            && !Value::from_json_default(default, target, names)
                .is_some_and(|value| validation::is_valid(&value, target, names))
        {
            return Err(Details::InvalidDefault {
                field: self.name.clone(),
                default: default.clone(),
            }
            .into());
        }
        Ok(())
    }

    pub fn with_order(self, order: RecordFieldOrder) -> Self {
        Self {
            order: Some(order),
            ..self
        }
    }

    pub fn with_aliases(self, aliases: Vec<String>) -> Self {
        Self {
            aliases: Some(aliases),
            ..self
        }
    }

    /// The default of this field as a [`Value`], if it has one.
    pub(crate) fn default_value(&self, names: &NamesRef<'_>) -> Option<Value> {
        self.default
            .as_ref()
            .and_then(|default| Value::from_json_default(default, &self.schema, names))
    }

    /// Returns true if this `RecordField` is nullable, meaning the schema is a `UnionSchema` where one variant is `null`.
    pub fn is_nullable(&self) -> bool {
        match self.schema {
            Schema::Union(ref inner) => inner.is_nullable(),
            _ => false,
        }
    }
}
