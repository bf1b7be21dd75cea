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
use crate::schema::{NamesRef, PrimitiveType, Schema};
use crate::types::Value;
use crate::validation;
use log::warn;
use std::collections::HashSet;

/// A description of a Union schema
#[derive(Debug, Clone, PartialEq)]
pub struct UnionSchema {
    /// The schemas that make up this union
    pub(crate) schemas: Vec<Schema>,
}

impl UnionSchema {
    /// Creates a new UnionSchema from a vector of schemas.
    ///
    /// Named schemas (records, enums, fixed and references) never collide with each other.
    /// Any other kind may appear only once.
    ///
    /// # Errors
    /// Will return an error if `schemas` has duplicate unnamed schemas or if `schemas`
    /// contains a union.
    pub fn new(schemas: Vec<Schema>) -> AvroResult<Self> {
        let mut seen = HashSet::with_capacity(schemas.len());
        for schema in &schemas {
            if let Schema::Union(_) = schema {
                return Err(Details::GetNestedUnion.into());
            }
            if let Some(discriminator) = discriminator(schema)
                && !seen.insert(discriminator)
            {
                return Err(Details::GetUnionDuplicate(discriminator.to_string()).into());
            }
        }
        if schemas.len() == 1 {
            warn!("A union with a single member is equivalent to that member");
        }
        Ok(UnionSchema { schemas })
    }

    /// Returns a slice to all variants of this schema.
    pub fn variants(&self) -> &[Schema] {
        &self.schemas
    }

    /// Returns true if the any of the variants of this `UnionSchema` is `null`.
    pub fn is_nullable(&self) -> bool {
        self.schemas
            .iter()
            .any(|x| x.primitive_type() == Some(PrimitiveType::Null))
    }

    /// The first variant `value` is valid against, with its position.
    ///
    /// `names` resolves the references among the variants.
    pub fn find_schema(&self, value: &Value, names: &NamesRef<'_>) -> Option<(usize, &Schema)> {
        self.schemas
            .iter()
            .enumerate()
            .find(|(_, schema)| validation::is_valid(value, schema, names))
    }
}

/// The key two union members must not share. Named schemas have none.
fn discriminator(schema: &Schema) -> Option<&'static str> {
    match schema {
        Schema::Primitive(primitive) => Some(primitive.kind.into()),
        Schema::Array(_) => Some("array"),
        Schema::Map(_) => Some("map"),
        Schema::Union(_) => Some("union"),
        Schema::Record(_) | Schema::Enum(_) | Schema::Fixed(_) | Schema::Ref { .. } => None,
    }
}
