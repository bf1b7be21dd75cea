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

use crate::error::Details;
use crate::schema::{
    ArraySchema, EnumSchema, FixedSchema, MapSchema, Name, NamesRef, RecordSchema, UnionSchema,
};
use crate::{AvroResult, Error, Schema};
use std::collections::HashMap;

/// A schema together with every named type it defines or refers to.
///
/// [`Schema::Ref`] only carries a name, so the codec needs this table to reach the definition.
#[derive(Debug)]
pub struct ResolvedSchema<'s> {
    pub(super) names_ref: NamesRef<'s>,
    schemata: Vec<&'s Schema>,
}

impl<'s> TryFrom<&'s Schema> for ResolvedSchema<'s> {
    type Error = Error;

    fn try_from(schema: &'s Schema) -> AvroResult<Self> {
        Self::new_with_known_schemata(vec![schema], &HashMap::new())
    }
}

impl<'s> TryFrom<Vec<&'s Schema>> for ResolvedSchema<'s> {
    type Error = Error;

    fn try_from(schemata: Vec<&'s Schema>) -> AvroResult<Self> {
        Self::new_with_known_schemata(schemata, &HashMap::new())
    }
}

impl<'s> ResolvedSchema<'s> {
    pub fn new(schema: &'s Schema) -> AvroResult<Self> {
        Self::try_from(schema)
    }

    /// Creates `ResolvedSchema` with some already known schemas.
    ///
    /// Those schemata would be used to resolve references if needed.
    pub fn new_with_known_schemata(
        schemata: Vec<&'s Schema>,
        known_schemata: &NamesRef<'s>,
    ) -> AvroResult<Self> {
        let mut rs = ResolvedSchema {
            names_ref: HashMap::new(),
            schemata,
        };
        for schema in rs.get_schemata() {
            rs.collect(schema)?;
        }
        for (name, schema) in known_schemata {
            rs.names_ref.entry(name.clone()).or_insert(schema);
        }
        for schema in rs.get_schemata() {
            rs.check_references(schema)?;
        }
        Ok(rs)
    }

    pub fn get_schemata(&self) -> Vec<&'s Schema> {
        self.schemata.clone()
    }

    pub fn get_names(&self) -> &NamesRef<'s> {
        &self.names_ref
    }

    /// The first of the resolved schemata.
    pub fn root(&self) -> Option<&'s Schema> {
        self.schemata.first().copied()
    }

    fn collect(&mut self, schema: &'s Schema) -> AvroResult<()> {
        match schema {
            Schema::Array(ArraySchema { items: inner })
            | Schema::Map(MapSchema { values: inner }) => self.collect(inner),
            Schema::Union(UnionSchema { schemas }) => {
                schemas.iter().try_for_each(|schema| self.collect(schema))
            }
            Schema::Enum(EnumSchema { name, .. }) | Schema::Fixed(FixedSchema { name, .. }) => {
                self.define(name, schema)
            }
            Schema::Record(RecordSchema { name, fields, .. }) => {
                self.define(name, schema)?;
                fields.iter().try_for_each(|field| self.collect(&field.schema))
            }
            Schema::Primitive(_) | Schema::Ref { .. } => Ok(()),
        }
    }

    fn define(&mut self, name: &Name, schema: &'s Schema) -> AvroResult<()> {
        match self.names_ref.insert(name.clone(), schema) {
            Some(_) => Err(Details::AmbiguousSchemaDefinition(name.clone()).into()),
            None => Ok(()),
        }
    }

    fn check_references(&self, schema: &Schema) -> AvroResult<()> {
        match schema {
            Schema::Array(ArraySchema { items: inner })
            | Schema::Map(MapSchema { values: inner }) => self.check_references(inner),
            Schema::Union(UnionSchema { schemas }) => schemas
                .iter()
                .try_for_each(|schema| self.check_references(schema)),
            Schema::Record(RecordSchema { fields, .. }) => fields
                .iter()
                .try_for_each(|field| self.check_references(&field.schema)),
            Schema::Ref { name } => match self.names_ref.get(name) {
                None => Err(Details::SchemaResolutionError(name.clone()).into()),
                Some(Schema::Ref { .. }) => Err(Details::ReferenceToReference(name.clone()).into()),
                Some(_) => Ok(()),
            },
            Schema::Primitive(_) | Schema::Enum(_) | Schema::Fixed(_) => Ok(()),
        }
    }
}
