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
use crate::schema::{Aliases, Documentation, Name, RecordField};
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};

/// A description of a Record schema.
#[derive(Clone, PartialEq)]
pub struct RecordSchema {
    /// The name of the schema
    pub name: Name,
    /// Whether this record was declared as an `error`
    pub is_error: bool,
    /// The set of fields of the schema
    pub fields: Vec<RecordField>,
    /// The `lookup` table maps field names to their position in the `Vec`
    /// of `fields`.
    pub lookup: BTreeMap<String, usize>,
    /// The documentation of the schema
    pub doc: Documentation,
    /// The aliases of the schema
    pub aliases: Aliases,
}

impl Debug for RecordSchema {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("RecordSchema");
        debug.field("name", &self.name);
        if self.is_error {
            debug.field("is_error", &self.is_error);
        }
        if let Some(aliases) = &self.aliases {
            debug.field("aliases", aliases);
        }
        if let Some(doc) = &self.doc {
            debug.field("doc", doc);
        }
        debug.field("fields", &self.fields);
        if self.aliases.is_none() || self.doc.is_none() || !self.is_error {
            debug.finish_non_exhaustive()
        } else {
            debug.finish()
        }
    }
}

impl RecordSchema {
    /// A record without fields.
    pub fn new(name: Name) -> Self {
        Self {
            name,
            is_error: false,
            fields: Vec::new(),
            lookup: BTreeMap::new(),
            doc: None,
            aliases: None,
        }
    }

    /// An `error` record without fields, as used by protocol messages.
    pub fn error(name: Name) -> Self {
        Self {
            is_error: true,
            ..Self::new(name)
        }
    }

    /// Appends `field`.
    ///
    /// # Errors
    /// Will return a [`Details::FieldNameDuplicate`] if the record already has a field with
    /// that name.
    pub fn with_field(mut self, field: RecordField) -> AvroResult<Self> {
        if self.lookup.contains_key(&field.name) {
            return Err(Details::FieldNameDuplicate(field.name).into());
        }
        self.lookup.insert(field.name.clone(), self.fields.len());
        self.fields.push(field);
        Ok(self)
    }

    /// Appends all of `fields`, in order.
    pub fn with_fields(self, fields: impl IntoIterator<Item = RecordField>) -> AvroResult<Self> {
        fields
            .into_iter()
            .try_fold(self, |record, field| record.with_field(field))
    }

    pub fn with_doc(self, doc: impl Into<String>) -> Self {
        Self {
            doc: Some(doc.into()),
            ..self
        }
    }

    pub fn with_aliases(self, aliases: Vec<String>) -> Self {
        Self {
            aliases: Some(aliases),
            ..self
        }
    }

    /// Moves the record into `namespace`, keeping its short name.
    pub fn with_namespace(self, namespace: Option<&str>) -> AvroResult<Self> {
        Ok(Self {
            name: self.name.with_namespace(namespace)?,
            ..self
        })
    }

    /// Finds a field by name.
    pub fn field(&self, name: &str) -> Option<&RecordField> {
        self.lookup.get(name).map(|&position| &self.fields[position])
    }
}
