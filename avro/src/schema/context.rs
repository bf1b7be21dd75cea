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

//! The state shared by one denormalization pass.

use crate::{
    AvroResult, Schema,
    error::Details,
    schema::{Name, Names, NamesRef, Namespace, NamespaceRef},
};
use std::collections::HashMap;

/// The named schemas seen so far, keyed by full name.
///
/// A name is reserved before its schema is built and completed afterwards, so that a record
/// can refer to itself (or to a name reserved further up) while its fields are parsed.
#[derive(Clone, Debug, Default)]
pub struct SchemaRepository {
    schemas: HashMap<Name, Option<Schema>>,
}

impl SchemaRepository {
    /// Reserves `name`.
    ///
    /// # Errors
    /// Will return a [`Details::NameCollision`] if the name is already reserved or defined.
    pub fn reserve(&mut self, name: &Name) -> AvroResult<()> {
        if self.schemas.contains_key(name) {
            return Err(Details::NameCollision(name.fullname().to_string()).into());
        }
        self.schemas.insert(name.clone(), None);
        Ok(())
    }

    /// Stores the finished schema of a reserved name.
    pub fn complete(&mut self, name: Name, schema: Schema) {
        self.schemas.insert(name, Some(schema));
    }

    /// Whether `name` is reserved or defined.
    pub fn contains(&self, name: &Name) -> bool {
        self.schemas.contains_key(name)
    }

    /// The finished schema of `name`.
    pub fn resolve(&self, name: &Name) -> Option<&Schema> {
        self.schemas.get(name).and_then(Option::as_ref)
    }

    /// The finished schemas, borrowed.
    pub fn names_ref(&self) -> NamesRef<'_> {
        self.schemas
            .iter()
            .filter_map(|(name, schema)| schema.as_ref().map(|schema| (name.clone(), schema)))
            .collect()
    }

    /// The finished schemas.
    pub fn into_names(self) -> Names {
        self.schemas
            .into_iter()
            .filter_map(|(name, schema)| schema.map(|schema| (name, schema)))
            .collect()
    }
}

/// Tracks the enclosing namespace and the named types of one parse.
///
/// A context is created for a single top level parse (a schema or a protocol document) and
/// thrown away afterwards.
#[derive(Clone, Debug, Default)]
pub struct Context {
    namespace: Namespace,
    repository: SchemaRepository,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the context with `namespace` as the enclosing namespace.
    pub fn with_namespace(self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        Self {
            namespace: (!namespace.is_empty()).then_some(namespace),
            ..self
        }
    }

    pub fn namespace(&self) -> NamespaceRef<'_> {
        self.namespace.as_deref()
    }

    pub fn has_namespace(&self) -> bool {
        self.namespace.is_some()
    }

    pub fn repository(&self) -> &SchemaRepository {
        &self.repository
    }

    /// Runs `f` with `namespace` as the enclosing namespace, restoring the current one after.
    pub(crate) fn in_namespace<T>(
        &mut self,
        namespace: Namespace,
        f: impl FnOnce(&mut Self) -> AvroResult<T>,
    ) -> AvroResult<T> {
        let outer = std::mem::replace(&mut self.namespace, namespace);
        let result = f(self);
        self.namespace = outer;
        result
    }

    /// Declares the named schema `name` and builds it with `build`.
    ///
    /// `name` is resolvable by [`get_reference`](Self::get_reference) while `build` runs.
    ///
    /// # Errors
    /// Will return a [`Details::NameCollision`] if `name` was already declared, or whatever
    /// `build` fails with.
    pub fn create_reference(
        &mut self,
        name: &Name,
        build: impl FnOnce(&mut Self) -> AvroResult<Schema>,
    ) -> AvroResult<Schema> {
        self.repository.reserve(name)?;
        let schema = build(self)?;
        self.repository.complete(name.clone(), schema.clone());
        Ok(schema)
    }

    /// A reference to `name`, if it was declared.
    pub fn get_reference(&self, name: &Name) -> Option<Schema> {
        self.repository
            .contains(name)
            .then(|| Schema::Ref { name: name.clone() })
    }

    /// The finished named schemas, borrowed.
    pub fn names_ref(&self) -> NamesRef<'_> {
        self.repository.names_ref()
    }

    /// The finished named schemas.
    pub fn into_names(self) -> Names {
        self.repository.into_names()
    }
}
