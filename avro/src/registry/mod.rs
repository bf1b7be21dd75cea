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

//! Schema registry support.
//!
//! The registry itself is reached through an implementation of [`SchemaRegistryClient`]
//! provided by the application; this module only frames messages and keeps track of ids.

mod error;
mod serializer;

pub use crate::registry::{
    error::RegistryError,
    serializer::{RegistrySerializer, RegistrySerializerConfig, TypedValue},
};

use crate::AvroResult;
use log::debug;
use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

/// The operations of a schema registry used to frame messages.
///
/// Schemas are exchanged as JSON text.
pub trait SchemaRegistryClient {
    /// The id of `schema` under `subject`, or `None` when it is not registered.
    fn get_registered_schema_id(&self, subject: &str, schema: &str) -> AvroResult<Option<u32>>;

    /// Registers `schema` under `subject` and returns its id.
    fn register_schema(&self, subject: &str, schema: &str) -> AvroResult<u32>;

    /// The schema with the given id.
    ///
    /// A client may return the error body of the registry, `{"error_code": .., "message": ..}`,
    /// in place of the schema. [`RegistrySerializer`] reports it as that [`RegistryError`].
    fn get_schema(&self, id: u32) -> AvroResult<String>;
}

impl<C: SchemaRegistryClient + ?Sized> SchemaRegistryClient for &C {
    fn get_registered_schema_id(&self, subject: &str, schema: &str) -> AvroResult<Option<u32>> {
        (**self).get_registered_schema_id(subject, schema)
    }

    fn register_schema(&self, subject: &str, schema: &str) -> AvroResult<u32> {
        (**self).register_schema(subject, schema)
    }

    fn get_schema(&self, id: u32) -> AvroResult<String> {
        (**self).get_schema(id)
    }
}

/// A [`SchemaRegistryClient`] remembering what the decorated client found.
///
/// Ids are cached per schema text and schemas per id. Schemas that are not registered are
/// looked up again every time.
#[derive(Debug)]
pub struct CachedClient<C> {
    client: C,
    ids: Mutex<HashMap<String, u32>>,
    schemas: Mutex<HashMap<u32, String>>,
}

impl<C: SchemaRegistryClient> CachedClient<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            ids: Mutex::default(),
            schemas: Mutex::default(),
        }
    }

    pub fn inner(&self) -> &C {
        &self.client
    }

    fn cached_id(&self, schema: &str) -> Option<u32> {
        let ids = self.ids.lock().unwrap_or_else(PoisonError::into_inner);
        ids.get(schema).copied()
    }

    fn cache_id(&self, schema: &str, id: u32) {
        let mut ids = self.ids.lock().unwrap_or_else(PoisonError::into_inner);
        ids.insert(schema.to_string(), id);
    }
}

impl<C: SchemaRegistryClient> SchemaRegistryClient for CachedClient<C> {
    fn get_registered_schema_id(&self, subject: &str, schema: &str) -> AvroResult<Option<u32>> {
        if let Some(id) = self.cached_id(schema) {
            return Ok(Some(id));
        }
        debug!("Looking up the id of a schema under subject {subject}");
        let id = self.client.get_registered_schema_id(subject, schema)?;
        if let Some(id) = id {
            self.cache_id(schema, id);
        }
        Ok(id)
    }

    fn register_schema(&self, subject: &str, schema: &str) -> AvroResult<u32> {
        debug!("Registering a schema under subject {subject}");
        let id = self.client.register_schema(subject, schema)?;
        self.cache_id(schema, id);
        Ok(id)
    }

    fn get_schema(&self, id: u32) -> AvroResult<String> {
        {
            let schemas = self.schemas.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(schema) = schemas.get(&id) {
                return Ok(schema.clone());
            }
        }
        debug!("Fetching schema #{id}");
        let schema = self.client.get_schema(id)?;
        self.schemas
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, schema.clone());
        Ok(schema)
    }
}
