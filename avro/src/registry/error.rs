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

use crate::{AvroResult, Error};
use serde_json::Value as JsonValue;

/// An error reported by a schema registry.
///
/// The message is the description of the well-known code, followed by the reason given by the
/// registry if there is one.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
#[error("{message}")]
pub struct RegistryError {
    code: u32,
    message: String,
}

impl RegistryError {
    pub const SUBJECT_NOT_FOUND: u32 = 40401;
    pub const VERSION_NOT_FOUND: u32 = 40402;
    pub const SCHEMA_NOT_FOUND: u32 = 40403;
    pub const INVALID_AVRO_SCHEMA: u32 = 42201;
    pub const INVALID_VERSION: u32 = 42202;
    pub const INVALID_COMPATIBILITY_LEVEL: u32 = 42203;
    pub const SERVER_ERROR: u32 = 50001;
    pub const SERVER_TIMEOUT: u32 = 50002;
    pub const SERVER_MASTER_ERROR: u32 = 50003;

    pub fn new(code: u32, reason: &str) -> Self {
        let description = describe(code);
        let message = if reason.is_empty() {
            description.to_string()
        } else {
            format!("{description}: {reason}")
        };
        Self { code, message }
    }

    /// Whether `body` is an error response of the registry.
    pub fn is_error(body: &JsonValue) -> bool {
        body.get("error_code").is_some()
    }

    /// Reads an error response of the registry, `{"error_code": 40401, "message": "..."}`.
    pub fn from_response(body: &JsonValue) -> AvroResult<Self> {
        let code = body
            .get("error_code")
            .ok_or_else(|| Error::MissingField("error_code"))?;
        let code = code
            .as_u64()
            .and_then(|code| u32::try_from(code).ok())
            .ok_or_else(|| Error::WrongJsonType("error_code", "integer", code))?;
        let reason = body
            .get("message")
            .and_then(JsonValue::as_str)
            .unwrap_or_default();
        Ok(Self::new(code, reason))
    }

    pub fn code(&self) -> u32 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the subject or the schema asked for is unknown to the registry.
    pub fn is_not_found(&self) -> bool {
        matches!(self.code, Self::SUBJECT_NOT_FOUND | Self::SCHEMA_NOT_FOUND)
    }
}

fn describe(code: u32) -> &'static str {
    match code {
        RegistryError::SUBJECT_NOT_FOUND => "Subject not found",
        RegistryError::VERSION_NOT_FOUND => "Version not found",
        RegistryError::SCHEMA_NOT_FOUND => "Schema not found",
        RegistryError::INVALID_AVRO_SCHEMA => "Invalid Avro schema",
        RegistryError::INVALID_VERSION => "Invalid version",
        RegistryError::INVALID_COMPATIBILITY_LEVEL => "Invalid compatibility level",
        RegistryError::SERVER_ERROR => "Error in the backend datastore",
        RegistryError::SERVER_TIMEOUT => "Operation timed out",
        RegistryError::SERVER_MASTER_ERROR => "Error while forwarding the request to the master",
        _ => "unknown error",
    }
}
