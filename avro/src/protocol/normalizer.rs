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
    protocol::{Message, Protocol},
    schema::{self, normalize_field},
};
use serde_json::{Map, Value};

/// Converts `protocol` to its JSON form.
pub fn normalize(protocol: &Protocol) -> Value {
    let mut object = Map::new();
    object.insert("protocol".into(), protocol.name.name().into());
    if let Some(namespace) = protocol.name.namespace() {
        object.insert("namespace".into(), namespace.into());
    }
    if let Some(doc) = &protocol.doc {
        object.insert("doc".into(), doc.as_str().into());
    }
    if !protocol.types().is_empty() {
        let types = protocol
            .types()
            .iter()
            .map(|schema| schema::normalize(schema, false, None))
            .collect();
        object.insert("types".into(), Value::Array(types));
    }
    if !protocol.messages().is_empty() {
        let messages = protocol
            .messages()
            .iter()
            .map(|message| (message.name.clone(), normalize_message(message)))
            .collect();
        object.insert("messages".into(), Value::Object(messages));
    }
    Value::Object(object)
}

fn normalize_message(message: &Message) -> Value {
    let mut object = Map::new();
    let request = message
        .request
        .iter()
        .map(|parameter| normalize_field(parameter, None))
        .collect();
    object.insert("request".into(), Value::Array(request));
    object.insert("one-way".into(), message.is_one_way().into());
    if let Some(doc) = &message.doc {
        object.insert("doc".into(), doc.as_str().into());
    }
    if let Some(response) = &message.response {
        object.insert("response".into(), schema::normalize(response, false, None));
    }
    if let Some(errors) = &message.errors {
        let errors = errors
            .variants()
            .iter()
            .map(|schema| schema::normalize(schema, false, None))
            .collect();
        object.insert("errors".into(), Value::Array(errors));
    }
    Value::Object(object)
}
