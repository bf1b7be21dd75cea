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
    AvroResult, Error,
    error::Details,
    protocol::{Message, Protocol},
    schema::{Context, Name, Schema, parse_field, parse_union},
    util::MapHelper,
};
use log::debug;
use serde_json::{Map, Value, json};

/// Parses a protocol. Its types and messages share `context`, so a message can refer to any
/// type declared before it.
pub(crate) fn parse(value: &Value, context: &mut Context) -> AvroResult<Protocol> {
    let Value::Object(complex) = value else {
        return Err(Error::WrongJsonType("protocol", "object", value));
    };
    let name = parse_name(complex)?;
    debug!("Going to parse protocol: {name}");

    let mut protocol = Protocol::new(name);
    if let Some(doc) = complex.doc()? {
        protocol = protocol.with_doc(doc);
    }
    match complex.get("types") {
        None | Some(Value::Null) => {}
        Some(Value::Array(types)) => {
            for schema in types {
                protocol = protocol.with_type(Schema::parse_with_context(schema, context)?)?;
            }
        }
        Some(other) => return Err(Error::WrongJsonType("types", "array", other)),
    }
    match complex.get("messages") {
        None | Some(Value::Null) => {}
        Some(Value::Object(messages)) => {
            for (name, message) in messages {
                protocol = protocol.with_message(parse_message(name, message, context)?);
            }
        }
        Some(other) => return Err(Error::WrongJsonType("messages", "object", other)),
    }
    Ok(protocol)
}

fn parse_name(complex: &Map<String, Value>) -> AvroResult<Name> {
    let name = match complex.get("protocol") {
        None => return Err(Error::MissingField("protocol")),
        Some(Value::String(name)) => Name::new(name.as_str())?,
        Some(other) => return Err(Error::WrongJsonType("protocol", "string", other)),
    };
    match complex.get("namespace") {
        None | Some(Value::Null) => Ok(name),
        Some(Value::String(namespace)) => name.with_namespace(Some(namespace.as_str())),
        Some(other) => Err(Error::WrongJsonType("namespace", "string", other)),
    }
}

fn parse_message(name: &str, value: &Value, context: &mut Context) -> AvroResult<Message> {
    debug!("Going to parse message: {name}");
    let Value::Object(complex) = value else {
        return Err(Error::WrongJsonType(name, "object", value));
    };

    let request = match complex.get("request") {
        None => return Err(Error::MissingField("request")),
        Some(Value::Array(parameters)) => parameters
            .iter()
            .map(|parameter| parse_field(parameter, context))
            .collect::<AvroResult<Vec<_>>>()?,
        Some(other) => return Err(Error::WrongJsonType("request", "array", other)),
    };
    let response = match complex.get("response") {
        None | Some(Value::Null) => None,
        // a bare type name
        Some(Value::String(name)) => Some(Schema::parse_with_context(
            &json!({"type": name}),
            context,
        )?),
        Some(response) => Some(Schema::parse_with_context(response, context)?),
    };
    let errors = match complex.get("errors") {
        None | Some(Value::Null) => None,
        Some(errors) => Some(parse_union(errors, context)?),
    };
    let one_way = matches!(complex.get("one-way"), Some(Value::Bool(true)));

    let message = match response {
        Some(_) if one_way => return Err(Details::OneWayWithResponse.into()),
        Some(response) => Message::two_way(name, request, response, errors)?,
        None if errors.is_some() => return Err(Details::OneWayWithErrors.into()),
        None => Message::one_way(name, request)?,
    };
    Ok(match complex.doc()? {
        Some(doc) => message.with_doc(doc),
        None => message,
    })
}
