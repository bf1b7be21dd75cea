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

use avro_serde::{
    Error, MessageSerializer, ProtocolSerializer, Schema,
    error::Details,
    facade,
    protocol::Protocol,
    schema::{Name, RecordField, RecordSchema},
    types::Value,
};
use md5::{Digest, Md5};
use pretty_assertions::assert_eq;
use serde_json::json;

type TestResult = anyhow::Result<()>;

const MAIL: &str = r#"{
    "protocol": "Mail",
    "namespace": "org.example.mail",
    "doc": "Delivers messages",
    "types": [
        {"type": "record", "name": "Thread", "fields": [
            {"name": "subject", "type": "string"},
            {"name": "replies", "type": {"type": "array", "items": "Thread"}}
        ]},
        {"type": "enum", "name": "Status", "symbols": ["SENT", "BOUNCED"]},
        {"type": "error", "name": "Rejected", "fields": [{"name": "reason", "type": "string"}]}
    ],
    "messages": {
        "send": {
            "doc": "Sends a thread",
            "request": [
                {"name": "thread", "type": "Thread"},
                {"name": "urgent", "type": "boolean", "default": false}
            ],
            "response": "Status",
            "errors": ["Rejected"]
        },
        "ping": {"request": [], "one-way": true}
    }
}"#;

#[test]
fn parse_a_protocol() -> TestResult {
    let protocol = ProtocolSerializer::new().deserialize(MAIL)?;
    assert_eq!(protocol.name.fullname(), "org.example.mail.Mail");
    assert_eq!(protocol.hash(), Some(Md5::digest(MAIL.as_bytes()).as_slice()));
    assert_eq!(
        protocol
            .types()
            .iter()
            .filter_map(|schema| schema.name().map(Name::fullname))
            .collect::<Vec<_>>(),
        ["Thread", "Status", "Rejected"]
    );

    // the recursive type refers to itself
    let Some(Schema::Record(thread)) = protocol.get_type("Thread") else {
        panic!("Expected the Thread record");
    };
    assert_eq!(
        thread.fields[1].schema,
        Schema::array(Schema::Ref { name: Name::new("Thread")? })
    );

    let send = protocol.message("send").expect("send is declared");
    assert_eq!(send.doc.as_deref(), Some("Sends a thread"));
    assert_eq!(send.request.len(), 2);
    assert_eq!(send.response, Some(Schema::Ref { name: Name::new("Status")? }));
    assert_eq!(
        send.effective_errors()?.variants(),
        [Schema::string(), Schema::Ref { name: Name::new("Rejected")? }]
    );
    assert!(protocol.message("ping").expect("ping is declared").is_one_way());
    assert_eq!(protocol.names_ref()?.len(), 3);
    Ok(())
}

#[test]
fn dump_and_parse_agree() -> TestResult {
    let protocol = facade::parse_protocol(MAIL)?;
    let dumped = facade::dump_protocol(&protocol)?;
    let reparsed = facade::parse_protocol(&dumped)?;
    assert_eq!(reparsed.name, protocol.name);
    assert_eq!(reparsed.doc, protocol.doc);
    assert_eq!(reparsed.types(), protocol.types());
    assert_eq!(reparsed.messages(), protocol.messages());
    Ok(())
}

#[test]
fn built_protocols_dump_like_parsed_ones() -> TestResult {
    let protocol = Protocol::new(Name::new("org.example.Echo")?)
        .with_type(Schema::Record(
            RecordSchema::new(Name::new("Text")?)
                .with_field(RecordField::new("body", Schema::string())?)?,
        ))?
        .with_message(avro_serde::protocol::Message::two_way(
            "echo",
            vec![RecordField::new("text", Schema::Ref { name: Name::new("Text")? })?],
            Schema::Ref { name: Name::new("Text")? },
            None,
        )?);
    let dumped: serde_json::Value = serde_json::from_str(&facade::dump_protocol(&protocol)?)?;
    assert_eq!(
        dumped,
        json!({
            "protocol": "Echo",
            "namespace": "org.example",
            "types": [{"type": "record", "name": "Text", "fields": [{"name": "body", "type": "string"}]}],
            "messages": {
                "echo": {"request": [{"name": "text", "type": "Text"}], "one-way": false, "response": "Text"}
            }
        })
    );
    Ok(())
}

#[test]
fn one_way_messages_have_no_response() {
    let json = r#"{"protocol": "P", "messages": {"m": {"request": [], "response": "int", "one-way": true}}}"#;
    match facade::parse_protocol(json).map_err(Error::into_details) {
        Err(Details::OneWayWithResponse) => {}
        other => panic!("Expected Details::OneWayWithResponse, got {other:?}"),
    }
}

#[test]
fn undeclared_types_are_unresolved() {
    let json = r#"{"protocol": "P", "messages": {"m": {"request": [{"name": "a", "type": "Missing"}]}}}"#;
    match facade::parse_protocol(json).map_err(Error::into_details) {
        Err(Details::UnresolvedReference(name)) => assert_eq!(name, "Missing"),
        other => panic!("Expected Details::UnresolvedReference, got {other:?}"),
    }
}

#[test]
fn messages_encode_with_the_protocol_types() -> TestResult {
    let protocol = facade::parse_protocol(MAIL)?;
    let names = protocol.names_ref()?;
    let send = protocol.message("send").expect("send is declared");

    // the request parameters, each with its own schema
    let thread = Value::Record(vec![
        ("subject".into(), "hi".into()),
        ("replies".into(), Value::Array(vec![])),
    ]);
    let parameter = &send.request[0].schema;
    let bytes = facade::encode_message_with_names(parameter, &names, &thread)?;
    assert_eq!(bytes, [0x04, b'h', b'i', 0x00]);
    assert_eq!(facade::decode_message_with_names(&bytes, parameter, &names)?, thread);

    let response = send.response.as_ref().expect("send has a response");
    let bounced = Value::Enum(1, "BOUNCED".into());
    let serializer = MessageSerializer::new();
    let bytes = serializer.serialize_with_names(response, &names, &bounced)?;
    assert_eq!(bytes, [0x02]);
    assert_eq!(serializer.deserialize_with_names(&bytes, response, &names)?, bounced);

    let errors = Schema::Union(send.effective_errors()?);
    let rejected = Value::Record(vec![("reason".into(), "spam".into())]);
    let bytes = serializer.serialize_with_names(&errors, &names, &rejected)?;
    assert_eq!(bytes, [0x02, 0x08, b's', b'p', b'a', b'm']);
    assert_eq!(serializer.deserialize_with_names(&bytes, &errors, &names)?, rejected);

    // the response alone does not declare Status
    match facade::encode_message(response, &bounced).map_err(Error::into_details) {
        Err(Details::SchemaResolutionError(name)) => assert_eq!(name.fullname(), "Status"),
        other => panic!("Expected Details::SchemaResolutionError, got {other:?}"),
    }
    Ok(())
}
