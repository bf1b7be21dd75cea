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
    ByteReader, Error, Schema, SchemaSerializer,
    decode::decode_with_names,
    encode::{EncodeConfig, encode_with_names},
    error::Details,
    facade,
    schema::{Context, LogicalType, PrimitiveSchema, PrimitiveType, normalize},
    types::Value,
};
use md5::Md5;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;
use sha2::Sha256;

type TestResult = anyhow::Result<()>;

const ORDER: &str = r#"{
    "type": "record",
    "name": "Order",
    "namespace": "shop",
    "doc": "A placed order",
    "fields": [
        {"name": "id", "type": "long"},
        {"name": "customer", "type": {
            "type": "record",
            "name": "Customer",
            "fields": [{"name": "name", "type": "string"}]
        }},
        {"name": "referrer", "type": ["null", "Customer"], "default": null}
    ]
}"#;

#[test]
fn namespace_elision_round_trip() -> TestResult {
    let schema = Schema::parse_str(ORDER)?;

    let inside = normalize(&schema, false, Some(&Context::new().with_namespace("shop")));
    assert_eq!(inside.get("namespace"), None);
    let outside = normalize(&schema, false, Some(&Context::new().with_namespace("warehouse")));
    assert_eq!(outside["namespace"], json!("shop"));
    // the nested record inherits the namespace either way
    assert_eq!(outside["fields"][1]["type"].get("namespace"), None);

    let serializer = SchemaSerializer::new();
    for (json, namespace) in [(inside, "shop"), (outside, "warehouse")] {
        let mut context = Context::new().with_namespace(namespace);
        assert_eq!(
            serializer.deserialize_with_context(&json.to_string(), &mut context)?,
            schema
        );
    }
    Ok(())
}

#[test]
fn dump_and_parse_agree() -> TestResult {
    let serializer = SchemaSerializer::new();
    let schema = serializer.deserialize(ORDER)?;
    assert_eq!(serializer.deserialize(&serializer.serialize(&schema, false)?)?, schema);
    Ok(())
}

#[test]
fn references_resolve_to_the_named_type() -> TestResult {
    let schema = Schema::parse_str(ORDER)?;
    let Schema::Record(order) = &schema else {
        panic!("Expected a record, got {schema:?}");
    };
    let Schema::Union(referrer) = &order.fields[2].schema else {
        panic!("Expected a union, got {:?}", order.fields[2].schema);
    };
    match &referrer.variants()[1] {
        Schema::Ref { name } => assert_eq!(name.fullname(), "shop.Customer"),
        other => panic!("Expected a reference, got {other:?}"),
    }
    Ok(())
}

#[test]
fn schemas_parsed_with_a_shared_context_encode_with_its_names() -> TestResult {
    let serializer = SchemaSerializer::new();
    let mut context = Context::new();
    serializer.deserialize_with_context(r#"{"type": "fixed", "name": "Md5", "size": 2}"#, &mut context)?;
    let digests = serializer.deserialize_with_context(r#"{"type": "array", "items": "Md5"}"#, &mut context)?;
    let value = Value::Array(vec![Value::Fixed(2, vec![0xab, 0xcd])]);

    let names = context.names_ref();
    let mut bytes = Vec::new();
    encode_with_names(&value, &digests, &names, &EncodeConfig::default(), &mut bytes)?;
    assert_eq!(bytes, [0x02, 0xab, 0xcd, 0x00]);
    assert_eq!(decode_with_names(&digests, &names, &mut ByteReader::new(&bytes))?, value);
    assert_eq!(facade::encode_message_with_names(&digests, &names, &value)?, bytes);
    assert_eq!(facade::decode_message_with_names(&bytes, &digests, &names)?, value);

    // without the names of the context the reference dangles
    match facade::encode_message(&digests, &value).map_err(Error::into_details) {
        Err(Details::SchemaResolutionError(name)) => assert_eq!(name.fullname(), "Md5"),
        other => panic!("Expected Details::SchemaResolutionError, got {other:?}"),
    }
    Ok(())
}

#[rstest]
#[case(r#"["string", "string"]"#)]
#[case(r#"["null", ["int", "long"]]"#)]
#[case(r#"["int", {"type": "int", "logicalType": "date"}]"#)]
fn invalid_unions_are_rejected_when_parsed(#[case] json: &str) {
    match Schema::parse_str(json).map_err(Error::into_details) {
        Err(Details::GetUnionDuplicate(_) | Details::GetNestedUnion) => {}
        other => panic!("Expected an invalid union, got {other:?}"),
    }
}

#[test]
fn named_types_of_a_union_may_share_a_kind() -> TestResult {
    Schema::parse_str(
        r#"[
            {"type": "fixed", "name": "Small", "size": 2},
            {"type": "fixed", "name": "Large", "size": 16}
        ]"#,
    )?;
    Ok(())
}

#[test]
fn incompatible_logical_types_fall_back_to_the_base_type() -> TestResult {
    assert_eq!(
        Schema::parse_str(r#"{"type": "string", "logicalType": "date"}"#)?,
        Schema::string()
    );
    assert_eq!(
        Schema::parse_str(r#"{"type": "long", "logicalType": "timestamp-micros"}"#)?,
        Schema::timestamp_micros()
    );
    assert_eq!(
        Schema::parse_str(r#"{"type": "string", "logicalType": "uuid"}"#)?,
        Schema::Primitive(PrimitiveSchema {
            kind: PrimitiveType::String,
            logical_type: Some(LogicalType::custom("uuid", Default::default())),
        })
    );
    Ok(())
}

#[rstest]
#[case(r#""int""#, "ef524ea1b91e73173d938ade36c1db32", "3f2b87a9fe7cc9b13835598c3981cd45e3e355309e5090aa0933d7becb6fba45")]
#[case(
    r#"{"type": "record", "name": "Pair", "doc": "two longs", "fields": [
        {"name": "left", "type": "long", "default": 0},
        {"name": "right", "type": {"type": "long"}}
    ]}"#,
    "13c6b4215f7f1eb1a4f01b3a49cdd733",
    "bdb9f4e2a2215645e18c8270a819ae019c0bc0682861e30e99ecb396f3e4fb00"
)]
fn fingerprints(#[case] json: &str, #[case] md5: &str, #[case] sha256: &str) -> TestResult {
    let schema = Schema::parse_str(json)?;
    assert_eq!(schema.fingerprint::<Md5>().to_string(), md5);
    assert_eq!(schema.fingerprint::<Sha256>().to_string(), sha256);
    Ok(())
}
