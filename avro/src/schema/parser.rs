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

//! Schema JSON to [`Schema`].

use crate::error::Details;
use crate::schema::{
    Context, EnumSchema, FixedSchema, LogicalType, Name, PrimitiveSchema, PrimitiveType,
    RecordField, RecordFieldOrder, RecordSchema, Schema, UnionSchema,
};
use crate::util::MapHelper;
use crate::{AvroResult, Error};
use log::debug;
use serde_json::{Map, Value};
use std::str::FromStr;

/// Parses `value` as any schema.
pub(crate) fn parse(value: &Value, context: &mut Context) -> AvroResult<Schema> {
    with_parser(context, |parser| parser.parse(value))
}

/// Parses `value` as a record field.
pub(crate) fn parse_field(value: &Value, context: &mut Context) -> AvroResult<RecordField> {
    with_parser(context, |parser| parser.parse_field(value))
}

/// Parses `value` as a union, as found in the `errors` of a protocol message.
pub(crate) fn parse_union(value: &Value, context: &mut Context) -> AvroResult<UnionSchema> {
    match value {
        Value::Array(items) => with_parser(context, |parser| parser.parse_union(items)),
        other => Err(Error::WrongJsonType("errors", "array", other)),
    }
}

/// Runs `parse`, then checks the field defaults it met against the completed named types.
fn with_parser<T>(
    context: &mut Context,
    parse: impl FnOnce(&mut Parser<'_>) -> AvroResult<T>,
) -> AvroResult<T> {
    let mut defaults = Vec::new();
    let parsed = parse(&mut Parser {
        context: &mut *context,
        defaults: &mut defaults,
    })?;
    let names = context.names_ref();
    for field in &defaults {
        field.check_default(&names)?;
    }
    Ok(parsed)
}

struct Parser<'c> {
    context: &'c mut Context,
    /// Fields with a default, which may refer to a record still being parsed.
    defaults: &'c mut Vec<RecordField>,
}

impl Parser<'_> {
    /// Create a `Schema` from a `serde_json::Value` representing a JSON Avro schema.
    fn parse(&mut self, value: &Value) -> AvroResult<Schema> {
        match value {
            Value::String(name) => self.parse_known_schema(name),
            Value::Object(complex) => self.parse_complex(complex),
            Value::Array(items) => self.parse_union(items).map(Schema::Union),
            other => Err(Error::WrongJsonType("type", "string, object or array", other)),
        }
    }

    /// Parse a string as a primitive type or a reference to a declared named type.
    fn parse_known_schema(&mut self, name: &str) -> AvroResult<Schema> {
        match PrimitiveType::from_str(name) {
            Ok(kind) => Ok(Schema::primitive(kind)),
            Err(_) => self.fetch_schema_ref(name),
        }
    }

    /// Resolves `name` against the enclosing namespace and looks it up.
    fn fetch_schema_ref(&mut self, name: &str) -> AvroResult<Schema> {
        let name = Name::new_with_enclosing_namespace(name, self.context.namespace())?;
        self.context
            .get_reference(&name)
            .ok_or_else(|| Details::UnresolvedReference(name.fullname().to_string()).into())
    }

    fn parse_complex(&mut self, complex: &Map<String, Value>) -> AvroResult<Schema> {
        match complex.get("type") {
            None => Err(Error::MissingField("type")),
            Some(Value::String(kind)) => match kind.as_str() {
                "record" => self.parse_record(complex, false),
                "error" => self.parse_record(complex, true),
                "enum" => self.parse_enum(complex),
                "fixed" => self.parse_fixed(complex),
                "array" => self.parse_array(complex),
                "map" => self.parse_map(complex),
                other => match PrimitiveType::from_str(other) {
                    Ok(kind) => self.parse_primitive(complex, kind),
                    Err(_) => self.fetch_schema_ref(other),
                },
            },
            // `{"type": {...}}` and `{"type": [...]}` wrap another schema
            Some(nested @ (Value::Object(_) | Value::Array(_))) => self.parse(nested),
            Some(other) => Err(Error::WrongJsonType("type", "string, object or array", other)),
        }
    }

    fn parse_primitive(
        &mut self,
        complex: &Map<String, Value>,
        kind: PrimitiveType,
    ) -> AvroResult<Schema> {
        Ok(Schema::Primitive(PrimitiveSchema {
            kind,
            logical_type: LogicalType::parse_for_primitive(complex, kind)?,
        }))
    }

    fn parse_record(&mut self, complex: &Map<String, Value>, is_error: bool) -> AvroResult<Schema> {
        let name = Name::parse(complex, self.context.namespace())?;
        debug!("Going to parse record schema: {name}");

        let fields = match complex.get("fields") {
            None => return Err(Error::MissingField("fields")),
            Some(Value::Array(fields)) => fields,
            Some(other) => return Err(Error::WrongJsonType("fields", "array", other)),
        };
        let mut record = if is_error {
            RecordSchema::error(name.clone())
        } else {
            RecordSchema::new(name.clone())
        };
        if let Some(doc) = complex.doc()? {
            record = record.with_doc(doc);
        }
        if let Some(aliases) = complex.aliases()? {
            record = record.with_aliases(aliases);
        }

        let namespace = name.namespace().map(str::to_string);
        let defaults = &mut *self.defaults;
        self.context.create_reference(&name, |context| {
            context.in_namespace(namespace, |context| {
                let mut parser = Parser { context, defaults };
                fields
                    .iter()
                    .try_fold(record, |record, field| {
                        record.with_field(parser.parse_field(field)?)
                    })
                    .map(Schema::Record)
            })
        })
    }

    fn parse_field(&mut self, value: &Value) -> AvroResult<RecordField> {
        let field = match value {
            Value::Object(field) => field,
            other => return Err(Error::WrongJsonType("fields", "object", other)),
        };
        let name = match field.get("name") {
            None => return Err(Error::MissingField("name")),
            Some(Value::String(name)) => name,
            Some(other) => return Err(Error::WrongJsonType("name", "string", other)),
        };
        let schema = match field.get("type") {
            None => return Err(Error::MissingField("type")),
            Some(schema) => self.parse(schema)?,
        };

        let mut record_field = RecordField::new(name.as_str(), schema)?;
        if let Some(doc) = field.doc()? {
            record_field = record_field.with_doc(doc);
        }
        if let Some(default) = field.get("default") {
            record_field = record_field.with_unchecked_default(default.clone());
            self.defaults.push(record_field.clone());
        }
        if let Some(order) = field.get("order") {
            let parsed = order
                .as_str()
                .and_then(|order| RecordFieldOrder::from_str(order).ok())
                .ok_or_else(|| Details::InvalidOrder {
                    field: name.clone(),
                    order: order.clone(),
                })?;
            record_field = record_field.with_order(parsed);
        }
        if let Some(aliases) = field.aliases()? {
            record_field = record_field.with_aliases(aliases);
        }
        Ok(record_field)
    }

    fn parse_enum(&mut self, complex: &Map<String, Value>) -> AvroResult<Schema> {
        let name = Name::parse(complex, self.context.namespace())?;
        debug!("Going to parse enum schema: {name}");

        let symbols = match complex.get("symbols") {
            None => return Err(Error::MissingField("symbols")),
            Some(symbols) => symbols
                .as_array()
                .and_then(|symbols| {
                    symbols
                        .iter()
                        .map(|symbol| symbol.as_str().map(str::to_string))
                        .collect::<Option<Vec<_>>>()
                })
                .ok_or_else(|| Error::WrongJsonType("symbols", "array of strings", symbols))?,
        };
        let mut schema = EnumSchema::new(name.clone(), symbols)?;
        if let Some(doc) = complex.doc()? {
            schema = schema.with_doc(doc);
        }
        if let Some(aliases) = complex.aliases()? {
            schema = schema.with_aliases(aliases);
        }
        self.context
            .create_reference(&name, |_| Ok(Schema::Enum(schema)))
    }

    fn parse_fixed(&mut self, complex: &Map<String, Value>) -> AvroResult<Schema> {
        let name = Name::parse(complex, self.context.namespace())?;
        debug!("Going to parse fixed schema: {name}");

        let logical_type = LogicalType::parse_for_fixed(complex)?;
        let mut schema = if logical_type == Some(LogicalType::Duration) {
            // the size of a duration is implied
            FixedSchema::duration(name.clone())
        } else {
            let size = match complex.get("size") {
                None => return Err(Error::MissingField("size")),
                Some(size) => size
                    .as_u64()
                    .and_then(|size| usize::try_from(size).ok())
                    .ok_or_else(|| Error::WrongJsonType("size", "non-negative integer", size))?,
            };
            let fixed = FixedSchema::new(name.clone(), size);
            match logical_type {
                Some(logical_type) => fixed.with_logical_type(logical_type)?,
                None => fixed,
            }
        };
        if let Some(aliases) = complex.aliases()? {
            schema = schema.with_aliases(aliases);
        }
        self.context
            .create_reference(&name, |_| Ok(Schema::Fixed(schema)))
    }

    fn parse_array(&mut self, complex: &Map<String, Value>) -> AvroResult<Schema> {
        match complex.get("items") {
            None => Err(Error::MissingField("items")),
            Some(items) => self.parse(items).map(Schema::array),
        }
    }

    fn parse_map(&mut self, complex: &Map<String, Value>) -> AvroResult<Schema> {
        match complex.get("values") {
            None => Err(Error::MissingField("values")),
            Some(values) => self.parse(values).map(Schema::map),
        }
    }

    fn parse_union(&mut self, items: &[Value]) -> AvroResult<UnionSchema> {
        items
            .iter()
            .map(|item| self.parse(item))
            .collect::<AvroResult<Vec<_>>>()
            .and_then(UnionSchema::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TestResult;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn parse_json(json: Value) -> AvroResult<Schema> {
        parse(&json, &mut Context::new())
    }

    fn expect_details(result: AvroResult<Schema>) -> Details {
        match result {
            Ok(schema) => panic!("Expected an error, got {schema:?}"),
            Err(e) => e.into_details(),
        }
    }

    #[test]
    fn record_with_defaults() -> TestResult {
        let schema = parse_json(json!({
            "type": "record",
            "name": "Test",
            "namespace": "ns",
            "doc": "A test",
            "fields": [
                {"name": "a", "type": "long", "default": 42},
                {"name": "b", "type": {"type": "string"}, "order": "descending", "aliases": ["bee"]},
                {"name": "c", "type": ["null", "int"], "default": null}
            ]
        }))?;
        let expected = RecordSchema::new(Name::new("ns.Test")?)
            .with_doc("A test")
            .with_fields(vec![
                RecordField::new("a", Schema::long())?.with_default(json!(42))?,
                RecordField::new("b", Schema::string())?
                    .with_order(RecordFieldOrder::Descending)
                    .with_aliases(vec!["bee".to_string()]),
                RecordField::new(
                    "c",
                    Schema::Union(UnionSchema::new(vec![Schema::null(), Schema::int()])?),
                )?
                .with_default(json!(null))?,
            ])?;
        assert_eq!(schema, Schema::Record(expected));
        Ok(())
    }

    #[test]
    fn error_records_keep_their_flag() -> TestResult {
        match parse_json(json!({"type": "error", "name": "Oops", "fields": []}))? {
            Schema::Record(record) => assert!(record.is_error),
            other => panic!("Expected a record, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn self_reference_is_resolved() -> TestResult {
        let mut context = Context::new();
        let schema = parse(
            &json!({
                "type": "record",
                "name": "LongList",
                "fields": [
                    {"name": "value", "type": "long"},
                    {"name": "next", "type": ["null", "LongList"], "default": null}
                ]
            }),
            &mut context,
        )?;
        let name = Name::new("LongList")?;
        let Schema::Record(record) = &schema else {
            panic!("Expected a record, got {schema:?}");
        };
        assert_eq!(
            record.fields[1].schema,
            Schema::Union(UnionSchema::new(vec![
                Schema::null(),
                Schema::Ref { name: name.clone() }
            ])?)
        );
        assert_eq!(context.repository().resolve(&name), Some(&schema));
        Ok(())
    }

    #[test]
    fn nested_types_inherit_the_namespace() -> TestResult {
        let mut context = Context::new();
        parse(
            &json!({
                "type": "record",
                "name": "Outer",
                "namespace": "space",
                "fields": [
                    {"name": "inner", "type": {"type": "fixed", "name": "Inner", "size": 4}},
                    {"name": "again", "type": "Inner"},
                    {"name": "global", "type": {"type": "enum", "name": "E", "namespace": "", "symbols": ["X"]}},
                    {"name": "global_again", "type": ".E"}
                ]
            }),
            &mut context,
        )?;
        let names = context.into_names();
        assert!(names.contains_key(&Name::new("space.Outer")?));
        assert!(names.contains_key(&Name::new("space.Inner")?));
        assert!(names.contains_key(&Name::new("E")?));
        Ok(())
    }

    #[test]
    fn unresolved_reference() {
        match expect_details(parse_json(json!({
            "type": "record",
            "name": "R",
            "namespace": "ns",
            "fields": [{"name": "a", "type": "Missing"}]
        }))) {
            Details::UnresolvedReference(name) => assert_eq!(name, "ns.Missing"),
            other => panic!("Expected Details::UnresolvedReference, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_names_collide() {
        match expect_details(parse_json(json!([
            {"type": "fixed", "name": "F", "size": 1},
            {"type": "fixed", "name": "F", "size": 2}
        ]))) {
            Details::NameCollision(name) => assert_eq!(name, "F"),
            other => panic!("Expected Details::NameCollision, got {other:?}"),
        }
    }

    #[rstest]
    #[case(json!({"type": "record", "fields": []}), "name")]
    #[case(json!({"type": "record", "name": "R"}), "fields")]
    #[case(json!({"type": "record", "name": "R", "fields": [{"type": "int"}]}), "name")]
    #[case(json!({"type": "record", "name": "R", "fields": [{"name": "a"}]}), "type")]
    #[case(json!({"type": "enum", "name": "E"}), "symbols")]
    #[case(json!({"type": "fixed", "name": "F"}), "size")]
    #[case(json!({"type": "array"}), "items")]
    #[case(json!({"type": "map"}), "values")]
    #[case(json!({"name": "nothing"}), "type")]
    fn missing_fields(#[case] json: Value, #[case] expected: &str) {
        match expect_details(parse_json(json)) {
            Details::MissingField(field) => assert_eq!(field, expected),
            other => panic!("Expected Details::MissingField, got {other:?}"),
        }
    }

    #[rstest]
    #[case(json!({"type": "record", "name": "R", "fields": {}}), "fields")]
    #[case(json!({"type": "enum", "name": "E", "symbols": [1, 2]}), "symbols")]
    #[case(json!({"type": "fixed", "name": "F", "size": "16"}), "size")]
    #[case(json!({"type": "fixed", "name": "F", "size": 1, "aliases": "G"}), "aliases")]
    #[case(json!({"type": 3}), "type")]
    #[case(json!(12), "type")]
    fn wrong_json_types(#[case] json: Value, #[case] expected: &str) {
        match expect_details(parse_json(json)) {
            Details::WrongJsonType { field, .. } => assert_eq!(field, expected),
            other => panic!("Expected Details::WrongJsonType, got {other:?}"),
        }
    }

    #[test]
    fn invalid_default_and_order() {
        match expect_details(parse_json(json!({
            "type": "record", "name": "R",
            "fields": [{"name": "a", "type": "int", "default": "nope"}]
        }))) {
            Details::InvalidDefault { field, default } => {
                assert_eq!(field, "a");
                assert_eq!(default, json!("nope"));
            }
            other => panic!("Expected Details::InvalidDefault, got {other:?}"),
        }
        match expect_details(parse_json(json!({
            "type": "record", "name": "R",
            "fields": [{"name": "a", "type": "int", "order": "random"}]
        }))) {
            Details::InvalidOrder { field, order } => {
                assert_eq!(field, "a");
                assert_eq!(order, json!("random"));
            }
            other => panic!("Expected Details::InvalidOrder, got {other:?}"),
        }
    }

    #[test]
    fn default_of_a_named_type_declared_earlier() -> TestResult {
        let schema = parse_json(json!({
            "type": "record", "name": "R",
            "fields": [
                {"name": "suit", "type": {"type": "enum", "name": "Suit", "symbols": ["SPADES", "HEARTS"]}},
                {"name": "favourite", "type": "Suit", "default": "HEARTS"}
            ]
        }))?;
        let Schema::Record(record) = schema else {
            panic!("Expected a record");
        };
        assert_eq!(record.fields[1].default, Some(json!("HEARTS")));
        Ok(())
    }

    #[test]
    fn logical_types() -> TestResult {
        assert_eq!(
            parse_json(json!({"type": "int", "logicalType": "date"}))?,
            Schema::date()
        );
        assert_eq!(
            parse_json(json!({"type": "bytes", "logicalType": "decimal", "precision": 4, "scale": 2}))?,
            Schema::decimal(4, 2)?
        );
        // incompatible base type: the annotation is dropped
        assert_eq!(
            parse_json(json!({"type": "string", "logicalType": "date"}))?,
            Schema::string()
        );
        match parse_json(json!({"type": "fixed", "name": "D", "logicalType": "duration"}))? {
            Schema::Fixed(fixed) => {
                assert_eq!(fixed.size, 12);
                assert_eq!(fixed.logical_type, Some(LogicalType::Duration));
            }
            other => panic!("Expected a fixed, got {other:?}"),
        }
        match expect_details(parse_json(
            json!({"type": "bytes", "logicalType": "decimal", "precision": 2, "scale": 3}),
        )) {
            Details::DecimalPrecisionLessThanScale { .. } => {}
            other => panic!("Expected Details::DecimalPrecisionLessThanScale, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn defaults_may_refer_to_the_enclosing_record() -> TestResult {
        let schema = parse_json(json!({
            "type": "record", "name": "Node",
            "fields": [
                {"name": "value", "type": "int"},
                {"name": "next", "type": ["Node", "null"], "default": {"value": 0, "next": null}}
            ]
        }))?;
        let Schema::Record(node) = &schema else {
            panic!("Expected a record, got {schema:?}");
        };
        assert_eq!(node.fields[1].default, Some(json!({"value": 0, "next": null})));

        // the omitted field would take this very default again
        match expect_details(parse_json(json!({
            "type": "record", "name": "Node",
            "fields": [
                {"name": "value", "type": "int"},
                {"name": "next", "type": ["Node", "null"], "default": {"value": 0}}
            ]
        }))) {
            Details::InvalidDefault { field, .. } => assert_eq!(field, "next"),
            other => panic!("Expected Details::InvalidDefault, got {other:?}"),
        }
        Ok(())
    }
}
