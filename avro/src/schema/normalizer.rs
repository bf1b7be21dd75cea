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

//! [`Schema`] to schema JSON.

use crate::schema::{
    ArraySchema, Context, EnumSchema, FixedSchema, LogicalType, MapSchema, Name, NamespaceRef,
    PrimitiveSchema, RecordField, RecordSchema, Schema, UnionSchema,
};
use serde_json::{Map, Value, json};

/// Converts `schema` to its JSON form.
///
/// With `canonical` set this is the [Parsing Canonical Form]: full names, no metadata and keys
/// in canonical order. Otherwise the output carries everything the schema holds, names are
/// written relative to the enclosing namespace and `namespace` is left out wherever it would be
/// inherited anyway. The enclosing namespace of the top level schema is the one of `context`.
///
/// [Parsing Canonical Form]:
/// https://avro.apache.org/docs/++version++/specification/#parsing-canonical-form-for-schemas
pub fn normalize(schema: &Schema, canonical: bool, context: Option<&Context>) -> Value {
    let namespace = context.and_then(Context::namespace);
    if canonical {
        canonical_form(schema)
    } else {
        full_form(schema, namespace)
    }
}

/// Converts a record field to its JSON form, as found in a record or a protocol message.
pub(crate) fn normalize_field(field: &RecordField, context: Option<&Context>) -> Value {
    field_form(field, context.and_then(Context::namespace))
}

fn full_form(schema: &Schema, namespace: NamespaceRef) -> Value {
    match schema {
        Schema::Primitive(PrimitiveSchema {
            kind,
            logical_type: None,
        }) => Value::String(kind.to_string()),
        Schema::Primitive(PrimitiveSchema {
            kind,
            logical_type: Some(logical_type),
        }) => {
            let mut object = Map::new();
            object.insert("type".into(), kind.to_string().into());
            insert_logical_type(&mut object, logical_type);
            Value::Object(object)
        }
        Schema::Record(record) => record_form(record, namespace),
        Schema::Enum(EnumSchema {
            name,
            symbols,
            doc,
            aliases,
        }) => {
            let mut object = named("enum", name, namespace);
            object.insert("symbols".into(), json!(symbols));
            if let Some(doc) = doc {
                object.insert("doc".into(), doc.as_str().into());
            }
            if let Some(aliases) = aliases {
                object.insert("aliases".into(), json!(aliases));
            }
            Value::Object(object)
        }
        Schema::Fixed(FixedSchema {
            name,
            size,
            aliases,
            logical_type,
        }) => {
            let mut object = named("fixed", name, namespace);
            object.insert("size".into(), (*size).into());
            if let Some(aliases) = aliases {
                object.insert("aliases".into(), json!(aliases));
            }
            if let Some(logical_type) = logical_type {
                insert_logical_type(&mut object, logical_type);
            }
            Value::Object(object)
        }
        Schema::Array(ArraySchema { items }) => {
            json!({"type": "array", "items": full_form(items, namespace)})
        }
        Schema::Map(MapSchema { values }) => {
            json!({"type": "map", "values": full_form(values, namespace)})
        }
        Schema::Union(UnionSchema { schemas }) => Value::Array(
            schemas
                .iter()
                .map(|schema| full_form(schema, namespace))
                .collect(),
        ),
        Schema::Ref { name } => Value::String(name.relative_to(namespace)),
    }
}

fn record_form(record: &RecordSchema, namespace: NamespaceRef) -> Value {
    let kind = if record.is_error { "error" } else { "record" };
    let mut object = named(kind, &record.name, namespace);
    if let Some(doc) = &record.doc {
        object.insert("doc".into(), doc.as_str().into());
    }
    if let Some(aliases) = &record.aliases {
        object.insert("aliases".into(), json!(aliases));
    }
    let inner = record.name.namespace();
    object.insert(
        "fields".into(),
        Value::Array(
            record
                .fields
                .iter()
                .map(|field| field_form(field, inner))
                .collect(),
        ),
    );
    Value::Object(object)
}

fn field_form(field: &RecordField, namespace: NamespaceRef) -> Value {
    let mut object = Map::new();
    object.insert("name".into(), field.name.as_str().into());
    object.insert("type".into(), full_form(&field.schema, namespace));
    if let Some(doc) = &field.doc {
        object.insert("doc".into(), doc.as_str().into());
    }
    if let Some(default) = &field.default {
        object.insert("default".into(), default.clone());
    }
    if let Some(order) = field.order {
        object.insert("order".into(), <&str>::from(order).into());
    }
    if let Some(aliases) = &field.aliases {
        object.insert("aliases".into(), json!(aliases));
    }
    Value::Object(object)
}

/// `type`, `name` and, when it is not inherited, `namespace`.
fn named(kind: &str, name: &Name, namespace: NamespaceRef) -> Map<String, Value> {
    let mut object = Map::new();
    object.insert("type".into(), kind.into());
    object.insert("name".into(), name.name().into());
    if name.namespace() != namespace {
        object.insert("namespace".into(), name.namespace().unwrap_or_default().into());
    }
    object
}

fn insert_logical_type(object: &mut Map<String, Value>, logical_type: &LogicalType) {
    object.insert("logicalType".into(), logical_type.name().into());
    object.extend(logical_type.attributes());
}

fn canonical_form(schema: &Schema) -> Value {
    match schema {
        Schema::Primitive(PrimitiveSchema { kind, .. }) => Value::String(kind.to_string()),
        Schema::Record(RecordSchema {
            name,
            is_error,
            fields,
            ..
        }) => {
            let fields = fields
                .iter()
                .map(|field| json!({"name": field.name, "type": canonical_form(&field.schema)}))
                .collect::<Vec<_>>();
            json!({
                "name": name.fullname(),
                "type": if *is_error { "error" } else { "record" },
                "fields": fields,
            })
        }
        Schema::Enum(EnumSchema { name, symbols, .. }) => {
            json!({"name": name.fullname(), "type": "enum", "symbols": symbols})
        }
        Schema::Fixed(FixedSchema { name, size, .. }) => {
            json!({"name": name.fullname(), "type": "fixed", "size": size})
        }
        Schema::Array(ArraySchema { items }) => {
            json!({"type": "array", "items": canonical_form(items)})
        }
        Schema::Map(MapSchema { values }) => {
            json!({"type": "map", "values": canonical_form(values)})
        }
        Schema::Union(UnionSchema { schemas }) => {
            Value::Array(schemas.iter().map(canonical_form).collect())
        }
        Schema::Ref { name } => Value::String(name.fullname().to_string()),
    }
}
