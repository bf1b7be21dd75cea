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

//! Structural validation of a [`Value`] against a [`Schema`].
//!
//! Validation selects the branch a union value is encoded with and checks record field
//! defaults. It never fails: a value either fits a schema or it does not.

use crate::{
    schema::{NamesRef, PrimitiveType, RecordSchema, Schema},
    types::Value,
};
use std::collections::HashMap;

/// Whether `value` can be encoded with `schema`.
///
/// `names` resolves the [`Schema::Ref`]s found along the way. An unresolvable reference
/// never validates.
pub fn is_valid(value: &Value, schema: &Schema, names: &NamesRef<'_>) -> bool {
    match (schema, value) {
        (Schema::Primitive(primitive), value) => is_valid_primitive(value, primitive.kind),
        (Schema::Fixed(fixed), Value::Fixed(n, bytes)) => *n == fixed.size && bytes.len() == *n,
        (Schema::Fixed(fixed), Value::Bytes(bytes)) => bytes.len() == fixed.size,
        (Schema::Enum(enum_schema), Value::String(symbol) | Value::Enum(_, symbol)) => {
            enum_schema.position(symbol).is_some()
        }
        (Schema::Record(record), Value::Record(fields)) => is_valid_record(record, names, |name| {
            fields
                .iter()
                .find(|(field_name, _)| field_name == name)
                .map(|(_, value)| value)
        }),
        (Schema::Record(record), Value::Map(fields)) => {
            is_valid_record(record, names, |name| fields.get(name))
        }
        (Schema::Array(array), Value::Array(items)) => items
            .iter()
            .all(|item| is_valid(item, &array.items, names)),
        (Schema::Map(map), Value::Map(entries)) => is_valid_map(entries, &map.values, names),
        (Schema::Union(union), value) => union
            .variants()
            .iter()
            .any(|variant| is_valid(value, variant, names)),
        (Schema::Ref { name }, value) => names
            .get(name)
            .is_some_and(|schema| is_valid(value, schema, names)),
        _ => false,
    }
}

fn is_valid_primitive(value: &Value, kind: PrimitiveType) -> bool {
    match (kind, value) {
        (PrimitiveType::Null, Value::Null)
        | (PrimitiveType::Boolean, Value::Boolean(_))
        | (PrimitiveType::Int, Value::Int(_))
        | (PrimitiveType::Long, Value::Int(_) | Value::Long(_))
        | (PrimitiveType::Bytes, Value::Bytes(_))
        | (PrimitiveType::String, Value::String(_)) => true,
        (PrimitiveType::Int, Value::Long(n)) => i32::try_from(*n).is_ok(),
        (
            PrimitiveType::Float | PrimitiveType::Double,
            Value::Int(_) | Value::Long(_) | Value::Float(_) | Value::Double(_),
        ) => true,
        _ => false,
    }
}

fn is_valid_record<'v>(
    record: &RecordSchema,
    names: &NamesRef<'_>,
    lookup: impl Fn(&str) -> Option<&'v Value>,
) -> bool {
    record.fields.iter().all(|field| match lookup(&field.name) {
        Some(value) => is_valid(value, &field.schema, names),
        None => field.default.is_some(),
    })
}

fn is_valid_map(entries: &HashMap<String, Value>, values: &Schema, names: &NamesRef<'_>) -> bool {
    entries.values().all(|value| is_valid(value, values, names))
}
