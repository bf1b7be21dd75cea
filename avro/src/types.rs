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

//! Logic handling the intermediate representation of Avro values.

use crate::schema::{NamesRef, PrimitiveType, RecordField, Schema};
use serde_json::Value as JsonValue;
use std::{collections::HashMap, hash::BuildHasher};
use strum_macros::EnumDiscriminants;

/// Represents any valid Avro value
/// More information about Avro values can be found in the
/// [Avro Specification](https://avro.apache.org/docs/++version++/specification/#schema-declaration)
///
/// A value decoded against a union is the value of the selected branch; there is no separate
/// union variant.
#[derive(Clone, Debug, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(ValueKind))]
pub enum Value {
    /// A `null` Avro value.
    Null,
    /// A `boolean` Avro value.
    Boolean(bool),
    /// A `int` Avro value.
    Int(i32),
    /// A `long` Avro value.
    Long(i64),
    /// A `float` Avro value.
    Float(f32),
    /// A `double` Avro value.
    Double(f64),
    /// A `bytes` Avro value.
    Bytes(Vec<u8>),
    /// A `string` Avro value.
    String(String),
    /// A `fixed` Avro value.
    /// The size of the fixed value is represented as a `usize`.
    Fixed(usize, Vec<u8>),
    /// An `enum` Avro value.
    ///
    /// An Enum is represented by a symbol and its position in the symbols list
    /// of its corresponding schema.
    /// This allows schema-less encoding, as well as schema resolution while
    /// reading values.
    Enum(u32, String),
    /// An `array` Avro value.
    Array(Vec<Value>),
    /// A `map` Avro value.
    Map(HashMap<String, Value>),
    /// A `record` Avro value.
    ///
    /// A Record is represented by a vector of (`<record name>`, `value`).
    /// This allows schema-less encoding.
    ///
    /// See [`Record`] for a more user-friendly support.
    Record(Vec<(String, Value)>),
}

macro_rules! to_value(
    ($type:ty, $variant_constructor:expr) => (
        impl From<$type> for Value {
            fn from(value: $type) -> Self {
                $variant_constructor(value)
            }
        }
    );
);

to_value!(bool, Value::Boolean);
to_value!(i32, Value::Int);
to_value!(i64, Value::Long);
to_value!(f32, Value::Float);
to_value!(f64, Value::Double);
to_value!(String, Value::String);
to_value!(Vec<u8>, Value::Bytes);

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Self::Null
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_owned())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Self>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<K, V, S> From<HashMap<K, V, S>> for Value
where
    K: Into<String>,
    V: Into<Self>,
    S: BuildHasher,
{
    fn from(value: HashMap<K, V, S>) -> Self {
        Self::Map(
            value
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Utility interface to build `Value::Record` objects.
#[derive(Debug, Clone)]
pub struct Record {
    /// List of fields contained in the record.
    /// Ordered according to the fields in the schema given to create this
    /// `Record` object. Any unset field defaults to `Value::Null`.
    pub fields: Vec<(String, Value)>,
}

impl Record {
    /// Create a `Record` with every field of `schema` set to `Value::Null`.
    ///
    /// Returns `None` when `schema` is not a record.
    pub fn new(schema: &Schema) -> Option<Record> {
        match schema {
            Schema::Record(record) => Some(Record {
                fields: record
                    .fields
                    .iter()
                    .map(|field| (field.name.clone(), Value::Null))
                    .collect(),
            }),
            _ => None,
        }
    }

    /// Put a compatible value (implementing the `Into<Value>` trait) in the
    /// `Record` for a given `field` name.
    ///
    /// **NOTE** Only ensure that the field name is present in the `Schema` given when creating
    /// this `Record`. Does not perform any schema validation.
    pub fn put<V>(&mut self, field: &str, value: V)
    where
        V: Into<Value>,
    {
        if let Some((_, slot)) = self.fields.iter_mut().find(|(name, _)| name == field) {
            *slot = value.into();
        }
    }

    /// Remove a field from the record.
    ///
    /// Removed fields are encoded using their default value, so a field without default
    /// cannot be removed before encoding.
    pub fn remove(&mut self, field: &str) {
        self.fields.retain(|(name, _)| name != field);
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Self::Record(value.fields)
    }
}

impl Value {
    /// Converts a JSON field default into a `Value` of `schema`.
    ///
    /// Follows the Avro rules for default values: a union default is a value of the first
    /// branch, `bytes` and `fixed` defaults are strings whose code points are the byte values
    /// and record defaults may omit fields that have their own default. Unions nested in a
    /// record, array or map default take a value of any of their branches.
    ///
    /// Returns `None` when the JSON does not describe a value of `schema`.
    pub fn from_json_default<'a>(
        json: &JsonValue,
        schema: &'a Schema,
        names: &NamesRef<'a>,
    ) -> Option<Value> {
        read_default(json, schema, names, false, &mut Vec::new())
    }
}

/// Reads a default, or a value nested in one when `nested` is set.
///
/// `expanding` are the fields whose own default is being read, so that a default that
/// omits a field of its own type does not expand forever.
fn read_default<'a>(
    json: &JsonValue,
    schema: &'a Schema,
    names: &NamesRef<'a>,
    nested: bool,
    expanding: &mut Vec<&'a RecordField>,
) -> Option<Value> {
    match (schema, json) {
        (Schema::Primitive(primitive), json) => match (primitive.kind, json) {
            (PrimitiveType::Null, JsonValue::Null) => Some(Value::Null),
            (PrimitiveType::Boolean, JsonValue::Bool(b)) => Some(Value::Boolean(*b)),
            (PrimitiveType::Int, JsonValue::Number(n)) => n
                .as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .map(Value::Int),
            (PrimitiveType::Long, JsonValue::Number(n)) => n.as_i64().map(Value::Long),
            (PrimitiveType::Float, JsonValue::Number(n)) => {
                n.as_f64().map(|n| Value::Float(n as f32))
            }
            (PrimitiveType::Double, JsonValue::Number(n)) => n.as_f64().map(Value::Double),
            (PrimitiveType::Bytes, JsonValue::String(s)) => {
                bytes_from_code_points(s).map(Value::Bytes)
            }
            (PrimitiveType::String, JsonValue::String(s)) => Some(Value::String(s.clone())),
            _ => None,
        },
        (Schema::Fixed(fixed), JsonValue::String(s)) => bytes_from_code_points(s)
            .filter(|bytes| bytes.len() == fixed.size)
            .map(|bytes| Value::Fixed(fixed.size, bytes)),
        (Schema::Enum(enum_schema), JsonValue::String(s)) => enum_schema
            .position(s)
            .map(|index| Value::Enum(index, s.clone())),
        (Schema::Array(array), JsonValue::Array(items)) => items
            .iter()
            .map(|item| read_default(item, &array.items, names, true, expanding))
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        (Schema::Map(map), JsonValue::Object(entries)) => entries
            .iter()
            .map(|(key, value)| {
                read_default(value, &map.values, names, true, expanding)
                    .map(|value| (key.clone(), value))
            })
            .collect::<Option<HashMap<_, _>>>()
            .map(Value::Map),
        (Schema::Record(record), JsonValue::Object(entries)) => record
            .fields
            .iter()
            .map(|field| {
                let value = match entries.get(&field.name) {
                    Some(json) => read_default(json, &field.schema, names, true, expanding)?,
                    None => {
                        let default = field.default.as_ref()?;
                        if expanding.iter().any(|f| std::ptr::eq(*f, field)) {
                            return None;
                        }
                        expanding.push(field);
                        let value = read_default(default, &field.schema, names, false, expanding);
                        expanding.pop();
                        value?
                    }
                };
                Some((field.name.clone(), value))
            })
            .collect::<Option<Vec<_>>>()
            .map(Value::Record),
        (Schema::Union(union), json) if nested => union
            .variants()
            .iter()
            .find_map(|variant| read_default(json, variant, names, true, expanding)),
        (Schema::Union(union), json) => union
            .variants()
            .first()
            .and_then(|first| read_default(json, first, names, false, expanding)),
        (Schema::Ref { name }, json) => names
            .get(name)
            .copied()
            .and_then(|schema| read_default(json, schema, names, nested, expanding)),
        _ => None,
    }
}

/// Avro writes `bytes` and `fixed` defaults as strings with one code point per byte.
fn bytes_from_code_points(s: &str) -> Option<Vec<u8>> {
    s.chars().map(|c| u8::try_from(c).ok()).collect()
}
