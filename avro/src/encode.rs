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

//! The Avro binary encoding of a [`Value`].

use crate::{
    AvroResult,
    error::{Details, Error},
    schema::{
        ArraySchema, FixedSchema, MapSchema, NamesRef, PrimitiveType, RecordSchema,
        ResolvedSchema, Schema, SchemaKind,
    },
    types::{Value, ValueKind},
    util::{zig_i32, zig_i64},
};
use log::error;
use std::{collections::HashMap, io::Write};

/// Options of the encoder.
#[derive(bon::Builder, Clone, Debug, Default)]
pub struct EncodeConfig {
    /// The most items written per block of an array or map. With `0` every collection is
    /// written as a single block.
    #[builder(default)]
    pub max_block_size: usize,
}

/// Encode a `Value` into avro format.
///
/// The schema drives the encoding: a union is written with the first of its variants the
/// value is valid for and a record field missing from the value is written with its default.
pub fn encode<W: Write>(value: &Value, schema: &Schema, writer: &mut W) -> AvroResult<usize> {
    encode_with_config(value, schema, &EncodeConfig::default(), writer)
}

/// Like [`encode`], with explicit options.
pub fn encode_with_config<W: Write>(
    value: &Value,
    schema: &Schema,
    config: &EncodeConfig,
    writer: &mut W,
) -> AvroResult<usize> {
    encode_with_names(value, schema, &HashMap::new(), config, writer)
}

/// Like [`encode_with_config`], for a schema referring to named types declared elsewhere.
///
/// `names` are the types known besides those `schema` declares, e.g. the
/// [`Protocol::names_ref`](crate::Protocol::names_ref) of a protocol or the
/// [`Context::names_ref`](crate::schema::Context::names_ref) of a parse.
pub fn encode_with_names<W: Write>(
    value: &Value,
    schema: &Schema,
    names: &NamesRef<'_>,
    config: &EncodeConfig,
    writer: &mut W,
) -> AvroResult<usize> {
    let rs = ResolvedSchema::new_with_known_schemata(vec![schema], names)?;
    encode_internal(value, schema, rs.get_names(), config, writer)
}

pub fn encode_to_vec(value: &Value, schema: &Schema) -> AvroResult<Vec<u8>> {
    let mut buffer = Vec::new();
    encode(value, schema, &mut buffer)?;
    Ok(buffer)
}

pub(crate) fn encode_bytes<B: AsRef<[u8]> + ?Sized, W: Write>(
    s: &B,
    writer: &mut W,
) -> AvroResult<usize> {
    let bytes = s.as_ref();
    Ok(encode_long(bytes.len() as i64, &mut *writer)? + write_all(bytes, writer)?)
}

pub(crate) fn encode_long<W: Write>(i: i64, writer: W) -> AvroResult<usize> {
    zig_i64(i, writer)
}

pub(crate) fn encode_int<W: Write>(i: i32, writer: W) -> AvroResult<usize> {
    zig_i32(i, writer)
}

fn write_all<W: Write>(bytes: &[u8], writer: &mut W) -> AvroResult<usize> {
    writer.write_all(bytes).map_err(Details::WriteBytes)?;
    Ok(bytes.len())
}

pub(crate) fn encode_internal<W: Write>(
    value: &Value,
    schema: &Schema,
    names: &NamesRef<'_>,
    config: &EncodeConfig,
    writer: &mut W,
) -> AvroResult<usize> {
    match schema {
        Schema::Ref { name } => {
            let resolved = names
                .get(name)
                .ok_or_else(|| Details::SchemaResolutionError(name.clone()))?;
            encode_internal(value, resolved, names, config, writer)
        }
        Schema::Primitive(primitive) => encode_primitive(value, primitive.kind, schema, writer),
        Schema::Fixed(FixedSchema { size, .. }) => match value {
            Value::Fixed(_, bytes) | Value::Bytes(bytes) => {
                if bytes.len() != *size {
                    return Err(Details::CompareFixedSizes {
                        size: *size,
                        n: bytes.len(),
                    }
                    .into());
                }
                write_all(bytes, writer)
            }
            _ => Err(mismatch(value, schema)),
        },
        Schema::Enum(enum_schema) => match value {
            Value::String(symbol) | Value::Enum(_, symbol) => match enum_schema.position(symbol) {
                Some(index) => encode_long(i64::from(index), writer),
                None => {
                    error!("Invalid symbol string {symbol:?}.");
                    Err(Details::GetEnumSymbol(symbol.clone()).into())
                }
            },
            _ => Err(mismatch(value, schema)),
        },
        Schema::Record(record) => encode_record(value, record, schema, names, config, writer),
        Schema::Array(ArraySchema { items }) => match value {
            Value::Array(values) => encode_blocks(values.iter(), config, writer, |item, buffer| {
                encode_internal(item, items, names, config, buffer)
            }),
            _ => Err(mismatch(value, schema)),
        },
        // a map is an array of key/value pairs
        Schema::Map(MapSchema { values }) => match value {
            Value::Map(entries) => {
                encode_blocks(entries.iter(), config, writer, |(key, value), buffer| {
                    Ok(encode_bytes(key, buffer)?
                        + encode_internal(value, values, names, config, buffer)?)
                })
            }
            _ => Err(mismatch(value, schema)),
        },
        Schema::Union(union) => match union.find_schema(value, names) {
            Some((index, variant)) => Ok(encode_long(index as i64, &mut *writer)?
                + encode_internal(value, variant, names, config, writer)?),
            None => {
                error!("No variant of union {schema:?} matches {value:?}");
                Err(Details::FindUnionVariant(ValueKind::from(value)).into())
            }
        },
    }
}

fn encode_primitive<W: Write>(
    value: &Value,
    kind: PrimitiveType,
    schema: &Schema,
    writer: &mut W,
) -> AvroResult<usize> {
    match (kind, value) {
        (PrimitiveType::Null, Value::Null) => Ok(0),
        (PrimitiveType::Boolean, Value::Boolean(b)) => write_all(&[u8::from(*b)], writer),
        (PrimitiveType::Int, Value::Int(i)) => encode_int(*i, writer),
        (PrimitiveType::Int, Value::Long(i)) => {
            let i = i32::try_from(*i).map_err(|_| Details::IntOutOfRange(*i))?;
            encode_int(i, writer)
        }
        (PrimitiveType::Long, Value::Int(i)) => encode_long(i64::from(*i), writer),
        (PrimitiveType::Long, Value::Long(i)) => encode_long(*i, writer),
        (PrimitiveType::Float, _) => match as_f64(value) {
            Some(x) => write_all(&(x as f32).to_le_bytes(), writer),
            None => Err(mismatch(value, schema)),
        },
        (PrimitiveType::Double, _) => match as_f64(value) {
            Some(x) => write_all(&x.to_le_bytes(), writer),
            None => Err(mismatch(value, schema)),
        },
        (PrimitiveType::Bytes, Value::Bytes(bytes)) => encode_bytes(bytes, writer),
        (PrimitiveType::String, Value::String(s)) => encode_bytes(s, writer),
        _ => Err(mismatch(value, schema)),
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Int(x) => Some(f64::from(*x)),
        Value::Long(x) => Some(*x as f64),
        Value::Float(x) => Some(f64::from(*x)),
        Value::Double(x) => Some(*x),
        _ => None,
    }
}

fn encode_record<W: Write>(
    value: &Value,
    record: &RecordSchema,
    schema: &Schema,
    names: &NamesRef<'_>,
    config: &EncodeConfig,
    writer: &mut W,
) -> AvroResult<usize> {
    let lookup: HashMap<&str, &Value> = match value {
        Value::Record(fields) => fields.iter().map(|(n, v)| (n.as_str(), v)).collect(),
        Value::Map(fields) => fields.iter().map(|(n, v)| (n.as_str(), v)).collect(),
        _ => return Err(mismatch(value, schema)),
    };

    let mut written_bytes = 0;
    for field in &record.fields {
        let value = lookup.get(field.name.as_str()).copied().or_else(|| {
            field
                .aliases
                .iter()
                .flatten()
                .find_map(|alias| lookup.get(alias.as_str()).copied())
        });
        written_bytes += match value {
            Some(value) => encode_internal(value, &field.schema, names, config, writer)?,
            None => match field.default_value(names) {
                Some(default) => encode_internal(&default, &field.schema, names, config, writer)?,
                None => {
                    error!("Field {} of record {} has no value", field.name, record.name);
                    return Err(Details::MissingRecordField(field.name.clone()).into());
                }
            },
        };
    }
    Ok(written_bytes)
}

/// Writes `items` as blocks of at most `max_block_size` items, each one prefixed with its
/// negated item count and its size in bytes, followed by an empty block.
fn encode_blocks<I, W, F>(
    items: I,
    config: &EncodeConfig,
    writer: &mut W,
    mut encode_item: F,
) -> AvroResult<usize>
where
    I: ExactSizeIterator,
    W: Write,
    F: FnMut(I::Item, &mut Vec<u8>) -> AvroResult<usize>,
{
    let block_size = match config.max_block_size {
        0 => items.len().max(1),
        n => n,
    };
    let mut items = items.peekable();
    let mut buffer = Vec::new();
    let mut written_bytes = 0;
    while items.peek().is_some() {
        buffer.clear();
        let mut count = 0i64;
        for item in items.by_ref().take(block_size) {
            encode_item(item, &mut buffer)?;
            count += 1;
        }
        written_bytes += encode_long(-count, &mut *writer)?;
        written_bytes += encode_long(buffer.len() as i64, &mut *writer)?;
        written_bytes += write_all(&buffer, writer)?;
    }
    Ok(written_bytes + encode_long(0, writer)?)
}

fn mismatch(value: &Value, schema: &Schema) -> Error {
    let supported_schema = match schema.primitive_type() {
        Some(kind) => kind.to_string(),
        None => format!("{:?}", SchemaKind::from(schema)),
    };
    error!("Invalid value {value:?} for schema {supported_schema}");
    Details::EncodeValueAsSchemaError {
        value_kind: ValueKind::from(value),
        supported_schema,
    }
    .into()
}
