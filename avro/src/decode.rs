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

//! Reading [`Value`]s from the Avro binary encoding.

use crate::{
    AvroResult, Error,
    bytes::ByteReader,
    error::Details,
    schema::{
        ArraySchema, EnumSchema, FixedSchema, MapSchema, NamesRef, PrimitiveType, RecordSchema,
        ResolvedSchema, Schema, UnionSchema,
    },
    types::Value,
    util::{safe_len, zag_i32, zag_i64},
};
use log::warn;
use std::collections::HashMap;

/// Decode a `Value` encoded in Avro format given its `Schema` and a reader of the bytes.
///
/// A value decoded with a union schema is the value of the selected variant.
pub fn decode(schema: &Schema, reader: &mut ByteReader<'_>) -> AvroResult<Value> {
    decode_with_names(schema, &HashMap::new(), reader)
}

/// Like [`decode`], for a schema referring to named types declared elsewhere.
pub fn decode_with_names(
    schema: &Schema,
    names: &NamesRef<'_>,
    reader: &mut ByteReader<'_>,
) -> AvroResult<Value> {
    let rs = ResolvedSchema::new_with_known_schemata(vec![schema], names)?;
    decode_internal(schema, rs.get_names(), reader)
}

/// Decodes the value at the start of `bytes`. Bytes left over after it are ignored.
pub fn decode_slice(schema: &Schema, bytes: &[u8]) -> AvroResult<Value> {
    decode(schema, &mut ByteReader::new(bytes))
}

pub(crate) fn decode_internal(
    schema: &Schema,
    names: &NamesRef<'_>,
    reader: &mut ByteReader<'_>,
) -> AvroResult<Value> {
    match schema {
        Schema::Primitive(primitive) => decode_primitive(primitive.kind, reader),
        Schema::Fixed(FixedSchema { size, .. }) => {
            let bytes = reader.read(*size)?;
            Ok(Value::Fixed(*size, bytes.to_vec()))
        }
        Schema::Enum(EnumSchema { symbols, .. }) => {
            let index = zag_i64(reader)?;
            let symbol = usize::try_from(index)
                .ok()
                .and_then(|i| symbols.get(i))
                .ok_or(Details::GetEnumValue {
                    index,
                    nsymbols: symbols.len(),
                })?;
            // the symbol was found, so the index fits
            Ok(Value::Enum(index as u32, symbol.clone()))
        }
        Schema::Record(record) => decode_record(record, names, reader),
        Schema::Array(ArraySchema { items }) => {
            let mut values = Vec::new();
            decode_blocks(reader, |count, reader| {
                values.reserve(count.min(reader.remaining()));
                for _ in 0..count {
                    values.push(decode_internal(items, names, reader)?);
                }
                Ok(())
            })?;
            Ok(Value::Array(values))
        }
        Schema::Map(MapSchema { values }) => {
            let mut entries = HashMap::new();
            decode_blocks(reader, |count, reader| {
                entries.reserve(count.min(reader.remaining()));
                for _ in 0..count {
                    let key = decode_string(reader)?;
                    entries.insert(key, decode_internal(values, names, reader)?);
                }
                Ok(())
            })?;
            Ok(Value::Map(entries))
        }
        Schema::Union(UnionSchema { schemas }) => {
            let index = zag_i64(reader)?;
            let variant = usize::try_from(index)
                .ok()
                .and_then(|i| schemas.get(i))
                .ok_or(Details::GetUnionVariant {
                    index,
                    num_variants: schemas.len(),
                })?;
            decode_internal(variant, names, reader)
        }
        Schema::Ref { name } => {
            let resolved = names
                .get(name)
                .ok_or_else(|| Details::SchemaResolutionError(name.clone()))?;
            decode_internal(resolved, names, reader)
        }
    }
}

fn decode_primitive(kind: PrimitiveType, reader: &mut ByteReader<'_>) -> AvroResult<Value> {
    Ok(match kind {
        PrimitiveType::Null => Value::Null,
        PrimitiveType::Boolean => match reader.read_byte()? {
            0 => Value::Boolean(false),
            1 => Value::Boolean(true),
            byte => return Err(Error::BoolValue(byte)),
        },
        PrimitiveType::Int => Value::Int(zag_i32(reader)?),
        PrimitiveType::Long => Value::Long(zag_i64(reader)?),
        PrimitiveType::Float => Value::Float(f32::from_le_bytes(reader.read_array()?)),
        PrimitiveType::Double => Value::Double(f64::from_le_bytes(reader.read_array()?)),
        PrimitiveType::Bytes => Value::Bytes(decode_bytes(reader)?.to_vec()),
        PrimitiveType::String => Value::String(decode_string(reader)?),
    })
}

fn decode_len(reader: &mut ByteReader<'_>) -> AvroResult<usize> {
    let len = zag_i64(reader)?;
    let len = usize::try_from(len).map_err(|e| Details::ConvertLengthToUsize(e, len))?;
    safe_len(len)
}

fn decode_bytes<'a>(reader: &mut ByteReader<'a>) -> AvroResult<&'a [u8]> {
    let len = decode_len(reader)?;
    reader.read(len)
}

fn decode_string(reader: &mut ByteReader<'_>) -> AvroResult<String> {
    let bytes = decode_bytes(reader)?;
    String::from_utf8(bytes.to_vec()).map_err(|e| Details::ConvertToUtf8(e).into())
}

/// Reads blocks until the empty one, handing the item count of each to `read_items`.
///
/// A negative count is followed by the size of the block in bytes, which is skipped.
fn decode_blocks<'a>(
    reader: &mut ByteReader<'a>,
    mut read_items: impl FnMut(usize, &mut ByteReader<'a>) -> AvroResult<()>,
) -> AvroResult<()> {
    loop {
        let count = zag_i64(reader)?;
        if count == 0 {
            return Ok(());
        }
        if count < 0 {
            zag_i64(reader)?;
        }
        let count = usize::try_from(count.unsigned_abs())
            .map_err(|e| Details::ConvertLengthToUsize(e, count))?;
        read_items(safe_len(count)?, reader)?;
    }
}

fn decode_record(
    record: &RecordSchema,
    names: &NamesRef<'_>,
    reader: &mut ByteReader<'_>,
) -> AvroResult<Value> {
    let mut fields = Vec::with_capacity(record.fields.len());
    for field in &record.fields {
        let value = match decode_internal(&field.schema, names, reader) {
            Ok(value) => value,
            Err(e) if e.is_short_read() => match field.default_value(names) {
                Some(default) => {
                    warn!(
                        "Input ended before field {} of record {}, using its default",
                        field.name, record.name
                    );
                    default
                }
                None => return Err(e),
            },
            Err(e) => return Err(e),
        };
        fields.push((field.name.clone(), value));
    }
    Ok(Value::Record(fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        TestResult,
        encode::encode_to_vec,
        schema::{Name, RecordField},
    };
    use hex_literal::hex;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(Schema::null(), &[], Value::Null)]
    #[case(Schema::boolean(), &hex!("00"), Value::Boolean(false))]
    #[case(Schema::int(), &hex!("7f"), Value::Int(-64))]
    #[case(Schema::long(), &hex!("80 01"), Value::Long(64))]
    #[case(Schema::float(), &hex!("00 00 c0 3f"), Value::Float(1.5))]
    #[case(Schema::double(), &hex!("00 00 00 00 00 00 f8 3f"), Value::Double(1.5))]
    #[case(Schema::bytes(), &hex!("04 01 02"), Value::Bytes(vec![1, 2]))]
    #[case(Schema::string(), &hex!("06 66 6f 6f"), Value::String("foo".into()))]
    #[case(Schema::timestamp_millis(), &hex!("02"), Value::Long(1))]
    fn primitives(#[case] schema: Schema, #[case] bytes: &[u8], #[case] expected: Value) -> TestResult {
        assert_eq!(decode_slice(&schema, bytes)?, expected);
        Ok(())
    }

    #[rstest]
    #[case(&hex!("0a 41 42 43 44 45 00"))]
    #[case(&hex!("09 0a 41 42 43 44 45 00"))]
    #[case(&hex!("03 04 41 42 03 04 43 44 01 02 45 00"))]
    #[case(&hex!("04 41 42 06 43 44 45 00"))]
    fn blocks_with_either_count_sign(#[case] bytes: &[u8]) -> TestResult {
        let schema = Schema::array(Schema::Fixed(FixedSchema::new(Name::new("letter")?, 1)));
        let expected = Value::Array(
            "ABCDE"
                .bytes()
                .map(|b| Value::Fixed(1, vec![b]))
                .collect(),
        );
        assert_eq!(decode_slice(&schema, bytes)?, expected);
        Ok(())
    }

    #[test]
    fn map_entries() -> TestResult {
        let value = decode_slice(&Schema::map(Schema::int()), &hex!("01 06 02 61 02 00"))?;
        assert_eq!(
            value,
            Value::Map(HashMap::from([("a".to_string(), Value::Int(1))]))
        );
        Ok(())
    }

    #[test]
    fn union_decodes_the_selected_variant() -> TestResult {
        let schema = Schema::Union(UnionSchema::new(vec![Schema::null(), Schema::string()])?);
        assert_eq!(decode_slice(&schema, &hex!("00"))?, Value::Null);
        assert_eq!(decode_slice(&schema, &hex!("02 02 61"))?, Value::String("a".into()));
        match decode_slice(&schema, &hex!("04")).map_err(Error::into_details) {
            Err(Details::GetUnionVariant {
                index: 2,
                num_variants: 2,
            }) => {}
            other => panic!("Expected Details::GetUnionVariant, got {other:?}"),
        }
        match decode_slice(&schema, &hex!("01")).map_err(Error::into_details) {
            Err(Details::GetUnionVariant { index: -1, .. }) => {}
            other => panic!("Expected Details::GetUnionVariant, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn enum_index_out_of_bounds() -> TestResult {
        let schema = Schema::Enum(EnumSchema::new(Name::new("E")?, vec!["A".into()])?);
        assert_eq!(decode_slice(&schema, &hex!("00"))?, Value::Enum(0, "A".into()));
        match decode_slice(&schema, &hex!("02")).map_err(Error::into_details) {
            Err(Details::GetEnumValue {
                index: 1,
                nsymbols: 1,
            }) => {}
            other => panic!("Expected Details::GetEnumValue, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn short_read_uses_field_defaults() -> TestResult {
        let schema = Schema::Record(RecordSchema::new(Name::new("R")?).with_fields(vec![
            RecordField::new("a", Schema::long())?,
            RecordField::new("b", Schema::string())?.with_default(json!("x"))?,
        ])?);
        assert_eq!(
            decode_slice(&schema, &hex!("02"))?,
            Value::Record(vec![("a".into(), Value::Long(1)), ("b".into(), "x".into())])
        );
        match decode_slice(&schema, &[]).map_err(Error::into_details) {
            Err(Details::ShortRead {
                needed: 1,
                remaining: 0,
            }) => {}
            other => panic!("Expected Details::ShortRead, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn malformed_input() -> TestResult {
        match decode_slice(&Schema::boolean(), &hex!("02")).map_err(Error::into_details) {
            Err(Details::BoolValue(2)) => {}
            other => panic!("Expected Details::BoolValue, got {other:?}"),
        }
        match decode_slice(&Schema::long(), &[0xff; 11]).map_err(Error::into_details) {
            Err(Details::IntegerOverflow) => {}
            other => panic!("Expected Details::IntegerOverflow, got {other:?}"),
        }
        match decode_slice(&Schema::string(), &hex!("04 c3 28")).map_err(Error::into_details) {
            Err(Details::ConvertToUtf8(_)) => {}
            other => panic!("Expected Details::ConvertToUtf8, got {other:?}"),
        }
        match decode_slice(&Schema::bytes(), &hex!("03")).map_err(Error::into_details) {
            Err(Details::ConvertLengthToUsize(_, -2)) => {}
            other => panic!("Expected Details::ConvertLengthToUsize, got {other:?}"),
        }
        let huge = encode_to_vec(&Value::Long(1 << 40), &Schema::long())?;
        match decode_slice(&Schema::bytes(), &huge).map_err(Error::into_details) {
            Err(Details::MemoryAllocation { desired, .. }) => assert_eq!(desired, 1 << 40),
            other => panic!("Expected Details::MemoryAllocation, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn nested_values_round_trip() -> TestResult {
        let schema = Schema::parse_str(
            r#"{
                "type": "record",
                "name": "Event",
                "namespace": "app",
                "fields": [
                    {"name": "id", "type": {"type": "fixed", "name": "Id", "size": 4}},
                    {"name": "kind", "type": {"type": "enum", "name": "Kind", "symbols": ["A", "B"]}},
                    {"name": "tags", "type": {"type": "map", "values": {"type": "array", "items": "string"}}},
                    {"name": "parent", "type": ["null", "Id"]},
                    {"name": "score", "type": "double"}
                ]
            }"#,
        )?;
        let value = Value::Record(vec![
            ("id".into(), Value::Fixed(4, vec![1, 2, 3, 4])),
            ("kind".into(), Value::Enum(1, "B".into())),
            (
                "tags".into(),
                Value::Map(HashMap::from([(
                    "k".to_string(),
                    Value::Array(vec!["v".into(), "w".into()]),
                )])),
            ),
            ("parent".into(), Value::Fixed(4, vec![5, 6, 7, 8])),
            ("score".into(), Value::Double(0.25)),
        ]);
        let bytes = encode_to_vec(&value, &schema)?;
        assert_eq!(decode_slice(&schema, &bytes)?, value);
        Ok(())
    }

    #[rstest]
    #[case(Schema::array(Schema::long()))]
    #[case(Schema::map(Schema::int()))]
    fn oversized_block_count_is_a_short_read(#[case] schema: Schema) -> TestResult {
        let mut bytes = encode_to_vec(&Value::Long(500_000_000), &Schema::long())?;
        bytes.push(0);
        match decode_slice(&schema, &bytes).map_err(Error::into_details) {
            Err(Details::ShortRead {
                needed: 1,
                remaining: 0,
            }) => {}
            other => panic!("Expected Details::ShortRead, got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn references_resolve_against_known_names() -> TestResult {
        let md5 = Schema::Fixed(FixedSchema::new(Name::new("Md5")?, 2));
        let names = NamesRef::from([(Name::new("Md5")?, &md5)]);
        let schema = Schema::array(Schema::Ref {
            name: Name::new("Md5")?,
        });
        let bytes = hex!("02 ab cd 00");

        assert_eq!(
            decode_with_names(&schema, &names, &mut ByteReader::new(&bytes))?,
            Value::Array(vec![Value::Fixed(2, vec![0xab, 0xcd])])
        );
        match decode_slice(&schema, &bytes).map_err(Error::into_details) {
            Err(Details::SchemaResolutionError(name)) => assert_eq!(name.fullname(), "Md5"),
            other => panic!("Expected Details::SchemaResolutionError, got {other:?}"),
        }
        Ok(())
    }
}
