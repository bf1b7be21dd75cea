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

//! Logical types annotating primitive and fixed schemas.

use crate::{AvroResult, Error, error::Details, schema::PrimitiveType};
use log::warn;
use serde_json::{Map, Value as JsonValue};

/// An annotation giving a primitive or fixed schema extended semantics.
///
/// The physical encoding of the annotated schema never changes.
#[derive(Clone, Debug, PartialEq)]
pub enum LogicalType {
    /// Arbitrary-precision signed decimal, `unscaled * 10^-scale`. Annotates `bytes` or `fixed`.
    Decimal { precision: usize, scale: usize },
    /// Days since the unix epoch. Annotates `int`.
    Date,
    /// Milliseconds after midnight. Annotates `int`.
    TimeMillis,
    /// Microseconds after midnight. Annotates `long`.
    TimeMicros,
    /// Milliseconds since the unix epoch. Annotates `long`.
    TimestampMillis,
    /// Microseconds since the unix epoch. Annotates `long`.
    TimestampMicros,
    /// Months, days and milliseconds. Annotates a `fixed` of size 12.
    Duration,
    /// Any logical type this crate does not interpret.
    Custom {
        name: String,
        attributes: Map<String, JsonValue>,
    },
}

impl LogicalType {
    /// Creates a decimal logical type, checking that `0 < precision` and `scale <= precision`.
    pub fn decimal(precision: usize, scale: usize) -> AvroResult<Self> {
        if precision == 0 {
            return Err(Details::DecimalPrecisionMustBePositive { precision }.into());
        }
        if precision < scale {
            return Err(Details::DecimalPrecisionLessThanScale { precision, scale }.into());
        }
        Ok(Self::Decimal { precision, scale })
    }

    /// Creates a logical type this crate does not interpret.
    pub fn custom(name: impl Into<String>, attributes: Map<String, JsonValue>) -> Self {
        Self::Custom {
            name: name.into(),
            attributes,
        }
    }

    /// The value of the `logicalType` attribute.
    pub fn name(&self) -> &str {
        match self {
            LogicalType::Decimal { .. } => "decimal",
            LogicalType::Date => "date",
            LogicalType::TimeMillis => "time-millis",
            LogicalType::TimeMicros => "time-micros",
            LogicalType::TimestampMillis => "timestamp-millis",
            LogicalType::TimestampMicros => "timestamp-micros",
            LogicalType::Duration => "duration",
            LogicalType::Custom { name, .. } => name,
        }
    }

    /// The attributes written next to `logicalType`.
    pub fn attributes(&self) -> Map<String, JsonValue> {
        match self {
            LogicalType::Decimal { precision, scale } => {
                let mut attributes = Map::with_capacity(2);
                attributes.insert("precision".to_string(), (*precision).into());
                attributes.insert("scale".to_string(), (*scale).into());
                attributes
            }
            LogicalType::Custom { attributes, .. } => attributes.clone(),
            _ => Map::new(),
        }
    }

    pub fn is_compatible_with_primitive(&self, kind: PrimitiveType) -> bool {
        match self {
            LogicalType::Decimal { .. } => kind == PrimitiveType::Bytes,
            LogicalType::Date | LogicalType::TimeMillis => kind == PrimitiveType::Int,
            LogicalType::TimeMicros
            | LogicalType::TimestampMillis
            | LogicalType::TimestampMicros => kind == PrimitiveType::Long,
            LogicalType::Duration => false,
            LogicalType::Custom { .. } => true,
        }
    }

    pub fn is_compatible_with_fixed(&self) -> bool {
        matches!(
            self,
            LogicalType::Decimal { .. } | LogicalType::Duration | LogicalType::Custom { .. }
        )
    }

    /// Reads the logical type of a primitive schema.
    ///
    /// An annotation that cannot apply to `kind` is dropped with a warning and the plain
    /// primitive is used instead.
    pub(crate) fn parse_for_primitive(
        complex: &Map<String, JsonValue>,
        kind: PrimitiveType,
    ) -> AvroResult<Option<Self>> {
        Ok(Self::parse(complex, &[])?.filter(|logical_type| {
            let compatible = logical_type.is_compatible_with_primitive(kind);
            if !compatible {
                warn!(
                    "Ignoring logical type '{}' because it cannot annotate '{kind}'",
                    logical_type.name()
                );
            }
            compatible
        }))
    }

    /// Reads the logical type of a fixed schema. Incompatible annotations are dropped with a
    /// warning.
    pub(crate) fn parse_for_fixed(complex: &Map<String, JsonValue>) -> AvroResult<Option<Self>> {
        Ok(Self::parse(complex, FIXED_KEYS)?.filter(|logical_type| {
            let compatible = logical_type.is_compatible_with_fixed();
            if !compatible {
                warn!(
                    "Ignoring logical type '{}' because it cannot annotate 'fixed'",
                    logical_type.name()
                );
            }
            compatible
        }))
    }

    /// `schema_keys` are the attributes of the annotated schema besides `type`, which a custom
    /// logical type does not keep.
    fn parse(
        complex: &Map<String, JsonValue>,
        schema_keys: &[&str],
    ) -> AvroResult<Option<Self>> {
        let name = match complex.get("logicalType") {
            None => return Ok(None),
            Some(JsonValue::String(name)) => name,
            Some(other) => return Err(Error::WrongJsonType("logicalType", "string", other)),
        };
        let logical_type = match name.as_str() {
            "decimal" => {
                let precision = match complex.get("precision") {
                    None => return Err(Error::MissingField("precision")),
                    Some(precision) => parse_decimal_attribute("precision", precision)?,
                };
                let scale = complex
                    .get("scale")
                    .map(|scale| parse_decimal_attribute("scale", scale))
                    .transpose()?
                    .unwrap_or(0);
                Self::decimal(precision, scale)?
            }
            "date" => LogicalType::Date,
            "time-millis" => LogicalType::TimeMillis,
            "time-micros" => LogicalType::TimeMicros,
            "timestamp-millis" => LogicalType::TimestampMillis,
            "timestamp-micros" => LogicalType::TimestampMicros,
            "duration" => LogicalType::Duration,
            other => LogicalType::Custom {
                name: other.to_string(),
                attributes: complex
                    .iter()
                    .filter(|(key, _)| {
                        !matches!(key.as_str(), "type" | "logicalType")
                            && !schema_keys.contains(&key.as_str())
                    })
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect(),
            },
        };
        Ok(Some(logical_type))
    }
}

const FIXED_KEYS: &[&str] = &["name", "namespace", "aliases", "doc", "size"];

fn parse_decimal_attribute(field: &'static str, value: &JsonValue) -> AvroResult<usize> {
    value
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| Error::WrongJsonType(field, "non-negative integer", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TestResult;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn object(json: JsonValue) -> Map<String, JsonValue> {
        match json {
            JsonValue::Object(map) => map,
            other => panic!("Expected a JSON object, got {other}"),
        }
    }

    #[test]
    fn decimal_checks_its_parameters() -> TestResult {
        assert_eq!(
            LogicalType::decimal(4, 2)?,
            LogicalType::Decimal {
                precision: 4,
                scale: 2
            }
        );
        match LogicalType::decimal(2, 4).map_err(Error::into_details) {
            Err(Details::DecimalPrecisionLessThanScale { precision, scale }) => {
                assert_eq!((precision, scale), (2, 4));
            }
            other => panic!("Expected Details::DecimalPrecisionLessThanScale, got {other:?}"),
        }
        assert!(LogicalType::decimal(0, 0).is_err());
        Ok(())
    }

    #[test]
    fn decimal_scale_defaults_to_zero() -> TestResult {
        let parsed = LogicalType::parse_for_primitive(
            &object(json!({"type": "bytes", "logicalType": "decimal", "precision": 9})),
            PrimitiveType::Bytes,
        )?;
        assert_eq!(
            parsed,
            Some(LogicalType::Decimal {
                precision: 9,
                scale: 0
            })
        );
        Ok(())
    }

    #[rstest]
    #[case(json!({"type": "string", "logicalType": "date"}), PrimitiveType::String)]
    #[case(json!({"type": "long", "logicalType": "time-millis"}), PrimitiveType::Long)]
    #[case(json!({"type": "int", "logicalType": "timestamp-micros"}), PrimitiveType::Int)]
    #[case(json!({"type": "string", "logicalType": "decimal", "precision": 4}), PrimitiveType::String)]
    #[case(json!({"type": "bytes", "logicalType": "duration"}), PrimitiveType::Bytes)]
    fn incompatible_logical_types_are_dropped(
        #[case] json: JsonValue,
        #[case] kind: PrimitiveType,
    ) -> TestResult {
        assert_eq!(LogicalType::parse_for_primitive(&object(json), kind)?, None);
        Ok(())
    }

    #[test]
    fn unknown_logical_types_keep_their_attributes() -> TestResult {
        let parsed = LogicalType::parse_for_primitive(
            &object(json!({"type": "string", "logicalType": "uuid", "version": 4})),
            PrimitiveType::String,
        )?;
        let expected = LogicalType::custom("uuid", object(json!({"version": 4})));
        assert_eq!(parsed, Some(expected));
        Ok(())
    }

    #[test]
    fn logical_type_must_be_a_string() {
        let json = object(json!({"type": "int", "logicalType": 7}));
        match LogicalType::parse_for_primitive(&json, PrimitiveType::Int)
            .map_err(Error::into_details)
        {
            Err(Details::WrongJsonType { field, .. }) => assert_eq!(field, "logicalType"),
            other => panic!("Expected Details::WrongJsonType, got {other:?}"),
        }
    }

    #[test]
    fn fixed_accepts_duration_only_among_the_time_types() -> TestResult {
        let duration = object(json!({"type": "fixed", "logicalType": "duration"}));
        assert_eq!(
            LogicalType::parse_for_fixed(&duration)?,
            Some(LogicalType::Duration)
        );
        let date = object(json!({"type": "fixed", "logicalType": "date"}));
        assert_eq!(LogicalType::parse_for_fixed(&date)?, None);
        Ok(())
    }

    #[test]
    fn custom_logical_types_on_fixed_leave_the_fixed_attributes() -> TestResult {
        let json = object(json!({
            "type": "fixed",
            "name": "Id",
            "namespace": "org.example",
            "aliases": ["Key"],
            "doc": "An identifier",
            "size": 16,
            "logicalType": "uuid",
            "version": 4
        }));
        let expected = LogicalType::custom("uuid", object(json!({"version": 4})));
        assert_eq!(LogicalType::parse_for_fixed(&json)?, Some(expected));
        Ok(())
    }
}
