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

//! Logic for parsing and interacting with schemas in Avro format.
//!
//! Named types (records, enums and fixed) are written out once; every later use is a
//! [`Schema::Ref`], a name looked up in a table of named schemas. Recursive schemas need no
//! shared ownership this way.

mod context;
mod logical;
mod name;
mod normalizer;
mod parser;
mod record;
mod resolve;
mod serializer;
mod union;

pub use crate::schema::{
    context::{Context, SchemaRepository},
    logical::LogicalType,
    name::{Aliases, Name, Names, NamesRef, Namespace, NamespaceRef},
    normalizer::normalize,
    record::{RecordField, RecordFieldOrder, RecordSchema},
    resolve::ResolvedSchema,
    serializer::SchemaSerializer,
    union::UnionSchema,
};
pub(crate) use crate::schema::{
    normalizer::normalize_field,
    parser::{parse_field, parse_union},
};
use crate::{
    AvroResult,
    error::{Details, Error},
    validator::validate_enum_symbol_name,
};
use digest::Digest;
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::{collections::HashSet, fmt};
use strum_macros::{Display, EnumDiscriminants, EnumString, IntoStaticStr};

/// Represents documentation for complex Avro schemas.
pub type Documentation = Option<String>;

/// Represents an Avro schema fingerprint.
///
/// More information about Avro schema fingerprints can be found in the
/// [Avro Schema Fingerprint documentation](https://avro.apache.org/docs/++version++/specification/#schema-fingerprints)
pub struct SchemaFingerprint {
    pub bytes: Vec<u8>,
}

impl fmt::Display for SchemaFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            self.bytes
                .iter()
                .map(|byte| format!("{byte:02x}"))
                .collect::<Vec<String>>()
                .join("")
        )
    }
}

/// The eight primitive Avro types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumString, IntoStaticStr, Display)]
#[strum(serialize_all = "lowercase")]
pub enum PrimitiveType {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
}

/// A primitive schema, optionally annotated with a logical type.
#[derive(Clone, Debug, PartialEq)]
pub struct PrimitiveSchema {
    pub kind: PrimitiveType,
    pub logical_type: Option<LogicalType>,
}

impl PrimitiveSchema {
    pub fn new(kind: PrimitiveType) -> Self {
        Self {
            kind,
            logical_type: None,
        }
    }

    /// Annotates the primitive with `logical_type`.
    ///
    /// # Errors
    /// Will return a [`Details::IncompatibleLogicalType`] if `logical_type` cannot annotate
    /// this primitive (e.g. `date` on a `string`).
    pub fn with_logical_type(self, logical_type: LogicalType) -> AvroResult<Self> {
        if !logical_type.is_compatible_with_primitive(self.kind) {
            return Err(Details::IncompatibleLogicalType {
                logical_type: logical_type.name().to_string(),
                base: self.kind.into(),
            }
            .into());
        }
        Ok(Self {
            logical_type: Some(logical_type),
            ..self
        })
    }
}

/// Represents any valid Avro schema
/// More information about Avro schemas can be found in the
/// [Avro Specification](https://avro.apache.org/docs/++version++/specification/#schema-declaration)
#[derive(Clone, Debug, PartialEq, EnumDiscriminants)]
#[strum_discriminants(name(SchemaKind), derive(Hash, Ord, PartialOrd))]
pub enum Schema {
    /// One of the primitive types, possibly with a logical type.
    Primitive(PrimitiveSchema),
    /// A `fixed` Avro schema.
    Fixed(FixedSchema),
    /// An `enum` Avro schema.
    Enum(EnumSchema),
    /// A `record` (or `error`) Avro schema.
    Record(RecordSchema),
    /// An `array` Avro schema.
    ///
    /// All items will have the same schema.
    Array(ArraySchema),
    /// A `map` Avro schema.
    ///
    /// Keys are always strings and all values will have the same schema.
    Map(MapSchema),
    /// A `union` Avro schema.
    Union(UnionSchema),
    /// A reference to a named schema defined elsewhere.
    ///
    /// The name is the key of the named schema in a [`Names`] table. A reference never points
    /// to another reference.
    Ref { name: Name },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArraySchema {
    pub items: Box<Schema>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MapSchema {
    pub values: Box<Schema>,
}

impl SchemaKind {
    pub fn is_named(self) -> bool {
        matches!(
            self,
            SchemaKind::Record | SchemaKind::Enum | SchemaKind::Fixed | SchemaKind::Ref
        )
    }
}

/// A description of an Enum schema.
#[derive(Clone, Debug, PartialEq)]
pub struct EnumSchema {
    /// The name of the schema
    pub name: Name,
    /// The set of symbols of the schema
    pub symbols: Vec<String>,
    /// The documentation of the schema
    pub doc: Documentation,
    /// The aliases of the schema
    pub aliases: Aliases,
}

impl EnumSchema {
    /// Creates an enum schema.
    ///
    /// # Errors
    /// Will return an error if a symbol is not a valid identifier or appears twice.
    pub fn new(name: Name, symbols: Vec<String>) -> AvroResult<Self> {
        let mut seen = HashSet::with_capacity(symbols.len());
        for symbol in &symbols {
            validate_enum_symbol_name(symbol)?;
            if !seen.insert(symbol.as_str()) {
                return Err(Details::EnumSymbolDuplicate(symbol.clone()).into());
            }
        }
        Ok(Self {
            name,
            symbols,
            doc: None,
            aliases: None,
        })
    }

    pub fn with_doc(self, doc: impl Into<String>) -> Self {
        Self {
            doc: Some(doc.into()),
            ..self
        }
    }

    pub fn with_aliases(self, aliases: Vec<String>) -> Self {
        Self {
            aliases: Some(aliases),
            ..self
        }
    }

    pub fn with_namespace(self, namespace: NamespaceRef) -> AvroResult<Self> {
        Ok(Self {
            name: self.name.with_namespace(namespace)?,
            ..self
        })
    }

    /// The position of `symbol` in the declared symbols.
    pub fn position(&self, symbol: &str) -> Option<u32> {
        self.symbols
            .iter()
            .position(|s| s == symbol)
            .and_then(|index| u32::try_from(index).ok())
    }

    /// The symbol at `index`.
    pub fn symbol(&self, index: usize) -> Option<&str> {
        self.symbols.get(index).map(String::as_str)
    }
}

/// A description of a Fixed schema.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedSchema {
    /// The name of the schema
    pub name: Name,
    /// The size of the fixed schema
    pub size: usize,
    /// The aliases of the schema
    pub aliases: Aliases,
    /// The logical type annotating the schema
    pub logical_type: Option<LogicalType>,
}

impl FixedSchema {
    pub fn new(name: Name, size: usize) -> Self {
        Self {
            name,
            size,
            aliases: None,
            logical_type: None,
        }
    }

    /// A `duration`: twelve bytes holding months, days and milliseconds.
    pub fn duration(name: Name) -> Self {
        Self {
            logical_type: Some(LogicalType::Duration),
            ..Self::new(name, 12)
        }
    }

    /// Annotates the fixed schema with `logical_type`.
    ///
    /// # Errors
    /// Will return a [`Details::IncompatibleLogicalType`] if `logical_type` cannot annotate a
    /// fixed schema, or it is a `duration` and the size is not 12.
    pub fn with_logical_type(self, logical_type: LogicalType) -> AvroResult<Self> {
        let compatible = logical_type.is_compatible_with_fixed()
            && (logical_type != LogicalType::Duration || self.size == 12);
        if !compatible {
            return Err(Details::IncompatibleLogicalType {
                logical_type: logical_type.name().to_string(),
                base: "fixed",
            }
            .into());
        }
        Ok(Self {
            logical_type: Some(logical_type),
            ..self
        })
    }

    pub fn with_aliases(self, aliases: Vec<String>) -> Self {
        Self {
            aliases: Some(aliases),
            ..self
        }
    }

    pub fn with_namespace(self, namespace: NamespaceRef) -> AvroResult<Self> {
        Ok(Self {
            name: self.name.with_namespace(namespace)?,
            ..self
        })
    }
}

impl Schema {
    pub fn primitive(kind: PrimitiveType) -> Self {
        Schema::Primitive(PrimitiveSchema::new(kind))
    }

    pub fn null() -> Self {
        Self::primitive(PrimitiveType::Null)
    }

    pub fn boolean() -> Self {
        Self::primitive(PrimitiveType::Boolean)
    }

    pub fn int() -> Self {
        Self::primitive(PrimitiveType::Int)
    }

    pub fn long() -> Self {
        Self::primitive(PrimitiveType::Long)
    }

    pub fn float() -> Self {
        Self::primitive(PrimitiveType::Float)
    }

    pub fn double() -> Self {
        Self::primitive(PrimitiveType::Double)
    }

    pub fn bytes() -> Self {
        Self::primitive(PrimitiveType::Bytes)
    }

    pub fn string() -> Self {
        Self::primitive(PrimitiveType::String)
    }

    pub fn array(items: Schema) -> Self {
        Schema::Array(ArraySchema {
            items: Box::new(items),
        })
    }

    pub fn map(values: Schema) -> Self {
        Schema::Map(MapSchema {
            values: Box::new(values),
        })
    }

    /// A `bytes` schema holding a decimal.
    pub fn decimal(precision: usize, scale: usize) -> AvroResult<Self> {
        PrimitiveSchema::new(PrimitiveType::Bytes)
            .with_logical_type(LogicalType::decimal(precision, scale)?)
            .map(Schema::Primitive)
    }

    /// An `int` schema holding a date.
    pub fn date() -> Self {
        Self::with_builtin_logical_type(PrimitiveType::Int, LogicalType::Date)
    }

    pub fn time_millis() -> Self {
        Self::with_builtin_logical_type(PrimitiveType::Int, LogicalType::TimeMillis)
    }

    pub fn time_micros() -> Self {
        Self::with_builtin_logical_type(PrimitiveType::Long, LogicalType::TimeMicros)
    }

    pub fn timestamp_millis() -> Self {
        Self::with_builtin_logical_type(PrimitiveType::Long, LogicalType::TimestampMillis)
    }

    pub fn timestamp_micros() -> Self {
        Self::with_builtin_logical_type(PrimitiveType::Long, LogicalType::TimestampMicros)
    }

    fn with_builtin_logical_type(kind: PrimitiveType, logical_type: LogicalType) -> Self {
        Schema::Primitive(PrimitiveSchema {
            kind,
            logical_type: Some(logical_type),
        })
    }

    /// Converts `self` into its [Parsing Canonical Form].
    ///
    /// Full names everywhere, no `doc`, `aliases`, `default`, `order` or logical types, and
    /// primitives written as plain strings.
    ///
    /// [Parsing Canonical Form]:
    /// https://avro.apache.org/docs/++version++/specification/#parsing-canonical-form-for-schemas
    pub fn canonical_form(&self) -> String {
        normalize(self, true, None).to_string()
    }

    /// Generate the [fingerprint] of the schema's [Parsing Canonical Form].
    ///
    /// # Example
    /// ```
    /// use avro_serde::{Schema, Error};
    /// use md5::Md5;
    /// use sha2::Sha256;
    ///
    /// fn main() -> Result<(), Error> {
    ///     let raw_schema = r#"
    ///         {
    ///             "type": "record",
    ///             "name": "test",
    ///             "fields": [
    ///                 {"name": "a", "type": "long", "default": 42},
    ///                 {"name": "b", "type": "string"}
    ///             ]
    ///         }
    ///     "#;
    ///     let schema = Schema::parse_str(raw_schema)?;
    ///     println!("{}", schema.fingerprint::<Sha256>());
    ///     println!("{}", schema.fingerprint::<Md5>());
    ///     Ok(())
    /// }
    /// ```
    ///
    /// [Parsing Canonical Form]:
    /// https://avro.apache.org/docs/++version++/specification/#parsing-canonical-form-for-schemas
    /// [fingerprint]:
    /// https://avro.apache.org/docs/++version++/specification/#schema-fingerprints
    pub fn fingerprint<D: Digest>(&self) -> SchemaFingerprint {
        let mut d = D::new();
        d.update(self.canonical_form());
        SchemaFingerprint {
            bytes: d.finalize().to_vec(),
        }
    }

    /// Create a `Schema` from a string representing a JSON Avro schema.
    pub fn parse_str(input: &str) -> AvroResult<Schema> {
        let value = serde_json::from_str(input).map_err(Details::ParseSchemaJson)?;
        Self::parse(&value)
    }

    /// Parses an Avro schema from JSON.
    pub fn parse(value: &JsonValue) -> AvroResult<Schema> {
        Self::parse_with_context(value, &mut Context::default())
    }

    /// Parses an Avro schema from JSON within `context`.
    ///
    /// Named types already in the context can be referenced by name, and the named types
    /// declared by `value` are added to it.
    pub fn parse_with_context(value: &JsonValue, context: &mut Context) -> AvroResult<Schema> {
        parser::parse(value, context)
    }

    /// Returns whether the schema represents a named type according to the avro specification
    pub fn is_named(&self) -> bool {
        SchemaKind::from(self).is_named()
    }

    /// Returns the name of the schema if it has one.
    pub fn name(&self) -> Option<&Name> {
        match self {
            Schema::Ref { name, .. }
            | Schema::Record(RecordSchema { name, .. })
            | Schema::Enum(EnumSchema { name, .. })
            | Schema::Fixed(FixedSchema { name, .. }) => Some(name),
            _ => None,
        }
    }

    /// Returns the namespace of the schema if it has one.
    pub fn namespace(&self) -> NamespaceRef<'_> {
        self.name().and_then(Name::namespace)
    }

    /// Returns the aliases of the schema if it has ones.
    pub fn aliases(&self) -> Option<&Vec<String>> {
        match self {
            Schema::Record(RecordSchema { aliases, .. })
            | Schema::Enum(EnumSchema { aliases, .. })
            | Schema::Fixed(FixedSchema { aliases, .. }) => aliases.as_ref(),
            _ => None,
        }
    }

    /// Returns the doc of the schema if it has one.
    pub fn doc(&self) -> Option<&String> {
        match self {
            Schema::Record(RecordSchema { doc, .. }) | Schema::Enum(EnumSchema { doc, .. }) => {
                doc.as_ref()
            }
            _ => None,
        }
    }

    /// Returns the primitive type if this is a primitive schema.
    pub fn primitive_type(&self) -> Option<PrimitiveType> {
        match self {
            Schema::Primitive(primitive) => Some(primitive.kind),
            _ => None,
        }
    }

    /// Returns the logical type annotating the schema, if any.
    pub fn logical_type(&self) -> Option<&LogicalType> {
        match self {
            Schema::Primitive(PrimitiveSchema { logical_type, .. })
            | Schema::Fixed(FixedSchema { logical_type, .. }) => logical_type.as_ref(),
            _ => None,
        }
    }
}

impl Serialize for Schema {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        normalize(self, false, None).serialize(serializer)
    }
}

impl TryFrom<&str> for Schema {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse_str(value)
    }
}
