// Bridges the thrift-generated structs to rust enums.
use parquet_format_safe::{ConvertedType, FieldRepetitionType, Type};

#[cfg(feature = "serde_types")]
use serde_derive::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The repetition of a field.
#[derive(Debug, Eq, PartialEq, Hash, Clone, Copy)]
#[cfg_attr(feature = "serde_types", derive(Deserialize, Serialize))]
pub enum Repetition {
    /// The field is always present.
    Required,
    /// The field may be absent or null.
    Optional,
    /// The field is a list; absence and emptiness coincide.
    Repeated,
}

impl TryFrom<FieldRepetitionType> for Repetition {
    type Error = Error;

    fn try_from(repetition: FieldRepetitionType) -> Result<Self> {
        Ok(match repetition {
            FieldRepetitionType::REQUIRED => Repetition::Required,
            FieldRepetitionType::OPTIONAL => Repetition::Optional,
            FieldRepetitionType::REPEATED => Repetition::Repeated,
            _ => return Err(Error::OutOfSpec("Thrift out of range".to_string())),
        })
    }
}

impl From<Repetition> for FieldRepetitionType {
    fn from(repetition: Repetition) -> Self {
        match repetition {
            Repetition::Required => FieldRepetitionType::REQUIRED,
            Repetition::Optional => FieldRepetitionType::OPTIONAL,
            Repetition::Repeated => FieldRepetitionType::REPEATED,
        }
    }
}

/// The physical type of a leaf: the storage shapes a column can hold.
///
/// This is narrower than the thrift surface on purpose: a leaf only ever
/// stores what the value registry can produce and the column serializer can
/// write, so e.g. 96-bit integers are rejected when a schema is loaded.
#[derive(Debug, Eq, PartialEq, Hash, Clone, Copy)]
#[cfg_attr(feature = "serde_types", derive(Deserialize, Serialize))]
pub enum PhysicalType {
    Boolean,
    Int32,
    Int64,
    Float,
    Double,
    ByteArray,
    FixedLenByteArray(i32),
}

impl PhysicalType {
    /// Reads a thrift element type together with its optional length.
    pub fn try_from_thrift(type_: Type, type_length: Option<i32>) -> Result<Self> {
        Ok(match type_ {
            Type::BOOLEAN => PhysicalType::Boolean,
            Type::INT32 => PhysicalType::Int32,
            Type::INT64 => PhysicalType::Int64,
            Type::FLOAT => PhysicalType::Float,
            Type::DOUBLE => PhysicalType::Double,
            Type::BYTE_ARRAY => PhysicalType::ByteArray,
            Type::FIXED_LEN_BYTE_ARRAY => {
                let length = type_length.ok_or_else(|| {
                    Error::OutOfSpec(
                        "a FIXED_LEN_BYTE_ARRAY element declares no length".to_string(),
                    )
                })?;
                PhysicalType::FixedLenByteArray(length)
            }
            other => {
                return Err(Error::OutOfSpec(format!(
                    "no column can hold {:?} values",
                    other
                )))
            }
        })
    }

    /// The thrift element type and, for fixed-width byte arrays, its length.
    pub fn to_thrift(&self) -> (Type, Option<i32>) {
        match self {
            PhysicalType::Boolean => (Type::BOOLEAN, None),
            PhysicalType::Int32 => (Type::INT32, None),
            PhysicalType::Int64 => (Type::INT64, None),
            PhysicalType::Float => (Type::FLOAT, None),
            PhysicalType::Double => (Type::DOUBLE, None),
            PhysicalType::ByteArray => (Type::BYTE_ARRAY, None),
            PhysicalType::FixedLenByteArray(length) => (Type::FIXED_LEN_BYTE_ARRAY, Some(*length)),
        }
    }
}

/// The converted (logical) types this crate records on leaves.
#[derive(Debug, Eq, PartialEq, Hash, Clone, Copy)]
#[cfg_attr(feature = "serde_types", derive(Deserialize, Serialize))]
pub enum PrimitiveConvertedType {
    Utf8,
    Int64,
    Uint64,
}

impl TryFrom<ConvertedType> for PrimitiveConvertedType {
    type Error = Error;

    fn try_from(converted: ConvertedType) -> Result<Self> {
        Ok(match converted {
            ConvertedType::UTF8 => PrimitiveConvertedType::Utf8,
            ConvertedType::INT_64 => PrimitiveConvertedType::Int64,
            ConvertedType::UINT_64 => PrimitiveConvertedType::Uint64,
            _ => {
                return Err(Error::OutOfSpec(format!(
                    "converted type {:?} is not supported",
                    converted
                )))
            }
        })
    }
}

impl From<PrimitiveConvertedType> for ConvertedType {
    fn from(converted: PrimitiveConvertedType) -> Self {
        match converted {
            PrimitiveConvertedType::Utf8 => ConvertedType::UTF8,
            PrimitiveConvertedType::Int64 => ConvertedType::INT_64,
            PrimitiveConvertedType::Uint64 => ConvertedType::UINT_64,
        }
    }
}
