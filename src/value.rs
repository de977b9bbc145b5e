//! The runtime value universe and its type registry.

use indexmap::IndexMap;

use crate::schema::types::{PhysicalType, PrimitiveConvertedType};

/// A JSON-like nested value. Objects preserve key order; lists preserve
/// element order.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Object(IndexMap<String, Value>),
    List(Vec<Value>),
}

/// The level-semantic category of a runtime value. Dispatch is always on
/// the variant tag, never on the value's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Null,
    Primitive,
    Object,
    List,
}

/// A registry entry: the parquet-facing types of one runtime value kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeInfo {
    pub physical_type: Option<PhysicalType>,
    pub converted_type: Option<PrimitiveConvertedType>,
    pub byte_width: Option<i32>,
}

impl TypeInfo {
    /// An interior node carrying no values of its own.
    pub fn group() -> Self {
        Self {
            physical_type: None,
            converted_type: None,
            byte_width: None,
        }
    }

    pub fn boolean() -> Self {
        Self {
            physical_type: Some(PhysicalType::Boolean),
            converted_type: None,
            byte_width: Some(1),
        }
    }

    pub fn int64() -> Self {
        Self {
            physical_type: Some(PhysicalType::Int64),
            converted_type: None,
            byte_width: Some(8),
        }
    }

    pub fn double() -> Self {
        Self {
            physical_type: Some(PhysicalType::Double),
            converted_type: None,
            byte_width: Some(8),
        }
    }

    pub fn utf8() -> Self {
        Self {
            physical_type: Some(PhysicalType::ByteArray),
            converted_type: Some(PrimitiveConvertedType::Utf8),
            byte_width: None,
        }
    }

    pub fn byte_array() -> Self {
        Self {
            physical_type: Some(PhysicalType::ByteArray),
            converted_type: None,
            byte_width: None,
        }
    }
}

impl Value {
    pub fn category(&self) -> Category {
        match self {
            Value::Null => Category::Null,
            Value::Object(_) => Category::Object,
            Value::List(_) => Category::List,
            _ => Category::Primitive,
        }
    }

    /// The registry lookup for this value's runtime type.
    pub fn type_info(&self) -> TypeInfo {
        match self {
            Value::Null | Value::Object(_) | Value::List(_) => TypeInfo::group(),
            Value::Bool(_) => TypeInfo::boolean(),
            Value::Int(_) => TypeInfo::int64(),
            Value::Float(_) => TypeInfo::double(),
            Value::Text(text) => TypeInfo {
                byte_width: Some(text.len() as i32),
                ..TypeInfo::utf8()
            },
            Value::Bytes(bytes) => TypeInfo {
                byte_width: Some(bytes.len() as i32),
                ..TypeInfo::byte_array()
            },
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(value) => Value::Bool(value),
            serde_json::Value::Number(number) => match number.as_i64() {
                Some(integer) => Value::Int(integer),
                None => Value::Float(number.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(text) => Value::Text(text),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(name, value)| (name, Value::from(value)))
                    .collect(),
            ),
        }
    }
}
