//! Type Normalization
//!
//! Avro field types arrive in several shapes: a bare name, a structured
//! object (optionally annotated with `origin`), an array object, or a
//! nullable union. Classification turns the raw JSON into a [`TypeShape`];
//! [`TypeShape::describe`] flattens that into the [`TypeDescriptor`] the
//! documents are built from.

use serde::Serialize;
use serde_json::Value;

use crate::error::{DocsError, Result};

/// Avro primitive type names
pub const AVRO_PRIMITIVE_TYPES: [&str; 8] = [
    "null", "int", "long", "float", "double", "bytes", "string", "boolean",
];

pub fn is_avro_primitive(name: &str) -> bool {
    AVRO_PRIMITIVE_TYPES.contains(&name)
}

/// Whether a type deserves a cross-reference link.
///
/// Primitives and date/timestamp types are rendered as plain scalars.
pub fn is_linkable(name: &str) -> bool {
    let datetime = name.ends_with("Timestamp") || name.ends_with("Date");
    !(datetime || is_avro_primitive(name))
}

/// Qualify an unqualified, non-primitive type name with `namespace`
pub fn qualify_type(name: &str, namespace: &str) -> String {
    if !is_avro_primitive(name) && !name.contains('.') {
        format!("{namespace}.{name}")
    } else {
        name.to_string()
    }
}

/// The recognised raw type shapes
#[derive(Debug, Clone, PartialEq)]
pub enum TypeShape {
    Null,
    Primitive(String),
    Reference { name: String, origin: Option<String> },
    Array { item: String, origin: Option<String> },
    Nullable(Box<TypeShape>),
}

impl TypeShape {
    /// Classify a raw type expression, rejecting anything unrecognised
    pub fn classify(raw: &Value) -> Result<Self> {
        match raw {
            Value::String(name) if name == "null" => Ok(TypeShape::Null),
            Value::String(name) => Ok(Self::named(name, None)),
            Value::Object(obj) => {
                let origin = obj.get("origin").and_then(Value::as_str).map(String::from);
                match (obj.get("type"), obj.get("items")) {
                    (Some(Value::String(t)), Some(items)) if t == "array" => {
                        let item = item_name(items).ok_or_else(|| unsupported(raw))?;
                        Ok(TypeShape::Array { item, origin })
                    }
                    (Some(Value::String(t)), _) if t != "array" => Ok(Self::named(t, origin)),
                    _ => Err(unsupported(raw)),
                }
            }
            Value::Array(alternatives) => {
                let has_null = alternatives.iter().any(|a| a.as_str() == Some("null"));
                let mut non_null = alternatives.iter().filter(|a| a.as_str() != Some("null"));
                match (has_null, non_null.next(), non_null.next()) {
                    (true, Some(inner), None) => {
                        let inner = Self::classify(inner)?;
                        if matches!(inner, TypeShape::Nullable(_)) {
                            return Err(unsupported(raw));
                        }
                        Ok(TypeShape::Nullable(Box::new(inner)))
                    }
                    _ => Err(unsupported(raw)),
                }
            }
            _ => Err(unsupported(raw)),
        }
    }

    fn named(name: &str, origin: Option<String>) -> Self {
        if name == "null" {
            TypeShape::Null
        } else if is_avro_primitive(name) && origin.is_none() {
            TypeShape::Primitive(name.to_string())
        } else {
            TypeShape::Reference { name: name.to_string(), origin }
        }
    }

    /// Flatten into the canonical descriptor
    pub fn describe(&self) -> TypeDescriptor {
        match self {
            TypeShape::Null => TypeDescriptor::scalar("null", true, None),
            TypeShape::Primitive(name) => TypeDescriptor::scalar(name, false, None),
            TypeShape::Reference { name, origin } => {
                TypeDescriptor::scalar(name, false, origin.clone())
            }
            TypeShape::Array { item, origin } => TypeDescriptor {
                is_array: true,
                ..TypeDescriptor::scalar(item, false, origin.clone())
            },
            TypeShape::Nullable(inner) => TypeDescriptor {
                nullable: true,
                ..inner.describe()
            },
        }
    }
}

/// Canonical, documentation-ready view of a field type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDescriptor {
    #[serde(rename = "type")]
    pub type_name: String,
    pub is_array: bool,
    pub nullable: bool,
    pub is_avro_primitive: bool,
    pub is_linkable: bool,
    pub origin: Option<String>,
}

impl TypeDescriptor {
    fn scalar(name: &str, nullable: bool, origin: Option<String>) -> Self {
        Self {
            type_name: name.to_string(),
            is_array: false,
            nullable,
            is_avro_primitive: is_avro_primitive(name),
            is_linkable: is_linkable(name),
            origin,
        }
    }

    /// Same descriptor with the type name qualified against `namespace`
    pub fn qualified(mut self, namespace: &str) -> Self {
        self.type_name = qualify_type(&self.type_name, namespace);
        self.is_linkable = is_linkable(&self.type_name);
        self
    }
}

/// Normalize a raw Avro type expression
pub fn normalize(raw: &Value) -> Result<TypeDescriptor> {
    TypeShape::classify(raw).map(|shape| shape.describe())
}

/// Item type name of an array: a bare name or a non-array structured type
fn item_name(items: &Value) -> Option<String> {
    match items {
        Value::String(name) => Some(name.clone()),
        Value::Object(obj) => match obj.get("type") {
            Some(Value::String(t)) if t != "array" => Some(t.clone()),
            _ => None,
        },
        _ => None,
    }
}

fn unsupported(raw: &Value) -> DocsError {
    DocsError::UnsupportedType { raw: raw.clone() }
}
