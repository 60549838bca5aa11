//! Avro protocol data model
//!
//! Mirrors the subset of the `.avpr` JSON layout that documentation needs.
//! Everything here is a read-only projection of the loaded input.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{DocsError, Result};
use crate::link::unlink;

/// One Avro protocol file: a namespace and the types declared in it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Protocol {
    /// Display name of the protocol
    pub protocol: String,
    /// Dotted namespace, unique within a corpus
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default)]
    pub types: Vec<TypeDef>,
}

impl Protocol {
    /// Parse a protocol from its JSON text
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Records declared in this protocol, in declaration order
    pub fn records(&self) -> impl Iterator<Item = &RecordDef> {
        self.types.iter().filter_map(TypeDef::as_record)
    }
}

/// A named type declared in a protocol, tagged by its `type` key
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TypeDef {
    Record(RecordDef),
    Enum(EnumDef),
    /// `fixed`, `error` and anything else: loadable but never documented
    #[serde(other)]
    Other,
}

impl TypeDef {
    pub fn name(&self) -> Option<&str> {
        match self {
            TypeDef::Record(r) => Some(&r.name),
            TypeDef::Enum(e) => Some(&e.name),
            TypeDef::Other => None,
        }
    }

    /// The explicit namespace override, if any
    pub fn namespace_override(&self) -> Option<&str> {
        match self {
            TypeDef::Record(r) => r.namespace.as_deref(),
            TypeDef::Enum(e) => e.namespace.as_deref(),
            TypeDef::Other => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordDef> {
        match self {
            TypeDef::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn kind(&self) -> Option<TypeKind> {
        match self {
            TypeDef::Record(_) => Some(TypeKind::Record),
            TypeDef::Enum(_) => Some(TypeKind::Enum),
            TypeDef::Other => None,
        }
    }
}

/// The two documentable type kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Record,
    Enum,
}

impl TypeKind {
    /// Output directory for documents of this kind
    pub fn dir_name(&self) -> &'static str {
        match self {
            TypeKind::Record => "records",
            TypeKind::Enum => "enums",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
    /// External table this record is loaded into
    #[serde(rename = "bq-table", default, skip_serializing_if = "Option::is_none")]
    pub bq_table: Option<String>,
}

impl RecordDef {
    /// Namespace the record lives in, given its protocol's namespace
    pub fn effective_namespace<'a>(&'a self, protocol_namespace: &'a str) -> &'a str {
        self.namespace.as_deref().unwrap_or(protocol_namespace)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default)]
    pub symbols: Vec<String>,
}

/// A record field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    /// Raw Avro type expression; interpreted by [`crate::types::normalize`]
    #[serde(rename = "type")]
    pub raw_type: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// Field-level origin; an `origin` inside a structured type takes precedence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

/// Globally addressable field identifier: `{namespace}.{type_name}#{field}`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldId {
    pub namespace: String,
    pub type_name: String,
    pub field: String,
}

impl FieldId {
    pub fn new(
        namespace: impl Into<String>,
        type_name: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            type_name: type_name.into(),
            field: field.into(),
        }
    }

    /// Parse a complete field link.
    ///
    /// Returns `Ok(None)` for links that are well formed but do not name a
    /// field in a namespace (e.g. `platform.Role` or `Z`).
    pub fn parse(link: &str) -> Result<Option<Self>> {
        let parts = unlink(link)?;
        Ok(match (parts.namespace, parts.field) {
            (Some(namespace), Some(field)) => Some(Self {
                namespace,
                type_name: parts.type_name,
                field,
            }),
            _ => None,
        })
    }

    /// `{namespace}.{type_name}`
    pub fn qualified_type(&self) -> String {
        format!("{}.{}", self.namespace, self.type_name)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}#{}", self.namespace, self.type_name, self.field)
    }
}

impl Ord for FieldId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.to_string().cmp(&other.to_string())
    }
}

impl PartialOrd for FieldId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for FieldId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl TryFrom<&str> for FieldId {
    type Error = DocsError;

    fn try_from(link: &str) -> Result<Self> {
        Self::parse(link)?.ok_or_else(|| DocsError::InvalidLink(link.to_string()))
    }
}
