//! Protocol Simplification
//!
//! Projects a raw protocol into the sorted summaries its documents are built
//! from. Output ordering depends only on qualified names, never on the order
//! types or fields were declared in.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::schema::{EnumDef, FieldId, Protocol, RecordDef, TypeDef};

/// Placeholder for types and protocols without a `doc`
pub const NO_DOC_STRING: &str = "documentation missing";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumSummary {
    pub qualified_name: String,
    pub doc: String,
    pub symbols: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordSummary {
    pub bq_table: Option<String>,
    pub qualified_name: String,
    pub doc: String,
    /// `bq_table` when mapped to a table, otherwise the qualified name
    pub title: String,
    pub fields: Vec<FieldId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimplifiedProtocol {
    pub protocol: String,
    pub namespace: String,
    pub doc: String,
    pub enums: Vec<EnumSummary>,
    pub records: Vec<RecordSummary>,
    /// Table name to qualified record name
    pub tables: BTreeMap<String, String>,
}

/// Simplify with the default missing-doc placeholder
pub fn simplify(protocol: &Protocol) -> SimplifiedProtocol {
    simplify_with(protocol, NO_DOC_STRING)
}

/// Simplify one protocol.
///
/// Types with a namespace override belong to that namespace and are left out.
pub fn simplify_with(protocol: &Protocol, missing_doc: &str) -> SimplifiedProtocol {
    let namespace = protocol.namespace.as_str();
    let doc_or_default = |doc: &Option<String>| doc.clone().unwrap_or_else(|| missing_doc.to_string());

    let local_types = protocol.types.iter().filter(|t| t.namespace_override().is_none());

    let mut enums = Vec::new();
    let mut records = Vec::new();
    for typ in local_types {
        match typ {
            TypeDef::Enum(e) => enums.push(enum_summary(e, namespace, &doc_or_default)),
            TypeDef::Record(r) => records.push(record_summary(r, namespace, &doc_or_default)),
            TypeDef::Other => {}
        }
    }
    enums.sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name));
    records.sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name));

    let tables = records
        .iter()
        .filter_map(|r| r.bq_table.clone().map(|t| (t, r.qualified_name.clone())))
        .collect();

    SimplifiedProtocol {
        protocol: protocol.protocol.clone(),
        namespace: namespace.to_string(),
        doc: doc_or_default(&protocol.doc),
        enums,
        records,
        tables,
    }
}

fn enum_summary(e: &EnumDef, namespace: &str, doc: &impl Fn(&Option<String>) -> String) -> EnumSummary {
    let mut symbols = e.symbols.clone();
    symbols.sort();
    EnumSummary {
        qualified_name: format!("{}.{}", namespace, e.name),
        doc: doc(&e.doc),
        symbols,
    }
}

fn record_summary(r: &RecordDef, namespace: &str, doc: &impl Fn(&Option<String>) -> String) -> RecordSummary {
    let qualified_name = format!("{}.{}", namespace, r.name);
    let mut fields: Vec<FieldId> = r
        .fields
        .iter()
        .map(|f| FieldId::new(namespace, &r.name, &f.name))
        .collect();
    fields.sort();

    RecordSummary {
        bq_table: r.bq_table.clone(),
        title: r.bq_table.clone().unwrap_or_else(|| qualified_name.clone()),
        qualified_name,
        doc: doc(&r.doc),
        fields,
    }
}
