//! Field Lineage
//!
//! A field may declare an `origin`: the field it was derived from. The
//! [`FieldMap`] flattens every record field of a corpus so that origin
//! chains can be followed without going back to the protocols.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use crate::error::{DocsError, Result};
use crate::schema::{FieldId, Protocol};
use crate::types::{normalize, TypeDescriptor};

/// Default cap on the length of a lineage chain
pub const MAX_ORIGIN_LEVEL: usize = 10;

/// One flattened record field
#[derive(Debug, Clone, Serialize)]
pub struct FieldEntry {
    pub id: FieldId,
    pub name: String,
    pub doc: Option<String>,
    #[serde(rename = "type")]
    pub descriptor: TypeDescriptor,
}

impl FieldEntry {
    pub fn origin(&self) -> Option<&str> {
        self.descriptor.origin.as_deref()
    }
}

/// Corpus-wide map from field id to its normalized entry
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    fields: BTreeMap<FieldId, FieldEntry>,
}

impl FieldMap {
    /// Flatten every record field of every protocol
    pub fn from_protocols(protocols: &[Protocol]) -> Result<Self> {
        let mut map = Self::default();
        for protocol in protocols {
            for record in protocol.records() {
                let namespace = record.effective_namespace(&protocol.namespace);
                for field in &record.fields {
                    let mut descriptor = normalize(&field.raw_type)?.qualified(namespace);
                    if descriptor.origin.is_none() {
                        descriptor.origin = field.origin.clone();
                    }
                    let id = FieldId::new(namespace, &record.name, &field.name);
                    map.insert(FieldEntry {
                        id,
                        name: field.name.clone(),
                        doc: field.doc.clone(),
                        descriptor,
                    });
                }
            }
        }
        debug!(fields = map.len(), "built field map");
        Ok(map)
    }

    pub fn insert(&mut self, entry: FieldEntry) {
        self.fields.insert(entry.id.clone(), entry);
    }

    pub fn get(&self, id: &FieldId) -> Option<&FieldEntry> {
        self.fields.get(id)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Resolve an origin link to the entry it names
    fn resolve_origin(&self, origin: &str) -> Result<&FieldEntry> {
        FieldId::parse(origin)?
            .and_then(|id| self.fields.get(&id))
            .ok_or_else(|| DocsError::InvalidOrigin(origin.to_string()))
    }

    /// Fields whose origin is `id`, in id order
    pub fn usages(&self, id: &FieldId) -> Vec<FieldId> {
        self.fields
            .values()
            .filter(|entry| {
                entry
                    .origin()
                    .and_then(|o| FieldId::parse(o).ok().flatten())
                    .is_some_and(|o| &o == id)
            })
            .map(|entry| entry.id.clone())
            .collect()
    }
}

/// Follow the origin chain of `field_id` with the default depth cap
pub fn extract_origins(field_map: &FieldMap, field_id: &FieldId) -> Result<Vec<FieldId>> {
    extract_origins_with_limit(field_map, field_id, MAX_ORIGIN_LEVEL)
}

/// Follow the origin chain of `field_id`.
///
/// Returns the ancestors nearest first. A revisited id is a cycle; a chain
/// longer than `max_depth` is reported the same way.
pub fn extract_origins_with_limit(
    field_map: &FieldMap,
    field_id: &FieldId,
    max_depth: usize,
) -> Result<Vec<FieldId>> {
    let mut current = field_map
        .get(field_id)
        .ok_or_else(|| DocsError::UnknownField(field_id.to_string()))?;

    let mut visited: HashSet<&FieldId> = HashSet::from([field_id]);
    let mut chain: Vec<FieldId> = Vec::new();

    while let Some(origin) = current.origin() {
        let next = field_map.resolve_origin(origin)?;
        let revisited = !visited.insert(&next.id);
        chain.push(next.id.clone());
        if revisited || chain.len() > max_depth {
            return Err(DocsError::CyclicReference {
                field: field_id.to_string(),
                trace: chain.iter().map(ToString::to_string).collect(),
            });
        }
        current = next;
    }

    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> FieldId {
        FieldId::new("com.x", name, "f")
    }

    fn entry(name: &str, origin: Option<&str>) -> FieldEntry {
        FieldEntry {
            id: id(name),
            name: "f".to_string(),
            doc: Some(format!("doc of {name}")),
            descriptor: TypeDescriptor {
                type_name: "string".to_string(),
                is_array: false,
                nullable: false,
                is_avro_primitive: true,
                is_linkable: false,
                origin: origin.map(String::from),
            },
        }
    }

    fn map_of(entries: Vec<FieldEntry>) -> FieldMap {
        let mut map = FieldMap::default();
        for e in entries {
            map.insert(e);
        }
        map
    }

    #[test]
    fn test_no_origin_is_empty_chain() {
        let map = map_of(vec![entry("A", None), entry("B", None)]);
        assert!(extract_origins(&map, &id("A")).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_field() {
        let map = map_of(vec![entry("A", None)]);
        match extract_origins(&map, &id("B")) {
            Err(DocsError::UnknownField(name)) => assert_eq!(name, "com.x.B#f"),
            other => panic!("expected UnknownField, got {other:?}"),
        }
    }

    #[test]
    fn test_single_origin() {
        let map = map_of(vec![entry("A", Some("com.x.B#f")), entry("B", None)]);
        assert_eq!(extract_origins(&map, &id("A")).unwrap(), vec![id("B")]);
    }

    #[test]
    fn test_chain_in_order() {
        let map = map_of(vec![
            entry("A", Some("com.x.B#f")),
            entry("B", Some("com.x.C#f")),
            entry("C", None),
        ]);
        assert_eq!(extract_origins(&map, &id("A")).unwrap(), vec![id("B"), id("C")]);
    }

    #[test]
    fn test_dangling_origin_names_reference() {
        let map = map_of(vec![entry("A", Some("com.x.Z#f"))]);
        match extract_origins(&map, &id("A")) {
            Err(DocsError::InvalidOrigin(origin)) => assert_eq!(origin, "com.x.Z#f"),
            other => panic!("expected InvalidOrigin, got {other:?}"),
        }
    }

    #[test]
    fn test_origin_that_is_not_a_field_id() {
        let map = map_of(vec![entry("A", Some("Z"))]);
        match extract_origins(&map, &id("A")) {
            Err(err @ DocsError::InvalidOrigin(_)) => {
                assert_eq!(err.to_string(), "Invalid origin reference 'Z'")
            }
            other => panic!("expected InvalidOrigin, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_origin_is_invalid_link() {
        let map = map_of(vec![entry("A", Some("not a link"))]);
        assert!(matches!(
            extract_origins(&map, &id("A")),
            Err(DocsError::InvalidLink(_))
        ));
    }

    #[test]
    fn test_self_cycle() {
        let map = map_of(vec![entry("A", Some("com.x.A#f"))]);
        match extract_origins(&map, &id("A")) {
            Err(DocsError::CyclicReference { field, trace }) => {
                assert_eq!(field, "com.x.A#f");
                assert_eq!(trace, vec!["com.x.A#f"]);
            }
            other => panic!("expected CyclicReference, got {other:?}"),
        }
    }

    #[test]
    fn test_three_field_cycle_reports_trace() {
        let map = map_of(vec![
            entry("A", Some("com.x.B#f")),
            entry("B", Some("com.x.C#f")),
            entry("C", Some("com.x.A#f")),
        ]);
        match extract_origins(&map, &id("A")) {
            Err(DocsError::CyclicReference { trace, .. }) => {
                assert_eq!(trace, vec!["com.x.B#f", "com.x.C#f", "com.x.A#f"]);
            }
            other => panic!("expected CyclicReference, got {other:?}"),
        }
    }

    #[test]
    fn test_cycle_not_through_start_field() {
        let map = map_of(vec![
            entry("A", Some("com.x.B#f")),
            entry("B", Some("com.x.C#f")),
            entry("C", Some("com.x.B#f")),
        ]);
        assert!(matches!(
            extract_origins(&map, &id("A")),
            Err(DocsError::CyclicReference { .. })
        ));
    }

    #[test]
    fn test_depth_cap() {
        // F0 -> F1 -> ... -> F11, eleven ancestors
        let entries: Vec<FieldEntry> = (0..12)
            .map(|i| {
                let origin = (i < 11).then(|| format!("com.x.F{}#f", i + 1));
                entry(&format!("F{i}"), origin.as_deref())
            })
            .collect();
        let map = map_of(entries);

        assert_eq!(extract_origins_with_limit(&map, &id("F0"), 11).unwrap().len(), 11);
        assert!(matches!(
            extract_origins(&map, &id("F0")),
            Err(DocsError::CyclicReference { .. })
        ));
        assert_eq!(extract_origins(&map, &id("F1")).unwrap().len(), 10);
    }

    #[test]
    fn test_usages() {
        let map = map_of(vec![
            entry("A", Some("com.x.C#f")),
            entry("B", Some("com.x.C#f")),
            entry("C", None),
        ]);
        assert_eq!(map.usages(&id("C")), vec![id("A"), id("B")]);
        assert!(map.usages(&id("A")).is_empty());
    }

    #[test]
    fn test_from_protocols_qualifies_types_and_origins() {
        let protocol = Protocol::from_json(
            r#"{"protocol": "P", "namespace": "com.x", "types": [
                {"type": "enum", "name": "Kind", "symbols": []},
                {"type": "record", "name": "User", "fields": [
                    {"name": "id", "type": "string"},
                    {"name": "kind", "type": ["null", "Kind"]},
                    {"name": "email", "type": "string", "origin": "com.x.User#id"},
                    {"name": "alias", "type": {"type": "string", "origin": "com.x.User#email"}}
                ]}
            ]}"#,
        )
        .unwrap();
        let map = FieldMap::from_protocols(&[protocol]).unwrap();
        assert_eq!(map.len(), 4);

        let kind = map.get(&FieldId::new("com.x", "User", "kind")).unwrap();
        assert_eq!(kind.descriptor.type_name, "com.x.Kind");
        assert!(kind.descriptor.nullable);

        let email = map.get(&FieldId::new("com.x", "User", "email")).unwrap();
        assert_eq!(email.origin(), Some("com.x.User#id"));

        let chain = extract_origins(&map, &FieldId::new("com.x", "User", "alias")).unwrap();
        assert_eq!(
            chain,
            vec![FieldId::new("com.x", "User", "email"), FieldId::new("com.x", "User", "id")]
        );
    }
}
