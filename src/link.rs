//! Link Resolution
//!
//! Links address types and fields across a corpus of protocols:
//! `[namespace "."] Type ["#" field]`.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::error::{DocsError, LookupKind, Result};
use crate::schema::{Field, Protocol, TypeDef, TypeKind};

static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:(?P<namespace>[a-z_][a-z0-9_]*(?:\.[a-z_][a-z0-9_]*)*)\.)?(?P<type>[a-z0-9_]+)(?:#(?P<field>[a-z0-9_]+))?$",
    )
    .expect("link pattern is valid")
});

/// A parsed link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub namespace: Option<String>,
    pub type_name: String,
    pub field: Option<String>,
}

/// Split `namespace.Type#field` into its parts
pub fn unlink(link: &str) -> Result<Link> {
    let caps = LINK_RE
        .captures(link)
        .ok_or_else(|| DocsError::InvalidLink(link.to_string()))?;
    Ok(Link {
        namespace: caps.name("namespace").map(|m| m.as_str().to_string()),
        type_name: caps["type"].to_string(),
        field: caps.name("field").map(|m| m.as_str().to_string()),
    })
}

/// All protocols of one generation run, addressable by namespace
pub struct Corpus<'a> {
    by_namespace: HashMap<&'a str, &'a Protocol>,
    protocols: &'a [Protocol],
}

impl<'a> Corpus<'a> {
    /// Later protocols win when two share a namespace
    pub fn new(protocols: &'a [Protocol]) -> Self {
        let by_namespace = protocols.iter().map(|p| (p.namespace.as_str(), p)).collect();
        Self { by_namespace, protocols }
    }

    pub fn protocol(&self, namespace: &str) -> Option<&'a Protocol> {
        self.by_namespace.get(namespace).copied()
    }

    /// Resolve a qualified type name such as `com.x.User`
    pub fn find_type(&self, qualified_type: &str) -> Result<&'a TypeDef> {
        let link = unlink(qualified_type)?;
        let namespace = link
            .namespace
            .ok_or_else(|| DocsError::lookup(LookupKind::Namespace, qualified_type))?;
        let matches = |t: &&TypeDef| t.name() == Some(link.type_name.as_str());

        if let Some(protocol) = self.protocol(&namespace) {
            let local = protocol
                .types
                .iter()
                .filter(|t| t.namespace_override().is_none())
                .find(matches);
            if let Some(found) = local {
                return Ok(found);
            }
        }

        // Types declared under another protocol with a namespace override
        let overridden = self
            .protocols
            .iter()
            .flat_map(|p| p.types.iter())
            .filter(|t| t.namespace_override() == Some(namespace.as_str()))
            .find(matches);

        match overridden {
            Some(found) => Ok(found),
            None if self.protocol(&namespace).is_none() => {
                Err(DocsError::lookup(LookupKind::Namespace, namespace))
            }
            None => Err(DocsError::lookup(LookupKind::Type, qualified_type)),
        }
    }

    /// Resolve a qualified field name such as `com.x.User#id`
    pub fn find_field(&self, qualified_field: &str) -> Result<&'a Field> {
        let link = unlink(qualified_field)?;
        let field_name = link
            .field
            .ok_or_else(|| DocsError::lookup(LookupKind::Field, qualified_field))?;
        let namespace = link
            .namespace
            .ok_or_else(|| DocsError::lookup(LookupKind::Namespace, qualified_field))?;
        let typ = self.find_type(&format!("{}.{}", namespace, link.type_name))?;

        typ.as_record()
            .and_then(|r| r.fields.iter().find(|f| f.name == field_name))
            .ok_or_else(|| DocsError::lookup(LookupKind::Field, qualified_field))
    }

    /// Kind of a record or enum that gets its own document.
    ///
    /// `None` for fixed types, `map`, inline definitions, undeclared names
    /// and types declared under a namespace override, none of which are
    /// documented on their own page.
    pub fn documented_kind(&self, qualified_type: &str) -> Option<TypeKind> {
        let link = unlink(qualified_type).ok()?;
        let protocol = self.protocol(link.namespace.as_deref()?)?;
        protocol
            .types
            .iter()
            .filter(|t| t.namespace_override().is_none())
            .find(|t| t.name() == Some(link.type_name.as_str()))
            .and_then(TypeDef::kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus_fixture() -> Vec<Protocol> {
        let platform = r#"{
            "protocol": "Platform", "namespace": "com.toptal.platform",
            "types": [
                {"type": "enum", "name": "Kind", "symbols": ["a"]},
                {"type": "fixed", "name": "Md5", "size": 16},
                {"type": "record", "name": "Role", "fields": [
                    {"name": "user_id", "type": "long", "doc": "owner"}
                ]},
                {"type": "record", "name": "Shared", "namespace": "com.toptal.shared",
                 "fields": [{"name": "id", "type": "string"}]}
            ]
        }"#;
        vec![Protocol::from_json(platform).unwrap()]
    }

    #[test]
    fn test_unlink_full() {
        let link = unlink("com.toptal.platform.Role#user_id").unwrap();
        assert_eq!(link.namespace.as_deref(), Some("com.toptal.platform"));
        assert_eq!(link.type_name, "Role");
        assert_eq!(link.field.as_deref(), Some("user_id"));
    }

    #[test]
    fn test_unlink_without_field() {
        let link = unlink("com.toptal.platform.Role").unwrap();
        assert_eq!(link.namespace.as_deref(), Some("com.toptal.platform"));
        assert_eq!(link.field, None);

        let link = unlink("platform.Role").unwrap();
        assert_eq!(link.namespace.as_deref(), Some("platform"));
        assert_eq!(link.type_name, "Role");
        assert_eq!(link.field, None);
    }

    #[test]
    fn test_unlink_bare_type() {
        let link = unlink("Role").unwrap();
        assert_eq!(link.namespace, None);
        assert_eq!(link.type_name, "Role");
    }

    #[test]
    fn test_unlink_invalid() {
        for bad in ["not a link", "", "com.x.", "com.x.Role#", "com..x.Role", "a.B#c#d"] {
            assert!(
                matches!(unlink(bad), Err(DocsError::InvalidLink(ref s)) if s == bad),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_find_type() {
        let protocols = corpus_fixture();
        let corpus = Corpus::new(&protocols);
        assert_eq!(corpus.find_type("com.toptal.platform.Role").unwrap().name(), Some("Role"));
    }

    #[test]
    fn test_documented_kind() {
        let protocols = corpus_fixture();
        let corpus = Corpus::new(&protocols);
        assert_eq!(corpus.documented_kind("com.toptal.platform.Kind"), Some(TypeKind::Enum));
        assert_eq!(corpus.documented_kind("com.toptal.platform.Role"), Some(TypeKind::Record));
        assert_eq!(corpus.documented_kind("com.toptal.platform.Md5"), None);
        assert_eq!(corpus.documented_kind("com.toptal.platform.map"), None);
        assert_eq!(corpus.documented_kind("com.toptal.platform.Missing"), None);
        assert_eq!(corpus.documented_kind("com.missing.Kind"), None);
        // resolvable, but only documented under its declaring protocol's override
        assert!(corpus.find_type("com.toptal.shared.Shared").is_ok());
        assert_eq!(corpus.documented_kind("com.toptal.shared.Shared"), None);
    }

    #[test]
    fn test_find_type_with_namespace_override() {
        let protocols = corpus_fixture();
        let corpus = Corpus::new(&protocols);
        assert_eq!(corpus.find_type("com.toptal.shared.Shared").unwrap().name(), Some("Shared"));
        assert!(corpus.find_type("com.toptal.platform.Shared").is_err());
    }

    #[test]
    fn test_find_type_missing() {
        let protocols = corpus_fixture();
        let corpus = Corpus::new(&protocols);
        assert!(matches!(
            corpus.find_type("com.missing.Role"),
            Err(DocsError::Lookup { kind: LookupKind::Namespace, .. })
        ));
        assert!(matches!(
            corpus.find_type("com.toptal.platform.Missing"),
            Err(DocsError::Lookup { kind: LookupKind::Type, .. })
        ));
    }

    #[test]
    fn test_find_field() {
        let protocols = corpus_fixture();
        let corpus = Corpus::new(&protocols);
        let field = corpus.find_field("com.toptal.platform.Role#user_id").unwrap();
        assert_eq!(field.doc.as_deref(), Some("owner"));
        assert!(matches!(
            corpus.find_field("com.toptal.platform.Role#nope"),
            Err(DocsError::Lookup { kind: LookupKind::Field, .. })
        ));
        assert!(matches!(
            corpus.find_field("com.toptal.platform.Kind#a"),
            Err(DocsError::Lookup { kind: LookupKind::Field, .. })
        ));
    }

    #[test]
    fn test_find_field_without_namespace() {
        let protocols = corpus_fixture();
        let corpus = Corpus::new(&protocols);
        match corpus.find_field("Role#user_id") {
            Err(DocsError::Lookup { kind: LookupKind::Namespace, name }) => {
                assert_eq!(name, "Role#user_id")
            }
            other => panic!("expected Namespace lookup error, got {other:?}"),
        }
    }
}
