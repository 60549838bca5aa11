//! Error types for documentation generation

use thiserror::Error;

/// Result type for documentation operations
pub type Result<T> = std::result::Result<T, DocsError>;

/// Documentation generation errors
///
/// Every variant except `Io` describes a defect in the input corpus. None of
/// them is retried; a generation run stops at the first one.
#[derive(Error, Debug)]
pub enum DocsError {
    #[error("Unsupported type: {raw}")]
    UnsupportedType { raw: serde_json::Value },

    #[error("Invalid link: {0}")]
    InvalidLink(String),

    #[error("{kind} not found: {name}")]
    Lookup { kind: LookupKind, name: String },

    #[error("Nonexistent field {0}")]
    UnknownField(String),

    #[error("Invalid origin reference '{0}'")]
    InvalidOrigin(String),

    #[error("Cyclic reference for field {field} and origin {trace:?}")]
    CyclicReference { field: String, trace: Vec<String> },

    #[error("Template error: {0}")]
    Template(#[from] handlebars::RenderError),

    #[error("Template registration failed: {0}")]
    TemplateRegistration(#[from] Box<handlebars::TemplateError>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// What a failed corpus lookup was looking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Namespace,
    Type,
    Field,
}

impl std::fmt::Display for LookupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LookupKind::Namespace => "Namespace",
            LookupKind::Type => "Type",
            LookupKind::Field => "Field",
        };
        f.write_str(label)
    }
}

impl DocsError {
    pub(crate) fn lookup(kind: LookupKind, name: impl Into<String>) -> Self {
        DocsError::Lookup { kind, name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cyclic_message_carries_trace() {
        let err = DocsError::CyclicReference {
            field: "com.x.A#a".to_string(),
            trace: vec!["com.x.A#a".to_string()],
        };
        assert_eq!(
            err.to_string(),
            r#"Cyclic reference for field com.x.A#a and origin ["com.x.A#a"]"#
        );
    }

    #[test]
    fn test_lookup_message() {
        let err = DocsError::lookup(LookupKind::Namespace, "com.missing");
        assert_eq!(err.to_string(), "Namespace not found: com.missing");
    }
}
