//! Avro Schema Docs
//!
//! Generates cross-referenced reStructuredText documentation from a directory
//! of Avro protocol (`.avpr`) files.
//!
//! ## Features
//!
//! - **Type Normalization**: primitives, references, arrays and nullable
//!   unions collapse into one [`TypeDescriptor`]
//! - **Link Resolution**: `namespace.Type#field` links resolve across the corpus
//! - **Field Lineage**: `origin` chains are followed to the oldest ancestor,
//!   with cycle detection
//! - **Table Mappings**: records declaring `bq-table` are listed per protocol
//!
//! ## Output
//!
//! ```text
//! out/
//! ├── records/
//! │   └── com.x.User.rst
//! ├── enums/
//! │   └── com.x.Kind.rst
//! ├── Platform.rst
//! └── index.rst
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod lineage;
pub mod link;
pub mod loader;
pub mod protocol;
pub mod render;
pub mod schema;
pub mod types;
pub mod writer;

pub use builder::{build_docs, BuildSettings, DocBuilder, Document, Documents};
pub use config::DocsConfig;
pub use error::{DocsError, LookupKind, Result};
pub use lineage::{extract_origins, FieldEntry, FieldMap, MAX_ORIGIN_LEVEL};
pub use link::{unlink, Corpus, Link};
pub use loader::{load_protocols, LoadConfig, LoadedCorpus};
pub use protocol::{simplify, SimplifiedProtocol};
pub use render::{DocumentRenderer, RstRenderer};
pub use schema::{FieldId, Protocol, TypeDef};
pub use types::{is_avro_primitive, is_linkable, normalize, TypeDescriptor, TypeShape};
pub use writer::write_document;
