//! Document Building
//!
//! Orchestrates a documentation run over a corpus of protocols:
//! - FieldMap: built once, up front, from every record field
//! - Per protocol: record documents, enum documents, then the protocol index
//! - Finally: one global index
//!
//! Documents are produced lazily. Nothing is rendered until the caller asks
//! for the next document, so output can be written as it is produced.

use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::error::{DocsError, Result};
use crate::lineage::{extract_origins_with_limit, FieldEntry, FieldMap, MAX_ORIGIN_LEVEL};
use crate::link::Corpus;
use crate::protocol::{simplify_with, EnumSummary, RecordSummary, NO_DOC_STRING};
use crate::render::DocumentRenderer;
use crate::schema::{FieldId, Protocol, TypeKind};
use crate::types::TypeDescriptor;

// =============================================================================
// Document Models
// =============================================================================

/// Everything a record document shows
#[derive(Debug, Clone, Serialize)]
pub struct RecordDoc {
    pub qualified_name: String,
    pub title: String,
    pub bq_table: Option<String>,
    pub doc: String,
    pub fields: Vec<FieldDoc>,
}

/// One field of a record document
#[derive(Debug, Clone, Serialize)]
pub struct FieldDoc {
    pub id: FieldId,
    pub name: String,
    /// Own doc, else the doc of the oldest ancestor, else the placeholder
    pub doc: String,
    #[serde(rename = "type")]
    pub descriptor: TypeDescriptor,
    /// Relative document path of the field's type, for linkable types
    pub type_link: Option<String>,
    /// Ancestors, nearest first
    pub origins: Vec<OriginDoc>,
    /// Ancestor id to its field data
    pub origin_fields: BTreeMap<String, FieldEntry>,
    /// Fields that name this one as their origin
    pub usages: Vec<FieldId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OriginDoc {
    pub id: FieldId,
    pub name: String,
    pub doc: Option<String>,
}

/// Per-protocol index document
#[derive(Debug, Clone, Serialize)]
pub struct ProtocolDoc {
    pub name: String,
    pub namespace: String,
    pub doc: String,
    pub tables: BTreeMap<String, String>,
    pub records: Vec<String>,
    pub enums: Vec<String>,
}

/// The global index document
#[derive(Debug, Clone, Serialize)]
pub struct IndexDoc {
    pub title: String,
    pub protocols: Vec<String>,
}

/// A rendered document and where it goes, relative to the output directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    pub content: String,
}

// =============================================================================
// Builder
// =============================================================================

/// Knobs for a documentation run
#[derive(Debug, Clone)]
pub struct BuildSettings {
    /// Extension of emitted documents, without the dot
    pub extension: String,
    pub max_origin_depth: usize,
    pub missing_doc: String,
    pub index_title: String,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            extension: "rst".to_string(),
            max_origin_depth: MAX_ORIGIN_LEVEL,
            missing_doc: NO_DOC_STRING.to_string(),
            index_title: "Schemata".to_string(),
        }
    }
}

/// Builds documents for a corpus with an explicit renderer
pub struct DocBuilder<'r, R: DocumentRenderer + ?Sized> {
    renderer: &'r R,
    settings: BuildSettings,
}

impl<'r, R: DocumentRenderer + ?Sized> DocBuilder<'r, R> {
    pub fn new(renderer: &'r R, settings: BuildSettings) -> Self {
        Self { renderer, settings }
    }

    /// Start a run. Fails up front when a field type cannot be normalized.
    pub fn build_docs<'a>(&'a self, protocols: &'a [Protocol]) -> Result<Documents<'a, R>> {
        let field_map = FieldMap::from_protocols(protocols)?;
        info!(
            protocols = protocols.len(),
            fields = field_map.len(),
            "starting documentation run"
        );
        Ok(Documents {
            renderer: self.renderer,
            settings: &self.settings,
            corpus: Corpus::new(protocols),
            field_map,
            protocols,
            remaining: protocols,
            pending: VecDeque::new(),
            index_emitted: false,
            finished: false,
        })
    }
}

/// Build documents with default settings
pub fn build_docs<'a, R: DocumentRenderer + ?Sized>(
    renderer: &'a R,
    protocols: &'a [Protocol],
) -> Result<Vec<Document>> {
    let builder = DocBuilder::new(renderer, BuildSettings::default());
    let docs = builder.build_docs(protocols)?.collect();
    docs
}

enum Job {
    Record(RecordSummary),
    Enum(EnumSummary),
    Protocol(ProtocolDoc),
    Index,
}

/// Lazy, one-shot stream of documents.
///
/// Stops after the first error.
pub struct Documents<'a, R: DocumentRenderer + ?Sized> {
    renderer: &'a R,
    settings: &'a BuildSettings,
    corpus: Corpus<'a>,
    field_map: FieldMap,
    protocols: &'a [Protocol],
    remaining: &'a [Protocol],
    pending: VecDeque<Job>,
    index_emitted: bool,
    finished: bool,
}

impl<'a, R: DocumentRenderer + ?Sized> Documents<'a, R> {
    fn next_job(&mut self) -> Option<Job> {
        loop {
            if let Some(job) = self.pending.pop_front() {
                return Some(job);
            }
            match self.remaining.split_first() {
                Some((protocol, rest)) => {
                    self.remaining = rest;
                    self.queue_protocol(protocol);
                }
                None if !self.index_emitted => {
                    self.index_emitted = true;
                    return Some(Job::Index);
                }
                None => return None,
            }
        }
    }

    fn queue_protocol(&mut self, protocol: &Protocol) {
        let simplified = simplify_with(protocol, &self.settings.missing_doc);
        debug!(
            protocol = %simplified.protocol,
            records = simplified.records.len(),
            enums = simplified.enums.len(),
            "queued protocol"
        );

        let protocol_doc = ProtocolDoc {
            name: simplified.protocol,
            namespace: simplified.namespace,
            doc: simplified.doc,
            tables: simplified.tables,
            records: simplified.records.iter().map(|r| r.qualified_name.clone()).collect(),
            enums: simplified.enums.iter().map(|e| e.qualified_name.clone()).collect(),
        };

        self.pending.extend(simplified.records.into_iter().map(Job::Record));
        self.pending.extend(simplified.enums.into_iter().map(Job::Enum));
        self.pending.push_back(Job::Protocol(protocol_doc));
    }

    fn render_job(&self, job: Job) -> Result<Document> {
        match job {
            Job::Record(record) => {
                let path = self.type_path(TypeKind::Record, &record.qualified_name);
                let doc = self.record_doc(record)?;
                Ok(Document { path, content: self.renderer.render_record(&doc)? })
            }
            Job::Enum(summary) => {
                let path = self.type_path(TypeKind::Enum, &summary.qualified_name);
                Ok(Document { path, content: self.renderer.render_enum(&summary)? })
            }
            Job::Protocol(doc) => {
                let path = PathBuf::from(self.file_name(&doc.name));
                Ok(Document { path, content: self.renderer.render_protocol(&doc)? })
            }
            Job::Index => {
                let doc = IndexDoc {
                    title: self.settings.index_title.clone(),
                    protocols: self.protocols.iter().map(|p| p.protocol.clone()).collect(),
                };
                let path = PathBuf::from(self.file_name("index"));
                Ok(Document { path, content: self.renderer.render_index(&doc)? })
            }
        }
    }

    fn record_doc(&self, record: RecordSummary) -> Result<RecordDoc> {
        let fields = record
            .fields
            .iter()
            .map(|id| self.field_doc(id))
            .collect::<Result<Vec<_>>>()?;

        Ok(RecordDoc {
            qualified_name: record.qualified_name,
            title: record.title,
            bq_table: record.bq_table,
            doc: record.doc,
            fields,
        })
    }

    fn field_doc(&self, id: &FieldId) -> Result<FieldDoc> {
        let entry = self
            .field_map
            .get(id)
            .ok_or_else(|| DocsError::UnknownField(id.to_string()))?;
        let chain = extract_origins_with_limit(&self.field_map, id, self.settings.max_origin_depth)?;
        let ancestors: Vec<&FieldEntry> = chain.iter().filter_map(|o| self.field_map.get(o)).collect();

        let doc = entry
            .doc
            .clone()
            .or_else(|| ancestors.last().and_then(|a| a.doc.clone()))
            .unwrap_or_else(|| self.settings.missing_doc.clone());

        // Only types with a page of their own get a link; the rest render as plain names
        let qualified = &entry.descriptor.type_name;
        let type_link = entry
            .descriptor
            .is_linkable
            .then(|| self.corpus.documented_kind(qualified))
            .flatten()
            .map(|kind| format!("../{}/{}", kind.dir_name(), qualified));

        Ok(FieldDoc {
            id: id.clone(),
            name: entry.name.clone(),
            doc,
            descriptor: entry.descriptor.clone(),
            type_link,
            origins: ancestors
                .iter()
                .map(|a| OriginDoc { id: a.id.clone(), name: a.name.clone(), doc: a.doc.clone() })
                .collect(),
            origin_fields: ancestors
                .iter()
                .map(|a| (a.id.to_string(), (*a).clone()))
                .collect(),
            usages: self.field_map.usages(id),
        })
    }

    fn type_path(&self, kind: TypeKind, qualified_name: &str) -> PathBuf {
        PathBuf::from(kind.dir_name()).join(self.file_name(qualified_name))
    }

    fn file_name(&self, stem: &str) -> String {
        format!("{}.{}", stem, self.settings.extension)
    }
}

impl<'a, R: DocumentRenderer + ?Sized> Iterator for Documents<'a, R> {
    type Item = Result<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let Some(job) = self.next_job() else {
            self.finished = true;
            return None;
        };

        let result = self.render_job(job);
        match &result {
            Ok(doc) => debug!(path = %doc.path.display(), "rendered document"),
            Err(_) => self.finished = true,
        }
        Some(result)
    }
}
