//! Protocol Loading
//!
//! Reads every protocol file of a directory, parses it, and computes a
//! digest of the whole bundle.

use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::schema::Protocol;

/// Configuration for protocol loading
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Extension of protocol files, without the dot
    pub extension: String,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            extension: "avpr".to_string(),
        }
    }
}

/// Protocols loaded from one directory
#[derive(Debug, Clone)]
pub struct LoadedCorpus {
    pub protocols: Vec<Protocol>,
    /// Source file of each protocol, same order as `protocols`
    pub sources: Vec<PathBuf>,
    /// SHA-256 over the contents of all loaded files, in load order
    pub bundle_hash: String,
}

/// Load protocol files directly inside `protocol_dir`, sorted by path
pub fn load_protocols(protocol_dir: &Path, config: &LoadConfig) -> anyhow::Result<LoadedCorpus> {
    let mut paths: Vec<PathBuf> = WalkDir::new(protocol_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .map(|ext| ext == config.extension.as_str())
                .unwrap_or(false)
        })
        .collect();
    paths.sort();

    let mut protocols = Vec::with_capacity(paths.len());
    let mut namespaces = HashSet::with_capacity(paths.len());
    let mut hasher = Sha256::new();

    for path in &paths {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        hasher.update(content.as_bytes());

        let protocol: Protocol = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse JSON in {}: {}", path.display(), e))?;

        if !namespaces.insert(protocol.namespace.clone()) {
            warn!(
                namespace = %protocol.namespace,
                path = %path.display(),
                "duplicate protocol namespace; the later file wins lookups"
            );
        }
        debug!(path = %path.display(), protocol = %protocol.protocol, "loaded protocol");
        protocols.push(protocol);
    }

    let bundle_hash = format!("{:x}", hasher.finalize());
    info!(
        dir = %protocol_dir.display(),
        protocols = protocols.len(),
        bundle_hash = %bundle_hash,
        "loaded protocols"
    );

    Ok(LoadedCorpus {
        protocols,
        sources: paths,
        bundle_hash,
    })
}
