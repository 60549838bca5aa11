//! Document output

use std::fs;
use std::path::{Path, PathBuf};

use crate::builder::Document;
use crate::error::Result;

/// Write one document under `output_dir`, creating parent directories.
///
/// Returns the absolute path written.
pub fn write_document(output_dir: &Path, document: &Document) -> Result<PathBuf> {
    let path = output_dir.join(&document.path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, &document.content)?;
    Ok(path)
}
