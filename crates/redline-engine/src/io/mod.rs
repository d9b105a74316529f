//! Loading and saving the serialized document tree.
//!
//! The on-disk form is the JSON serialization of [`Document`]. Saves go
//! through a temporary sibling file and a rename, so a crash mid-write never
//! leaves a half-written document behind.

use std::fs;
use std::path::Path;

use crate::doc::Document;
use crate::error::{Error, Result};

/// Load a document from disk, reseed its ID counters from the tree, and
/// reject structurally invalid trees before handing the document out.
pub fn load_document(path: &Path) -> Result<Document> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let raw = fs::read_to_string(path)?;
    let mut doc: Document =
        serde_json::from_str(&raw).map_err(|source| Error::MalformedPackage {
            path: path.to_path_buf(),
            source,
        })?;
    doc.reseed_counters();
    doc.validate()?;
    log::debug!("loaded document from {}", path.display());
    Ok(doc)
}

/// Save a document to disk atomically. The document is validated first; an
/// invalid tree is never written.
pub fn save_document(doc: &Document, path: &Path) -> Result<()> {
    doc.validate()?;
    let encoded = serde_json::to_string_pretty(doc)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let tmp = temp_sibling(path);
    fs::write(&tmp, encoded)?;
    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(err.into());
    }
    log::debug!("saved document to {}", path.display());
    Ok(())
}

fn temp_sibling(path: &Path) -> std::path::PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    path.with_file_name(format!("{name}.tmp"))
}
