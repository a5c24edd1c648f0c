//! Find policy documents grouped by country directory

use crate::error::ExtractorError;
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Category key for documents placed directly under the root
pub const ROOT_CATEGORY: &str = "root";

/// Country/category code → document paths, both sorted
pub type DocumentMap = BTreeMap<String, Vec<PathBuf>>;

/// Walk `root` and group every document by its top-level subdirectory
///
/// A file at `root/US/2020/act.PDF` is filed under `US`; a file directly
/// in `root` is filed under [`ROOT_CATEGORY`]. Extensions are compared
/// case-insensitively. Directories without matching documents are absent
/// from the map.
///
/// # Errors
///
/// Any unreadable directory aborts the walk with [`ExtractorError::Walk`].
pub fn locate_documents(root: &Path, extension: &str) -> Result<DocumentMap, ExtractorError> {
    let mut documents = DocumentMap::new();

    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_file() || !has_extension(entry.path(), extension) {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| ExtractorError::Walk(e.to_string()))?;
        let category = category_of(relative);

        debug!("Found {} under {}", entry.path().display(), category);
        documents
            .entry(category)
            .or_default()
            .push(entry.path().to_path_buf());
    }

    for paths in documents.values_mut() {
        paths.sort();
    }

    info!(
        "Located {} documents in {} categories under {}",
        documents.values().map(Vec::len).sum::<usize>(),
        documents.len(),
        root.display()
    );

    Ok(documents)
}

/// Base filename of a document, used to tag its rules
pub fn document_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

fn category_of(relative: &Path) -> String {
    let mut components = relative.components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(dir)), Some(_)) => dir.to_string_lossy().into_owned(),
        _ => ROOT_CATEGORY.to_string(),
    }
}
