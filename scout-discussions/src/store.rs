//! JSON persistence for discussion lists.
use std::fs;
use std::path::Path;

use scout_common::Result;
use serde::Serialize;

use crate::types::AnalyzedDiscussion;

/// Write `items` as a pretty-printed JSON array, creating parent directories.
pub fn save_json<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut body = serde_json::to_string_pretty(items)?;
    body.push('\n');
    fs::write(path, body)?;
    tracing::info!(target: "scout.store", path = %path.display(), count = items.len(), "saved discussions");
    Ok(())
}

/// Read a list written by [`save_json`]. Classification keys are optional.
pub fn load_json(path: &Path) -> Result<Vec<AnalyzedDiscussion>> {
    let raw = fs::read_to_string(path)?;
    let items: Vec<AnalyzedDiscussion> = serde_json::from_str(&raw)?;
    tracing::debug!(target: "scout.store", path = %path.display(), count = items.len(), "loaded discussions");
    Ok(items)
}
