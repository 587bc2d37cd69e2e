//! The host-visible `extensions.json` registry file.
//!
//! One entry per installed extension; the host reads this list to locate
//! extension directories. Updates replace in place by identifier, so the
//! invariant of at most one entry per id holds across create/update cycles.

use std::fs;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::PackResult;

const METADATA_FILE: &str = "extensions.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionIdentifier {
    pub id: String,
}

/// Location object as the host writes it: a file-URI shaped record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryLocation {
    #[serde(rename = "$mid")]
    pub mid: u32,
    pub path: String,
    pub scheme: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryMetadata {
    /// Generated per-installation UUID.
    pub id: String,
    /// Milliseconds since the epoch.
    pub installed_timestamp: i64,
    pub source: String,
}

/// One row of `extensions.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataEntry {
    pub identifier: ExtensionIdentifier,
    pub version: String,
    pub location: EntryLocation,
    /// `id-version`, the directory name relative to the extensions root.
    pub relative_location: String,
    pub metadata: EntryMetadata,
}

impl MetadataEntry {
    /// Build a fresh entry for an extension directory under `root`.
    pub fn new(root: &Path, id: &str, version: &str) -> Self {
        let relative_location = format!("{id}-{version}");
        let absolute = root.join(&relative_location);
        Self {
            identifier: ExtensionIdentifier { id: id.to_string() },
            version: version.to_string(),
            location: EntryLocation {
                mid: 1,
                path: absolute.to_string_lossy().into_owned(),
                scheme: "file".to_string(),
            },
            relative_location,
            metadata: EntryMetadata {
                id: Uuid::new_v4().to_string(),
                installed_timestamp: Utc::now().timestamp_millis(),
                source: "vsix".to_string(),
            },
        }
    }
}

/// Read the registry list. Absent or malformed content yields an empty list.
pub fn load(root: &Path) -> Vec<MetadataEntry> {
    fs::read_to_string(root.join(METADATA_FILE))
        .ok()
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default()
}

/// Insert or replace the entry for `entry.identifier.id` and write the list
/// back. Lookup is by id only, so a version bump replaces rather than
/// duplicates.
pub fn upsert(root: &Path, entry: MetadataEntry) -> PackResult<Vec<MetadataEntry>> {
    let mut entries = load(root);
    match entries
        .iter_mut()
        .find(|e| e.identifier.id == entry.identifier.id)
    {
        Some(existing) => *existing = entry,
        None => entries.push(entry),
    }
    fs::write(
        root.join(METADATA_FILE),
        serde_json::to_string(&entries)?,
    )?;
    debug!(count = entries.len(), "wrote registry metadata");
    Ok(entries)
}
