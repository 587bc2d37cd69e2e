//! The `.obsolete` file.
//!
//! Directories are never deleted by this tool; they are flagged in a single
//! JSON object mapping directory name to a boolean, which the host honors on
//! its own next scan. The merge rule keeps the file consistent with disk:
//! after every merge only entries naming an existing directory and flagged
//! true survive, so a directory removed externally cannot keep suppressing a
//! future directory that reuses the same name.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::PackResult;

const OBSOLETE_FILE: &str = ".obsolete";

/// The persisted set of directory names marked for removal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObsoleteSet {
    entries: BTreeMap<String, bool>,
}

impl ObsoleteSet {
    /// Load the set from `root`. An absent or malformed file yields an empty
    /// set.
    pub fn load(root: &Path) -> Self {
        let path = root.join(OBSOLETE_FILE);
        let entries = fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        Self { entries }
    }

    /// Whether `dir_name` is currently flagged for removal.
    pub fn is_obsolete(&self, dir_name: &str) -> bool {
        self.entries.get(dir_name).copied().unwrap_or(false)
    }

    pub fn entries(&self) -> &BTreeMap<String, bool> {
        &self.entries
    }

    /// Merge `updates` into the persisted set (updates win on conflict),
    /// prune entries whose directory no longer exists or whose flag is
    /// false, and write the result back. Idempotent.
    pub fn merge(root: &Path, updates: &BTreeMap<String, bool>) -> PackResult<Self> {
        let mut merged = Self::load(root).entries;
        merged.extend(updates.iter().map(|(k, v)| (k.clone(), *v)));

        let entries: BTreeMap<String, bool> = merged
            .into_iter()
            .filter(|(dir_name, flagged)| *flagged && root.join(dir_name).is_dir())
            .collect();

        fs::write(
            root.join(OBSOLETE_FILE),
            serde_json::to_string(&entries)?,
        )?;
        debug!(count = entries.len(), "wrote obsolete set");
        Ok(Self { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn updates(pairs: &[(&str, bool)]) -> BTreeMap<String, bool> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect()
    }

    #[test]
    fn load_defaults_to_empty_on_absent_or_malformed_file() {
        let temp = tempdir().unwrap();
        assert!(ObsoleteSet::load(temp.path()).entries().is_empty());

        fs::write(temp.path().join(".obsolete"), "not json").unwrap();
        assert!(ObsoleteSet::load(temp.path()).entries().is_empty());
    }

    #[test]
    fn merge_prunes_entries_without_a_directory() {
        let temp = tempdir().unwrap();
        fs::create_dir(temp.path().join("A")).unwrap();

        let set = ObsoleteSet::merge(temp.path(), &updates(&[("A", true), ("B", true)])).unwrap();
        assert_eq!(set.entries(), &updates(&[("A", true)]));

        // Re-loading from disk sees the pruned content.
        let reloaded = ObsoleteSet::load(temp.path());
        assert_eq!(reloaded.entries(), &updates(&[("A", true)]));
    }

    #[test]
    fn merge_drops_entries_flagged_false() {
        let temp = tempdir().unwrap();
        fs::create_dir(temp.path().join("A")).unwrap();
        fs::create_dir(temp.path().join("B")).unwrap();

        ObsoleteSet::merge(temp.path(), &updates(&[("A", true), ("B", true)])).unwrap();
        let set = ObsoleteSet::merge(temp.path(), &updates(&[("B", false)])).unwrap();
        assert_eq!(set.entries(), &updates(&[("A", true)]));
    }

    #[test]
    fn merge_is_idempotent() {
        let temp = tempdir().unwrap();
        fs::create_dir(temp.path().join("A")).unwrap();

        let first = ObsoleteSet::merge(temp.path(), &updates(&[("A", true)])).unwrap();
        let raw_first = fs::read_to_string(temp.path().join(".obsolete")).unwrap();
        let second = ObsoleteSet::merge(temp.path(), &updates(&[("A", true)])).unwrap();
        let raw_second = fs::read_to_string(temp.path().join(".obsolete")).unwrap();

        assert_eq!(first, second);
        assert_eq!(raw_first, raw_second);
    }

    #[test]
    fn externally_deleted_directory_disappears_after_next_merge() {
        let temp = tempdir().unwrap();
        fs::create_dir(temp.path().join("A")).unwrap();
        ObsoleteSet::merge(temp.path(), &updates(&[("A", true)])).unwrap();

        fs::remove_dir(temp.path().join("A")).unwrap();
        let set = ObsoleteSet::merge(temp.path(), &BTreeMap::new()).unwrap();
        assert!(set.entries().is_empty());
    }
}
