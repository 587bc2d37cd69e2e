//! Registry scanning.
//!
//! Read-only enumeration of the extensions root. The scanner materializes a
//! `Vec` so callers can filter the snapshot repeatedly without touching disk
//! again; an explicit re-scan is the only way to refresh it. No ordering is
//! guaranteed, presentation order is the UI's concern.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::PackResult;
use crate::extension::InstalledExtension;
use crate::host::HostNotifier;
use crate::manifest::{LEGACY_MANAGER_ID, SYNTHETIC_PUBLISHER};
use crate::registry::obsolete::ObsoleteSet;

/// Enumerate every extension directory under `root`, skipping directories
/// flagged in the current obsolete set.
pub fn list_all(
    root: &Path,
    locale: &str,
    notifier: &dyn HostNotifier,
) -> PackResult<Vec<InstalledExtension>> {
    let obsolete = ObsoleteSet::load(root);
    let mut records = Vec::new();

    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(dir_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if obsolete.is_obsolete(dir_name) {
            continue;
        }
        records.push(InstalledExtension::from_dir(&path, locale, notifier));
    }

    debug!(count = records.len(), root = %root.display(), "scanned extensions root");
    Ok(records)
}

/// Drop records whose id is reserved: anything in `self_ids` plus the
/// manager's own synthetic packs and the legacy manager id. Keeps the tool
/// from offering itself (or its packs) as pack members.
pub fn filter_excluding_self<'a>(
    records: &'a [InstalledExtension],
    self_ids: &HashSet<String>,
) -> Vec<&'a InstalledExtension> {
    records
        .iter()
        .filter(|r| !self_ids.contains(&r.id) && !is_reserved(&r.id))
        .collect()
}

fn is_reserved(id: &str) -> bool {
    id.starts_with(&format!("{SYNTHETIC_PUBLISHER}.")) || id == LEGACY_MANAGER_ID
}

/// The manager's own synthesized packs.
pub fn custom_packs(records: &[InstalledExtension]) -> Vec<&InstalledExtension> {
    records
        .iter()
        .filter(|r| r.package_json.publisher == SYNTHETIC_PUBLISHER)
        .collect()
}

/// Locate the installed extension whose directory matches `<id>-<version>`.
/// Returns `None` when no live directory carries that id.
pub fn find_by_id(
    root: &Path,
    id: &str,
    locale: &str,
    notifier: &dyn HostNotifier,
) -> PackResult<Option<InstalledExtension>> {
    let records = list_all(root, locale, notifier)?;
    Ok(records.into_iter().find(|r| r.id == id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NullNotifier;
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::tempdir;

    fn make_extension(root: &Path, dir_name: &str) {
        fs::create_dir(root.join(dir_name)).unwrap();
    }

    #[test]
    fn list_all_excludes_obsolete_flagged_directories() {
        let temp = tempdir().unwrap();
        make_extension(temp.path(), "acme.live-1.0.0");
        make_extension(temp.path(), "acme.dead-1.0.0");
        ObsoleteSet::merge(
            temp.path(),
            &BTreeMap::from([("acme.dead-1.0.0".to_string(), true)]),
        )
        .unwrap();

        let records = list_all(temp.path(), "en", &NullNotifier).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "acme.live");
    }

    #[test]
    fn list_all_skips_plain_files() {
        let temp = tempdir().unwrap();
        make_extension(temp.path(), "acme.foo-1.0.0");
        fs::write(temp.path().join("extensions.json"), "[]").unwrap();
        fs::write(temp.path().join(".obsolete"), "{}").unwrap();

        let records = list_all(temp.path(), "en", &NullNotifier).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn filter_excluding_self_drops_reserved_ids() {
        let temp = tempdir().unwrap();
        make_extension(temp.path(), "acme.foo-1.0.0");
        make_extension(temp.path(), "extension-manager.my-pack-1.0.0");
        make_extension(temp.path(), "hayden.extension-pack-manager-0.9.0");

        let records = list_all(temp.path(), "en", &NullNotifier).unwrap();
        let self_ids = HashSet::from(["acme.self".to_string()]);
        let filtered = filter_excluding_self(&records, &self_ids);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "acme.foo");
    }

    #[test]
    fn custom_packs_returns_only_synthesized_ones() {
        let temp = tempdir().unwrap();
        make_extension(temp.path(), "acme.foo-1.0.0");
        make_extension(temp.path(), "extension-manager.my-pack-1.0.0");

        let records = list_all(temp.path(), "en", &NullNotifier).unwrap();
        let packs = custom_packs(&records);
        assert_eq!(packs.len(), 1);
        assert_eq!(packs[0].id, "extension-manager.my-pack");
    }

    #[test]
    fn find_by_id_locates_live_directories_only() {
        let temp = tempdir().unwrap();
        make_extension(temp.path(), "acme.foo-1.0.0");

        let found = find_by_id(temp.path(), "acme.foo", "en", &NullNotifier).unwrap();
        assert!(found.is_some());
        let missing = find_by_id(temp.path(), "acme.gone", "en", &NullNotifier).unwrap();
        assert!(missing.is_none());
    }
}
