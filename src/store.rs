//! The extension store, the only writer of the extensions root.
//!
//! Orchestrates create/update/uninstall of synthetic packs: directory
//! materialization, obsolete-set bookkeeping, and the host-visible registry
//! metadata. Each operation is a single read-then-write turn; a disk failure
//! is fatal for that operation, reported through the notifier, and never
//! rolled back. A re-scan restores the consistent view.
//!
//! Per logical pack the states are `NOT_INSTALLED -> CREATED -> UPDATED* ->
//! OBSOLETE`, where obsolete is terminal from this tool's point of view (the
//! host deletes the directory on its own schedule).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::error::PackResult;
use crate::extension::InstalledExtension;
use crate::host::HostNotifier;
use crate::manifest::{
    generate_metadata, generate_version, ExtensionManifest, PACK_CATEGORY, SYNTHETIC_PUBLISHER,
};
use crate::registry::metadata;
use crate::registry::metadata::MetadataEntry;
use crate::registry::obsolete::ObsoleteSet;
use crate::strings::kebab_case;

/// Lifecycle manager for synthetic extensions under one extensions root.
pub struct ExtensionStore {
    root: PathBuf,
    locale: String,
    notifier: Arc<dyn HostNotifier>,
}

impl ExtensionStore {
    pub fn new(root: impl Into<PathBuf>, locale: &str, notifier: Arc<dyn HostNotifier>) -> Self {
        Self {
            root: root.into(),
            locale: locale.to_string(),
            notifier,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn notifier(&self) -> &Arc<dyn HostNotifier> {
        &self.notifier
    }

    /// Install a new pack from a draft manifest. Assigns a fresh wall-clock
    /// version stamp and installation metadata, materializes the directory,
    /// upserts the registry-metadata entry, and asks the host to rescan.
    pub fn create(&self, draft: ExtensionManifest) -> PackResult<InstalledExtension> {
        self.install(draft)
            .inspect_err(|e| self.notifier.error(&e.to_string()))
    }

    /// Re-install a pack from an edited draft. When the draft carries a
    /// previous-location marker, that directory is flagged obsolete before
    /// the new one is materialized, so the old and new versions never both
    /// appear live to the host's scanner.
    pub fn update(&self, draft: ExtensionManifest) -> PackResult<InstalledExtension> {
        self.install(draft)
            .inspect_err(|e| self.notifier.error(&e.to_string()))
    }

    fn install(&self, mut draft: ExtensionManifest) -> PackResult<InstalledExtension> {
        if let Some(previous) = draft.obsolete.take() {
            ObsoleteSet::merge(&self.root, &BTreeMap::from([(previous, true)]))?;
        }
        draft.version = generate_version();
        draft.metadata = Some(generate_metadata(&draft.publisher));

        let installed =
            InstalledExtension::materialize(&self.root, draft, &self.locale, &*self.notifier)?;
        metadata::upsert(
            &self.root,
            MetadataEntry::new(&self.root, &installed.id, &installed.package_json.version),
        )?;
        info!(id = %installed.id, version = %installed.package_json.version, "installed pack");
        self.notifier.request_rescan();
        Ok(installed)
    }

    /// Mark the directory `<id>-<version>` obsolete and ask the host to
    /// rescan. Files stay on disk; deletion is the host's job.
    pub fn uninstall(&self, id: &str, version: &str) -> PackResult<()> {
        let dir_name = format!("{id}-{version}");
        let result =
            ObsoleteSet::merge(&self.root, &BTreeMap::from([(dir_name.clone(), true)]));
        match result {
            Ok(_) => {
                info!(%dir_name, "marked pack obsolete");
                self.notifier.request_rescan();
                Ok(())
            }
            Err(e) => {
                self.notifier.error(&e.to_string());
                Err(e)
            }
        }
    }

    /// Create the on-disk skeleton for a newly named pack (version `1.0.0`,
    /// no icon, empty member list) so a panel can be opened on it. An
    /// existing directory for the same name is reused as-is.
    pub fn scaffold(&self, raw_name: &str) -> PackResult<InstalledExtension> {
        let dir_name = format!("{SYNTHETIC_PUBLISHER}.{}-1.0.0", kebab_case(raw_name));
        let dir = self.root.join(&dir_name);
        if !dir.is_dir() {
            let manifest = ExtensionManifest {
                description: Some("Created by Extension Manager".to_string()),
                categories: vec![PACK_CATEGORY.to_string()],
                metadata: Some(generate_metadata(SYNTHETIC_PUBLISHER)),
                ..ExtensionManifest::from_directory_name(&dir_name)
                    .unwrap_or_else(ExtensionManifest::fallback)
            };
            let result: PackResult<()> = (|| {
                fs::create_dir_all(&dir)?;
                fs::write(
                    dir.join("package.json"),
                    serde_json::to_string_pretty(&manifest)?,
                )?;
                crate::extension::write_readme(
                    &dir,
                    manifest.display_name.as_deref().unwrap_or(&manifest.name),
                )?;
                Ok(())
            })();
            if let Err(e) = result {
                self.notifier.error(&e.to_string());
                return Err(e);
            }
            info!(%dir_name, "scaffolded new pack");
        }
        Ok(InstalledExtension::from_dir(&dir, &self.locale, &*self.notifier))
    }
}
