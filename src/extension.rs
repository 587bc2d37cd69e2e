//! Installed extension records.
//!
//! An [`InstalledExtension`] wraps a manifest with its owning directory and a
//! resolved icon, shaped identically for real extensions and for the packs
//! this tool synthesizes. Parsing is deliberately forgiving: a directory with
//! no manifest gets one derived from its name, and malformed JSON is replaced
//! by the derived/default manifest with a warning rather than an error.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::PackResult;
use crate::host::HostNotifier;
use crate::icon;
use crate::manifest::{ExtensionManifest, CUSTOM_CATEGORY};
use crate::nls::I18n;

const MANIFEST_FILE: &str = "package.json";
const README_FILE: &str = "README.MD";

/// An extension as seen under the extensions root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledExtension {
    /// Canonical identifier, `publisher.name`.
    pub id: String,
    /// Absolute path of the directory containing the extension.
    pub extension_path: PathBuf,
    /// Icon resolved to a displayable data URI.
    pub icon_data: String,
    /// The parsed contents of the extension's `package.json`.
    #[serde(rename = "packageJSON")]
    pub package_json: ExtensionManifest,
}

impl InstalledExtension {
    /// Construct a record by scanning `path`.
    ///
    /// Falls back to a manifest derived from the directory name when
    /// `package.json` is absent or unreadable; never fails.
    pub fn from_dir(path: &Path, locale: &str, notifier: &dyn HostNotifier) -> Self {
        let mut manifest = parse_manifest(path, notifier);

        // Substitute %token% fields from the extension's own nls bundle.
        let i18n = I18n::load(path, locale);
        localize_manifest(&mut manifest, &i18n);

        let icon_file = manifest.icon.as_deref().unwrap_or("icon.png");
        let icon_data = icon::resolve(&path.join(icon_file));

        Self {
            id: manifest.id(),
            extension_path: path.to_path_buf(),
            icon_data,
            package_json: manifest,
        }
    }

    /// Write `manifest` out as a fully-formed extension directory under
    /// `root` and return the freshly re-scanned record.
    ///
    /// After this returns, the directory is indistinguishable from a normally
    /// installed extension: `package.json`, `icon.<ext>`, `README.MD`.
    pub fn materialize(
        root: &Path,
        mut manifest: ExtensionManifest,
        locale: &str,
        notifier: &dyn HostNotifier,
    ) -> PackResult<Self> {
        let dir = root.join(manifest.directory_name());
        fs::create_dir_all(&dir)?;

        // Decode the draft's embedded icon payload (or the built-in default)
        // into an icon file and point the manifest at it. A plain file path
        // in the icon field is left untouched.
        let payload = manifest.icon.as_deref().unwrap_or(icon::DEFAULT_ICON_DATA);
        if let Some(decoded) = icon::decode(payload) {
            let icon_name = decoded.file_name();
            fs::write(dir.join(&icon_name), &decoded.bytes)?;
            manifest.icon = Some(icon_name);
        }

        write_readme(
            &dir,
            manifest.display_name.as_deref().unwrap_or(&manifest.name),
        )?;

        if !manifest.categories.iter().any(|c| c == CUSTOM_CATEGORY) {
            manifest.categories.push(CUSTOM_CATEGORY.to_string());
        }
        dedup_preserving_order(&mut manifest.extension_pack);
        // The previous-location marker is session bookkeeping, not manifest
        // content.
        manifest.obsolete = None;

        fs::write(
            dir.join(MANIFEST_FILE),
            serde_json::to_string_pretty(&manifest)?,
        )?;
        debug!(dir = %dir.display(), "materialized extension");

        Ok(Self::from_dir(&dir, locale, notifier))
    }

    /// Localized display name with sensible fallback to the raw name.
    pub fn display_name(&self) -> &str {
        self.package_json
            .display_name
            .as_deref()
            .unwrap_or(&self.package_json.name)
    }
}

/// Read and parse `package.json`, falling back per the recovery policy:
/// malformed JSON or a missing file yields a manifest derived from the
/// directory name, and an unparseable name yields the hard-coded default.
fn parse_manifest(path: &Path, notifier: &dyn HostNotifier) -> ExtensionManifest {
    let dir_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let derived = || {
        ExtensionManifest::from_directory_name(dir_name).unwrap_or_else(|| {
            warn!(dir = %path.display(), "directory name does not match publisher.name-version");
            ExtensionManifest::fallback()
        })
    };

    let manifest_path = path.join(MANIFEST_FILE);
    if !manifest_path.is_file() {
        return derived();
    }
    match fs::read_to_string(&manifest_path)
        .map_err(|e| e.to_string())
        .and_then(|raw| serde_json::from_str(&raw).map_err(|e| e.to_string()))
    {
        Ok(manifest) => manifest,
        Err(message) => {
            warn!(path = %manifest_path.display(), %message, "malformed manifest, substituting derived one");
            notifier.warn(&format!(
                "Could not read {}: {message}",
                manifest_path.display()
            ));
            derived()
        }
    }
}

/// Resolve `%token%` wrappers in every top-level string field. Runs before
/// the id is computed, so a localized `name` or `publisher` flows into it.
fn localize_manifest(manifest: &mut ExtensionManifest, i18n: &I18n) {
    for field in [
        &mut manifest.name,
        &mut manifest.version,
        &mut manifest.publisher,
    ] {
        *field = i18n.resolve_field(field);
    }
    for field in [
        &mut manifest.icon,
        &mut manifest.display_name,
        &mut manifest.description,
    ] {
        if let Some(value) = field.take() {
            *field = Some(i18n.resolve_field(&value));
        }
    }
    for value in manifest.extra.values_mut() {
        if let serde_json::Value::String(s) = value {
            *value = serde_json::Value::String(i18n.resolve_field(s));
        }
    }
}

fn dedup_preserving_order(ids: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    ids.retain(|id| seen.insert(id.clone()));
}

/// Write the generated bilingual README into an extension directory.
pub(crate) fn write_readme(dir: &Path, display_name: &str) -> std::io::Result<()> {
    fs::write(dir.join(README_FILE), readme_content(display_name))
}

fn readme_content(display_name: &str) -> String {
    format!(
        "# {display_name}\n\n\
         点击管理按钮 &#9881;&#65039; ，选择 `编辑扩展包` 进入编辑页面，点击扩展图标上传自定义图片，选择扩展后点击保存。\n\n\
         Click &#9881;&#65039; and select `Edit Extension Pack` to go to the edit page.\n\
         Click the extension icon to upload the custom picture. Select extensions for extension pack.\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NullNotifier;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn from_dir_without_manifest_derives_from_directory_name() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("acme.foo-1.2.3");
        fs::create_dir(&dir).unwrap();

        let ext = InstalledExtension::from_dir(&dir, "en", &NullNotifier);
        assert_eq!(ext.id, "acme.foo");
        assert_eq!(ext.package_json.version, "1.2.3");
        assert_eq!(ext.package_json.display_name.as_deref(), Some("Foo"));
    }

    #[test]
    fn from_dir_with_malformed_manifest_substitutes_derived_one() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("acme.foo-1.2.3");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("package.json"), "{ not json").unwrap();

        let ext = InstalledExtension::from_dir(&dir, "en", &NullNotifier);
        assert_eq!(ext.id, "acme.foo");
        assert_eq!(ext.package_json.version, "1.2.3");
    }

    #[test]
    fn from_dir_with_unmatched_name_uses_fallback_manifest() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("not-a-versioned-dir");
        fs::create_dir(&dir).unwrap();

        let ext = InstalledExtension::from_dir(&dir, "en", &NullNotifier);
        assert_eq!(ext.id, "extension-manager.unknown");
    }

    #[test]
    fn from_dir_localizes_bracketed_fields() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("acme.foo-1.0.0");
        fs::create_dir(&dir).unwrap();
        fs::write(
            dir.join("package.json"),
            r#"{"name": "foo", "version": "1.0.0", "publisher": "acme",
                "displayName": "%ext.displayName%", "description": "%ext.missing%"}"#,
        )
        .unwrap();
        fs::write(
            dir.join("package.nls.json"),
            r#"{"ext.displayName": "Localized Foo"}"#,
        )
        .unwrap();

        let ext = InstalledExtension::from_dir(&dir, "en", &NullNotifier);
        assert_eq!(ext.package_json.display_name.as_deref(), Some("Localized Foo"));
        // Missing key keeps the bracketed literal.
        assert_eq!(ext.package_json.description.as_deref(), Some("%ext.missing%"));
    }

    #[test]
    fn from_dir_localizes_name_and_publisher_before_computing_id() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("acme.foo-1.0.0");
        fs::create_dir(&dir).unwrap();
        fs::write(
            dir.join("package.json"),
            r#"{"name": "%ext.name%", "version": "1.0.0", "publisher": "%ext.publisher%"}"#,
        )
        .unwrap();
        fs::write(
            dir.join("package.nls.json"),
            r#"{"ext.name": "foo", "ext.publisher": "acme"}"#,
        )
        .unwrap();

        let ext = InstalledExtension::from_dir(&dir, "en", &NullNotifier);
        assert_eq!(ext.package_json.name, "foo");
        assert_eq!(ext.package_json.publisher, "acme");
        assert_eq!(ext.id, "acme.foo");
    }

    #[test]
    fn missing_icon_resolves_to_default() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("acme.foo-1.0.0");
        fs::create_dir(&dir).unwrap();

        let ext = InstalledExtension::from_dir(&dir, "en", &NullNotifier);
        assert_eq!(ext.icon_data, icon::DEFAULT_ICON_DATA);
    }

    #[test]
    fn materialize_round_trips_through_a_fresh_scan() {
        let temp = tempdir().unwrap();
        let manifest = ExtensionManifest {
            name: "my-pack".to_string(),
            publisher: "extension-manager".to_string(),
            version: "2024.1.1120000".to_string(),
            display_name: Some("My Pack".to_string()),
            extension_pack: vec![
                "acme.a".to_string(),
                "acme.b".to_string(),
                "acme.a".to_string(),
            ],
            ..ExtensionManifest::fallback()
        };

        let ext =
            InstalledExtension::materialize(temp.path(), manifest.clone(), "en", &NullNotifier)
                .unwrap();
        assert_eq!(ext.id, "extension-manager.my-pack");
        assert_eq!(ext.package_json.version, manifest.version);
        // Pack members deduplicated, order preserved.
        assert_eq!(ext.package_json.extension_pack, vec!["acme.a", "acme.b"]);
        assert!(ext
            .package_json
            .categories
            .iter()
            .any(|c| c == CUSTOM_CATEGORY));

        let dir = temp.path().join("extension-manager.my-pack-2024.1.1120000");
        assert!(dir.join("package.json").is_file());
        assert!(dir.join("icon.png").is_file());
        assert!(dir.join("README.MD").is_file());

        // A fresh scan yields the same record.
        let rescanned = InstalledExtension::from_dir(&dir, "en", &NullNotifier);
        assert_eq!(rescanned, ext);
    }

    #[test]
    fn materialize_decodes_draft_icon_payload() {
        let temp = tempdir().unwrap();
        let bytes = vec![0x89, b'P', b'N', b'G', 1, 2, 3];
        let payload = format!(
            "data:image/png;base64,{}",
            base64::Engine::encode(&base64::engine::general_purpose::STANDARD, &bytes)
        );
        let manifest = ExtensionManifest {
            name: "iconic".to_string(),
            publisher: "extension-manager".to_string(),
            version: "1.0.0".to_string(),
            icon: Some(payload),
            ..ExtensionManifest::fallback()
        };

        let ext =
            InstalledExtension::materialize(temp.path(), manifest, "en", &NullNotifier).unwrap();
        assert_eq!(ext.package_json.icon.as_deref(), Some("icon.png"));
        let written = fs::read(ext.extension_path.join("icon.png")).unwrap();
        assert_eq!(written, bytes);
    }

    #[test]
    fn materialize_strips_previous_location_marker() {
        let temp = tempdir().unwrap();
        let manifest = ExtensionManifest {
            name: "pack".to_string(),
            publisher: "extension-manager".to_string(),
            version: "2.0.0".to_string(),
            obsolete: Some("extension-manager.pack-1.0.0".to_string()),
            ..ExtensionManifest::fallback()
        };

        let ext =
            InstalledExtension::materialize(temp.path(), manifest, "en", &NullNotifier).unwrap();
        assert!(ext.package_json.obsolete.is_none());
        let raw = fs::read_to_string(ext.extension_path.join("package.json")).unwrap();
        assert!(!raw.contains("obsolete"));
    }
}
