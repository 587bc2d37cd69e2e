//! Extension manifest records.
//!
//! Every extension directory carries a `package.json` manifest. This module
//! defines the typed manifest schema, the `publisher.name-version` directory
//! naming scheme, and the wall-clock version stamps used for synthesized
//! packs. Unknown manifest keys are preserved verbatim so foreign manifests
//! survive a read/write cycle untouched.

use std::collections::BTreeMap;

use chrono::Local;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::strings::start_case;

/// Publisher assigned to every synthesized pack.
pub const SYNTHETIC_PUBLISHER: &str = "extension-manager";

/// Identifier of the previous generation of this tool; its packs are treated
/// as reserved and never offered as pack members.
pub const LEGACY_MANAGER_ID: &str = "hayden.extension-pack-manager";

/// Category stamped onto every materialized pack manifest.
pub const CUSTOM_CATEGORY: &str = "Custom Extension";

/// Category used for freshly scaffolded pack skeletons.
pub const PACK_CATEGORY: &str = "Extension Packs";

static DIRECTORY_NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.*)\.(.*)-(\d+\.\d+\.\d+)$").expect("valid directory name pattern")
});

/// Installation bookkeeping embedded under the manifest's `__metadata` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallMetadata {
    /// Milliseconds since the epoch.
    pub installed_timestamp: i64,
    pub publisher_display_name: String,
}

/// Typed `package.json` schema.
///
/// The `extra` side-map keeps any keys the schema does not model, so a
/// manifest written by another tool round-trips without losing fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionManifest {
    pub name: String,
    pub version: String,
    pub publisher: String,
    #[serde(default = "default_engines")]
    pub engines: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension_pack: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension_dependencies: Vec<String>,
    /// Directory name this draft supersedes. Carried by update requests,
    /// stripped before the manifest reaches disk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obsolete: Option<String>,
    #[serde(rename = "__metadata", default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<InstallMetadata>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

fn default_engines() -> BTreeMap<String, String> {
    BTreeMap::from([("vscode".to_string(), "^1.63.0".to_string())])
}

impl ExtensionManifest {
    /// Hard-coded manifest substituted when nothing can be parsed or derived.
    pub fn fallback() -> Self {
        Self {
            name: "unknown".to_string(),
            version: "1.0.0".to_string(),
            publisher: SYNTHETIC_PUBLISHER.to_string(),
            engines: default_engines(),
            icon: None,
            display_name: None,
            description: None,
            categories: Vec::new(),
            extension_pack: Vec::new(),
            extension_dependencies: Vec::new(),
            obsolete: None,
            metadata: None,
            extra: BTreeMap::new(),
        }
    }

    /// Derive a manifest from a `publisher.name-version` directory name.
    pub fn from_directory_name(dir_name: &str) -> Option<Self> {
        let parsed = DirectoryName::parse(dir_name)?;
        Some(Self {
            display_name: Some(start_case(&parsed.name)),
            description: Some("Unknown extension".to_string()),
            name: parsed.name,
            version: parsed.version,
            publisher: parsed.publisher,
            ..Self::fallback()
        })
    }

    /// Canonical extension identifier, always recomputed as `publisher.name`.
    pub fn id(&self) -> String {
        format!("{}.{}", self.publisher, self.name)
    }

    /// Directory name for this manifest under the extensions root.
    pub fn directory_name(&self) -> String {
        format!("{}-{}", self.id(), self.version)
    }
}

/// A `publisher.name-version` directory name split into its parts.
///
/// Parsing never fails loudly; a name that does not match the pattern simply
/// yields `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryName {
    pub publisher: String,
    pub name: String,
    pub version: String,
}

impl DirectoryName {
    pub fn parse(dir_name: &str) -> Option<Self> {
        let caps = DIRECTORY_NAME_PATTERN.captures(dir_name)?;
        Some(Self {
            publisher: caps[1].to_string(),
            name: caps[2].to_string(),
            version: caps[3].to_string(),
        })
    }
}

impl std::fmt::Display for DirectoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}-{}", self.publisher, self.name, self.version)
    }
}

/// Generate a fresh version stamp from the wall clock, `YYYY.M.DHHMMSS`.
/// Stamps taken later in time compare greater, so the newest install of a
/// pack always carries the highest version.
pub fn generate_version() -> String {
    Local::now().format("%Y.%-m.%-d%H%M%S").to_string()
}

/// Installation metadata stamped onto a draft at create/update time.
pub fn generate_metadata(publisher: &str) -> InstallMetadata {
    InstallMetadata {
        installed_timestamp: Local::now().timestamp_millis(),
        publisher_display_name: start_case(publisher),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_name_parses_publisher_name_version() {
        let parsed = DirectoryName::parse("acme.foo-bar-1.2.3").unwrap();
        assert_eq!(parsed.publisher, "acme");
        assert_eq!(parsed.name, "foo-bar");
        assert_eq!(parsed.version, "1.2.3");
        assert_eq!(parsed.to_string(), "acme.foo-bar-1.2.3");
    }

    #[test]
    fn directory_name_rejects_unversioned_names() {
        assert!(DirectoryName::parse(".obsolete").is_none());
        assert!(DirectoryName::parse("no-version-here").is_none());
        assert!(DirectoryName::parse("acme.foo-1.2").is_none());
    }

    #[test]
    fn derived_manifest_recomputes_id_from_parts() {
        let manifest = ExtensionManifest::from_directory_name("acme.foo-1.0.0").unwrap();
        assert_eq!(manifest.id(), "acme.foo");
        assert_eq!(manifest.version, "1.0.0");
        assert_eq!(manifest.display_name.as_deref(), Some("Foo"));
        assert_eq!(manifest.directory_name(), "acme.foo-1.0.0");
    }

    #[test]
    fn unmatched_directory_name_falls_back_to_default() {
        assert!(ExtensionManifest::from_directory_name("garbage").is_none());
        let fallback = ExtensionManifest::fallback();
        assert_eq!(fallback.id(), "extension-manager.unknown");
    }

    #[test]
    fn unknown_keys_survive_a_round_trip() {
        let raw = r##"{
            "name": "foo",
            "version": "1.0.0",
            "publisher": "acme",
            "engines": {"vscode": "^1.63.0"},
            "contributes": {"commands": [{"command": "foo.bar"}]},
            "galleryBanner": {"color": "#1e1e1e"}
        }"##;
        let manifest: ExtensionManifest = serde_json::from_str(raw).unwrap();
        assert!(manifest.extra.contains_key("contributes"));

        let written = serde_json::to_string(&manifest).unwrap();
        let reread: ExtensionManifest = serde_json::from_str(&written).unwrap();
        assert_eq!(reread, manifest);
        assert!(reread.extra.contains_key("galleryBanner"));
    }

    #[test]
    fn version_stamp_matches_directory_pattern() {
        let manifest = ExtensionManifest {
            name: "foo".to_string(),
            publisher: "acme".to_string(),
            version: generate_version(),
            ..ExtensionManifest::fallback()
        };
        assert!(DirectoryName::parse(&manifest.directory_name()).is_some());
    }
}
