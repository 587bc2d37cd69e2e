//! Localization bundles.
//!
//! Extensions ship their strings as `package.nls.<locale>.json` files next to
//! the manifest, with a locale-agnostic `package.nls.json` fallback. Manifest
//! fields wrapped as `%token%` are resolved against the loaded table.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^%(.*)%$").expect("valid token pattern")
});

/// A key -> string localization table loaded from an extension directory.
#[derive(Debug, Clone, Default)]
pub struct I18n {
    table: BTreeMap<String, String>,
}

impl I18n {
    /// Load the message bundle for a directory, preferring the per-locale
    /// file over the locale-agnostic fallback. Missing or malformed files
    /// yield an empty table.
    pub fn load(dir: &Path, locale: &str) -> Self {
        let candidates = [
            dir.join(format!("package.nls.{locale}.json")),
            dir.join("package.nls.json"),
        ];
        for path in &candidates {
            if !path.is_file() {
                continue;
            }
            match fs::read_to_string(path)
                .ok()
                .and_then(|raw| serde_json::from_str::<BTreeMap<String, String>>(&raw).ok())
            {
                Some(table) => return Self { table },
                None => {
                    debug!(path = %path.display(), "skipping malformed nls bundle");
                }
            }
        }
        Self::default()
    }

    /// Look up `key`, falling back to the caller-supplied literal.
    pub fn localize<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.table.get(key).map(String::as_str).unwrap_or(default)
    }

    /// Resolve a manifest field value: `%token%` becomes the localized string
    /// for `token`, anything else passes through unchanged.
    pub fn resolve_field(&self, value: &str) -> String {
        match TOKEN_PATTERN.captures(value) {
            Some(caps) => self.localize(&caps[1], value).to_string(),
            None => value.to_string(),
        }
    }

    /// The whole table, for handing to the UI in one message.
    pub fn table(&self) -> &BTreeMap<String, String> {
        &self.table
    }
}
