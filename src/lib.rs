//! Packsmith - curate editor extension packs as synthetic installed
//! extensions.
//!
//! A pack is an ordinary extension manifest whose `extensionPack` field lists
//! other extension ids. Packsmith synthesizes such manifests as real
//! directories under the host editor's extensions root, so the host installs,
//! lists, and uninstalls them like any other extension.
//!
//! # Architecture
//!
//! The library is organized into these main modules:
//!
//! - [`manifest`] - Typed `package.json` schema, directory naming, version stamps
//! - [`extension`] - Installed-extension records: scan, materialize, scaffold
//! - [`icon`] - Icon resolution to/from data URIs
//! - [`nls`] - Localization bundles and `%token%` substitution
//! - [`registry`] - Root scanning plus the `.obsolete` and `extensions.json` files
//! - [`store`] - The transactional create/update/uninstall core
//! - [`session`] - Panel sessions and the typed UI message protocol
//! - [`commands`] - Command-palette entry points
//! - [`host`] - Narrow collaborator traits the embedding host implements
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use packsmith::{commands, ExtensionStore, PanelSessions};
//! use packsmith::host::{MemoryStateStore, NullNotifier};
//! use packsmith::nls::I18n;
//!
//! let store = ExtensionStore::new(
//!     commands::default_extensions_root(),
//!     "en",
//!     Arc::new(NullNotifier),
//! );
//! let mut sessions = PanelSessions::new(
//!     store,
//!     I18n::default(),
//!     Box::new(MemoryStateStore::default()),
//! );
//! commands::create_pack(&mut sessions, Some("my pack"), |ext| host_panel(ext))?;
//! ```

pub mod commands;
pub mod extension;
pub mod host;
pub mod icon;
pub mod manifest;
pub mod nls;
pub mod registry;
pub mod session;
pub mod store;

mod error;
mod strings;

pub use error::{PackError, PackResult};
pub use extension::InstalledExtension;
pub use manifest::{DirectoryName, ExtensionManifest};
pub use registry::{MetadataEntry, ObsoleteSet};
pub use session::PanelSessions;
pub use store::ExtensionStore;
