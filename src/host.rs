//! Host collaborator traits.
//!
//! The core never touches concrete editor types. Everything it needs from the
//! host is expressed through three narrow traits: user-visible notifications
//! and rescan requests (`HostNotifier`), the UI surface a panel session posts
//! messages to (`UISurface`), and the key-value store the UI persists its
//! snapshot into across reloads (`StateStore`).

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::PackResult;
use crate::session::protocol::Response;

/// User-facing notifications and host-side actions.
pub trait HostNotifier {
    /// Informational message, e.g. "extension not found".
    fn info(&self, message: &str);

    /// Non-fatal warning, e.g. a malformed manifest that was substituted.
    fn warn(&self, message: &str);

    /// Fatal operation failure.
    fn error(&self, message: &str);

    /// Ask the host to rescan its own extension registry.
    fn request_rescan(&self);

    /// Open the host's extension search view with the given query.
    fn open_extensions_search(&self, query: &str);
}

/// No-op notifier for tests and headless use.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl HostNotifier for NullNotifier {
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
    fn request_rescan(&self) {}
    fn open_extensions_search(&self, _query: &str) {}
}

/// One open pack-editor view.
///
/// A disposed surface simply stops receiving messages; in-flight disk
/// mutations still complete.
pub trait UISurface {
    /// Deliver a typed response to the rendering context.
    fn post(&self, response: &Response) -> PackResult<()>;

    /// Bring an already-open surface to the front.
    fn reveal(&self);

    /// Ask the host to close this surface (used after uninstall).
    fn close(&self);
}

/// Injected persistence for UI state across reloads.
pub trait StateStore {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value);
}

/// In-memory `StateStore`, used in tests and as a default.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    entries: BTreeMap<String, Value>,
}

impl StateStore for MemoryStateStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
    }
}
