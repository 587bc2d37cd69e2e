//! Command-palette entry points.
//!
//! Thin wrappers the host's command layer calls with user-chosen values; all
//! real work happens in the store and the panel sessions.

use std::path::PathBuf;

use crate::error::PackResult;
use crate::extension::InstalledExtension;
use crate::host::{HostNotifier, UISurface};
use crate::registry::scanner;
use crate::session::PanelSessions;

/// Pack name used when the user does not provide one.
pub const DEFAULT_PACK_NAME: &str = "new-extension-pack";

/// Search query for the host's extension view, filtered to this tool's
/// category.
pub const CUSTOM_CATEGORY_QUERY: &str = "@category:\"Custom Extension\"";

/// The host editor's extensions root under the user's home directory.
pub fn default_extensions_root() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".vscode").join("extensions"))
        .unwrap_or_else(|| PathBuf::from(".vscode/extensions"))
}

/// `create`: scaffold a pack for the chosen name (or the default) and open
/// its editor panel. Re-running for the same name re-focuses the live panel.
pub fn create_pack(
    sessions: &mut PanelSessions,
    name: Option<&str>,
    make_surface: impl FnOnce(&InstalledExtension) -> Box<dyn UISurface>,
) -> PackResult<()> {
    let name = name.unwrap_or(DEFAULT_PACK_NAME);
    let pack = sessions.store().scaffold(name)?;
    sessions.store().notifier().request_rescan();
    sessions.open_with(pack, make_surface);
    Ok(())
}

/// `edit`: open the panel for an installed pack id. An id with no live
/// directory surfaces an informational message and opens nothing.
pub fn edit_pack(
    sessions: &mut PanelSessions,
    extension_id: &str,
    make_surface: impl FnOnce(&InstalledExtension) -> Box<dyn UISurface>,
) -> PackResult<()> {
    let store = sessions.store();
    let found = scanner::find_by_id(
        store.root(),
        extension_id,
        store.locale(),
        &**store.notifier(),
    )?;
    match found {
        Some(extension) => {
            sessions.open_with(extension, make_surface);
        }
        None => {
            let message = format!(
                "{}: {extension_id}",
                sessions.localize("manager.action.extension.not-found", "Extension not found")
            );
            sessions.store().notifier().info(&message);
        }
    }
    Ok(())
}

/// `view`: open the host's extension search filtered to custom packs.
pub fn view(notifier: &dyn HostNotifier) {
    notifier.open_extensions_search(CUSTOM_CATEGORY_QUERY);
}
