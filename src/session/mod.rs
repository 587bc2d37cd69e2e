//! Panel sessions.
//!
//! One session per open pack-editor view, keyed by the pack's manifest id.
//! Opening a pack that already has a live session re-focuses its surface
//! instead of duplicating it. The typed request/response protocol in
//! [`protocol`] is the only channel between the UI and the store; all disk
//! mutation is routed through the [`ExtensionStore`].
//!
//! Each request is handled in one uninterrupted turn, so it is atomic with
//! respect to other requests from the same session. Two sessions editing
//! packs that touch the same registry files are not reconciled; the last
//! writer wins.

pub mod protocol;

use std::collections::{HashMap, HashSet};

use crate::error::{PackError, PackResult};
use crate::extension::InstalledExtension;
use crate::host::{StateStore, UISurface};
use crate::nls::I18n;
use crate::registry::scanner;
use crate::store::ExtensionStore;

use protocol::{CommandKind, Request, Response, ResponsePayload, SessionSnapshot};

/// A live pack-editor view and its UI-facing copy of the pack record.
pub struct PanelSession {
    extension: InstalledExtension,
    surface: Box<dyn UISurface>,
}

impl PanelSession {
    pub fn extension(&self) -> &InstalledExtension {
        &self.extension
    }
}

/// All open panel sessions for one extensions root.
pub struct PanelSessions {
    store: ExtensionStore,
    /// The manager's own localization bundle, shipped whole to each panel.
    i18n: I18n,
    /// Injected persistence for UI snapshots across reloads.
    state: Box<dyn StateStore>,
    sessions: HashMap<String, PanelSession>,
}

impl PanelSessions {
    pub fn new(store: ExtensionStore, i18n: I18n, state: Box<dyn StateStore>) -> Self {
        Self {
            store,
            i18n,
            state,
            sessions: HashMap::new(),
        }
    }

    pub fn store(&self) -> &ExtensionStore {
        &self.store
    }

    pub fn localize<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.i18n.localize(key, default)
    }

    pub fn is_open(&self, extension_id: &str) -> bool {
        self.sessions.contains_key(extension_id)
    }

    pub fn session(&self, extension_id: &str) -> Option<&PanelSession> {
        self.sessions.get(extension_id)
    }

    /// Open a panel for `extension`, or reveal the live one. `make_surface`
    /// is only invoked when a new surface is actually needed.
    pub fn open_with(
        &mut self,
        extension: InstalledExtension,
        make_surface: impl FnOnce(&InstalledExtension) -> Box<dyn UISurface>,
    ) {
        if let Some(existing) = self.sessions.get(&extension.id) {
            existing.surface.reveal();
            return;
        }
        let surface = make_surface(&extension);
        self.sessions
            .insert(extension.id.clone(), PanelSession { extension, surface });
    }

    /// Remove the session whose surface the user closed. No further messages
    /// are dispatched to it.
    pub fn dispose(&mut self, extension_id: &str) {
        self.sessions.remove(extension_id);
    }

    /// The snapshot last persisted for a pack, if any.
    pub fn persisted_snapshot(&self, extension_id: &str) -> Option<SessionSnapshot> {
        self.state
            .get(extension_id)
            .and_then(|v| serde_json::from_value(v).ok())
    }

    /// Dispatch one UI request and post the mirrored response back to the
    /// session's surface.
    pub fn handle_message(&mut self, extension_id: &str, request: Request) -> PackResult<()> {
        if !self.sessions.contains_key(extension_id) {
            return Err(PackError::SurfaceDisposed(extension_id.to_string()));
        }
        let token = request.command.clone();

        match token.description {
            CommandKind::Initial => {
                let subject = match self.sessions.get(extension_id) {
                    Some(session) => session.extension.clone(),
                    None => return Err(PackError::SurfaceDisposed(extension_id.to_string())),
                };
                let all = scanner::list_all(
                    self.store.root(),
                    self.store.locale(),
                    &**self.store.notifier(),
                )?;
                let self_ids = HashSet::from([subject.id.clone()]);
                let installed: Vec<InstalledExtension> =
                    scanner::filter_excluding_self(&all, &self_ids)
                        .into_iter()
                        .cloned()
                        .collect();
                let snapshot = SessionSnapshot {
                    nls: self.i18n.table().clone(),
                    extension: subject,
                    installed_extensions: installed,
                };
                self.state
                    .set(extension_id, serde_json::to_value(&snapshot)?);
                self.post(
                    extension_id,
                    &Response {
                        command: token,
                        payload: ResponsePayload::Initial(snapshot),
                    },
                )
            }
            CommandKind::Create | CommandKind::Update => {
                let draft = request.draft()?;
                let installed = match token.description {
                    CommandKind::Create => self.store.create(draft)?,
                    _ => self.store.update(draft)?,
                };
                let response = Response {
                    command: token,
                    payload: ResponsePayload::Extension(Box::new(installed.clone())),
                };
                if let Some(session) = self.sessions.get_mut(extension_id) {
                    session.extension = installed;
                }
                self.post(extension_id, &response)
            }
            CommandKind::Uninstall => {
                let version = request.version()?;
                self.store.uninstall(extension_id, &version)?;
                self.post(
                    extension_id,
                    &Response {
                        command: token,
                        payload: ResponsePayload::Empty,
                    },
                )?;
                if let Some(session) = self.sessions.remove(extension_id) {
                    session.surface.close();
                }
                Ok(())
            }
        }
    }

    fn post(&self, extension_id: &str, response: &Response) -> PackResult<()> {
        match self.sessions.get(extension_id) {
            Some(session) => session.surface.post(response),
            // Disposed mid-flight: the mutation completed, the reply is
            // dropped.
            None => Ok(()),
        }
    }
}
