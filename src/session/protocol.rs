//! Panel wire protocol.
//!
//! Requests and responses cross the UI boundary as structured-clone JSON.
//! Every request carries a symbolic command token whose `uniqKey` is unique
//! per call; responses echo the token verbatim, so overlapping requests
//! resolve to the correct caller even when replies arrive out of order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PackError, PackResult};
use crate::extension::InstalledExtension;
use crate::manifest::ExtensionManifest;

/// Command verbs a panel session understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Initial,
    Create,
    Update,
    Uninstall,
}

/// Symbolic command token, mirrored unchanged from request to response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandToken {
    pub description: CommandKind,
    pub uniq_key: String,
}

/// A message from the UI to the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub command: CommandToken,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl Request {
    pub fn new(description: CommandKind, uniq_key: &str, payload: Option<Value>) -> Self {
        Self {
            command: CommandToken {
                description,
                uniq_key: uniq_key.to_string(),
            },
            payload,
        }
    }

    /// Interpret the payload as a draft manifest (create/update requests).
    pub fn draft(&self) -> PackResult<ExtensionManifest> {
        let payload = self.payload.clone().ok_or_else(|| self.bad_payload())?;
        serde_json::from_value(payload).map_err(PackError::Json)
    }

    /// Interpret the payload as a version string (uninstall requests).
    pub fn version(&self) -> PackResult<String> {
        match &self.payload {
            Some(Value::String(version)) => Ok(version.clone()),
            _ => Err(self.bad_payload()),
        }
    }

    fn bad_payload(&self) -> PackError {
        PackError::Protocol(format!(
            "missing or mistyped payload for {:?}",
            self.command.description
        ))
    }
}

/// A message from the core back to the UI, echoing the request token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub command: CommandToken,
    pub payload: ResponsePayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponsePayload {
    Initial(SessionSnapshot),
    Extension(Box<InstalledExtension>),
    /// Serializes as `null`.
    Empty,
}

/// Everything a panel shows: what `initial` returns and what the host
/// persists for the UI across reloads. An explicit value, not ambient state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// The manager's localization table.
    pub nls: BTreeMap<String, String>,
    /// The pack being edited.
    pub extension: InstalledExtension,
    /// All installed extensions offered as pack members.
    pub installed_extensions: Vec<InstalledExtension>,
}
