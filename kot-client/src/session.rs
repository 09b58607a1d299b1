//! Persisted session data
//!
//! The login flow stores the bearer token and the backend address; the
//! order flow only reads them, once per request, and drops the token on a
//! 401. Nothing here caches values beyond a single call.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Session key-value data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    /// Bearer token issued at login
    #[serde(default)]
    pub token: Option<String>,
    /// Backend address as entered by staff (IP, host or URL)
    #[serde(default)]
    pub server_address: Option<String>,
}

/// Read access to the session, plus token invalidation on auth failure
pub trait SessionStore: Send + Sync + std::fmt::Debug {
    /// Current session snapshot
    fn load(&self) -> ClientResult<SessionData>;

    /// Drop the stored token so the next screen forces a re-login
    fn invalidate_token(&self) -> ClientResult<()>;

    fn token(&self) -> ClientResult<Option<String>> {
        Ok(self.load()?.token)
    }

    /// Normalized base URL of the backend
    fn base_url(&self) -> ClientResult<String> {
        self.load()?
            .server_address
            .as_deref()
            .map(normalize_server_address)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ClientError::Session("Server address is not configured".into()))
    }
}

/// Normalize a backend address:
/// - ensure a scheme (plain `http` for bare hosts, the backend runs on the LAN)
/// - strip trailing slashes
/// - strip a trailing `/api` segment
pub fn normalize_server_address(address: &str) -> String {
    let mut url = address.trim().to_string();
    if url.is_empty() {
        return url;
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        url = format!("http://{url}");
    }

    while url.ends_with('/') {
        url.pop();
    }
    if url.ends_with("/api") {
        url.truncate(url.len() - 4);
    }
    while url.ends_with('/') {
        url.pop();
    }

    url
}

// =============================================================================
// File-backed store
// =============================================================================

/// Session stored as a JSON file, re-read on every access
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write session data (used by the login flow)
    pub fn save(&self, data: &SessionData) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::Session(format!("{}: {e}", parent.display())))?;
        }
        let content = serde_json::to_string_pretty(data)?;
        std::fs::write(&self.path, content)
            .map_err(|e| ClientError::Session(format!("{}: {e}", self.path.display())))
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> ClientResult<SessionData> {
        if !self.path.exists() {
            return Ok(SessionData::default());
        }
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| ClientError::Session(format!("{}: {e}", self.path.display())))?;
        Ok(serde_json::from_str(&content)?)
    }

    fn invalidate_token(&self) -> ClientResult<()> {
        let mut data = self.load()?;
        if data.token.take().is_some() {
            tracing::info!(path = %self.path.display(), "Session token invalidated");
            self.save(&data)?;
        }
        Ok(())
    }
}

// =============================================================================
// In-memory store
// =============================================================================

/// Session held in memory (embedding, tests)
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    data: RwLock<SessionData>,
}

impl MemorySessionStore {
    pub fn new(server_address: impl Into<String>, token: Option<String>) -> Self {
        Self {
            data: RwLock::new(SessionData {
                token,
                server_address: Some(server_address.into()),
            }),
        }
    }

    pub fn set_token(&self, token: impl Into<String>) {
        let mut guard = self.data.write().unwrap_or_else(|e| e.into_inner());
        guard.token = Some(token.into());
    }

    pub fn set_server_address(&self, address: impl Into<String>) {
        let mut guard = self.data.write().unwrap_or_else(|e| e.into_inner());
        guard.server_address = Some(address.into());
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> ClientResult<SessionData> {
        Ok(self.data.read().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn invalidate_token(&self) -> ClientResult<()> {
        let mut guard = self.data.write().unwrap_or_else(|e| e.into_inner());
        guard.token = None;
        Ok(())
    }
}
