//! Client configuration
//!
//! # Environment variables
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | KOT_SESSION_PATH | session.json | Session file written by the login flow |
//! | KOT_TIMEOUT_SECS | (none) | Request timeout; unset uses the HTTP client default |
//! | KOT_ACTOR | staff | Name recorded on item audit entries |
//! | KOT_LOG_LEVEL | info | Log level |
//! | KOT_LOG_JSON | false | JSON console logs |
//! | KOT_LOG_DIR | (none) | Directory for rotating log files |

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::api::BackendApi;
use crate::error::ClientResult;
use crate::http::NetworkHttpClient;
use crate::order::OrderSession;
use crate::session::{FileSessionStore, SessionStore};

const DEFAULT_SESSION_PATH: &str = "session.json";
const DEFAULT_ACTOR: &str = "staff";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration of one order terminal
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Session file holding the token and backend address
    pub session_path: PathBuf,
    /// Request timeout (None = HTTP client default)
    pub timeout: Option<Duration>,
    /// Name recorded on item audit entries
    pub actor: String,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_PATH)
    }
}

impl ClientConfig {
    pub fn new(session_path: impl Into<PathBuf>) -> Self {
        Self {
            session_path: session_path.into(),
            timeout: None,
            actor: DEFAULT_ACTOR.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_json: false,
            log_dir: None,
        }
    }

    /// Load from the environment, reading `.env` first if present
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            session_path: lookup("KOT_SESSION_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.session_path),
            timeout: lookup("KOT_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs),
            actor: lookup("KOT_ACTOR")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.actor),
            log_level: lookup("KOT_LOG_LEVEL").unwrap_or(defaults.log_level),
            log_json: lookup("KOT_LOG_JSON")
                .map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            log_dir: lookup("KOT_LOG_DIR").filter(|s| !s.is_empty()),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn with_log_json(mut self, json: bool) -> Self {
        self.log_json = json;
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<String>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// Install the global tracing subscriber for this configuration
    pub fn init_logging(&self) -> anyhow::Result<()> {
        crate::logger::init_logger_with_file(&self.log_level, self.log_json, self.log_dir.as_deref())
    }

    /// Order session talking to the backend named in the session file
    pub fn connect(&self) -> ClientResult<OrderSession<NetworkHttpClient>> {
        let session: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(&self.session_path));
        let http = NetworkHttpClient::new(session, self.timeout)?;
        tracing::debug!(session_path = %self.session_path.display(), actor = %self.actor, "Order session created");
        Ok(OrderSession::new(BackendApi::new(http), self.actor.clone()))
    }
}
