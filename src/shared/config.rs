//! Application settings. File locations, endpoints, fetch limits.
//!
//! Credentials entered during setup are not here; they live in the
//! `ConfigStore` file named by `config_path`.

use serde::Deserialize;

/// Relay that forwards requests to the Gemini endpoint (URL-encoded target appended).
pub const DEFAULT_RELAY_URL: &str = "https://proxy.ganstermaxtivinew.workers.dev/?url=";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-flash-latest";

/// Number of dialogs scanned for unread messages.
pub const DEFAULT_DIALOG_LIMIT: usize = 30;
/// Already-read messages fetched as context in front of the unread ones.
pub const DEFAULT_CONTEXT_MESSAGES: u32 = 30;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Credentials JSON file. Read from TG_DIGEST_CONFIG_PATH.
    #[serde(default)]
    pub config_path: Option<String>,

    /// Telegram session file. Read from TG_DIGEST_SESSION_PATH.
    #[serde(default)]
    pub session_path: Option<String>,

    /// Directory for the exported results page. Read from TG_DIGEST_DATA_DIR.
    #[serde(default)]
    pub data_dir: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Gemini
    // ─────────────────────────────────────────────────────────────────────────
    /// Relay base URL. Empty string disables the relay. Read from TG_DIGEST_RELAY_URL.
    #[serde(default)]
    pub relay_url: Option<String>,

    /// API base, without the model path. Read from TG_DIGEST_GEMINI_API_BASE.
    #[serde(default)]
    pub gemini_api_base: Option<String>,

    /// Model name. Read from TG_DIGEST_GEMINI_MODEL.
    #[serde(default)]
    pub gemini_model: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Fetch limits
    // ─────────────────────────────────────────────────────────────────────────
    /// Read from TG_DIGEST_DIALOG_LIMIT.
    #[serde(default)]
    pub dialog_limit: Option<usize>,

    /// Read from TG_DIGEST_CONTEXT_MESSAGES.
    #[serde(default)]
    pub context_messages: Option<u32>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("TG_DIGEST"));
        if let Ok(path) = std::env::var("TG_DIGEST_SETTINGS") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    pub fn config_path_or_default(&self) -> String {
        self.config_path
            .clone()
            .unwrap_or_else(|| "config.json".to_string())
    }

    pub fn session_path_or_default(&self) -> String {
        self.session_path
            .clone()
            .unwrap_or_else(|| "avatar_session.session".to_string())
    }

    pub fn data_dir_or_default(&self) -> String {
        self.data_dir.clone().unwrap_or_else(|| "./data".to_string())
    }

    /// Relay base URL, or `None` when explicitly disabled with an empty value.
    pub fn relay_url(&self) -> Option<String> {
        match self.relay_url.as_deref() {
            None => Some(DEFAULT_RELAY_URL.to_string()),
            Some(s) if s.trim().is_empty() => None,
            Some(s) => Some(s.trim().to_string()),
        }
    }

    pub fn gemini_api_base_or_default(&self) -> String {
        self.gemini_api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string())
    }

    pub fn gemini_model_or_default(&self) -> String {
        self.gemini_model
            .clone()
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string())
    }

    pub fn dialog_limit_or_default(&self) -> usize {
        self.dialog_limit.unwrap_or(DEFAULT_DIALOG_LIMIT)
    }

    pub fn context_messages_or_default(&self) -> u32 {
        self.context_messages.unwrap_or(DEFAULT_CONTEXT_MESSAGES)
    }
}
