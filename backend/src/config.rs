use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Startup configuration failures. Any of these stops the process.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Gemini API key is missing: set APP_GEMINI_API_KEY or GOOGLE_API_KEY")]
    MissingApiKey,

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
    pub knowledge: KnowledgeConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for a whole request, model call included (default: 120)
    #[serde(deserialize_with = "deserialize_duration_secs")]
    pub request_timeout_secs: u64,
    /// Largest accepted audio upload in bytes (default: 25 MiB)
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    /// Timeout for a single provider HTTP call (default: 60)
    #[serde(deserialize_with = "deserialize_duration_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    pub playbook_path: String,
    pub cases_path: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

impl Config {
    /// Load configuration with environment variable override support
    ///
    /// Loading order:
    /// 1. Load from the given path, or the first config.toml found
    /// 2. Override with environment variables (prefixed with APP_)
    /// 3. Validate the final configuration
    pub fn load(explicit_path: Option<&str>) -> Result<Self, ConfigError> {
        let config_path = explicit_path.map(str::to_string).or_else(Self::find_config_file);
        let mut config = match config_path {
            Some(path) => {
                let config = Self::from_toml(&path)?;
                tracing::info!("Loaded configuration from {}", path);
                config
            },
            None => {
                tracing::warn!("Configuration file not found, using defaults");
                Config::default()
            },
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// [`Config::load`] with `subscriber` receiving the events raised while
    /// loading. The process-wide logger depends on the loaded config, so
    /// startup passes a console subscriber here.
    pub fn load_with_subscriber<S>(
        subscriber: S,
        explicit_path: Option<&str>,
    ) -> Result<Self, ConfigError>
    where
        S: tracing::Subscriber + Send + Sync + 'static,
    {
        tracing::subscriber::with_default(subscriber, || Self::load(explicit_path))
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - APP_SERVER_HOST / APP_SERVER_PORT
    /// - APP_REQUEST_TIMEOUT_SECS: accepts "120", "90s", "2m"
    /// - APP_MAX_UPLOAD_BYTES
    /// - APP_GEMINI_API_KEY (falls back to GOOGLE_API_KEY)
    /// - APP_GEMINI_API_BASE / APP_GEMINI_MODEL
    /// - APP_GEMINI_TIMEOUT_SECS: accepts "60", "60s", "1m"
    /// - APP_PLAYBOOK_PATH / APP_CASES_PATH
    /// - APP_LOG_LEVEL / APP_LOG_FILE
    pub(crate) fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(host) = var("APP_SERVER_HOST") {
            self.server.host = host;
            tracing::info!("Override server.host from env: {}", self.server.host);
        }

        if let Some(port) = var("APP_SERVER_PORT") {
            match port.parse() {
                Ok(port) => {
                    self.server.port = port;
                    tracing::info!("Override server.port from env: {}", self.server.port);
                },
                Err(e) => tracing::warn!(
                    "Invalid APP_SERVER_PORT '{}': {} (keep {})",
                    port,
                    e,
                    self.server.port
                ),
            }
        }

        if let Some(timeout) = var("APP_REQUEST_TIMEOUT_SECS") {
            match parse_duration_to_secs(&timeout) {
                Ok(val) => {
                    self.server.request_timeout_secs = val;
                    tracing::info!(
                        "Override server.request_timeout_secs from env: {}",
                        self.server.request_timeout_secs
                    );
                },
                Err(e) => tracing::warn!(
                    "Invalid APP_REQUEST_TIMEOUT_SECS '{}': {} (keep {})",
                    timeout,
                    e,
                    self.server.request_timeout_secs
                ),
            }
        }

        if let Some(limit) = var("APP_MAX_UPLOAD_BYTES") {
            match limit.parse() {
                Ok(limit) => {
                    self.server.max_upload_bytes = limit;
                    tracing::info!(
                        "Override server.max_upload_bytes from env: {}",
                        self.server.max_upload_bytes
                    );
                },
                Err(e) => tracing::warn!(
                    "Invalid APP_MAX_UPLOAD_BYTES '{}': {} (keep {})",
                    limit,
                    e,
                    self.server.max_upload_bytes
                ),
            }
        }

        if let Some(key) = var("APP_GEMINI_API_KEY").or_else(|| var("GOOGLE_API_KEY")) {
            self.gemini.api_key = key;
            tracing::info!("Override gemini.api_key from env");
        }

        if let Some(base) = var("APP_GEMINI_API_BASE") {
            self.gemini.api_base = base;
            tracing::info!("Override gemini.api_base from env: {}", self.gemini.api_base);
        }

        if let Some(model) = var("APP_GEMINI_MODEL") {
            self.gemini.model = model;
            tracing::info!("Override gemini.model from env: {}", self.gemini.model);
        }

        if let Some(timeout) = var("APP_GEMINI_TIMEOUT_SECS") {
            match parse_duration_to_secs(&timeout) {
                Ok(val) => {
                    self.gemini.timeout_secs = val;
                    tracing::info!(
                        "Override gemini.timeout_secs from env: {}",
                        self.gemini.timeout_secs
                    );
                },
                Err(e) => tracing::warn!(
                    "Invalid APP_GEMINI_TIMEOUT_SECS '{}': {} (keep {})",
                    timeout,
                    e,
                    self.gemini.timeout_secs
                ),
            }
        }

        if let Some(path) = var("APP_PLAYBOOK_PATH") {
            self.knowledge.playbook_path = path;
            tracing::info!(
                "Override knowledge.playbook_path from env: {}",
                self.knowledge.playbook_path
            );
        }

        if let Some(path) = var("APP_CASES_PATH") {
            self.knowledge.cases_path = path;
            tracing::info!("Override knowledge.cases_path from env: {}", self.knowledge.cases_path);
        }

        if let Some(level) = var("APP_LOG_LEVEL") {
            self.logging.level = level;
            tracing::info!("Override logging.level from env: {}", self.logging.level);
        }

        if let Some(file) = var("APP_LOG_FILE") {
            self.logging.file = if file.trim().is_empty() { None } else { Some(file) };
            tracing::info!("Override logging.file from env: {:?}", self.logging.file);
        }
    }

    /// Validate configuration
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.gemini.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        if self.server.port == 0 {
            return Err(ConfigError::Invalid("Server port cannot be 0".into()));
        }

        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("server.request_timeout_secs must be > 0".into()));
        }

        if self.server.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid("server.max_upload_bytes must be > 0".into()));
        }

        if self.gemini.timeout_secs == 0 {
            return Err(ConfigError::Invalid("gemini.timeout_secs must be > 0".into()));
        }

        // A request must fit at least one full provider call
        if self.server.request_timeout_secs < self.gemini.timeout_secs {
            return Err(ConfigError::Invalid(format!(
                "server.request_timeout_secs ({}) must be >= gemini.timeout_secs ({})",
                self.server.request_timeout_secs, self.gemini.timeout_secs
            )));
        }

        if self.gemini.model.trim().is_empty() {
            return Err(ConfigError::Invalid("gemini.model cannot be empty".into()));
        }

        Ok(())
    }

    fn find_config_file() -> Option<String> {
        let possible_paths = ["conf/config.toml", "config.toml"];

        for path in &possible_paths {
            if Path::new(path).exists() {
                return Some(path.to_string());
            }
        }
        None
    }

    fn from_toml(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_string(), source })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse { path: path.to_string(), source })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            request_timeout_secs: 120,
            max_upload_bytes: 25 * 1024 * 1024,
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-1.5-flash".to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            playbook_path: "knowledge/playbook.txt".to_string(),
            cases_path: "knowledge/success_cases.txt".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info,objection_coach=debug".to_string(),
            file: Some("logs/objection-coach.log".to_string()),
        }
    }
}

// =========================
// Helpers for parsing values
// =========================

fn parse_duration_to_secs(input: &str) -> Result<u64, String> {
    // Accept plain numbers (treated as seconds)
    if let Ok(val) = input.parse::<u64>() {
        return Ok(val);
    }

    let s = input.trim().to_lowercase();
    let (num_str, unit) = s.split_at(s.chars().take_while(|c| c.is_ascii_digit()).count());
    if num_str.is_empty() || unit.is_empty() {
        return Err("missing number or unit".into());
    }
    let n: u64 = num_str.parse().map_err(|_| "invalid number".to_string())?;
    let factor = match unit {
        "s" | "sec" | "secs" | "second" | "seconds" => 1,
        "m" | "min" | "mins" | "minute" | "minutes" => 60,
        "h" | "hr" | "hour" | "hours" => 60 * 60,
        _ => return Err(format!("unsupported unit: {}", unit)),
    };
    n.checked_mul(factor).ok_or_else(|| "duration too large".to_string())
}

// Accepts either a number of seconds or a human-friendly string
fn deserialize_duration_secs<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct Visitor;
    impl<'de> serde::de::Visitor<'de> for Visitor {
        type Value = u64;
        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a number of seconds or a string like '30s', '5m', '1h'")
        }
        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
            Ok(v)
        }
        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            if v >= 0 { Ok(v as u64) } else { Err(E::custom("negative not allowed")) }
        }
        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            parse_duration_to_secs(v).map_err(E::custom)
        }
    }
    deserializer.deserialize_any(Visitor)
}
