//! Configuration management for the haystack service.
//!
//! This module handles loading configuration from TOML files and
//! environment variables, with sensible defaults for all settings.
//! The loaded snapshot is immutable for the process lifetime and
//! shared read-only by every session.

use crate::core::error::{HaystackError, Result};
use crate::core::xdg::XdgDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub tls: TlsConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Listener configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Address to bind the listening socket to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum simultaneously active sessions; excess connections
    /// wait in the listener backlog
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

/// Corpus configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorpusConfig {
    /// Path to the searchable text file
    #[serde(default = "default_txt_file")]
    pub txt_file: PathBuf,

    /// true: re-read the file on every query (Live Reader);
    /// false: build an in-memory index once at startup (Static Index)
    #[serde(default)]
    pub reread_on_query: bool,
}

/// Transport security configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Wrap the listener in TLS
    #[serde(default)]
    pub use_ssl: bool,

    /// PEM certificate chain, required when use_ssl is set
    #[serde(default)]
    pub certificate_file: Option<PathBuf>,

    /// PEM private key, required when use_ssl is set.
    /// Encrypted PKCS#8 keys take their passphrase from the
    /// HAYSTACKD_KEY_PASSPHRASE environment variable.
    #[serde(default)]
    pub key_file: Option<PathBuf>,
}

/// Limits configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitsConfig {
    /// Request buffer size in bytes; a request that fills it without
    /// a terminator is rejected
    #[serde(default = "default_request_buffer_bytes")]
    pub request_buffer_bytes: usize,

    /// Per-session timeout in seconds covering the whole
    /// read-lookup-respond cycle
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Optional JSONL file receiving one record per served query
    #[serde(default)]
    pub query_log_file: Option<PathBuf>,
}

// Default value functions
fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    44445
}

fn default_max_connections() -> usize {
    1024
}

fn default_txt_file() -> PathBuf {
    PathBuf::from("data/corpus.txt")
}

fn default_request_buffer_bytes() -> usize {
    1024
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_connections: default_max_connections(),
        }
    }
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            txt_file: default_txt_file(),
            reread_on_query: false,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            request_buffer_bytes: default_request_buffer_bytes(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| HaystackError::Config(format!("failed to read config file: {e}")))?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load config with priority: env vars > TOML > defaults
    ///
    /// This method uses XDG Base Directory specification for file locations.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load config, optionally from an explicit file path
    ///
    /// Priority order:
    /// 1. Explicit path argument (e.g. from --config)
    /// 2. HAYSTACKD_CONFIG env var
    /// 3. XDG config file (~/.config/haystack/config.toml)
    /// 4. Legacy ./haystack.toml
    /// 5. Defaults
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let xdg = XdgDirs::new();

        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if let Ok(config_path) = env::var("HAYSTACKD_CONFIG") {
            Self::from_file(config_path)?
        } else {
            let xdg_config = xdg.config_file();
            if xdg_config.exists() {
                Self::from_file(xdg_config)?
            } else if Path::new("haystack.toml").exists() {
                Self::from_file("haystack.toml")?
            } else {
                Self::default()
            }
        };

        // Override with environment variables
        config.merge_env();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Merge configuration with environment variables
    pub fn merge_env(&mut self) {
        // Server configuration
        if let Ok(host) = env::var("HAYSTACKD_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = env::var("HAYSTACKD_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(max) = env::var("HAYSTACKD_MAX_CONNECTIONS") {
            if let Ok(m) = max.parse() {
                self.server.max_connections = m;
            }
        }

        // Corpus configuration
        if let Ok(path) = env::var("HAYSTACKD_TXT_FILE") {
            self.corpus.txt_file = PathBuf::from(path);
        }
        if let Ok(reread) = env::var("HAYSTACKD_REREAD_ON_QUERY") {
            if let Ok(r) = reread.parse() {
                self.corpus.reread_on_query = r;
            }
        }

        // TLS configuration
        if let Ok(use_ssl) = env::var("HAYSTACKD_USE_SSL") {
            if let Ok(s) = use_ssl.parse() {
                self.tls.use_ssl = s;
            }
        }
        if let Ok(cert) = env::var("HAYSTACKD_CERTIFICATE_FILE") {
            self.tls.certificate_file = Some(PathBuf::from(cert));
        }
        if let Ok(key) = env::var("HAYSTACKD_KEY_FILE") {
            self.tls.key_file = Some(PathBuf::from(key));
        }

        // Limits configuration
        if let Ok(buffer) = env::var("HAYSTACKD_REQUEST_BUFFER_BYTES") {
            if let Ok(b) = buffer.parse() {
                self.limits.request_buffer_bytes = b;
            }
        }
        if let Ok(timeout) = env::var("HAYSTACKD_REQUEST_TIMEOUT_SECS") {
            if let Ok(t) = timeout.parse() {
                self.limits.request_timeout_secs = t;
            }
        }

        // Logging configuration
        if let Ok(path) = env::var("HAYSTACKD_QUERY_LOG_FILE") {
            self.logging.query_log_file = Some(PathBuf::from(path));
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(HaystackError::Config("port must be non-zero".to_string()));
        }

        if self.server.max_connections == 0 {
            return Err(HaystackError::Config(
                "max connections must be non-zero".to_string(),
            ));
        }

        if self.corpus.txt_file.as_os_str().is_empty() {
            return Err(HaystackError::Config(
                "corpus txt_file must be set".to_string(),
            ));
        }

        if self.limits.request_buffer_bytes == 0 {
            return Err(HaystackError::Config(
                "request buffer size must be non-zero".to_string(),
            ));
        }

        if self.limits.request_timeout_secs == 0 {
            return Err(HaystackError::Config(
                "request timeout must be non-zero".to_string(),
            ));
        }

        if self.tls.use_ssl {
            if self.tls.certificate_file.is_none() {
                return Err(HaystackError::Config(
                    "certificate_file is required when use_ssl is set".to_string(),
                ));
            }
            if self.tls.key_file.is_none() {
                return Err(HaystackError::Config(
                    "key_file is required when use_ssl is set".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Log configuration (redacting sensitive values)
    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen: {}:{}", self.server.host, self.server.port);
        tracing::info!("  Max connections: {}", self.server.max_connections);
        tracing::info!("  Corpus file: {:?}", self.corpus.txt_file);
        tracing::info!("  Reread on query: {}", self.corpus.reread_on_query);
        tracing::info!("  TLS: {}", self.tls.use_ssl);
        if self.tls.use_ssl {
            tracing::info!("  Certificate: {:?}", self.tls.certificate_file);
            tracing::info!("  Key: {:?}", self.tls.key_file);
        }
        tracing::info!(
            "  Request buffer: {} bytes",
            self.limits.request_buffer_bytes
        );
        tracing::info!("  Request timeout: {}s", self.limits.request_timeout_secs);
        if let Some(path) = &self.logging.query_log_file {
            tracing::info!("  Query log: {:?}", path);
        }
    }
}
