//! Application configuration.
//!
//! Runtime settings are resolved with priority config.toml > environment
//! (.env included) > defaults. Fixed generation constants live here too.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::llm::retry::{RetryConfig, RetryPolicy};
use crate::planner::PriorityWeights;

// ==================== Defaults ====================

pub const DEFAULT_DATABASE_PATH: &str = "data/study_agent.db";

/// Server address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Server port
pub const SERVER_PORT: u16 = 8000;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Frontend allowed by CORS
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// Request body ceiling for PDF uploads
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Per-request timeout of the LLM HTTP client
pub const LLM_TIMEOUT_SECS: u64 = 120;

// ==================== Session Configuration ====================

/// Reading speed used to size lessons
pub const WORDS_PER_MINUTE: usize = 200;

pub const MIN_DURATION_MINUTES: i64 = 5;

pub const MAX_DURATION_MINUTES: i64 = 30;

pub const DEFAULT_DURATION_MINUTES: i64 = 10;

pub const QUIZ_QUESTION_COUNT: usize = 3;

/// Default number of recommendations returned
pub const RECOMMENDATION_LIMIT: usize = 3;

/// Max length of subject and topic names
pub const MAX_NAME_CHARS: usize = 100;

// ==================== LLM Request Configuration ====================

/// Reference material sent to the model is cut to this many characters
pub const REFERENCE_EXCERPT_CHARS: usize = 3000;

/// Output ceiling of the default model
pub const MAX_COMPLETION_TOKENS: u32 = 16_000;

pub const CONTENT_TEMPERATURE: f32 = 0.7;

pub const QUIZ_TEMPERATURE: f32 = 0.8;

pub const QUIZ_MAX_TOKENS: u32 = 1500;

// ==================== Runtime Settings ====================

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    database: DatabaseConfig,
    #[serde(default)]
    server: ServerConfig,
    #[serde(default)]
    llm: LlmConfig,
    #[serde(default)]
    priority: PriorityWeights,
    #[serde(default)]
    cors: CorsConfig,
}

#[derive(Debug, Default, Deserialize)]
struct DatabaseConfig {
    path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerConfig {
    addr: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmConfig {
    model: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    #[serde(flatten)]
    retry: RetryConfig,
}

#[derive(Debug, Default, Deserialize)]
struct CorsConfig {
    origin: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub model: String,
    pub base_url: String,
    /// Only read from the environment, never from config.toml
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_path: PathBuf,
    pub bind_addr: String,
    pub llm: LlmSettings,
    pub priority: PriorityWeights,
    pub cors_origin: String,
}

impl Settings {
    /// Merge a parsed config file with environment lookups
    pub fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let database_path = file
            .database
            .path
            .or_else(|| env("DATABASE_PATH"))
            .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string());

        let port = file
            .server
            .port
            .or_else(|| env("SERVER_PORT").and_then(|p| p.parse().ok()))
            .unwrap_or(SERVER_PORT);
        let addr = file.server.addr.unwrap_or_else(|| SERVER_ADDR.to_string());

        let llm = LlmSettings {
            model: file
                .llm
                .model
                .or_else(|| env("OPENAI_MODEL"))
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: file
                .llm
                .base_url
                .or_else(|| env("OPENAI_BASE_URL"))
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: env("OPENAI_API_KEY"),
            timeout: Duration::from_secs(file.llm.timeout_secs.unwrap_or(LLM_TIMEOUT_SECS)),
            retry: RetryPolicy::from_config(&file.llm.retry),
        };

        Self {
            database_path: PathBuf::from(database_path),
            bind_addr: format!("{}:{}", addr, port),
            llm,
            priority: file.priority,
            cors_origin: file
                .cors
                .origin
                .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
        }
    }
}

fn read_config_file(path: &Path) -> FileConfig {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return FileConfig::default();
    };
    match toml::from_str(&contents) {
        Ok(config) => {
            tracing::info!("Loaded settings from {}", path.display());
            config
        }
        Err(e) => {
            tracing::warn!("Ignoring malformed {}: {}", path.display(), e);
            FileConfig::default()
        }
    }
}

/// Load settings with priority: config.toml > .env / environment > default
pub fn load_settings() -> Settings {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let settings = Settings::resolve(read_config_file(Path::new("config.toml")), |key| {
        std::env::var(key).ok()
    });
    tracing::info!(
        database = %settings.database_path.display(),
        model = %settings.llm.model,
        "Settings resolved"
    );
    settings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(FileConfig::default(), env_of(&[]));
        assert_eq!(settings.database_path, PathBuf::from(DEFAULT_DATABASE_PATH));
        assert_eq!(settings.bind_addr, "0.0.0.0:8000");
        assert_eq!(settings.llm.model, DEFAULT_MODEL);
        assert_eq!(settings.llm.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.llm.api_key, None);
        assert_eq!(settings.llm.retry, RetryPolicy::default());
        assert_eq!(settings.priority, PriorityWeights::default());
        assert_eq!(settings.cors_origin, DEFAULT_CORS_ORIGIN);
    }

    #[test]
    fn test_environment_fills_gaps() {
        let settings = Settings::resolve(
            FileConfig::default(),
            env_of(&[
                ("DATABASE_PATH", "/tmp/s.db"),
                ("OPENAI_API_KEY", "sk-test"),
                ("OPENAI_MODEL", "gpt-4o"),
                ("SERVER_PORT", "9001"),
            ]),
        );
        assert_eq!(settings.database_path, PathBuf::from("/tmp/s.db"));
        assert_eq!(settings.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(settings.llm.model, "gpt-4o");
        assert_eq!(settings.bind_addr, "0.0.0.0:9001");
    }

    #[test]
    fn test_file_wins_over_environment() {
        let file: FileConfig = toml::from_str(
            r#"
            [database]
            path = "file.db"

            [server]
            addr = "127.0.0.1"
            port = 7000

            [llm]
            model = "local-model"
            base_url = "http://localhost:11434/v1"
            max_attempts = 5
            min_delay_secs = 1

            [priority]
            never_studied = 200.0

            [cors]
            origin = "http://example.test"
            "#,
        )
        .unwrap();

        let settings = Settings::resolve(
            file,
            env_of(&[("DATABASE_PATH", "env.db"), ("OPENAI_MODEL", "gpt-4o")]),
        );
        assert_eq!(settings.database_path, PathBuf::from("file.db"));
        assert_eq!(settings.bind_addr, "127.0.0.1:7000");
        assert_eq!(settings.llm.model, "local-model");
        assert_eq!(settings.llm.base_url, "http://localhost:11434/v1");
        assert_eq!(settings.llm.retry.max_attempts, 5);
        assert_eq!(settings.llm.retry.min_delay, Duration::from_secs(1));
        assert_eq!(settings.priority.never_studied, 200.0);
        assert_eq!(settings.priority.content_bonus, 10.0);
        assert_eq!(settings.cors_origin, "http://example.test");
    }

    #[test]
    fn test_blank_api_key_is_unset() {
        let settings = Settings::resolve(FileConfig::default(), env_of(&[("OPENAI_API_KEY", " ")]));
        assert_eq!(settings.llm.api_key, None);
    }

    #[test]
    fn test_bad_port_falls_back() {
        let settings = Settings::resolve(FileConfig::default(), env_of(&[("SERVER_PORT", "http")]));
        assert_eq!(settings.bind_addr, "0.0.0.0:8000");
    }
}
