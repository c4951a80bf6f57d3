//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honoured for local runs.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Default JSON file for the file-backed participant store.
pub const DEFAULT_RESPONSES_FILE: &str = "user_responses.json";

/// Where participant records live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Flat JSON array keyed by Prolific ID.
    File,
    /// Firestore `users` / `user_data` collections.
    Firestore,
    /// In-process document collections (local runs, tests).
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "firestore" => Ok(Self::Firestore),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::Invalid {
                name: "STORE_BACKEND",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::File => "file",
            Self::Firestore => "firestore",
            Self::Memory => "memory",
        };
        f.write_str(name)
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Persistence variant
    pub store_backend: StoreBackend,
    /// Path of the participant JSON file (file backend)
    pub user_responses_file: PathBuf,
    /// Directory holding the static client
    pub public_dir: PathBuf,
    /// GCP project ID (firestore backend)
    pub gcp_project_id: String,
    /// Origin allowed by CORS besides localhost
    pub frontend_url: String,
    /// Mark the session cookie `Secure`
    pub cookie_secure: bool,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            port: 3000,
            store_backend: StoreBackend::File,
            user_responses_file: PathBuf::from(DEFAULT_RESPONSES_FILE),
            public_dir: PathBuf::from("public"),
            gcp_project_id: "test-project".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            cookie_secure: false,
        }
    }
}

impl Config {
    /// Config used by the test suites.
    pub fn test_default() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let store_backend = match env::var("STORE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => StoreBackend::File,
        };

        let gcp_project_id = match env::var("GCP_PROJECT_ID") {
            Ok(id) => id,
            Err(_) if store_backend == StoreBackend::Firestore => {
                return Err(ConfigError::Missing("GCP_PROJECT_ID"))
            }
            Err(_) => "local-dev".to_string(),
        };

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            store_backend,
            user_responses_file: env::var("USER_RESPONSES_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_RESPONSES_FILE)),
            public_dir: env::var("PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("public")),
            gcp_project_id,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            cookie_secure: env::var("COOKIE_SECURE")
                .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
                .unwrap_or(false),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}
