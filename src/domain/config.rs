//! # Configuration
//!
//! Manages the loading and parsing of the application's configuration file (`config.yaml`).
//! Defines the structs for the Matrix service connection and session defaults.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub services: ServicesConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl AppConfig {
    /// Loads and parses the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }
}

/// Configuration for various connected services.
#[derive(Debug, Deserialize, Clone)]
pub struct ServicesConfig {
    pub matrix: MatrixConfig,
}

/// Specific configuration for the Matrix service.
#[derive(Debug, Deserialize, Clone)]
pub struct MatrixConfig {
    pub username: String,
    pub password: String,
    pub homeserver: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Session defaults applied when a command does not specify them.
#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    /// Votes each attendee may cast (`.create` can override, 1-9).
    #[serde(default = "default_max_votes")]
    pub max_votes: usize,
    /// Discussion slot length for `.next` when no argument is given.
    #[serde(default = "default_discussion_minutes")]
    pub discussion_minutes: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_votes: default_max_votes(),
            discussion_minutes: default_discussion_minutes(),
        }
    }
}

fn default_max_votes() -> usize {
    3
}

fn default_discussion_minutes() -> f64 {
    5.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_minimal_config_gets_session_defaults() {
        let yaml = r#"
services:
  matrix:
    username: "bot"
    password: "secret"
    homeserver: "https://matrix.example.org"
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.services.matrix.username, "bot");
        assert_eq!(config.session.max_votes, 3);
        assert_eq!(config.session.discussion_minutes, 5.0);
        assert!(config.services.matrix.display_name.is_none());
    }

    #[test]
    fn test_session_overrides() {
        let yaml = r#"
services:
  matrix:
    username: "bot"
    password: "secret"
    homeserver: "https://matrix.example.org"
    display_name: "Barista"
session:
  max_votes: 5
  discussion_minutes: 8.5
"#;
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.session.max_votes, 5);
        assert_eq!(config.session.discussion_minutes, 8.5);
        assert_eq!(
            config.services.matrix.display_name.as_deref(),
            Some("Barista")
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "services:\n  matrix:\n    username: bot\n    password: secret\n    homeserver: https://matrix.example.org"
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(
            config.services.matrix.homeserver,
            "https://matrix.example.org"
        );

        assert!(AppConfig::load(Path::new("/nonexistent/config.yaml")).is_err());
    }
}
