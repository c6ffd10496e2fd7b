use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::ToolError;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub trello: TrelloConfig,
    #[serde(default)]
    pub planner: PlannerConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TrelloConfig {
    pub key: Option<String>,
    pub token: Option<String>,
    pub default_board: Option<String>,
    pub default_list: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlannerConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: f32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            temperature: 0.0,
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "gpt-oss:20b".to_string()
}

/// Trello credential pair, required before any session starts.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub key: String,
    pub token: String,
}

/// Board/list fallbacks used when a tool call leaves them blank.
#[derive(Debug, Clone, Default)]
pub struct BoardDefaults {
    pub board: Option<String>,
    pub list: Option<String>,
}

impl Config {
    /// Load configuration from a TOML file, if present, then apply
    /// environment overrides (TRELLO_KEY / TRELLO_TOKEN).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = if path.as_ref().exists() {
            let content = fs::read_to_string(&path)
                .context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")?
        } else {
            Config::default()
        };

        if let Ok(key) = std::env::var("TRELLO_KEY") {
            config.trello.key = Some(key);
        }
        if let Ok(token) = std::env::var("TRELLO_TOKEN") {
            config.trello.token = Some(token);
        }

        Ok(config)
    }
}

impl TrelloConfig {
    /// Credentials are the only hard requirement: missing key or token is
    /// fatal before the first planning step.
    pub fn credentials(&self) -> Result<Credentials, ToolError> {
        match (&self.key, &self.token) {
            (Some(key), Some(token)) if !key.is_empty() && !token.is_empty() => {
                Ok(Credentials {
                    key: key.clone(),
                    token: token.clone(),
                })
            }
            _ => Err(ToolError::Configuration(
                "set TRELLO_KEY and TRELLO_TOKEN in the environment, .env or config.toml"
                    .to_string(),
            )),
        }
    }

    pub fn defaults(&self) -> BoardDefaults {
        BoardDefaults {
            board: self.default_board.clone(),
            list: self.default_list.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parsing() {
        let toml_str = r#"
            [trello]
            key = "test_key"
            token = "test_token"
            default_board = "https://trello.com/b/S33WAXxl/nocapital"
            default_list = "A fazer"

            [planner]
            endpoint = "http://localhost:11434"
            model = "gpt-oss:20b"
            temperature = 0.2
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.trello.key.as_deref(), Some("test_key"));
        assert_eq!(config.trello.default_list.as_deref(), Some("A fazer"));
        assert_eq!(config.planner.model, "gpt-oss:20b");
        assert!((config.planner.temperature - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn test_config_defaults_when_sections_missing() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.planner.endpoint, "http://localhost:11434");
        assert_eq!(config.planner.model, "gpt-oss:20b");
        assert_eq!(config.planner.temperature, 0.0);
        assert!(config.trello.key.is_none());
    }

    #[test]
    fn test_missing_credentials_is_configuration_error() {
        let trello = TrelloConfig::default();
        let err = trello.credentials().unwrap_err();
        assert!(matches!(err, ToolError::Configuration(_)));
    }

    #[test]
    fn test_blank_credentials_rejected() {
        let trello = TrelloConfig {
            key: Some(String::new()),
            token: Some("tok".to_string()),
            ..TrelloConfig::default()
        };
        assert!(trello.credentials().is_err());
    }

    #[test]
    fn test_defaults_projection() {
        let trello = TrelloConfig {
            default_board: Some("S33WAXxl".to_string()),
            default_list: Some("A fazer".to_string()),
            ..TrelloConfig::default()
        };
        let defaults = trello.defaults();
        assert_eq!(defaults.board.as_deref(), Some("S33WAXxl"));
        assert_eq!(defaults.list.as_deref(), Some("A fazer"));
    }
}
