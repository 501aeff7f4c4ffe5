use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_TOOLKIT: &str = "CODEINTERPRETER";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    pub api_base_url: String,
    pub model: Option<String>,
    pub toolkits: Vec<String>,
    pub request_timeout_secs: u64,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            model: None,
            toolkits: vec![DEFAULT_TOOLKIT.to_string()],
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl WorkspaceConfig {
    /// Load from `DSA_CONFIG_PATH` (if set) and apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("DSA_CONFIG_PATH") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        let config = Self::from_toml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })?;
        info!(target: "config", %path, "Loaded workspace config (TOML)");
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Apply `DSA_*` overrides looked up through `lookup`. Blank values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("DSA_API_BASE_URL") {
            self.api_base_url = url;
        }
        if let Some(model) = get("DSA_MODEL") {
            self.model = Some(model);
        }
        if let Some(toolkits) = get("DSA_TOOLKITS") {
            self.toolkits = toolkits
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();
        }
        if let Some(timeout) = get("DSA_REQUEST_TIMEOUT_SECS").and_then(|t| t.parse().ok()) {
            self.request_timeout_secs = timeout;
        }
    }
}

/// Per-user directory for the preferences database and the log file.
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("dsa-workspace")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = WorkspaceConfig::default();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.toolkits, vec!["CODEINTERPRETER".to_string()]);
        assert!(config.model.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = WorkspaceConfig::from_toml(r#"api_base_url = "https://dsa.example.com""#).unwrap();
        assert_eq!(config.api_base_url, "https://dsa.example.com");
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(WorkspaceConfig::from_toml("request_timeout_secs = \"soon\"").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("DSA_MODEL", "gpt-4o"),
            ("DSA_TOOLKITS", "CODEINTERPRETER, HACKERNEWS,,"),
            ("DSA_REQUEST_TIMEOUT_SECS", "30"),
            ("DSA_API_BASE_URL", "  "),
        ]);
        let mut config = WorkspaceConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.model.as_deref(), Some("gpt-4o"));
        assert_eq!(config.toolkits, vec!["CODEINTERPRETER", "HACKERNEWS"]);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workspace.toml");
        std::fs::write(&path, "toolkits = []\nmodel = \"gpt-4o-mini\"\n").unwrap();
        let config = WorkspaceConfig::from_file(path.to_str().unwrap()).unwrap();
        assert!(config.toolkits.is_empty());
        assert_eq!(config.model.as_deref(), Some("gpt-4o-mini"));

        let missing = WorkspaceConfig::from_file("/nonexistent/workspace.toml");
        assert!(matches!(missing, Err(ConfigError::Read { .. })));
    }
}
