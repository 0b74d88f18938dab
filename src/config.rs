//! Service configuration load/save (JSON + environment overrides)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::gate::GateConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// hebfix service settings
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    /// Conversion calls allowed in flight at once
    #[serde(default = "default_max_concurrent_calls")]
    pub max_concurrent_calls: usize,
    /// Conversion calls one client may start per rate window
    #[serde(default = "default_max_calls_per_minute")]
    pub max_calls_per_minute: usize,
    /// Rate window length (s)
    #[serde(default = "default_rate_window_secs")]
    pub rate_window_secs: u64,
    /// Idle-client sweep period, in gate checks
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval: u64,
    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Grammar correction backend; conversion only when absent
    #[serde(default)]
    pub llm: Option<LlmConfig>,
}

/// OpenAI-compatible chat completions endpoint
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LlmConfig {
    /// Full URL of the chat completions endpoint
    pub endpoint: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_max_concurrent_calls() -> usize {
    40
}

fn default_max_calls_per_minute() -> usize {
    30
}

fn default_rate_window_secs() -> u64 {
    60
}

fn default_sweep_interval() -> u64 {
    1024
}

fn default_listen_addr() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_llm_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_llm_timeout_secs() -> u64 {
    20
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_concurrent_calls: default_max_concurrent_calls(),
            max_calls_per_minute: default_max_calls_per_minute(),
            rate_window_secs: default_rate_window_secs(),
            sweep_interval: default_sweep_interval(),
            listen_addr: default_listen_addr(),
            llm: None,
        }
    }
}

impl LlmConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: default_llm_model(),
            api_key: None,
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

impl ServiceConfig {
    /// Reject limits the gate cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent_calls == 0 {
            return Err(ConfigError::Invalid(
                "maxConcurrentCalls must be at least 1".to_string(),
            ));
        }
        if self.max_calls_per_minute == 0 {
            return Err(ConfigError::Invalid(
                "maxCallsPerMinute must be at least 1".to_string(),
            ));
        }
        if self.rate_window_secs == 0 {
            return Err(ConfigError::Invalid(
                "rateWindowSecs must be at least 1".to_string(),
            ));
        }
        if let Some(llm) = &self.llm {
            if llm.endpoint.trim().is_empty() {
                return Err(ConfigError::Invalid("llm.endpoint is empty".to_string()));
            }
        }
        Ok(())
    }

    pub fn gate_config(&self) -> GateConfig {
        GateConfig {
            max_concurrent: self.max_concurrent_calls,
            max_per_window: self.max_calls_per_minute,
            window: Duration::from_secs(self.rate_window_secs),
            sweep_interval: self.sweep_interval,
        }
    }

    /// Apply `HEBFIX_*` overrides read through `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_var(&lookup, "HEBFIX_MAX_CONCURRENT_CALLS") {
            self.max_concurrent_calls = v;
        }
        if let Some(v) = parse_var(&lookup, "HEBFIX_MAX_CALLS_PER_MINUTE") {
            self.max_calls_per_minute = v;
        }
        if let Some(addr) = lookup("HEBFIX_LISTEN_ADDR") {
            self.listen_addr = addr;
        }
        if let Some(endpoint) = lookup("HEBFIX_LLM_ENDPOINT") {
            match self.llm.as_mut() {
                Some(llm) => llm.endpoint = endpoint,
                None => self.llm = Some(LlmConfig::new(endpoint)),
            }
        }
        if let Some(llm) = self.llm.as_mut() {
            if let Some(model) = lookup("HEBFIX_LLM_MODEL") {
                llm.model = model;
            }
            if let Some(key) = lookup("HEBFIX_LLM_API_KEY") {
                llm.api_key = Some(key);
            }
        }
    }
}

fn parse_var<F>(lookup: &F, name: &str) -> Option<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("ignoring {}={:?}: not a number", name, raw);
            None
        }
    }
}

/// Config file path: $HEBFIX_CONFIG, else ~/.config/hebfix/config.json
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os("HEBFIX_CONFIG") {
        return PathBuf::from(path);
    }
    let home = std::env::var("HOME")
        .ok()
        .map(PathBuf::from)
        .filter(|p| p.is_absolute() && p.is_dir())
        .unwrap_or_else(|| PathBuf::from("/var/tmp"));
    home.join(".config").join("hebfix").join("config.json")
}

/// Strict load of one file
pub fn load_config_from(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Load config (defaults if the file is missing or broken), then env overrides
pub fn load_config() -> ServiceConfig {
    let path = config_path();
    let mut config = match load_config_from(&path) {
        Ok(config) => config,
        Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            ServiceConfig::default()
        }
        Err(e) => {
            log::warn!("failed to load {}: {}, using defaults", path.display(), e);
            ServiceConfig::default()
        }
    };
    config.apply_env_overrides(|name| std::env::var(name).ok());
    config
}

/// Save config to the config file path
pub fn save_config(config: &ServiceConfig) -> Result<(), ConfigError> {
    save_config_to(&config_path(), config)
}

pub fn save_config_to(path: &Path, config: &ServiceConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.max_concurrent_calls, 40);
        assert_eq!(config.max_calls_per_minute, 30);
        assert_eq!(config.rate_window_secs, 60);
        assert!(config.llm.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_camel_case_keys() {
        let json = r#"{"maxConcurrentCalls": 5, "maxCallsPerMinute": 7}"#;
        let config: ServiceConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.max_concurrent_calls, 5);
        assert_eq!(config.max_calls_per_minute, 7);
        // missing fields fall back to defaults
        assert_eq!(config.listen_addr, "0.0.0.0:5000");
    }

    #[test]
    fn test_llm_section() {
        let json = r#"{"llm": {"endpoint": "http://localhost:11434/v1/chat/completions"}}"#;
        let config: ServiceConfig = serde_json::from_str(json).unwrap();
        let llm = config.llm.unwrap();
        assert_eq!(llm.model, "gemini-2.0-flash");
        assert_eq!(llm.timeout_secs, 20);
        assert!(llm.api_key.is_none());
    }

    #[test]
    fn test_validate_rejects_zero() {
        let config = ServiceConfig {
            max_concurrent_calls: 0,
            ..ServiceConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = ServiceConfig {
            max_calls_per_minute: 0,
            ..ServiceConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("HEBFIX_MAX_CONCURRENT_CALLS", "8"),
            ("HEBFIX_MAX_CALLS_PER_MINUTE", "not-a-number"),
            ("HEBFIX_LLM_ENDPOINT", "http://llm.local/v1/chat/completions"),
            ("HEBFIX_LLM_API_KEY", "secret"),
        ]
        .into_iter()
        .collect();

        let mut config = ServiceConfig::default();
        config.apply_env_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.max_concurrent_calls, 8);
        assert_eq!(config.max_calls_per_minute, 30);
        let llm = config.llm.unwrap();
        assert_eq!(llm.endpoint, "http://llm.local/v1/chat/completions");
        assert_eq!(llm.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_gate_config() {
        let config = ServiceConfig {
            max_concurrent_calls: 2,
            max_calls_per_minute: 3,
            ..ServiceConfig::default()
        };
        let gate = config.gate_config();
        assert_eq!(gate.max_concurrent, 2);
        assert_eq!(gate.max_per_window, 3);
        assert_eq!(gate.window, Duration::from_secs(60));
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("hebfix-config-{}", std::process::id()));
        let path = dir.join("config.json");
        let config = ServiceConfig {
            max_concurrent_calls: 12,
            llm: Some(LlmConfig::new("http://localhost:8080/v1/chat/completions")),
            ..ServiceConfig::default()
        };

        save_config_to(&path, &config).unwrap();
        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded, config);

        let _ = fs::remove_dir_all(&dir);
    }
}
