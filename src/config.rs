//! Bridge configuration.
//!
//! Values come from `~/.config/mlkit-bridge/config.json` (platform config
//! dir) when present, then environment variables override them:
//!
//!   - `MLKIT_WARM_UP_SCRIPT`    — script index to build at startup
//!   - `MLKIT_MAX_REQUEST_BYTES` — channel line limit

use crate::engine::Script;
use crate::error::BridgeError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_REQUEST_BYTES: usize = 64 * 1024 * 1024;

const WARM_UP_ENV: &str = "MLKIT_WARM_UP_SCRIPT";
const MAX_REQUEST_ENV: &str = "MLKIT_MAX_REQUEST_BYTES";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Script index of the recognizer to build before the first request.
    pub warm_up_script: Option<i64>,
    pub max_request_bytes: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            warm_up_script: None,
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
        }
    }
}

/// Default config file location.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mlkit-bridge")
        .join("config.json")
}

impl BridgeConfig {
    /// Load from the default file, then apply environment overrides.
    pub fn load() -> Result<Self, BridgeError> {
        let config = Self::from_file(&config_path())?
            .with_overrides(std::env::var(WARM_UP_ENV).ok(), std::env::var(MAX_REQUEST_ENV).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Read a config file. A missing file yields defaults.
    pub fn from_file(path: &Path) -> Result<Self, BridgeError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("[CONFIG] No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(BridgeError::Configuration(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| BridgeError::Configuration(format!("Invalid {}: {}", path.display(), e)))?;
        log::info!("[CONFIG] Loaded {}", path.display());
        Ok(config)
    }

    fn with_overrides(
        mut self,
        warm_up: Option<String>,
        max_bytes: Option<String>,
    ) -> Result<Self, BridgeError> {
        if let Some(raw) = warm_up.filter(|s| !s.trim().is_empty()) {
            let index = raw.trim().parse::<i64>().map_err(|_| {
                BridgeError::Configuration(format!(
                    "{} must be an integer, got '{}'",
                    WARM_UP_ENV, raw
                ))
            })?;
            self.warm_up_script = Some(index);
        }
        if let Some(raw) = max_bytes.filter(|s| !s.trim().is_empty()) {
            self.max_request_bytes = raw.trim().parse::<usize>().map_err(|_| {
                BridgeError::Configuration(format!(
                    "{} must be a byte count, got '{}'",
                    MAX_REQUEST_ENV, raw
                ))
            })?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), BridgeError> {
        self.warm_up_script()?;
        if self.max_request_bytes == 0 {
            return Err(BridgeError::Configuration(
                "max_request_bytes must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn warm_up_script(&self) -> Result<Option<Script>, BridgeError> {
        self.warm_up_script.map(Script::from_index).transpose()
    }
}
