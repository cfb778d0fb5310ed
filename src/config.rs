//! Process configuration
//!
//! Credentials and endpoints, loaded from `~/.campaignstudio/config.json`
//! with environment-variable overrides for the secrets. A missing Gemini key
//! is a first-class condition (`CredentialsMissing`) reported before any
//! network call, never a panic.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::{ClassifiedError, ErrorKind};
use crate::models::Quality;
use crate::supabase::DEFAULT_SUPABASE_URL;

/// Environment variable that overrides the stored Gemini key
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub schema_version: u32,
    /// Stored Gemini API key; the environment variable wins when both exist
    pub gemini_api_key: Option<String>,
    pub default_quality: Quality,
    pub supabase_url: String,
    pub supabase_anon_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: 1,
            gemini_api_key: None,
            default_quality: Quality::Standard,
            supabase_url: DEFAULT_SUPABASE_URL.to_string(),
            supabase_anon_key: None,
        }
    }
}

impl Config {
    /// Get the default config directory
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to get home directory")?;
        Ok(home.join(".campaignstudio"))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load config from the default path or return default
    pub fn load_or_default() -> Self {
        match Self::config_path().and_then(|path| Self::load_from(&path)) {
            Ok(config) => config,
            Err(e) => {
                debug!("Failed to load config, using default: {}", e);
                Self::default()
            }
        }
    }

    /// Load config from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Resolve the Gemini credential: environment first, then the stored key.
    /// Absence is the local `CredentialsMissing` condition.
    pub fn resolve_gemini_key(&self) -> Result<String, ClassifiedError> {
        std::env::var(GEMINI_API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| {
                self.gemini_api_key
                    .clone()
                    .filter(|key| !key.trim().is_empty())
            })
            .ok_or_else(|| ClassifiedError::new(ErrorKind::CredentialsMissing))
    }
}
