use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use thiserror::Error;

/// Application settings that can be configured through the web interface
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppSettings {
    /// Default blind level (1-10)
    pub default_level: u8,
    /// Default AI difficulty/strategy name
    pub default_ai_strategy: String,
    /// Session timeout in minutes
    pub session_timeout_minutes: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_level: 1,
            default_ai_strategy: "baseline".to_string(),
            session_timeout_minutes: 30,
        }
    }
}

impl AppSettings {
    /// Validate settings values
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.default_level < 1 || self.default_level > 10 {
            return Err(SettingsError::InvalidValue(
                "default_level must be between 1 and 10".to_string(),
            ));
        }

        if self.default_ai_strategy.is_empty() {
            return Err(SettingsError::InvalidValue(
                "default_ai_strategy cannot be empty".to_string(),
            ));
        }

        if self.session_timeout_minutes == 0 {
            return Err(SettingsError::InvalidValue(
                "session_timeout_minutes must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// In-memory settings store with validation
#[derive(Debug)]
pub struct SettingsStore {
    settings: RwLock<AppSettings>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self {
            settings: RwLock::new(AppSettings::default()),
        }
    }

    pub fn with_settings(settings: AppSettings) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self {
            settings: RwLock::new(settings),
        })
    }

    /// Get current settings
    pub fn get(&self) -> Result<AppSettings, SettingsError> {
        self.settings
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| SettingsError::StoragePoisoned)
    }

    /// Update settings with validation
    pub fn update(&self, new_settings: AppSettings) -> Result<AppSettings, SettingsError> {
        new_settings.validate()?;

        let mut guard = self
            .settings
            .write()
            .map_err(|_| SettingsError::StoragePoisoned)?;
        *guard = new_settings.clone();
        Ok(new_settings)
    }

    /// Update specific field
    pub fn update_field(
        &self,
        field: &str,
        value: serde_json::Value,
    ) -> Result<AppSettings, SettingsError> {
        let mut current = self.get()?;

        match field {
            "default_level" => {
                let level = value.as_u64().ok_or_else(|| {
                    SettingsError::InvalidValue("default_level must be a number".to_string())
                })? as u8;
                current.default_level = level;
            }
            "default_ai_strategy" => {
                let strategy = value.as_str().ok_or_else(|| {
                    SettingsError::InvalidValue("default_ai_strategy must be a string".to_string())
                })?;
                current.default_ai_strategy = strategy.to_string();
            }
            "session_timeout_minutes" => {
                let timeout = value.as_u64().ok_or_else(|| {
                    SettingsError::InvalidValue(
                        "session_timeout_minutes must be a number".to_string(),
                    )
                })?;
                current.session_timeout_minutes = timeout;
            }
            _ => {
                return Err(SettingsError::InvalidValue(format!(
                    "unknown field: {}",
                    field
                )))
            }
        }

        self.update(current)
    }

    /// Reset to default settings
    pub fn reset(&self) -> Result<AppSettings, SettingsError> {
        let defaults = AppSettings::default();
        self.update(defaults)
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
    #[error("Settings storage poisoned")]
    StoragePoisoned,
}
