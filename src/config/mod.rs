use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::calc::RawInputs;

/// Delays of the start-up reveal sequence, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    pub start_ms: u64,    // Before the title appears
    pub step_ms: u64,     // Between title, subtitle, description and the form
    pub stagger_ms: u64,  // Between consecutive form elements
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            start_ms: 500,
            step_ms: 500,
            stagger_ms: 300,
        }
    }
}

/// An entry of the capitalization select
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalizationOption {
    pub label: String,
    pub periods: u32,
}

impl CapitalizationOption {
    fn new(label: &str, periods: u32) -> Self {
        Self {
            label: label.to_string(),
            periods,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Symbol printed before amounts
    pub currency_symbol: String,

    /// Play the start-up reveal sequence
    pub animate: bool,

    pub timing: Timing,

    /// Choices offered by the capitalization select, in display order
    pub capitalization_options: Vec<CapitalizationOption>,

    /// Values the form starts with
    pub defaults: RawInputs,

    /// Hex color overrides keyed by theme slot ("line", "fill", "accent", ...)
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub theme: BTreeMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "€".to_string(),
            animate: true,
            timing: Timing::default(),
            capitalization_options: vec![
                CapitalizationOption::new("Annual", 1),
                CapitalizationOption::new("Semiannual", 2),
                CapitalizationOption::new("Quarterly", 4),
                CapitalizationOption::new("Monthly", 12),
                CapitalizationOption::new("Daily", 365),
            ],
            defaults: RawInputs {
                capitalization: "1".to_string(),
                ..RawInputs::default()
            },
            theme: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("interes");

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = match Self::config_path() {
            Ok(p) => p,
            Err(_) => return Ok(AppConfig::default()),
        };

        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return Ok(config),
                    Err(e) => tracing::warn!("Failed to parse config: {}", e),
                },
                Err(e) => tracing::warn!("Failed to read config: {}", e),
            }
            // Keep a broken file around for the user to fix
            return Ok(AppConfig::default());
        }

        let config = AppConfig::default();
        if let Err(e) = config.save() {
            tracing::debug!("Could not write default config: {}", e);
        }
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        let mut clean_config = self.clone();

        // A select option must be selectable
        clean_config
            .capitalization_options
            .retain(|o| o.periods > 0 && !o.label.trim().is_empty());

        let content = toml::to_string_pretty(&clean_config)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Index of the select option matching the default capitalization value
    pub fn default_capitalization_index(&self) -> usize {
        let wanted = self.defaults.capitalization.trim();
        self.capitalization_options
            .iter()
            .position(|o| o.periods.to_string() == wanted)
            .unwrap_or(0)
    }
}
