//! Engine settings management
//!
//! Tunables of the solver, number display and token layout, with JSON
//! persistence. Defaults reproduce the engine's documented constants.

use crate::error::EngineResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main engine settings container
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct EngineSettings {
    /// Root search and validity checks
    #[serde(default)]
    pub solver: SolverSettings,
    /// Number formatting
    #[serde(default)]
    pub display: DisplaySettings,
    /// Placement of rewritten tokens
    #[serde(default)]
    pub layout: LayoutSettings,
}

/// Bounded numeric root search settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SolverSettings {
    /// First sample of the scan
    pub search_min: f64,
    /// Last sample of the scan (inclusive)
    pub search_max: f64,
    /// Distance between samples
    pub search_step: f64,
    /// Largest |difference| accepted as a root or as equality
    pub tolerance: f64,
}

impl SolverSettings {
    /// Number of samples the scan visits
    pub fn sample_count(&self) -> usize {
        if self.search_step <= 0.0 || self.search_max < self.search_min {
            return 0;
        }
        ((self.search_max - self.search_min) / self.search_step).round() as usize + 1
    }

    /// Value of the `index`-th sample
    pub fn sample(&self, index: usize) -> f64 {
        self.search_min + index as f64 * self.search_step
    }
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            search_min: -100.0,
            search_max: 100.0,
            search_step: 0.01,
            tolerance: 0.001,
        }
    }
}

/// Number display settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplaySettings {
    /// Decimal places for converted quantities and solved variables
    pub precision: u32,
    /// Decimal places kept when printing evaluated values
    pub value_precision: u32,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            precision: 4,
            value_precision: 10,
        }
    }
}

/// Token layout used when a transformation rewrites a container
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayoutSettings {
    /// Horizontal inset of the first token from the container's left edge
    pub start_offset: f64,
    /// Horizontal distance between consecutive tokens
    pub spacing: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            start_offset: canvas_model::TOKEN_START_OFFSET,
            spacing: canvas_model::TOKEN_SPACING,
        }
    }
}

/// Settings manager for loading, saving, and updating engine settings
pub struct SettingsManager {
    /// Path to the settings file
    settings_path: PathBuf,
    /// Current settings (cached)
    current: EngineSettings,
}

impl SettingsManager {
    /// Create a manager for the given settings file
    pub fn new(settings_path: impl Into<PathBuf>) -> Self {
        Self {
            settings_path: settings_path.into(),
            current: EngineSettings::default(),
        }
    }

    /// Get the path to the settings file
    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    /// Load settings from disk, or use defaults if the file doesn't exist
    pub fn load(&mut self) -> EngineResult<&EngineSettings> {
        if self.settings_path.exists() {
            let content = std::fs::read_to_string(&self.settings_path)?;
            match serde_json::from_str::<EngineSettings>(&content) {
                Ok(settings) => {
                    self.current = settings;
                }
                Err(e) => {
                    tracing::warn!("Failed to parse settings file, using defaults: {}", e);
                    self.current = EngineSettings::default();
                }
            }
        } else {
            self.current = EngineSettings::default();
        }
        Ok(&self.current)
    }

    /// Save current settings to disk
    pub fn save(&self) -> EngineResult<()> {
        if let Some(parent) = self.settings_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.current)?;
        std::fs::write(&self.settings_path, content)?;
        Ok(())
    }

    /// Get current settings
    pub fn get(&self) -> &EngineSettings {
        &self.current
    }

    /// Update settings and save to disk
    pub fn update(&mut self, settings: EngineSettings) -> EngineResult<()> {
        self.current = settings;
        self.save()
    }

    /// Reset settings to defaults and save
    pub fn reset(&mut self) -> EngineResult<&EngineSettings> {
        self.current = EngineSettings::default();
        self.save()?;
        Ok(&self.current)
    }
}
