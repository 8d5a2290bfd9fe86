//! Loading layout settings and the classification vocabulary from a
//! configuration directory:
//!
//! - `layout.toml` with optional `[grid]` and `[proportional]` tables
//! - `vocabulary.yaml` with the keyword tables
//!
//! A missing file means built-in defaults.

use crate::errors::ConfigError;
use crate::layout::{GridConfig, ProportionalConfig};
use crate::vocabulary::{Vocabulary, VocabularyFile};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

pub const LAYOUT_FILE: &str = "layout.toml";
pub const VOCABULARY_FILE: &str = "vocabulary.yaml";

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    pub grid: GridConfig,
    pub proportional: ProportionalConfig,
}

impl LayoutSettings {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = read(path)?;
        let settings: LayoutSettings = toml::from_str(&raw).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        settings.grid.validate()?;
        settings.proportional.validate()?;
        Ok(settings)
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            grid: self.grid.scaled(factor),
            proportional: self.proportional.scaled(factor),
        }
    }
}

pub fn load_vocabulary(path: &Path) -> Result<Vocabulary, ConfigError> {
    let raw = read(path)?;
    let file: VocabularyFile = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    Vocabulary::from_file(file)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub layout: LayoutSettings,
    pub vocabulary: Vocabulary,
}

impl Settings {
    pub fn load_from_dir(path: &Path) -> Result<Self, ConfigError> {
        let layout_path = path.join(LAYOUT_FILE);
        let layout = if layout_path.exists() {
            LayoutSettings::load(&layout_path)?
        } else {
            debug!(path = %layout_path.display(), "no layout settings, using defaults");
            LayoutSettings::default()
        };

        let vocabulary_path = path.join(VOCABULARY_FILE);
        let vocabulary = if vocabulary_path.exists() {
            load_vocabulary(&vocabulary_path)?
        } else {
            debug!(path = %vocabulary_path.display(), "no vocabulary, using built-in");
            Vocabulary::default()
        };

        Ok(Self { layout, vocabulary })
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}
