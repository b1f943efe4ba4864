//! Persisted merge settings

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::layout::{LayoutMode, LayoutPolicy, PaperSize, RotationStrategy};

pub const DEFAULT_OUTPUT_NAME: &str = "merged";

/// `<name>.pdf`, refusing names that would leave the output directory
pub fn output_file_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(Error::InvalidOption(format!("invalid output name '{}'", name)));
    }
    Ok(format!("{}.pdf", name))
}

/// Merge settings as stored in a JSON file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub layout: LayoutMode,
    pub page_size: PaperSize,
    pub rotation: RotationStrategy,
    /// Output file name without the `.pdf` extension
    pub output_name: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            layout: LayoutMode::KeepOriginal,
            page_size: PaperSize::A4,
            rotation: RotationStrategy::Auto,
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
        }
    }
}

impl MergeConfig {
    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Save settings to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn policy(&self) -> LayoutPolicy {
        LayoutPolicy::new(self.layout, self.page_size, self.rotation)
    }
}
