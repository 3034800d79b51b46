use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// File looked up in the working directory at start-up.
pub const CONFIG_FILE: &str = "datanexus.json";

/// Presentation settings for the dashboard shell. Every field is optional in
/// the JSON file; missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub title: String,
    pub window_size: [f32; 2],
    pub min_window_size: [f32; 2],
    /// Rows shown in the raw data preview after upload.
    pub preview_rows: usize,
    /// Rows shown in the processed snapshot on the transformation page.
    pub snapshot_rows: usize,
    /// Rows shown under "View chart data".
    pub chart_data_rows: usize,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            title: "DataNexus – Analytics Hub".to_owned(),
            window_size: [1280.0, 820.0],
            min_window_size: [720.0, 480.0],
            preview_rows: 50,
            snapshot_rows: 10,
            chart_data_rows: 20,
        }
    }
}

impl ShellConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("parsing shell config")
    }

    /// Read the config at `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = ShellConfig::from_json(r#"{ "preview_rows": 5 }"#).unwrap();
        assert_eq!(cfg.preview_rows, 5);
        assert_eq!(cfg.snapshot_rows, ShellConfig::default().snapshot_rows);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(ShellConfig::from_json("{ preview_rows").is_err());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let cfg = ShellConfig::load(Path::new("definitely/not/here.json")).unwrap();
        assert_eq!(cfg, ShellConfig::default());
    }
}
