use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Config file looked up in the working directory at start-up.
pub const CONFIG_FILE: &str = "impedance.json";

// ---------------------------------------------------------------------------
// Pipeline configuration
// ---------------------------------------------------------------------------

/// Where the experiment data lives and what to do with the charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding one CSV per experimental run.
    pub data_dir: PathBuf,
    /// Metadata table with one row per run file.
    pub metadata_path: PathBuf,
    /// Glob matched against file names inside `data_dir`.
    pub pattern: String,
    /// When set, both charts are also written here as SVG.
    pub export_dir: Option<PathBuf>,
    /// Open the interactive chart window after processing.
    pub show_window: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("cleaned_dataset/data"),
            metadata_path: PathBuf::from("cleaned_dataset/metadata.csv"),
            pattern: "*.csv".to_string(),
            export_dir: None,
            show_window: true,
        }
    }
}

impl PipelineConfig {
    /// Read the config from `path`, or fall back to the defaults when the
    /// file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, PipelineError> {
        if !path.exists() {
            log::info!("No {} found, using default paths", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let text = std::fs::read_to_string(path).map_err(|source| PipelineError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| PipelineError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Fail fast when either input is missing, naming the offending path.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !self.metadata_path.is_file() {
            return Err(PipelineError::MissingInput {
                what: "metadata file",
                path: self.metadata_path.clone(),
            });
        }
        if !self.data_dir.is_dir() {
            return Err(PipelineError::MissingInput {
                what: "data directory",
                path: self.data_dir.clone(),
            });
        }
        Ok(())
    }

    /// Full glob pattern rooted at the data directory.
    pub fn file_glob(&self) -> String {
        self.data_dir.join(&self.pattern).to_string_lossy().into_owned()
    }
}
