//! YAML run configuration.
//!
//! ```yaml
//! data:
//!   save_dir: plots
//!   input_dir: data/2022hc_cb6_22m/inputs
//!   scc_dir: data
//!   scc_filename: SCCDownload-2025-0708-202427.csv
//! analysis_categories:
//!   iron-and-steel:
//!     keywords: [iron, steel]
//!     scc_level: 3
//!     pollutant: PM25-PRI
//! ```

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::filter::{SccLevel, Selection};

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    pub save_dir: PathBuf,
    pub input_dir: PathBuf,
    pub scc_dir: PathBuf,
    pub scc_filename: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CategoryParams {
    keywords: Selection,
    scc_level: u8,
    pollutant: Selection,
}

/// One named analysis: which SCC labels to match and which pollutant to keep.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisCategory {
    pub name: String,
    pub keywords: Selection,
    pub scc_level: u8,
    pub pollutant: Selection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub data: DataConfig,
    #[serde(default)]
    analysis_categories: IndexMap<String, CategoryParams>,
}

impl AppConfig {
    /// Loads and validates the config from a YAML file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: AppConfig = serde_yaml::from_str(content)?;
        for (name, params) in &config.analysis_categories {
            SccLevel::try_from(params.scc_level)
                .with_context(|| format!("analysis category '{name}'"))?;
        }
        Ok(config)
    }

    /// Full path of the SCC reference file.
    pub fn scc_path(&self) -> PathBuf {
        self.data.scc_dir.join(&self.data.scc_filename)
    }

    /// The configured categories, in the order the file lists them.
    pub fn categories(&self) -> Vec<AnalysisCategory> {
        self.analysis_categories
            .iter()
            .map(|(name, p)| AnalysisCategory {
                name: name.clone(),
                keywords: p.keywords.clone(),
                scc_level: p.scc_level,
                pollutant: p.pollutant.clone(),
            })
            .collect()
    }
}
