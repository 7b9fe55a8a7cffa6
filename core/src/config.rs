//! Pipeline configuration.
//!
//! All knobs live here: the three extract paths, the store location, the
//! output directory, and the detection parameters. Loadable from a JSON
//! file; the runner overrides individual fields from CLI flags.

use crate::error::PipelineResult;
use serde::{Deserialize, Serialize};

/// Clustering parameters for the anomaly detector. Fixed configuration,
/// never learned or tuned at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Neighborhood radius, Euclidean, inclusive.
    #[serde(default = "default_eps")]
    pub eps: f64,
    /// Minimum neighborhood size for a core point, counting the point itself.
    #[serde(default = "default_min_pts")]
    pub min_pts: usize,
}

fn default_eps() -> f64 {
    0.5
}

fn default_min_pts() -> usize {
    5
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            eps: default_eps(),
            min_pts: default_min_pts(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Client registry extract (whitespace-delimited, two-word risk defect).
    pub clients_path: String,
    /// Product registry extract (comma-delimited).
    pub products_path: String,
    /// Transaction ledger extract (tab-delimited, stray single quotes).
    pub transactions_path: String,
    /// SQLite database holding the canonical tables across runs.
    pub db_path: String,
    /// Directory receiving the flagged CSV and the scatter plots.
    pub output_dir: String,
    #[serde(default)]
    pub detection: DetectionConfig,
    /// Optional descriptive-profile document over the joined view.
    /// Skipped entirely when unset.
    #[serde(default)]
    pub profile_path: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            clients_path: "./media/CLIENTES.csv".into(),
            products_path: "./media/PRODUCTO.csv".into(),
            transactions_path: "./media/TRANSACCIONES.csv".into(),
            db_path: "wire_screen.db".into(),
            output_dir: ".".into(),
            detection: DetectionConfig::default(),
            profile_path: None,
        }
    }
}

impl PipelineConfig {
    /// Load from a JSON config file.
    pub fn load(path: &str) -> PipelineResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        Self {
            db_path: ":memory:".into(),
            ..Self::default()
        }
    }
}
