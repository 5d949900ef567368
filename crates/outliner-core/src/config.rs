use crate::error::OutlineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Tunables for one pipeline run. Every field has a default, so a config
/// file only needs to name what it changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineConfig {
    pub strategy: Strategy,
    pub clustering: ClusteringConfig,
    pub filter: FilterConfig,
    pub embedder: EmbedderConfig,
}

/// How heading levels are assigned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// K-means over embedding + visual features, clusters ranked by mean size.
    #[default]
    Cluster,
    /// The three largest distinct font sizes map directly to H1..H3.
    SizeRank,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Cluster => write!(f, "cluster"),
            Strategy::SizeRank => write!(f, "size-rank"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    pub seed: u64,
    /// Number of k-means restarts; the lowest-inertia partition wins.
    pub restarts: usize,
    pub max_iterations: usize,
    /// Relative centroid-shift tolerance for convergence.
    pub tolerance: f32,
    pub min_levels: usize,
    pub max_levels: usize,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            restarts: 10,
            max_iterations: 300,
            tolerance: 1e-4,
            min_levels: 2,
            max_levels: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Headings with this many characters or fewer are dropped.
    pub min_chars: usize,
    /// Headings with more words than this are dropped.
    pub max_words: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_chars: 3,
            max_words: 15,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedderKind {
    #[default]
    Hashing,
    Onnx,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedderConfig {
    pub kind: EmbedderKind,
    /// Output dimension for the hashing embedder. The ONNX embedder takes its
    /// dimension from the model.
    pub dimension: usize,
    /// Directory holding `model.onnx` and `tokenizer/tokenizer.json`.
    pub model_dir: PathBuf,
    /// Token sequence length fed to the ONNX model.
    pub max_length: usize,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            kind: EmbedderKind::Hashing,
            dimension: 256,
            model_dir: PathBuf::from("model"),
            max_length: 32,
        }
    }
}

/// Load a config from a JSON file.
pub fn load_config(path: &Path) -> Result<OutlineConfig, OutlineError> {
    let content = std::fs::read_to_string(path).map_err(|e| OutlineError::ConfigLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_config(&content, path)
}

/// Parse a config from a JSON string.
pub fn parse_config(json: &str, source: &Path) -> Result<OutlineConfig, OutlineError> {
    let config: OutlineConfig = serde_json::from_str(json).map_err(|e| OutlineError::ConfigLoad {
        path: source.to_path_buf(),
        reason: e.to_string(),
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Parse a config from a JSON string (no file path context).
pub fn parse_config_str(json: &str) -> Result<OutlineConfig, OutlineError> {
    let config: OutlineConfig = serde_json::from_str(json).map_err(OutlineError::Json)?;
    validate_config(&config)?;
    Ok(config)
}

/// Validate that a config is usable.
pub fn validate_config(config: &OutlineConfig) -> Result<(), OutlineError> {
    let c = &config.clustering;
    if c.min_levels == 0 {
        return Err(OutlineError::ConfigInvalid(
            "clustering.min_levels must be at least 1".into(),
        ));
    }
    if c.min_levels > c.max_levels {
        return Err(OutlineError::ConfigInvalid(format!(
            "clustering.min_levels ({}) exceeds clustering.max_levels ({})",
            c.min_levels, c.max_levels
        )));
    }
    if c.restarts == 0 {
        return Err(OutlineError::ConfigInvalid(
            "clustering.restarts must be at least 1".into(),
        ));
    }
    if c.max_iterations == 0 {
        return Err(OutlineError::ConfigInvalid(
            "clustering.max_iterations must be at least 1".into(),
        ));
    }
    if c.tolerance.is_nan() || c.tolerance < 0.0 {
        return Err(OutlineError::ConfigInvalid(format!(
            "clustering.tolerance must be non-negative, got {}",
            c.tolerance
        )));
    }
    if config.embedder.dimension == 0 {
        return Err(OutlineError::ConfigInvalid(
            "embedder.dimension must be at least 1".into(),
        ));
    }
    if config.embedder.max_length == 0 {
        return Err(OutlineError::ConfigInvalid(
            "embedder.max_length must be at least 1".into(),
        ));
    }
    Ok(())
}
