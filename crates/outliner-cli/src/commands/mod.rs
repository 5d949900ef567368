pub mod batch;
pub mod outline;
pub mod spans;

use outliner_core::config::{self, EmbedderKind, OutlineConfig, Strategy};
use outliner_core::embedding::{self, Embedder};
use outliner_core::error::OutlineError;

use crate::Settings;

/// Load the config file (if any), then apply command-line overrides.
pub fn resolve_config(settings: &Settings) -> Result<OutlineConfig, OutlineError> {
    let mut config = match &settings.config {
        Some(path) => config::load_config(path)?,
        None => OutlineConfig::default(),
    };

    if let Some(seed) = settings.seed {
        config.clustering.seed = seed;
    }
    if let Some(restarts) = settings.restarts {
        config.clustering.restarts = restarts;
    }
    if let Some(kind) = &settings.embedder {
        config.embedder.kind = parse_embedder_kind(kind)?;
    }
    if let Some(dir) = &settings.model_dir {
        config.embedder.model_dir = dir.clone();
    }
    if let Some(strategy) = &settings.strategy {
        config.strategy = parse_strategy(strategy)?;
    }

    config::validate_config(&config)?;
    Ok(config)
}

/// Build and initialize the configured embedder. Callers shut it down when done.
pub fn open_embedder(config: &OutlineConfig) -> Result<Box<dyn Embedder>, OutlineError> {
    let mut embedder = embedding::from_config(&config.embedder)?;
    embedder.initialize()?;
    tracing::debug!(
        kind = ?config.embedder.kind,
        dimension = embedder.dimension(),
        "embedder ready"
    );
    Ok(embedder)
}

fn parse_embedder_kind(s: &str) -> Result<EmbedderKind, OutlineError> {
    match s.to_lowercase().as_str() {
        "hashing" => Ok(EmbedderKind::Hashing),
        "onnx" => Ok(EmbedderKind::Onnx),
        other => Err(OutlineError::ConfigInvalid(format!(
            "unknown embedder '{other}' (expected hashing or onnx)"
        ))),
    }
}

fn parse_strategy(s: &str) -> Result<Strategy, OutlineError> {
    match s.to_lowercase().as_str() {
        "cluster" => Ok(Strategy::Cluster),
        "size-rank" | "size_rank" => Ok(Strategy::SizeRank),
        other => Err(OutlineError::ConfigInvalid(format!(
            "unknown strategy '{other}' (expected cluster or size-rank)"
        ))),
    }
}
