//! Text embedding backends.
//!
//! An [`Embedder`] maps a string to a fixed-length vector. It is built once
//! per process, initialized explicitly, shared by reference across every
//! document, and shut down at exit.
//!
//! Backends:
//! - [`hashing::HashingEmbedder`] (default): model-free feature hashing
//! - `onnx::OnnxEmbedder` (feature `onnx`): transformer model via ONNX Runtime

pub mod hashing;
#[cfg(feature = "onnx")]
pub mod onnx;

use crate::config::{EmbedderConfig, EmbedderKind};
use crate::error::OutlineError;

pub trait Embedder: Send + Sync {
    /// Load model state. Must be called once before the first embed.
    fn initialize(&mut self) -> Result<(), OutlineError>;

    /// Length of every vector this embedder returns.
    fn dimension(&self) -> usize;

    /// Embed one text, reporting failures.
    fn try_embed(&self, text: &str) -> Result<Vec<f32>, OutlineError>;

    /// Embed one text. Failures degrade to a zero vector of [`Self::dimension`]
    /// so a single bad string never aborts a document.
    fn embed(&self, text: &str) -> Vec<f32> {
        let dim = self.dimension();
        match self.try_embed(text) {
            Ok(v) if v.len() == dim => v,
            Ok(v) => {
                tracing::warn!(
                    expected = dim,
                    got = v.len(),
                    "embedding has wrong dimension, using zero vector"
                );
                vec![0.0; dim]
            }
            Err(e) => {
                let preview: String = text.chars().take(50).collect();
                tracing::warn!(text = %preview, error = %e, "embedding failed, using zero vector");
                vec![0.0; dim]
            }
        }
    }

    /// Release model state. Safe to call more than once.
    fn shutdown(&mut self) {}
}

/// Build the embedder selected by the config (not yet initialized).
pub fn from_config(config: &EmbedderConfig) -> Result<Box<dyn Embedder>, OutlineError> {
    match config.kind {
        EmbedderKind::Hashing => Ok(Box::new(hashing::HashingEmbedder::new(config.dimension))),
        #[cfg(feature = "onnx")]
        EmbedderKind::Onnx => Ok(Box::new(onnx::OnnxEmbedder::new(
            config.model_dir.clone(),
            config.max_length,
        ))),
        #[cfg(not(feature = "onnx"))]
        EmbedderKind::Onnx => Err(OutlineError::EmbedderInit(
            "the onnx embedder requires building with `--features onnx`".into(),
        )),
    }
}

/// L2-normalize in place. Zero vectors are left unchanged.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
