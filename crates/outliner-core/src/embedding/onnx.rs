//! ONNX Runtime sentence embedder
//!
//! Loads a transformer encoder exported to ONNX plus its HuggingFace
//! tokenizer, and embeds a text as the mean of the last hidden state over the
//! padded token sequence, L2-normalized.
//!
//! # Model Location
//!
//! ```text
//! <model_dir>/model.onnx
//! <model_dir>/tokenizer/tokenizer.json
//! ```

use crate::embedding::{l2_normalize, Embedder};
use crate::error::OutlineError;
use ndarray::Array2;
use ort::{session::Session, value::Value};
use std::path::PathBuf;
use std::sync::Mutex;
use tokenizers::Tokenizer;

/// Hidden size reported before the model is loaded.
const DEFAULT_DIM: usize = 768;

struct Loaded {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    input_names: Vec<String>,
    pad_id: u32,
}

pub struct OnnxEmbedder {
    model_dir: PathBuf,
    max_length: usize,
    dimension: usize,
    loaded: Option<Loaded>,
}

impl OnnxEmbedder {
    pub fn new(model_dir: PathBuf, max_length: usize) -> Self {
        Self {
            model_dir,
            max_length: max_length.max(1),
            dimension: DEFAULT_DIM,
            loaded: None,
        }
    }

    fn load(&self) -> Result<Loaded, OutlineError> {
        let model_path = self.model_dir.join("model.onnx");
        let tokenizer_path = self.model_dir.join("tokenizer").join("tokenizer.json");

        if !model_path.exists() {
            return Err(OutlineError::EmbedderInit(format!(
                "model not found at {}",
                model_path.display()
            )));
        }
        if !tokenizer_path.exists() {
            return Err(OutlineError::EmbedderInit(format!(
                "tokenizer not found at {}",
                tokenizer_path.display()
            )));
        }

        tracing::info!("loading ONNX model from {}", model_path.display());

        let session = Session::builder()
            .and_then(|b| b.with_intra_threads(1))
            .and_then(|b| b.commit_from_file(&model_path))
            .map_err(|e| {
                OutlineError::EmbedderInit(format!(
                    "failed to load ONNX model from {}: {e}",
                    model_path.display()
                ))
            })?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| OutlineError::EmbedderInit(format!("failed to load tokenizer: {e}")))?;

        let input_names = session.inputs.iter().map(|i| i.name.clone()).collect();
        let pad_id = tokenizer.token_to_id("[PAD]").unwrap_or(0);

        Ok(Loaded {
            session: Mutex::new(session),
            tokenizer,
            input_names,
            pad_id,
        })
    }

    fn run(&self, loaded: &Loaded, text: &str) -> Result<Vec<f32>, OutlineError> {
        let degraded = |what: &str, e: &dyn std::fmt::Display| {
            OutlineError::EmbeddingDegraded(format!("{what}: {e}"))
        };

        let encoding = loaded
            .tokenizer
            .encode(text, true)
            .map_err(|e| degraded("tokenization failed", &e))?;

        let len = self.max_length;
        let fit = |values: &[u32], pad: u32| -> Vec<i64> {
            let mut out: Vec<i64> = values.iter().take(len).map(|&v| v as i64).collect();
            out.resize(len, pad as i64);
            out
        };
        let ids = fit(encoding.get_ids(), loaded.pad_id);
        let mask = fit(encoding.get_attention_mask(), 0);
        let type_ids = fit(encoding.get_type_ids(), 0);

        let mut inputs = Vec::with_capacity(loaded.input_names.len());
        for name in &loaded.input_names {
            let data = match name.as_str() {
                "input_ids" => ids.clone(),
                "attention_mask" => mask.clone(),
                "token_type_ids" => type_ids.clone(),
                other => {
                    return Err(OutlineError::EmbeddingDegraded(format!(
                        "model expects unsupported input '{other}'"
                    )))
                }
            };
            let array = Array2::from_shape_vec((1, len), data)
                .map_err(|e| degraded("failed to shape input", &e))?;
            let value = Value::from_array(array)
                .map_err(|e| degraded("failed to create input tensor", &e))?;
            inputs.push((name.clone(), value.into_dyn()));
        }

        let mut session = loaded
            .session
            .lock()
            .map_err(|_| OutlineError::EmbeddingDegraded("session lock poisoned".into()))?;
        let outputs = session
            .run(inputs)
            .map_err(|e| degraded("ONNX inference failed", &e))?;

        // Hidden states: [1, seq_len, hidden]
        let (shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| degraded("failed to extract output tensor", &e))?;
        let dims: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
        if dims.len() != 3 || dims[1] == 0 {
            return Err(OutlineError::EmbeddingDegraded(format!(
                "unexpected output shape {dims:?}"
            )));
        }
        let (seq_len, hidden) = (dims[1], dims[2]);

        let mut pooled = vec![0.0f32; hidden];
        for token in data.chunks_exact(hidden).take(seq_len) {
            for (acc, &x) in pooled.iter_mut().zip(token) {
                *acc += x;
            }
        }
        for x in pooled.iter_mut() {
            *x /= seq_len as f32;
        }
        l2_normalize(&mut pooled);
        Ok(pooled)
    }
}

impl Embedder for OnnxEmbedder {
    fn initialize(&mut self) -> Result<(), OutlineError> {
        if self.loaded.is_some() {
            return Ok(());
        }
        let loaded = self.load()?;
        let probe = self
            .run(&loaded, "probe")
            .map_err(|e| OutlineError::EmbedderInit(format!("probe inference failed: {e}")))?;
        self.dimension = probe.len();
        self.loaded = Some(loaded);
        tracing::info!(dimension = self.dimension, "ONNX embedder loaded");
        Ok(())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn try_embed(&self, text: &str) -> Result<Vec<f32>, OutlineError> {
        let loaded = self
            .loaded
            .as_ref()
            .ok_or_else(|| OutlineError::EmbeddingDegraded("embedder not initialized".into()))?;
        self.run(loaded, text)
    }

    fn shutdown(&mut self) {
        if self.loaded.take().is_some() {
            tracing::debug!("ONNX embedder released");
        }
    }
}
