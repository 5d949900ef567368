use crate::embedding::{l2_normalize, Embedder};
use crate::error::OutlineError;
use xxhash_rust::xxh3::xxh3_64_with_seed;

const WORD_SEED: u64 = 0x5eed_0001;
const TRIGRAM_SEED: u64 = 0x5eed_0003;
const TRIGRAM_WEIGHT: f32 = 0.5;

/// Model-free embedder: signed feature hashing of lowercase words and
/// character trigrams into a fixed number of buckets.
///
/// Texts that share vocabulary land close together, and the output depends
/// only on the text, so results are reproducible on every platform.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn add_feature(&self, v: &mut [f32], feature: &str, seed: u64, weight: f32) {
        let h = xxh3_64_with_seed(feature.as_bytes(), seed);
        let bucket = (h % self.dimension as u64) as usize;
        let sign = if (h >> 63) == 0 { 1.0 } else { -1.0 };
        v[bucket] += sign * weight;
    }
}

impl Embedder for HashingEmbedder {
    fn initialize(&mut self) -> Result<(), OutlineError> {
        Ok(())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn try_embed(&self, text: &str) -> Result<Vec<f32>, OutlineError> {
        let mut v = vec![0.0; self.dimension];
        let lower = text.to_lowercase();

        for word in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            self.add_feature(&mut v, word, WORD_SEED, 1.0);

            let padded: Vec<char> = std::iter::once('#')
                .chain(word.chars())
                .chain(std::iter::once('#'))
                .collect();
            for window in padded.windows(3) {
                let trigram: String = window.iter().collect();
                self.add_feature(&mut v, &trigram, TRIGRAM_SEED, TRIGRAM_WEIGHT);
            }
        }

        l2_normalize(&mut v);
        Ok(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn test_deterministic_and_normalized() {
        let e = HashingEmbedder::new(64);
        let a = e.embed("Annual Report 2024");
        let b = e.embed("Annual Report 2024");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_case_insensitive() {
        let e = HashingEmbedder::new(64);
        assert_eq!(e.embed("INTRODUCTION"), e.embed("introduction"));
    }

    #[test]
    fn test_shared_vocabulary_is_closer() {
        let e = HashingEmbedder::new(256);
        let a = e.embed("Financial results overview");
        let b = e.embed("Financial results for 2023");
        let c = e.embed("Zebra migration patterns");
        assert!(cosine(&a, &b) > cosine(&a, &c));
    }

    #[test]
    fn test_punctuation_only_is_zero_vector() {
        let e = HashingEmbedder::new(16);
        assert_eq!(e.embed("---"), vec![0.0; 16]);
    }
}
