use crate::embedding::Embedder;
use crate::model::Span;

/// Number of visual scalars appended after the embedding.
pub const VISUAL_FEATURES: usize = 4;

/// Font size that maps to 1.0.
pub const SIZE_SCALE: f32 = 20.0;
/// Horizontal position that maps to 1.0 (roughly a page width in points).
pub const X_SCALE: f32 = 600.0;

/// Combine a span's embedding with its visual attributes.
///
/// Layout: `[unit embedding..., size/20, x/600, bold, 1/page]`, so the
/// result has `embedding.len() + 4` components. A zero embedding is kept
/// as-is rather than normalized.
pub fn build_feature(span: &Span, embedding: &[f32]) -> Vec<f32> {
    let norm = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mut feature = Vec::with_capacity(embedding.len() + VISUAL_FEATURES);
    if norm > 0.0 {
        feature.extend(embedding.iter().map(|x| x / norm));
    } else {
        feature.extend_from_slice(embedding);
    }
    feature.push(span.size / SIZE_SCALE);
    feature.push(span.x / X_SCALE);
    feature.push(if span.bold { 1.0 } else { 0.0 });
    feature.push(1.0 / span.page.max(1) as f32);
    feature
}

/// Embed every span and build its feature vector.
pub fn build_features(spans: &[Span], embedder: &dyn Embedder) -> Vec<Vec<f32>> {
    spans
        .iter()
        .map(|span| build_feature(span, &embedder.embed(&span.text)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(size: f32, x: f32, bold: bool, page: u32) -> Span {
        Span {
            text: "Heading".into(),
            size,
            font: "Times".into(),
            bold,
            page,
            x,
            y: 0.0,
        }
    }

    #[test]
    fn test_visual_scalars() {
        let f = build_feature(&span(24.0, 150.0, true, 2), &[3.0, 4.0]);
        assert_eq!(f.len(), 2 + VISUAL_FEATURES);
        assert!((f[0] - 0.6).abs() < 1e-6);
        assert!((f[1] - 0.8).abs() < 1e-6);
        assert!((f[2] - 1.2).abs() < 1e-6);
        assert!((f[3] - 0.25).abs() < 1e-6);
        assert_eq!(f[4], 1.0);
        assert!((f[5] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_zero_embedding_kept() {
        let f = build_feature(&span(12.0, 0.0, false, 1), &[0.0; 3]);
        assert_eq!(&f[..3], &[0.0, 0.0, 0.0]);
        assert_eq!(f[3], 0.6);
        assert_eq!(f[5], 0.0);
        assert_eq!(f[6], 1.0);
        assert!(f.iter().all(|x| x.is_finite()));
    }
}
