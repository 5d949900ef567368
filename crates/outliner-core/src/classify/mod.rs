pub mod features;
pub mod kmeans;
pub mod size_rank;

use crate::config::{ClusteringConfig, OutlineConfig, Strategy};
use crate::embedding::Embedder;
use crate::model::{Heading, Level, Span};
use kmeans::KMeansParams;
use std::collections::HashSet;

/// Assign a heading level to spans using the configured strategy.
pub fn assign_levels(spans: &[Span], embedder: &dyn Embedder, config: &OutlineConfig) -> Vec<Heading> {
    match config.strategy {
        Strategy::Cluster => assign_heading_levels(spans, embedder, &config.clustering),
        Strategy::SizeRank => size_rank::assign_by_size_rank(spans),
    }
}

/// Cluster spans on embedding + visual features and label clusters by mean
/// font size: the largest-mean cluster is H1, the next H2, and so on.
pub fn assign_heading_levels(
    spans: &[Span],
    embedder: &dyn Embedder,
    config: &ClusteringConfig,
) -> Vec<Heading> {
    if spans.is_empty() {
        return Vec::new();
    }
    let features = features::build_features(spans, embedder);
    cluster_features(spans, &features, config)
}

/// Number of level clusters: distinct font sizes, clamped to the configured
/// bounds.
pub fn level_count(spans: &[Span], config: &ClusteringConfig) -> usize {
    let distinct: HashSet<i64> = spans.iter().map(Span::size_key).collect();
    distinct.len().clamp(config.min_levels, config.max_levels)
}

/// Cluster precomputed feature vectors (one per span) and label each span.
pub fn cluster_features(spans: &[Span], features: &[Vec<f32>], config: &ClusteringConfig) -> Vec<Heading> {
    debug_assert_eq!(spans.len(), features.len());
    let k = level_count(spans, config);
    let params = KMeansParams {
        k,
        restarts: config.restarts,
        max_iterations: config.max_iterations,
        tolerance: config.tolerance,
        seed: config.seed,
    };
    let Some(fit) = kmeans::fit(features, &params) else {
        return Vec::new();
    };

    let levels = rank_clusters(spans, &fit.labels, fit.centroids.len());
    tracing::debug!(
        k,
        inertia = fit.inertia,
        iterations = fit.iterations,
        sizes = ?fit.cluster_sizes(),
        "clustered spans"
    );

    spans
        .iter()
        .zip(fit.labels.iter())
        .filter_map(|(span, &label)| {
            levels[label].map(|level| Heading {
                span: span.clone(),
                level,
            })
        })
        .collect()
}

/// Level per cluster id, ranked by mean member font size (ties keep the
/// lower cluster id first). Empty clusters get no level.
fn rank_clusters(spans: &[Span], labels: &[usize], k: usize) -> Vec<Option<Level>> {
    let mut sums = vec![0.0f64; k];
    let mut counts = vec![0usize; k];
    for (span, &label) in spans.iter().zip(labels.iter()) {
        sums[label] += f64::from(span.size);
        counts[label] += 1;
    }

    let mut averages: Vec<(usize, f64)> = (0..k)
        .filter(|&c| counts[c] > 0)
        .map(|c| (c, sums[c] / counts[c] as f64))
        .collect();
    averages.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut levels = vec![None; k];
    for (rank, (cluster, _)) in averages.into_iter().enumerate() {
        levels[cluster] = Some(Level::from_index(rank));
    }
    levels
}
