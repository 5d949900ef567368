//! Seeded k-means with k-means++ initialization and multiple restarts.
//!
//! All randomness comes from one `StdRng` seeded by the caller, so the same
//! data and seed always produce the same partition.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, PartialEq)]
pub struct KMeansParams {
    pub k: usize,
    pub restarts: usize,
    pub max_iterations: usize,
    /// Convergence tolerance, relative to the mean per-dimension variance.
    pub tolerance: f32,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    /// Cluster id per input point.
    pub labels: Vec<usize>,
    pub centroids: Vec<Vec<f32>>,
    /// Sum of squared distances from each point to its centroid.
    pub inertia: f32,
    /// Lloyd iterations used by the winning restart.
    pub iterations: usize,
}

impl KMeansFit {
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.centroids.len()];
        for &label in &self.labels {
            sizes[label] += 1;
        }
        sizes
    }
}

/// Squared Euclidean distance between two vectors
fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let diff = x - y;
            diff * diff
        })
        .sum()
}

/// Partition `data` into `params.k` clusters, keeping the lowest-inertia
/// restart. Returns `None` for empty data or `k == 0`.
///
/// `k` is capped at the number of points.
pub fn fit(data: &[Vec<f32>], params: &KMeansParams) -> Option<KMeansFit> {
    if data.is_empty() || params.k == 0 {
        return None;
    }
    let k = params.k.min(data.len());
    let tol = params.tolerance * mean_variance(data);
    let mut rng = StdRng::seed_from_u64(params.seed);

    let mut best: Option<KMeansFit> = None;
    for _ in 0..params.restarts.max(1) {
        let candidate = lloyd(data, k, params.max_iterations.max(1), tol, &mut rng);
        let better = best
            .as_ref()
            .map_or(true, |b| candidate.inertia < b.inertia);
        if better {
            best = Some(candidate);
        }
    }
    best
}

fn lloyd(data: &[Vec<f32>], k: usize, max_iterations: usize, tol: f32, rng: &mut StdRng) -> KMeansFit {
    let mut centroids = initialize_centroids(data, k, rng);
    let mut iterations = 0;

    for _ in 0..max_iterations {
        iterations += 1;
        let labels = assign(data, &centroids);
        let updated = update_centroids(data, &labels, &centroids);
        let shift: f32 = centroids
            .iter()
            .zip(updated.iter())
            .map(|(a, b)| squared_distance(a, b))
            .sum();
        centroids = updated;
        if shift <= tol {
            break;
        }
    }

    let labels = assign(data, &centroids);
    let inertia = data
        .iter()
        .zip(labels.iter())
        .map(|(point, &c)| squared_distance(point, &centroids[c]))
        .sum();

    KMeansFit {
        labels,
        centroids,
        inertia,
        iterations,
    }
}

/// Nearest centroid per point; ties go to the lower cluster id.
fn assign(data: &[Vec<f32>], centroids: &[Vec<f32>]) -> Vec<usize> {
    data.iter()
        .map(|point| nearest(point, centroids).0)
        .collect()
}

fn nearest(point: &[f32], centroids: &[Vec<f32>]) -> (usize, f32) {
    centroids
        .iter()
        .enumerate()
        .map(|(i, c)| (i, squared_distance(point, c)))
        .fold((0, f32::INFINITY), |best, cur| if cur.1 < best.1 { cur } else { best })
}

/// Recompute means. A cluster left empty is moved onto the point farthest
/// from its current centroid, each such point used at most once.
fn update_centroids(data: &[Vec<f32>], labels: &[usize], previous: &[Vec<f32>]) -> Vec<Vec<f32>> {
    let k = previous.len();
    let dim = data[0].len();
    let mut sums = vec![vec![0.0f32; dim]; k];
    let mut counts = vec![0usize; k];

    for (point, &cluster) in data.iter().zip(labels.iter()) {
        for (acc, &val) in sums[cluster].iter_mut().zip(point.iter()) {
            *acc += val;
        }
        counts[cluster] += 1;
    }

    let mut donors: Vec<(usize, f32)> = data
        .iter()
        .zip(labels.iter())
        .enumerate()
        .map(|(i, (point, &c))| (i, squared_distance(point, &previous[c])))
        .collect();
    // Farthest first; stable sort keeps index order among equals.
    donors.sort_by(|a, b| b.1.total_cmp(&a.1));
    let mut donors = donors.into_iter();

    for (cluster, (sum, &count)) in sums.iter_mut().zip(counts.iter()).enumerate() {
        if count > 0 {
            for val in sum.iter_mut() {
                *val /= count as f32;
            }
        } else if let Some((idx, _)) = donors.next() {
            sum.clone_from(&data[idx]);
        } else {
            sum.clone_from(&previous[cluster]);
        }
    }

    sums
}

/// Initialize centroids using k-means++ style selection
fn initialize_centroids(data: &[Vec<f32>], k: usize, rng: &mut StdRng) -> Vec<Vec<f32>> {
    let mut centroids = Vec::with_capacity(k);

    let first_idx = rng.random_range(0..data.len());
    centroids.push(data[first_idx].clone());

    // Remaining centroids with probability proportional to distance²
    while centroids.len() < k {
        let distances: Vec<f32> = data
            .iter()
            .map(|point| nearest(point, &centroids).1)
            .collect();

        let total: f32 = distances.iter().sum();
        if total <= 0.0 {
            // Every point already sits on a centroid
            let idx = rng.random_range(0..data.len());
            centroids.push(data[idx].clone());
            continue;
        }

        let threshold = rng.random::<f32>() * total;
        let mut cumsum = 0.0;
        let mut chosen = None;
        for (i, &dist) in distances.iter().enumerate() {
            cumsum += dist;
            if dist > 0.0 && cumsum >= threshold {
                chosen = Some(i);
                break;
            }
        }
        // Rounding can leave the threshold just past the final sum
        let idx = chosen
            .or_else(|| distances.iter().rposition(|&d| d > 0.0))
            .unwrap_or(0);
        centroids.push(data[idx].clone());
    }

    centroids
}

fn mean_variance(data: &[Vec<f32>]) -> f32 {
    let n = data.len() as f32;
    let dim = data[0].len();
    if dim == 0 {
        return 0.0;
    }
    let mut total = 0.0f32;
    for j in 0..dim {
        let mean = data.iter().map(|p| p[j]).sum::<f32>() / n;
        total += data.iter().map(|p| (p[j] - mean).powi(2)).sum::<f32>() / n;
    }
    total / dim as f32
}
