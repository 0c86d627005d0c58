//! Seeded k-means++ over 3-channel colors.
//!
//! Used twice: per player crop to split shirt from background, and once per
//! video to split shirt colors into two teams. The RNG is seeded so that the
//! same input always yields the same centroids and labels.

use nalgebra::Vector3;
use rand::{distributions::WeightedIndex, prelude::*};
use rand_chacha::ChaCha8Rng;

/// A color in BGR channel order, components in 0..=255.
pub type Color = Vector3<f64>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KMeansParams {
    pub k: usize,
    /// Independent restarts; the lowest-inertia run wins.
    pub n_init: usize,
    pub max_iter: usize,
    pub seed: u64,
    /// Stop once no centroid moves further than this.
    pub tol: f64,
}

impl Default for KMeansParams {
    fn default() -> Self {
        Self { k: 2, n_init: 10, max_iter: 300, seed: 42, tol: 1e-4 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    pub centroids: Vec<Color>,
    pub labels: Vec<usize>,
    pub inertia: f64,
}

/// Index of the closest centroid; ties go to the lower index.
pub fn nearest(centroids: &[Color], point: &Color) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let d = (point - c).norm_squared();
        if d < best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

/// Cluster `points` into `params.k` groups. Returns `None` when there are fewer points than clusters.
pub fn fit(points: &[Color], params: &KMeansParams) -> Option<Clustering> {
    if params.k == 0 || points.len() < params.k {
        return None;
    }

    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
    let mut best: Option<Clustering> = None;
    for _ in 0..params.n_init.max(1) {
        let init = init_plus_plus(points, params.k, &mut rng);
        let run = lloyd(points, init, params.max_iter, params.tol);
        if best.as_ref().map_or(true, |b| run.inertia < b.inertia) {
            best = Some(run);
        }
    }
    best
}

fn init_plus_plus(points: &[Color], k: usize, rng: &mut ChaCha8Rng) -> Vec<Color> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..points.len())]);

    while centroids.len() < k {
        let weights: Vec<f64> = points
            .iter()
            .map(|p| {
                centroids
                    .iter()
                    .map(|c| (p - c).norm_squared())
                    .fold(f64::INFINITY, f64::min)
            })
            .collect();
        // All points already coincide with a centroid when every weight is zero.
        let idx = match WeightedIndex::new(&weights) {
            Ok(dist) => dist.sample(rng),
            Err(_) => rng.gen_range(0..points.len()),
        };
        centroids.push(points[idx]);
    }
    centroids
}

fn lloyd(points: &[Color], mut centroids: Vec<Color>, max_iter: usize, tol: f64) -> Clustering {
    let k = centroids.len();
    let mut labels = vec![0usize; points.len()];

    for _ in 0..max_iter.max(1) {
        for (label, p) in labels.iter_mut().zip(points) {
            *label = nearest(&centroids, p);
        }

        let mut sums = vec![Color::zeros(); k];
        let mut counts = vec![0usize; k];
        for (&label, p) in labels.iter().zip(points) {
            sums[label] += p;
            counts[label] += 1;
        }

        let mut shift = 0.0f64;
        for i in 0..k {
            // An emptied cluster keeps its previous centroid.
            if counts[i] == 0 {
                continue;
            }
            let updated = sums[i] / counts[i] as f64;
            shift = shift.max((updated - centroids[i]).norm());
            centroids[i] = updated;
        }
        if shift <= tol {
            break;
        }
    }

    for (label, p) in labels.iter_mut().zip(points) {
        *label = nearest(&centroids, p);
    }
    let inertia = labels
        .iter()
        .zip(points)
        .map(|(&l, p)| (p - centroids[l]).norm_squared())
        .sum();

    Clustering { centroids, labels, inertia }
}
