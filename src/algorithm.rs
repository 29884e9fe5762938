use crate::config::{InitMethod, KMeansConfig};
use crate::distance::{compute_centroid_shift, distance_to_nearest, find_nearest_centroids};
use crate::error::AnalysisError;
use crate::partition::centroid;
use ndarray::{Array2, ArrayView2};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use std::time::Instant;

/// Result of the k-means algorithm
pub struct KMeansResult {
    pub centroids: Array2<f64>,
    pub labels: Vec<usize>,
    pub n_iterations: usize,
}

/// Run Lloyd's algorithm from the configured initialization.
///
/// Iterates until the assignment vector is identical to the previous one.
/// A cluster that captures no row keeps its previous centroid.
pub fn kmeans_lloyd<R: Rng + ?Sized>(
    data: &ArrayView2<f64>,
    config: &KMeansConfig,
    rng: &mut R,
) -> Result<KMeansResult, AnalysisError> {
    let n_samples = data.nrows();
    let k = config.k;

    if n_samples < k {
        return Err(AnalysisError::InsufficientData(format!(
            "Number of samples ({}) is less than the number of clusters ({})",
            n_samples, k
        )));
    }

    if config.verbose {
        log::info!(
            "Training k-means: {} samples, {} features, {} clusters, {:?} initialization",
            n_samples,
            data.ncols(),
            k,
            config.init
        );
    }

    let seeds = match config.init {
        InitMethod::Standard => initialize_standard(n_samples, k, rng),
        InitMethod::Plus => initialize_plus(data, k, rng),
    };
    let mut centroids = data.select(ndarray::Axis(0), &seeds);
    let mut labels = find_nearest_centroids(data, &centroids.view());

    for iteration in 0..config.max_iters {
        let iter_start = Instant::now();
        let prev_centroids = centroids.clone();

        let mut groups = vec![Vec::new(); k];
        for (row, &label) in labels.iter().enumerate() {
            groups[label].push(row);
        }

        let mut empty_clusters = 0;
        for (cluster_idx, rows) in groups.iter().enumerate() {
            match centroid(data, rows) {
                Some(c) => centroids.row_mut(cluster_idx).assign(&c),
                None => empty_clusters += 1,
            }
        }
        if empty_clusters > 0 {
            log::warn!("  {} empty clusters keep their previous centroid", empty_clusters);
        }

        let new_labels = find_nearest_centroids(data, &centroids.view());

        log::debug!(
            "  Iteration {}/{}: shift = {:.6}, time = {:.4}s",
            iteration + 1,
            config.max_iters,
            compute_centroid_shift(&prev_centroids.view(), &centroids.view()),
            iter_start.elapsed().as_secs_f64()
        );

        if new_labels == labels {
            if config.verbose {
                log::info!("  Converged after {} iterations", iteration + 1);
            }
            return Ok(KMeansResult {
                centroids,
                labels,
                n_iterations: iteration + 1,
            });
        }
        labels = new_labels;
    }

    Err(AnalysisError::ConvergenceFailure {
        iterations: config.max_iters,
    })
}

/// Pick `k` distinct rows uniformly at random, removing each from the pool.
fn initialize_standard<R: Rng + ?Sized>(n_samples: usize, k: usize, rng: &mut R) -> Vec<usize> {
    let mut pool: Vec<usize> = (0..n_samples).collect();
    (0..k)
        .map(|_| pool.remove(rng.gen_range(0..pool.len())))
        .collect()
}

/// k-means++ seeding.
///
/// The first row is uniform; each following row is drawn with probability
/// proportional to its distance to the nearest row already chosen. When
/// every remaining row coincides with a chosen one the draw is uniform.
fn initialize_plus<R: Rng + ?Sized>(data: &ArrayView2<f64>, k: usize, rng: &mut R) -> Vec<usize> {
    let mut pool: Vec<usize> = (0..data.nrows()).collect();
    let mut chosen = Vec::with_capacity(k);
    chosen.push(pool.remove(rng.gen_range(0..pool.len())));

    while chosen.len() < k {
        let weights: Vec<f64> = pool
            .iter()
            .map(|&r| distance_to_nearest(&data.row(r), data, &chosen))
            .collect();

        chosen.push(pool.remove(weighted_pick(&weights, rng)));
    }

    chosen
}

/// Draw an index with probability proportional to `weights`.
///
/// Distances that overflow to infinity dominate every finite weight, so the
/// draw is uniform among them. All-zero weights also fall back to uniform.
fn weighted_pick<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> usize {
    let infinite: Vec<usize> = (0..weights.len())
        .filter(|&i| weights[i].is_infinite())
        .collect();
    if !infinite.is_empty() {
        return infinite[rng.gen_range(0..infinite.len())];
    }

    // finite weights can still sum past f64::MAX
    let max = weights.iter().copied().fold(0.0, f64::max);
    let scaled: Vec<f64> = if max > 0.0 {
        weights.iter().map(|w| w / max).collect()
    } else {
        weights.to_vec()
    };

    match WeightedIndex::new(&scaled) {
        Ok(dist) => dist.sample(rng),
        Err(_) => rng.gen_range(0..weights.len()),
    }
}

/// Predict cluster assignments for new data using trained centroids
pub fn predict_labels(data: &ArrayView2<f64>, centroids: &ArrayView2<f64>) -> Vec<usize> {
    find_nearest_centroids(data, centroids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_initialize_standard_distinct() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        for _ in 0..20 {
            let mut seeds = initialize_standard(10, 10, &mut rng);
            seeds.sort_unstable();
            assert_eq!(seeds, (0..10).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_initialize_plus_distinct() {
        let data = Array2::random((30, 3), Uniform::new(-1.0, 1.0));
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let mut seeds = initialize_plus(&data.view(), 30, &mut rng);
        seeds.sort_unstable();
        seeds.dedup();
        assert_eq!(seeds.len(), 30);
    }

    #[test]
    fn test_initialize_plus_prefers_far_points() {
        // Three identical points and one far away: once a duplicate is picked
        // the far point carries all the weight.
        let data = array![[0.0, 0.0], [0.0, 0.0], [0.0, 0.0], [100.0, 100.0]];

        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let seeds = initialize_plus(&data.view(), 2, &mut rng);
            assert!(seeds.contains(&3), "seed {} picked {:?}", seed, seeds);
        }
    }

    #[test]
    fn test_initialize_plus_all_duplicates() {
        let data = array![[1.0, 1.0], [1.0, 1.0], [1.0, 1.0]];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let seeds = initialize_plus(&data.view(), 3, &mut rng);
        assert_eq!(seeds.len(), 3);
    }

    #[test]
    fn test_initialize_plus_overflowing_distances() {
        let data = array![[0.0, 0.0], [1e200, 1e200], [-1e200, 5.0]];

        for seed in 0..10 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut seeds = initialize_plus(&data.view(), 3, &mut rng);
            seeds.sort_unstable();
            assert_eq!(seeds, vec![0, 1, 2]);
        }
    }

    #[test]
    fn test_weighted_pick_prefers_infinite() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..50 {
            let pick = weighted_pick(&[1.0, f64::INFINITY, 1e300, f64::INFINITY], &mut rng);
            assert!(pick == 1 || pick == 3);
        }
        // large finite weights whose sum overflows
        let pick = weighted_pick(&[0.0, f64::MAX, 0.0, f64::MAX], &mut rng);
        assert!(pick == 1 || pick == 3);
    }

    #[test]
    fn test_kmeans_empty_cluster_keeps_centroid() {
        // two identical seeds: every row ties and goes to cluster 0
        let data = array![[1.0, 1.0], [1.0, 1.0], [1.0, 1.0]];
        for init in [InitMethod::Standard, InitMethod::Plus] {
            let config = KMeansConfig::new(2).with_init(init);
            let mut rng = ChaCha8Rng::seed_from_u64(0);

            let result = kmeans_lloyd(&data.view(), &config, &mut rng).unwrap();
            assert_eq!(result.labels, vec![0, 0, 0]);
            assert_eq!(result.centroids, array![[1.0, 1.0], [1.0, 1.0]]);
        }
    }

    #[test]
    fn test_kmeans_basic() {
        let data = Array2::random((200, 4), Uniform::new(-1.0, 1.0));
        let config = KMeansConfig::new(5).with_max_iters(1_000);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let result = kmeans_lloyd(&data.view(), &config, &mut rng).unwrap();

        assert_eq!(result.centroids.dim(), (5, 4));
        assert_eq!(result.labels.len(), 200);
        assert!(result.labels.iter().all(|&l| l < 5));
        assert!(result.n_iterations >= 1);
    }

    #[test]
    fn test_kmeans_fixed_point() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let data = Array2::random_using((100, 2), Uniform::new(0.0, 10.0), &mut rng);
        let config = KMeansConfig::new(4)
            .with_init(InitMethod::Plus)
            .with_max_iters(1_000);

        let result = kmeans_lloyd(&data.view(), &config, &mut rng).unwrap();

        // one more Lloyd step leaves the assignment unchanged
        let relabelled = predict_labels(&data.view(), &result.centroids.view());
        assert_eq!(relabelled, result.labels);
    }

    #[test]
    fn test_kmeans_iteration_cap() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let data = Array2::random_using((500, 2), Uniform::new(0.0, 1.0), &mut rng);
        let config = KMeansConfig::new(20).with_max_iters(1);

        let mut failed = false;
        for seed in 0..5 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            if let Err(AnalysisError::ConvergenceFailure { iterations }) =
                kmeans_lloyd(&data.view(), &config, &mut rng)
            {
                assert_eq!(iterations, 1);
                failed = true;
            }
        }
        assert!(failed, "a single iteration should not settle 20 clusters");
    }

    #[test]
    fn test_kmeans_insufficient_data() {
        let data = array![[0.0], [1.0]];
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let result = kmeans_lloyd(&data.view(), &KMeansConfig::new(3), &mut rng);
        assert!(matches!(result, Err(AnalysisError::InsufficientData(_))));
    }
}
