//! Ward's agglomerative hierarchical clustering.
//!
//! Groups start as singletons (or as the groups of an existing
//! [`Partition`]) and the pair with the smallest Ward linkage
//!
//! `d(A, B) = |A| |B| / (|A| + |B|) * ||centroid(A) - centroid(B)||^2`
//!
//! is merged until the requested number of groups remains. In automatic
//! mode the merging stops at the first drop of the discrete second
//! derivative of the between-cluster inertia, undoing the last merge.

use crate::config::{ClusterCount, WardsConfig};
use crate::distance::squared_distance;
use crate::error::AnalysisError;
use crate::matrix::validate_matrix;
use crate::partition::{centroid, Clustering, Partition};
use ndarray::{Array1, ArrayView1, ArrayView2};

/// Ward linkage between two groups of rows of `data`.
///
/// Returns `None` if either group is empty.
///
/// # Example
///
/// ```
/// use unsupervised_rs::ward_linkage;
/// use ndarray::array;
///
/// let data = array![[0.0, 0.0], [3.0, 4.0]];
/// // two singletons: half the squared distance
/// assert_eq!(ward_linkage(&data.view(), &[0], &[1]), Some(12.5));
/// ```
pub fn ward_linkage(data: &ArrayView2<f64>, a: &[usize], b: &[usize]) -> Option<f64> {
    let centroid_a = centroid(data, a)?;
    let centroid_b = centroid(data, b)?;
    Some(linkage(
        a.len(),
        &centroid_a.view(),
        b.len(),
        &centroid_b.view(),
    ))
}

#[inline]
fn linkage(n_a: usize, centroid_a: &ArrayView1<f64>, n_b: usize, centroid_b: &ArrayView1<f64>) -> f64 {
    let (n_a, n_b) = (n_a as f64, n_b as f64);
    (n_a * n_b) / (n_a + n_b) * squared_distance(centroid_a, centroid_b)
}

/// Indices `(i, j)` with `i < j` of the closest pair of groups.
///
/// Scans row-major and keeps the first minimum found.
fn closest_pair(sizes: &[usize], centroids: &[Array1<f64>]) -> Option<(usize, usize)> {
    let mut best = None;
    let mut best_dist = f64::INFINITY;

    for i in 0..centroids.len() {
        for j in (i + 1)..centroids.len() {
            let dist = linkage(
                sizes[i],
                &centroids[i].view(),
                sizes[j],
                &centroids[j].view(),
            );
            if dist < best_dist || best.is_none() {
                best_dist = dist;
                best = Some((i, j));
            }
        }
    }

    best
}

/// Ward's hierarchical clustering model
pub struct Wards {
    config: WardsConfig,
    partition: Option<Partition>,
    n_merges: usize,
}

impl Wards {
    /// Create a model stopping at `nb_clusters` groups.
    ///
    /// # Arguments
    ///
    /// * `nb_clusters` - Groups to keep, or `ClusterCount::Auto` to stop at
    ///   the first inflection of the between-cluster inertia
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidParameter`] for `ClusterCount::Fixed(0)`.
    pub fn new(nb_clusters: ClusterCount) -> Result<Self, AnalysisError> {
        Self::with_config(WardsConfig::new(nb_clusters))
    }

    pub fn with_config(config: WardsConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self {
            config,
            partition: None,
            n_merges: 0,
        })
    }

    /// Agglomerate the rows of `data`, starting from one group per row.
    pub fn fit(&mut self, data: &ArrayView2<f64>) -> Result<&mut Self, AnalysisError> {
        validate_matrix(data, false)?;
        self.agglomerate(Partition::singletons(data.to_owned()))
    }

    /// Agglomerate starting from the groups of an existing partition.
    ///
    /// Empty groups are dropped first.
    pub fn fit_partition(&mut self, partition: Partition) -> Result<&mut Self, AnalysisError> {
        validate_matrix(&partition.data().view(), false)?;
        self.agglomerate(partition)
    }

    /// Agglomerate the clusters found by another fitted model, e.g. k-means.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::NotFitted`] if `other` has not been fitted.
    pub fn fit_clustering<C: Clustering + ?Sized>(
        &mut self,
        other: &C,
    ) -> Result<&mut Self, AnalysisError> {
        let partition = other.partition().ok_or(AnalysisError::NotFitted)?.clone();
        self.fit_partition(partition)
    }

    fn agglomerate(&mut self, mut partition: Partition) -> Result<&mut Self, AnalysisError> {
        partition.groups_mut().retain(|g| !g.is_empty());

        let target = match self.config.nb_clusters {
            ClusterCount::Fixed(n) => n,
            ClusterCount::Auto => 1,
        };
        let auto = self.config.nb_clusters == ClusterCount::Auto;

        let mut centroids: Vec<Array1<f64>> = partition.centroids().into_iter().flatten().collect();
        let mut inertias = [f64::INFINITY, f64::INFINITY, partition.between_inertia()];
        let mut second_derivative = 0.0;
        let mut n_merges = 0;

        if self.config.verbose {
            log::info!(
                "Ward's clustering: {} rows, {} starting groups, target {:?}",
                partition.data().nrows(),
                partition.len(),
                self.config.nb_clusters
            );
        }

        while partition.len() > target {
            let sizes = partition.sizes();
            let Some((i, j)) = closest_pair(&sizes, &centroids) else {
                break;
            };

            let snapshot = auto.then(|| partition.groups().to_vec());

            let moved = partition.groups_mut().remove(j);
            partition.groups_mut()[i].extend(moved);
            centroids.remove(j);
            if let Some(merged) = centroid(&partition.data().view(), &partition.groups()[i]) {
                centroids[i] = merged;
            }
            n_merges += 1;

            log::debug!("  merge {}: groups {} and {} -> {} groups", n_merges, i, j, partition.len());

            if let Some(groups) = snapshot {
                inertias = [inertias[1], inertias[2], partition.between_inertia()];
                let previous = second_derivative;
                second_derivative = inertias[0] + inertias[2] - 2.0 * inertias[1];

                if second_derivative < previous && previous.is_finite() {
                    *partition.groups_mut() = groups;
                    n_merges -= 1;
                    if self.config.verbose {
                        log::info!(
                            "  inertia inflection found, stopping at {} groups",
                            partition.len()
                        );
                    }
                    break;
                }
            }
        }

        if self.config.verbose {
            log::info!("  {} merges, {} groups", n_merges, partition.len());
        }

        self.partition = Some(partition);
        self.n_merges = n_merges;
        Ok(self)
    }

    /// Merges performed by the last fit (a rolled-back merge is not counted)
    pub fn n_merges(&self) -> usize {
        self.n_merges
    }

    /// Cluster index of every fitted row
    pub fn labels(&self) -> Option<Vec<usize>> {
        self.partition.as_ref().map(Partition::labels)
    }

    pub fn config(&self) -> &WardsConfig {
        &self.config
    }
}

impl Clustering for Wards {
    fn partition(&self) -> Option<&Partition> {
        self.partition.as_ref()
    }
}
