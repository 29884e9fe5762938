use crate::algorithm::{kmeans_lloyd, predict_labels};
use crate::config::{InitMethod, KMeansConfig};
use crate::error::AnalysisError;
use crate::matrix::validate_matrix;
use crate::partition::{Clustering, Partition};
use ndarray::{Array2, ArrayView2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// K-means clustering with Lloyd's algorithm.
///
/// # Example
///
/// ```
/// use unsupervised_rs::{Clustering, InitMethod, KMeans};
/// use ndarray::array;
///
/// let data = array![[0.0, 0.0], [0.0, 1.0], [10.0, 10.0], [10.0, 11.0]];
///
/// let mut kmeans = KMeans::new(2, InitMethod::Standard).unwrap();
/// kmeans.fit(&data.view()).unwrap();
///
/// let labels = kmeans.labels().unwrap();
/// assert_eq!(labels[0], labels[1]);
/// assert_ne!(labels[0], labels[2]);
///
/// let inertia = kmeans.inertia_analysis(false).unwrap();
/// assert!(inertia.between > inertia.within);
/// ```
pub struct KMeans {
    /// Model configuration
    config: KMeansConfig,

    /// Fitted centroids (None if not yet fitted)
    centroids: Option<Array2<f64>>,

    /// Rows grouped by cluster (None if not yet fitted)
    partition: Option<Partition>,

    /// Lloyd iterations of the last fit
    n_iterations: usize,
}

impl KMeans {
    /// Create a new KMeans instance.
    ///
    /// # Arguments
    ///
    /// * `k` - Number of clusters
    /// * `init` - How the initial centroids are drawn
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidParameter`] if `k` is 0.
    pub fn new(k: usize, init: InitMethod) -> Result<Self, AnalysisError> {
        Self::with_config(KMeansConfig::new(k).with_init(init))
    }

    /// Create a new KMeans instance with custom configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Custom configuration for the k-means algorithm
    pub fn with_config(config: KMeansConfig) -> Result<Self, AnalysisError> {
        config.validate()?;

        Ok(Self {
            config,
            centroids: None,
            partition: None,
            n_iterations: 0,
        })
    }

    /// Fit the model, drawing initial centroids from a generator seeded with
    /// `config.seed`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The data is empty or holds non-finite values
    /// - Number of samples is less than k
    /// - Lloyd's loop does not settle within `max_iters` iterations
    pub fn fit(&mut self, data: &ArrayView2<f64>) -> Result<&mut Self, AnalysisError> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.fit_with_rng(data, &mut rng)
    }

    /// Fit the model with a caller-supplied random generator.
    ///
    /// On error the previous fit, if any, is left untouched.
    pub fn fit_with_rng<R: Rng + ?Sized>(
        &mut self,
        data: &ArrayView2<f64>,
        rng: &mut R,
    ) -> Result<&mut Self, AnalysisError> {
        validate_matrix(data, false)?;

        let result = kmeans_lloyd(data, &self.config, rng)?;

        self.partition = Some(Partition::from_labels(
            data.to_owned(),
            &result.labels,
            self.config.k,
        ));
        self.centroids = Some(result.centroids);
        self.n_iterations = result.n_iterations;
        Ok(self)
    }

    /// Assign new rows to the nearest fitted centroid.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The model has not been fitted yet
    /// - Data dimensions don't match the training data
    pub fn predict(&self, data: &ArrayView2<f64>) -> Result<Vec<usize>, AnalysisError> {
        let centroids = self.centroids.as_ref().ok_or(AnalysisError::NotFitted)?;

        if data.ncols() != centroids.ncols() {
            return Err(AnalysisError::DimensionMismatch(format!(
                "Expected {} features, got {}",
                centroids.ncols(),
                data.ncols()
            )));
        }
        validate_matrix(data, false)?;

        Ok(predict_labels(data, &centroids.view()))
    }

    /// Get the centroids of the fitted model.
    pub fn centroids(&self) -> Option<&Array2<f64>> {
        self.centroids.as_ref()
    }

    /// Cluster index of every fitted row
    pub fn labels(&self) -> Option<Vec<usize>> {
        self.partition.as_ref().map(Partition::labels)
    }

    /// Lloyd iterations run by the last fit
    pub fn n_iterations(&self) -> usize {
        self.n_iterations
    }

    /// Get the number of clusters.
    pub fn k(&self) -> usize {
        self.config.k
    }

    /// Get the configuration.
    pub fn config(&self) -> &KMeansConfig {
        &self.config
    }
}

impl Clustering for KMeans {
    fn partition(&self) -> Option<&Partition> {
        self.partition.as_ref()
    }
}
