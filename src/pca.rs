use crate::config::PcaConfig;
use crate::error::AnalysisError;
use crate::matrix::validate_matrix;
use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2};
use std::cmp::Ordering;

/// Quantities derived from one fitted matrix
#[derive(Debug, Clone)]
struct PcaModel {
    /// All eigenvalues of `X^T X`, descending
    eigenvalues: Array1<f64>,
    /// Eigenvalue share of every eigenvalue, descending
    variance_ratio: Array1<f64>,
    /// Retained eigenvectors as columns, shape (n_features, nb_components)
    components: Array2<f64>,
    /// Input projected onto the components, shape (n_samples, nb_components)
    transformed: Array2<f64>,
}

/// Principal component analysis by eigendecomposition of `X^T X`.
///
/// The data is used as given: center or [`crate::standardize`] it first for
/// classical PCA.
///
/// # Example
///
/// ```
/// use unsupervised_rs::Pca;
/// use ndarray::array;
///
/// let data = array![[1.0, 2.0], [2.0, 4.1], [3.0, 5.9]];
/// let mut pca = Pca::new(2).unwrap();
/// pca.fit(&data.view()).unwrap();
///
/// let restored = pca.reconstruct().unwrap();
/// assert!((&restored - &data).iter().all(|d| d.abs() < 1e-9));
/// ```
pub struct Pca {
    config: PcaConfig,
    model: Option<PcaModel>,
}

impl Pca {
    /// Create a PCA keeping `nb_components` components.
    ///
    /// # Arguments
    ///
    /// * `nb_components` - Number of principal components to retain
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidParameter`] if `nb_components` is 0.
    pub fn new(nb_components: usize) -> Result<Self, AnalysisError> {
        Self::with_config(PcaConfig::new(nb_components))
    }

    pub fn with_config(config: PcaConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self {
            config,
            model: None,
        })
    }

    /// Fit the components to `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The data is empty or holds non-finite values
    /// - The data has fewer columns than `nb_components`
    pub fn fit(&mut self, data: &ArrayView2<f64>) -> Result<&mut Self, AnalysisError> {
        validate_matrix(data, false)?;

        let n_features = data.ncols();
        let nb_components = self.config.nb_components;
        if n_features < nb_components {
            return Err(AnalysisError::InsufficientDimensions(format!(
                "number of variables ({}) is smaller than the desired number of components ({})",
                n_features, nb_components
            )));
        }

        let cov = data.t().dot(data);
        let eigen = SymmetricEigen::new(DMatrix::from_fn(n_features, n_features, |i, j| {
            cov[[i, j]]
        }));

        // stable sort: equal eigenvalues keep the solver's order
        let mut order: Vec<usize> = (0..n_features).collect();
        order.sort_by(|&a, &b| {
            eigen.eigenvalues[b]
                .partial_cmp(&eigen.eigenvalues[a])
                .unwrap_or(Ordering::Equal)
        });

        let eigenvalues: Array1<f64> = order.iter().map(|&i| eigen.eigenvalues[i]).collect();
        let total = eigenvalues.sum();
        let variance_ratio = if total > 0.0 {
            &eigenvalues / total
        } else {
            Array1::zeros(n_features)
        };

        let components = Array2::from_shape_fn((n_features, nb_components), |(i, c)| {
            eigen.eigenvectors[(i, order[c])]
        });
        let transformed = data.dot(&components);

        if self.config.verbose {
            log::info!("new components:\n{}", components);
            log::info!(
                "that explain {} of the variance",
                variance_ratio.slice(s![..nb_components]).sum()
            );
            for (c, ratio) in variance_ratio.iter().take(nb_components).enumerate() {
                log::info!("component {}: variance ratio of {}", c + 1, ratio);
            }
        }

        self.model = Some(PcaModel {
            eigenvalues,
            variance_ratio,
            components,
            transformed,
        });
        Ok(self)
    }

    fn model(&self) -> Result<&PcaModel, AnalysisError> {
        self.model.as_ref().ok_or(AnalysisError::NotFitted)
    }

    /// Map the projected data back to the original space.
    ///
    /// Exact (up to rounding) when every component is kept.
    pub fn reconstruct(&self) -> Result<Array2<f64>, AnalysisError> {
        let model = self.model()?;
        Ok(model.transformed.dot(&model.components.t()))
    }

    /// Project new rows onto the fitted components.
    pub fn transform(&self, data: &ArrayView2<f64>) -> Result<Array2<f64>, AnalysisError> {
        let model = self.model()?;
        if data.ncols() != model.components.nrows() {
            return Err(AnalysisError::DimensionMismatch(format!(
                "Expected {} features, got {}",
                model.components.nrows(),
                data.ncols()
            )));
        }
        validate_matrix(data, false)?;
        Ok(data.dot(&model.components))
    }

    /// Retained eigenvectors as columns, shape (n_features, nb_components)
    pub fn components(&self) -> Option<&Array2<f64>> {
        self.model.as_ref().map(|m| &m.components)
    }

    /// Fitted data in component coordinates
    pub fn transformed(&self) -> Option<&Array2<f64>> {
        self.model.as_ref().map(|m| &m.transformed)
    }

    /// Every eigenvalue of `X^T X`, largest first
    pub fn eigenvalues(&self) -> Option<&Array1<f64>> {
        self.model.as_ref().map(|m| &m.eigenvalues)
    }

    /// Eigenvalue share of each retained component
    pub fn variance_ratio(&self) -> Option<ArrayView1<'_, f64>> {
        let nb_components = self.config.nb_components;
        self.model
            .as_ref()
            .map(|m| m.variance_ratio.slice(s![..nb_components]))
    }

    /// Total eigenvalue share of the retained components
    pub fn explained_variance(&self) -> Option<f64> {
        self.variance_ratio().map(|r| r.sum())
    }

    pub fn nb_components(&self) -> usize {
        self.config.nb_components
    }
}
