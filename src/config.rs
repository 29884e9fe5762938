use crate::error::AnalysisError;
use std::str::FromStr;

/// Centroid initialization policy for k-means
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitMethod {
    /// Uniformly random rows, drawn without replacement
    #[default]
    Standard,
    /// k-means++: rows drawn proportionally to their distance to the nearest chosen centroid
    Plus,
}

impl FromStr for InitMethod {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Self::Standard),
            "plus" => Ok(Self::Plus),
            other => Err(AnalysisError::InvalidParameter(format!(
                "initialisation method must be either 'standard' or 'plus', got '{}'",
                other
            ))),
        }
    }
}

/// Target number of clusters for Ward's agglomeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterCount {
    /// Merge until exactly this many groups remain
    Fixed(usize),
    /// Stop at the first inflection of the between-cluster inertia
    Auto,
}

impl ClusterCount {
    /// Parse the signed convention where `-1` requests automatic selection.
    pub fn from_signed(nb_clusters: i64) -> Result<Self, AnalysisError> {
        match nb_clusters {
            -1 => Ok(Self::Auto),
            n if n > 0 => Ok(Self::Fixed(n as usize)),
            n => Err(AnalysisError::InvalidParameter(format!(
                "number of clusters must be positive or -1, got {}",
                n
            ))),
        }
    }
}

/// Denominator used for the standard deviation in [`crate::standardize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StandardizeMethod {
    /// Divide by the number of observed values
    #[default]
    Population,
    /// Divide by the number of observed values minus one
    Sample,
}

impl FromStr for StandardizeMethod {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "population" | "n" => Ok(Self::Population),
            "sample" | "n-1" => Ok(Self::Sample),
            other => Err(AnalysisError::InvalidParameter(format!(
                "standardisation method must be either 'population' or 'sample', got '{}'",
                other
            ))),
        }
    }
}

/// Axis resampled by [`crate::bootstrap`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BootstrapAxis {
    /// Resample individuals
    #[default]
    Rows,
    /// Resample variables
    Cols,
}

impl FromStr for BootstrapAxis {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rows" | "ind" => Ok(Self::Rows),
            "cols" | "var" => Ok(Self::Cols),
            other => Err(AnalysisError::InvalidParameter(format!(
                "can only bootstrap 'rows' or 'cols', got '{}'",
                other
            ))),
        }
    }
}

/// How missing cells are filled before the first PCA reconstruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FirstImputation {
    /// Column mean of the observed values
    Mean,
    /// Draw from a normal distribution with the column's observed mean and std
    #[default]
    Normal,
}

impl FromStr for FirstImputation {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mean" => Ok(Self::Mean),
            "normal" => Ok(Self::Normal),
            other => Err(AnalysisError::InvalidParameter(format!(
                "first imputation method must be 'mean' or 'normal', got '{}'",
                other
            ))),
        }
    }
}

/// Configuration for the k-means algorithm
#[derive(Debug, Clone)]
pub struct KMeansConfig {
    /// Number of clusters
    pub k: usize,

    /// Centroid initialization policy
    pub init: InitMethod,

    /// Maximum number of Lloyd iterations before giving up with
    /// [`AnalysisError::ConvergenceFailure`]
    pub max_iters: usize,

    /// Random seed for centroid initialization
    pub seed: u64,

    /// Log a summary of the run
    pub verbose: bool,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            k: 8,
            init: InitMethod::Standard,
            max_iters: 300,
            seed: 0,
            verbose: false,
        }
    }
}

impl KMeansConfig {
    /// Create a new configuration with the specified number of clusters
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ..Default::default()
        }
    }

    /// Set the initialization policy
    pub fn with_init(mut self, init: InitMethod) -> Self {
        self.init = init;
        self
    }

    /// Set the maximum number of iterations
    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set verbose mode
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), AnalysisError> {
        if self.k == 0 {
            return Err(AnalysisError::InvalidParameter(
                "number of clusters must be greater than 0".to_string(),
            ));
        }
        if self.max_iters == 0 {
            return Err(AnalysisError::InvalidParameter(
                "max_iters must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for Ward's hierarchical clustering
#[derive(Debug, Clone)]
pub struct WardsConfig {
    /// Number of groups to stop at
    pub nb_clusters: ClusterCount,

    /// Log merges and the stopping point
    pub verbose: bool,
}

impl Default for WardsConfig {
    fn default() -> Self {
        Self {
            nb_clusters: ClusterCount::Auto,
            verbose: false,
        }
    }
}

impl WardsConfig {
    pub fn new(nb_clusters: ClusterCount) -> Self {
        Self {
            nb_clusters,
            ..Default::default()
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), AnalysisError> {
        if self.nb_clusters == ClusterCount::Fixed(0) {
            return Err(AnalysisError::InvalidParameter(
                "number of clusters must be positive or automatic".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for principal component analysis
#[derive(Debug, Clone)]
pub struct PcaConfig {
    /// Dimensionality of the projected space
    pub nb_components: usize,

    /// Log the retained components and their variance ratios after fitting
    pub verbose: bool,
}

impl Default for PcaConfig {
    fn default() -> Self {
        Self {
            nb_components: 2,
            verbose: false,
        }
    }
}

impl PcaConfig {
    pub fn new(nb_components: usize) -> Self {
        Self {
            nb_components,
            ..Default::default()
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), AnalysisError> {
        if self.nb_components == 0 {
            return Err(AnalysisError::InvalidParameter(
                "number of components must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for [`crate::pca_imputation`]
#[derive(Debug, Clone)]
pub struct ImputationConfig {
    /// Number of components of the reconstructing PCA
    pub nb_components: usize,

    /// Number of bootstrap rounds (must be 1 unless `multiple` is set)
    pub n_imputations: usize,

    /// Average several bootstrap imputations instead of imputing once
    pub multiple: bool,

    /// Share of rows drawn (with replacement) for each bootstrap round
    pub bootstrap_proportion: f64,

    /// Log convergence and, in multiple mode, the imputation spread
    pub verbose: bool,

    /// Stop iterating once the summed absolute change of the imputed cells falls below this
    pub convergence_gap: f64,

    /// Strategy used to seed missing cells
    pub first_imputation: FirstImputation,

    /// Maximum number of PCA reconstructions per round
    pub max_iters: usize,

    /// Random seed for seeding draws and bootstrap resampling
    pub seed: u64,
}

impl Default for ImputationConfig {
    fn default() -> Self {
        Self {
            nb_components: 2,
            n_imputations: 1,
            multiple: false,
            bootstrap_proportion: 0.8,
            verbose: false,
            convergence_gap: 0.01,
            first_imputation: FirstImputation::Normal,
            max_iters: 1_000,
            seed: 0,
        }
    }
}

impl ImputationConfig {
    pub fn new(nb_components: usize) -> Self {
        Self {
            nb_components,
            ..Default::default()
        }
    }

    /// Switch to multiple imputation with `n_imputations` bootstrap rounds
    pub fn with_multiple(mut self, n_imputations: usize) -> Self {
        self.multiple = true;
        self.n_imputations = n_imputations;
        self
    }

    pub fn with_bootstrap_proportion(mut self, proportion: f64) -> Self {
        self.bootstrap_proportion = proportion;
        self
    }

    pub fn with_convergence_gap(mut self, gap: f64) -> Self {
        self.convergence_gap = gap;
        self
    }

    pub fn with_first_imputation(mut self, first_imputation: FirstImputation) -> Self {
        self.first_imputation = first_imputation;
        self
    }

    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Check the parameter combination before any work is done.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.nb_components == 0 {
            return Err(AnalysisError::InvalidParameter(
                "number of components must be greater than 0".to_string(),
            ));
        }
        if !(self.convergence_gap.is_finite() && self.convergence_gap > 0.0) {
            return Err(AnalysisError::InvalidParameter(format!(
                "convergence gap must be positive, got {}",
                self.convergence_gap
            )));
        }
        if !self.multiple && self.n_imputations != 1 {
            return Err(AnalysisError::InvalidParameter(
                "cannot impute more than once unless multiple imputation is enabled".to_string(),
            ));
        }
        if self.n_imputations == 0 {
            return Err(AnalysisError::InvalidParameter(
                "number of imputations must be greater than 0".to_string(),
            ));
        }
        if self.multiple
            && !(self.bootstrap_proportion > 0.0 && self.bootstrap_proportion <= 1.0)
        {
            return Err(AnalysisError::InvalidParameter(format!(
                "bootstrap proportion must lie in (0, 1], got {}",
                self.bootstrap_proportion
            )));
        }
        if self.max_iters == 0 {
            return Err(AnalysisError::InvalidParameter(
                "max_iters must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("plus".parse::<InitMethod>().unwrap(), InitMethod::Plus);
        assert_eq!(
            "n-1".parse::<StandardizeMethod>().unwrap(),
            StandardizeMethod::Sample
        );
        assert_eq!("var".parse::<BootstrapAxis>().unwrap(), BootstrapAxis::Cols);
        assert_eq!(
            "mean".parse::<FirstImputation>().unwrap(),
            FirstImputation::Mean
        );
        assert!(matches!(
            "kmeans++".parse::<InitMethod>(),
            Err(AnalysisError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_cluster_count_from_signed() {
        assert_eq!(ClusterCount::from_signed(-1).unwrap(), ClusterCount::Auto);
        assert_eq!(
            ClusterCount::from_signed(3).unwrap(),
            ClusterCount::Fixed(3)
        );
        assert!(ClusterCount::from_signed(0).is_err());
        assert!(ClusterCount::from_signed(-2).is_err());
    }

    #[test]
    fn test_imputation_config_validation() {
        assert!(ImputationConfig::new(2).validate().is_ok());
        assert!(ImputationConfig::new(0).validate().is_err());
        assert!(ImputationConfig::new(2)
            .with_convergence_gap(0.0)
            .validate()
            .is_err());

        let mut config = ImputationConfig::new(2);
        config.n_imputations = 5;
        assert!(matches!(
            config.validate(),
            Err(AnalysisError::InvalidParameter(_))
        ));
        assert!(config.clone().with_multiple(5).validate().is_ok());
        assert!(config
            .with_multiple(5)
            .with_bootstrap_proportion(1.5)
            .validate()
            .is_err());
    }
}
