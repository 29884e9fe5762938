//! # unsupervised-rs
//!
//! A small unsupervised-learning toolkit working on ndarray matrices.
//!
//! ## Features
//!
//! - **K-means**: Lloyd's algorithm with uniform or k-means++ seeding
//! - **Ward's hierarchical clustering**: greedy agglomeration with an
//!   optional automatic stopping rule, either from raw rows or on top of
//!   another clustering
//! - **Inertia analysis**: total / within / between decomposition shared by
//!   every clustering through the [`Clustering`] trait
//! - **PCA**: eigendecomposition of `X^T X` with reconstruction
//! - **PCA imputation**: fixed-point filling of missing (NaN) values, single
//!   or averaged over bootstrap resamples
//! - **Preprocessing**: NaN-aware standardization and bootstrap resampling
//!
//! Every random step draws from an explicit generator: models seed a
//! `ChaCha8Rng` from their configuration, and `*_with_rng` variants accept
//! any [`rand::Rng`].
//!
//! ## Example
//!
//! ```rust
//! use unsupervised_rs::{ClusterCount, Clustering, InitMethod, KMeans, Wards};
//! use ndarray::array;
//!
//! let data = array![[0.0, 0.0], [0.0, 1.0], [10.0, 10.0], [10.0, 11.0]];
//!
//! let mut kmeans = KMeans::new(2, InitMethod::Plus).unwrap();
//! kmeans.fit(&data.view()).unwrap();
//!
//! let mut wards = Wards::new(ClusterCount::Fixed(2)).unwrap();
//! wards.fit(&data.view()).unwrap();
//! assert_eq!(wards.n_merges(), 2);
//!
//! let inertia = wards.inertia_analysis(false).unwrap();
//! assert_eq!(inertia.within, 1.0);
//! ```
//!
//! ## Imputation
//!
//! ```rust
//! use unsupervised_rs::{pca_imputation, standardize, ImputationConfig, StandardizeMethod};
//! use ndarray_rand::rand_distr::Uniform;
//! use ndarray_rand::RandomExt;
//! use ndarray::Array2;
//!
//! let mut data = Array2::random((50, 4), Uniform::new(-1.0, 1.0));
//! data[[3, 1]] = f64::NAN;
//! let data = standardize(&data.view(), StandardizeMethod::Sample);
//!
//! let config = ImputationConfig::new(2)
//!     .with_multiple(5)
//!     .with_bootstrap_proportion(0.9)
//!     .with_seed(42);
//! let imputation = pca_imputation(&data.view(), &config).unwrap();
//! assert_eq!(imputation.report.iterations.len(), 5);
//! ```

mod algorithm;
mod config;
mod distance;
mod error;
mod imputation;
mod kmeans;
mod matrix;
mod partition;
mod pca;
mod preprocessing;
mod wards;

pub use config::{
    BootstrapAxis, ClusterCount, FirstImputation, ImputationConfig, InitMethod, KMeansConfig,
    PcaConfig, StandardizeMethod, WardsConfig,
};
pub use distance::euclidean_distance;
pub use error::AnalysisError;
pub use imputation::{
    pca_imputation, pca_imputation_in_place, pca_imputation_with_rng, Imputation,
    ImputationReport,
};
pub use kmeans::KMeans;
pub use matrix::{matrix_from_rows, validate_matrix};
pub use partition::{centroid, Clustering, Inertia, Partition};
pub use pca::Pca;
pub use preprocessing::{bootstrap, standardize, standardize_in_place};
pub use wards::{ward_linkage, Wards};
