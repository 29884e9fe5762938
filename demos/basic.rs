//! Basic example: standardize, cluster with k-means, refine with Ward's,
//! reduce with PCA and fill holes with PCA imputation.
//!
//! Run with: RUST_LOG=info cargo run --example basic --release

use ndarray::Array2;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use unsupervised_rs::{
    pca_imputation, standardize, ClusterCount, Clustering, ImputationConfig, InitMethod, KMeans,
    KMeansConfig, Pca, StandardizeMethod, Wards, WardsConfig,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("=== unsupervised-rs example ===\n");

    // Generate synthetic data: 3 clusters in 2D for easy visualization
    let n_samples = 300;
    let n_features = 2;
    let centers = [[-5.0, -5.0], [0.0, 5.0], [5.0, -5.0]];

    let mut data = Array2::<f64>::zeros((n_samples, n_features));
    let noise = Array2::random((n_samples, n_features), Uniform::new(-1.0, 1.0));
    for i in 0..n_samples {
        let center = centers[i % 3];
        data[[i, 0]] = center[0] + noise[[i, 0]];
        data[[i, 1]] = center[1] + noise[[i, 1]];
    }
    let scaled = standardize(&data.view(), StandardizeMethod::Sample);

    // Over-cluster with k-means++, then merge with Ward's automatic rule
    let config = KMeansConfig::new(12)
        .with_init(InitMethod::Plus)
        .with_seed(42)
        .with_verbose(true);
    let mut kmeans = KMeans::with_config(config)?;
    kmeans.fit(&scaled.view())?;
    println!("k-means converged in {} iterations", kmeans.n_iterations());
    kmeans.inertia_analysis(true)?;

    let mut wards = Wards::with_config(WardsConfig::new(ClusterCount::Auto).with_verbose(true))?;
    wards.fit_clustering(&kmeans)?;
    let inertia = wards.inertia_analysis(true)?;

    println!(
        "Ward's kept {} clusters after {} merges",
        wards.partition().map_or(0, |p| p.len()),
        wards.n_merges()
    );
    println!(
        "  total {:.3} = within {:.3} + between {:.3}",
        inertia.total, inertia.within, inertia.between
    );
    for (i, cluster) in wards.clusters()?.iter().enumerate() {
        println!("  Cluster {}: {} samples", i, cluster.nrows());
    }
    println!();

    // One component of the 2D data
    let mut pca = Pca::new(1)?;
    pca.fit(&scaled.view())?;
    println!(
        "First component explains {:.1}% of X^T X",
        pca.explained_variance().unwrap_or(0.0) * 100.0
    );

    // Punch holes and impute them
    let mut holed = scaled.clone();
    for i in (0..n_samples).step_by(25) {
        holed[[i, 1]] = f64::NAN;
    }
    let imputation = pca_imputation(
        &holed.view(),
        &ImputationConfig::new(1).with_multiple(10).with_verbose(true),
    )?;
    println!(
        "Imputed {} holes, mean imputation std {:.4}",
        n_samples.div_ceil(25),
        imputation.report.mean_std.unwrap_or(0.0)
    );

    println!("\n=== Done! ===");
    Ok(())
}
