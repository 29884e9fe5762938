//! Missing-value imputation by iterated PCA reconstruction.
//!
//! Missing cells (NaN) are seeded from their column statistics, then the
//! matrix is repeatedly fitted with a [`Pca`], reconstructed, and the
//! missing cells overwritten with the reconstruction until the summed
//! absolute change falls below the convergence gap. In multiple mode the
//! procedure runs on bootstrap resamples of the rows and the completed
//! rows are averaged.

use crate::config::{BootstrapAxis, FirstImputation, ImputationConfig};
use crate::error::AnalysisError;
use crate::matrix::{nan_mean_std, validate_matrix};
use crate::pca::Pca;
use crate::preprocessing::bootstrap;
use ndarray::{Array2, ArrayView2, Axis, Zip};
use ndarray_rand::rand_distr::{Distribution, Normal};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

/// Diagnostics of an imputation run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImputationReport {
    /// PCA reconstructions performed by each round (one round in single mode)
    pub iterations: Vec<usize>,

    /// Rows never drawn by any bootstrap round. They keep their observed
    /// values and their missing cells hold the first-imputation seed.
    pub untouched_rows: Vec<usize>,

    /// Standard deviation of the imputed values of every missing `(row, col)`
    /// cell across bootstrap draws (multiple verbose mode only)
    pub cell_std: Option<BTreeMap<(usize, usize), f64>>,

    /// Mean of `cell_std`
    pub mean_std: Option<f64>,
}

/// A completed matrix with its diagnostics
#[derive(Debug, Clone)]
pub struct Imputation {
    pub data: Array2<f64>,
    pub report: ImputationReport,
}

/// Impute the NaN cells of `data`, seeding randomness from `config.seed`.
///
/// # Arguments
///
/// * `data` - Matrix of shape (n_samples, n_features) with NaN marking missing cells
/// * `config` - Number of components, single or multiple mode, and stopping rule
///
/// # Errors
///
/// Returns an error if:
/// - The configuration is invalid (see [`ImputationConfig::validate`])
/// - The data is empty, holds infinities, or has a column with no observed value
/// - The data has fewer columns than `nb_components`
/// - A fixed point is not reached within `max_iters` reconstructions
///
/// # Example
///
/// ```
/// use unsupervised_rs::{pca_imputation, FirstImputation, ImputationConfig};
/// use ndarray::array;
///
/// let data = array![[1.0, 2.0], [2.0, f64::NAN], [3.0, 6.0], [4.0, 8.0]];
/// let config = ImputationConfig::new(1).with_first_imputation(FirstImputation::Mean);
///
/// let imputation = pca_imputation(&data.view(), &config).unwrap();
/// assert!(imputation.data.iter().all(|v| v.is_finite()));
/// assert_eq!(imputation.data[[0, 1]], 2.0);
/// ```
pub fn pca_imputation(
    data: &ArrayView2<f64>,
    config: &ImputationConfig,
) -> Result<Imputation, AnalysisError> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    pca_imputation_with_rng(data, config, &mut rng)
}

/// Same as [`pca_imputation`] but writes the completed matrix back into
/// `data`. The buffer is left untouched on error.
pub fn pca_imputation_in_place(
    data: &mut Array2<f64>,
    config: &ImputationConfig,
) -> Result<ImputationReport, AnalysisError> {
    let imputation = pca_imputation(&data.view(), config)?;
    data.assign(&imputation.data);
    Ok(imputation.report)
}

/// Same as [`pca_imputation`] with a caller-supplied random generator.
pub fn pca_imputation_with_rng<R: Rng + ?Sized>(
    data: &ArrayView2<f64>,
    config: &ImputationConfig,
    rng: &mut R,
) -> Result<Imputation, AnalysisError> {
    config.validate()?;
    validate_matrix(data, true)?;
    if data.ncols() < config.nb_components {
        return Err(AnalysisError::InsufficientDimensions(format!(
            "number of variables ({}) is smaller than the desired number of components ({})",
            data.ncols(),
            config.nb_components
        )));
    }

    let stats = column_stats(data)?;

    if config.multiple {
        multiple_imputation(data, config, &stats, rng)
    } else {
        single_imputation(data, config, &stats, rng)
    }
}

fn single_imputation<R: Rng + ?Sized>(
    data: &ArrayView2<f64>,
    config: &ImputationConfig,
    stats: &[(f64, f64)],
    rng: &mut R,
) -> Result<Imputation, AnalysisError> {
    let mask = data.mapv(f64::is_nan);
    let mut imputed = data.to_owned();

    seed_missing(&mut imputed, &mask, stats, config.first_imputation, rng)?;
    let iterations = fixed_point(&mut imputed, &mask, config)?;

    if config.verbose {
        log::info!(
            "Imputed {} missing values in {} iterations",
            mask.iter().filter(|&&m| m).count(),
            iterations
        );
    }

    Ok(Imputation {
        data: imputed,
        report: ImputationReport {
            iterations: vec![iterations],
            ..Default::default()
        },
    })
}

fn multiple_imputation<R: Rng + ?Sized>(
    data: &ArrayView2<f64>,
    config: &ImputationConfig,
    stats: &[(f64, f64)],
    rng: &mut R,
) -> Result<Imputation, AnalysisError> {
    let n_rows = data.nrows();
    let mut sums = Array2::<f64>::zeros(data.dim());
    let mut counts = vec![0usize; n_rows];
    let mut draws: Option<BTreeMap<(usize, usize), Vec<f64>>> =
        config.verbose.then(BTreeMap::new);
    let mut iterations = Vec::with_capacity(config.n_imputations);

    for round in 0..config.n_imputations {
        let (mut sample, rows) =
            bootstrap(data, config.bootstrap_proportion, BootstrapAxis::Rows, rng)?;
        let mask = sample.mapv(f64::is_nan);

        seed_missing(&mut sample, &mask, stats, config.first_imputation, rng)?;
        let n_iterations = fixed_point(&mut sample, &mask, config)?;
        iterations.push(n_iterations);

        if config.verbose {
            log::info!(
                "  Imputation {}/{}: converged after {} iterations",
                round + 1,
                config.n_imputations,
                n_iterations
            );
        }

        for (b, &row) in rows.iter().enumerate() {
            let mut target = sums.row_mut(row);
            target += &sample.row(b);
            counts[row] += 1;

            if let Some(draws) = draws.as_mut() {
                for (col, _) in mask.row(b).iter().enumerate().filter(|(_, &m)| m) {
                    draws
                        .entry((row, col))
                        .or_default()
                        .push(sample[[b, col]]);
                }
            }
        }
    }

    let mut imputed = data.to_owned();
    let mut untouched_rows = Vec::new();
    for (row, &count) in counts.iter().enumerate() {
        if count > 0 {
            let mean = &sums.row(row) / count as f64;
            imputed.row_mut(row).assign(&mean);
        } else {
            untouched_rows.push(row);
        }
    }

    if !untouched_rows.is_empty() {
        log::warn!(
            "{} rows were never drawn by the bootstrap and keep their first imputation",
            untouched_rows.len()
        );
        // averaged rows hold no NaN, so this only seeds the untouched ones
        let mask = imputed.mapv(f64::is_nan);
        seed_missing(&mut imputed, &mask, stats, config.first_imputation, rng)?;
    }

    let (cell_std, mean_std) = match draws {
        Some(draws) => {
            let cell_std: BTreeMap<(usize, usize), f64> = draws
                .into_iter()
                .map(|(cell, values)| (cell, population_std(&values)))
                .collect();
            let mean_std = (!cell_std.is_empty())
                .then(|| cell_std.values().sum::<f64>() / cell_std.len() as f64);

            if let Some(mean_std) = mean_std {
                log::info!("mean standard deviation of imputations: {}", mean_std);
            }
            for ((row, col), std) in &cell_std {
                log::debug!(
                    "missing ({}, {}) has imputation standard deviation of {}",
                    row,
                    col,
                    std
                );
            }

            (Some(cell_std), mean_std)
        }
        None => (None, None),
    };

    Ok(Imputation {
        data: imputed,
        report: ImputationReport {
            iterations,
            untouched_rows,
            cell_std,
            mean_std,
        },
    })
}

/// Observed mean and population std of every column
fn column_stats(data: &ArrayView2<f64>) -> Result<Vec<(f64, f64)>, AnalysisError> {
    data.axis_iter(Axis(1))
        .enumerate()
        .map(|(j, col)| {
            nan_mean_std(&col).ok_or_else(|| {
                AnalysisError::MalformedInput(format!("column {} has no observed value", j))
            })
        })
        .collect()
}

/// Fill the masked cells with the first-imputation strategy
fn seed_missing<R: Rng + ?Sized>(
    data: &mut Array2<f64>,
    mask: &Array2<bool>,
    stats: &[(f64, f64)],
    strategy: FirstImputation,
    rng: &mut R,
) -> Result<(), AnalysisError> {
    for (j, (mut col, col_mask)) in data
        .axis_iter_mut(Axis(1))
        .zip(mask.axis_iter(Axis(1)))
        .enumerate()
    {
        let (mean, std) = stats[j];
        match strategy {
            FirstImputation::Mean => {
                Zip::from(&mut col).and(&col_mask).for_each(|v, &m| {
                    if m {
                        *v = mean;
                    }
                });
            }
            FirstImputation::Normal => {
                let normal = Normal::new(mean, std)
                    .map_err(|e| AnalysisError::MalformedInput(format!("column {}: {}", j, e)))?;
                Zip::from(&mut col).and(&col_mask).for_each(|v, &m| {
                    if m {
                        *v = normal.sample(rng);
                    }
                });
            }
        }
    }
    Ok(())
}

/// Refit and reconstruct until the masked cells settle.
///
/// Returns the number of reconstructions performed.
fn fixed_point(
    data: &mut Array2<f64>,
    mask: &Array2<bool>,
    config: &ImputationConfig,
) -> Result<usize, AnalysisError> {
    let mut pca = Pca::new(config.nb_components)?;

    for iteration in 0..config.max_iters {
        pca.fit(&data.view())?;
        let reconstruction = pca.reconstruct()?;

        let mut diff = 0.0;
        Zip::from(&mut *data)
            .and(mask)
            .and(&reconstruction)
            .for_each(|v, &m, &r| {
                if m {
                    diff += (r - *v).abs();
                    *v = r;
                }
            });

        log::debug!("  iteration {}: change {:.6}", iteration + 1, diff);

        if diff < config.convergence_gap {
            return Ok(iteration + 1);
        }
    }

    Err(AnalysisError::ConvergenceFailure {
        iterations: config.max_iters,
    })
}

fn population_std(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    (values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n).sqrt()
}
