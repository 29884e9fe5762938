use crate::config::{BootstrapAxis, StandardizeMethod};
use crate::error::AnalysisError;
use crate::matrix::{nan_mean_std, observed_count};
use ndarray::{Array2, ArrayView2, Axis};
use rand::Rng;

/// Center and scale every column of a copy of `data`.
///
/// Means and standard deviations ignore NaN entries, which stay NaN in the
/// output. A column with zero standard deviation is only centered.
///
/// # Example
///
/// ```
/// use unsupervised_rs::{standardize, StandardizeMethod};
/// use ndarray::array;
///
/// let data = array![[1.0, 5.0], [3.0, 5.0]];
/// let scaled = standardize(&data.view(), StandardizeMethod::Population);
/// assert_eq!(scaled, array![[-1.0, 0.0], [1.0, 0.0]]);
/// ```
pub fn standardize(data: &ArrayView2<f64>, method: StandardizeMethod) -> Array2<f64> {
    let mut scaled = data.to_owned();
    standardize_in_place(&mut scaled, method);
    scaled
}

/// Same as [`standardize`] but overwrites the caller's buffer.
pub fn standardize_in_place(data: &mut Array2<f64>, method: StandardizeMethod) {
    for mut col in data.axis_iter_mut(Axis(1)) {
        let Some((mean, population_std)) = nan_mean_std(&col.view()) else {
            continue;
        };

        // a constant column centers to exact zeros, free of rounding in its mean
        let mut observed = col.iter().copied().filter(|v| !v.is_nan());
        let first = observed.next().unwrap_or(mean);
        if observed.all(|v| v == first) {
            col.mapv_inplace(|v| v - first);
            continue;
        }

        let std = match method {
            StandardizeMethod::Population => population_std,
            StandardizeMethod::Sample => {
                let n = observed_count(&col.view()) as f64;
                if n > 1.0 {
                    population_std * (n / (n - 1.0)).sqrt()
                } else {
                    0.0
                }
            }
        };

        if std != 0.0 {
            col.mapv_inplace(|v| (v - mean) / std);
        } else {
            col.mapv_inplace(|v| v - mean);
        }
    }
}

/// Resample rows or columns of `data` with replacement.
///
/// Draws `floor(proportion * size)` indices uniformly along `axis`, and
/// returns the resampled matrix together with the drawn indices, which may
/// repeat.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidParameter`] if `proportion` is outside
/// `(0, 1]`, and [`AnalysisError::InsufficientData`] if the draw would be
/// empty.
pub fn bootstrap<R: Rng + ?Sized>(
    data: &ArrayView2<f64>,
    proportion: f64,
    axis: BootstrapAxis,
    rng: &mut R,
) -> Result<(Array2<f64>, Vec<usize>), AnalysisError> {
    if !(proportion > 0.0 && proportion <= 1.0) {
        return Err(AnalysisError::InvalidParameter(format!(
            "bootstrap proportion must lie in (0, 1], got {}",
            proportion
        )));
    }

    let axis = match axis {
        BootstrapAxis::Rows => Axis(0),
        BootstrapAxis::Cols => Axis(1),
    };
    let size = data.len_of(axis);
    let n_draws = (proportion * size as f64).floor() as usize;
    if n_draws == 0 {
        return Err(AnalysisError::InsufficientData(format!(
            "bootstrap of {} entries with proportion {} draws nothing",
            size, proportion
        )));
    }

    let indices: Vec<usize> = (0..n_draws).map(|_| rng.gen_range(0..size)).collect();

    Ok((data.select(axis, &indices), indices))
}
