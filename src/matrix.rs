use crate::error::AnalysisError;
use ndarray::{Array2, ArrayView1, ArrayView2};

/// Build a matrix from row vectors, rejecting ragged or empty input.
///
/// # Example
///
/// ```
/// use unsupervised_rs::matrix_from_rows;
///
/// let data = matrix_from_rows(&[vec![0.0, 0.0], vec![0.0, 1.0]]).unwrap();
/// assert_eq!(data.dim(), (2, 2));
///
/// assert!(matrix_from_rows(&[vec![0.0, 0.0], vec![1.0]]).is_err());
/// ```
pub fn matrix_from_rows(rows: &[Vec<f64>]) -> Result<Array2<f64>, AnalysisError> {
    let n_rows = rows.len();
    if n_rows == 0 {
        return Err(AnalysisError::MalformedInput(
            "data has no rows".to_string(),
        ));
    }

    let n_cols = rows[0].len();
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_cols) {
        return Err(AnalysisError::MalformedInput(format!(
            "row {} has {} values, expected {}",
            i,
            row.len(),
            n_cols
        )));
    }

    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    let data = Array2::from_shape_vec((n_rows, n_cols), flat)
        .map_err(|e| AnalysisError::MalformedInput(e.to_string()))?;
    validate_matrix(&data.view(), true)?;

    Ok(data)
}

/// Check that a matrix is non-empty and holds only finite values.
///
/// When `allow_missing` is set, NaN is accepted as the missing-value marker.
pub fn validate_matrix(data: &ArrayView2<f64>, allow_missing: bool) -> Result<(), AnalysisError> {
    if data.nrows() == 0 || data.ncols() == 0 {
        return Err(AnalysisError::MalformedInput(format!(
            "data must have at least one row and one column, got shape ({}, {})",
            data.nrows(),
            data.ncols()
        )));
    }

    for ((i, j), &value) in data.indexed_iter() {
        if value.is_infinite() || (value.is_nan() && !allow_missing) {
            return Err(AnalysisError::MalformedInput(format!(
                "non-finite value {} at ({}, {})",
                value, i, j
            )));
        }
    }

    Ok(())
}

/// Mean and population standard deviation of the non-NaN values of a column.
///
/// Returns `None` when the column has no observed value.
pub(crate) fn nan_mean_std(col: &ArrayView1<f64>) -> Option<(f64, f64)> {
    let (sum, count) = col
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, c), &v| (s + v, c + 1));
    if count == 0 {
        return None;
    }

    let mean = sum / count as f64;
    let var = col
        .iter()
        .filter(|v| !v.is_nan())
        .map(|&v| (v - mean) * (v - mean))
        .sum::<f64>()
        / count as f64;

    Some((mean, var.sqrt()))
}

/// Number of non-NaN values of a column
pub(crate) fn observed_count(col: &ArrayView1<f64>) -> usize {
    col.iter().filter(|v| !v.is_nan()).count()
}
