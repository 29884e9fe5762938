use crate::error::AnalysisError;
use ndarray::{ArrayView1, ArrayView2};

/// Euclidean distance between two vectors of equal length.
///
/// # Errors
///
/// Returns [`AnalysisError::DimensionMismatch`] if the lengths differ.
///
/// # Example
///
/// ```
/// use unsupervised_rs::euclidean_distance;
/// use ndarray::array;
///
/// let d = euclidean_distance(&array![0.0, 0.0].view(), &array![3.0, 4.0].view()).unwrap();
/// assert_eq!(d, 5.0);
/// ```
pub fn euclidean_distance(a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> Result<f64, AnalysisError> {
    if a.len() != b.len() {
        return Err(AnalysisError::DimensionMismatch(format!(
            "points must be of same dimension, got {} and {}",
            a.len(),
            b.len()
        )));
    }
    Ok(squared_distance(a, b).sqrt())
}

/// Squared Euclidean distance. Callers guarantee equal lengths.
#[inline]
pub(crate) fn squared_distance(a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Index of the nearest centroid for one point.
///
/// Ties go to the lowest centroid index.
#[inline]
pub(crate) fn nearest_centroid(point: &ArrayView1<f64>, centroids: &ArrayView2<f64>) -> usize {
    let mut best_label = 0;
    let mut best_dist = f64::INFINITY;

    for (j, centroid) in centroids.outer_iter().enumerate() {
        let dist = squared_distance(point, &centroid);
        if dist < best_dist {
            best_dist = dist;
            best_label = j;
        }
    }

    best_label
}

/// Find the nearest centroid for each row of `data`
pub(crate) fn find_nearest_centroids(
    data: &ArrayView2<f64>,
    centroids: &ArrayView2<f64>,
) -> Vec<usize> {
    data.outer_iter()
        .map(|row| nearest_centroid(&row, centroids))
        .collect()
}

/// Distance from `point` to the closest of the given rows of `data`
pub(crate) fn distance_to_nearest(
    point: &ArrayView1<f64>,
    data: &ArrayView2<f64>,
    rows: &[usize],
) -> f64 {
    rows.iter()
        .map(|&r| squared_distance(point, &data.row(r)))
        .fold(f64::INFINITY, f64::min)
        .sqrt()
}

/// Compute centroid shift (sum of L2 norms of centroid movements)
pub(crate) fn compute_centroid_shift(
    old_centroids: &ArrayView2<f64>,
    new_centroids: &ArrayView2<f64>,
) -> f64 {
    old_centroids
        .outer_iter()
        .zip(new_centroids.outer_iter())
        .map(|(old_c, new_c)| squared_distance(&old_c, &new_c).sqrt())
        .sum()
}
