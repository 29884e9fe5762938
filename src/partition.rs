use crate::distance::squared_distance;
use crate::error::AnalysisError;
use ndarray::{Array1, Array2, ArrayView2, Axis};

/// Column-wise mean of the given rows of `data`.
///
/// Returns `None` for an empty group, whose centroid is undefined.
pub fn centroid(data: &ArrayView2<f64>, rows: &[usize]) -> Option<Array1<f64>> {
    if rows.is_empty() {
        return None;
    }

    let mut sum = Array1::zeros(data.ncols());
    for &r in rows {
        sum += &data.row(r);
    }
    sum /= rows.len() as f64;

    Some(sum)
}

/// Sum of squared distances from the given rows to their centroid
fn group_inertia(data: &ArrayView2<f64>, rows: &[usize]) -> Option<(f64, Array1<f64>)> {
    let center = centroid(data, rows)?;
    let inertia = rows
        .iter()
        .map(|&r| squared_distance(&data.row(r), &center.view()))
        .sum();
    Some((inertia, center))
}

/// Decomposition of the total inertia of a clustered dataset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inertia {
    /// Sum of squared distances of every row to the grand centroid
    pub total: f64,
    /// Sum over clusters of squared distances to the cluster centroid
    pub within: f64,
    /// Sum over clusters of `size * distance(cluster centroid, grand centroid)^2`
    pub between: f64,
}

impl Inertia {
    /// Share of the total inertia explained by the clustering.
    ///
    /// `None` when the total inertia is zero (all rows identical).
    pub fn ratio(&self) -> Option<f64> {
        (self.total > 0.0).then(|| self.between / self.total)
    }
}

/// A grouping of the rows of an owned matrix into clusters.
///
/// Every row index appears in exactly one group. Groups may be empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    data: Array2<f64>,
    groups: Vec<Vec<usize>>,
}

impl Partition {
    /// Build a partition, checking that `groups` covers every row exactly once.
    pub fn new(data: Array2<f64>, groups: Vec<Vec<usize>>) -> Result<Self, AnalysisError> {
        let n_rows = data.nrows();
        let mut seen = vec![false; n_rows];

        for &r in groups.iter().flatten() {
            if r >= n_rows {
                return Err(AnalysisError::MalformedInput(format!(
                    "row index {} out of range for {} rows",
                    r, n_rows
                )));
            }
            if seen[r] {
                return Err(AnalysisError::MalformedInput(format!(
                    "row {} belongs to more than one group",
                    r
                )));
            }
            seen[r] = true;
        }

        if let Some(missing) = seen.iter().position(|&s| !s) {
            return Err(AnalysisError::MalformedInput(format!(
                "row {} belongs to no group",
                missing
            )));
        }

        Ok(Self { data, groups })
    }

    /// One group per row
    pub fn singletons(data: Array2<f64>) -> Self {
        let groups = (0..data.nrows()).map(|r| vec![r]).collect();
        Self { data, groups }
    }

    /// Group rows by label. Labels must be below `k`.
    pub(crate) fn from_labels(data: Array2<f64>, labels: &[usize], k: usize) -> Self {
        let mut groups = vec![Vec::new(); k];
        for (row, &label) in labels.iter().enumerate() {
            groups[label].push(row);
        }
        Self { data, groups }
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// Row indices of every group
    pub fn groups(&self) -> &[Vec<usize>] {
        &self.groups
    }

    pub(crate) fn groups_mut(&mut self) -> &mut Vec<Vec<usize>> {
        &mut self.groups
    }

    /// Number of groups, empty ones included
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of rows in every group
    pub fn sizes(&self) -> Vec<usize> {
        self.groups.iter().map(Vec::len).collect()
    }

    /// Group index of every row
    pub fn labels(&self) -> Vec<usize> {
        let mut labels = vec![0; self.data.nrows()];
        for (g, rows) in self.groups.iter().enumerate() {
            for &r in rows {
                labels[r] = g;
            }
        }
        labels
    }

    /// The rows of every group, as sub-matrices
    pub fn clusters(&self) -> Vec<Array2<f64>> {
        self.groups
            .iter()
            .map(|rows| self.data.select(Axis(0), rows))
            .collect()
    }

    /// Centroid of every group (`None` for empty groups)
    pub fn centroids(&self) -> Vec<Option<Array1<f64>>> {
        self.groups
            .iter()
            .map(|rows| centroid(&self.data.view(), rows))
            .collect()
    }

    /// Between-cluster inertia only, used by Ward's automatic stop rule
    pub(crate) fn between_inertia(&self) -> f64 {
        let data = self.data.view();
        let all: Vec<usize> = (0..data.nrows()).collect();
        let Some(grand) = centroid(&data, &all) else {
            return 0.0;
        };

        self.groups
            .iter()
            .filter_map(|rows| {
                centroid(&data, rows)
                    .map(|c| rows.len() as f64 * squared_distance(&c.view(), &grand.view()))
            })
            .sum()
    }

    /// Total, within-cluster and between-cluster inertia
    pub fn inertia(&self) -> Inertia {
        let data = self.data.view();
        let all: Vec<usize> = (0..data.nrows()).collect();
        let (total, grand) = group_inertia(&data, &all)
            .unwrap_or_else(|| (0.0, Array1::zeros(data.ncols())));

        let mut within = 0.0;
        let mut between = 0.0;
        for rows in &self.groups {
            if let Some((inertia, center)) = group_inertia(&data, rows) {
                within += inertia;
                between += rows.len() as f64 * squared_distance(&center.view(), &grand.view());
            }
        }

        Inertia {
            total,
            within,
            between,
        }
    }
}

/// Shared behaviour of fitted clustering models.
///
/// Both [`crate::KMeans`] and [`crate::Wards`] produce a [`Partition`];
/// everything else is derived from it.
pub trait Clustering {
    /// The fitted partition, or `None` before `fit`
    fn partition(&self) -> Option<&Partition>;

    /// Row groups of the fitted partition.
    fn clusters(&self) -> Result<Vec<Array2<f64>>, AnalysisError> {
        Ok(self.partition().ok_or(AnalysisError::NotFitted)?.clusters())
    }

    /// Decompose the inertia of the fitted data.
    ///
    /// With `verbose`, the total inertia, between inertia and their ratio
    /// are also logged.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::NotFitted`] before `fit`.
    fn inertia_analysis(&self, verbose: bool) -> Result<Inertia, AnalysisError> {
        let partition = self.partition().ok_or(AnalysisError::NotFitted)?;
        let inertia = partition.inertia();

        if verbose {
            log::info!("total inertia: {}", inertia.total);
            log::info!("between inertia: {}", inertia.between);
            match inertia.ratio() {
                Some(ratio) => log::info!("inertia ratio: {}", ratio),
                None => log::info!("inertia ratio: undefined (zero total inertia)"),
            }
        }

        Ok(inertia)
    }
}
