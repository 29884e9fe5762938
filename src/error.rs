use thiserror::Error;

/// Error types for the unsupervised-rs library
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// A constructor or function argument is out of range or unknown
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The matrix is empty, ragged, or holds non-finite values
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Two vectors or matrices that must agree in length do not
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Not enough rows for the requested number of clusters or samples
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Not enough columns for the requested number of components
    #[error("Insufficient dimensions: {0}")]
    InsufficientDimensions(String),

    /// Model has not been fitted yet
    #[error("Model has not been fitted. Call fit() first.")]
    NotFitted,

    /// An iterative procedure hit its iteration cap before stabilizing
    #[error("Did not converge after {iterations} iterations")]
    ConvergenceFailure { iterations: usize },
}
