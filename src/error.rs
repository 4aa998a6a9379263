use std::fmt;

/// Error types for the minimizer and its vector utilities
#[derive(Debug, Clone, PartialEq)]
pub enum MinimizerError {
    InvalidArgument(String),
    DimensionMismatch { expected: usize, got: usize },
}

impl fmt::Display for MinimizerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MinimizerError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            MinimizerError::DimensionMismatch { expected, got } => {
                write!(f, "Dimension mismatch: expected {}, got {}", expected, got)
            }
        }
    }
}

impl std::error::Error for MinimizerError {}
