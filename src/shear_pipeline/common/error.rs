use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShearError {
    #[error("Timed out waiting {timeout_ms}ms for a frame")]
    CaptureTimeout { timeout_ms: u64 },

    #[error("Acquisition device not connected: {0}")]
    DeviceNotConnected(String),

    #[error("Frame capture failed: {0}")]
    CaptureFailed(String),

    #[error("Burst length must be at least one frame")]
    EmptyBurst,

    #[error("Degenerate region: {0}")]
    DegenerateRegion(String),

    #[error("Region rows {row_start}..{row_end}, cols {col_start}..{col_end} is empty or outside a {rows}x{cols} frame")]
    RegionOutOfBounds {
        row_start: usize,
        row_end: usize,
        col_start: usize,
        col_end: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Centroid did not converge after {iterations} iterations (last step {last_step:.4} px)")]
    NotConverged { iterations: usize, last_step: f64 },

    #[error("{what} dimensions mismatch: expected {expected:?}, found {found:?}")]
    DimensionMismatch {
        what: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Failed to decode TIFF image: {0}")]
    DecodeError(String),

    #[error("Failed to encode TIFF image: {0}")]
    EncodeError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Broad failure category a remote caller can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The acquisition collaborator could not deliver the burst.
    Capture,
    /// A region had no usable signal or did not fit the frame.
    DegenerateRegion,
    /// The reweighted estimator hit its iteration cap.
    NonConvergence,
    /// Mismatched dimensions or rejected settings. Not recoverable in-process.
    Configuration,
    /// File access or TIFF coding.
    Io,
}

impl ShearError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShearError::CaptureTimeout { .. }
            | ShearError::DeviceNotConnected(_)
            | ShearError::CaptureFailed(_)
            | ShearError::EmptyBurst => ErrorKind::Capture,
            ShearError::DegenerateRegion(_) | ShearError::RegionOutOfBounds { .. } => {
                ErrorKind::DegenerateRegion
            }
            ShearError::NotConverged { .. } => ErrorKind::NonConvergence,
            ShearError::DimensionMismatch { .. } | ShearError::InvalidConfig(_) => {
                ErrorKind::Configuration
            }
            ShearError::InputReadError(_)
            | ShearError::OutputWriteError(_)
            | ShearError::DecodeError(_)
            | ShearError::EncodeError(_)
            | ShearError::IoError(_) => ErrorKind::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, ShearError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_are_distinct_per_category() {
        assert_eq!(
            ShearError::CaptureTimeout { timeout_ms: 10 }.kind(),
            ErrorKind::Capture
        );
        assert_eq!(ShearError::EmptyBurst.kind(), ErrorKind::Capture);
        assert_eq!(
            ShearError::DegenerateRegion("zero flux".into()).kind(),
            ErrorKind::DegenerateRegion
        );
        assert_eq!(
            ShearError::NotConverged { iterations: 3, last_step: 1.0 }.kind(),
            ErrorKind::NonConvergence
        );
        assert_eq!(
            ShearError::DimensionMismatch {
                what: "dark frame",
                expected: (2, 2),
                found: (3, 3)
            }
            .kind(),
            ErrorKind::Configuration
        );
    }

    #[test]
    fn test_messages_are_human_readable() {
        let err = ShearError::DimensionMismatch {
            what: "dark frame",
            expected: (1000, 1000),
            found: (960, 1280),
        };
        assert_eq!(
            err.to_string(),
            "dark frame dimensions mismatch: expected (1000, 1000), found (960, 1280)"
        );
    }
}
