/// Error types for mesh loading and alignment
use thiserror::Error;

/// Errors produced by the moment estimator and principal-axis aligner.
#[derive(Debug, Error)]
pub enum AlignError {
    /// Total weighted surface area is numerically zero, or no triangle
    /// survived the degenerate-area filter.
    #[error("degenerate mesh: {reason}")]
    DegenerateMesh { reason: String },

    /// The symmetric eigensolver failed to converge.
    #[error("eigendecomposition failed: {reason}")]
    Eigendecomposition { reason: String },

    /// A caller-supplied option value is out of range.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },
}

impl AlignError {
    pub fn degenerate_mesh(reason: impl Into<String>) -> Self {
        Self::DegenerateMesh {
            reason: reason.into(),
        }
    }

    pub fn eigendecomposition(reason: impl Into<String>) -> Self {
        Self::Eigendecomposition {
            reason: reason.into(),
        }
    }

    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}

/// Errors produced by the STL reader and writer.
#[derive(Debug, Error)]
pub enum StlError {
    #[error("file too small to be a valid STL")]
    TooShort,

    #[error("unexpected end of file in binary STL facet data")]
    Truncated,

    #[error("failed to parse ASCII STL: {0}")]
    AsciiParse(String),

    #[error("mesh has {faces} faces, which exceeds the binary STL limit")]
    TooManyFaces { faces: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AlignError::degenerate_mesh("total triangle area is zero");
        assert!(format!("{err}").contains("degenerate mesh"));

        let err = AlignError::invalid_configuration("area epsilon must be positive");
        assert!(format!("{err}").contains("area epsilon"));

        let err = StlError::TooShort;
        assert!(format!("{err}").contains("too small"));
    }
}
