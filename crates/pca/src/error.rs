use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::primitive::{FitDimension, PrimitiveKind};

/// Pipeline stage that produced a non-finite value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Covariance,
    Eigen,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Covariance => f.write_str("covariance"),
            Stage::Eigen => f.write_str("eigendecomposition"),
        }
    }
}

/// Failure to measure a single primitive.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PrimitiveError {
    #[error("degenerate {kind}: measure {measure} is not positive")]
    Degenerate { kind: PrimitiveKind, measure: f64 },
    #[error("{kind} carries no mass at {dimension}")]
    UnsupportedDimension {
        kind: PrimitiveKind,
        dimension: FitDimension,
    },
}

/// Failure of a whole fit.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("nothing to fit: total weight is {total_weight}")]
    EmptyInput { total_weight: f64 },
    #[error("primitive {index} is a degenerate {kind} (measure {measure})")]
    DegeneratePrimitive {
        index: usize,
        kind: PrimitiveKind,
        measure: f64,
    },
    #[error("primitive {index} ({kind}) carries no mass at {dimension}")]
    UnsupportedDimension {
        index: usize,
        kind: PrimitiveKind,
        dimension: FitDimension,
    },
    #[error("non-finite value produced during {stage}")]
    NumericInstability { stage: Stage },
}

impl FitError {
    /// Attach the input position of the primitive that failed.
    pub fn at(index: usize, err: PrimitiveError) -> Self {
        match err {
            PrimitiveError::Degenerate { kind, measure } => FitError::DegeneratePrimitive {
                index,
                kind,
                measure,
            },
            PrimitiveError::UnsupportedDimension { kind, dimension } => {
                FitError::UnsupportedDimension {
                    index,
                    kind,
                    dimension,
                }
            }
        }
    }
}
