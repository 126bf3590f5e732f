//! Accumulation of primitive moments and the parallel-axis correction.

use nalgebra::{Point, SMatrix};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::FitConfig;
use crate::error::{FitError, Stage};
use crate::moment::{MomentSource, Moments};
use crate::primitive::FitDimension;

/// Spread of a mass distribution about its centroid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Covariance<const D: usize> {
    pub centroid: Point<f64, D>,
    /// Symmetric, positive semi-definite up to rounding.
    pub tensor: SMatrix<f64, D, D>,
    pub total_weight: f64,
}

impl<const D: usize> Covariance<D> {
    /// Move the origin-relative second moment to the centroid:
    /// `C = S - w * c * c^T` with `c = first / w`.
    pub fn from_moments(moments: &Moments<D>) -> Result<Self, FitError> {
        let total_weight = moments.weight;
        if !(total_weight > 0.0) {
            return Err(FitError::EmptyInput { total_weight });
        }
        if !moments.is_finite() {
            return Err(FitError::NumericInstability {
                stage: Stage::Covariance,
            });
        }

        let c = moments.first / total_weight;
        let raw = moments.second - c * c.transpose() * total_weight;
        let tensor = (raw + raw.transpose()) * 0.5;
        if !tensor.iter().all(|v| v.is_finite()) {
            return Err(FitError::NumericInstability {
                stage: Stage::Covariance,
            });
        }

        Ok(Self {
            centroid: Point::from(c),
            tensor,
            total_weight,
        })
    }
}

/// Sum the moments of every primitive.
///
/// Fails on the first primitive that cannot be measured. With the `parallel`
/// feature and an input of at least `config.parallel_threshold` primitives
/// the sum is a rayon reduction; the reported index is then that of some
/// failing primitive, not necessarily the first.
pub fn accumulate<const D: usize, P>(
    primitives: &[P],
    dimension: FitDimension,
    config: &FitConfig,
) -> Result<Moments<D>, FitError>
where
    P: MomentSource<D> + Sync,
{
    if primitives.is_empty() {
        return Err(FitError::EmptyInput { total_weight: 0.0 });
    }

    #[cfg(feature = "parallel")]
    if primitives.len() >= config.parallel_threshold {
        use rayon::prelude::*;

        debug!(count = primitives.len(), "accumulating moments in parallel");
        return primitives
            .par_iter()
            .enumerate()
            .map(|(index, p)| {
                p.moments(dimension, &config.tolerance)
                    .map_err(|e| FitError::at(index, e))
            })
            .try_reduce(Moments::zero, |a, b| Ok(a + b));
    }

    debug!(count = primitives.len(), "accumulating moments");
    primitives
        .iter()
        .enumerate()
        .try_fold(Moments::zero(), |acc, (index, p)| {
            let m = p
                .moments(dimension, &config.tolerance)
                .map_err(|e| FitError::at(index, e))?;
            Ok(acc + m)
        })
}

/// Centroid, covariance and total weight of a primitive set.
pub fn build_covariance<const D: usize, P>(
    primitives: &[P],
    dimension: FitDimension,
    config: &FitConfig,
) -> Result<Covariance<D>, FitError>
where
    P: MomentSource<D> + Sync,
{
    let moments = accumulate(primitives, dimension, config)?;
    Covariance::from_moments(&moments)
}
