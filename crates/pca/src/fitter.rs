use nalgebra::SMatrix;
use tracing::{info, instrument};

use crate::config::FitConfig;
use crate::covariance::{build_covariance, Covariance};
use crate::eigen::{decompose, EigenDecomposition, SymmetricEigenSolver};
use crate::error::FitError;
use crate::fit::{select_line, select_plane, FitKind, FitResult, Fitted3d, Line, Plane};
use crate::moment::MomentSource;
use crate::primitive::{FitDimension, Primitive2d, Primitive3d};

/// Linear least-squares fitting of lines and planes to primitive sets.
///
/// Each call runs the whole pipeline on its own input:
/// - **Accumulate**: per-primitive mass and raw moments about the origin.
/// - **Covariance**: centroid and the parallel-axis correction.
/// - **Decompose**: closed-form eigendecomposition of the covariance.
/// - **Select**: fitted shape and quality from the principal components.
#[derive(Debug, Clone, Default)]
pub struct Fitter {
    config: FitConfig,
}

impl Fitter {
    pub fn new(config: FitConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FitConfig {
        &self.config
    }

    /// Best-fit line through 2D primitives.
    #[instrument(skip(self, primitives), fields(count = primitives.len()))]
    pub fn fit_line_2d(
        &self,
        primitives: &[Primitive2d],
        dimension: FitDimension,
    ) -> Result<FitResult<Line<2>, 2>, FitError> {
        let (covariance, eigen) = self.principal_components(primitives, dimension)?;
        let fit = select_line(&covariance, &eigen, &self.config.tolerance);
        info!(
            quality = fit.quality,
            total_weight = fit.total_weight,
            isotropic = fit.isotropic,
            "2d line fit complete"
        );
        Ok(fit)
    }

    /// Best-fit line through 3D primitives.
    #[instrument(skip(self, primitives), fields(count = primitives.len()))]
    pub fn fit_line_3d(
        &self,
        primitives: &[Primitive3d],
        dimension: FitDimension,
    ) -> Result<FitResult<Line<3>, 3>, FitError> {
        let (covariance, eigen) = self.principal_components(primitives, dimension)?;
        let fit = select_line(&covariance, &eigen, &self.config.tolerance);
        info!(
            quality = fit.quality,
            total_weight = fit.total_weight,
            isotropic = fit.isotropic,
            "3d line fit complete"
        );
        Ok(fit)
    }

    /// Best-fit plane through 3D primitives.
    #[instrument(skip(self, primitives), fields(count = primitives.len()))]
    pub fn fit_plane_3d(
        &self,
        primitives: &[Primitive3d],
        dimension: FitDimension,
    ) -> Result<FitResult<Plane, 3>, FitError> {
        let (covariance, eigen) = self.principal_components(primitives, dimension)?;
        let fit = select_plane(&covariance, &eigen, &self.config.tolerance);
        info!(
            quality = fit.quality,
            total_weight = fit.total_weight,
            isotropic = fit.isotropic,
            "3d plane fit complete"
        );
        Ok(fit)
    }

    /// Best-fit line or plane through 3D primitives, chosen at runtime.
    pub fn fit_3d(
        &self,
        primitives: &[Primitive3d],
        dimension: FitDimension,
        kind: FitKind,
    ) -> Result<FitResult<Fitted3d, 3>, FitError> {
        match kind {
            FitKind::Line => Ok(self.fit_line_3d(primitives, dimension)?.map_shape(Fitted3d::Line)),
            FitKind::Plane => {
                Ok(self.fit_plane_3d(primitives, dimension)?.map_shape(Fitted3d::Plane))
            }
        }
    }

    fn principal_components<const D: usize, P>(
        &self,
        primitives: &[P],
        dimension: FitDimension,
    ) -> Result<(Covariance<D>, EigenDecomposition<D>), FitError>
    where
        P: MomentSource<D> + Sync,
        SMatrix<f64, D, D>: SymmetricEigenSolver<D>,
    {
        let covariance = build_covariance(primitives, dimension, &self.config)?;
        let eigen = decompose(&covariance, &self.config.tolerance)?;
        Ok((covariance, eigen))
    }
}
