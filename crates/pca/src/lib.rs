//! Linear least-squares fitting of lines and planes by principal component
//! analysis over weighted geometric primitives.
//!
//! Every primitive is treated as a uniform mass distribution at a chosen
//! [`FitDimension`]: its vertices, its edges, its faces or its solid
//! interior. The fit is driven by the covariance of the combined mass:
//!
//! - [`moment`]: mass and raw moments of each primitive about the origin
//! - [`covariance`]: summation and the parallel-axis correction
//! - [`eigen`]: closed-form symmetric eigensolver for 2x2 and 3x3 matrices
//! - [`fit`]: choice of line or plane and its quality score
//! - [`fitter`]: [`Fitter`], the entry point tying the stages together
//!
//! ```
//! use cad_pca::{FitDimension, Fitter, Primitive2d};
//!
//! let fit = Fitter::default()
//!     .fit_line_2d(&[Primitive2d::segment([0.0, 0.0], [2.0, 0.0])], FitDimension::Curves)
//!     .unwrap();
//! assert_eq!(fit.quality, 1.0);
//! ```

pub mod config;
pub mod covariance;
pub mod eigen;
pub mod error;
pub mod fit;
pub mod fitter;
pub mod moment;
pub mod primitive;

pub use nalgebra;

pub use config::{FitConfig, FitTolerance};
pub use covariance::{accumulate, build_covariance, Covariance};
pub use eigen::{
    decompose, symmetric_eigen_2, symmetric_eigen_3, EigenDecomposition, SymmetricEigenSolver,
};
pub use error::{FitError, PrimitiveError, Stage};
pub use fit::{select_line, select_plane, FitKind, FitResult, Fitted3d, Line, Plane};
pub use fitter::Fitter;
pub use moment::{moment_of, MomentSource, Moments};
pub use primitive::{
    Ball, FitDimension, IsoBox, Primitive2d, Primitive3d, PrimitiveKind, Segment, Tetrahedron,
    Triangle, WeightedPoint,
};
