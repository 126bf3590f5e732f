//! Configuration for the fitting engine.

use serde::{Deserialize, Serialize};

/// Tolerance thresholds used while measuring primitives and classifying fits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitTolerance {
    /// Relative eigenvalue difference below which two eigenvalues are treated
    /// as equal. Decides both the isotropic fallback and which eigenvalues
    /// the solver gives a shared, axis-built eigenspace basis. Zero means
    /// exact equality.
    pub isotropy: f64,
    /// A primitive must have a length/area/volume strictly greater than this.
    pub min_measure: f64,
    /// Relative eigenvalue gap below which the 3x3 solver abandons the
    /// closed-form path for Jacobi rotations. Only selects the solution path;
    /// eigenvalues closer than this still keep their computed eigenvectors
    /// unless they are equal under `isotropy`.
    pub eigen_gap: f64,
}

impl Default for FitTolerance {
    fn default() -> Self {
        Self {
            isotropy: 1e-9,
            min_measure: 0.0,
            eigen_gap: 1e-6,
        }
    }
}

impl FitTolerance {
    /// Whether `a` and `b` are equal relative to the larger of the two.
    ///
    /// Two zeros are always equal, so an all-zero spectrum is isotropic.
    pub fn nearly_equal(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.isotropy * a.abs().max(b.abs())
    }

    /// Whether `measure` is large enough for a primitive to carry mass.
    /// NaN never is.
    pub fn admits_measure(&self, measure: f64) -> bool {
        measure > self.min_measure && measure.is_finite()
    }
}

/// Configuration for a [`Fitter`](crate::Fitter).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitConfig {
    /// Tolerance thresholds.
    pub tolerance: FitTolerance,
    /// Input length at which accumulation switches to a parallel reduction.
    /// Only consulted when the `parallel` feature is enabled.
    pub parallel_threshold: usize,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            tolerance: FitTolerance::default(),
            parallel_threshold: 4096,
        }
    }
}

impl FitConfig {
    /// Exact eigenvalue comparison: a fit is isotropic only when the
    /// relevant eigenvalues are bit-identical.
    pub fn exact() -> Self {
        Self {
            tolerance: FitTolerance {
                isotropy: 0.0,
                ..FitTolerance::default()
            },
            ..Self::default()
        }
    }

    /// Never use the parallel reduction, whatever the input size.
    pub fn sequential() -> Self {
        Self {
            parallel_threshold: usize::MAX,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearly_equal_is_relative() {
        let tol = FitTolerance::default();
        assert!(tol.nearly_equal(1.0e6, 1.0e6 + 1.0e-4));
        assert!(!tol.nearly_equal(1.0, 1.0 + 1.0e-6));
        assert!(tol.nearly_equal(0.0, 0.0));
    }

    #[test]
    fn test_exact_preset_requires_identity() {
        let tol = FitConfig::exact().tolerance;
        assert!(tol.nearly_equal(0.25, 0.25));
        assert!(!tol.nearly_equal(0.25, 0.25 + f64::EPSILON));
    }

    #[test]
    fn test_admits_measure_rejects_zero_and_nan() {
        let tol = FitTolerance::default();
        assert!(tol.admits_measure(1e-300));
        assert!(!tol.admits_measure(0.0));
        assert!(!tol.admits_measure(-1.0));
        assert!(!tol.admits_measure(f64::NAN));
        assert!(!tol.admits_measure(f64::INFINITY));
    }

    #[test]
    fn test_config_json_roundtrip_keeps_presets() {
        let config = FitConfig::sequential();
        let json = serde_json::to_string(&config).unwrap();
        let back: FitConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
        assert_eq!(back.parallel_threshold, usize::MAX);
    }
}
