//! Verification harness for the PCA fitting engine.
//!
//! Provides independent reference computations and pass/fail oracles so
//! tests can check fits against something other than the engine itself.
//!
//! # Key Components
//!
//! - [`oracle`]: verification functions returning pass/fail verdicts
//! - [`reference`]: exact low-order quadrature of primitive moments
//! - [`helpers`]: rigid motions and scaling of primitives and fitted shapes
//! - [`assertions`]: fit-and-check helpers with contextual diagnostics

pub mod assertions;
pub mod helpers;
pub mod oracle;
pub mod reference;

pub use helpers::HarnessError;
pub use oracle::OracleVerdict;
pub use reference::ReferenceStats;
