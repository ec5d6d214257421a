//! Comparison of atomic crystal structures by minimum-cost bipartite
//! matching.
//!
//! Two components, both pure functions:
//!
//! - [`linear_sum_assignment`] solves the rectangular linear sum assignment
//!   problem for an arbitrary `m x n` cost matrix, with `+inf` entries
//!   marking forbidden pairings.
//! - [`calculate_rmsd`] matches the sites of two structures one-to-one,
//!   comparing against caller-supplied candidate periodic images and
//!   forbidding cross-species pairs, and reduces the optimal matching to an
//!   RMSD and a site permutation.
//!
//! [`wrap_positions`] reduces positions into the unit cell beforehand when
//! the input is not already wrapped.
//!
//! ```
//! use crystalmatch::{calculate_rmsd, LatticeImage, Site, Structure};
//! use nalgebra::{Matrix3, Point3};
//!
//! let cell = Matrix3::<f64>::identity() * 10.0;
//! let p = Structure::new(vec![Site::new(Point3::new(0.1, 0.0, 0.0), 26)]);
//! let q = Structure::new(vec![Site::new(Point3::new(9.9, 0.0, 0.0), 26)]);
//! let images: Vec<_> = [[0, 0, 0], [-1, 0, 0]]
//!     .into_iter()
//!     .map(|offset| LatticeImage::from_offset(&cell, offset))
//!     .collect();
//!
//! let result = calculate_rmsd(&p, &q, &images).unwrap();
//! assert!((result.rmsd - 0.2).abs() < 1e-12);
//! assert_eq!(result.permutation, vec![0]);
//! ```

pub mod assignment;
pub mod error;
pub mod matching;
pub mod wrap;

pub use assignment::{linear_sum_assignment, Assignment};
pub use error::{Error, Result};
pub use matching::{calculate_rmsd, LatticeImage, MatchResult, Site, Structure};
pub use wrap::wrap_positions;
