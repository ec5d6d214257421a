//! Error types for crystalmatch.

use thiserror::Error;

/// Result type alias using the crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the assignment solver and the structure matcher.
///
/// Every error aborts the whole solve; no partial assignment or partially
/// accumulated cost is ever returned alongside one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Cost matrix with a zero dimension.
    #[error("cost matrix must have nonzero dimensions, got {rows} x {cols}")]
    EmptyCostMatrix {
        /// Number of rows in the rejected matrix
        rows: usize,
        /// Number of columns in the rejected matrix
        cols: usize,
    },

    /// Cost matrix containing NaN or negative-infinity entries.
    ///
    /// `+inf` is the forbidden-pairing sentinel and is accepted; every other
    /// non-finite value is malformed input.
    #[error("cost matrix contains NaN or -inf entries")]
    InvalidCost,

    /// No complete assignment exists that avoids the forbidden pairings.
    #[error("no feasible assignment exists under the forbidden pairings")]
    Infeasible,

    /// Structures to be matched disagree on the number of sites.
    #[error("structures must contain the same number of sites: {lhs} vs {rhs}")]
    SiteCountMismatch {
        /// Site count of the first structure
        lhs: usize,
        /// Site count of the second structure
        rhs: usize,
    },

    /// An empty candidate image set was supplied to the matcher.
    #[error("at least one lattice image is required")]
    NoImages,

    /// The cell matrix does not span three dimensions.
    #[error("cell matrix is singular")]
    SingularCell,

    /// Internal solver invariant violated. Indicates a defect, not bad input.
    #[error("numerical failure: {0}")]
    Numerical(String),
}
