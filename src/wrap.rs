//! Reduction of positions into the unit cell.

use nalgebra::{Matrix3, Point3, RealField};
use num_traits::Float;

use crate::error::{Error, Result};

/// Wraps every position into the cell spanned by the rows of `cell`.
///
/// Each position is mapped to fractional coordinates, reduced into
/// `[0, 1)`, and mapped back, so the output differs from the input by
/// integer combinations of lattice vectors only.
pub fn wrap_positions<T>(positions: &mut [Point3<T>], cell: &Matrix3<T>) -> Result<()>
where
    T: RealField + Float + Copy,
{
    // row-vector convention: cartesian = fractional * cell
    let basis = cell.transpose();
    let lu = basis.lu();
    if !lu.is_invertible() {
        return Err(Error::SingularCell);
    }
    for position in positions.iter_mut() {
        let fractional = lu.solve(&position.coords).ok_or(Error::SingularCell)?;
        let wrapped = fractional.map(unit_interval);
        *position = Point3::from(basis * wrapped);
    }
    Ok(())
}

/// Reduces `x` into `[0, 1)`. `x - floor(x)` alone rounds up to exactly 1.0
/// for tiny negative inputs.
fn unit_interval<T: Float>(x: T) -> T {
    let f = x - x.floor();
    if f >= T::one() {
        f - T::one()
    } else {
        f
    }
}
