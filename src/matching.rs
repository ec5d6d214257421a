//! Minimum-cost correspondence between two crystal structures.
//!
//! [`calculate_rmsd`] builds a dense site-to-site cost matrix (squared
//! Euclidean distance minimized over the supplied candidate periodic images,
//! `+inf` across species) and reduces the optimal assignment to an RMSD and
//! a site permutation. Which neighbor cells to consider is the caller's
//! decision; this module only consumes the image list.

use log::debug;
use nalgebra::{DMatrix, Matrix3, Point3, Scalar, Vector3};
use num_traits::Float;

use crate::assignment::{linear_sum_assignment, Assignment};
use crate::error::{Error, Result};

/// One atomic site: a position and its chemical species label.
#[derive(Debug, Clone, PartialEq)]
pub struct Site<T: Scalar> {
    pub position: Point3<T>,
    /// Species label, typically the atomic number.
    pub species: i32,
}

impl<T: Scalar> Site<T> {
    pub fn new(position: Point3<T>, species: i32) -> Self {
        Self { position, species }
    }
}

/// An ordered collection of sites. Site order defines the index identity
/// used by [`MatchResult::permutation`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Structure<T: Scalar> {
    sites: Vec<Site<T>>,
}

impl<T: Scalar> Structure<T> {
    pub fn new(sites: Vec<Site<T>>) -> Self {
        Self { sites }
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn sites(&self) -> &[Site<T>] {
        &self.sites
    }
}

/// One candidate periodic image of the unit cell.
///
/// The rows of the matrix are the cell's lattice vectors scaled by the
/// integer offset of the neighbor cell, so the net displacement carried by
/// the image is the sum of the rows. The zero matrix is the cell itself.
#[derive(Debug, Clone, PartialEq)]
pub struct LatticeImage<T: Scalar> {
    basis: Matrix3<T>,
}

impl<T: Scalar + Float> LatticeImage<T> {
    pub fn new(basis: Matrix3<T>) -> Self {
        Self { basis }
    }

    /// Image of the neighbor cell at `offset`, where the rows of `cell` are
    /// the lattice vectors. The offset choice stays with the caller.
    pub fn from_offset(cell: &Matrix3<T>, offset: [i32; 3]) -> Self {
        let mut basis = *cell;
        for (k, &o) in offset.iter().enumerate() {
            let scale = T::from(o).expect("integer cell offset fits in the coordinate scalar");
            for c in 0..3 {
                basis[(k, c)] = basis[(k, c)] * scale;
            }
        }
        Self { basis }
    }

    pub fn basis(&self) -> &Matrix3<T> {
        &self.basis
    }

    /// Net displacement from the home cell to this image.
    pub fn displacement(&self) -> Vector3<T> {
        let b = &self.basis;
        Vector3::new(
            b[(0, 0)] + b[(1, 0)] + b[(2, 0)],
            b[(0, 1)] + b[(1, 1)] + b[(2, 1)],
            b[(0, 2)] + b[(1, 2)] + b[(2, 2)],
        )
    }
}

/// Outcome of a structure match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult<T> {
    /// Root-mean-square deviation over the matched sites.
    pub rmsd: T,
    /// `permutation[i]` is the index of the Q site matched to P site `i`.
    pub permutation: Vec<usize>,
}

/// Matches the sites of `p` one-to-one against the sites of `q`, comparing
/// each Q site at every candidate periodic image, and returns the minimum
/// root-mean-square deviation together with the P-index to Q-index
/// permutation.
///
/// Sites of different species are never matched to one another; if the two
/// species multisets are incompatible the solve fails with
/// [`Error::Infeasible`]. No partial result is returned on any failure.
pub fn calculate_rmsd<T>(
    p: &Structure<T>,
    q: &Structure<T>,
    images: &[LatticeImage<T>],
) -> Result<MatchResult<T>>
where
    T: Scalar + Float,
{
    if p.len() != q.len() {
        return Err(Error::SiteCountMismatch {
            lhs: p.len(),
            rhs: q.len(),
        });
    }
    if images.is_empty() {
        return Err(Error::NoImages);
    }

    debug!(
        "matching {} sites against {} candidate images",
        p.len(),
        images.len()
    );
    let costs = pairwise_costs(p, q, images);

    let mut assignment = Assignment::default();
    linear_sum_assignment(&costs, &mut assignment)?;

    let total = assignment.total_cost(&costs);
    let n = T::from(p.len()).ok_or_else(|| {
        Error::Numerical("site count is not representable in the coordinate scalar".into())
    })?;
    let rmsd = Float::sqrt(total / n);

    let mut permutation = vec![0usize; p.len()];
    for (i, j) in assignment.pairs() {
        permutation[i] = j;
    }

    Ok(MatchResult { rmsd, permutation })
}

/// Dense pairwise cost matrix: entry (i, j) is the squared distance between
/// P site `i` and the nearest candidate image of Q site `j`, or `+inf` when
/// the species differ.
fn pairwise_costs<T>(
    p: &Structure<T>,
    q: &Structure<T>,
    images: &[LatticeImage<T>],
) -> DMatrix<T>
where
    T: Scalar + Float,
{
    let displacements: Vec<Vector3<T>> = images.iter().map(LatticeImage::displacement).collect();
    DMatrix::from_fn(p.len(), q.len(), |i, j| {
        let pi = &p.sites()[i];
        let qj = &q.sites()[j];
        if pi.species != qj.species {
            return T::infinity();
        }
        let mut best = T::infinity();
        for d in &displacements {
            let dx = pi.position.x - (qj.position.x + d.x);
            let dy = pi.position.y - (qj.position.y + d.y);
            let dz = pi.position.z - (qj.position.z + d.z);
            let dist = dx * dx + dy * dy + dz * dz;
            if dist < best {
                best = dist;
            }
        }
        best
    })
}

#[cfg(test)]
mod test {
    use nalgebra::{Matrix3, Point3};

    use super::*;

    const TOL: f64 = 1e-12;

    fn home_cell() -> Vec<LatticeImage<f64>> {
        vec![LatticeImage::from_offset(&(Matrix3::identity() * 10.), [0, 0, 0])]
    }

    fn cubic_images(length: f64) -> Vec<LatticeImage<f64>> {
        let cell = Matrix3::identity() * length;
        let mut images = Vec::with_capacity(27);
        for x in -1..=1 {
            for y in -1..=1 {
                for z in -1..=1 {
                    images.push(LatticeImage::from_offset(&cell, [x, y, z]));
                }
            }
        }
        images
    }

    fn iron_triple() -> Structure<f64> {
        Structure::new(vec![
            Site::new(Point3::new(0.5, 0.5, 0.5), 26),
            Site::new(Point3::new(2.5, 0.5, 0.5), 26),
            Site::new(Point3::new(0.5, 2.5, 0.5), 26),
        ])
    }

    #[test]
    fn identical_structures_match_identically() {
        let p = iron_triple();
        let result = calculate_rmsd(&p, &p, &home_cell()).unwrap();
        assert!(result.rmsd.abs() < TOL);
        assert_eq!(result.permutation, vec![0, 1, 2]);
    }

    #[test]
    fn reordered_sites_recover_the_permutation() {
        let p = iron_triple();
        let reversed = Structure::new(p.sites().iter().rev().cloned().collect());
        let result = calculate_rmsd(&p, &reversed, &home_cell()).unwrap();
        assert!(result.rmsd.abs() < TOL);
        assert_eq!(result.permutation, vec![2, 1, 0]);
    }

    #[test]
    fn wrapped_distance_beats_raw_distance() {
        let cell = Matrix3::identity() * 10.;
        let p = Structure::new(vec![Site::new(Point3::new(0.1, 0., 0.), 26)]);
        let q = Structure::new(vec![Site::new(Point3::new(9.9, 0., 0.), 26)]);
        let images = vec![
            LatticeImage::from_offset(&cell, [0, 0, 0]),
            LatticeImage::from_offset(&cell, [-1, 0, 0]),
        ];
        let result = calculate_rmsd(&p, &q, &images).unwrap();
        assert!((result.rmsd - 0.2).abs() < TOL);
    }

    #[test]
    fn nearest_image_is_chosen_among_many() {
        let p = Structure::new(vec![
            Site::new(Point3::new(0.2, 0.2, 0.2), 8),
            Site::new(Point3::new(3.8, 3.8, 3.8), 8),
        ]);
        // q sits across the far corner; only the (-1, -1, -1) image is close
        let q = Structure::new(vec![
            Site::new(Point3::new(3.9, 3.9, 3.9), 8),
            Site::new(Point3::new(3.8, 3.8, 3.8), 8),
        ]);
        let result = calculate_rmsd(&p, &q, &cubic_images(4.)).unwrap();
        // p[0] matches q[0] wrapped to (-0.1, -0.1, -0.1), 0.3 away per axis
        assert_eq!(result.permutation, vec![0, 1]);
        let expected = (0.27f64 / 2.).sqrt();
        assert!((result.rmsd - expected).abs() < TOL);
    }

    #[test]
    fn swapped_species_force_a_nontrivial_permutation() {
        let p = Structure::new(vec![
            Site::new(Point3::new(0., 0., 0.), 1),
            Site::new(Point3::new(1., 0., 0.), 2),
        ]);
        let q = Structure::new(vec![
            Site::new(Point3::new(0., 0., 0.), 2),
            Site::new(Point3::new(1., 0., 0.), 1),
        ]);
        let result = calculate_rmsd(&p, &q, &home_cell()).unwrap();
        assert_eq!(result.permutation, vec![1, 0]);
        assert!((result.rmsd - 1.).abs() < TOL);
    }

    #[test]
    fn incompatible_species_multisets_are_infeasible() {
        let p = Structure::new(vec![
            Site::new(Point3::new(0., 0., 0.), 1),
            Site::new(Point3::new(1., 0., 0.), 1),
        ]);
        let q = Structure::new(vec![
            Site::new(Point3::new(0., 0., 0.), 1),
            Site::new(Point3::new(1., 0., 0.), 2),
        ]);
        assert_eq!(
            calculate_rmsd(&p, &q, &home_cell()),
            Err(Error::Infeasible)
        );
    }

    #[test]
    fn site_count_mismatch_is_rejected() {
        let p = iron_triple();
        let q = Structure::new(p.sites()[..2].to_vec());
        assert_eq!(
            calculate_rmsd(&p, &q, &home_cell()),
            Err(Error::SiteCountMismatch { lhs: 3, rhs: 2 })
        );
    }

    #[test]
    fn empty_image_set_is_rejected() {
        let p = iron_triple();
        assert_eq!(calculate_rmsd(&p, &p, &[]), Err(Error::NoImages));
    }

    #[test]
    fn empty_structures_are_rejected() {
        let p = Structure::<f64>::default();
        assert_eq!(
            calculate_rmsd(&p, &p, &home_cell()),
            Err(Error::EmptyCostMatrix { rows: 0, cols: 0 })
        );
    }

    #[test]
    fn matching_is_deterministic() {
        let p = iron_triple();
        let q = Structure::new(
            p.sites()
                .iter()
                .map(|s| Site::new(s.position + Vector3::new(0.05, -0.03, 0.), s.species))
                .collect(),
        );
        let images = cubic_images(10.);
        let first = calculate_rmsd(&p, &q, &images).unwrap();
        let second = calculate_rmsd(&p, &q, &images).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn displacement_sums_the_scaled_rows() {
        let cell = Matrix3::new(2., 0., 0., 1., 2., 0., 0., 1., 2.);
        let image = LatticeImage::from_offset(&cell, [1, -1, 2]);
        let d = image.displacement();
        assert!((d.x - 1.).abs() < TOL);
        assert!((d.y - 0.).abs() < TOL);
        assert!((d.z - 4.).abs() < TOL);
    }
}
