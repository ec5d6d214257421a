use crystalmatch::{calculate_rmsd, wrap_positions, LatticeImage, Site, Structure};
use nalgebra::{Matrix3, Point3, Vector3};

const SIDE: usize = 3;

fn main() {
    let cell = Matrix3::identity() * SIDE as f64;

    // rock-salt arrangement
    let mut sites = Vec::with_capacity(SIDE * SIDE * SIDE);
    for x in 0..SIDE {
        for y in 0..SIDE {
            for z in 0..SIDE {
                let species = if (x + y + z) % 2 == 0 { 11 } else { 17 };
                sites.push(Site::new(
                    Point3::new(x as f64 + 0.5, y as f64 + 0.5, z as f64 + 0.5),
                    species,
                ));
            }
        }
    }
    let p = Structure::new(sites.clone());

    // push a copy across the cell boundary, then wrap it back in
    let mut positions: Vec<Point3<f64>> = sites
        .iter()
        .map(|s| s.position + Vector3::new(SIDE as f64 - 0.1, 0., 0.))
        .collect();
    wrap_positions(&mut positions, &cell).expect("cell is invertible");
    let q = Structure::new(
        positions
            .into_iter()
            .zip(&sites)
            .map(|(position, site)| Site::new(position, site.species))
            .collect(),
    );

    let mut images = Vec::with_capacity(27);
    for x in -1..=1 {
        for y in -1..=1 {
            for z in -1..=1 {
                images.push(LatticeImage::from_offset(&cell, [x, y, z]));
            }
        }
    }

    let result = calculate_rmsd(&p, &q, &images).expect("species multisets agree");
    println!("rmsd: {}", result.rmsd);
    println!("permutation: {:?}", result.permutation);
}
