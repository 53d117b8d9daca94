use nalgebra::{Matrix3, Matrix4, Point3, Rotation3, Vector3};
use rand::Rng;

/// Generates a random 3D rotation matrix from three independent axis angles.
///
/// The result is the composition `Rx · (Ry · Rz)` of elementary rotations
/// about the coordinate axes. The x and z angles are drawn uniformly from
/// [0°, 359°), the y angle from [0°, 179°). Randomness comes exclusively
/// from the generator passed in, so callers control seeding and replay.
pub fn random_rotation_matrix(rng: &mut impl Rng) -> Matrix3<f64> {
    let theta_x = rng.gen_range(0.0..359.0f64).to_radians();
    let theta_y = rng.gen_range(0.0..179.0f64).to_radians();
    let theta_z = rng.gen_range(0.0..359.0f64).to_radians();

    let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), theta_x);
    let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), theta_y);
    let rz = Rotation3::from_axis_angle(&Vector3::z_axis(), theta_z);

    (rx * (ry * rz)).into_inner()
}

/// Lifts a 3×3 rotation into a 4×4 homogeneous transform.
///
/// The rotation occupies the top-left block, the bottom-right element is 1,
/// and every other entry is 0, so the transform rotates points about the
/// origin without translating them.
pub fn affine_from_rotation(rotation: &Matrix3<f64>) -> Matrix4<f64> {
    let mut affine = Matrix4::zeros();
    affine.fixed_view_mut::<3, 3>(0, 0).copy_from(rotation);
    affine[(3, 3)] = 1.0;
    affine
}

/// Geometric center of a set of coordinates.
pub fn center_of_coords(coords: &[Point3<f64>]) -> Option<Point3<f64>> {
    if coords.is_empty() {
        return None;
    }
    let sum: Vector3<f64> = coords.iter().map(|p| p.coords).sum();
    Some(Point3::from(sum / coords.len() as f64))
}

pub fn calculate_rmsd(coords1: &[Point3<f64>], coords2: &[Point3<f64>]) -> Option<f64> {
    if coords1.len() != coords2.len() || coords1.is_empty() {
        return None;
    }
    let n = coords1.len() as f64;
    let squared_dist_sum: f64 = coords1
        .iter()
        .zip(coords2.iter())
        .map(|(p1, p2)| (p1 - p2).norm_squared())
        .sum();
    Some((squared_dist_sum / n).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const TOL: f64 = 1e-9;

    #[test]
    fn random_rotations_are_orthonormal_with_unit_determinant() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let r = random_rotation_matrix(&mut rng);
            let should_be_identity = r * r.transpose();
            assert!(
                (should_be_identity - Matrix3::identity()).norm() < TOL,
                "R·Rᵀ deviates from identity: {should_be_identity}"
            );
            assert!((r.determinant() - 1.0).abs() < TOL);
        }
    }

    #[test]
    fn random_rotations_vary_between_draws() {
        let mut rng = StdRng::seed_from_u64(7);
        let a = random_rotation_matrix(&mut rng);
        let b = random_rotation_matrix(&mut rng);
        assert!((a - b).norm() > 1e-6);
    }

    #[test]
    fn same_seed_reproduces_the_same_rotation() {
        let a = random_rotation_matrix(&mut StdRng::seed_from_u64(123));
        let b = random_rotation_matrix(&mut StdRng::seed_from_u64(123));
        assert_eq!(a, b);
    }

    #[test]
    fn affine_embeds_rotation_and_pads_with_identity_row() {
        let mut rng = StdRng::seed_from_u64(1);
        let r = random_rotation_matrix(&mut rng);
        let affine = affine_from_rotation(&r);

        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(affine[(i, j)], r[(i, j)]);
            }
        }
        assert_eq!(affine[(3, 3)], 1.0);
        for k in 0..3 {
            assert_eq!(affine[(3, k)], 0.0);
            assert_eq!(affine[(k, 3)], 0.0);
        }
    }

    #[test]
    fn affine_rotates_points_without_translation() {
        let mut rng = StdRng::seed_from_u64(2);
        let r = random_rotation_matrix(&mut rng);
        let affine = affine_from_rotation(&r);

        let p = Point3::new(1.0, -2.0, 3.0);
        let rotated = Point3::from_homogeneous(affine * p.to_homogeneous()).unwrap();
        let expected = Point3::from(r * p.coords);
        assert!((rotated - expected).norm() < TOL);

        let origin = Point3::from_homogeneous(affine * Point3::origin().to_homogeneous()).unwrap();
        assert!(origin.coords.norm() < TOL);
    }

    #[test]
    fn center_of_coords_averages_positions() {
        let coords = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 4.0, 0.0),
            Point3::new(0.0, 0.0, 8.0),
        ];
        let center = center_of_coords(&coords).unwrap();
        assert_eq!(center, Point3::new(0.5, 1.0, 2.0));
        assert!(center_of_coords(&[]).is_none());
    }

    #[test]
    fn rmsd_of_identical_sets_is_zero() {
        let coords = vec![Point3::new(1.0, 2.0, 3.0), Point3::new(4.0, 5.0, 6.0)];
        assert_eq!(calculate_rmsd(&coords, &coords), Some(0.0));
    }

    #[test]
    fn rmsd_of_uniformly_shifted_set_equals_the_shift() {
        let coords: Vec<_> = (0..10)
            .map(|i| Point3::new(i as f64, 0.0, 0.0))
            .collect();
        let shifted: Vec<_> = coords
            .iter()
            .map(|p| p + Vector3::new(0.0, 3.0, 4.0))
            .collect();
        let rmsd = calculate_rmsd(&coords, &shifted).unwrap();
        assert!((rmsd - 5.0).abs() < TOL);
    }

    #[test]
    fn rmsd_rejects_mismatched_or_empty_sets() {
        let a = vec![Point3::origin()];
        assert!(calculate_rmsd(&a, &[]).is_none());
        assert!(calculate_rmsd(&[], &[]).is_none());
    }
}
