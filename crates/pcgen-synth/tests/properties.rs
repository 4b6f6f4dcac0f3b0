//! Property tests for the frame construction and both generators.

use nalgebra::Vector3;
use pcgen_synth::{build_plane, build_sphere, OrthonormalFrame, PlaneSpec, SphereSpec, CANONICAL_NORMAL};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const TOL: f64 = 1e-6;

// ----- Strategy helpers -----

/// Zero, or `±m·10^e` with `m` in `[0.001, 1)` and `e` across most of the f64 range.
fn arb_component() -> impl Strategy<Value = f64> {
    prop_oneof![
        1 => Just(0.0),
        4 => (0.001f64..1.0, -150i32..150, any::<bool>()).prop_map(|(m, e, neg)| {
            let v = m * 10f64.powi(e);
            if neg { -v } else { v }
        }),
    ]
}

/// Normals with an in-plane component, so a frame exists.
fn arb_normal() -> impl Strategy<Value = [f64; 3]> {
    (arb_component(), arb_component(), arb_component())
        .prop_filter("normal parallel to z has no frame", |(x, y, _)| *x != 0.0 || *y != 0.0)
        .prop_map(|(x, y, z)| [x, y, z])
}

fn arb_plane_spec() -> impl Strategy<Value = PlaneSpec> {
    let normal = prop_oneof![
        1 => Just(CANONICAL_NORMAL),
        4 => (-1.0f64..1.0, -1.0f64..1.0, -1.0f64..1.0)
            .prop_filter("needs an in-plane component", |(x, y, _)| x.abs() + y.abs() > 1e-6)
            .prop_map(|(x, y, z)| [x, y, z]),
    ];
    (
        normal,
        (-10.0f64..10.0, -10.0f64..10.0, -10.0f64..10.0),
        0.0f64..10.0,
        0.0f64..10.0,
        0.0f64..1.0,
        0usize..200,
    )
        .prop_map(|(normal, (ox, oy, oz), extent_x, extent_y, noise_z, point_count)| PlaneSpec {
            normal,
            offset: [ox, oy, oz],
            extent_x,
            extent_y,
            noise_z,
            point_count,
        })
}

fn arb_sphere_spec() -> impl Strategy<Value = SphereSpec> {
    (0.01f64..100.0, 0.0f64..1.0, 0usize..25).prop_map(|(radius, radius_noise, sample_count)| {
        SphereSpec { radius, radius_noise, sample_count }
    })
}

fn v64([x, y, z]: [f32; 3]) -> Vector3<f64> {
    Vector3::new(x as f64, y as f64, z as f64)
}

// ----- Frame -----

proptest! {
    #[test]
    fn frame_is_orthonormal_for_any_magnitude(n in arb_normal()) {
        let f = OrthonormalFrame::from_normal(n).unwrap();
        for axis in [f.x_axis, f.y_axis, f.z_axis] {
            prop_assert!((axis.norm() - 1.0).abs() < TOL, "{n:?}: |axis| = {}", axis.norm());
        }
        prop_assert!(f.x_axis.dot(&f.y_axis).abs() < TOL);
        prop_assert!(f.y_axis.dot(&f.z_axis).abs() < TOL);
        prop_assert!(f.x_axis.dot(&f.z_axis).abs() < TOL);
        prop_assert!((f.x_axis.cross(&f.y_axis) - f.z_axis).norm() < TOL, "{n:?} is not right-handed");
        prop_assert!(f.x_axis.z == 0.0);

        let v = Vector3::from(n);
        let dir = (v / v.amax()).normalize();
        prop_assert!((f.z_axis - dir).norm() < TOL, "{n:?}: z = {:?}", f.z_axis);
        prop_assert!((f.rotation().determinant() - 1.0).abs() < TOL);
    }
}

// ----- Generators -----

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn plane_points_stay_in_noise_band(spec in arb_plane_spec(), seed in any::<u64>()) {
        let c = build_plane(&spec, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap();
        prop_assert_eq!(c.len(), spec.point_count);

        let n = Vector3::from(spec.normal).normalize();
        let offset = Vector3::from(spec.offset);
        let half_noise = spec.noise_z / 2.0;
        let reach = (spec.extent_x.powi(2) + spec.extent_y.powi(2) + spec.noise_z.powi(2)).sqrt() / 2.0;
        let jitter = c.intensity().unwrap_or(&[]);
        for (i, p) in c.points().enumerate() {
            let local = v64(p) - offset;
            let d = local.dot(&n);
            prop_assert!(d.abs() <= half_noise + 1e-5, "point {i}: distance {d} outside +/-{half_noise}");
            prop_assert!(local.norm() <= reach + 1e-5, "point {i} lies outside the patch");
            prop_assert!((d - jitter[i] as f64).abs() < 1e-5, "point {i}: intensity is not the jitter");
        }
    }

    #[test]
    fn sphere_points_stay_in_shell(spec in arb_sphere_spec(), seed in any::<u64>()) {
        let c = build_sphere(&spec, &mut ChaCha8Rng::seed_from_u64(seed)).unwrap();
        prop_assert_eq!(c.len(), spec.sample_count * spec.sample_count);

        let tol = 1e-6 * (spec.radius + spec.radius_noise);
        let jitter = c.intensity().unwrap_or(&[]);
        for (i, p) in c.points().enumerate() {
            let r = v64(p).norm();
            prop_assert!(r >= spec.radius - tol && r <= spec.radius + spec.radius_noise + tol,
                "point {i}: r = {r} outside [{}, {}]", spec.radius, spec.radius + spec.radius_noise);
            let j = jitter[i] as f64;
            prop_assert!(j >= 0.0 && j <= spec.radius_noise * (1.0 + 1e-6));
            prop_assert!((r - spec.radius - j).abs() <= tol, "point {i}: intensity is not the radial jitter");
        }
    }
}
