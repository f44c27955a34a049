//! Integration tests over synthetic scenes.
//!
//! Scenes are generated deterministically (sinusoidal pseudo-noise, lattice
//! outliers) so the assertions hold for every seeded run.

use primfit::{
    fit_cylinder, fit_plane, segment_cloud, Cloud, CylinderSettings, Error, Normal, PlaneSettings,
    Point, SegmenterSettings, ShapeKind,
};

/// 20x20 grid on z = 0 with +-0.002 vertical noise.
fn noisy_plane_points() -> Vec<Point> {
    let mut points = Vec::new();
    for i in 0..20 {
        for j in 0..20 {
            let wobble = 0.002 * ((7 * i + 13 * j) as f64).sin();
            points.push(Point::new(i as f64 * 0.05, j as f64 * 0.05, wobble));
        }
    }
    points
}

/// Isolated far-away junk points on a coarse lattice (spacing 0.5, well
/// above the connectivity eps).
fn lattice_outliers(count: usize, origin: [f64; 3]) -> Vec<Point> {
    (0..count)
        .map(|i| {
            Point::new(
                origin[0] + 0.5 * (i % 5) as f64,
                origin[1] + 0.5 * ((i / 5) % 5) as f64,
                origin[2] + 0.5 * (i / 25) as f64,
            )
        })
        .collect()
}

/// Points on a cylinder around the z axis: `rings` rings of `arc` points,
/// ring spacing 0.05, with their outward radial normals.
fn cylinder_surface(
    center: [f64; 3],
    radius: f64,
    arc: usize,
    rings: usize,
) -> (Vec<Point>, Vec<Normal>) {
    let mut points = Vec::new();
    let mut normals = Vec::new();
    for ring in 0..rings {
        let z = center[2] + ring as f64 * 0.05;
        for k in 0..arc {
            let theta = k as f64 * std::f64::consts::TAU / arc as f64;
            let (sin, cos) = theta.sin_cos();
            points.push(Point::new(center[0] + radius * cos, center[1] + radius * sin, z));
            normals.push(Normal::new(cos, sin, 0.0));
        }
    }
    (points, normals)
}

#[test]
fn plane_ransac_recovers_a_noisy_plane_among_outliers() {
    let mut points = noisy_plane_points();
    let true_inliers = points.len();
    points.extend(lattice_outliers(40, [5.0, 7.0, 2.0]));
    let cloud = Cloud::new(points);

    let mut settings = PlaneSettings::default();
    settings.ransac.seed = Some(3);
    let estimate = fit_plane(&cloud, &settings).unwrap();

    let plane = estimate.shape.expect("plane should be found");
    assert!(
        plane.normal().z.abs() > 0.999,
        "recovered normal {:?} deviates from +-z",
        plane.normal()
    );

    let recovered = estimate.inliers.iter().filter(|&&i| i < true_inliers).count();
    assert!(
        recovered as f64 >= 0.9 * true_inliers as f64,
        "only {}/{} true inliers recovered",
        recovered,
        true_inliers
    );
    // No isolated outlier survives the connectivity filter.
    assert!(estimate.inliers.iter().all(|&i| i < true_inliers));
}

fn cylinder_test_settings(seed: u64) -> CylinderSettings {
    let mut settings = CylinderSettings::default();
    settings.ransac.seed = Some(seed);
    settings.min_radius = 0.1;
    settings.max_radius = 2.0;
    settings
}

#[test]
fn direct_cylinder_ransac_uses_normals() {
    let (mut points, mut normals) = cylinder_surface([0.0, 0.0, 0.0], 0.5, 48, 15);
    let surface_count = points.len();
    for p in lattice_outliers(60, [4.0, 4.0, 1.0]) {
        points.push(p);
        normals.push(Normal::new(1.0, 1.0, 1.0).normalize());
    }
    let cloud = Cloud::with_normals(points, normals).unwrap();

    let estimate = fit_cylinder(&cloud, &cylinder_test_settings(5)).unwrap();
    let cyl = estimate.shape.expect("cylinder should be found");

    assert!((cyl.radius() - 0.5).abs() / 0.5 < 0.05);
    assert!(cyl.axis().z.abs() > 0.996);
    assert!(estimate.inliers.len() as f64 >= 0.9 * surface_count as f64);
}

#[test]
fn least_squares_cylinder_ransac_works_without_normals() {
    let (mut points, _) = cylinder_surface([0.0, 0.0, 0.0], 0.5, 48, 15);
    let surface_count = points.len();
    points.extend(lattice_outliers(60, [4.0, 4.0, 1.0]));
    let cloud = Cloud::new(points);

    let mut settings = cylinder_test_settings(9);
    settings.ransac.iterations = 60;
    let estimate = fit_cylinder(&cloud, &settings).unwrap();
    let cyl = estimate.shape.expect("cylinder should be found");

    assert!((cyl.radius() - 0.5).abs() / 0.5 < 0.05);
    assert!(cyl.axis().z.abs() > 0.996);
    assert!(estimate.inliers.len() as f64 >= 0.85 * surface_count as f64);
}

fn scene_settings(seed: u64) -> SegmenterSettings {
    let mut settings = SegmenterSettings::default();
    settings.num_planes = 1;
    settings.num_cylinders = 1;
    settings.plane.ransac.seed = Some(seed);
    settings.cylinder.ransac.seed = Some(seed);
    settings.cylinder.min_radius = 0.1;
    settings.cylinder.max_radius = 2.0;
    settings
}

/// A plane, a cylinder, and scattered junk, all with normals.
fn mixed_scene() -> (Vec<Point>, Vec<Normal>, usize, usize) {
    let mut points = Vec::new();
    let mut normals = Vec::new();
    for i in 0..20 {
        for j in 0..20 {
            points.push(Point::new(i as f64 * 0.05, j as f64 * 0.05, -0.5));
            normals.push(Normal::z());
        }
    }
    let plane_count = points.len();

    let (cyl_points, cyl_normals) = cylinder_surface([3.0, 0.0, 0.0], 0.5, 48, 15);
    let cylinder_count = cyl_points.len();
    points.extend(cyl_points);
    normals.extend(cyl_normals);

    for p in lattice_outliers(50, [-5.0, 5.0, 3.0]) {
        points.push(p);
        normals.push(Normal::x());
    }
    (points, normals, plane_count, cylinder_count)
}

#[test]
fn scene_segmentation_extracts_both_primitives() {
    let (points, normals, plane_count, cylinder_count) = mixed_scene();
    let total = points.len();

    let result = segment_cloud(points, Some(normals), &scene_settings(21)).unwrap();

    assert_eq!(result.segments.len(), 2);
    assert_eq!(result.rounds.len(), 2);

    let kinds: Vec<ShapeKind> = result.segments.iter().map(|s| s.shape.kind()).collect();
    assert!(kinds.contains(&ShapeKind::Plane));
    assert!(kinds.contains(&ShapeKind::Cylinder));

    let mut seen = std::collections::HashSet::new();
    for segment in &result.segments {
        for &idx in &segment.indices {
            assert!(seen.insert(idx), "index {} extracted twice", idx);
        }
    }
    assert_eq!(seen.len(), plane_count + cylinder_count);
    assert_eq!(
        result.rounds.last().unwrap().remaining,
        total - plane_count - cylinder_count
    );

    for segment in &result.segments {
        assert_eq!(segment.stats.point_count, segment.indices.len());
        assert!(segment.stats.surface_estimate > 0.0);
    }
}

#[test]
fn cylinder_quota_alone_terminates_after_one_round() {
    let (mut points, mut normals) = cylinder_surface([0.0, 0.0, 0.0], 0.5, 48, 15);
    for p in lattice_outliers(30, [4.0, -4.0, 0.0]) {
        points.push(p);
        normals.push(Normal::y());
    }

    let mut settings = scene_settings(2);
    settings.num_planes = 0;
    let result = segment_cloud(points, Some(normals), &settings).unwrap();

    assert_eq!(result.segments.len(), 1);
    assert_eq!(result.rounds.len(), 1);
    assert_eq!(result.segments[0].shape.kind(), ShapeKind::Cylinder);
}

#[test]
fn fixed_seeds_reproduce_the_segmentation() {
    let (points, normals, _, _) = mixed_scene();
    let settings = scene_settings(77);

    let a = segment_cloud(points.clone(), Some(normals.clone()), &settings).unwrap();
    let b = segment_cloud(points, Some(normals), &settings).unwrap();

    assert_eq!(a.segments.len(), b.segments.len());
    for (left, right) in a.segments.iter().zip(&b.segments) {
        assert_eq!(left.indices, right.indices);
        assert_eq!(left.shape.kind(), right.shape.kind());
    }
    assert_eq!(a.rounds, b.rounds);
}

#[test]
fn empty_input_yields_an_empty_result() {
    let result = segment_cloud(Vec::new(), None, &scene_settings(1)).unwrap();
    assert!(result.segments.is_empty());
    assert!(result.rounds.is_empty());
}

#[test]
fn mismatched_normals_fail_fast() {
    let err = segment_cloud(
        vec![Point::origin(), Point::new(1.0, 0.0, 0.0)],
        Some(vec![Normal::z()]),
        &scene_settings(1),
    )
    .unwrap_err();
    assert!(matches!(err, Error::NormalCountMismatch { .. }));
}
