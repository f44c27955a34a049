//! Derived per-segment statistics.
//!
//! Statistics are produced by a collaborator behind the [`StatsCollector`]
//! trait so downstream consumers can plug in richer measurements (mesh
//! area, hull perimeter) without touching the segmentation core.
//! [`ExtentStats`] is the built-in implementation.

use nalgebra::Vector3;

use crate::models::SegmentShape;
use crate::types::Point;

/// Summary measurements of one extracted segment.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentStats {
    pub point_count: usize,
    /// Axis-aligned bounding box of the inlier points.
    pub extent_min: Point,
    pub extent_max: Point,
    /// Crude surface-area estimate derived from the fitted parameters and
    /// the inlier extent.
    pub surface_estimate: f64,
}

/// Computes statistics for an accepted segment.
pub trait StatsCollector {
    fn collect(&self, shape: &SegmentShape, points: &[Point]) -> SegmentStats;
}

/// Bounding-box based statistics.
///
/// Planes estimate area from the in-plane extent rectangle; cylinders from
/// the lateral surface over the inliers' axial extent.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExtentStats;

impl StatsCollector for ExtentStats {
    fn collect(&self, shape: &SegmentShape, points: &[Point]) -> SegmentStats {
        let (extent_min, extent_max) = bounding_box(points);
        let surface_estimate = match shape {
            SegmentShape::Plane(plane) => planar_extent_area(plane.normal(), points),
            SegmentShape::Cylinder(cyl) => {
                let span = axial_span(cyl.axis(), points);
                2.0 * std::f64::consts::PI * cyl.radius() * span
            }
        };
        SegmentStats {
            point_count: points.len(),
            extent_min,
            extent_max,
            surface_estimate,
        }
    }
}

fn bounding_box(points: &[Point]) -> (Point, Point) {
    let mut min = Point::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
    let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        for i in 0..3 {
            min[i] = min[i].min(p[i]);
            max[i] = max[i].max(p[i]);
        }
    }
    if points.is_empty() {
        (Point::origin(), Point::origin())
    } else {
        (min, max)
    }
}

/// Area of the axis-aligned rectangle spanned by the points in the plane's
/// own coordinate frame.
fn planar_extent_area(normal: &Vector3<f64>, points: &[Point]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    let helper = if normal.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let u = normal.cross(&helper).normalize();
    let v = normal.cross(&u);

    let (mut u_min, mut u_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut v_min, mut v_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in points {
        let pu = p.coords.dot(&u);
        let pv = p.coords.dot(&v);
        u_min = u_min.min(pu);
        u_max = u_max.max(pu);
        v_min = v_min.min(pv);
        v_max = v_max.max(pv);
    }
    (u_max - u_min) * (v_max - v_min)
}

fn axial_span(axis: &Vector3<f64>, points: &[Point]) -> f64 {
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in points {
        let t = p.coords.dot(axis);
        lo = lo.min(t);
        hi = hi.max(t);
    }
    if points.is_empty() {
        0.0
    } else {
        hi - lo
    }
}
