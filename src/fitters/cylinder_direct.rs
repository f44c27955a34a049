//! Closed-form cylinder estimation from 3 points with surface normals.

use nalgebra::{Unit, Vector3};

use crate::core::ShapeFitter;
use crate::models::{undirected_angle_deg, Cylinder};
use crate::types::{Cloud, Point};

use super::points_are_distinct;

/// Fits a cylinder from 3 points carrying unit normals.
///
/// The axis is the cross product of two sample normals; surface normals on
/// a cylinder are radial, so all three must lie within `alpha_deg` of
/// perpendicular to the derived axis or the sample is rejected. The center
/// comes from intersecting the two projected point-normal lines in the
/// plane orthogonal to the axis; the radius is the in-plane distance from
/// that center to a projected sample point.
pub struct DirectCylinderFitter {
    alpha_deg: f64,
    min_radius: f64,
    max_radius: f64,
}

impl DirectCylinderFitter {
    pub fn new(alpha_deg: f64, min_radius: f64, max_radius: f64) -> Self {
        Self {
            alpha_deg,
            min_radius,
            max_radius,
        }
    }
}

impl ShapeFitter for DirectCylinderFitter {
    type Shape = Cylinder;

    fn sample_size(&self) -> usize {
        3
    }

    fn is_valid_sample(&self, cloud: &Cloud, sample: &[usize]) -> bool {
        cloud.has_normals() && sample.len() == 3 && points_are_distinct(cloud, sample)
    }

    fn fit(&self, cloud: &Cloud, sample: &[usize]) -> Option<Cylinder> {
        if sample.len() != 3 {
            return None;
        }
        let n0 = *cloud.normal(sample[0])?;
        let n1 = *cloud.normal(sample[1])?;
        let n2 = *cloud.normal(sample[2])?;

        let axis = n0.cross(&n1);
        if axis.norm() < 1e-9 {
            return None; // parallel normal pair, axis undefined
        }
        let axis = Unit::new_normalize(axis);

        for n in [&n0, &n1, &n2] {
            let from_perpendicular = (undirected_angle_deg(&axis, n) - 90.0).abs();
            if from_perpendicular > self.alpha_deg {
                return None;
            }
        }

        // Work in the plane through the origin orthogonal to the axis.
        let flatten = |v: &Vector3<f64>| v - axis.into_inner() * v.dot(&axis);
        let q0 = flatten(&cloud.point(sample[0]).coords);
        let q1 = flatten(&cloud.point(sample[1]).coords);
        let m0 = flatten(&n0);
        let m1 = flatten(&n1);
        if m0.norm() < 1e-9 || m1.norm() < 1e-9 {
            return None;
        }

        // Closest point between the two projected lines q + s*m.
        let w = q0 - q1;
        let a = m0.dot(&m0);
        let b = m0.dot(&m1);
        let c = m1.dot(&m1);
        let d = m0.dot(&w);
        let e = m1.dot(&w);
        let det = a * c - b * b;
        let center = if det.abs() < 1e-6 {
            (q0 + q1) / 2.0
        } else {
            let s = (b * e - c * d) / det;
            let t = (a * e - b * d) / det;
            ((q0 + m0 * s) + (q1 + m1 * t)) / 2.0
        };

        let radius = (q0 - center).norm();
        if radius < self.min_radius || radius > self.max_radius {
            return None;
        }

        Cylinder::new(axis.into_inner(), Point::from(center), radius)
    }

    fn distance(&self, shape: &Cylinder, point: &Point) -> f64 {
        shape.distance(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Normal;
    use approx::assert_relative_eq;

    /// Points on the unit-radius cylinder around the z axis, with their
    /// radial normals.
    fn unit_cylinder_sample() -> Cloud {
        let points = vec![
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.5),
            Point::new(-1.0, 0.0, 1.0),
        ];
        let normals = vec![Normal::x(), Normal::y(), -Normal::x()];
        Cloud::with_normals(points, normals).unwrap()
    }

    #[test]
    fn recovers_axis_center_and_radius() {
        let cloud = unit_cylinder_sample();
        let fitter = DirectCylinderFitter::new(5.0, 0.1, 10.0);
        let cyl = fitter.fit(&cloud, &[0, 1, 2]).unwrap();

        assert_relative_eq!(cyl.axis().z.abs(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(cyl.radius(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(cyl.center().x, 0.0, epsilon = 1e-9);
        assert_relative_eq!(cyl.center().y, 0.0, epsilon = 1e-9);
        for p in cloud.points() {
            assert_relative_eq!(cyl.distance(p), 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn parallel_normals_yield_no_model() {
        let points = vec![
            Point::new(1.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 1.0),
            Point::new(1.0, 0.0, 2.0),
        ];
        let normals = vec![Normal::x(), Normal::x(), Normal::x()];
        let cloud = Cloud::with_normals(points, normals).unwrap();
        let fitter = DirectCylinderFitter::new(5.0, 0.0, f64::INFINITY);
        assert!(fitter.fit(&cloud, &[0, 1, 2]).is_none());
    }

    #[test]
    fn non_radial_third_normal_rejects_the_sample() {
        let points = vec![
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.5),
            Point::new(-1.0, 0.0, 1.0),
        ];
        // Third normal points along the axis instead of radially.
        let normals = vec![Normal::x(), Normal::y(), Normal::z()];
        let cloud = Cloud::with_normals(points, normals).unwrap();
        let fitter = DirectCylinderFitter::new(5.0, 0.0, f64::INFINITY);
        assert!(fitter.fit(&cloud, &[0, 1, 2]).is_none());
    }

    #[test]
    fn out_of_bounds_radius_rejects_the_sample() {
        let cloud = unit_cylinder_sample();
        let fitter = DirectCylinderFitter::new(5.0, 2.0, 10.0);
        assert!(fitter.fit(&cloud, &[0, 1, 2]).is_none());

        let fitter = DirectCylinderFitter::new(5.0, 0.0, 0.5);
        assert!(fitter.fit(&cloud, &[0, 1, 2]).is_none());
    }

    #[test]
    fn clouds_without_normals_are_invalid_samples() {
        let cloud = Cloud::new(vec![
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
            Point::new(0.0, 0.0, 1.0),
        ]);
        let fitter = DirectCylinderFitter::new(5.0, 0.0, f64::INFINITY);
        assert!(!fitter.is_valid_sample(&cloud, &[0, 1, 2]));
    }
}
