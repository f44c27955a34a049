//! Plane estimation from a minimal 3-point sample.

use nalgebra::{Matrix3, Unit, Vector3, SVD};

use crate::core::ShapeFitter;
use crate::models::{undirected_angle_deg, Plane};
use crate::types::{Cloud, Point};

use super::points_are_distinct;

/// Fits a plane through 3 points by orthogonal regression.
///
/// The centered sample matrix is decomposed with an SVD; the right singular
/// vector of the smallest singular value is the plane normal. When the
/// cloud carries normals, a sample is additionally rejected if any of its
/// point normals deviates from the fitted plane normal by more than
/// `alpha_deg` degrees.
pub struct PlaneFitter {
    alpha_deg: f64,
}

impl PlaneFitter {
    pub fn new(alpha_deg: f64) -> Self {
        Self { alpha_deg }
    }
}

impl Default for PlaneFitter {
    fn default() -> Self {
        Self::new(crate::settings::PlaneSettings::default().alpha_deg)
    }
}

impl ShapeFitter for PlaneFitter {
    type Shape = Plane;

    fn sample_size(&self) -> usize {
        3
    }

    fn is_valid_sample(&self, cloud: &Cloud, sample: &[usize]) -> bool {
        sample.len() == 3 && points_are_distinct(cloud, sample)
    }

    fn fit(&self, cloud: &Cloud, sample: &[usize]) -> Option<Plane> {
        if sample.len() != 3 {
            return None;
        }
        let p0 = cloud.point(sample[0]).coords;
        let p1 = cloud.point(sample[1]).coords;
        let p2 = cloud.point(sample[2]).coords;
        let centroid = (p0 + p1 + p2) / 3.0;

        let centered = Matrix3::from_rows(&[
            (p0 - centroid).transpose(),
            (p1 - centroid).transpose(),
            (p2 - centroid).transpose(),
        ]);
        let svd = SVD::new(centered, false, true);
        let v_t = svd.v_t?;
        let s = svd.singular_values;
        // Collinear samples leave only one significant singular value; the
        // normal direction is then undefined.
        if s[0] < 1e-15 || s[1] < 1e-9 * s[0] {
            return None;
        }

        let normal = Vector3::new(v_t[(2, 0)], v_t[(2, 1)], v_t[(2, 2)]);
        if normal.norm() < 1e-12 {
            return None;
        }
        let normal = Unit::new_normalize(normal);

        if cloud.has_normals() {
            for &idx in sample {
                let point_normal = cloud.normal(idx)?;
                if undirected_angle_deg(&normal, point_normal) > self.alpha_deg {
                    return None;
                }
            }
        }

        let d = -normal.dot(&centroid);
        Some(Plane::from_unit(normal, d))
    }

    fn distance(&self, shape: &Plane, point: &Point) -> f64 {
        shape.distance(point)
    }
}
