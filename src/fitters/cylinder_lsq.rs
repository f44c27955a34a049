//! Nonlinear least-squares cylinder estimation from 5 points, no normals.

use argmin::core::{CostFunction, Gradient};
use nalgebra::{DVector, Vector3};

use crate::core::ShapeFitter;
use crate::models::Cylinder;
use crate::types::{Cloud, Point};

use super::points_are_distinct;

const PARAM_COUNT: usize = 7; // center xyz, axis xyz, radius
const GRADIENT_EPS: f64 = 1e-8;
const MAX_REFINE_ITERATIONS: usize = 500;

/// Fits a cylinder from 5 points by nonlinear least squares.
///
/// Starting from the sample centroid, a fixed `(0, 0, 1)` axis, and the
/// mean centroid distance as radius, the 7 parameters are refined by
/// minimizing the squared radial residuals with a backtracking
/// gradient-descent loop over a numerically differentiated cost. Solver
/// non-convergence and out-of-bounds radii yield no model.
pub struct LsqCylinderFitter {
    min_radius: f64,
    max_radius: f64,
}

impl LsqCylinderFitter {
    pub fn new(min_radius: f64, max_radius: f64) -> Self {
        Self {
            min_radius,
            max_radius,
        }
    }
}

/// Sum of squared `(radial distance − radius)` residuals over the sample.
struct CylinderResiduals {
    points: Vec<Vector3<f64>>,
}

impl CylinderResiduals {
    fn residual(params: &DVector<f64>, p: &Vector3<f64>) -> Option<f64> {
        let center = Vector3::new(params[0], params[1], params[2]);
        let axis = Vector3::new(params[3], params[4], params[5]);
        let norm = axis.norm();
        if norm < 1e-12 {
            return None;
        }
        let axis = axis / norm;
        let v = p - center;
        let radial = (v - axis * v.dot(&axis)).norm();
        Some(radial - params[6])
    }
}

impl CostFunction for CylinderResiduals {
    type Param = DVector<f64>;
    type Output = f64;

    fn cost(&self, params: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        if params.len() < PARAM_COUNT {
            return Ok(f64::INFINITY);
        }
        let mut total = 0.0;
        for p in &self.points {
            match Self::residual(params, p) {
                Some(r) => total += r * r,
                None => return Ok(f64::INFINITY),
            }
        }
        Ok(total)
    }
}

impl Gradient for CylinderResiduals {
    type Param = DVector<f64>;
    type Gradient = DVector<f64>;

    fn gradient(&self, params: &Self::Param) -> Result<Self::Gradient, argmin::core::Error> {
        let mut grad = DVector::zeros(params.len());
        let base = self.cost(params)?;
        for i in 0..params.len() {
            let mut shifted = params.clone();
            shifted[i] += GRADIENT_EPS;
            grad[i] = (self.cost(&shifted)? - base) / GRADIENT_EPS;
        }
        Ok(grad)
    }
}

/// Backtracking gradient descent on the residual cost.
///
/// Returns the refined parameters, or `None` when the cost never becomes
/// finite or the step size collapses before any progress.
fn refine(cost_fn: &CylinderResiduals, mut params: DVector<f64>) -> Option<DVector<f64>> {
    let mut cost = cost_fn.cost(&params).ok()?;
    if !cost.is_finite() {
        return None;
    }
    let mut step = 0.1;

    for _ in 0..MAX_REFINE_ITERATIONS {
        let grad = cost_fn.gradient(&params).ok()?;
        let grad_norm = grad.norm();
        if !grad_norm.is_finite() {
            return None;
        }
        if grad_norm < 1e-9 || step < 1e-12 {
            break;
        }

        let trial = &params - &(&grad * step);
        let trial_cost = cost_fn.cost(&trial).ok()?;
        if trial_cost.is_finite() && trial_cost < cost {
            params = trial;
            cost = trial_cost;
            step *= 1.2;
        } else {
            step *= 0.5;
        }
    }

    cost.is_finite().then_some(params)
}

impl ShapeFitter for LsqCylinderFitter {
    type Shape = Cylinder;

    fn sample_size(&self) -> usize {
        5
    }

    fn is_valid_sample(&self, cloud: &Cloud, sample: &[usize]) -> bool {
        sample.len() == 5 && points_are_distinct(cloud, sample)
    }

    fn fit(&self, cloud: &Cloud, sample: &[usize]) -> Option<Cylinder> {
        if sample.len() != 5 {
            return None;
        }
        let points: Vec<Vector3<f64>> = sample
            .iter()
            .map(|&i| cloud.point(i).coords)
            .collect();

        let centroid = points.iter().sum::<Vector3<f64>>() / points.len() as f64;
        let mean_spread =
            points.iter().map(|p| (p - centroid).norm()).sum::<f64>() / points.len() as f64;
        if mean_spread < 1e-12 {
            return None;
        }

        let mut initial = DVector::zeros(PARAM_COUNT);
        initial[0] = centroid.x;
        initial[1] = centroid.y;
        initial[2] = centroid.z;
        initial[5] = 1.0; // start from the (0, 0, 1) axis
        initial[6] = mean_spread;

        let cost_fn = CylinderResiduals { points };
        let refined = refine(&cost_fn, initial)?;

        let axis = Vector3::new(refined[3], refined[4], refined[5]);
        if axis.norm() < 1e-9 {
            return None;
        }
        let center = Point::new(refined[0], refined[1], refined[2]);
        let radius = refined[6];
        if radius < self.min_radius || radius > self.max_radius {
            return None;
        }

        Cylinder::new(axis, center, radius)
    }

    fn distance(&self, shape: &Cylinder, point: &Point) -> f64 {
        shape.distance(point)
    }
}
