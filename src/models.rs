//! Geometric primitive models.
//!
//! Model types are lightweight parameter holders with their point-distance
//! functions. Construction normalizes the stored representation (unit
//! normal/axis) so that distances are invariant under reparametrization of
//! the same geometric surface.

use nalgebra::{Unit, Vector3};

use crate::types::{Normal, Point};

/// Plane `a·x + b·y + c·z + d = 0` with unit normal `(a, b, c)`.
#[derive(Clone, Debug)]
pub struct Plane {
    normal: Unit<Vector3<f64>>,
    d: f64,
}

impl Plane {
    /// Build a plane from an (unnormalized) normal and offset, rescaling
    /// both so the stored normal is unit length. Returns `None` for a
    /// near-zero normal.
    pub fn new(normal: Vector3<f64>, d: f64) -> Option<Self> {
        let len = normal.norm();
        if len < 1e-12 || !len.is_finite() {
            return None;
        }
        Some(Self {
            normal: Unit::new_unchecked(normal / len),
            d: d / len,
        })
    }

    /// Build from an already-unit normal.
    pub fn from_unit(normal: Unit<Vector3<f64>>, d: f64) -> Self {
        Self { normal, d }
    }

    pub fn normal(&self) -> &Vector3<f64> {
        &self.normal
    }

    pub fn offset(&self) -> f64 {
        self.d
    }

    /// Perpendicular distance from a point to the plane.
    pub fn distance(&self, p: &Point) -> f64 {
        (self.normal.dot(&p.coords) + self.d).abs()
    }
}

/// Cylinder given by a unit axis direction, a point on the axis, and a
/// positive radius.
#[derive(Clone, Debug)]
pub struct Cylinder {
    axis: Unit<Vector3<f64>>,
    center: Point,
    radius: f64,
}

impl Cylinder {
    /// Build a cylinder, normalizing the axis. Returns `None` for a
    /// near-zero axis or a non-positive radius.
    pub fn new(axis: Vector3<f64>, center: Point, radius: f64) -> Option<Self> {
        if axis.norm() < 1e-12 || !axis.norm().is_finite() {
            return None;
        }
        if !(radius > 0.0) || !radius.is_finite() {
            return None;
        }
        Some(Self {
            axis: Unit::new_normalize(axis),
            center,
            radius,
        })
    }

    pub fn axis(&self) -> &Vector3<f64> {
        &self.axis
    }

    pub fn center(&self) -> &Point {
        &self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Distance of a point from the axis line.
    pub fn radial_distance(&self, p: &Point) -> f64 {
        let v = p - self.center;
        let axial = v.dot(&self.axis);
        (v - self.axis.into_inner() * axial).norm()
    }

    /// Distance of a point to the cylinder surface.
    pub fn distance(&self, p: &Point) -> f64 {
        (self.radial_distance(p) - self.radius).abs()
    }
}

/// A fitted primitive, tagged by shape family.
#[derive(Clone, Debug)]
pub enum SegmentShape {
    Plane(Plane),
    Cylinder(Cylinder),
}

impl SegmentShape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            SegmentShape::Plane(_) => ShapeKind::Plane,
            SegmentShape::Cylinder(_) => ShapeKind::Cylinder,
        }
    }

    pub fn distance(&self, p: &Point) -> f64 {
        match self {
            SegmentShape::Plane(plane) => plane.distance(p),
            SegmentShape::Cylinder(cyl) => cyl.distance(p),
        }
    }
}

/// Shape family discriminant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeKind {
    Plane,
    Cylinder,
}

/// Angle in degrees between two directions, ignoring orientation.
///
/// Uses the arccos of the clamped absolute dot product of the unit vectors,
/// so the result lies in `[0, 90]`.
pub(crate) fn undirected_angle_deg(a: &Normal, b: &Normal) -> f64 {
    let na = a.norm();
    let nb = b.norm();
    if na < 1e-12 || nb < 1e-12 {
        return 90.0;
    }
    let cos = (a.dot(b) / (na * nb)).abs().clamp(0.0, 1.0);
    cos.acos().to_degrees()
}
