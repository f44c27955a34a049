//! Core shared types for primitive segmentation.
//!
//! The segmentation engine operates on plain 3D coordinates; normals are an
//! optional, index-aligned companion array required only by the
//! normal-driven fitters. `Cloud` bundles the two and enforces the
//! parallel-array invariant at construction time.

use nalgebra::{Point3, Vector3};

use crate::error::Error;

/// A 3D point with `f64` coordinates.
pub type Point = Point3<f64>;

/// A 3D surface normal. Expected to be unit length.
pub type Normal = Vector3<f64>;

/// An owned point cloud with optional per-point unit normals.
///
/// Index position is the only point identity; duplicate coordinates are
/// allowed. If normals are present, `normals.len() == points.len()` always
/// holds.
#[derive(Clone, Debug, Default)]
pub struct Cloud {
    points: Vec<Point>,
    normals: Option<Vec<Normal>>,
}

impl Cloud {
    /// Create a cloud from positions only.
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            normals: None,
        }
    }

    /// Create a cloud with index-aligned normals.
    ///
    /// Fails with [`Error::NormalCountMismatch`] when the arrays disagree in
    /// length.
    pub fn with_normals(points: Vec<Point>, normals: Vec<Normal>) -> Result<Self, Error> {
        if points.len() != normals.len() {
            return Err(Error::NormalCountMismatch {
                points: points.len(),
                normals: normals.len(),
            });
        }
        Ok(Self {
            points,
            normals: Some(normals),
        })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn normals(&self) -> Option<&[Normal]> {
        self.normals.as_deref()
    }

    pub fn point(&self, index: usize) -> &Point {
        &self.points[index]
    }

    /// Normal of a point, if the cloud carries normals.
    pub fn normal(&self, index: usize) -> Option<&Normal> {
        self.normals.as_ref().map(|n| &n[index])
    }

    /// Drop the points at the given indices (and their normals), keeping the
    /// relative order of the survivors.
    pub(crate) fn remove_indices(&mut self, remove: &[usize]) {
        let mut keep = vec![true; self.points.len()];
        for &i in remove {
            keep[i] = false;
        }
        let points = std::mem::take(&mut self.points);
        self.points = points
            .into_iter()
            .enumerate()
            .filter(|(i, _)| keep[*i])
            .map(|(_, p)| p)
            .collect();
        if let Some(normals) = self.normals.take() {
            self.normals = Some(
                normals
                    .into_iter()
                    .enumerate()
                    .filter(|(i, _)| keep[*i])
                    .map(|(_, n)| n)
                    .collect(),
            );
        }
    }
}
