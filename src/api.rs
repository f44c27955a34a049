//! High-level one-call entry points.
//!
//! These wrap the generic [`ShapeRansac`] loop and the [`SceneSegmenter`]
//! for the common cases; callers needing custom fitters or statistics use
//! the underlying types directly.

use crate::core::{RansacEstimate, ShapeRansac};
use crate::error::Error;
use crate::fitters::{DirectCylinderFitter, LsqCylinderFitter, PlaneFitter};
use crate::models::{Cylinder, Plane};
use crate::segmenter::{SceneSegmenter, SegmentationResult};
use crate::settings::{CylinderSettings, PlaneSettings, SegmenterSettings};
use crate::types::{Cloud, Normal, Point};

/// Segment a scene into planes and cylinders.
///
/// `normals`, when given, must be index-aligned with `points`; they enable
/// the normal-driven plane validation and the direct cylinder fitter.
pub fn segment_cloud(
    points: Vec<Point>,
    normals: Option<Vec<Normal>>,
    settings: &SegmenterSettings,
) -> Result<SegmentationResult, Error> {
    let cloud = match normals {
        Some(normals) => Cloud::with_normals(points, normals)?,
        None => Cloud::new(points),
    };
    SceneSegmenter::new(settings.clone()).segment(&cloud)
}

/// Find the single best plane in a cloud.
pub fn fit_plane(cloud: &Cloud, settings: &PlaneSettings) -> Result<RansacEstimate<Plane>, Error> {
    settings.validate()?;
    let fitter = PlaneFitter::new(settings.alpha_deg);
    ShapeRansac::new(fitter, settings.ransac.clone()).run(cloud)
}

/// Find the single best cylinder in a cloud.
///
/// Uses the closed-form normal-driven fitter when the cloud carries
/// normals, the least-squares fitter otherwise.
pub fn fit_cylinder(
    cloud: &Cloud,
    settings: &CylinderSettings,
) -> Result<RansacEstimate<Cylinder>, Error> {
    settings.validate()?;
    if cloud.has_normals() {
        let fitter =
            DirectCylinderFitter::new(settings.alpha_deg, settings.min_radius, settings.max_radius);
        ShapeRansac::new(fitter, settings.ransac.clone()).run(cloud)
    } else {
        let fitter = LsqCylinderFitter::new(settings.min_radius, settings.max_radius);
        ShapeRansac::new(fitter, settings.ransac.clone()).run(cloud)
    }
}
