//! Configuration types for the segmentation pipeline.
//!
//! Settings are grouped per concern: the generic RANSAC loop, the two shape
//! families, and the scene-level segmenter that composes them. All values
//! have working defaults; `validate` rejects out-of-range values before any
//! sampling happens.

use crate::error::Error;

/// Parameters of a single robust-estimation call.
#[derive(Debug, Clone, PartialEq)]
pub struct RansacSettings {
    /// Distance threshold separating inliers from outliers.
    pub threshold: f64,
    /// Exact number of sampling iterations per call.
    pub iterations: usize,
    /// Neighborhood radius of the spatial-connectivity filter.
    pub eps: f64,
    /// Minimum neighborhood size (query point included) for a point to be a
    /// cluster core in the connectivity filter.
    pub min_samples: usize,
    /// Seed for the index sampler. `None` draws the seed from thread
    /// entropy; fixing it makes a run bit-reproducible.
    pub seed: Option<u64>,
}

impl Default for RansacSettings {
    fn default() -> Self {
        Self {
            threshold: 0.02,
            iterations: 1000,
            eps: 0.1,
            min_samples: 8,
            seed: None,
        }
    }
}

impl RansacSettings {
    pub fn validate(&self) -> Result<(), Error> {
        if self.iterations == 0 {
            return Err(Error::InvalidConfig("iterations must be positive"));
        }
        if !(self.threshold > 0.0) {
            return Err(Error::InvalidConfig("threshold must be positive"));
        }
        if !(self.eps > 0.0) {
            return Err(Error::InvalidConfig("eps must be positive"));
        }
        if self.min_samples == 0 {
            return Err(Error::InvalidConfig("min_samples must be positive"));
        }
        Ok(())
    }
}

/// Plane-search configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneSettings {
    pub ransac: RansacSettings,
    /// Maximum deviation, in degrees, between a sample point's normal and
    /// the fitted plane normal. Only applied when the cloud carries normals.
    pub alpha_deg: f64,
}

impl Default for PlaneSettings {
    fn default() -> Self {
        Self {
            ransac: RansacSettings::default(),
            alpha_deg: 30.0,
        }
    }
}

impl PlaneSettings {
    pub fn validate(&self) -> Result<(), Error> {
        self.ransac.validate()?;
        if !(self.alpha_deg > 0.0 && self.alpha_deg <= 90.0) {
            return Err(Error::InvalidConfig("plane alpha_deg must be in (0, 90]"));
        }
        Ok(())
    }
}

/// Cylinder-search configuration, shared by both fitting strategies.
#[derive(Debug, Clone, PartialEq)]
pub struct CylinderSettings {
    pub ransac: RansacSettings,
    /// Maximum deviation, in degrees, of a sample normal from being
    /// perpendicular to the candidate axis (normal-driven fitter only).
    pub alpha_deg: f64,
    /// Lower bound on the fitted radius.
    pub min_radius: f64,
    /// Upper bound on the fitted radius. The default is unbounded.
    pub max_radius: f64,
}

impl Default for CylinderSettings {
    fn default() -> Self {
        Self {
            ransac: RansacSettings::default(),
            alpha_deg: 10.0,
            min_radius: 0.0,
            max_radius: f64::INFINITY,
        }
    }
}

impl CylinderSettings {
    pub fn validate(&self) -> Result<(), Error> {
        self.ransac.validate()?;
        if !(self.alpha_deg > 0.0 && self.alpha_deg <= 90.0) {
            return Err(Error::InvalidConfig("cylinder alpha_deg must be in (0, 90]"));
        }
        if self.min_radius < 0.0 {
            return Err(Error::InvalidConfig("min_radius must be non-negative"));
        }
        if self.min_radius > self.max_radius {
            return Err(Error::InvalidConfig("min_radius exceeds max_radius"));
        }
        Ok(())
    }
}

/// Scene-level configuration: per-type quotas plus the per-shape searches.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SegmenterSettings {
    /// Target number of planes to extract.
    pub num_planes: usize,
    /// Target number of cylinders to extract.
    pub num_cylinders: usize,
    pub plane: PlaneSettings,
    pub cylinder: CylinderSettings,
}

impl SegmenterSettings {
    pub fn validate(&self) -> Result<(), Error> {
        self.plane.validate()?;
        self.cylinder.validate()
    }
}
