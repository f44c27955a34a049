//! # primfit: robust primitive segmentation for 3D point clouds
//!
//! `primfit` segments a point cloud into planes and cylinders by robust
//! model fitting. Each extraction tolerates a large
//! fraction of outliers, a spatial-connectivity filter keeps every accepted
//! model on one physically contiguous object, and a greedy scene loop peels
//! off instances until the per-type quotas are met or the cloud runs out.
//!
//! ## Quick start
//!
//! ```rust
//! use primfit::{segment_cloud, Point, SegmenterSettings, ShapeKind};
//!
//! // A 20x20 planar patch.
//! let mut points = Vec::new();
//! for i in 0..20 {
//!     for j in 0..20 {
//!         points.push(Point::new(i as f64 * 0.05, j as f64 * 0.05, 0.0));
//!     }
//! }
//!
//! let mut settings = SegmenterSettings::default();
//! settings.num_planes = 1;
//! settings.plane.ransac.seed = Some(7);
//!
//! let result = segment_cloud(points, None, &settings).unwrap();
//! assert_eq!(result.segments.len(), 1);
//! assert_eq!(result.segments[0].shape.kind(), ShapeKind::Plane);
//! ```
//!
//! ## Extending the library
//!
//! New primitive families plug into the generic loop through the
//! [`ShapeFitter`](core::ShapeFitter) trait:
//!
//! ```rust
//! use primfit::core::ShapeFitter;
//! use primfit::{Cloud, Point};
//!
//! #[derive(Clone)]
//! struct Sphere {
//!     center: Point,
//!     radius: f64,
//! }
//!
//! struct SphereFitter;
//!
//! impl ShapeFitter for SphereFitter {
//!     type Shape = Sphere;
//!
//!     fn sample_size(&self) -> usize {
//!         4
//!     }
//!
//!     fn is_valid_sample(&self, _cloud: &Cloud, sample: &[usize]) -> bool {
//!         sample.len() == 4
//!     }
//!
//!     fn fit(&self, _cloud: &Cloud, _sample: &[usize]) -> Option<Sphere> {
//!         // Solve the 4-point sphere here; `None` skips the trial.
//!         None
//!     }
//!
//!     fn distance(&self, shape: &Sphere, point: &Point) -> f64 {
//!         ((point - shape.center).norm() - shape.radius).abs()
//!     }
//! }
//! ```
//!
//! ## Modules
//!
//! - [`api`]: one-call helpers for fitting and whole-scene segmentation
//! - [`core`]: the `ShapeFitter` trait and the generic RANSAC loop
//! - [`fitters`]: built-in plane and cylinder fitters
//! - [`connectivity`]: the density-based largest-cluster filter
//! - [`models`]: plane and cylinder parameter types
//! - [`segmenter`]: the greedy multi-primitive extraction loop
//! - [`stats`]: the per-segment statistics collaborator
//! - [`settings`]: configuration types with defaults

pub mod api;
pub mod connectivity;
pub mod core;
pub mod error;
pub mod fitters;
pub mod models;
pub mod sampler;
pub mod segmenter;
pub mod settings;
pub mod stats;
pub mod types;

pub use crate::core::{CancelToken, RansacEstimate, ShapeFitter, ShapeRansac};

pub use api::{fit_cylinder, fit_plane, segment_cloud};
pub use connectivity::{filter_connected, largest_cluster};
pub use error::Error;
pub use fitters::{DirectCylinderFitter, LsqCylinderFitter, PlaneFitter};
pub use models::{Cylinder, Plane, SegmentShape, ShapeKind};
pub use sampler::UniformSampler;
pub use segmenter::{RoundEvent, SceneSegmenter, Segment, SegmentationResult};
pub use settings::{CylinderSettings, PlaneSettings, RansacSettings, SegmenterSettings};
pub use stats::{ExtentStats, SegmentStats, StatsCollector};
pub use types::{Cloud, Normal, Point};
