//! Error types for the segmentation engine.
//!
//! Only contract violations surface as errors. Ordinary model absence (a
//! degenerate sample, a rejected candidate, a solver that failed to
//! converge) is handled inside the RANSAC loop and reported as a `None`
//! model, never through this enum.

use thiserror::Error;

/// Contract-violation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The input cloud contains no points.
    #[error("point cloud is empty")]
    EmptyCloud,

    /// The cloud is smaller than the minimal sample of the requested fitter.
    #[error("need at least {needed} points, got {got}")]
    NotEnoughPoints { needed: usize, got: usize },

    /// Points and normals are not index-aligned.
    #[error("cloud has {points} points but {normals} normals")]
    NormalCountMismatch { points: usize, normals: usize },

    /// A configuration value is out of its valid range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}
