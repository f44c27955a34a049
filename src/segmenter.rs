//! Greedy multi-primitive scene segmentation.
//!
//! Each round runs one robust-estimation call per unmet shape quota,
//! accepts the candidate with the most connected inliers, removes those
//! points from the working set by index, and repeats until the quotas are
//! met, the cloud is exhausted, or a round comes up empty.

use crate::core::{CancelToken, ShapeFitter, ShapeRansac};
use crate::error::Error;
use crate::fitters::{DirectCylinderFitter, LsqCylinderFitter, PlaneFitter};
use crate::models::{SegmentShape, ShapeKind};
use crate::settings::{RansacSettings, SegmenterSettings};
use crate::stats::{ExtentStats, SegmentStats, StatsCollector};
use crate::types::{Cloud, Point};

/// One extracted primitive instance.
#[derive(Clone, Debug)]
pub struct Segment {
    pub shape: SegmentShape,
    /// Indices of the inliers in the *original* input cloud.
    pub indices: Vec<usize>,
    /// The inlier points themselves, in index order.
    pub points: Vec<Point>,
    pub stats: SegmentStats,
}

/// Status record of one segmentation round.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundEvent {
    /// 1-based round counter.
    pub round: usize,
    /// Shape family accepted this round; `None` ends the run.
    pub winner: Option<ShapeKind>,
    /// Connected-inlier count of the accepted candidate.
    pub inlier_count: usize,
    /// Points left in the working set after removal.
    pub remaining: usize,
}

/// Segments in discovery order, plus the per-round event log.
#[derive(Clone, Debug, Default)]
pub struct SegmentationResult {
    pub segments: Vec<Segment>,
    pub rounds: Vec<RoundEvent>,
}

/// A round candidate: a fitted shape and its working-set inlier indices.
struct Candidate {
    shape: SegmentShape,
    inliers: Vec<usize>,
}

/// Higher connected-inlier count wins; a tie goes to the cylinder.
fn round_winner(cylinder: Option<Candidate>, plane: Option<Candidate>) -> Option<Candidate> {
    match (cylinder, plane) {
        (Some(c), Some(p)) => {
            if p.inliers.len() > c.inliers.len() {
                Some(p)
            } else {
                Some(c)
            }
        }
        (c, p) => c.or(p),
    }
}

/// Per-round seed derivation, so fixed-seed runs stay reproducible while
/// successive rounds draw distinct sample streams.
fn round_seed(base: Option<u64>, round: usize) -> Option<u64> {
    base.map(|s| s ^ (round as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Orchestrates repeated single-shape searches over a shrinking cloud.
pub struct SceneSegmenter<C: StatsCollector = ExtentStats> {
    settings: SegmenterSettings,
    stats: C,
    cancel: Option<CancelToken>,
}

impl SceneSegmenter<ExtentStats> {
    pub fn new(settings: SegmenterSettings) -> Self {
        Self::with_stats(settings, ExtentStats)
    }
}

impl<C: StatsCollector> SceneSegmenter<C> {
    /// Use a custom statistics collaborator.
    pub fn with_stats(settings: SegmenterSettings, stats: C) -> Self {
        Self {
            settings,
            stats,
            cancel: None,
        }
    }

    /// Attach a cancellation token checked between rounds and between
    /// RANSAC iterations.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Segment the cloud into planes and cylinders.
    ///
    /// Cylinder rounds use the normal-driven fitter when the cloud carries
    /// normals and the least-squares fitter otherwise; the two are never
    /// mixed within a scene. When a plane and a cylinder candidate score
    /// the same inlier count in one round, the cylinder wins. An empty
    /// cloud yields an empty result without iterating.
    pub fn segment(&self, cloud: &Cloud) -> Result<SegmentationResult, Error> {
        self.settings.validate()?;

        let mut result = SegmentationResult::default();
        if cloud.is_empty() {
            return Ok(result);
        }

        let mut working = cloud.clone();
        let mut original_indices: Vec<usize> = (0..cloud.len()).collect();
        let mut planes_found = 0usize;
        let mut cylinders_found = 0usize;
        let mut round = 0usize;

        loop {
            if working.is_empty() {
                break;
            }
            if planes_found >= self.settings.num_planes
                && cylinders_found >= self.settings.num_cylinders
            {
                break;
            }
            if self
                .cancel
                .as_ref()
                .is_some_and(CancelToken::is_cancelled)
            {
                log::debug!("segmentation cancelled after {} rounds", round);
                break;
            }
            round += 1;

            let cylinder_candidate = if cylinders_found < self.settings.num_cylinders {
                let mut ransac = self.settings.cylinder.ransac.clone();
                ransac.seed = round_seed(ransac.seed, round);
                let cyl = &self.settings.cylinder;
                if working.has_normals() {
                    self.try_shape(
                        &working,
                        DirectCylinderFitter::new(cyl.alpha_deg, cyl.min_radius, cyl.max_radius),
                        ransac,
                        SegmentShape::Cylinder,
                    )?
                } else {
                    self.try_shape(
                        &working,
                        LsqCylinderFitter::new(cyl.min_radius, cyl.max_radius),
                        ransac,
                        SegmentShape::Cylinder,
                    )?
                }
            } else {
                None
            };

            let plane_candidate = if planes_found < self.settings.num_planes {
                let mut ransac = self.settings.plane.ransac.clone();
                ransac.seed = round_seed(ransac.seed, round);
                self.try_shape(
                    &working,
                    PlaneFitter::new(self.settings.plane.alpha_deg),
                    ransac,
                    SegmentShape::Plane,
                )?
            } else {
                None
            };

            let Some(winner) = round_winner(cylinder_candidate, plane_candidate) else {
                log::debug!("round {}: no model found, stopping", round);
                result.rounds.push(RoundEvent {
                    round,
                    winner: None,
                    inlier_count: 0,
                    remaining: working.len(),
                });
                break;
            };

            let kind = winner.shape.kind();
            let indices: Vec<usize> = winner
                .inliers
                .iter()
                .map(|&i| original_indices[i])
                .collect();
            let points: Vec<Point> = winner.inliers.iter().map(|&i| *working.point(i)).collect();
            let stats = self.stats.collect(&winner.shape, &points);

            match kind {
                ShapeKind::Plane => planes_found += 1,
                ShapeKind::Cylinder => cylinders_found += 1,
            }

            working.remove_indices(&winner.inliers);
            let mut keep = vec![true; original_indices.len()];
            for &i in &winner.inliers {
                keep[i] = false;
            }
            let mut position = 0usize;
            original_indices.retain(|_| {
                let kept = keep[position];
                position += 1;
                kept
            });

            log::debug!(
                "round {}: accepted {:?} with {} inliers, {} points remain",
                round,
                kind,
                indices.len(),
                working.len()
            );
            result.rounds.push(RoundEvent {
                round,
                winner: Some(kind),
                inlier_count: indices.len(),
                remaining: working.len(),
            });
            result.segments.push(Segment {
                shape: winner.shape,
                indices,
                points,
                stats,
            });
        }

        Ok(result)
    }

    /// Run one single-shape search, skipping shapes whose minimal sample no
    /// longer fits in the working set.
    fn try_shape<F: ShapeFitter>(
        &self,
        working: &Cloud,
        fitter: F,
        settings: RansacSettings,
        wrap: fn(F::Shape) -> SegmentShape,
    ) -> Result<Option<Candidate>, Error> {
        if working.len() < fitter.sample_size() {
            return Ok(None);
        }
        let mut ransac = ShapeRansac::new(fitter, settings);
        if let Some(token) = &self.cancel {
            ransac = ransac.with_cancel(token.clone());
        }
        let estimate = ransac.run(working)?;
        Ok(estimate.shape.map(|shape| Candidate {
            shape: wrap(shape),
            inliers: estimate.inliers,
        }))
    }
}
