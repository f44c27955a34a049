//! Generic robust-estimation loop.
//!
//! A [`ShapeFitter`] turns minimal samples into candidate shapes;
//! [`ShapeRansac`] drives the sampling loop, scores candidates by
//! connectivity-filtered inlier count, and keeps the best. The loop runs a
//! fixed number of iterations: there is no adaptive termination, so a run
//! is deterministic given a seed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::connectivity::filter_connected;
use crate::error::Error;
use crate::sampler::UniformSampler;
use crate::settings::RansacSettings;
use crate::types::{Cloud, Point};

/// A minimal-sample shape estimator.
///
/// Implementations cover one primitive family each. `fit` returns `None`
/// for every per-trial failure (degenerate samples, validation rejections,
/// solver non-convergence), which the loop treats as "no candidate this
/// iteration", never as an error.
pub trait ShapeFitter {
    /// Fitted shape type.
    type Shape: Clone;

    /// Size of a minimal sample.
    fn sample_size(&self) -> usize;

    /// Cheap structural checks on a drawn sample (distinct points, required
    /// inputs present) before attempting a fit.
    fn is_valid_sample(&self, cloud: &Cloud, sample: &[usize]) -> bool;

    /// Estimate a shape from a minimal sample.
    fn fit(&self, cloud: &Cloud, sample: &[usize]) -> Option<Self::Shape>;

    /// Distance of a point to the candidate shape's surface.
    fn distance(&self, shape: &Self::Shape, point: &Point) -> f64;
}

/// Cooperative cancellation handle.
///
/// Cloning shares the underlying flag; setting it makes the RANSAC loop and
/// the scene segmenter stop at their next check, returning the work
/// completed so far.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Outcome of one robust-estimation call.
///
/// `shape` is `None` when no trial ever produced a candidate with a
/// non-empty connected inlier set; that is an ordinary outcome, not an
/// error.
#[derive(Clone, Debug)]
pub struct RansacEstimate<S> {
    pub shape: Option<S>,
    /// Indices into the input cloud of the best candidate's connected
    /// inliers.
    pub inliers: Vec<usize>,
    /// Iterations actually performed (smaller than configured only when
    /// cancelled).
    pub iterations: usize,
}

impl<S> RansacEstimate<S> {
    fn not_found(iterations: usize) -> Self {
        Self {
            shape: None,
            inliers: Vec::new(),
            iterations,
        }
    }
}

/// RANSAC driver for a single shape family.
pub struct ShapeRansac<F: ShapeFitter> {
    fitter: F,
    settings: RansacSettings,
    cancel: Option<CancelToken>,
}

impl<F: ShapeFitter> ShapeRansac<F> {
    pub fn new(fitter: F, settings: RansacSettings) -> Self {
        Self {
            fitter,
            settings,
            cancel: None,
        }
    }

    /// Attach a cancellation token checked once per iteration.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn fitter(&self) -> &F {
        &self.fitter
    }

    /// Run the loop over the whole cloud.
    ///
    /// Fails fast on contract violations (empty cloud, fewer points than
    /// the minimal sample, invalid settings); per-trial failures are
    /// silently skipped.
    pub fn run(&self, cloud: &Cloud) -> Result<RansacEstimate<F::Shape>, Error> {
        self.settings.validate()?;
        if cloud.is_empty() {
            return Err(Error::EmptyCloud);
        }
        let sample_size = self.fitter.sample_size();
        if cloud.len() < sample_size {
            return Err(Error::NotEnoughPoints {
                needed: sample_size,
                got: cloud.len(),
            });
        }

        let mut sampler = match self.settings.seed {
            Some(seed) => UniformSampler::from_seed(seed),
            None => UniformSampler::new(),
        };
        let mut sample = vec![0usize; sample_size];
        let mut raw_inliers: Vec<usize> = Vec::new();

        let mut best_shape: Option<F::Shape> = None;
        let mut best_inliers: Vec<usize> = Vec::new();
        let mut performed = 0usize;

        for iteration in 0..self.settings.iterations {
            if self
                .cancel
                .as_ref()
                .is_some_and(CancelToken::is_cancelled)
            {
                break;
            }
            performed = iteration + 1;

            if !sampler.sample_unique(&mut sample, cloud.len()) {
                continue;
            }
            if !self.fitter.is_valid_sample(cloud, &sample) {
                continue;
            }
            let Some(shape) = self.fitter.fit(cloud, &sample) else {
                continue;
            };

            raw_inliers.clear();
            for (i, p) in cloud.points().iter().enumerate() {
                if self.fitter.distance(&shape, p) <= self.settings.threshold {
                    raw_inliers.push(i);
                }
            }
            // The connected subset can only shrink, so a raw count at or
            // below the current best cannot win.
            if raw_inliers.len() <= best_inliers.len() {
                continue;
            }

            let connected = filter_connected(
                cloud,
                &raw_inliers,
                self.settings.eps,
                self.settings.min_samples,
            );
            if connected.len() > best_inliers.len() {
                log::trace!(
                    "iteration {}: new best candidate with {} connected inliers ({} raw)",
                    iteration,
                    connected.len(),
                    raw_inliers.len()
                );
                best_shape = Some(shape);
                best_inliers = connected;
            }
        }

        if best_inliers.is_empty() {
            return Ok(RansacEstimate::not_found(performed));
        }
        Ok(RansacEstimate {
            shape: best_shape,
            inliers: best_inliers,
            iterations: performed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    /// Fitter that always reports the constant shape `()` and a zero
    /// distance for every point.
    struct AcceptAll;

    impl ShapeFitter for AcceptAll {
        type Shape = ();

        fn sample_size(&self) -> usize {
            2
        }

        fn is_valid_sample(&self, _cloud: &Cloud, _sample: &[usize]) -> bool {
            true
        }

        fn fit(&self, _cloud: &Cloud, _sample: &[usize]) -> Option<()> {
            Some(())
        }

        fn distance(&self, _shape: &(), _point: &Point) -> f64 {
            0.0
        }
    }

    /// Fitter whose fits always fail.
    struct NeverFits;

    impl ShapeFitter for NeverFits {
        type Shape = ();

        fn sample_size(&self) -> usize {
            2
        }

        fn is_valid_sample(&self, _cloud: &Cloud, _sample: &[usize]) -> bool {
            true
        }

        fn fit(&self, _cloud: &Cloud, _sample: &[usize]) -> Option<()> {
            None
        }

        fn distance(&self, _shape: &(), _point: &Point) -> f64 {
            f64::INFINITY
        }
    }

    fn tight_cluster(n: usize) -> Cloud {
        Cloud::new(
            (0..n)
                .map(|i| Point::new(i as f64 * 0.01, 0.0, 0.0))
                .collect(),
        )
    }

    fn test_settings() -> RansacSettings {
        RansacSettings {
            threshold: 0.05,
            iterations: 10,
            eps: 0.05,
            min_samples: 2,
            seed: Some(7),
        }
    }

    #[test]
    fn empty_cloud_is_a_contract_error() {
        let ransac = ShapeRansac::new(AcceptAll, test_settings());
        assert!(matches!(
            ransac.run(&Cloud::new(Vec::new())),
            Err(Error::EmptyCloud)
        ));
    }

    #[test]
    fn undersized_cloud_is_a_contract_error() {
        let ransac = ShapeRansac::new(AcceptAll, test_settings());
        let cloud = tight_cluster(1);
        assert!(matches!(
            ransac.run(&cloud),
            Err(Error::NotEnoughPoints { needed: 2, got: 1 })
        ));
    }

    #[test]
    fn zero_iterations_is_a_contract_error() {
        let mut settings = test_settings();
        settings.iterations = 0;
        let ransac = ShapeRansac::new(AcceptAll, settings);
        assert!(matches!(
            ransac.run(&tight_cluster(5)),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn failed_fits_yield_not_found() {
        let ransac = ShapeRansac::new(NeverFits, test_settings());
        let estimate = ransac.run(&tight_cluster(5)).unwrap();
        assert!(estimate.shape.is_none());
        assert!(estimate.inliers.is_empty());
        assert_eq!(estimate.iterations, 10);
    }

    #[test]
    fn connectivity_gates_scoring() {
        // Every point is a raw inlier of AcceptAll, but the points are all
        // isolated at this eps, so no connected candidate ever scores.
        let cloud = Cloud::new(
            (0..5)
                .map(|i| Point::new(i as f64 * 10.0, 0.0, 0.0))
                .collect(),
        );
        let mut settings = test_settings();
        settings.eps = 0.1;
        settings.min_samples = 2;
        let estimate = ShapeRansac::new(AcceptAll, settings).run(&cloud).unwrap();
        assert!(estimate.shape.is_none());
        assert!(estimate.inliers.is_empty());
    }

    #[test]
    fn accept_all_claims_the_whole_cluster() {
        let cloud = tight_cluster(20);
        let estimate = ShapeRansac::new(AcceptAll, test_settings())
            .run(&cloud)
            .unwrap();
        assert!(estimate.shape.is_some());
        assert_eq!(estimate.inliers.len(), 20);
    }

    #[test]
    fn cancellation_stops_before_the_first_iteration() {
        let token = CancelToken::new();
        token.cancel();
        let ransac = ShapeRansac::new(AcceptAll, test_settings()).with_cancel(token);
        let estimate = ransac.run(&tight_cluster(5)).unwrap();
        assert!(estimate.shape.is_none());
        assert_eq!(estimate.iterations, 0);
    }
}
