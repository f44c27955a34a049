//! Spatial-connectivity filter over candidate inlier sets.
//!
//! Raw distance-threshold inliers may span several disjoint objects that
//! happen to graze the same infinite plane or cylinder surface. Density
//! clustering restricts an accepted model to one physically contiguous
//! object: points are grouped with DBSCAN over Euclidean distance and only
//! the largest cluster survives.

use kiddo::float::kdtree::KdTree;
use kiddo::SquaredEuclidean;

use crate::types::{Cloud, Point};

/// kd-tree leaf bucket size.
///
/// `kiddo`'s default bucket (32) panics during construction when more than
/// `B` points share a coordinate on one axis. Plane inliers are coplanar by
/// construction (every point shares the normal-axis coordinate), so the
/// filter routinely indexes hundreds of such points; a larger bucket lets
/// them build. The bucket is an internal capacity parameter only — it does
/// not affect which neighbors a radius query returns.
const BUCKET: usize = 1024;

/// 3-D `f64` kd-tree with a bucket large enough for coplanar inlier sets.
type Tree = KdTree<f64, u64, 3, BUCKET, u32>;

/// Indices of the largest DBSCAN cluster of `points`.
///
/// A point is a cluster core when at least `min_samples` points (itself
/// included) lie within `eps` of it; non-core points adjacent to a core are
/// border members, everything else is noise. Returns an empty vector for an
/// empty input or when no cluster reaches `min_samples`.
pub fn largest_cluster(points: &[Point], eps: f64, min_samples: usize) -> Vec<usize> {
    let n = points.len();
    if n == 0 || min_samples == 0 || min_samples > n {
        return Vec::new();
    }

    let mut tree: Tree = Tree::with_capacity(n);
    for (i, p) in points.iter().enumerate() {
        tree.add(&[p.x, p.y, p.z], i as u64);
    }
    let eps_sq = eps * eps;
    let neighbors_of = |i: usize| -> Vec<usize> {
        let p = &points[i];
        tree.within_unsorted::<SquaredEuclidean>(&[p.x, p.y, p.z], eps_sq)
            .into_iter()
            .map(|hit| hit.item as usize)
            .collect()
    };

    let mut labels: Vec<Option<usize>> = vec![None; n];
    let mut visited = vec![false; n];
    let mut cluster_sizes: Vec<usize> = Vec::new();

    for i in 0..n {
        if visited[i] {
            continue;
        }
        visited[i] = true;

        let seeds = neighbors_of(i);
        if seeds.len() < min_samples {
            continue; // noise, unless a later cluster claims it as border
        }

        let cluster = cluster_sizes.len();
        cluster_sizes.push(0);
        labels[i] = Some(cluster);
        cluster_sizes[cluster] += 1;

        let mut queue = seeds;
        while let Some(j) = queue.pop() {
            if labels[j].is_none() {
                labels[j] = Some(cluster);
                cluster_sizes[cluster] += 1;
            }
            if !visited[j] {
                visited[j] = true;
                let expansion = neighbors_of(j);
                if expansion.len() >= min_samples {
                    queue.extend(expansion);
                }
            }
        }
    }

    let Some((best, _)) = cluster_sizes
        .iter()
        .enumerate()
        .max_by_key(|(_, size)| **size)
    else {
        return Vec::new();
    };

    (0..n).filter(|&i| labels[i] == Some(best)).collect()
}

/// Restrict a candidate inlier set to its largest contiguous component.
///
/// `candidates` holds indices into `cloud`; the return value is the subset
/// of those indices belonging to the largest cluster.
pub fn filter_connected(
    cloud: &Cloud,
    candidates: &[usize],
    eps: f64,
    min_samples: usize,
) -> Vec<usize> {
    let subset: Vec<Point> = candidates.iter().map(|&i| *cloud.point(i)).collect();
    largest_cluster(&subset, eps, min_samples)
        .into_iter()
        .map(|local| candidates[local])
        .collect()
}
