//! Density-based anomaly detection over the joined transaction view.
//!
//! Feature space: [amount, inbound profile amount, outbound profile amount],
//! raw and unscaled, Euclidean distance. The labels are a pure function of
//! the feature values and (eps, min_pts); there is no randomness and no
//! training phase. Points never absorbed into a cluster keep the NOISE
//! label, which is the anomaly signal downstream.
//!
//! The features sit on very different numeric scales, so the radius is
//! dominated by whichever feature is largest. That behavior is inherited
//! and kept as-is; callers wanting scale-aware detection pre-scale the
//! features upstream.

use crate::{
    join::JoinedTransactionRecord,
    types::{ClusterId, NOISE},
};
use log::info;
use std::collections::VecDeque;

pub const DEFAULT_EPS: f64 = 0.5;
pub const DEFAULT_MIN_PTS: usize = 5;

pub type FeatureVector = [f64; 3];

/// Project a joined record into the detector's feature space.
pub fn feature_vector(record: &JoinedTransactionRecord) -> FeatureVector {
    [
        record.amount,
        record.inbound_wire_profile_amount,
        record.outbound_wire_profile_amount,
    ]
}

/// Label every joined record: cluster id or NOISE.
pub fn detect(records: &[JoinedTransactionRecord], eps: f64, min_pts: usize) -> Vec<ClusterId> {
    let points: Vec<FeatureVector> = records.iter().map(feature_vector).collect();
    let labels = dbscan(&points, eps, min_pts);
    let flagged = labels.iter().filter(|&&l| l == NOISE).count();
    info!(
        "detection: {} points, {} clusters, {} flagged (eps={eps}, min_pts={min_pts})",
        points.len(),
        cluster_count(&labels),
        flagged
    );
    labels
}

/// DBSCAN over a point set.
///
/// Points are visited in index order. An under-dense point is provisionally
/// noise; it may later be absorbed into a cluster as a border point reachable
/// from a core point. A dense point seeds a new cluster, expanded over all
/// density-reachable neighbors; each newly reached dense point extends the
/// frontier. Cluster ids start at 0.
pub fn dbscan(points: &[FeatureVector], eps: f64, min_pts: usize) -> Vec<ClusterId> {
    let mut labels = vec![NOISE; points.len()];
    let mut visited = vec![false; points.len()];
    let mut next_cluster: ClusterId = 0;

    for i in 0..points.len() {
        if visited[i] {
            continue;
        }
        visited[i] = true;

        let neighbors = region_query(points, i, eps);
        if neighbors.len() < min_pts {
            // Provisional noise; stays NOISE unless absorbed below.
            continue;
        }

        let cluster = next_cluster;
        next_cluster += 1;
        labels[i] = cluster;

        let mut frontier: VecDeque<usize> = neighbors.into();
        while let Some(j) = frontier.pop_front() {
            if labels[j] == NOISE {
                labels[j] = cluster;
            }
            if visited[j] {
                continue;
            }
            visited[j] = true;
            let reachable = region_query(points, j, eps);
            if reachable.len() >= min_pts {
                frontier.extend(reachable);
            }
        }
    }

    labels
}

/// Number of distinct clusters in a label set (noise excluded).
pub fn cluster_count(labels: &[ClusterId]) -> usize {
    labels
        .iter()
        .filter(|&&l| l != NOISE)
        .max()
        .map(|&max| (max + 1) as usize)
        .unwrap_or(0)
}

/// All indices within `eps` of `center`, inclusive, counting `center`
/// itself. Ascending index order keeps expansion deterministic.
fn region_query(points: &[FeatureVector], center: usize, eps: f64) -> Vec<usize> {
    points
        .iter()
        .enumerate()
        .filter(|(_, p)| euclidean(&points[center], p) <= eps)
        .map(|(i, _)| i)
        .collect()
}

fn euclidean(a: &FeatureVector, b: &FeatureVector) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
