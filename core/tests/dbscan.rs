//! Anomaly detector tests: determinism, the density contract, and border
//! point absorption.

use wirescreen_core::{
    dbscan::{cluster_count, dbscan, feature_vector, FeatureVector},
    join::JoinedTransactionRecord,
    types::NOISE,
};

fn point(x: f64) -> FeatureVector {
    [x, 0.0, 0.0]
}

#[test]
fn identical_inputs_produce_identical_labels() {
    let points: Vec<FeatureVector> = vec![
        point(0.0),
        point(0.2),
        point(0.4),
        point(10.0),
        point(10.1),
        point(50.0),
    ];

    let first = dbscan(&points, 0.5, 3);
    let second = dbscan(&points, 0.5, 3);
    assert_eq!(first, second, "labeling must be deterministic");
}

#[test]
fn dense_set_forms_a_single_cluster() {
    // All pairwise distances well under eps, set size above min_pts.
    let points: Vec<FeatureVector> = (0..6).map(|i| point(i as f64 * 0.01)).collect();

    let labels = dbscan(&points, 0.5, 5);
    assert!(
        labels.iter().all(|&l| l == 0),
        "every point should share cluster 0, got {labels:?}"
    );
    assert_eq!(cluster_count(&labels), 1);
}

#[test]
fn fewer_points_than_min_pts_is_all_noise() {
    let points: Vec<FeatureVector> = (0..4).map(|i| point(i as f64 * 0.01)).collect();

    let labels = dbscan(&points, 0.5, 5);
    assert!(
        labels.iter().all(|&l| l == NOISE),
        "no neighborhood can reach min_pts, got {labels:?}"
    );
    assert_eq!(cluster_count(&labels), 0);
}

#[test]
fn provisional_noise_is_promoted_to_border() {
    // Point 0 is visited first and is under-dense (neighborhood {0, 1}),
    // so it is provisionally noise. Point 1 is core (neighborhood
    // {0, 1, 2}) and must absorb both ends as border points.
    let points = vec![point(0.0), point(0.3), point(0.6)];

    let labels = dbscan(&points, 0.35, 3);
    assert_eq!(labels, vec![0, 0, 0]);
}

#[test]
fn unreachable_point_stays_noise() {
    let points = vec![point(0.0), point(0.3), point(0.6), point(0.9), point(100.0)];

    let labels = dbscan(&points, 0.35, 3);
    assert_eq!(labels[..4], [0, 0, 0, 0]);
    assert_eq!(labels[4], NOISE, "the far point is not density-reachable");
}

#[test]
fn eps_boundary_is_inclusive() {
    // Neighbors at exactly eps distance count toward the density test.
    let points = vec![point(0.0), point(0.5), point(1.0)];

    let labels = dbscan(&points, 0.5, 3);
    assert!(
        labels.iter().all(|&l| l != NOISE),
        "points at exactly eps must be reachable, got {labels:?}"
    );
}

#[test]
fn separated_groups_get_distinct_cluster_ids() {
    let points = vec![
        point(0.0),
        point(0.1),
        point(0.2),
        point(100.0),
        point(100.1),
        point(100.2),
    ];

    let labels = dbscan(&points, 0.5, 3);
    assert_eq!(cluster_count(&labels), 2);
    assert_eq!(labels[0], labels[1]);
    assert_eq!(labels[1], labels[2]);
    assert_eq!(labels[3], labels[4]);
    assert_eq!(labels[4], labels[5]);
    assert_ne!(labels[0], labels[3], "groups must not share a cluster id");
}

#[test]
fn noise_sentinel_is_minus_one() {
    assert_eq!(NOISE, -1);
}

#[test]
fn feature_vector_projects_the_three_amounts() {
    let record = JoinedTransactionRecord {
        client_code: "C1".into(),
        client_type: "NATURAL".into(),
        pep_flag: "N".into(),
        risk_level: "ALTO".into(),
        client_country: "PA".into(),
        account_number: "A1".into(),
        account_type: "AHORRO".into(),
        account_status: "ACTIVA".into(),
        inbound_wire_profile_amount: 1000.0,
        inbound_wire_profile_frequency: 4,
        outbound_wire_profile_amount: 2000.0,
        outbound_wire_profile_frequency: 6,
        transaction_date: "2023-02-01".into(),
        transaction_type: "WIRE_IN".into(),
        amount: 250.0,
        origin_country: "US".into(),
        destination_country: "PA".into(),
    };

    assert_eq!(feature_vector(&record), [250.0, 1000.0, 2000.0]);
}
