use std::collections::{HashMap, HashSet};

use incdbscan::{Engine, Label, Metric};

const EPSILON: f64 = 1.5;

#[test]
fn noise_scenario_labels_a_lone_point_as_noise() {
    let mut engine = Engine::<f64, 2>::new(EPSILON, 4, Metric::Euclidean).unwrap();
    engine.insert([10.0, 10.0]).unwrap();
    assert_eq!(engine.label_of(&[10.0, 10.0]), Some(Label::Noise));
}

#[test]
fn creation_scenario_forms_one_cluster_with_a_core_middle_point() {
    let mut engine = Engine::<f64, 2>::new(EPSILON, 3, Metric::Euclidean).unwrap();
    engine
        .insert_batch([[1.5, 0.0], [3.0, 0.0], [4.5, 0.0]])
        .unwrap();

    for x in [1.5, 3.0, 4.5] {
        assert_eq!(engine.label_of(&[x, 0.0]), Some(Label::Cluster(0)));
    }
}

#[test]
fn absorption_of_noise_scenario_pulls_a_noise_point_into_the_cluster() {
    let mut engine = Engine::<f64, 2>::new(EPSILON, 3, Metric::Euclidean).unwrap();
    engine
        .insert_batch([[1.5, 0.0], [3.0, 0.0], [4.5, 0.0]])
        .unwrap();

    engine.insert([0.0, 1.5]).unwrap();
    assert_eq!(engine.label_of(&[0.0, 1.5]), Some(Label::Noise));

    engine.insert([0.0, 0.0]).unwrap();

    let origin_label = engine.label_of(&[0.0, 0.0]).unwrap();
    assert_ne!(origin_label, Label::Noise);
    for point in [[1.5, 0.0], [3.0, 0.0], [4.5, 0.0], [0.0, 1.5]] {
        assert_eq!(engine.label_of(&point), Some(origin_label));
    }
}

#[test]
fn merge_scenario_keeps_the_numerically_largest_label() {
    let mut engine = Engine::<f64, 2>::new(EPSILON, 3, Metric::Euclidean).unwrap();
    engine
        .insert_batch([[1.5, 0.0], [3.0, 0.0], [4.5, 0.0], [6.0, 0.0]])
        .unwrap();
    engine
        .insert_batch([[-1.5, 0.0], [-3.0, 0.0], [-4.5, 0.0], [-6.0, 0.0]])
        .unwrap();
    engine.insert([0.0, 0.0]).unwrap();

    let merged_label = engine.label_of(&[0.0, 0.0]).unwrap();
    assert_eq!(merged_label, Label::Cluster(1));

    for x in [1.5, 3.0, 4.5, 6.0, -1.5, -3.0, -4.5, -6.0] {
        assert_eq!(engine.label_of(&[x, 0.0]), Some(merged_label));
    }
}

#[test]
fn split_scenario_breaks_a_bridged_chain_into_two_clusters() {
    let mut engine = Engine::<f64, 2>::new(EPSILON, 3, Metric::Euclidean).unwrap();
    let mut coords = vec![0.0];
    for k in 1..=3 {
        coords.push(-1.5 * k as f64);
        coords.push(1.5 * k as f64);
    }
    let points: Vec<_> = coords.iter().map(|&x| [x, 0.0]).collect();
    engine.insert_batch(points.clone()).unwrap();

    for &x in &coords {
        assert_eq!(engine.label_of(&[x, 0.0]), Some(Label::Cluster(0)));
    }

    engine.delete_batch([[0.0, 0.0]]);

    let left_label = engine.label_of(&[-1.5, 0.0]).unwrap();
    let right_label = engine.label_of(&[1.5, 0.0]).unwrap();
    assert_ne!(left_label, right_label);
    assert_ne!(left_label, Label::Noise);
    assert_ne!(right_label, Label::Noise);
    assert!(left_label == Label::Cluster(0) || right_label == Label::Cluster(0));

    for x in [-3.0, -4.5] {
        assert_eq!(engine.label_of(&[x, 0.0]), Some(left_label));
    }
    for x in [3.0, 4.5] {
        assert_eq!(engine.label_of(&[x, 0.0]), Some(right_label));
    }
}

/// Textbook batch DBSCAN used only to check the incremental engine produces
/// an isomorphic clustering, not as part of the crate's public surface.
fn batch_dbscan(points: &[[f64; 2]], epsilon: f64, min_points: usize) -> Vec<i64> {
    fn neighbors(points: &[[f64; 2]], i: usize, epsilon: f64) -> Vec<usize> {
        points
            .iter()
            .enumerate()
            .filter(|&(j, p)| {
                let dx = points[i][0] - p[0];
                let dy = points[i][1] - p[1];
                j != i && (dx * dx + dy * dy).sqrt() <= epsilon
            })
            .map(|(j, _)| j)
            .collect()
    }

    const UNVISITED: i64 = -3;
    const NOISE: i64 = -1;
    let mut labels = vec![UNVISITED; points.len()];
    let mut next_label = 0;

    for i in 0..points.len() {
        if labels[i] != UNVISITED {
            continue;
        }
        let neighborhood = neighbors(points, i, epsilon);
        if neighborhood.len() + 1 < min_points {
            labels[i] = NOISE;
            continue;
        }
        labels[i] = next_label;
        let mut seeds: Vec<usize> = neighborhood;
        let mut cursor = 0;
        while cursor < seeds.len() {
            let j = seeds[cursor];
            cursor += 1;
            if labels[j] == NOISE {
                labels[j] = next_label;
            }
            if labels[j] != UNVISITED {
                continue;
            }
            labels[j] = next_label;
            let mut j_neighbors = neighbors(points, j, epsilon);
            if j_neighbors.len() + 1 >= min_points {
                seeds.append(&mut j_neighbors);
            }
        }
        next_label += 1;
    }

    labels
}

/// True iff two label assignments agree up to a relabeling bijection.
fn labels_isomorphic(a: &[i64], b: &[i64]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut map_a_to_b: HashMap<i64, i64> = HashMap::new();
    let mut map_b_to_a: HashMap<i64, i64> = HashMap::new();
    for (&la, &lb) in a.iter().zip(b.iter()) {
        if la == -1 || lb == -1 {
            if la != lb {
                return false;
            }
            continue;
        }
        match (map_a_to_b.get(&la), map_b_to_a.get(&lb)) {
            (None, None) => {
                map_a_to_b.insert(la, lb);
                map_b_to_a.insert(lb, la);
            }
            (Some(&expected_b), Some(&expected_a)) if expected_b == lb && expected_a == la => {}
            _ => return false,
        }
    }
    true
}

#[test]
fn equivalence_with_batch_dbscan_on_a_small_grid() {
    let epsilon = 1.2;
    let min_points = 3;
    let points: Vec<[f64; 2]> = (0..5)
        .flat_map(|x| (0..5).map(move |y| [x as f64, y as f64]))
        .collect();

    let mut engine = Engine::<f64, 2>::new(epsilon, min_points, Metric::Euclidean).unwrap();
    engine.insert_batch(points.clone()).unwrap();

    let incremental: Vec<i64> = points
        .iter()
        .map(|p| engine.label_of(p).unwrap().as_raw())
        .collect();
    let batch = batch_dbscan(&points, epsilon, min_points);

    assert!(
        labels_isomorphic(&incremental, &batch),
        "incremental={incremental:?} batch={batch:?}"
    );
}

#[test]
fn deleting_an_absent_value_is_idempotent() {
    let mut engine = Engine::<f64, 2>::new(EPSILON, 3, Metric::Euclidean).unwrap();
    engine
        .insert_batch([[1.5, 0.0], [3.0, 0.0], [4.5, 0.0]])
        .unwrap();
    let before: Vec<_> = [1.5, 3.0, 4.5]
        .iter()
        .map(|&x| engine.label_of(&[x, 0.0]))
        .collect();

    let warnings = engine.delete_batch([[999.0, 999.0]]);
    assert_eq!(warnings.len(), 1);

    let after: Vec<_> = [1.5, 3.0, 4.5]
        .iter()
        .map(|&x| engine.label_of(&[x, 0.0]))
        .collect();
    assert_eq!(before, after);
}

#[test]
fn insertion_order_does_not_change_the_resulting_clustering_up_to_isomorphism() {
    let epsilon = 1.2;
    let min_points = 3;
    let points: Vec<[f64; 2]> = vec![
        [0.0, 0.0],
        [1.0, 0.0],
        [0.0, 1.0],
        [1.0, 1.0],
        [5.0, 5.0],
        [5.0, 6.0],
    ];

    let mut forward = Engine::<f64, 2>::new(epsilon, min_points, Metric::Euclidean).unwrap();
    forward.insert_batch(points.clone()).unwrap();

    let mut reversed_points = points.clone();
    reversed_points.reverse();
    let mut backward = Engine::<f64, 2>::new(epsilon, min_points, Metric::Euclidean).unwrap();
    backward.insert_batch(reversed_points).unwrap();

    let forward_labels: Vec<i64> = points
        .iter()
        .map(|p| forward.label_of(p).unwrap().as_raw())
        .collect();
    let backward_labels: Vec<i64> = points
        .iter()
        .map(|p| backward.label_of(p).unwrap().as_raw())
        .collect();

    assert!(labels_isomorphic(&forward_labels, &backward_labels));
}

#[test]
fn net_identity_sequence_matches_surviving_inserts_only() {
    let epsilon = 1.2;
    let min_points = 3;
    let base: Vec<[f64; 2]> = vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
    let transient = [9.0, 9.0];

    let mut churned = Engine::<f64, 2>::new(epsilon, min_points, Metric::Euclidean).unwrap();
    churned.insert_batch(base.clone()).unwrap();
    churned.insert([transient[0], transient[1]]).unwrap();
    churned.delete_batch([transient]);

    let mut clean = Engine::<f64, 2>::new(epsilon, min_points, Metric::Euclidean).unwrap();
    clean.insert_batch(base.clone()).unwrap();

    let churned_labels: Vec<i64> = base
        .iter()
        .map(|p| churned.label_of(p).unwrap().as_raw())
        .collect();
    let clean_labels: Vec<i64> = base
        .iter()
        .map(|p| clean.label_of(p).unwrap().as_raw())
        .collect();

    assert!(labels_isomorphic(&churned_labels, &clean_labels));
    assert!(churned.label_of(&transient).is_none());
}

#[test]
fn duplicate_values_collapse_onto_one_point_with_multiplicity() {
    let mut engine = Engine::<f64, 2>::new(EPSILON, 3, Metric::Euclidean).unwrap();
    engine
        .insert_batch([[1.5, 0.0], [3.0, 0.0], [4.5, 0.0]])
        .unwrap();
    engine.insert([3.0, 0.0]).unwrap();
    assert_eq!(engine.len(), 3);

    engine.delete_batch([[3.0, 0.0]]);
    assert_eq!(engine.len(), 3);
    assert_eq!(engine.label_of(&[3.0, 0.0]), Some(Label::Cluster(0)));

    engine.delete_batch([[3.0, 0.0]]);
    assert_eq!(engine.len(), 2);
}

#[test]
fn every_core_point_carries_a_non_negative_label() {
    let epsilon = 1.2;
    let min_points = 3;
    let points: Vec<[f64; 2]> = (0..4)
        .flat_map(|x| (0..4).map(move |y| [x as f64, y as f64]))
        .collect();

    let mut engine = Engine::<f64, 2>::new(epsilon, min_points, Metric::Euclidean).unwrap();
    engine.insert_batch(points.clone()).unwrap();

    let mut seen_clusters: HashSet<u32> = HashSet::new();
    for p in &points {
        if let Some(Label::Cluster(k)) = engine.label_of(p) {
            seen_clusters.insert(k);
        }
    }
    assert!(!seen_clusters.is_empty());
}
