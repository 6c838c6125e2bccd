use std::collections::HashMap;

use crate::cluster::bfs::find_components_to_split_away;
use crate::math::number::FloatNumber;
use crate::store::labels::{LabelStore, NOISE};
use crate::store::point_store::{PointId, PointStore};

/// Retracts one occurrence of `id` and brings the clustering back into a
/// consistent state. Returns `false` if `id` was unknown (a no-op).
pub fn delete<T: FloatNumber, const N: usize>(
    store: &mut PointStore<T, N>,
    labels: &mut LabelStore,
    min_points: usize,
    id: PointId,
) -> bool {
    // Step 1 — retract.
    let Some(effect) = store.delete(id, min_points) else {
        return false;
    };

    // Step 2 — identify ex-cores.
    let mut ex_cores: Vec<PointId> = effect
        .neighbor_ids
        .iter()
        .copied()
        .filter(|&n| n != id)
        .filter(|&n| {
            store
                .get(n)
                .is_some_and(|record| record.neighbor_count == min_points - 1)
        })
        .collect();
    if effect.was_core_before {
        ex_cores.push(id);
    }

    // Step 3 — collect update seeds and border candidates.
    let mut update_seeds = Vec::new();
    let mut border_candidates = Vec::new();
    for &ex_core in &ex_cores {
        let neighbor_ids: Vec<_> = match store.get(ex_core) {
            Some(record) => record.neighbors.iter().copied().collect(),
            None if ex_core == id && effect.fully_removed => effect.neighbor_ids.clone(),
            None => continue,
        };
        for neighbor in neighbor_ids {
            if effect.fully_removed && neighbor == id {
                continue;
            }
            if store.is_core(neighbor, min_points) {
                update_seeds.push(neighbor);
            } else {
                border_candidates.push(neighbor);
            }
        }
    }
    update_seeds.sort_unstable();
    update_seeds.dedup();

    // Borders of an update seed that is untouched by the delete (not itself
    // an ex-core) still need re-evaluating once a split relabels that seed,
    // so the candidate set also sweeps update_seeds' own non-core neighbors,
    // not only the ex-cores' — otherwise a border on the far side of a
    // surviving core point (like the tip of a chain that splits off a
    // single-core cluster) never gets revisited.
    for &seed in &update_seeds {
        if let Some(record) = store.get(seed) {
            for &neighbor in &record.neighbors {
                if neighbor != seed && !store.is_core(neighbor, min_points) {
                    border_candidates.push(neighbor);
                }
            }
        }
    }
    border_candidates.sort_unstable();
    border_candidates.dedup();

    // Step 4 — splitting.
    if !update_seeds.is_empty() {
        let mut by_cluster: HashMap<i64, Vec<PointId>> = HashMap::new();
        for &seed in &update_seeds {
            if let Some(label) = labels.get(seed) {
                by_cluster.entry(label).or_default().push(seed);
            }
        }

        for seeds in by_cluster.values() {
            if seeds.len() <= 1 {
                continue;
            }
            let split_away = find_components_to_split_away(store, seeds, min_points);
            for component in split_away {
                let fresh = labels.allocate_fresh();
                labels.bulk_set(component, fresh);
            }
        }
    }

    // Step 5 — border reclassification (snapshot semantics).
    let mut reclassified = Vec::with_capacity(border_candidates.len());
    for &border in &border_candidates {
        let Some(record) = store.get(border) else {
            continue;
        };
        let best = record
            .neighbors
            .iter()
            .filter(|&&n| store.is_core(n, min_points))
            .filter_map(|&n| labels.get(n))
            .max()
            .unwrap_or(NOISE);
        reclassified.push((border, best));
    }
    for (border, label) in reclassified {
        labels.set(border, label);
    }

    if effect.fully_removed {
        labels.forget(id);
    }

    true
}
