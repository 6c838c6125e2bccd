use crate::math::number::FloatNumber;
use crate::math::point::Point;
use crate::store::labels::{LabelStore, NOISE};
use crate::store::point_store::PointStore;

/// Admits `value` and brings the clustering back into a consistent state.
///
/// Mirrors the four-step procedure: admit the point, classify its neighbors
/// by core novelty, resolve the Noise/Absorption/Creation/Merge case, then
/// propagate the resulting label to every border the newly-dense region
/// touches.
pub fn insert<T: FloatNumber, const N: usize>(
    store: &mut PointStore<T, N>,
    labels: &mut LabelStore,
    min_points: usize,
    value: Point<T, N>,
) {
    // Step 1 — admit the point.
    let effect = store.insert(value);
    let x = effect.id;
    if effect.is_new {
        labels.assign_unclassified(x);
    }

    // Step 2 — classify x's neighbors by core novelty.
    let mut new_cores = Vec::new();
    let mut old_cores = Vec::new();
    for &neighbor in &effect.neighbors {
        let record = store.get(neighbor).expect("neighbor must still exist");
        if record.neighbor_count == min_points {
            new_cores.push(neighbor);
        } else if record.neighbor_count > min_points {
            old_cores.push(neighbor);
        }
    }
    // x itself is always treated as a new core if it's core at all: it was
    // unclassified (or noise) a moment ago, so even surplus density (count
    // already past min_points from a single insert) is new to the graph.
    if let Some(position) = old_cores.iter().position(|&c| c == x) {
        old_cores.remove(position);
        new_cores.push(x);
    }

    // Step 3 — case analysis.
    if new_cores.is_empty() {
        if old_cores.is_empty() {
            // Case A, Noise.
            labels.set(x, NOISE);
        } else {
            // Case A, Absorption: most recent (numerically largest) label wins.
            let k = old_cores
                .iter()
                .filter_map(|&c| labels.get(c))
                .max()
                .unwrap_or(NOISE);
            labels.set(x, k);
        }
        return;
    }

    // Case B: new_cores non-empty.
    let mut update_seeds: Vec<_> = new_cores
        .iter()
        .flat_map(|&core| {
            store
                .get(core)
                .expect("core must exist")
                .neighbors
                .iter()
                .copied()
                .collect::<Vec<_>>()
        })
        .filter(|&candidate| store.is_core(candidate, min_points))
        .collect();
    update_seeds.sort_unstable();
    update_seeds.dedup();

    for component in store.connected_components(&update_seeds) {
        let effective_labels: Vec<_> = component
            .iter()
            .filter_map(|&p| labels.get(p))
            .filter(|&l| l != crate::store::labels::UNCLASSIFIED && l != NOISE)
            .collect();

        if effective_labels.is_empty() {
            // Creation.
            let fresh = labels.allocate_fresh();
            labels.bulk_set(component.iter().copied(), fresh);
        } else {
            // Absorption/Merge.
            let k_star = *effective_labels.iter().max().unwrap();
            labels.bulk_set(component.iter().copied(), k_star);
            for &k in &effective_labels {
                labels.rename(k, k_star);
            }
        }
    }

    // Step 4 — propagate to borders.
    for &core in &new_cores {
        let label = labels.get(core).expect("new core must be labeled by now");
        let neighbors: Vec<_> = store
            .get(core)
            .expect("core must exist")
            .neighbors
            .iter()
            .copied()
            .collect();
        labels.bulk_set(neighbors, label);
    }
}
