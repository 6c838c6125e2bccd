use std::collections::{HashMap, HashSet, VecDeque};

use crate::math::number::FloatNumber;
use crate::store::point_store::{PointId, PointStore};

/// Union-find over the core points discovered while exploring from the
/// seeds, used both to attribute each discovered vertex to a seed group and
/// to merge groups on non-tree edges.
struct SeedUnionFind {
    parent: HashMap<PointId, PointId>,
}

impl SeedUnionFind {
    fn new() -> Self {
        Self {
            parent: HashMap::new(),
        }
    }

    fn make(&mut self, id: PointId) {
        self.parent.entry(id).or_insert(id);
    }

    fn find(&mut self, id: PointId) -> PointId {
        let p = *self.parent.get(&id).unwrap_or(&id);
        if p == id {
            return id;
        }
        let root = self.find(p);
        self.parent.insert(id, root);
        root
    }

    fn union(&mut self, a: PointId, b: PointId) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent.insert(ra, rb);
        }
    }
}

/// Multi-seed bounded BFS: decides whether removing an edge has split a
/// cluster reachable from `seeds` and, if so, returns every fully-explored
/// component other than the one still pending when the search stopped.
///
/// Only core points transfer between clusters in a split — non-core
/// neighbors are pruned on discovery and handled separately as border
/// reclassification.
pub fn find_components_to_split_away<T: FloatNumber, const N: usize>(
    store: &PointStore<T, N>,
    seeds: &[PointId],
    min_points: usize,
) -> Vec<Vec<PointId>> {
    if seeds.len() <= 1 {
        return Vec::new();
    }
    if seeds_are_pairwise_neighbors(store, seeds) {
        return Vec::new();
    }

    let mut uf = SeedUnionFind::new();
    let mut discovered: HashSet<PointId> = HashSet::new();
    let mut queue: VecDeque<(PointId, PointId)> = VecDeque::new();

    for &seed in seeds {
        uf.make(seed);
        discovered.insert(seed);
        queue.push_back((seed, seed));
    }

    let remaining_root = loop {
        let distinct_roots: HashSet<PointId> =
            queue.iter().map(|&(_, seed)| uf.find(seed)).collect();
        if distinct_roots.len() <= 1 {
            break queue.front().map(|&(_, seed)| seed);
        }

        let Some((node, seed_tag)) = queue.pop_front() else {
            break None;
        };
        let seed_root = uf.find(seed_tag);

        let Some(record) = store.get(node) else {
            continue;
        };
        for &neighbor in &record.neighbors {
            if neighbor == node {
                continue;
            }
            if !store.is_core(neighbor, min_points) {
                continue;
            }
            if discovered.contains(&neighbor) {
                let neighbor_root = uf.find(neighbor);
                if neighbor_root != seed_root {
                    uf.union(seed_root, neighbor_root);
                }
            } else {
                discovered.insert(neighbor);
                uf.make(neighbor);
                uf.union(seed_root, neighbor);
                let root_after = uf.find(neighbor);
                queue.push_back((neighbor, root_after));
            }
        }
    };

    let mut components: HashMap<PointId, Vec<PointId>> = HashMap::new();
    for &id in &discovered {
        let root = uf.find(id);
        components.entry(root).or_default().push(id);
    }

    let remaining_root = remaining_root
        .map(|tag| uf.find(tag))
        .unwrap_or_else(|| {
            // Every frontier drained simultaneously: fall back to keeping
            // the largest discovered component, matching the deleter's
            // "largest component keeps the label" rule.
            components
                .iter()
                .max_by_key(|(_, members)| members.len())
                .map(|(&root, _)| root)
                .unwrap_or_default()
        });

    components
        .into_iter()
        .filter(|(root, _)| *root != remaining_root)
        .map(|(_, members)| members)
        .collect()
}

fn seeds_are_pairwise_neighbors<T: FloatNumber, const N: usize>(
    store: &PointStore<T, N>,
    seeds: &[PointId],
) -> bool {
    for (i, &a) in seeds.iter().enumerate() {
        for &b in &seeds[i + 1..] {
            let Some(record) = store.get(a) else {
                return false;
            };
            if !record.neighbors.contains(&b) {
                return false;
            }
        }
    }
    true
}
