use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

use crate::index::{IndexToken, RadiusIndex};
use crate::math::number::FloatNumber;
use crate::math::point::Point;

/// Stable, content-derived identifier: the same numeric vector always
/// produces the same id, regardless of the caller's `f32`/`f64` choice,
/// because every coordinate is canonicalized to its `f64` bit pattern
/// before hashing.
pub type PointId = u64;

pub fn content_id<T: FloatNumber, const N: usize>(value: &Point<T, N>) -> PointId {
    let mut hasher = DefaultHasher::new();
    for &coordinate in value.iter() {
        coordinate.to_bits_f64().hash(&mut hasher);
    }
    hasher.finish()
}

/// A live point: its value, multiplicity, density, and distinct ε-close
/// neighbors (always including itself).
pub struct PointRecord<T, const N: usize> {
    pub id: PointId,
    pub value: Point<T, N>,
    pub count: usize,
    pub neighbor_count: usize,
    pub neighbors: HashSet<PointId>,
}

impl<T, const N: usize> PointRecord<T, N> {
    pub fn is_core(&self, min_points: usize) -> bool {
        self.neighbor_count >= min_points
    }
}

/// Snapshot returned by [`PointStore::insert`] describing the admitted
/// point and the neighbor set it reflects immediately after the update.
pub struct InsertEffect {
    pub id: PointId,
    pub is_new: bool,
    pub neighbors: Vec<PointId>,
}

/// Snapshot returned by [`PointStore::delete`]. Captured before the
/// counters are decremented so callers can tell ex-cores from the point's
/// pre-deletion state even after the record itself may be gone.
pub struct DeleteEffect {
    pub id: PointId,
    pub neighbor_ids: Vec<PointId>,
    pub was_core_before: bool,
    pub fully_removed: bool,
}

/// Sole owner of Point records, their undirected ε-neighbor graph, and the
/// radius index that backs neighbor discovery.
///
/// Points live in a dense arena addressed by slot; `PointId` (a content
/// hash) never changes for a living point's value, so neighbor sets and
/// the radius index key off `PointId` rather than the arena slot, which is
/// only a lookup optimization invisible to the rest of the crate.
pub struct PointStore<T, const N: usize> {
    epsilon: T,
    slots: Vec<PointRecord<T, N>>,
    slot_of: HashMap<PointId, usize>,
    index: Box<dyn RadiusIndex<T, N>>,
}

impl<T: FloatNumber, const N: usize> PointStore<T, N> {
    pub fn new(epsilon: T, index: Box<dyn RadiusIndex<T, N>>) -> Self {
        Self {
            epsilon,
            slots: Vec::new(),
            slot_of: HashMap::new(),
            index,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn locate(&self, value: &Point<T, N>) -> Option<PointId> {
        let id = content_id(value);
        self.slot_of.contains_key(&id).then_some(id)
    }

    pub fn get(&self, id: PointId) -> Option<&PointRecord<T, N>> {
        self.slot_of.get(&id).map(|&slot| &self.slots[slot])
    }

    fn get_mut(&mut self, id: PointId) -> Option<&mut PointRecord<T, N>> {
        self.slot_of.get(&id).map(|&slot| &mut self.slots[slot])
    }

    pub fn is_core(&self, id: PointId, min_points: usize) -> bool {
        self.get(id).is_some_and(|p| p.is_core(min_points))
    }

    /// Admits `value`: increments multiplicity if already present, otherwise
    /// creates a new isolated point and wires it into the graph and index.
    pub fn insert(&mut self, value: Point<T, N>) -> InsertEffect {
        let id = content_id(&value);

        if self.slot_of.contains_key(&id) {
            let neighbor_ids: Vec<PointId> = self.get(id).unwrap().neighbors.iter().copied().collect();
            {
                let point = self.get_mut(id).unwrap();
                point.count += 1;
            }
            for neighbor in &neighbor_ids {
                self.get_mut(*neighbor).unwrap().neighbor_count += 1;
            }
            return InsertEffect {
                id,
                is_new: false,
                neighbors: neighbor_ids,
            };
        }

        // Query existing points before this one is added to the index, so
        // the result never contains `id` itself.
        let nearby = self.index.query_within_radius(&value, self.epsilon);

        let record = PointRecord {
            id,
            value,
            count: 1,
            neighbor_count: 1,
            neighbors: HashSet::from([id]),
        };
        let slot = self.slots.len();
        self.slots.push(record);
        self.slot_of.insert(id, slot);
        self.index.insert(id as IndexToken, value);

        for neighbor_token in nearby {
            let neighbor_id = neighbor_token as PointId;
            if neighbor_id == id {
                continue;
            }
            let neighbor_count_contribution = self.get(neighbor_id).unwrap().count;

            {
                let neighbor = self.get_mut(neighbor_id).unwrap();
                neighbor.neighbor_count += 1;
                neighbor.neighbors.insert(id);
            }
            {
                let point = self.get_mut(id).unwrap();
                point.neighbor_count += neighbor_count_contribution;
                point.neighbors.insert(neighbor_id);
            }
        }

        let neighbors = self.get(id).unwrap().neighbors.iter().copied().collect();
        InsertEffect {
            id,
            is_new: true,
            neighbors,
        }
    }

    /// Retracts one occurrence of `id`. Returns `None` if `id` is unknown.
    pub fn delete(&mut self, id: PointId, min_points: usize) -> Option<DeleteEffect> {
        let slot = *self.slot_of.get(&id)?;
        let neighbor_ids: Vec<PointId> = self.slots[slot].neighbors.iter().copied().collect();
        let was_core_before = self.slots[slot].neighbor_count >= min_points;

        self.slots[slot].count -= 1;
        for &neighbor in &neighbor_ids {
            if let Some(neighbor_slot) = self.slot_of.get(&neighbor).copied() {
                self.slots[neighbor_slot].neighbor_count -= 1;
            }
        }

        let fully_removed = self.slots[slot].count == 0;
        if fully_removed {
            for &neighbor in &neighbor_ids {
                if neighbor == id {
                    continue;
                }
                if let Some(neighbor_slot) = self.slot_of.get(&neighbor).copied() {
                    self.slots[neighbor_slot].neighbors.remove(&id);
                }
            }
            self.index.remove(id as IndexToken);
            self.remove_slot(slot);
        }

        Some(DeleteEffect {
            id,
            neighbor_ids,
            was_core_before,
            fully_removed,
        })
    }

    fn remove_slot(&mut self, slot: usize) {
        let removed_id = self.slots[slot].id;
        let last = self.slots.len() - 1;
        self.slots.swap_remove(slot);
        self.slot_of.remove(&removed_id);
        if slot != last {
            let moved_id = self.slots[slot].id;
            self.slot_of.insert(moved_id, slot);
        }
    }

    /// Partitions `subset` into the maximal groups mutually connected in
    /// the subgraph induced by `subset` alone, via union-find — no copy of
    /// the full graph is allocated.
    pub fn connected_components(&self, subset: &[PointId]) -> Vec<Vec<PointId>> {
        let present: HashSet<PointId> = subset.iter().copied().collect();
        let mut parent: HashMap<PointId, PointId> =
            subset.iter().map(|&id| (id, id)).collect();

        fn find(parent: &mut HashMap<PointId, PointId>, x: PointId) -> PointId {
            let p = parent[&x];
            if p == x {
                return x;
            }
            let root = find(parent, p);
            parent.insert(x, root);
            root
        }

        fn union(parent: &mut HashMap<PointId, PointId>, a: PointId, b: PointId) {
            let ra = find(parent, a);
            let rb = find(parent, b);
            if ra != rb {
                parent.insert(ra, rb);
            }
        }

        for &id in subset {
            let Some(record) = self.get(id) else { continue };
            for &neighbor in &record.neighbors {
                if neighbor != id && present.contains(&neighbor) {
                    union(&mut parent, id, neighbor);
                }
            }
        }

        let mut groups: HashMap<PointId, Vec<PointId>> = HashMap::new();
        for &id in subset {
            let root = find(&mut parent, id);
            groups.entry(root).or_default().push(id);
        }
        groups.into_values().collect()
    }
}
