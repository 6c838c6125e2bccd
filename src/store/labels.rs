use std::collections::{HashMap, HashSet};

use crate::store::point_store::PointId;

/// Internal label domain: `UNCLASSIFIED` is never surfaced past the engine
/// boundary, `NOISE` and cluster ids (`>= 0`) are.
pub type RawLabel = i64;

pub const UNCLASSIFIED: RawLabel = -2;
pub const NOISE: RawLabel = -1;

/// Bidirectional point/label mapping with monotonic fresh-label allocation.
///
/// `next_fresh` only ever increases, even across renames that free a label
/// bucket — this keeps "most recent cluster" well-defined as "numerically
/// largest label" without ever reissuing a retired id.
pub struct LabelStore {
    label_of: HashMap<PointId, RawLabel>,
    points_of: HashMap<RawLabel, HashSet<PointId>>,
    next_fresh: RawLabel,
}

impl LabelStore {
    pub fn new() -> Self {
        Self {
            label_of: HashMap::new(),
            points_of: HashMap::new(),
            next_fresh: 0,
        }
    }

    pub fn get(&self, id: PointId) -> Option<RawLabel> {
        self.label_of.get(&id).copied()
    }

    pub fn set(&mut self, id: PointId, label: RawLabel) {
        if let Some(&old) = self.label_of.get(&id) {
            if old == label {
                return;
            }
            if let Some(bucket) = self.points_of.get_mut(&old) {
                bucket.remove(&id);
                if bucket.is_empty() {
                    self.points_of.remove(&old);
                }
            }
        }
        self.label_of.insert(id, label);
        self.points_of.entry(label).or_default().insert(id);
    }

    pub fn bulk_set(&mut self, ids: impl IntoIterator<Item = PointId>, label: RawLabel) {
        for id in ids {
            self.set(id, label);
        }
    }

    pub fn assign_unclassified(&mut self, id: PointId) {
        self.set(id, UNCLASSIFIED);
    }

    /// Reassigns every point carrying `from` to `to`, removing the `from`
    /// bucket entirely.
    pub fn rename(&mut self, from: RawLabel, to: RawLabel) {
        if from == to {
            return;
        }
        let Some(members) = self.points_of.remove(&from) else {
            return;
        };
        for &id in &members {
            self.label_of.insert(id, to);
        }
        self.points_of.entry(to).or_default().extend(members);
    }

    /// `max(known labels) + 1`, monotonically increasing.
    pub fn allocate_fresh(&mut self) -> RawLabel {
        let fresh = self.next_fresh;
        self.next_fresh += 1;
        fresh
    }

    pub fn forget(&mut self, id: PointId) {
        if let Some(label) = self.label_of.remove(&id) {
            if let Some(bucket) = self.points_of.get_mut(&label) {
                bucket.remove(&id);
                if bucket.is_empty() {
                    self.points_of.remove(&label);
                }
            }
        }
    }

    pub fn members_of(&self, label: RawLabel) -> impl Iterator<Item = PointId> + '_ {
        self.points_of
            .get(&label)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    pub fn cluster_count(&self) -> usize {
        self.points_of
            .keys()
            .filter(|&&label| label >= 0)
            .count()
    }
}

impl Default for LabelStore {
    fn default() -> Self {
        Self::new()
    }
}
