use crate::cluster::{deleter, inserter};
use crate::error::Error;
use crate::index::kdtree::KdTreeIndex;
use crate::math::metric::Metric;
use crate::math::number::FloatNumber;
use crate::math::point::Point;
use crate::store::labels::{LabelStore, NOISE};
use crate::store::point_store::PointStore;

/// A point's cluster membership as seen from outside the engine.
///
/// `UNCLASSIFIED` is an internal-only transient state and is never returned
/// by [`Engine::label_of`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Noise,
    Cluster(u32),
}

impl Label {
    /// View matching the raw integer domain {-2, -1, 0, 1, ...}: NOISE is
    /// -1, cluster `k` is `k`. Useful for parity checks against reference
    /// implementations that use bare integer labels.
    pub fn as_raw(self) -> i64 {
        match self {
            Label::Noise => -1,
            Label::Cluster(k) => k as i64,
        }
    }

    fn from_raw(raw: i64) -> Self {
        if raw == NOISE {
            Label::Noise
        } else {
            debug_assert!(raw >= 0, "a live point must never surface UNCLASSIFIED");
            Label::Cluster(raw as u32)
        }
    }
}

/// Recoverable condition surfaced instead of failing the whole batch:
/// deleting or looking up a value the engine has never seen (or has fully
/// forgotten).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Warning {
    /// Position of the offending value within the batch that produced it.
    pub position: usize,
}

/// Maintains an exact incremental DBSCAN clustering over `Point<T, N>`
/// values under streaming inserts and deletes.
pub struct Engine<T, const N: usize> {
    min_points: usize,
    store: PointStore<T, N>,
    labels: LabelStore,
}

impl<T: FloatNumber, const N: usize> Engine<T, N> {
    pub fn new(epsilon: T, min_points: usize, metric: Metric<T>) -> Result<Self, Error<T>> {
        if !(epsilon > T::zero()) {
            return Err(Error::InvalidEpsilon(epsilon));
        }
        if min_points == 0 {
            return Err(Error::InvalidMinPoints(min_points));
        }
        if let Metric::Minkowski(p) = metric {
            if !(p >= T::one()) {
                return Err(Error::InvalidMinkowskiP(p));
            }
        }

        Ok(Self {
            min_points,
            store: PointStore::new(epsilon, Box::new(KdTreeIndex::new(metric))),
            labels: LabelStore::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn cluster_count(&self) -> usize {
        self.labels.cluster_count()
    }

    pub fn insert(&mut self, value: Point<T, N>) -> Result<(), Error<T>> {
        self.insert_batch([value]).map(|_| ())
    }

    pub fn insert_batch(
        &mut self,
        values: impl IntoIterator<Item = Point<T, N>>,
    ) -> Result<Vec<Warning>, Error<T>> {
        let values: Vec<_> = values.into_iter().collect();
        for value in &values {
            self.validate(value)?;
        }
        for value in values {
            inserter::insert(&mut self.store, &mut self.labels, self.min_points, value);
        }
        Ok(Vec::new())
    }

    pub fn delete_batch(&mut self, values: impl IntoIterator<Item = Point<T, N>>) -> Vec<Warning> {
        let mut warnings = Vec::new();
        for (position, value) in values.into_iter().enumerate() {
            let Some(id) = self.store.locate(&value) else {
                warnings.push(Warning { position });
                continue;
            };
            deleter::delete(&mut self.store, &mut self.labels, self.min_points, id);
        }
        warnings
    }

    pub fn label_of(&self, value: &Point<T, N>) -> Option<Label> {
        let id = self.store.locate(value)?;
        self.labels.get(id).map(Label::from_raw)
    }

    fn validate(&self, value: &Point<T, N>) -> Result<(), Error<T>> {
        for &coordinate in value.iter() {
            if !coordinate.is_finite() {
                return Err(Error::NonFiniteCoordinate(coordinate));
            }
        }
        Ok(())
    }
}
