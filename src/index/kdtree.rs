use std::collections::HashMap;

use crate::index::{IndexToken, RadiusIndex};
use crate::math::metric::Metric;
use crate::math::number::FloatNumber;
use crate::math::point::Point;

/// Points per leaf before a node stops splitting, mirroring the bucketed
/// k-d tree the radius search was adapted from.
const LEAF_SIZE: usize = 16;

enum Node<T> {
    Leaf {
        indices: Vec<usize>,
    },
    Internal {
        axis: usize,
        split_value: T,
        left: Box<Node<T>>,
        right: Box<Node<T>>,
    },
}

/// A k-d tree `RadiusIndex` that tolerates mutation by rebuilding lazily.
///
/// `insert`/`remove` only touch the flat point/token arrays and flip a dirty
/// flag; the tree itself is rebuilt from scratch the next time `query` runs.
/// This keeps amortized query cost close to a static tree's while still
/// satisfying the dynamic insert/remove contract.
pub struct KdTreeIndex<T, const N: usize> {
    metric: Metric<T>,
    points: Vec<Point<T, N>>,
    tokens: Vec<IndexToken>,
    slot_of: HashMap<IndexToken, usize>,
    root: Option<Node<T>>,
    dirty: bool,
}

impl<T: FloatNumber, const N: usize> KdTreeIndex<T, N> {
    pub fn new(metric: Metric<T>) -> Self {
        Self {
            metric,
            points: Vec::new(),
            tokens: Vec::new(),
            slot_of: HashMap::new(),
            root: None,
            dirty: false,
        }
    }

    fn rebuild(&mut self) {
        let mut indices: Vec<usize> = (0..self.points.len()).collect();
        self.root = if indices.is_empty() {
            None
        } else {
            Some(Self::build(&mut indices, &self.points))
        };
        self.dirty = false;
    }

    fn build(indices: &mut [usize], points: &[Point<T, N>]) -> Node<T> {
        if indices.len() <= LEAF_SIZE {
            return Node::Leaf {
                indices: indices.to_vec(),
            };
        }

        let depth_axis = {
            // Split on the axis with the widest spread among the candidates,
            // same bucketing idea as a round-robin median-split tree but more
            // resilient to degenerate axes (all-equal coordinates).
            let mut best_axis = 0;
            let mut best_spread = T::zero();
            for axis in 0..N {
                let (mut lo, mut hi) = (points[indices[0]][axis], points[indices[0]][axis]);
                for &i in indices.iter() {
                    let v = points[i][axis];
                    if v < lo {
                        lo = v;
                    }
                    if v > hi {
                        hi = v;
                    }
                }
                let spread = hi - lo;
                if spread > best_spread {
                    best_spread = spread;
                    best_axis = axis;
                }
            }
            best_axis
        };

        indices.sort_unstable_by(|&a, &b| {
            points[a][depth_axis]
                .partial_cmp(&points[b][depth_axis])
                .expect("coordinates must be finite")
        });

        let mid = indices.len() / 2;
        let split_value = points[indices[mid]][depth_axis];
        let (left_indices, right_indices) = indices.split_at_mut(mid);
        let left = Self::build(left_indices, points);
        let right = Self::build(right_indices, points);

        Node::Internal {
            axis: depth_axis,
            split_value,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn search_node(
        node: &Node<T>,
        query: &Point<T, N>,
        epsilon: T,
        points: &[Point<T, N>],
        metric: &Metric<T>,
        out: &mut Vec<usize>,
    ) {
        match node {
            Node::Leaf { indices } => {
                for &i in indices {
                    if metric.measure(query, &points[i]) <= epsilon {
                        out.push(i);
                    }
                }
            }
            Node::Internal {
                axis,
                split_value,
                left,
                right,
            } => {
                let delta = query[*axis] - *split_value;
                if delta <= epsilon {
                    Self::search_node(left, query, epsilon, points, metric, out);
                }
                if delta >= -epsilon {
                    Self::search_node(right, query, epsilon, points, metric, out);
                }
            }
        }
    }
}

impl<T: FloatNumber, const N: usize> RadiusIndex<T, N> for KdTreeIndex<T, N> {
    fn insert(&mut self, token: IndexToken, point: Point<T, N>) {
        let slot = self.points.len();
        self.points.push(point);
        self.tokens.push(token);
        self.slot_of.insert(token, slot);
        self.dirty = true;
    }

    fn remove(&mut self, token: IndexToken) {
        let Some(slot) = self.slot_of.remove(&token) else {
            return;
        };
        let last = self.points.len() - 1;
        self.points.swap_remove(slot);
        self.tokens.swap_remove(slot);
        if slot != last {
            let moved_token = self.tokens[slot];
            self.slot_of.insert(moved_token, slot);
        }
        self.dirty = true;
    }

    fn query_within_radius(&mut self, point: &Point<T, N>, epsilon: T) -> Vec<IndexToken> {
        if self.dirty {
            self.rebuild();
        }
        let Some(root) = &self.root else {
            return Vec::new();
        };
        let mut slots = Vec::new();
        Self::search_node(root, point, epsilon, &self.points, &self.metric, &mut slots);
        slots.into_iter().map(|slot| self.tokens[slot]).collect()
    }

    fn len(&self) -> usize {
        self.points.len()
    }
}
