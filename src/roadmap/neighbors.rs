use crate::roadmap::node::NodeId;
use crate::space::distance::Distance;
use crate::space::state::Configuration;
use kiddo::float::{distance::SquaredEuclidean, kdtree::Axis, kdtree::KdTree};
use num_traits::Float;

/// Spatial index over roadmap configurations, used for radius queries and
/// duplicate detection. The distance metric is passed at query time so
/// backends that honour it can do so.
pub trait NearestNeighbors<F: Float, const N: usize> {
    fn add(&mut self, q: Configuration<F, N>, item: NodeId);

    /// The stored item closest to `q`, with its distance.
    fn nearest_one(
        &self,
        q: &Configuration<F, N>,
        distance: &dyn Distance<F, N>,
    ) -> Option<(NodeId, F)>;

    /// All stored items within `radius` of `q`. Order unspecified.
    fn within_radius(
        &self,
        q: &Configuration<F, N>,
        radius: F,
        distance: &dyn Distance<F, N>,
    ) -> Vec<NodeId>;
}

/// Linear-scan backend. Honours the caller's metric exactly; the right
/// choice for small roadmaps or non-Euclidean distances.
pub struct LinearNearestNeighbors<F: Float, const N: usize> {
    entries: Vec<(Configuration<F, N>, NodeId)>,
}

impl<F: Float, const N: usize> LinearNearestNeighbors<F, N> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<F: Float, const N: usize> Default for LinearNearestNeighbors<F, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float, const N: usize> NearestNeighbors<F, N> for LinearNearestNeighbors<F, N> {
    fn add(&mut self, q: Configuration<F, N>, item: NodeId) {
        self.entries.push((q, item));
    }

    fn nearest_one(
        &self,
        q: &Configuration<F, N>,
        distance: &dyn Distance<F, N>,
    ) -> Option<(NodeId, F)> {
        let mut best: Option<(NodeId, F)> = None;
        for (p, item) in &self.entries {
            let d = distance.eval(q, p);
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((*item, d));
            }
        }
        best
    }

    fn within_radius(
        &self,
        q: &Configuration<F, N>,
        radius: F,
        distance: &dyn Distance<F, N>,
    ) -> Vec<NodeId> {
        self.entries
            .iter()
            .filter(|(p, _)| distance.eval(q, p) <= radius)
            .map(|(_, item)| *item)
            .collect()
    }
}

/// k-d tree backend over kiddo. Queries are Euclidean regardless of the
/// metric passed in; use [`LinearNearestNeighbors`] when the roadmap's
/// distance is not Euclidean.
pub struct KdTreeNearestNeighbors<F: Float + Axis, const N: usize> {
    kdtree: KdTree<F, usize, N, 32, u32>,
}

impl<F: Float + Axis, const N: usize> KdTreeNearestNeighbors<F, N> {
    pub fn new() -> Self {
        Self {
            kdtree: KdTree::new(),
        }
    }
}

impl<F: Float + Axis, const N: usize> Default for KdTreeNearestNeighbors<F, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float + Axis, const N: usize> NearestNeighbors<F, N> for KdTreeNearestNeighbors<F, N> {
    fn add(&mut self, q: Configuration<F, N>, item: NodeId) {
        self.kdtree.add(q.values(), item.index());
    }

    fn nearest_one(
        &self,
        q: &Configuration<F, N>,
        _distance: &dyn Distance<F, N>,
    ) -> Option<(NodeId, F)> {
        if self.kdtree.size() == 0 {
            return None;
        }
        let neighbor = self.kdtree.nearest_one::<SquaredEuclidean>(q.values());
        Some((NodeId(neighbor.item), neighbor.distance.sqrt()))
    }

    fn within_radius(
        &self,
        q: &Configuration<F, N>,
        radius: F,
        _distance: &dyn Distance<F, N>,
    ) -> Vec<NodeId> {
        self.kdtree
            .within_unsorted::<SquaredEuclidean>(q.values(), radius * radius)
            .iter()
            .map(|n| NodeId(n.item))
            .collect()
    }
}
