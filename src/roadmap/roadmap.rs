use crate::path::PathPtr;
use crate::roadmap::components::ConnectedComponents;
use crate::roadmap::neighbors::{KdTreeNearestNeighbors, LinearNearestNeighbors, NearestNeighbors};
use crate::roadmap::node::{Edge, EdgeId, Node, NodeId};
use crate::space::distance::Distance;
use crate::space::state::Configuration;
use kiddo::float::kdtree::Axis;
use num_traits::Float;
use std::rc::Rc;

/// Snapshot handle to a connected component: the component containing the
/// node the handle was taken from. The handle stays meaningful across
/// merges, always denoting that node's current component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CcId(pub(crate) usize);

/// The bidirected graph built by sampling planners.
///
/// The roadmap owns every node and edge; parent maps and planners hold
/// `NodeId`/`EdgeId` handles into the arenas. Nodes are appended, never
/// removed during a solve.
pub struct Roadmap<F: Float, const N: usize> {
    nodes: Vec<Node<F, N>>,
    edges: Vec<Edge<F, N>>,
    distance: Rc<dyn Distance<F, N>>,
    neighbors: Box<dyn NearestNeighbors<F, N>>,
    components: ConnectedComponents,
    init_node: Option<NodeId>,
    goal_nodes: Vec<NodeId>,
}

impl<F: Float, const N: usize> Roadmap<F, N> {
    pub fn new(distance: Rc<dyn Distance<F, N>>, neighbors: Box<dyn NearestNeighbors<F, N>>) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            distance,
            neighbors,
            components: ConnectedComponents::new(),
            init_node: None,
            goal_nodes: Vec::new(),
        }
    }

    /// Roadmap with a linear-scan neighbor backend; honours any metric.
    pub fn with_linear(distance: Rc<dyn Distance<F, N>>) -> Self
    where
        F: 'static,
    {
        Self::new(distance, Box::new(LinearNearestNeighbors::new()))
    }

    /// Roadmap with a k-d tree backend; radius queries assume the metric
    /// is Euclidean.
    pub fn with_kd_tree(distance: Rc<dyn Distance<F, N>>) -> Self
    where
        F: Axis + 'static,
    {
        Self::new(distance, Box::new(KdTreeNearestNeighbors::new()))
    }

    /// Inserts a configuration as a fresh node in a new singleton
    /// component, or returns the existing node when an identical
    /// configuration (value equality) is already present anywhere in the
    /// roadmap. The reuse is what lets an edge added right after connect
    /// two components grown separately towards the same configuration.
    pub fn add_node(&mut self, q: Configuration<F, N>) -> NodeId {
        if let Some((nearest, _)) = self.neighbors.nearest_one(&q, &*self.distance) {
            if *self.nodes[nearest.index()].configuration() == q {
                return nearest;
            }
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(q));
        self.components.add();
        self.neighbors.add(q, id);
        id
    }

    /// Inserts a directed edge, merging the endpoint components when they
    /// differ. Callers pair it with a reverse edge when bidirectional
    /// traversal is intended.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, path: PathPtr<F, N>) -> EdgeId {
        debug_assert!(
            self.distance
                .eval(&path.initial(), self.nodes[from.index()].configuration())
                < F::from(1e-6).unwrap(),
            "edge path must start at the from node"
        );
        debug_assert!(
            self.distance
                .eval(&path.end(), self.nodes[to.index()].configuration())
                < F::from(1e-6).unwrap(),
            "edge path must end at the to node"
        );
        let id = EdgeId(self.edges.len());
        self.edges.push(Edge::new(from, to, path));
        self.nodes[from.index()].push_out_edge(id);
        self.nodes[to.index()].push_in_edge(id);
        self.components.union(from.index(), to.index());
        id
    }

    /// The node closest to `q` under the roadmap metric, restricted to a
    /// component when one is given. Ties break towards the lowest node id.
    pub fn nearest_node(&self, q: &Configuration<F, N>, cc: Option<CcId>) -> Option<(NodeId, F)> {
        let mut best: Option<(NodeId, F)> = None;
        for (i, node) in self.nodes.iter().enumerate() {
            if let Some(cc) = cc {
                if !self.components.same(i, cc.0) {
                    continue;
                }
            }
            let d = self.distance.eval(q, node.configuration());
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((NodeId(i), d));
            }
        }
        best
    }

    /// All nodes of component `cc` within `radius` of `q`.
    pub fn nodes_within_ball(&self, q: &Configuration<F, N>, cc: CcId, radius: F) -> Vec<NodeId> {
        self.neighbors
            .within_radius(q, radius, &*self.distance)
            .into_iter()
            .filter(|n| self.components.same(n.index(), cc.0))
            .collect()
    }

    pub fn connected_component_of(&self, node: NodeId) -> CcId {
        CcId(self.components.find(node.index()))
    }

    pub fn in_same_component(&self, a: NodeId, b: NodeId) -> bool {
        self.components.same(a.index(), b.index())
    }

    pub fn component_count(&self) -> usize {
        self.components.count()
    }

    pub fn connected_components(&self) -> Vec<CcId> {
        self.components
            .representatives()
            .into_iter()
            .map(CcId)
            .collect()
    }

    /// True iff the init node shares a component with some goal node.
    pub fn path_exists(&self) -> bool {
        match self.init_node {
            Some(init) => self
                .goal_nodes
                .iter()
                .any(|g| self.components.same(init.index(), g.index())),
            None => false,
        }
    }

    pub fn set_init_config(&mut self, q: Configuration<F, N>) -> NodeId {
        let id = self.add_node(q);
        self.init_node = Some(id);
        id
    }

    pub fn add_goal_config(&mut self, q: Configuration<F, N>) -> NodeId {
        let id = self.add_node(q);
        if !self.goal_nodes.contains(&id) {
            self.goal_nodes.push(id);
        }
        id
    }

    pub fn init_node(&self) -> Option<NodeId> {
        self.init_node
    }

    pub fn goal_nodes(&self) -> &[NodeId] {
        &self.goal_nodes
    }

    pub fn node(&self, id: NodeId) -> &Node<F, N> {
        &self.nodes[id.index()]
    }

    pub fn edge(&self, id: EdgeId) -> &Edge<F, N> {
        &self.edges[id.index()]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> {
        (0..self.edges.len()).map(EdgeId)
    }

    pub fn distance(&self) -> &Rc<dyn Distance<F, N>> {
        &self.distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::StraightPath;
    use crate::space::distance::EuclideanDistance;

    fn roadmap() -> Roadmap<f64, 2> {
        Roadmap::with_linear(Rc::new(EuclideanDistance))
    }

    fn straight(a: &Configuration<f64, 2>, b: &Configuration<f64, 2>) -> PathPtr<f64, 2> {
        Rc::new(StraightPath::new(*a, *b, a.euclidean_distance(b), None))
    }

    #[test]
    fn add_node_deduplicates_identical_configurations() {
        let mut r = roadmap();
        let a = r.add_node(Configuration::new([1.0, 2.0]));
        let b = r.add_node(Configuration::new([1.0, 2.0]));
        assert_eq!(a, b);
        assert_eq!(r.node_count(), 1);
        let c = r.add_node(Configuration::new([1.0, 2.5]));
        assert_ne!(a, c);
        assert_eq!(r.node_count(), 2);
    }

    #[test]
    fn add_edge_merges_components_and_updates_edge_lists() {
        let mut r = roadmap();
        let qa = Configuration::new([0.0, 0.0]);
        let qb = Configuration::new([1.0, 0.0]);
        let a = r.add_node(qa);
        let b = r.add_node(qb);
        assert_eq!(r.component_count(), 2);
        let e = r.add_edge(a, b, straight(&qa, &qb));
        assert_eq!(r.component_count(), 1);
        assert!(r.in_same_component(a, b));
        assert_eq!(r.node(a).out_edges(), &[e]);
        assert_eq!(r.node(b).in_edges(), &[e]);
        assert_eq!(r.edge(e).from(), a);
        assert_eq!(r.edge(e).to(), b);
    }

    #[test]
    fn edge_endpoints_match_node_configurations() {
        let mut r = roadmap();
        let qa = Configuration::new([0.0, 0.0]);
        let qb = Configuration::new([2.0, 0.0]);
        let a = r.add_node(qa);
        let b = r.add_node(qb);
        let e = r.add_edge(a, b, straight(&qa, &qb));
        let edge = r.edge(e);
        assert_eq!(edge.path().initial(), *r.node(a).configuration());
        assert_eq!(edge.path().end(), *r.node(b).configuration());
    }

    #[test]
    fn nearest_node_respects_component_filter() {
        let mut r = roadmap();
        let a = r.add_node(Configuration::new([0.0, 0.0]));
        let b = r.add_node(Configuration::new([10.0, 0.0]));
        let q = Configuration::new([9.0, 0.0]);
        let (any, _) = r.nearest_node(&q, None).unwrap();
        assert_eq!(any, b);
        let cc_a = r.connected_component_of(a);
        let (in_a, d) = r.nearest_node(&q, Some(cc_a)).unwrap();
        assert_eq!(in_a, a);
        assert_eq!(d, 9.0);
    }

    #[test]
    fn ball_query_filters_by_component() {
        let mut r = roadmap();
        let qa = Configuration::new([0.0, 0.0]);
        let qb = Configuration::new([0.5, 0.0]);
        let a = r.add_node(qa);
        let b = r.add_node(qb);
        let _far = r.add_node(Configuration::new([0.4, 0.1]));
        r.add_edge(a, b, straight(&qa, &qb));
        let cc = r.connected_component_of(a);
        let mut ball = r.nodes_within_ball(&qa, cc, 1.0);
        ball.sort();
        assert_eq!(ball, vec![a, b]);
    }

    #[test]
    fn path_exists_tracks_init_and_goal_components() {
        let mut r = roadmap();
        let qi = Configuration::new([0.0, 0.0]);
        let qg = Configuration::new([1.0, 0.0]);
        let init = r.set_init_config(qi);
        let goal = r.add_goal_config(qg);
        assert!(!r.path_exists());
        r.add_edge(init, goal, straight(&qi, &qg));
        assert!(r.path_exists());
    }

    #[test]
    fn cc_handle_survives_merges() {
        let mut r = roadmap();
        let qa = Configuration::new([0.0, 0.0]);
        let qb = Configuration::new([1.0, 0.0]);
        let qc = Configuration::new([2.0, 0.0]);
        let a = r.add_node(qa);
        let b = r.add_node(qb);
        let c = r.add_node(qc);
        let cc_c = r.connected_component_of(c);
        r.add_edge(a, b, straight(&qa, &qb));
        r.add_edge(b, c, straight(&qb, &qc));
        // After the merges the handle denotes the merged component.
        assert_eq!(r.nodes_within_ball(&qa, cc_c, 10.0).len(), 3);
    }
}
