use crate::error::{Error, Result};
use crate::path::{PathPtr, PathVector, StraightPath};
use crate::planner::PathPlanner;
use crate::problem::Problem;
use crate::roadmap::{CcId, EdgeId, NodeId, Roadmap};
use crate::space::state::Configuration;
use log::{debug, error, trace};
use num_traits::Float;
use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap};
use std::rc::Rc;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Per-tree parent map: each node maps to its incoming tree edge, the
/// root maps to None. For every non-root key `n`, `map[n].to() == n` and
/// `map[n].from()` is itself a key.
pub(crate) type ParentMap = HashMap<NodeId, Option<EdgeId>>;

fn format_configuration<F: Float, const N: usize>(q: &Configuration<F, N>) -> String {
    let values: Vec<f64> = q.values().iter().filter_map(|v| v.to_f64()).collect();
    format!("{:?}", values)
}

/// Cost of `node` in the tree described by `map`: the sum of edge path
/// lengths along the parent chain back to the root. O(depth).
fn compute_cost<F: Float, const N: usize>(
    map: &ParentMap,
    roadmap: &Roadmap<F, N>,
    node: NodeId,
) -> F {
    let mut cost = F::zero();
    let mut current = node;
    loop {
        match map.get(&current) {
            Some(Some(edge_id)) => {
                let edge = roadmap.edge(*edge_id);
                cost = cost + edge.path().length();
                current = edge.from();
            }
            Some(None) => return cost,
            None => {
                error!(
                    "node has no parent in the tree map, configuration {}",
                    format_configuration(roadmap.node(current).configuration())
                );
                debug_assert!(false, "node missing from parent map");
                return cost;
            }
        }
    }
}

fn set_parent<F: Float, const N: usize>(
    map: &mut ParentMap,
    roadmap: &Roadmap<F, N>,
    node: NodeId,
    edge: Option<EdgeId>,
) {
    if let Some(edge_id) = edge {
        let e = roadmap.edge(edge_id);
        debug_assert_eq!(e.to(), node);
        if !map.contains_key(&e.from()) {
            error!(
                "source of the new parent edge is not in the tree map, configuration {}",
                format_configuration(roadmap.node(e.from()).configuration())
            );
            debug_assert!(false, "parent edge source missing from tree map");
        }
    }
    map.insert(node, edge);
}

struct WeighedNode<F: Float> {
    node: NodeId,
    parent: Option<EdgeId>,
    cost: F,
}

impl<F: Float> PartialEq for WeighedNode<F> {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost
    }
}

impl<F: Float> Eq for WeighedNode<F> {}

impl<F: Float> PartialOrd for WeighedNode<F> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<F: Float> Ord for WeighedNode<F> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Costs are finite sums of path lengths, never NaN.
        self.cost
            .partial_cmp(&other.cost)
            .expect("cannot order NaN costs")
    }
}

/// Rebuilds the parent map of the tree rooted at `root` by a best-first
/// traversal over outbound edges, weighing each edge by its path length.
///
/// The binary heap hands back the largest cost first, so the first pop of
/// a node records the most expensive known route to it; a later pop with
/// a cheaper route overwrites the stored cost and parent and re-expands
/// the children. The map converges to shortest-path parents, which is
/// what the cost bookkeeping reads afterwards.
/// TODO: benchmark against a standard min-heap Dijkstra and switch once
/// the planner's cost regression tests cover the rebuild.
pub(crate) fn compute_parent_map<F: Float, const N: usize>(
    roadmap: &Roadmap<F, N>,
    root: NodeId,
) -> ParentMap {
    let mut visited: HashMap<NodeId, (Option<EdgeId>, F)> = HashMap::new();
    let mut queue: BinaryHeap<WeighedNode<F>> = BinaryHeap::new();
    queue.push(WeighedNode {
        node: root,
        parent: None,
        cost: F::zero(),
    });

    while let Some(current) = queue.pop() {
        let add_children = match visited.entry(current.node) {
            Entry::Vacant(entry) => {
                entry.insert((current.parent, current.cost));
                true
            }
            Entry::Occupied(mut entry) => {
                if entry.get().1 > current.cost {
                    entry.insert((current.parent, current.cost));
                    true
                } else {
                    false
                }
            }
        };
        if add_children {
            for &edge_id in roadmap.node(current.node).out_edges() {
                let edge = roadmap.edge(edge_id);
                queue.push(WeighedNode {
                    node: edge.to(),
                    parent: Some(edge_id),
                    cost: current.cost + edge.path().length(),
                });
            }
        }
    }

    visited
        .into_iter()
        .map(|(node, (parent, _))| (node, parent))
        .collect()
}

/// Bidirectional RRT* planner.
///
/// Two trees are grown on the shared roadmap, one rooted at the init
/// node and one at the single goal node. While the trees are disjoint,
/// each step extends one tree towards a sample and tries to connect the
/// other to the reached configuration; the roles swap every step. Once
/// the trees merge, every step inserts an improving node and rewires both
/// trees around it.
///
/// The trees live in the `to_root` parent maps only; the roadmap stores
/// the union of both trees' edges (each with its reverse twin) in one
/// adjacency.
pub struct BiRrtStar<F: Float, const N: usize> {
    problem: Problem<F, N>,
    roadmap: Roadmap<F, N>,
    gamma: F,
    extend_max_length: F,
    roots: [NodeId; 2],
    to_root: [ParentMap; 2],
    interrupt: Arc<AtomicBool>,
}

impl<F: Float + 'static, const N: usize> BiRrtStar<F, N> {
    pub fn new(problem: Problem<F, N>, roadmap: Roadmap<F, N>) -> Self {
        Self {
            problem,
            roadmap,
            gamma: F::one(),
            extend_max_length: F::one(),
            roots: [NodeId(0); 2],
            to_root: [ParentMap::new(), ParentMap::new()],
            interrupt: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Factory with the registry signature.
    pub fn create(problem: Problem<F, N>, roadmap: Roadmap<F, N>) -> Box<dyn PathPlanner<F, N>> {
        Box::new(Self::new(problem, roadmap))
    }

    /// Builds a steered, optionally projected, optionally truncated and
    /// optionally validated path from `q0` to `q1`. A None is routine and
    /// means the candidate is dropped for this step.
    fn build_path(
        &self,
        q0: &Configuration<F, N>,
        q1: &Configuration<F, N>,
        max_length: F,
        validate_path: bool,
    ) -> Option<PathPtr<F, N>> {
        let mut path = self.problem.steering_method().steer(q0, q1)?;
        if let Some(projector) = self.problem.path_projector() {
            path = projector.apply(&path)?;
        }
        if max_length > F::zero() && path.length() > max_length {
            let (t0, _) = path.time_range();
            path = path.extract(t0, t0 + max_length);
        }
        if !validate_path {
            return Some(path);
        }
        Some(self.problem.path_validation().validate(&path, false).valid_part)
    }

    fn validate_fully(&self, path: &PathPtr<F, N>) -> bool {
        self.problem.path_validation().validate(path, false).valid
    }

    /// Neighbourhood of `q` in component `cc`, using the shrinking
    /// rewiring radius `min(gamma (log n / n)^(1/dof), extend_max_length)`.
    fn near_nodes(&self, q: &Configuration<F, N>, cc: CcId) -> Vec<NodeId> {
        let n = F::from(self.roadmap.node_count()).unwrap();
        let dof = F::from(self.problem.robot().number_dof()).unwrap();
        let radius = (self.gamma * (n.ln() / n).powf(F::one() / dof)).min(self.extend_max_length);
        self.roadmap.nodes_within_ball(q, cc, radius)
    }

    /// Grows the tree `tree` towards `q`.
    ///
    /// `q` is overwritten with the configuration actually reached when
    /// validation truncates the candidate path. Returns false when the
    /// sample is degenerate or no valid path could be built.
    fn extend(&mut self, tree: usize, q: &mut Configuration<F, N>) -> bool {
        let target = self.roots[tree];
        let cc = self.roadmap.connected_component_of(target);

        let (mut near, dist) = match self.roadmap.nearest_node(q, Some(cc)) {
            Some(found) => found,
            None => return false,
        };
        if dist < F::from(1e-16).unwrap() {
            return false;
        }

        let near_q = *self.roadmap.node(near).configuration();
        let mut path = match self.build_path(&near_q, q, self.extend_max_length, true) {
            Some(path) if path.length() >= F::from(1e-10).unwrap() => path,
            _ => return false,
        };
        *q = path.end();

        let near_nodes = self.near_nodes(q, cc);

        let mut cost_q = compute_cost(&self.to_root[tree], &self.roadmap, near) + path.length();
        // Per neighbour: (validation attempted and passed if kept, path).
        // A neighbour whose validation failed keeps the flag but loses
        // the path, so the rewiring pass skips it.
        let mut paths: Vec<(bool, Option<PathPtr<F, N>>)> = Vec::with_capacity(near_nodes.len());
        for &nb in &near_nodes {
            if nb == near {
                paths.push((true, Some(Rc::clone(&path))));
                continue;
            }
            let nb_q = *self.roadmap.node(nb).configuration();
            let nb2new = self.build_path(&nb_q, q, F::from(-1.0).unwrap(), false);
            paths.push((false, nb2new.clone()));
            let nb2new = match nb2new {
                Some(nb2new) => nb2new,
                None => continue,
            };
            let candidate_cost =
                compute_cost(&self.to_root[tree], &self.roadmap, nb) + nb2new.length();
            if candidate_cost < cost_q {
                paths.last_mut().unwrap().0 = true;
                if self.validate_fully(&nb2new) {
                    // Valid and shorter: adopt this parent instead.
                    cost_q = candidate_cost;
                    near = nb;
                    path = nb2new;
                } else {
                    paths.last_mut().unwrap().1 = None;
                }
            }
        }

        let qnew = self.roadmap.add_node(*q);
        let edge = self.roadmap.add_edge(near, qnew, Rc::clone(&path));
        self.roadmap.add_edge(qnew, near, path.reverse());
        debug_assert!(self.to_root[tree].contains_key(&near));
        set_parent(&mut self.to_root[tree], &self.roadmap, qnew, Some(edge));

        for (i, &nb) in near_nodes.iter().enumerate() {
            if nb == near {
                continue;
            }
            let p_nb = match paths[i].1.clone() {
                Some(p_nb) => p_nb,
                None => continue,
            };
            let rewired_cost = cost_q + p_nb.length();
            if rewired_cost < compute_cost(&self.to_root[tree], &self.roadmap, nb) {
                let path_valid = paths[i].0 || self.validate_fully(&p_nb);
                if path_valid {
                    self.roadmap.add_edge(nb, qnew, Rc::clone(&p_nb));
                    let rewire_edge = self.roadmap.add_edge(qnew, nb, p_nb.reverse());
                    set_parent(&mut self.to_root[tree], &self.roadmap, nb, Some(rewire_edge));
                    trace!(
                        "[BiRRT*] rewired a neighbour through the new node, cost {:?}",
                        rewired_cost.to_f64()
                    );
                }
            }
        }
        true
    }

    /// Repeatedly extends tree `tree` towards a fresh copy of `q` until
    /// the two components merge or an extension fails. Termination is by
    /// component count only, not by reaching `q`.
    fn connect(&mut self, tree: usize, q: &Configuration<F, N>) -> bool {
        while self.roadmap.component_count() == 2 {
            let mut q_copy = *q;
            if !self.extend(tree, &mut q_copy) {
                return false;
            }
        }
        true
    }

    /// One-component phase step: inserts a node near `q` and runs the
    /// adopt-and-rewire pass once per tree, sharing the new node.
    fn improve(&mut self, q: &Configuration<F, N>) -> bool {
        let (mut near, dist) = match self.roadmap.nearest_node(q, None) {
            Some(found) => found,
            None => return false,
        };
        if dist < F::from(1e-16).unwrap() {
            return false;
        }

        let near_q = *self.roadmap.node(near).configuration();
        let path = match self.build_path(&near_q, q, self.extend_max_length, true) {
            Some(path) if path.length() >= F::from(1e-10).unwrap() => path,
            _ => return false,
        };
        // Work with the configuration actually reached, so every edge
        // added below ends where its path does.
        let q = path.end();

        let cc = self.roadmap.connected_component_of(self.roots[0]);
        let near_nodes = self.near_nodes(&q, cc);
        let qnew = self.roadmap.add_node(q);

        for k in 0..2 {
            let mut to_qnew = Rc::clone(&path);
            let mut cost_q = compute_cost(&self.to_root[k], &self.roadmap, near) + to_qnew.length();

            let mut paths: Vec<(bool, Option<PathPtr<F, N>>)> =
                Vec::with_capacity(near_nodes.len());
            for &nb in &near_nodes {
                if nb == near {
                    paths.push((true, Some(Rc::clone(&to_qnew))));
                    continue;
                }
                let nb_q = *self.roadmap.node(nb).configuration();
                let nb2new = self.build_path(&nb_q, &q, F::from(-1.0).unwrap(), false);
                paths.push((false, nb2new.clone()));
                let nb2new = match nb2new {
                    Some(nb2new) => nb2new,
                    None => continue,
                };
                let candidate_cost =
                    compute_cost(&self.to_root[k], &self.roadmap, nb) + nb2new.length();
                if candidate_cost < cost_q {
                    paths.last_mut().unwrap().0 = true;
                    if self.validate_fully(&nb2new) {
                        cost_q = candidate_cost;
                        near = nb;
                        to_qnew = nb2new;
                    } else {
                        paths.last_mut().unwrap().1 = None;
                    }
                }
            }

            let edge = self.roadmap.add_edge(near, qnew, Rc::clone(&to_qnew));
            self.roadmap.add_edge(qnew, near, to_qnew.reverse());
            debug_assert!(self.to_root[k].contains_key(&near));
            set_parent(&mut self.to_root[k], &self.roadmap, qnew, Some(edge));

            for (i, &nb) in near_nodes.iter().enumerate() {
                if nb == near {
                    continue;
                }
                let p_nb = match paths[i].1.clone() {
                    Some(p_nb) => p_nb,
                    None => continue,
                };
                let rewired_cost = cost_q + p_nb.length();
                if rewired_cost < compute_cost(&self.to_root[k], &self.roadmap, nb) {
                    let path_valid = paths[i].0 || self.validate_fully(&p_nb);
                    if path_valid {
                        self.roadmap.add_edge(nb, qnew, Rc::clone(&p_nb));
                        let rewire_edge = self.roadmap.add_edge(qnew, nb, p_nb.reverse());
                        debug_assert!(self.to_root[k].contains_key(&qnew));
                        set_parent(&mut self.to_root[k], &self.roadmap, nb, Some(rewire_edge));
                    }
                }
            }
        }
        true
    }
}

impl<F: Float + 'static, const N: usize> PathPlanner<F, N> for BiRrtStar<F, N> {
    fn problem(&self) -> &Problem<F, N> {
        &self.problem
    }

    fn problem_mut(&mut self) -> &mut Problem<F, N> {
        &mut self.problem
    }

    fn roadmap(&self) -> &Roadmap<F, N> {
        &self.roadmap
    }

    fn roadmap_mut(&mut self) -> &mut Roadmap<F, N> {
        &mut self.roadmap
    }

    fn interrupt_flag(&self) -> &Arc<AtomicBool> {
        &self.interrupt
    }

    fn start_solve(&mut self) -> Result<()> {
        // Checked before touching the roadmap, so a failed precondition
        // leaves it exactly as it was.
        if self.problem.goal_configs().len() != 1 {
            return Err(Error::GoalNodeCount(self.problem.goal_configs().len()));
        }
        let init_q = *self.problem.init_config().ok_or(Error::NoInitConfig)?;
        let goal_q = self.problem.goal_configs()[0];

        let init = self.roadmap.set_init_config(init_q);
        let goal = self.roadmap.add_goal_config(goal_q);
        if self.roadmap.goal_nodes().len() != 1 {
            return Err(Error::GoalNodeCount(self.roadmap.goal_nodes().len()));
        }

        let max_step = self.problem.parameter("BiRRT*/maxStepLength");
        self.extend_max_length = if max_step > F::zero() {
            max_step
        } else {
            F::from(self.problem.robot().number_dof()).unwrap().sqrt()
        };
        self.gamma = self.problem.parameter("BiRRT*/gamma");

        self.roots = [init, goal];
        self.to_root[0].clear();
        self.to_root[1].clear();
        set_parent(&mut self.to_root[0], &self.roadmap, init, None);
        set_parent(&mut self.to_root[1], &self.roadmap, goal, None);

        debug!(
            "[BiRRT*] start: step cap {:?}, gamma {:?}",
            self.extend_max_length.to_f64(),
            self.gamma.to_f64()
        );
        Ok(())
    }

    fn one_step(&mut self) -> Result<()> {
        if self.interrupted() {
            return Err(Error::Interrupted);
        }
        let mut q = self.problem.shoot();

        if self.roadmap.component_count() == 2 {
            if self.extend(0, &mut q) {
                if self.roadmap.in_same_component(self.roots[0], self.roots[1]) {
                    // In the unlikely event that extend connected the two
                    // trees on its own, the other tree's parent map is
                    // stale; drop the step and let the next one rebuild.
                    debug!("[BiRRT*] trees merged during extend, dropping the step");
                    return Ok(());
                }
                self.connect(1, &q);
            }
            self.roots.swap(0, 1);
            self.to_root.swap(0, 1);
        } else {
            if !self.to_root[1].contains_key(&self.roots[0]) {
                debug!("[BiRRT*] rebuilding parent maps over the merged roadmap");
                self.to_root[0] = compute_parent_map(&self.roadmap, self.roots[0]);
                self.to_root[1] = compute_parent_map(&self.roadmap, self.roots[1]);
            }
            debug_assert_eq!(self.to_root[0].len(), self.to_root[1].len());
            debug_assert_eq!(self.to_root[0].len(), self.roadmap.node_count());
            self.improve(&q);
        }
        Ok(())
    }

    fn compute_path(&self) -> Result<PathVector<F, N>> {
        let init = self.roadmap.init_node().ok_or(Error::NoPath)?;
        let goal = self
            .roadmap
            .goal_nodes()
            .iter()
            .copied()
            .find(|g| self.roadmap.in_same_component(init, *g))
            .ok_or(Error::NoPath)?;
        if goal == init {
            let q = *self.roadmap.node(init).configuration();
            let trivial: PathPtr<F, N> = Rc::new(StraightPath::new(q, q, F::zero(), None));
            return Ok(PathVector::new(vec![trivial]));
        }

        let map = compute_parent_map(&self.roadmap, init);
        let mut edges = Vec::new();
        let mut current = goal;
        while let Some(Some(edge_id)) = map.get(&current).copied() {
            edges.push(edge_id);
            current = self.roadmap.edge(edge_id).from();
        }
        if current != init {
            return Err(Error::NoPath);
        }
        edges.reverse();
        Ok(PathVector::new(
            edges
                .into_iter()
                .map(|e| Rc::clone(self.roadmap.edge(e).path()))
                .collect(),
        ))
    }
}
