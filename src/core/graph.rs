use std::{fmt::Debug, hash::Hash};

use ndarray::{Array1, Array2};
use tracing::debug;

use crate::core::{
    edge::{Direction, Edge, EdgeId},
    error::{GraphError, GraphResult},
    node::{AnyNodeId, Domain, Node, NodeId},
    potential::Potential,
    variable::Variable,
};

#[inline(always)]
fn is_probability(value: f64) -> bool {
    value.is_finite() && value > 0f64 && value <= 1f64
}

// ------------------------------------------------------------------------------------------

/// A pairwise Markov random field.
///
/// The graph is an arena: it owns every variable and every edge, while
/// edges refer to their endpoints and variables refer to their incident
/// edges by index only. Structure is frozen once inference starts; only
/// messages stored on edges change
#[derive(Debug, Default)]
pub struct PairwiseGraph {
    pub(crate) nodes: Vec<Node>,
    pub(crate) edges: Vec<Edge>,
}

impl PairwiseGraph {
    /// Creates an empty graph
    #[inline]
    pub fn new() -> Self {
        PairwiseGraph {
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Creates an empty graph with preallocated memory
    ///
    /// # Arguments
    ///
    /// * `nodes_capacity` - A number of variables we need to preallocate memory for
    /// * `edges_capacity` - A number of edges we need to preallocate memory for
    #[inline]
    pub fn with_capacity(nodes_capacity: usize, edges_capacity: usize) -> Self {
        PairwiseGraph {
            nodes: Vec::with_capacity(nodes_capacity),
            edges: Vec::with_capacity(edges_capacity),
        }
    }

    /// Registers a variable. States and priors are read once and tabulated
    ///
    /// # Notes
    ///
    /// Fails if the domain is empty, lists a state twice, or if a prior
    /// is not a finite number from (0, 1]
    ///
    /// # Example
    ///
    /// ```
    /// use pmrf::core::{DiscreteVariable, PairwiseGraph};
    ///
    /// let mut graph = PairwiseGraph::new();
    /// let coin = graph
    ///     .add_node(&DiscreteVariable::new([('h', 0.5), ('t', 0.5)]))
    ///     .unwrap();
    /// assert_eq!(graph.states(coin).unwrap(), &['h', 't']);
    /// assert!(graph.add_node(&DiscreteVariable::<char>::uniform([])).is_err());
    /// ```
    pub fn add_node<V: Variable>(&mut self, variable: &V) -> GraphResult<NodeId<V::State>> {
        let index = self.nodes.len();
        let domain = Domain::new(index, variable.states())?;
        let mut log_priors = Array1::zeros(domain.states.len());
        for (state, log_prior) in domain.states.iter().zip(log_priors.iter_mut()) {
            let prior = variable.prior_probability(state);
            if !is_probability(prior) {
                return Err(GraphError::InvalidPrior {
                    node: index,
                    state: format!("{state:?}"),
                    value: prior,
                });
            }
            *log_prior = prior.ln();
        }
        debug!(node = index, states = domain.states.len(), "registered variable");
        self.nodes.push(Node::new(domain, log_priors));
        Ok(NodeId::new(index))
    }

    /// Connects two variables through a potential and registers the new
    /// edge on both of them. Messages start uniform
    ///
    /// # Arguments
    ///
    /// * `node1` - The first endpoint, the potential's first argument
    /// * `node2` - The second endpoint, the potential's second argument
    /// * `potential` - A compatibility function, tabulated for every pair of states
    ///
    /// # Example
    ///
    /// ```
    /// use pmrf::core::{potential, DiscreteVariable, PairwiseGraph};
    ///
    /// let mut graph = PairwiseGraph::new();
    /// let a = graph.add_node(&DiscreteVariable::uniform([0u8, 1])).unwrap();
    /// let b = graph.add_node(&DiscreteVariable::uniform(["x", "y", "z"])).unwrap();
    /// let agree = potential::from_fn("agree", |_: &u8, _: &&str| 0.5);
    /// let edge = graph.connect(a, b, &agree).unwrap();
    /// assert_eq!(graph.node_edges(a).unwrap(), &[edge]);
    /// assert_eq!(graph.node_edges(b).unwrap(), &[edge]);
    /// assert!(graph.connect(a, a, &potential::from_fn("self", |_: &u8, _: &u8| 1.0)).is_err());
    /// ```
    pub fn connect<A, B, P>(
        &mut self,
        node1: NodeId<A>,
        node2: NodeId<B>,
        potential: &P,
    ) -> GraphResult<EdgeId>
    where
        A: Debug + 'static,
        B: Debug + 'static,
        P: Potential<A, B> + ?Sized,
    {
        if node1.index == node2.index {
            return Err(GraphError::SelfLoop(node1.index));
        }
        let states1 = &self.domain(node1)?.states;
        let states2 = &self.domain(node2)?.states;
        let mut log_potential = Array2::zeros((states1.len(), states2.len()));
        for (i, first) in states1.iter().enumerate() {
            for (j, second) in states2.iter().enumerate() {
                let value = potential.value(first, second);
                if !is_probability(value) {
                    return Err(GraphError::InvalidPotential {
                        node1: node1.index,
                        node2: node2.index,
                        first: format!("{first:?}"),
                        second: format!("{second:?}"),
                        value,
                    });
                }
                log_potential[[i, j]] = value.ln();
            }
        }
        let index = self.edges.len();
        self.edges.push(Edge::new(node1.index, node2.index, log_potential));
        self.nodes[node1.index].edges.push(index);
        self.nodes[node2.index].edges.push(index);
        debug!(edge = index, node1 = node1.index, node2 = node2.index, "connected variables");
        Ok(EdgeId(index))
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns handles of all edges in the order they were connected
    #[inline]
    pub fn edge_ids(&self) -> Vec<EdgeId> {
        (0..self.edges.len()).map(EdgeId).collect()
    }

    /// Returns handles of all variables in the order they were registered
    #[inline]
    pub fn node_ids(&self) -> Vec<AnyNodeId> {
        (0..self.nodes.len()).map(AnyNodeId).collect()
    }

    /// Returns states of a variable in their enumeration order
    #[inline]
    pub fn states<S: 'static>(&self, node: NodeId<S>) -> GraphResult<&[S]> {
        Ok(&self.domain(node)?.states)
    }

    /// Returns the number of states of a variable
    #[inline]
    pub fn state_count(&self, node: impl Into<AnyNodeId>) -> GraphResult<usize> {
        Ok(self.node(node.into().0)?.state_count())
    }

    /// Returns edges incident to a variable in the order they were connected
    #[inline]
    pub fn node_edges(&self, node: impl Into<AnyNodeId>) -> GraphResult<Vec<EdgeId>> {
        Ok(self
            .node(node.into().0)?
            .edges
            .iter()
            .copied()
            .map(EdgeId)
            .collect())
    }

    #[inline]
    pub fn degree(&self, node: impl Into<AnyNodeId>) -> GraphResult<usize> {
        Ok(self.node(node.into().0)?.degree())
    }

    /// Returns both endpoints of an edge
    #[inline]
    pub fn endpoints(&self, edge: EdgeId) -> GraphResult<(AnyNodeId, AnyNodeId)> {
        let edge = self.edge(edge.0)?;
        Ok((AnyNodeId(edge.node1), AnyNodeId(edge.node2)))
    }

    /// Returns `ln(prior(state))` of a variable
    #[inline]
    pub fn log_prior<S: 'static>(&self, node: NodeId<S>, state: &S) -> GraphResult<f64>
    where
        S: Clone + Eq + Hash + Debug,
    {
        let position = self.domain(node)?.position(node.index, state)?;
        Ok(self.nodes[node.index].log_priors[position])
    }

    /// Returns the current log message an edge delivers to a variable in a state
    ///
    /// # Notes
    ///
    /// Fails with `InvalidEndpoint` if the variable is not one of the
    /// edge's endpoints and with `UnknownState` if the state is not in its domain
    pub fn log_incoming_message<S: 'static>(
        &self,
        edge: EdgeId,
        node: NodeId<S>,
        state: &S,
    ) -> GraphResult<f64>
    where
        S: Clone + Eq + Hash + Debug,
    {
        let incoming = self
            .edge(edge.0)?
            .incoming(node.index)
            .ok_or(GraphError::InvalidEndpoint {
                edge: edge.0,
                node: node.index,
            })?;
        let position = self.domain(node)?.position(node.index, state)?;
        Ok(incoming[position])
    }

    /// Returns current messages of an edge in a direction, in the
    /// probability domain and indexed by the receiver's state positions
    #[inline]
    pub fn message(&self, edge: EdgeId, direction: Direction) -> GraphResult<Array1<f64>> {
        Ok(self
            .edge(edge.0)?
            .table(direction)
            .current
            .mapv(f64::exp))
    }

    /// For each state `s` of a variable returns
    /// `ln prior(s) + sum over incident edges of ln incoming(s)`
    pub fn log_prior_plus_incoming<S>(&self, node: NodeId<S>) -> GraphResult<Vec<(S, f64)>>
    where
        S: Clone + 'static,
    {
        let states = &self.domain(node)?.states;
        let values = self.log_prior_plus_incoming_by_index(node.index);
        Ok(states.iter().cloned().zip(values.iter().copied()).collect())
    }

    /// Stages new messages of an edge from current messages. Current
    /// messages of every edge are left untouched, so staging all edges of
    /// a graph in any order gives the same result
    ///
    /// # Arguments
    ///
    /// * `edge` - An edge to update
    /// * `direction` - A single direction to update, or both if None
    pub fn update_messages(
        &mut self,
        edge: EdgeId,
        direction: Option<Direction>,
    ) -> GraphResult<()> {
        self.edge(edge.0)?;
        for d in Direction::selected(direction) {
            let staged = self.edges[edge.0].compute_message(*d, self);
            self.edges[edge.0].table_mut(*d).staged = staged;
        }
        Ok(())
    }

    /// Normalizes staged messages of an edge and makes them current.
    /// Returns the largest absolute change of a log message
    ///
    /// # Notes
    ///
    /// For a synchronous schedule call it only after every edge has been updated
    pub fn refresh_messages(
        &mut self,
        edge: EdgeId,
        direction: Option<Direction>,
    ) -> GraphResult<f64> {
        let edge = self.edge_mut(edge.0)?;
        Ok(Direction::selected(direction)
            .iter()
            .map(|d| edge.table_mut(*d).refresh())
            .fold(0f64, f64::max))
    }

    /// Sets every message of the graph back to uniform
    pub fn reset_messages(&mut self) {
        for edge in &mut self.edges {
            edge.to_node1.reset();
            edge.to_node2.reset();
        }
    }
}

// private methods --------------------------------------------------------------------------

impl PairwiseGraph {
    #[inline(always)]
    pub(crate) fn node(&self, index: usize) -> GraphResult<&Node> {
        self.nodes.get(index).ok_or(GraphError::OutOfRangeNode {
            size: self.nodes.len(),
            index,
        })
    }

    #[inline(always)]
    pub(crate) fn edge(&self, index: usize) -> GraphResult<&Edge> {
        self.edges.get(index).ok_or(GraphError::OutOfRangeEdge {
            size: self.edges.len(),
            index,
        })
    }

    #[inline(always)]
    fn edge_mut(&mut self, index: usize) -> GraphResult<&mut Edge> {
        let size = self.edges.len();
        self.edges
            .get_mut(index)
            .ok_or(GraphError::OutOfRangeEdge { size, index })
    }

    #[inline(always)]
    pub(crate) fn domain<S: 'static>(&self, node: NodeId<S>) -> GraphResult<&Domain<S>> {
        self.node(node.index)?.domain(node.index)
    }

    pub(crate) fn log_prior_plus_incoming_by_index(&self, index: usize) -> Array1<f64> {
        let node = &self.nodes[index];
        let mut values = node.log_priors.clone();
        for edge in &node.edges {
            if let Some(incoming) = self.edges[*edge].incoming(index) {
                values += incoming;
            }
        }
        values
    }
}
