use std::collections::HashMap;

use ndarray::Array1;
use rand::Rng;
use tracing::{debug, info};

use crate::{
    core::{AnyNodeId, EdgeId, NodeId, PairwiseGraph, StateTable},
    gibbs::{
        chain::{
            empirical_marginals, run_chain, ConditionalModel, GibbsError, GibbsOptions,
            GibbsResult, SamplingInfo,
        },
        persistent::PersistentVec,
    },
};

/// A neighbour of a sampled variable through one edge
#[derive(Debug, Clone, Copy)]
struct Neighbor {
    edge: usize,
    // position of the neighbour in the assignment vector
    position: usize,
    // whether the sampled variable is node1 of the edge
    is_node1: bool,
}

/// A Gibbs sampler over variables of a pairwise graph.
///
/// The conditional weight of a candidate state is its prior times the
/// potentials of all edges from the given collection, evaluated against
/// the current states of the neighbours. Variables of different state
/// types are sampled uniformly through their state positions
#[derive(Debug)]
pub struct GibbsSampler<'g> {
    graph: &'g PairwiseGraph,
    variables: Vec<usize>,
    positions: HashMap<usize, usize>,
    neighbors: Vec<Vec<Neighbor>>,
    samples: Vec<PersistentVec<usize>>,
    marginals: Option<Vec<Array1<f64>>>,
}

impl<'g> GibbsSampler<'g> {
    /// Creates a sampler
    ///
    /// # Arguments
    ///
    /// * `graph` - A graph holding variables and potentials
    /// * `edges` - Edges that define the joint distribution
    /// * `collections` - Collections of variables to sample, a variable
    ///     listed more than once is sampled once
    ///
    /// # Notes
    ///
    /// Every endpoint of every edge must belong to one of the collections
    ///
    /// # Example
    ///
    /// ```
    /// use pmrf::core::{potential, DiscreteVariable, PairwiseGraph};
    /// use pmrf::gibbs::GibbsSampler;
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let mut graph = PairwiseGraph::new();
    /// let a = graph.add_node(&DiscreteVariable::new([(0u8, 0.9), (1, 0.1)])).unwrap();
    /// let b = graph.add_node(&DiscreteVariable::uniform(['x', 'y'])).unwrap();
    /// let link = potential::from_fn("link", |u: &u8, c: &char| {
    ///     if (*u == 0) == (*c == 'x') { 0.9 } else { 0.1 }
    /// });
    /// let edges = vec![graph.connect(a, b, &link).unwrap()];
    ///
    /// let mut sampler = GibbsSampler::new(&graph, &edges, [[a.erase()], [b.erase()]]).unwrap();
    /// sampler.infer(50, 2000, &mut StdRng::seed_from_u64(7)).unwrap();
    /// assert_eq!(sampler.most_probable_state(b).unwrap(), 'x');
    /// ```
    pub fn new<C>(
        graph: &'g PairwiseGraph,
        edges: &[EdgeId],
        collections: impl IntoIterator<Item = C>,
    ) -> GibbsResult<Self>
    where
        C: IntoIterator<Item = AnyNodeId>,
    {
        let mut variables = Vec::new();
        let mut positions = HashMap::new();
        for node in collections.into_iter().flatten() {
            graph.node(node.index())?;
            positions.entry(node.index()).or_insert_with(|| {
                variables.push(node.index());
                variables.len() - 1
            });
        }
        let mut neighbors = vec![Vec::new(); variables.len()];
        for edge_id in edges {
            let edge = graph.edge(edge_id.index())?;
            let position = |node: usize| {
                positions
                    .get(&node)
                    .copied()
                    .ok_or(GibbsError::UnregisteredNeighbor {
                        edge: edge_id.index(),
                        node,
                    })
            };
            let position1 = position(edge.node1)?;
            let position2 = position(edge.node2)?;
            neighbors[position1].push(Neighbor {
                edge: edge_id.index(),
                position: position2,
                is_node1: true,
            });
            neighbors[position2].push(Neighbor {
                edge: edge_id.index(),
                position: position1,
                is_node1: false,
            });
        }
        debug!(
            variables = variables.len(),
            edges = edges.len(),
            "built gibbs sampler"
        );
        Ok(GibbsSampler {
            graph,
            variables,
            positions,
            neighbors,
            samples: Vec::new(),
            marginals: None,
        })
    }

    /// Runs a chain of `warmup + count` sweeps with the default rejection
    /// draw, then tabulates empirical marginals. Results of a previous run
    /// are replaced
    #[inline]
    pub fn infer(
        &mut self,
        warmup: usize,
        count: usize,
        rng: &mut impl Rng,
    ) -> GibbsResult<SamplingInfo> {
        let options = GibbsOptions {
            warmup,
            count,
            ..Default::default()
        };
        self.infer_with_options(&options, rng)
    }

    /// Same as `infer` with explicit settings
    pub fn infer_with_options(
        &mut self,
        options: &GibbsOptions,
        rng: &mut impl Rng,
    ) -> GibbsResult<SamplingInfo> {
        self.marginals = None;
        self.samples.clear();
        let (samples, sampling_info) = run_chain(&*self, options, rng)?;
        let cardinalities: Vec<usize> = (0..self.dimension())
            .map(|position| self.cardinality(position))
            .collect();
        self.marginals = Some(empirical_marginals(&samples, &cardinalities));
        self.samples = samples;
        info!(%sampling_info, "gibbs sampling finished");
        Ok(sampling_info)
    }

    /// Returns sampled variables in their assignment order
    #[inline]
    pub fn variables(&self) -> Vec<AnyNodeId> {
        self.variables.iter().copied().map(AnyNodeId).collect()
    }

    /// Returns retained assignments, entries follow `variables()`
    #[inline]
    pub fn samples(&self) -> GibbsResult<&[PersistentVec<usize>]> {
        if self.marginals.is_none() {
            return Err(GibbsError::NotSampled);
        }
        Ok(&self.samples)
    }

    /// Returns the empirical marginal of a variable indexed by state positions
    pub fn marginal_by_index(&self, node: impl Into<AnyNodeId>) -> GibbsResult<&Array1<f64>> {
        let index = node.into().index();
        let position = self
            .positions
            .get(&index)
            .copied()
            .ok_or(GibbsError::UnregisteredVariable { node: index })?;
        self.marginals
            .as_ref()
            .map(|marginals| &marginals[position])
            .ok_or(GibbsError::NotSampled)
    }

    /// Returns the empirical marginal of a variable: a fraction of retained
    /// samples holding each state
    pub fn marginal<S>(&self, node: NodeId<S>) -> GibbsResult<StateTable<S>>
    where
        S: Clone + PartialEq + 'static,
    {
        let marginal = self.marginal_by_index(node)?;
        let states = self.graph.states(node)?;
        Ok(StateTable::new(
            states.iter().cloned().zip(marginal.iter().copied()).collect(),
        ))
    }

    /// Returns the state sampled most often, the first of tied states wins
    pub fn most_probable_state<S>(&self, node: NodeId<S>) -> GibbsResult<S>
    where
        S: Clone + PartialEq + 'static,
    {
        self.marginal(node)?
            .most_probable()
            .cloned()
            .ok_or(GibbsError::ZeroSupport {
                variable: node.index(),
            })
    }
}

impl ConditionalModel for GibbsSampler<'_> {
    #[inline]
    fn dimension(&self) -> usize {
        self.variables.len()
    }

    #[inline]
    fn cardinality(&self, variable: usize) -> usize {
        self.graph.nodes[self.variables[variable]].state_count()
    }

    // Computed in the log domain and shifted by the maximum before
    // exponentiation, so long products of small potentials do not underflow
    fn conditional_weights(
        &self,
        variable: usize,
        assignment: &PersistentVec<usize>,
        weights: &mut [f64],
    ) -> GibbsResult<()> {
        let node = &self.graph.nodes[self.variables[variable]];
        for (candidate, weight) in weights.iter_mut().enumerate() {
            let mut log_weight = node.log_priors[candidate];
            for neighbor in &self.neighbors[variable] {
                let edge = &self.graph.edges[neighbor.edge];
                let other = assignment[neighbor.position];
                log_weight += if neighbor.is_node1 {
                    edge.log_potential[[candidate, other]]
                } else {
                    edge.log_potential[[other, candidate]]
                };
            }
            *weight = log_weight;
        }
        let max = weights.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !max.is_finite() {
            return Err(self.zero_support(variable));
        }
        for weight in weights.iter_mut() {
            *weight = (*weight - max).exp();
        }
        Ok(())
    }

    // reported with the graph index of the variable
    #[inline]
    fn zero_support(&self, variable: usize) -> GibbsError {
        GibbsError::ZeroSupport {
            variable: self.variables[variable],
        }
    }
}
