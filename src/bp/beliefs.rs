use ndarray::Array1;

use crate::core::{
    numeric::normalize_log_in_place, AnyNodeId, GraphError, GraphResult, NodeId, PairwiseGraph,
    StateTable,
};

impl PairwiseGraph {
    /// Computes a posterior distribution of a variable from its prior and
    /// the current incoming messages, indexed by state positions
    pub fn posterior_by_index(&self, node: impl Into<AnyNodeId>) -> GraphResult<Array1<f64>> {
        let index = node.into().index();
        self.node(index)?;
        let mut log_posterior = self.log_prior_plus_incoming_by_index(index);
        let log_sum = normalize_log_in_place(log_posterior.view_mut());
        if !log_sum.is_finite() {
            return Err(GraphError::ZeroSupport { node: index });
        }
        Ok(log_posterior.mapv_into(f64::exp))
    }

    /// Computes a posterior distribution of a variable from its prior and
    /// the current incoming messages. Entries sum to one
    ///
    /// # Example
    ///
    /// ```
    /// use pmrf::core::{DiscreteVariable, PairwiseGraph};
    ///
    /// let mut graph = PairwiseGraph::new();
    /// let die = graph.add_node(&DiscreteVariable::uniform(1..=6)).unwrap();
    /// let posterior = graph.posterior_probabilities(die).unwrap();
    /// assert!((posterior.sum() - 1.0).abs() < 1e-12);
    /// assert!((posterior.get(&3).unwrap() - 1.0 / 6.0).abs() < 1e-12);
    /// ```
    pub fn posterior_probabilities<S>(&self, node: NodeId<S>) -> GraphResult<StateTable<S>>
    where
        S: Clone + PartialEq + 'static,
    {
        let states = self.states(node)?;
        let posterior = self.posterior_by_index(node)?;
        Ok(StateTable::new(
            states.iter().cloned().zip(posterior.iter().copied()).collect(),
        ))
    }

    /// Returns the state with the largest posterior probability.
    ///
    /// # Notes
    ///
    /// States are scanned in their enumeration order and a state replaces
    /// the current best only if it is strictly more probable, so the first
    /// of tied states is returned
    pub fn most_probable_state<S>(&self, node: NodeId<S>) -> GraphResult<S>
    where
        S: Clone + PartialEq + 'static,
    {
        self.posterior_probabilities(node)?
            .most_probable()
            .cloned()
            .ok_or(GraphError::ZeroSupport { node: node.index() })
    }
}
