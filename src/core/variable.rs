use std::{fmt::Debug, hash::Hash};

/// A discrete random variable: a finite ordered domain of states and a prior over them
pub trait Variable: Debug {
    /// Type of a single state of the domain
    type State: Clone + Eq + Hash + Debug + Send + Sync + 'static;

    /// Returns states of a variable in a fixed enumeration order.
    /// The order is the order of posterior tables and the order in which
    /// ties between equally probable states are broken
    fn states(&self) -> Vec<Self::State>;

    /// Returns a prior probability of a state, it must lie in (0, 1]
    ///
    /// # Arguments
    ///
    /// * `state` - A state from the domain of a variable
    fn prior_probability(&self, state: &Self::State) -> f64;
}

/// A variable given by an explicit table of states and prior probabilities
#[derive(Debug, Clone)]
pub struct DiscreteVariable<S> {
    states: Vec<S>,
    priors: Vec<f64>,
}

impl<S> DiscreteVariable<S>
where
    S: Clone + Eq + Hash + Debug + Send + Sync + 'static,
{
    /// Creates a variable from (state, prior) pairs
    ///
    /// # Example
    ///
    /// ```
    /// use pmrf::core::{DiscreteVariable, Variable};
    ///
    /// let coin = DiscreteVariable::new([("heads", 0.7), ("tails", 0.3)]);
    /// assert_eq!(coin.states(), vec!["heads", "tails"]);
    /// assert_eq!(coin.prior_probability(&"tails"), 0.3);
    /// ```
    #[inline]
    pub fn new(table: impl IntoIterator<Item = (S, f64)>) -> Self {
        let (states, priors) = table.into_iter().unzip();
        DiscreteVariable { states, priors }
    }

    /// Creates a variable with a uniform prior over the given states
    #[inline]
    pub fn uniform(states: impl IntoIterator<Item = S>) -> Self {
        let states: Vec<S> = states.into_iter().collect();
        let prior = 1f64 / states.len() as f64;
        let priors = vec![prior; states.len()];
        DiscreteVariable { states, priors }
    }
}

impl<S> Variable for DiscreteVariable<S>
where
    S: Clone + Eq + Hash + Debug + Send + Sync + 'static,
{
    type State = S;

    #[inline]
    fn states(&self) -> Vec<S> {
        self.states.clone()
    }

    // A state outside of the table has no support
    #[inline]
    fn prior_probability(&self, state: &S) -> f64 {
        self.states
            .iter()
            .position(|s| s == state)
            .map_or(0f64, |i| self.priors[i])
    }
}
