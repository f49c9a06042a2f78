use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification of graph errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// A graph is built from invalid parts
    Configuration,
    /// Log-domain arithmetic has lost all support
    Numeric,
    /// A node, an edge or a state is queried outside of what was registered
    Lookup,
}

#[derive(Debug, Clone, PartialEq, Error)]
/// Errors that could appear in pairwise graph's methods
pub enum GraphError {
    /// A variable has no states
    #[error("Variable #{node} has an empty state domain")]
    EmptyDomain { node: usize },

    /// A variable lists the same state twice
    #[error("Variable #{node} lists the state {state} more than once")]
    DuplicateState { node: usize, state: String },

    /// A prior probability is not a finite number from (0, 1]
    #[error("Prior {value} of the state {state} of variable #{node} is outside of (0, 1]")]
    InvalidPrior {
        node: usize,
        state: String,
        value: f64,
    },

    /// A potential value is not a finite number from (0, 1]
    #[error(
        "Potential {value} of states ({first}, {second}) of #{node1}, #{node2} is not in (0, 1]"
    )]
    InvalidPotential {
        node1: usize,
        node2: usize,
        first: String,
        second: String,
        value: f64,
    },

    /// An edge connects a variable to itself
    #[error("An edge can not connect variable #{0} to itself")]
    SelfLoop(usize),

    /// Index of a variable is out of range
    #[error("Index of a variable {index} is out of range of [0..{size}) variables")]
    OutOfRangeNode { size: usize, index: usize },

    /// Index of an edge is out of range
    #[error("Index of an edge {index} is out of range of [0..{size}) edges")]
    OutOfRangeEdge { size: usize, index: usize },

    /// A variable is not one of the two endpoints of an edge
    #[error("Variable #{node} is not an endpoint of edge #{edge}")]
    InvalidEndpoint { edge: usize, node: usize },

    /// A state is not in the domain of a variable
    #[error("State {state} is not in the domain of variable #{node}")]
    UnknownState { node: usize, state: String },

    /// A typed handle does not match the state type of a variable
    #[error("Variable #{node} holds states of a different type than requested")]
    StateTypeMismatch { node: usize },

    /// Every state of a variable has zero support
    #[error("All states of variable #{node} have zero support, the belief can not be normalized")]
    ZeroSupport { node: usize },
}

impl GraphError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GraphError::EmptyDomain { .. }
            | GraphError::DuplicateState { .. }
            | GraphError::InvalidPrior { .. }
            | GraphError::InvalidPotential { .. }
            | GraphError::SelfLoop(_) => ErrorKind::Configuration,
            GraphError::OutOfRangeNode { .. }
            | GraphError::OutOfRangeEdge { .. }
            | GraphError::InvalidEndpoint { .. }
            | GraphError::UnknownState { .. }
            | GraphError::StateTypeMismatch { .. } => ErrorKind::Lookup,
            GraphError::ZeroSupport { .. } => ErrorKind::Numeric,
        }
    }
}

/// Pairwise graph's methods result type
pub type GraphResult<T> = Result<T, GraphError>;
