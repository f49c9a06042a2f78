pub(crate) mod edge;
mod error;
pub(crate) mod graph;
pub(crate) mod node;
pub mod numeric;
pub mod potential;
mod table;
mod variable;

pub use edge::{Direction, EdgeId};
pub use error::{ErrorKind, GraphError, GraphResult};
pub use graph::PairwiseGraph;
pub use node::{AnyNodeId, NodeId};
pub use potential::{FnPotential, Potential};
pub use table::StateTable;
pub use variable::{DiscreteVariable, Variable};
