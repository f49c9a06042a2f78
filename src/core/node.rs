use std::{
    any::Any,
    collections::HashMap,
    fmt::Debug,
    hash::{Hash, Hasher},
    marker::PhantomData,
};

use ndarray::Array1;

use crate::core::error::{GraphError, GraphResult};

// ------------------------------------------------------------------------------------------

/// A handle of a variable registered in a graph, typed by its states
pub struct NodeId<S> {
    pub(crate) index: usize,
    marker: PhantomData<fn() -> S>,
}

impl<S> NodeId<S> {
    #[inline(always)]
    pub(crate) fn new(index: usize) -> Self {
        NodeId {
            index,
            marker: PhantomData,
        }
    }

    /// Returns a position of a variable in the graph's arena
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Forgets the state type
    #[inline]
    pub fn erase(&self) -> AnyNodeId {
        AnyNodeId(self.index)
    }
}

// Manual impls avoid spurious bounds on S

impl<S> Clone for NodeId<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for NodeId<S> {}

impl<S> PartialEq for NodeId<S> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<S> Eq for NodeId<S> {}

impl<S> Hash for NodeId<S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state)
    }
}

impl<S> Debug for NodeId<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeId({})", self.index)
    }
}

/// A handle of a variable with an unknown state type. Engines that treat
/// variables of different domains uniformly (Gibbs sampling) take these
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnyNodeId(pub(crate) usize);

impl AnyNodeId {
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

impl<S> From<NodeId<S>> for AnyNodeId {
    #[inline]
    fn from(id: NodeId<S>) -> Self {
        id.erase()
    }
}

// ------------------------------------------------------------------------------------------

/// Ordered states of a variable together with their positions
#[derive(Debug)]
pub(crate) struct Domain<S> {
    pub(crate) states: Vec<S>,
    positions: HashMap<S, usize>,
}

impl<S> Domain<S>
where
    S: Clone + Eq + Hash + Debug,
{
    pub(crate) fn new(node: usize, states: Vec<S>) -> GraphResult<Self> {
        if states.is_empty() {
            return Err(GraphError::EmptyDomain { node });
        }
        let mut positions = HashMap::with_capacity(states.len());
        for (i, state) in states.iter().enumerate() {
            if positions.insert(state.clone(), i).is_some() {
                return Err(GraphError::DuplicateState {
                    node,
                    state: format!("{state:?}"),
                });
            }
        }
        Ok(Domain { states, positions })
    }

    #[inline]
    pub(crate) fn position(&self, node: usize, state: &S) -> GraphResult<usize> {
        self.positions
            .get(state)
            .copied()
            .ok_or_else(|| GraphError::UnknownState {
                node,
                state: format!("{state:?}"),
            })
    }
}

/// A variable stored in a graph's arena. Its domain is type-erased, while
/// priors are tabulated by state position
#[derive(Debug)]
pub(crate) struct Node {
    domain: Box<dyn Any + Send + Sync>,
    pub(crate) log_priors: Array1<f64>,
    pub(crate) edges: Vec<usize>,
}

impl Node {
    #[inline]
    pub(crate) fn new<S>(domain: Domain<S>, log_priors: Array1<f64>) -> Self
    where
        S: Send + Sync + 'static,
    {
        Node {
            domain: Box::new(domain),
            log_priors,
            edges: Vec::new(),
        }
    }

    #[inline(always)]
    pub(crate) fn state_count(&self) -> usize {
        self.log_priors.len()
    }

    #[inline(always)]
    pub(crate) fn degree(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub(crate) fn domain<S: 'static>(&self, node: usize) -> GraphResult<&Domain<S>> {
        self.domain
            .downcast_ref::<Domain<S>>()
            .ok_or(GraphError::StateTypeMismatch { node })
    }
}
