use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use crate::core::{
    graph::PairwiseGraph,
    numeric::{log_of_sum, normalize_log_in_place},
};

// ------------------------------------------------------------------------------------------

/// A handle of an edge registered in a graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub(crate) usize);

impl EdgeId {
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Direction of a message along an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Node1ToNode2,
    Node2ToNode1,
}

impl Direction {
    pub const BOTH: [Direction; 2] = [Direction::Node1ToNode2, Direction::Node2ToNode1];

    /// Directions picked by an optional filter, both of them for None
    #[inline(always)]
    pub(crate) fn selected(filter: Option<Direction>) -> &'static [Direction] {
        match filter {
            None => &Direction::BOTH,
            Some(Direction::Node1ToNode2) => &[Direction::Node1ToNode2],
            Some(Direction::Node2ToNode1) => &[Direction::Node2ToNode1],
        }
    }

    #[inline]
    pub fn reverse(self) -> Self {
        match self {
            Direction::Node1ToNode2 => Direction::Node2ToNode1,
            Direction::Node2ToNode1 => Direction::Node1ToNode2,
        }
    }
}

// ------------------------------------------------------------------------------------------

/// Messages sent in one direction, in the log domain and indexed by the
/// receiver's state positions
#[derive(Debug, Clone)]
pub(crate) struct MessageTable {
    pub(crate) current: Array1<f64>,
    pub(crate) staged: Array1<f64>,
}

impl MessageTable {
    #[inline]
    fn uniform(receiver_states: usize) -> Self {
        MessageTable {
            current: Array1::zeros(receiver_states),
            staged: Array1::zeros(receiver_states),
        }
    }

    #[inline]
    pub(crate) fn reset(&mut self) {
        self.current.fill(0f64);
        self.staged.fill(0f64);
    }

    /// Normalizes staged values and makes them current. Returns the largest
    /// absolute change of a current log message
    #[inline]
    pub(crate) fn refresh(&mut self) -> f64 {
        normalize_log_in_place(self.staged.view_mut());
        let discrepancy = self
            .current
            .iter()
            .zip(&self.staged)
            .fold(0f64, |acc, (old, new)| acc.max((old - new).abs()));
        self.current.assign(&self.staged);
        discrepancy
    }
}

/// An edge stored in a graph's arena
#[derive(Debug, Clone)]
pub(crate) struct Edge {
    pub(crate) node1: usize,
    pub(crate) node2: usize,
    // log_potential[[i, j]] = ln value(i-th state of node1, j-th state of node2)
    pub(crate) log_potential: Array2<f64>,
    pub(crate) to_node2: MessageTable,
    pub(crate) to_node1: MessageTable,
}

impl Edge {
    #[inline]
    pub(crate) fn new(node1: usize, node2: usize, log_potential: Array2<f64>) -> Self {
        let (n1, n2) = log_potential.dim();
        Edge {
            node1,
            node2,
            log_potential,
            to_node2: MessageTable::uniform(n2),
            to_node1: MessageTable::uniform(n1),
        }
    }

    /// Returns (sender, receiver) of a direction
    #[inline(always)]
    pub(crate) fn endpoints(&self, direction: Direction) -> (usize, usize) {
        match direction {
            Direction::Node1ToNode2 => (self.node1, self.node2),
            Direction::Node2ToNode1 => (self.node2, self.node1),
        }
    }

    #[inline(always)]
    pub(crate) fn table(&self, direction: Direction) -> &MessageTable {
        match direction {
            Direction::Node1ToNode2 => &self.to_node2,
            Direction::Node2ToNode1 => &self.to_node1,
        }
    }

    #[inline(always)]
    pub(crate) fn table_mut(&mut self, direction: Direction) -> &mut MessageTable {
        match direction {
            Direction::Node1ToNode2 => &mut self.to_node2,
            Direction::Node2ToNode1 => &mut self.to_node1,
        }
    }

    /// Current log message received by `node`, None if it is not an endpoint
    #[inline(always)]
    pub(crate) fn incoming(&self, node: usize) -> Option<&Array1<f64>> {
        if node == self.node1 {
            Some(&self.to_node1.current)
        } else if node == self.node2 {
            Some(&self.to_node2.current)
        } else {
            None
        }
    }

    /// Log potential as a function of the sender's state for a fixed state
    /// of the receiver
    #[inline(always)]
    fn log_potential_lane(&self, direction: Direction, receiver_state: usize) -> ArrayView1<f64> {
        match direction {
            Direction::Node1ToNode2 => self.log_potential.index_axis(Axis(1), receiver_state),
            Direction::Node2ToNode1 => self.log_potential.index_axis(Axis(0), receiver_state),
        }
    }

    /// Computes a new (unnormalized) log message in a direction from current
    /// messages only:
    ///
    /// m(x_b) = logsum_{x_a} [ prior_a(x_a) + potential(x_a, x_b)
    ///                         + belief_a(x_a) - incoming_a(x_a) ]
    ///
    /// where belief_a already contains prior_a, so the sender's prior enters
    /// twice, and the message this edge delivered to the sender is excluded
    pub(crate) fn compute_message(
        &self,
        direction: Direction,
        graph: &PairwiseGraph,
    ) -> Array1<f64> {
        let (sender, receiver) = self.endpoints(direction);
        let sender_node = &graph.nodes[sender];
        let excluded = &self.table(direction.reverse()).current;
        let cavity = graph.log_prior_plus_incoming_by_index(sender) - excluded
            + &sender_node.log_priors;
        let receiver_states = graph.nodes[receiver].state_count();
        let mut buffer = Vec::with_capacity(cavity.len());
        Array1::from_shape_fn(receiver_states, |x_b| {
            buffer.clear();
            let lane = self.log_potential_lane(direction, x_b);
            buffer.extend(cavity.iter().zip(lane).map(|(c, p)| c + p));
            log_of_sum(buffer.iter().copied())
        })
    }
}
