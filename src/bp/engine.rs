use std::fmt::Display;

use ndarray::Array1;
use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    bp::schedule::Schedule,
    core::{Direction, EdgeId, GraphResult, PairwiseGraph},
};

// ------------------------------------------------------------------------------------------

/// Loopy belief propagation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeliefPropagationOptions {
    /// Number of iterations, there is no convergence check
    pub iterations: usize,

    /// Order of message updates within an iteration
    pub schedule: Schedule,

    /// Whether the update phase is spread over the rayon thread pool
    pub parallel: bool,
}

impl Default for BeliefPropagationOptions {
    fn default() -> Self {
        BeliefPropagationOptions {
            iterations: 10,
            schedule: Schedule::Synchronous,
            parallel: false,
        }
    }
}

/// Information returned after a message passing run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePassingInfo {
    /// Number of iterations performed
    pub iterations_number: usize,

    /// Largest change of a log message during the last iteration
    pub last_discrepancy: f64,

    /// Largest change of a log message for each iteration
    pub discrepancy_dynamics: Vec<f64>,
}

impl Display for MessagePassingInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Message passing has run {} iterations, last iteration discrepancy: {}",
            self.iterations_number, self.last_discrepancy,
        )
    }
}

// ------------------------------------------------------------------------------------------

/// Runs `iterations` synchronous sweeps over the given edges: first every
/// edge stages new messages from current ones, then every edge makes
/// its staged messages current
///
/// # Arguments
///
/// * `graph` - A graph whose messages are updated in place
/// * `edges` - Edges to drive, typically all edges of a graph
/// * `iterations` - A number of sweeps
///
/// # Example
///
/// ```
/// use pmrf::bp::run_iterations;
/// use pmrf::core::{potential, DiscreteVariable, PairwiseGraph};
///
/// let mut graph = PairwiseGraph::new();
/// let a = graph.add_node(&DiscreteVariable::new([(0u8, 0.9), (1, 0.1)])).unwrap();
/// let b = graph.add_node(&DiscreteVariable::uniform([0u8, 1])).unwrap();
/// let copy = potential::from_fn("copy", |x: &u8, y: &u8| if x == y { 0.9 } else { 0.1 });
/// graph.connect(a, b, &copy).unwrap();
///
/// let edges = graph.edge_ids();
/// let info = run_iterations(&mut graph, &edges, 5).unwrap();
/// assert_eq!(info.iterations_number, 5);
/// assert_eq!(graph.most_probable_state(b).unwrap(), 0);
/// ```
#[inline]
pub fn run_iterations(
    graph: &mut PairwiseGraph,
    edges: &[EdgeId],
    iterations: usize,
) -> GraphResult<MessagePassingInfo> {
    let options = BeliefPropagationOptions {
        iterations,
        ..Default::default()
    };
    run_with_options(graph, edges, &options)
}

/// Same as `run_iterations`, but messages of different edges are staged
/// in parallel. Results are identical to the sequential run
#[inline]
pub fn run_iterations_parallel(
    graph: &mut PairwiseGraph,
    edges: &[EdgeId],
    iterations: usize,
) -> GraphResult<MessagePassingInfo> {
    let options = BeliefPropagationOptions {
        iterations,
        parallel: true,
        ..Default::default()
    };
    run_with_options(graph, edges, &options)
}

/// Runs loopy belief propagation with explicit settings
pub fn run_with_options(
    graph: &mut PairwiseGraph,
    edges: &[EdgeId],
    options: &BeliefPropagationOptions,
) -> GraphResult<MessagePassingInfo> {
    for edge in edges {
        graph.edge(edge.index())?;
    }
    let mut last_discrepancy = 0f64;
    let mut discrepancy_dynamics = Vec::with_capacity(options.iterations);
    for iteration in 0..options.iterations {
        let mut discrepancy = 0f64;
        for phase in options.schedule.phases() {
            update_phase(graph, edges, *phase, options.parallel)?;
            discrepancy = discrepancy.max(refresh_phase(graph, edges, *phase)?);
        }
        trace!(iteration, discrepancy, "message passing iteration");
        discrepancy_dynamics.push(discrepancy);
        last_discrepancy = discrepancy;
    }
    debug!(
        iterations = options.iterations,
        edges = edges.len(),
        last_discrepancy,
        "message passing finished"
    );
    Ok(MessagePassingInfo {
        iterations_number: options.iterations,
        last_discrepancy,
        discrepancy_dynamics,
    })
}

// private functions ------------------------------------------------------------------------

fn update_phase(
    graph: &mut PairwiseGraph,
    edges: &[EdgeId],
    direction: Option<Direction>,
    parallel: bool,
) -> GraphResult<()> {
    if !parallel {
        for edge in edges {
            graph.update_messages(*edge, direction)?;
        }
        return Ok(());
    }
    let staged: Vec<Vec<(Direction, Array1<f64>)>> = {
        let frozen: &PairwiseGraph = graph;
        edges
            .par_iter()
            .map(|id| -> GraphResult<Vec<(Direction, Array1<f64>)>> {
                let edge = frozen.edge(id.index())?;
                Ok(Direction::selected(direction)
                    .iter()
                    .map(|d| (*d, edge.compute_message(*d, frozen)))
                    .collect())
            })
            .collect::<GraphResult<_>>()?
    };
    for (id, messages) in edges.iter().zip(staged) {
        for (d, message) in messages {
            graph.edges[id.index()].table_mut(d).staged = message;
        }
    }
    Ok(())
}

fn refresh_phase(
    graph: &mut PairwiseGraph,
    edges: &[EdgeId],
    direction: Option<Direction>,
) -> GraphResult<f64> {
    let mut discrepancy = 0f64;
    for edge in edges {
        discrepancy = discrepancy.max(graph.refresh_messages(*edge, direction)?);
    }
    Ok(discrepancy)
}
