use super::models::{two_nodes, Colour};
use crate::bp::{run_iterations, run_with_options, BeliefPropagationOptions, Schedule};

#[test]
fn two_node_colouring_test() {
    let mut colouring = two_nodes();
    let info = run_iterations(&mut colouring.graph, &colouring.edges, 5).unwrap();
    assert_eq!(info.iterations_number, 5);
    assert_eq!(info.discrepancy_dynamics.len(), 5);
    let graph = &colouring.graph;
    let (first, second) = (colouring.nodes[0], colouring.nodes[1]);

    let second_posterior = graph.posterior_probabilities(second).unwrap();
    assert!(
        second_posterior.get(&Colour::Red).unwrap() < 0.1,
        "P(red) = {}",
        second_posterior.get(&Colour::Red).unwrap()
    );
    assert!((second_posterior.sum() - 1f64).abs() < 1e-9);
    assert_eq!(graph.most_probable_state(first).unwrap(), Colour::Red);
    assert_ne!(graph.most_probable_state(second).unwrap(), Colour::Red);
}

#[test]
fn two_node_directional_schedule_test() {
    let mut colouring = two_nodes();
    let options = BeliefPropagationOptions {
        iterations: 5,
        schedule: Schedule::Directional,
        ..Default::default()
    };
    run_with_options(&mut colouring.graph, &colouring.edges, &options).unwrap();
    let posterior = colouring
        .graph
        .posterior_probabilities(colouring.nodes[1])
        .unwrap();
    assert!(posterior.get(&Colour::Red).unwrap() < 0.1);
    assert!((posterior.sum() - 1f64).abs() < 1e-9);
}
