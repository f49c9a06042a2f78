use rand::{rngs::StdRng, SeedableRng};

use super::models::{colour_variable, two_nodes, Colour, DifferentColours, EPSILON, COLOURS};
use crate::{
    bp::run_iterations,
    core::{AnyNodeId, PairwiseGraph},
    gibbs::{
        empirical_marginals, run_chain, ConditionalDraw, ConditionalModel, GibbsError,
        GibbsOptions, GibbsResult, GibbsSampler, PersistentVec,
    },
};

// The first die and the sum of two fair dice, the same pair as a joint
// distribution given through its conditionals
struct TwoDice;

impl ConditionalModel for TwoDice {
    fn dimension(&self) -> usize {
        2
    }

    fn cardinality(&self, variable: usize) -> usize {
        match variable {
            0 => 6,
            _ => 11,
        }
    }

    fn conditional_weights(
        &self,
        variable: usize,
        assignment: &PersistentVec<usize>,
        weights: &mut [f64],
    ) -> GibbsResult<()> {
        for (candidate, weight) in weights.iter_mut().enumerate() {
            let (first, sum) = match variable {
                0 => (candidate + 1, assignment[1] + 2),
                _ => (assignment[0] + 1, candidate + 2),
            };
            let second = sum as i64 - first as i64;
            *weight = if (1..=6).contains(&second) { 1f64 } else { 0f64 };
        }
        Ok(())
    }
}

fn sum_distribution() -> Vec<f64> {
    (2..=12)
        .map(|sum: i64| (6 - (sum - 7).abs()) as f64 / 36f64)
        .collect()
}

#[test]
fn two_dice_test() {
    for draw in [ConditionalDraw::Rejection, ConditionalDraw::InverseCdf] {
        let mut rng = StdRng::seed_from_u64(7);
        let options = GibbsOptions {
            warmup: 100,
            count: 20_000,
            draw,
        };
        let (samples, info) = run_chain(&TwoDice, &options, &mut rng).unwrap();
        assert_eq!(samples.len(), 19_999);
        assert_eq!(info.retained_samples, 19_999);
        assert!(info.draws >= 2 * 20_100);
        for sample in &samples {
            let second = sample[1] as i64 + 2 - (sample[0] as i64 + 1);
            assert!((1..=6).contains(&second), "impossible sample {sample:?}");
        }
        let marginals = empirical_marginals(&samples, &[6, 11]);
        for (empirical, exact) in marginals[1].iter().zip(sum_distribution()) {
            assert!(
                (empirical - exact).abs() < 0.02,
                "{draw:?}: empirical {empirical}, exact {exact}"
            );
        }
        for empirical in marginals[0].iter() {
            assert!((empirical - 1f64 / 6f64).abs() < 0.02);
        }
    }
}

#[test]
fn gibbs_agrees_with_belief_propagation_test() {
    let mut colouring = two_nodes();
    run_iterations(&mut colouring.graph, &colouring.edges, 5).unwrap();
    let graph = &colouring.graph;
    let (first, second) = (colouring.nodes[0], colouring.nodes[1]);
    let mut sampler =
        GibbsSampler::new(graph, &colouring.edges, [[first.erase()], [second.erase()]]).unwrap();
    sampler
        .infer(100, 5000, &mut StdRng::seed_from_u64(2024))
        .unwrap();
    for node in [first, second] {
        let exact = graph.posterior_probabilities(node).unwrap();
        let sampled = sampler.marginal(node).unwrap();
        for colour in COLOURS {
            let (lhs, rhs) = (exact.get(&colour).unwrap(), sampled.get(&colour).unwrap());
            assert!((lhs - rhs).abs() < 0.05, "{colour:?}: {lhs} vs {rhs}");
        }
    }
    assert_eq!(sampler.most_probable_state(first).unwrap(), Colour::Red);
    assert_ne!(sampler.most_probable_state(second).unwrap(), Colour::Red);
}

#[test]
fn gibbs_determinism_test() {
    let colouring = two_nodes();
    let variables = [colouring.nodes[0].erase(), colouring.nodes[1].erase()];
    let run = |seed: u64| {
        let mut sampler =
            GibbsSampler::new(&colouring.graph, &colouring.edges, [variables]).unwrap();
        let info = sampler.infer(10, 300, &mut StdRng::seed_from_u64(seed)).unwrap();
        let samples: Vec<Vec<usize>> = sampler
            .samples()
            .unwrap()
            .iter()
            .map(|sample| sample.to_vec())
            .collect();
        (info, samples)
    };
    assert_eq!(run(11), run(11));
}

#[test]
fn warmup_boundary_test() {
    let colouring = two_nodes();
    let mut sampler = GibbsSampler::new(
        &colouring.graph,
        &colouring.edges,
        [colouring.nodes.iter().map(|node| node.erase())],
    )
    .unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    // the sweep numbered `warmup` is dropped as well
    let info = sampler.infer(5, 3, &mut rng).unwrap();
    assert_eq!(info.sweeps, 8);
    assert_eq!(info.retained_samples, 2);
    assert_eq!(sampler.samples().unwrap().len(), 2);
    assert_eq!(
        sampler.infer(5, 1, &mut rng).unwrap_err(),
        GibbsError::NoSamples { warmup: 5, count: 1 }
    );
    assert_eq!(sampler.samples().unwrap_err(), GibbsError::NotSampled);
}

#[test]
fn gibbs_errors_test() {
    let mut graph = PairwiseGraph::new();
    let a = graph.add_node(&colour_variable(None)).unwrap();
    let b = graph.add_node(&colour_variable(None)).unwrap();
    let c = graph.add_node(&colour_variable(None)).unwrap();
    let edge = graph.connect(a, b, &DifferentColours(EPSILON)).unwrap();

    assert_eq!(
        GibbsSampler::new(&graph, &[edge], [[a.erase()]]).unwrap_err(),
        GibbsError::UnregisteredNeighbor { edge: 0, node: 1 }
    );
    let mut empty = GibbsSampler::new(&graph, &[], Vec::<Vec<AnyNodeId>>::new()).unwrap();
    assert_eq!(
        empty.infer(1, 10, &mut StdRng::seed_from_u64(0)).unwrap_err(),
        GibbsError::EmptyModel
    );

    let mut sampler = GibbsSampler::new(&graph, &[edge], [vec![a.erase(), b.erase(), a.erase()]])
        .unwrap();
    assert_eq!(sampler.variables(), vec![a.erase(), b.erase()]);
    assert_eq!(sampler.marginal(a).unwrap_err(), GibbsError::NotSampled);
    sampler.infer(10, 100, &mut StdRng::seed_from_u64(1)).unwrap();
    assert_eq!(
        sampler.marginal(c).unwrap_err(),
        GibbsError::UnregisteredVariable { node: 2 }
    );
    assert!((sampler.marginal(b).unwrap().sum() - 1f64).abs() < 1e-12);
    assert_eq!(sampler.marginal_by_index(a).unwrap().len(), 3);
}

// Delegates to another model, but gives no weight to any state of one variable
struct Blocked<'m, M> {
    model: &'m M,
    variable: usize,
}

impl<M: ConditionalModel> ConditionalModel for Blocked<'_, M> {
    fn dimension(&self) -> usize {
        self.model.dimension()
    }

    fn cardinality(&self, variable: usize) -> usize {
        self.model.cardinality(variable)
    }

    fn conditional_weights(
        &self,
        variable: usize,
        assignment: &PersistentVec<usize>,
        weights: &mut [f64],
    ) -> GibbsResult<()> {
        self.model.conditional_weights(variable, assignment, weights)?;
        if variable == self.variable {
            weights.fill(0f64);
        }
        Ok(())
    }

    fn zero_support(&self, variable: usize) -> GibbsError {
        self.model.zero_support(variable)
    }
}

#[test]
fn zero_support_test() {
    for draw in [ConditionalDraw::Rejection, ConditionalDraw::InverseCdf] {
        let options = GibbsOptions {
            warmup: 1,
            count: 10,
            draw,
        };
        let blocked = Blocked {
            model: &TwoDice,
            variable: 1,
        };
        // a plain model reports the position of the variable
        assert_eq!(
            run_chain(&blocked, &options, &mut StdRng::seed_from_u64(3)).unwrap_err(),
            GibbsError::ZeroSupport { variable: 1 }
        );

        let mut graph = PairwiseGraph::new();
        let a = graph.add_node(&colour_variable(None)).unwrap();
        let b = graph.add_node(&colour_variable(None)).unwrap();
        let c = graph.add_node(&colour_variable(None)).unwrap();
        let edges = [
            graph.connect(a, b, &DifferentColours(EPSILON)).unwrap(),
            graph.connect(b, c, &DifferentColours(EPSILON)).unwrap(),
        ];
        let sampler =
            GibbsSampler::new(&graph, &edges, [[c.erase()], [a.erase()], [b.erase()]]).unwrap();
        assert_eq!(sampler.variables(), vec![c.erase(), a.erase(), b.erase()]);
        // the sampler reports the graph index of the variable
        for (position, node) in [(0, 2), (1, 0), (2, 1)] {
            let blocked = Blocked {
                model: &sampler,
                variable: position,
            };
            assert_eq!(
                run_chain(&blocked, &options, &mut StdRng::seed_from_u64(3)).unwrap_err(),
                GibbsError::ZeroSupport { variable: node }
            );
            assert_eq!(
                sampler.zero_support(position).to_string(),
                format!("All candidate states of variable #{node} have zero conditional weight")
            );
        }
    }
}

#[test]
fn gibbs_options_test() {
    let options: GibbsOptions = serde_yaml::from_str("count: 50\ndraw: inverse_cdf\n").unwrap();
    assert_eq!(options.warmup, 100);
    assert_eq!(options.count, 50);
    assert_eq!(options.draw, ConditionalDraw::InverseCdf);
    assert_eq!(GibbsOptions::default().draw, ConditionalDraw::Rejection);
}
