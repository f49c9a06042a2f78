use std::{fs, path::PathBuf};

use clap::Parser;
use pmrf::{
    bp::{run_with_options, BeliefPropagationOptions, MessagePassingInfo},
    core::{DiscreteVariable, NodeId, PairwiseGraph, Potential, StateTable},
    gibbs::{GibbsOptions, GibbsSampler, SamplingInfo},
};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

// Review fraud detection: users vote for products, honest users praise good
// products, fraudsters praise bad ones and downvote good ones

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
enum User {
    Honest,
    Fraud,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
enum Product {
    Good,
    Bad,
}

const EPSILON: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Vote {
    Positive,
    Negative,
}

impl Potential<User, Product> for Vote {
    fn value(&self, user: &User, product: &Product) -> f64 {
        let positive = match (user, product) {
            (User::Honest, Product::Good) => 1f64 - EPSILON,
            (User::Honest, Product::Bad) => EPSILON,
            (User::Fraud, Product::Good) => 2f64 * EPSILON,
            (User::Fraud, Product::Bad) => 1f64 - 2f64 * EPSILON,
        };
        match self {
            Vote::Positive => positive,
            Vote::Negative => 1f64 - positive,
        }
    }
}

// (user, product, vote), users and products are numbered from 1
const VOTES: [(usize, usize, Vote); 14] = [
    (1, 1, Vote::Positive),
    (1, 3, Vote::Negative),
    (2, 1, Vote::Positive),
    (2, 2, Vote::Positive),
    (2, 4, Vote::Negative),
    (3, 1, Vote::Positive),
    (3, 2, Vote::Positive),
    (3, 3, Vote::Negative),
    (4, 2, Vote::Positive),
    (5, 1, Vote::Negative),
    (5, 3, Vote::Positive),
    (6, 2, Vote::Positive),
    (6, 3, Vote::Positive),
    (6, 4, Vote::Positive),
];

/// Runs belief propagation and Gibbs sampling on a small review graph
/// and prints both estimates as YAML
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// YAML file with `belief_propagation` and `gibbs` sections
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides the number of message passing iterations
    #[arg(long)]
    iterations: Option<usize>,

    /// Overrides the number of Gibbs warm-up sweeps
    #[arg(long)]
    warmup: Option<usize>,

    /// Overrides the number of Gibbs sweeps after the warm-up
    #[arg(long)]
    count: Option<usize>,

    /// Seed of the Gibbs sampler
    #[arg(long, default_value_t = 1)]
    seed: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    belief_propagation: BeliefPropagationOptions,
    gibbs: GibbsOptions,
}

#[derive(Debug, Serialize)]
struct Estimate<S> {
    name: String,
    belief_propagation: StateTable<S>,
    gibbs: StateTable<S>,
}

#[derive(Debug, Serialize)]
struct Report {
    message_passing: MessagePassingInfo,
    sampling: SamplingInfo,
    users: Vec<Estimate<User>>,
    products: Vec<Estimate<Product>>,
}

fn estimates<S>(
    prefix: &str,
    nodes: &[NodeId<S>],
    graph: &PairwiseGraph,
    sampler: &GibbsSampler,
) -> Result<Vec<Estimate<S>>, Box<dyn std::error::Error>>
where
    S: Clone + PartialEq + 'static,
{
    let mut rows = Vec::with_capacity(nodes.len());
    for (i, node) in nodes.iter().enumerate() {
        rows.push(Estimate {
            name: format!("{prefix} {}", i + 1),
            belief_propagation: graph.posterior_probabilities(*node)?,
            gibbs: sampler.marginal(*node)?,
        });
    }
    Ok(rows)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => serde_yaml::from_str::<Config>(&fs::read_to_string(path)?)?,
        None => Config::default(),
    };
    if let Some(iterations) = args.iterations {
        config.belief_propagation.iterations = iterations;
    }
    if let Some(warmup) = args.warmup {
        config.gibbs.warmup = warmup;
    }
    if let Some(count) = args.count {
        config.gibbs.count = count;
    }

    let mut graph = PairwiseGraph::new();
    let users = (0..6)
        .map(|_| graph.add_node(&DiscreteVariable::uniform([User::Honest, User::Fraud])))
        .collect::<Result<Vec<_>, _>>()?;
    let products = (0..4)
        .map(|_| graph.add_node(&DiscreteVariable::uniform([Product::Good, Product::Bad])))
        .collect::<Result<Vec<_>, _>>()?;
    let mut edges = Vec::with_capacity(VOTES.len());
    for (user, product, vote) in VOTES {
        edges.push(graph.connect(users[user - 1], products[product - 1], &vote)?);
    }

    let message_passing = run_with_options(&mut graph, &edges, &config.belief_propagation)?;
    let mut sampler = GibbsSampler::new(
        &graph,
        &edges,
        [
            users.iter().map(|user| user.erase()).collect::<Vec<_>>(),
            products.iter().map(|product| product.erase()).collect(),
        ],
    )?;
    let sampling = sampler.infer_with_options(
        &config.gibbs,
        &mut StdRng::seed_from_u64(args.seed),
    )?;

    let report = Report {
        message_passing,
        sampling,
        users: estimates("user", &users, &graph, &sampler)?,
        products: estimates("product", &products, &graph, &sampler)?,
    };
    print!("{}", serde_yaml::to_string(&report)?);
    Ok(())
}
