use crate::core::{DiscreteVariable, EdgeId, NodeId, PairwiseGraph, Potential, Variable};

// Colouring ---------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) enum Colour {
    Red,
    Green,
    Blue,
}

pub(super) const COLOURS: [Colour; 3] = [Colour::Red, Colour::Green, Colour::Blue];

pub(super) const EPSILON: f64 = 1e-6;

/// A colour variable with a strong preference for one colour or a uniform one
pub(super) fn colour_variable(favourite: Option<Colour>) -> DiscreteVariable<Colour> {
    match favourite {
        Some(favourite) => DiscreteVariable::new(
            COLOURS.map(|c| (c, if c == favourite { 0.99 } else { 0.005 })),
        ),
        None => DiscreteVariable::uniform(COLOURS),
    }
}

/// Neighbours should have different colours
#[derive(Debug)]
pub(super) struct DifferentColours(pub(super) f64);

impl Potential<Colour, Colour> for DifferentColours {
    fn value(&self, first: &Colour, second: &Colour) -> f64 {
        if first == second {
            self.0
        } else {
            1f64 - self.0
        }
    }
}

pub(super) struct Colouring {
    pub(super) graph: PairwiseGraph,
    pub(super) nodes: Vec<NodeId<Colour>>,
    pub(super) edges: Vec<EdgeId>,
    pub(super) pairs: Vec<(usize, usize)>,
}

/// Two variables, the first one prefers red
pub(super) fn two_nodes() -> Colouring {
    let mut graph = PairwiseGraph::new();
    let first = graph.add_node(&colour_variable(Some(Colour::Red))).unwrap();
    let second = graph.add_node(&colour_variable(None)).unwrap();
    let edge = graph
        .connect(first, second, &DifferentColours(EPSILON))
        .unwrap();
    Colouring {
        graph,
        nodes: vec![first, second],
        edges: vec![edge],
        pairs: vec![(0, 1)],
    }
}

// vertices are numbered from 1 as in the usual drawing of the graph
const PETERSEN_ADJACENCY: [(usize, [usize; 3]); 10] = [
    (1, [3, 4, 10]),
    (2, [5, 4, 9]),
    (3, [1, 5, 8]),
    (4, [2, 1, 7]),
    (5, [2, 3, 6]),
    (6, [5, 10, 7]),
    (7, [4, 6, 8]),
    (8, [3, 7, 9]),
    (9, [2, 8, 10]),
    (10, [1, 6, 9]),
];

/// Petersen graph, vertex 1 prefers green and vertex 2 prefers red
pub(super) fn petersen() -> Colouring {
    let mut graph = PairwiseGraph::with_capacity(10, 15);
    let nodes: Vec<NodeId<Colour>> = (1..=10)
        .map(|vertex| {
            let favourite = match vertex {
                1 => Some(Colour::Green),
                2 => Some(Colour::Red),
                _ => None,
            };
            graph.add_node(&colour_variable(favourite)).unwrap()
        })
        .collect();
    let differ = DifferentColours(EPSILON);
    let mut edges = Vec::with_capacity(15);
    let mut pairs = Vec::with_capacity(15);
    for (vertex, neighbours) in PETERSEN_ADJACENCY {
        for neighbour in neighbours {
            if vertex < neighbour {
                let edge = graph
                    .connect(nodes[vertex - 1], nodes[neighbour - 1], &differ)
                    .unwrap();
                edges.push(edge);
                pairs.push((vertex - 1, neighbour - 1));
            }
        }
    }
    Colouring {
        graph,
        nodes,
        edges,
        pairs,
    }
}

// Hamming (7, 4) code ------------------------------------------------------------------------

const GENERATOR: [[u8; 7]; 4] = [
    [1, 0, 0, 0, 1, 0, 1],
    [0, 1, 0, 0, 1, 1, 1],
    [0, 0, 1, 0, 1, 1, 0],
    [0, 0, 0, 1, 0, 1, 1],
];

// bits covered by each parity check, the last one is a parity bit
const CHECKS: [[usize; 4]; 3] = [[0, 1, 2, 4], [1, 2, 3, 5], [0, 1, 3, 6]];

pub(super) fn encode(data: [u8; 4]) -> [u8; 7] {
    let mut code = [0u8; 7];
    for (i, bit) in code.iter_mut().enumerate() {
        *bit = data
            .iter()
            .zip(&GENERATOR)
            .map(|(d, row)| d * row[i])
            .sum::<u8>()
            % 2;
    }
    code
}

/// A received bit, trusted with probability 0.9
#[derive(Debug)]
struct ReceivedBit(bool);

impl Variable for ReceivedBit {
    type State = bool;

    fn states(&self) -> Vec<bool> {
        vec![false, true]
    }

    fn prior_probability(&self, state: &bool) -> f64 {
        if *state == self.0 {
            0.9
        } else {
            0.1
        }
    }
}

/// Joint state of the four bits of a parity check, even parity is likely
#[derive(Debug)]
struct ParityCheck;

impl Variable for ParityCheck {
    type State = [bool; 4];

    fn states(&self) -> Vec<[bool; 4]> {
        (0..16u8)
            .map(|s| [s & 8 != 0, s & 4 != 0, s & 2 != 0, s & 1 != 0])
            .collect()
    }

    fn prior_probability(&self, state: &[bool; 4]) -> f64 {
        if state.iter().filter(|b| **b).count() % 2 == 0 {
            0.99
        } else {
            0.01
        }
    }
}

/// A bit agrees with its slot in a parity check
#[derive(Debug)]
struct CheckSlot(usize);

impl Potential<bool, [bool; 4]> for CheckSlot {
    fn value(&self, bit: &bool, check: &[bool; 4]) -> f64 {
        if check[self.0] == *bit {
            0.99
        } else {
            0.01
        }
    }
}

pub(super) struct HammingNetwork {
    pub(super) graph: PairwiseGraph,
    pub(super) bits: Vec<NodeId<bool>>,
    pub(super) checks: Vec<NodeId<[bool; 4]>>,
    pub(super) edges: Vec<EdgeId>,
}

impl HammingNetwork {
    pub(super) fn new(received: [u8; 7]) -> Self {
        let mut graph = PairwiseGraph::with_capacity(10, 12);
        let bits: Vec<NodeId<bool>> = received
            .iter()
            .map(|b| graph.add_node(&ReceivedBit(*b == 1)).unwrap())
            .collect();
        let checks: Vec<NodeId<[bool; 4]>> = (0..3)
            .map(|_| graph.add_node(&ParityCheck).unwrap())
            .collect();
        let mut edges = Vec::with_capacity(12);
        for (check, covered) in checks.iter().zip(&CHECKS) {
            for (slot, bit) in covered.iter().enumerate() {
                edges.push(graph.connect(bits[*bit], *check, &CheckSlot(slot)).unwrap());
            }
        }
        HammingNetwork {
            graph,
            bits,
            checks,
            edges,
        }
    }

    pub(super) fn most_probable_code(&self) -> [u8; 7] {
        let mut code = [0u8; 7];
        for (bit, node) in code.iter_mut().zip(&self.bits) {
            *bit = self.graph.most_probable_state(*node).unwrap() as u8;
        }
        code
    }
}
