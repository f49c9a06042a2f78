/// A module containing the pairwise Markov random field: variables, potentials and message tables
pub mod core;
/// A module containing loopy belief propagation (log-domain sum-product) over a pairwise graph
pub mod bp;
/// A module containing Gibbs sampling over a pairwise graph or any model given by its conditionals
pub mod gibbs;

#[cfg(test)]
mod tests;
