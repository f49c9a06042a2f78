use std::fmt::Display;

use ndarray::Array1;
use rand::{distributions::WeightedIndex, Rng};
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use crate::{core::GraphError, gibbs::persistent::PersistentVec};

// ------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
/// Errors that could appear while building or running a Gibbs sampler
pub enum GibbsError {
    /// An error of the underlying graph
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// An edge connects a sampled variable to a variable outside of every collection
    #[error("Edge #{edge} touches variable #{node} that is not in any sampled collection")]
    UnregisteredNeighbor { edge: usize, node: usize },

    /// A marginal is requested for a variable that is not sampled
    #[error("Variable #{node} is not in any sampled collection")]
    UnregisteredVariable { node: usize },

    /// Results are requested before sampling
    #[error("Sampling has not been run yet")]
    NotSampled,

    /// Every sweep falls into the warm-up
    #[error("Warm-up of {warmup} sweeps and count of {count} sweeps leave no retained sample")]
    NoSamples { warmup: usize, count: usize },

    /// Every candidate state of a variable has zero weight
    #[error("All candidate states of variable #{variable} have zero conditional weight")]
    ZeroSupport { variable: usize },

    /// A model has no variables
    #[error("A model without variables can not be sampled")]
    EmptyModel,
}

/// Gibbs sampler's methods result type
pub type GibbsResult<T> = Result<T, GibbsError>;

// ------------------------------------------------------------------------------------------

/// A joint distribution given through the conditional distribution of
/// each variable. Variables are addressed by positions `0..dimension()`,
/// states by positions `0..cardinality(variable)`
pub trait ConditionalModel {
    /// Returns a number of variables
    fn dimension(&self) -> usize;

    /// Returns a number of states of a variable
    fn cardinality(&self, variable: usize) -> usize;

    /// Writes unnormalized conditional weights of every state of a variable
    /// given the rest of an assignment
    ///
    /// # Arguments
    ///
    /// * `variable` - A position of a variable
    /// * `assignment` - Current state positions of all variables
    /// * `weights` - An output buffer of length `cardinality(variable)`,
    ///     weights must be finite and non-negative
    fn conditional_weights(
        &self,
        variable: usize,
        assignment: &PersistentVec<usize>,
        weights: &mut [f64],
    ) -> GibbsResult<()>;

    /// Returns the error reported when no state of a variable has positive
    /// weight. Models that expose their own variable numbering override it
    #[inline]
    fn zero_support(&self, variable: usize) -> GibbsError {
        GibbsError::ZeroSupport { variable }
    }
}

/// The way a new state is drawn from a normalized conditional distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionalDraw {
    /// Repeatedly picks a uniformly random candidate and accepts it with
    /// its probability. There is no cap on the number of attempts
    #[default]
    Rejection,

    /// Inverts the cumulative distribution with a single uniform draw.
    /// Samples the same distribution as `Rejection`, but consumes the
    /// random source differently, so seeded runs differ
    InverseCdf,
}

impl ConditionalDraw {
    fn draw(
        &self,
        rng: &mut impl Rng,
        candidates: &Uniform<usize>,
        probabilities: &[f64],
        attempts: &mut u64,
    ) -> Option<usize> {
        match self {
            ConditionalDraw::Rejection => {
                let unit = Uniform::new(0f64, 1f64);
                loop {
                    *attempts += 1;
                    let candidate = candidates.sample(rng);
                    if unit.sample(rng) < probabilities[candidate] {
                        return Some(candidate);
                    }
                }
            }
            ConditionalDraw::InverseCdf => {
                *attempts += 1;
                let distr = WeightedIndex::new(probabilities).ok()?;
                Some(distr.sample(rng))
            }
        }
    }
}

/// Gibbs sampling settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GibbsOptions {
    /// Number of leading sweeps that are not retained
    pub warmup: usize,

    /// Number of sweeps after the warm-up
    pub count: usize,

    /// Conditional draw method
    pub draw: ConditionalDraw,
}

impl Default for GibbsOptions {
    fn default() -> Self {
        GibbsOptions {
            warmup: 100,
            count: 1000,
            draw: ConditionalDraw::Rejection,
        }
    }
}

/// Information returned after a Gibbs chain run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingInfo {
    /// Number of performed sweeps, every sweep resamples every variable once
    pub sweeps: usize,

    /// Number of retained samples
    pub retained_samples: usize,

    /// Number of candidate draws over the whole run
    pub draws: u64,
}

impl Display for SamplingInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Gibbs sampling has run {} sweeps, {} samples retained, {} candidate draws",
            self.sweeps, self.retained_samples, self.draws,
        )
    }
}

// ------------------------------------------------------------------------------------------

/// Runs a systematic scan Gibbs chain: every sweep resamples variables
/// in their positional order, each from its conditional distribution given
/// the latest states of all others.
///
/// # Arguments
///
/// * `model` - A model to sample from
/// * `options` - Warm-up, count and draw method
/// * `rng` - A source of randomness, the only source of non-determinism
///
/// # Notes
///
/// The chain starts from a uniformly random assignment and performs
/// `warmup + count` sweeps numbered from zero. A sweep is retained only
/// if its number is strictly greater than `warmup`, so `count - 1` samples
/// are returned. Retained samples share structure with each other
///
/// # Example
///
/// ```
/// use pmrf::gibbs::{run_chain, ConditionalModel, GibbsOptions, GibbsResult, PersistentVec};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// // Two independent fair coins
/// struct Coins;
///
/// impl ConditionalModel for Coins {
///     fn dimension(&self) -> usize { 2 }
///     fn cardinality(&self, _: usize) -> usize { 2 }
///     fn conditional_weights(
///         &self,
///         _: usize,
///         _: &PersistentVec<usize>,
///         w: &mut [f64],
///     ) -> GibbsResult<()> {
///         w.fill(1.0);
///         Ok(())
///     }
/// }
///
/// let mut rng = StdRng::seed_from_u64(42);
/// let options = GibbsOptions { warmup: 10, count: 100, ..Default::default() };
/// let (samples, info) = run_chain(&Coins, &options, &mut rng).unwrap();
/// assert_eq!(samples.len(), 99);
/// assert_eq!(info.sweeps, 110);
/// ```
pub fn run_chain<M>(
    model: &M,
    options: &GibbsOptions,
    rng: &mut impl Rng,
) -> GibbsResult<(Vec<PersistentVec<usize>>, SamplingInfo)>
where
    M: ConditionalModel + ?Sized,
{
    let dimension = model.dimension();
    if dimension == 0 {
        return Err(GibbsError::EmptyModel);
    }
    let cardinalities: Vec<usize> = (0..dimension).map(|i| model.cardinality(i)).collect();
    let mut candidates = Vec::with_capacity(dimension);
    for (variable, cardinality) in cardinalities.iter().enumerate() {
        if *cardinality == 0 {
            return Err(model.zero_support(variable));
        }
        candidates.push(Uniform::new(0, *cardinality));
    }
    let max_cardinality = cardinalities.iter().copied().max().unwrap_or(0);
    let mut weights = vec![0f64; max_cardinality];

    let mut assignment: PersistentVec<usize> =
        candidates.iter().map(|distr| distr.sample(rng)).collect();
    let sweeps = options.warmup + options.count;
    let mut samples = Vec::with_capacity(options.count);
    let mut draws = 0u64;
    for sweep in 0..sweeps {
        for variable in 0..dimension {
            let weights = &mut weights[..cardinalities[variable]];
            model.conditional_weights(variable, &assignment, weights)?;
            if !normalize_weights(weights) {
                return Err(model.zero_support(variable));
            }
            let state = options
                .draw
                .draw(rng, &candidates[variable], weights, &mut draws)
                .ok_or_else(|| model.zero_support(variable))?;
            assignment = assignment.update(variable, state);
        }
        if sweep > options.warmup {
            samples.push(assignment.clone());
        }
        trace!(sweep, draws, "gibbs sweep");
    }
    if samples.is_empty() {
        return Err(GibbsError::NoSamples {
            warmup: options.warmup,
            count: options.count,
        });
    }
    let info = SamplingInfo {
        sweeps,
        retained_samples: samples.len(),
        draws,
    };
    debug!(
        sweeps = info.sweeps,
        retained_samples = info.retained_samples,
        draws = info.draws,
        "gibbs chain finished"
    );
    Ok((samples, info))
}

/// Computes the empirical distribution of every variable over samples.
///
/// # Arguments
///
/// * `samples` - Assignments of state positions
/// * `cardinalities` - A number of states of each variable
///
/// # Notes
///
/// Values outside of `0..cardinality` are not counted
pub fn empirical_marginals(
    samples: &[PersistentVec<usize>],
    cardinalities: &[usize],
) -> Vec<Array1<f64>> {
    let mut counts: Vec<Array1<f64>> = cardinalities
        .iter()
        .map(|cardinality| Array1::zeros(*cardinality))
        .collect();
    for sample in samples {
        for (count, state) in counts.iter_mut().zip(sample.iter()) {
            if let Some(c) = count.get_mut(*state) {
                *c += 1f64;
            }
        }
    }
    if !samples.is_empty() {
        let total = samples.len() as f64;
        for count in &mut counts {
            count.mapv_inplace(|c| c / total);
        }
    }
    counts
}

// private functions ------------------------------------------------------------------------

#[inline]
fn normalize_weights(weights: &mut [f64]) -> bool {
    let sum: f64 = weights.iter().sum();
    if !(sum.is_finite() && sum > 0f64) {
        return false;
    }
    for w in weights.iter_mut() {
        *w /= sum;
    }
    true
}
