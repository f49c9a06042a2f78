mod chain;
mod mrf;
mod persistent;

pub use chain::{
    empirical_marginals, run_chain, ConditionalDraw, ConditionalModel, GibbsError, GibbsOptions,
    GibbsResult, SamplingInfo,
};
pub use mrf::GibbsSampler;
pub use persistent::{Iter, PersistentVec};
