mod beliefs;
mod engine;
mod schedule;

pub use engine::{
    run_iterations, run_iterations_parallel, run_with_options, BeliefPropagationOptions,
    MessagePassingInfo,
};
pub use schedule::Schedule;
