//! Optimisation engines over a bond return matrix

mod counter;
mod engine;
mod frontier;
mod scalar;

pub use counter::{count_sequences, PathCount};
pub use engine::{
    LadderOptimiser, OptimalResults, OptimiserConfig, OptimiserError, OverflowDirection,
};
pub use scalar::best_sequence;
