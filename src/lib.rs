//! Bond Ladder Optimiser - Top-k cumulative return engine for bond laddering
//!
//! This library provides:
//! - Validated loading of per-month holding-period return (HPR) grids from CSV
//! - A top-k dynamic-programming optimiser with heap-based k-way merging
//! - A single-best scalar DP for when only the optimum is needed
//! - A path counter for the number of distinct feasible action sequences
//! - Rendering and CSV export of ranked results

pub mod action;
pub mod cli;
pub mod optimiser;
pub mod output;
pub mod returns;

// Re-export commonly used types
pub use action::Action;
pub use optimiser::{LadderOptimiser, OptimalResults, OptimiserConfig, OptimiserError, PathCount};
pub use returns::{LoadError, MatrixError, ReturnMatrix};
