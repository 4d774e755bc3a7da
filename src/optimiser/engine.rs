//! Top-k optimiser: dynamic programming with a heap-based k-way merge
//!
//! For every month the engine keeps the k best cumulative return factors
//! (CRFs) reachable at that month. The candidates for month m form n + 1
//! non-increasing lists (one per feasible tenor, plus waiting), because each
//! list is a previous month's descending frontier scaled by one positive
//! factor. A max-heap merging those lists therefore yields the month's top k
//! in order without materialising and sorting every successor.

use super::frontier::{CrfWindow, Decision, DecisionTable, UNFILLED};
use crate::action::Action;
use crate::returns::ReturnMatrix;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BinaryHeap;
use std::fmt;
use thiserror::Error;

/// Which side of the finite range a CRF product left
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowDirection {
    Above,
    Below,
}

impl fmt::Display for OverflowDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverflowDirection::Above => write!(f, "above"),
            OverflowDirection::Below => write!(f, "below"),
        }
    }
}

/// Fatal optimiser failures; the engine never retries
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptimiserError {
    /// A candidate CRF product left the finite double range
    #[error("cumulative return factor went {direction} the representable range (limit {limit:e}) at month {month}")]
    Overflow {
        direction: OverflowDirection,
        month: usize,
        /// The finite limit that was exceeded, `f64::MAX`
        limit: f64,
    },

    /// Path reconstruction hit an unfilled decision slot
    #[error("internal invariant violated: missing decision at month {month}, rank {rank}")]
    InvariantViolation { month: usize, rank: usize },
}

/// Configuration for a top-k run
#[derive(Debug, Clone)]
pub struct OptimiserConfig {
    /// How many of the best sequences to keep per month
    pub top_k: usize,
}

impl Default for OptimiserConfig {
    fn default() -> Self {
        Self { top_k: 1 }
    }
}

/// Ranked output: `crfs` descending, `paths[r]` reconstructs `crfs[r]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptimalResults {
    pub crfs: Vec<f64>,
    pub paths: Vec<Vec<Action>>,
}

impl OptimalResults {
    /// Number of ranked results (at most the configured k)
    pub fn len(&self) -> usize {
        self.crfs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crfs.is_empty()
    }
}

/// One entry of the k-way merge: the head (or a later element) of the
/// candidate list contributed by `tenor` (0 = wait) at the current month.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    crf: f64,
    tenor: u32,
    prev_rank: usize,
    prev_month: usize,
    factor: f64,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Candidate {}

impl Ord for Candidate {
    /// Primary key: CRF under total ordering. The structural tie-breaks keep
    /// pop order deterministic across runs; equal CRFs may surface in any
    /// order as far as callers are concerned.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.crf
            .total_cmp(&other.crf)
            .then_with(|| other.tenor.cmp(&self.tenor))
            .then_with(|| other.prev_rank.cmp(&self.prev_rank))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// The top-k dynamic-programming engine
pub struct LadderOptimiser {
    config: OptimiserConfig,
}

impl LadderOptimiser {
    /// Create an optimiser with the given configuration
    pub fn new(config: OptimiserConfig) -> Self {
        Self { config }
    }

    /// Convenience constructor for a plain top-k run
    pub fn with_top_k(top_k: usize) -> Self {
        Self::new(OptimiserConfig { top_k })
    }

    /// Compute the top-k cumulative return factors over the full horizon and
    /// reconstruct the action sequence behind each one.
    pub fn optimise(&self, matrix: &ReturnMatrix) -> Result<OptimalResults, OptimiserError> {
        let k = self.config.top_k;
        if k == 0 {
            return Ok(OptimalResults::default());
        }

        let num_months = matrix.num_months();
        let window = (matrix.max_tenor() as usize).min(num_months) + 1;

        let mut crf = CrfWindow::new(window, k);
        crf.set(0, 0, 1.0);
        let mut decisions = DecisionTable::new(num_months, k);

        log::debug!(
            "top-{} merge: {} tenors, {} months, window {}",
            k,
            matrix.num_tenors(),
            num_months,
            window
        );

        let mut heap: BinaryHeap<Candidate> = BinaryHeap::with_capacity(matrix.num_tenors() + 1);
        let mut final_count = 1usize;

        for month in 1..=num_months {
            // The cyclic slot may hold values from month - window.
            crf.reset(month);
            heap.clear();

            // Waiting is always feasible, so the heap starts non-empty.
            heap.push(Candidate {
                crf: crf.get(month - 1, 0),
                tenor: 0,
                prev_rank: 0,
                prev_month: month - 1,
                factor: 1.0,
            });

            // One head per tenor that fits; tenors ascend, so break at the first
            // that exceeds the month.
            for (row, &tenor) in matrix.tenors().iter().enumerate() {
                let t = tenor as usize;
                if t > month {
                    break;
                }
                let factor = 1.0 + matrix.get(row, month - t);
                let candidate = crf.get(month - t, 0) * factor;
                ensure_finite(candidate, month)?;
                heap.push(Candidate {
                    crf: candidate,
                    tenor,
                    prev_rank: 0,
                    prev_month: month - t,
                    factor,
                });
            }

            let mut rank = 0;
            while rank < k {
                let Some(cand) = heap.pop() else { break };
                crf.set(month, rank, cand.crf);
                decisions.set(
                    month,
                    rank,
                    Decision {
                        tenor: cand.tenor as i32,
                        prev_rank: cand.prev_rank as i32,
                    },
                );

                // Advance the list this candidate came from.
                let next_rank = cand.prev_rank + 1;
                if next_rank < k {
                    let prev = crf.get(cand.prev_month, next_rank);
                    if prev != UNFILLED {
                        let next_crf = prev * cand.factor;
                        ensure_finite(next_crf, month)?;
                        heap.push(Candidate {
                            crf: next_crf,
                            prev_rank: next_rank,
                            ..cand
                        });
                    }
                }
                rank += 1;
            }

            if month == num_months {
                final_count = rank;
            }
        }

        let crfs: Vec<f64> = (0..final_count).map(|r| crf.get(num_months, r)).collect();

        // Each rank's walk reads only the shared decision table, so the
        // reconstructions run independently.
        let paths: Vec<Vec<Action>> = (0..final_count)
            .into_par_iter()
            .map(|rank| reconstruct_path(&decisions, num_months, rank))
            .collect::<Result<_, _>>()?;

        Ok(OptimalResults { crfs, paths })
    }
}

/// Fail with the first non-finite candidate product
#[inline]
fn ensure_finite(candidate: f64, month: usize) -> Result<(), OptimiserError> {
    if candidate.is_finite() {
        return Ok(());
    }
    let direction = if candidate.is_sign_negative() {
        OverflowDirection::Below
    } else {
        OverflowDirection::Above
    };
    Err(OptimiserError::Overflow {
        direction,
        month,
        limit: f64::MAX,
    })
}

/// Walk the decision table backwards from (final month, rank), merging wait
/// streaks into single actions, and return the chronological sequence.
pub(crate) fn reconstruct_path(
    decisions: &DecisionTable,
    final_month: usize,
    rank: usize,
) -> Result<Vec<Action>, OptimiserError> {
    let mut month = final_month;
    let mut current_rank = rank;
    let mut wait_streak = 0u32;
    let mut actions = Vec::new();

    while month > 0 {
        let decision = decisions.get(month, current_rank);
        if decision.is_none() {
            return Err(OptimiserError::InvariantViolation {
                month,
                rank: current_rank,
            });
        }

        if decision.is_wait() {
            wait_streak += 1;
            month -= 1;
        } else {
            if wait_streak > 0 {
                actions.push(Action::wait(month as u32, wait_streak));
                wait_streak = 0;
            }
            let tenor = decision.tenor as u32;
            month -= tenor as usize;
            actions.push(Action::buy(month as u32, tenor));
        }
        current_rank = decision.prev_rank as usize;
    }
    if wait_streak > 0 {
        actions.push(Action::wait(0, wait_streak));
    }

    actions.reverse();
    Ok(actions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(tenors: Vec<u32>, months: usize, grid: Vec<f64>) -> ReturnMatrix {
        ReturnMatrix::new(tenors, months, grid).unwrap()
    }

    /// Recompute a path's CRF from the matrix, multiplying factors in
    /// chronological order as the engine does.
    fn crf_of_path(m: &ReturnMatrix, path: &[Action]) -> f64 {
        let mut crf = 1.0;
        for action in path {
            if let Action::Buy { start_month, tenor } = action {
                let row = m.tenors().iter().position(|t| t == tenor).unwrap();
                crf *= 1.0 + m.get(row, *start_month as usize);
            }
        }
        crf
    }

    /// Every feasible action sequence's CRF, by direct enumeration.
    fn enumerate_crfs(m: &ReturnMatrix, month: usize, crf: f64, out: &mut Vec<f64>) {
        if month == m.num_months() {
            out.push(crf);
            return;
        }
        enumerate_crfs(m, month + 1, crf, out);
        for (row, &tenor) in m.tenors().iter().enumerate() {
            let t = tenor as usize;
            if month + t > m.num_months() {
                break;
            }
            enumerate_crfs(m, month + t, crf * (1.0 + m.get(row, month)), out);
        }
    }

    fn cross_check_matrix() -> ReturnMatrix {
        matrix(
            vec![2, 3],
            8,
            vec![
                0.020, 0.015, 0.030, 0.010, 0.025, 0.020, 0.005, 0.040, // tenor 2
                0.050, 0.040, 0.060, 0.045, 0.055, 0.050, 0.035, 0.065, // tenor 3
            ],
        )
    }

    #[test]
    fn test_k_zero_returns_empty() {
        let m = matrix(vec![2], 4, vec![0.1; 4]);
        let results = LadderOptimiser::with_top_k(0).optimise(&m).unwrap();
        assert!(results.is_empty());
        assert!(results.paths.is_empty());
    }

    #[test]
    fn test_single_tenor_single_month_boundary() {
        let m = matrix(vec![4], 4, vec![0.05, 0.0, 0.0, 0.0]);
        let results = LadderOptimiser::with_top_k(1).optimise(&m).unwrap();

        assert_eq!(results.crfs, vec![1.05]);
        assert_eq!(results.paths, vec![vec![Action::buy(0, 4)]]);
    }

    #[test]
    fn test_all_zero_returns_still_produce_a_path() {
        let m = matrix(vec![2, 3], 6, vec![0.0; 12]);
        let results = LadderOptimiser::with_top_k(1).optimise(&m).unwrap();

        assert_eq!(results.crfs, vec![1.0]);
        assert_eq!(crf_of_path(&m, &results.paths[0]), 1.0);
    }

    #[test]
    fn test_top_five_ladder_of_two_month_bonds() {
        // Tenors [2], M = 4, 10% everywhere: b2,b2 beats every alternative,
        // the three single-purchase variants tie at 1.1, and the pure wait
        // closes the list at exactly 1.0.
        let m = matrix(vec![2], 4, vec![0.1; 4]);
        let results = LadderOptimiser::with_top_k(5).optimise(&m).unwrap();

        assert_eq!(results.crfs.len(), 5);
        assert_eq!(results.crfs[0], 1.1 * 1.1);
        assert_eq!(results.paths[0], vec![Action::buy(0, 2), Action::buy(2, 2)]);
        assert_eq!(results.crfs[1], 1.1);
        assert_eq!(results.crfs[2], 1.1);
        assert_eq!(results.crfs[3], 1.1);
        assert_eq!(results.crfs[4], 1.0);
        assert_eq!(results.paths[4], vec![Action::wait(0, 4)]);
    }

    #[test]
    fn test_overflow_reported_at_first_non_finite_month() {
        // Factor 2 every month doubles the CRF: 2^1023 is finite, 2^1024 is not.
        let m = matrix(vec![1], 2000, vec![1.0; 2000]);
        let err = LadderOptimiser::with_top_k(1).optimise(&m).unwrap_err();

        assert_eq!(
            err,
            OptimiserError::Overflow {
                direction: OverflowDirection::Above,
                month: 1024,
                limit: f64::MAX,
            }
        );
    }

    #[test]
    fn test_underflow_direction_is_below() {
        // Doubling builds the CRF up to 2^1023; a negative factor at the last
        // step sends the candidate past -f64::MAX instead.
        let mut grid = vec![1.0; 2000];
        grid[1023] = -3.0;
        let m = matrix(vec![1], 2000, grid);
        let err = LadderOptimiser::with_top_k(1).optimise(&m).unwrap_err();

        assert!(matches!(
            err,
            OptimiserError::Overflow {
                direction: OverflowDirection::Below,
                month: 1024,
                ..
            }
        ));
    }

    #[test]
    fn test_bitwise_equal_tie_emits_both_paths() {
        // Dyadic returns so two distinct strategies produce the identical
        // double: (1+1)*(1+1) == 1+3 == 4.0.
        let mut grid = vec![0.0; 12];
        grid[0] = 1.0; // tenor 3 at month 0
        grid[3] = 1.0; // tenor 3 at month 3
        grid[6] = 3.0; // tenor 6 at month 0
        let m = matrix(vec![3, 6], 6, grid);
        let results = LadderOptimiser::with_top_k(2).optimise(&m).unwrap();

        assert_eq!(results.crfs, vec![4.0, 4.0]);
        let ladder = vec![Action::buy(0, 3), Action::buy(3, 3)];
        let single = vec![Action::buy(0, 6)];
        assert!(results.paths.contains(&ladder));
        assert!(results.paths.contains(&single));
    }

    #[test]
    fn test_adjacent_waits_are_merged() {
        // Tenors [3], M = 5: two trailing months cannot fit a purchase, so the
        // optimum is one bond followed by a single two-month wait.
        let m = matrix(vec![3], 5, vec![0.01; 5]);
        let results = LadderOptimiser::with_top_k(3).optimise(&m).unwrap();

        assert_eq!(results.crfs[0], 1.01);
        assert_eq!(results.paths[0], vec![Action::buy(0, 3), Action::wait(3, 2)]);
        for path in &results.paths {
            for pair in path.windows(2) {
                assert!(
                    !(matches!(pair[0], Action::Wait { .. })
                        && matches!(pair[1], Action::Wait { .. })),
                    "adjacent waits must be merged: {path:?}"
                );
            }
        }
    }

    #[test]
    fn test_matches_exhaustive_enumeration() {
        let m = cross_check_matrix();
        let k = 25;
        let results = LadderOptimiser::with_top_k(k).optimise(&m).unwrap();

        let mut expected = Vec::new();
        enumerate_crfs(&m, 0, 1.0, &mut expected);
        expected.sort_by(|a, b| b.total_cmp(a));
        expected.truncate(k);

        assert_eq!(results.crfs, expected);
    }

    #[test]
    fn test_k_larger_than_solution_count() {
        // Tenors [2], M = 2: only b2 and w2 exist, so k = 10 yields 2 results.
        let m = matrix(vec![2], 2, vec![0.1, 0.0]);
        let results = LadderOptimiser::with_top_k(10).optimise(&m).unwrap();

        assert_eq!(results.crfs.len(), 2);
        assert_eq!(results.crfs[0], 1.1);
        assert_eq!(results.crfs[1], 1.0);
        assert_eq!(results.paths[1], vec![Action::wait(0, 2)]);
    }

    #[test]
    fn test_rank_zero_bitwise_stable_across_k() {
        let m = cross_check_matrix();
        let top1 = LadderOptimiser::with_top_k(1).optimise(&m).unwrap();
        let top25 = LadderOptimiser::with_top_k(25).optimise(&m).unwrap();

        assert_eq!(top1.crfs[0].to_bits(), top25.crfs[0].to_bits());
    }

    #[test]
    fn test_crfs_non_increasing_and_paths_reconstruct() {
        let m = cross_check_matrix();
        let results = LadderOptimiser::with_top_k(25).optimise(&m).unwrap();

        assert!(!results.is_empty());
        assert_eq!(results.crfs.len(), results.paths.len());
        for pair in results.crfs.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
        for (crf, path) in results.crfs.iter().zip(&results.paths) {
            let recomputed = crf_of_path(&m, path);
            let ulp = crf.abs() * f64::EPSILON;
            assert!(
                (recomputed - crf).abs() <= 4.0 * ulp,
                "path CRF {recomputed} drifted from frontier CRF {crf}"
            );
        }
    }

    #[test]
    fn test_paths_are_chronological_and_gapless() {
        let m = cross_check_matrix();
        let results = LadderOptimiser::with_top_k(25).optimise(&m).unwrap();

        for path in &results.paths {
            let mut month = 0u32;
            for action in path {
                assert_eq!(action.start_month(), month, "gap in {path:?}");
                month += action.length();
            }
            assert_eq!(month as usize, m.num_months());
        }
    }
}
