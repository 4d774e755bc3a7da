//! Single-best scalar DP
//!
//! The flat variant of the engine: one CRF and one back-pointer per month
//! instead of k. Cheaper when only the optimum is wanted, and an independent
//! oracle for the top-k engine's rank 0.

use super::engine::{OptimiserError, OverflowDirection};
use crate::action::Action;
use crate::returns::ReturnMatrix;

/// Compute the single best cumulative return factor over the full horizon
/// and the action sequence achieving it.
///
/// Agrees bitwise with rank 0 of [`super::LadderOptimiser::optimise`]: the
/// candidate set and tie-breaking (waits, then shorter tenors) are identical.
pub fn best_sequence(matrix: &ReturnMatrix) -> Result<(f64, Vec<Action>), OptimiserError> {
    let num_months = matrix.num_months();

    // best[m] holds the optimal CRF at month m; waiting makes every month
    // reachable, so no -infinity sentinel is needed past the seed.
    let mut best = vec![f64::NEG_INFINITY; num_months + 1];
    best[0] = 1.0;

    // best_tenor[m]: the tenor maturing at m on the optimal path, 0 for a wait.
    let mut best_tenor = vec![0u32; num_months + 1];

    for month in 1..=num_months {
        let mut month_best = best[month - 1];
        let mut month_tenor = 0u32;

        for (row, &tenor) in matrix.tenors().iter().enumerate() {
            let t = tenor as usize;
            if t > month {
                break;
            }
            let factor = 1.0 + matrix.get(row, month - t);
            let candidate = best[month - t] * factor;
            if !candidate.is_finite() {
                let direction = if candidate.is_sign_negative() {
                    OverflowDirection::Below
                } else {
                    OverflowDirection::Above
                };
                return Err(OptimiserError::Overflow {
                    direction,
                    month,
                    limit: f64::MAX,
                });
            }
            if candidate > month_best {
                month_best = candidate;
                month_tenor = tenor;
            }
        }

        best[month] = month_best;
        best_tenor[month] = month_tenor;
    }

    // Walk backwards, merging wait streaks, then restore chronological order.
    let mut actions = Vec::new();
    let mut month = num_months;
    let mut wait_streak = 0u32;
    while month > 0 {
        let tenor = best_tenor[month];
        if tenor == 0 {
            wait_streak += 1;
            month -= 1;
            continue;
        }
        if wait_streak > 0 {
            actions.push(Action::wait(month as u32, wait_streak));
            wait_streak = 0;
        }
        month -= tenor as usize;
        actions.push(Action::buy(month as u32, tenor));
    }
    if wait_streak > 0 {
        actions.push(Action::wait(0, wait_streak));
    }
    actions.reverse();

    Ok((best[num_months], actions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimiser::LadderOptimiser;

    #[test]
    fn test_single_bond_fills_horizon() {
        let m = ReturnMatrix::new(vec![4], 4, vec![0.05, 0.0, 0.0, 0.0]).unwrap();
        let (crf, path) = best_sequence(&m).unwrap();

        assert_eq!(crf, 1.05);
        assert_eq!(path, vec![Action::buy(0, 4)]);
    }

    #[test]
    fn test_trailing_wait_merged() {
        let m = ReturnMatrix::new(vec![3], 5, vec![0.01; 5]).unwrap();
        let (crf, path) = best_sequence(&m).unwrap();

        assert_eq!(crf, 1.01);
        assert_eq!(path, vec![Action::buy(0, 3), Action::wait(3, 2)]);
    }

    #[test]
    fn test_agrees_with_engine_rank_zero() {
        let m = ReturnMatrix::new(
            vec![2, 3],
            8,
            vec![
                0.020, 0.015, 0.030, 0.010, 0.025, 0.020, 0.005, 0.040,
                0.050, 0.040, 0.060, 0.045, 0.055, 0.050, 0.035, 0.065,
            ],
        )
        .unwrap();

        let (crf, path) = best_sequence(&m).unwrap();
        let results = LadderOptimiser::with_top_k(4).optimise(&m).unwrap();

        assert_eq!(crf.to_bits(), results.crfs[0].to_bits());
        assert_eq!(path, results.paths[0]);
    }

    #[test]
    fn test_overflow_matches_engine() {
        let m = ReturnMatrix::new(vec![1], 2000, vec![1.0; 2000]).unwrap();
        let scalar_err = best_sequence(&m).unwrap_err();
        let engine_err = LadderOptimiser::with_top_k(1).optimise(&m).unwrap_err();

        assert_eq!(scalar_err, engine_err);
    }
}
