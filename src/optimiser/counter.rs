//! Count the distinct action sequences fitting the horizon
//!
//! A parallel DP to the optimiser: `P[0] = 1` and
//! `P[m] = sum of P[m - t]` over the step set `tenors ∪ {1}`, where the
//! extra 1 is the single wait step (deduplicated against a 1-month tenor).
//! Counts grow exponentially, so arithmetic starts in exact i64 and promotes
//! once, permanently, to f64 on the first addition that would overflow.

use std::fmt;

/// Number of distinct action sequences: exact while it fits a signed 64-bit
/// integer, a floating-point approximation afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCount {
    Exact(i64),
    Approx(f64),
}

impl fmt::Display for PathCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            PathCount::Exact(count) => write!(f, "{count}"),
            PathCount::Approx(count) if count.is_infinite() => {
                write!(f, "more than {:e}", f64::MAX)
            }
            PathCount::Approx(count) => write!(f, "approximately {count:e}"),
        }
    }
}

/// Count every distinct action sequence that exactly fills `num_months`.
///
/// `tenors` must be strictly ascending, as supplied by [`crate::ReturnMatrix`].
pub fn count_sequences(tenors: &[u32], num_months: usize) -> PathCount {
    // The wait step is one month; a 1-month tenor already covers it.
    let steps: Vec<u32> = if tenors.first() == Some(&1) {
        tenors.to_vec()
    } else {
        let mut s = Vec::with_capacity(tenors.len() + 1);
        s.push(1);
        s.extend_from_slice(tenors);
        s
    };

    let mut counts = vec![0i64; num_months + 1];
    counts[0] = 1;

    for month in 1..=num_months {
        let mut sum = 0i64;
        for &step in &steps {
            let step = step as usize;
            if step > month {
                break;
            }
            match sum.checked_add(counts[month - step]) {
                Some(total) => sum = total,
                // First overflowing addition: finish this month and all later
                // ones in doubles, seeded from the exact prefix.
                None => return PathCount::Approx(count_promoted(&steps, num_months, &counts, month)),
            }
        }
        counts[month] = sum;
    }

    PathCount::Exact(counts[num_months])
}

/// Continue the DP in f64 from `from_month`, whose exact prefix is in
/// `exact[..from_month]`. Infinity is preserved, not an error.
fn count_promoted(steps: &[u32], num_months: usize, exact: &[i64], from_month: usize) -> f64 {
    let mut counts: Vec<f64> = exact[..from_month].iter().map(|&c| c as f64).collect();
    counts.resize(num_months + 1, 0.0);

    for month in from_month..=num_months {
        let mut sum = 0.0f64;
        for &step in steps {
            let step = step as usize;
            if step > month {
                break;
            }
            sum += counts[month - step];
        }
        counts[month] = sum;
    }

    counts[num_months]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_exact_counts() {
        // Steps {1, 3}: 1, 1, 1, 2, 3, 4, 6, 9, 13.
        assert_eq!(count_sequences(&[3], 8), PathCount::Exact(13));
        // Steps {1, 2} follow the Fibonacci numbers: P[10] = F(11) = 89.
        assert_eq!(count_sequences(&[1, 2], 10), PathCount::Exact(89));
        // A 1-month tenor is the same step as waiting, not a second one.
        assert_eq!(count_sequences(&[1], 24), PathCount::Exact(1));
    }

    #[test]
    fn test_zero_horizon_has_one_empty_sequence() {
        assert_eq!(count_sequences(&[3], 0), PathCount::Exact(1));
    }

    #[test]
    fn test_stays_exact_through_late_fibonacci() {
        // F(81) and F(91) still fit in i64.
        assert_eq!(
            count_sequences(&[1, 2], 80),
            PathCount::Exact(37_889_062_373_143_906)
        );
        assert_eq!(
            count_sequences(&[1, 2], 90),
            PathCount::Exact(4_660_046_610_375_530_309)
        );
    }

    #[test]
    fn test_promotes_and_stays_accurate() {
        // F(101) = 573147844013817084101 overflows i64; the promoted value
        // must stay within 0.1% of the true count.
        let PathCount::Approx(count) = count_sequences(&[1, 2], 100) else {
            panic!("expected promotion to Approx for M = 100");
        };
        let expected = 573_147_844_013_817_084_101_f64;
        assert!((count / expected - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_infinity_preserved_and_rendered() {
        let count = count_sequences(&[1, 2], 3000);
        assert_eq!(count, PathCount::Approx(f64::INFINITY));
        assert_eq!(count.to_string(), "more than 1.7976931348623157e308");
    }

    #[test]
    fn test_display_forms() {
        assert_eq!(PathCount::Exact(89).to_string(), "89");
        let rendered = PathCount::Approx(5.0e20).to_string();
        assert!(rendered.starts_with("approximately 5e20"), "{rendered}");
    }
}
