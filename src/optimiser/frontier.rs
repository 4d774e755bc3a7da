//! Rolling CRF window and decision table backing the top-k engine
//!
//! The engine only ever looks back `max_tenor` months, so CRFs live in a
//! cyclic window of `L + 1` rows keyed by phase. Decisions cannot be rolled:
//! path reconstruction walks the whole horizon backwards, so the decision
//! table keeps all `M + 1` rows.

/// Sentinel for a frontier rank that has not been filled
pub(crate) const UNFILLED: f64 = f64::NEG_INFINITY;

/// Back-pointer for one frontier rank: which tenor matured here (0 = wait,
/// -1 = unfilled) and which rank of the predecessor month it extends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Decision {
    pub tenor: i32,
    pub prev_rank: i32,
}

impl Decision {
    /// No decision recorded
    pub const NONE: Decision = Decision {
        tenor: -1,
        prev_rank: -1,
    };

    /// The month-0 seed: wait sentinel with no predecessor
    pub const SEED: Decision = Decision {
        tenor: 0,
        prev_rank: -1,
    };

    pub fn is_none(self) -> bool {
        self.tenor < 0
    }

    pub fn is_wait(self) -> bool {
        self.tenor == 0
    }
}

/// Cyclic `(L + 1) x k` buffer of the top-k CRFs per month.
///
/// Physical row for month m is `m mod (L + 1)`; callers must reset a row
/// before reuse since it may hold values from month `m - (L + 1)`.
#[derive(Debug)]
pub(crate) struct CrfWindow {
    window: usize,
    k: usize,
    values: Vec<f64>,
}

impl CrfWindow {
    pub fn new(window: usize, k: usize) -> Self {
        debug_assert!(window >= 2, "window must cover at least months m-1 and m");
        Self {
            window,
            k,
            values: vec![UNFILLED; window * k],
        }
    }

    /// Physical row for a logical month
    #[inline]
    pub fn phase(&self, month: usize) -> usize {
        month % self.window
    }

    #[inline]
    pub fn get(&self, month: usize, rank: usize) -> f64 {
        self.values[self.phase(month) * self.k + rank]
    }

    #[inline]
    pub fn set(&mut self, month: usize, rank: usize, crf: f64) {
        let idx = self.phase(month) * self.k + rank;
        self.values[idx] = crf;
    }

    /// Clear the stale row for a month about to be filled
    pub fn reset(&mut self, month: usize) {
        let start = self.phase(month) * self.k;
        self.values[start..start + self.k].fill(UNFILLED);
    }
}

/// Dense `(M + 1) x k` table of back-pointers, kept for the whole run
#[derive(Debug)]
pub(crate) struct DecisionTable {
    k: usize,
    entries: Vec<Decision>,
}

impl DecisionTable {
    pub fn new(num_months: usize, k: usize) -> Self {
        let mut table = Self {
            k,
            entries: vec![Decision::NONE; (num_months + 1) * k],
        };
        table.set(0, 0, Decision::SEED);
        table
    }

    #[inline]
    pub fn get(&self, month: usize, rank: usize) -> Decision {
        self.entries[month * self.k + rank]
    }

    #[inline]
    pub fn set(&mut self, month: usize, rank: usize, decision: Decision) {
        self.entries[month * self.k + rank] = decision;
    }
}
