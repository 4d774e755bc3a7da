//! Bond return matrix matching the tenor-by-month CSV format

use thiserror::Error;

/// Errors raised when constructing or indexing a [`ReturnMatrix`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatrixError {
    /// Grid length does not match tenors x months
    #[error("return grid has {actual} entries, expected {expected} ({tenors} tenors x {months} months)")]
    ShapeMismatch {
        tenors: usize,
        months: usize,
        expected: usize,
        actual: usize,
    },

    /// No tenors or no months of data
    #[error("return matrix must have at least one tenor and one month")]
    Empty,

    /// Fewer months of data than the shortest tenor
    #[error("shortest tenor is {shortest} months, but only {months} months of data provided")]
    TooFewMonths { shortest: u32, months: usize },

    /// Tenor list is not strictly ascending (the loader sorts before construction)
    #[error("tenors must be strictly ascending and free of duplicates")]
    Unsorted,

    /// A zero tenor cannot mature
    #[error("tenors must be positive")]
    ZeroTenor,

    /// An entry g satisfies 1 + g non-finite
    #[error("return for tenor {tenor} at month {month} is not a finite number")]
    NonFiniteReturn { tenor: u32, month: usize },

    /// Bounds-checked access outside the grid
    #[error("return lookup out of range: row {row}, month {month} (grid is {rows} x {months})")]
    OutOfRange {
        row: usize,
        month: usize,
        rows: usize,
        months: usize,
    },
}

/// Immutable grid of holding-period returns indexed by (tenor row, month).
///
/// Row i holds the returns for the i-th smallest tenor: a bond purchased at
/// month m matures at month m + tenor with fractional return `get(i, m)`.
/// Constructed once by the loader, then shared read-only by the optimisers
/// and the path counter.
#[derive(Debug, Clone)]
pub struct ReturnMatrix {
    /// Tenor lengths in months, strictly ascending
    tenors: Vec<u32>,

    /// Number of months of return data (the horizon M)
    num_months: usize,

    /// Row-major returns, `tenors.len() * num_months` entries
    grid: Vec<f64>,

    /// Opaque tag recording where the data came from, untouched by the engine
    source_path: Option<String>,
}

impl ReturnMatrix {
    /// Validate and construct a return matrix.
    ///
    /// `tenors` must already be strictly ascending; the loader is responsible
    /// for sorting rows (and permuting the grid in lock-step) before calling.
    pub fn new(tenors: Vec<u32>, num_months: usize, grid: Vec<f64>) -> Result<Self, MatrixError> {
        if tenors.is_empty() || num_months == 0 {
            return Err(MatrixError::Empty);
        }
        if tenors.windows(2).any(|w| w[0] >= w[1]) {
            return Err(MatrixError::Unsorted);
        }
        if tenors[0] == 0 {
            return Err(MatrixError::ZeroTenor);
        }
        let expected = tenors.len() * num_months;
        if grid.len() != expected {
            return Err(MatrixError::ShapeMismatch {
                tenors: tenors.len(),
                months: num_months,
                expected,
                actual: grid.len(),
            });
        }
        if (num_months as u64) < u64::from(tenors[0]) {
            return Err(MatrixError::TooFewMonths {
                shortest: tenors[0],
                months: num_months,
            });
        }
        for (idx, &g) in grid.iter().enumerate() {
            if !(1.0 + g).is_finite() {
                return Err(MatrixError::NonFiniteReturn {
                    tenor: tenors[idx / num_months],
                    month: idx % num_months,
                });
            }
        }

        Ok(Self {
            tenors,
            num_months,
            grid,
            source_path: None,
        })
    }

    /// Attach the path the data was loaded from
    pub fn with_source_path(mut self, path: impl Into<String>) -> Self {
        self.source_path = Some(path.into());
        self
    }

    /// Bounds-checked return lookup
    pub fn at(&self, row: usize, month: usize) -> Result<f64, MatrixError> {
        if row >= self.tenors.len() || month >= self.num_months {
            return Err(MatrixError::OutOfRange {
                row,
                month,
                rows: self.tenors.len(),
                months: self.num_months,
            });
        }
        Ok(self.grid[row * self.num_months + month])
    }

    /// Return lookup for the hot loops; panics on out-of-range like slice indexing
    #[inline]
    pub fn get(&self, row: usize, month: usize) -> f64 {
        debug_assert!(row < self.tenors.len() && month < self.num_months);
        self.grid[row * self.num_months + month]
    }

    /// Number of tenor rows
    pub fn num_tenors(&self) -> usize {
        self.tenors.len()
    }

    /// Number of months of data (the horizon M)
    pub fn num_months(&self) -> usize {
        self.num_months
    }

    /// Tenors in strictly ascending order
    pub fn tenors(&self) -> &[u32] {
        &self.tenors
    }

    /// The longest tenor
    pub fn max_tenor(&self) -> u32 {
        *self.tenors.last().expect("matrix is never empty")
    }

    /// Where the data was loaded from, if recorded
    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construct_and_access() {
        let matrix = ReturnMatrix::new(vec![3, 6], 6, vec![0.01; 12]).unwrap();

        assert_eq!(matrix.num_tenors(), 2);
        assert_eq!(matrix.num_months(), 6);
        assert_eq!(matrix.tenors(), &[3, 6]);
        assert_eq!(matrix.max_tenor(), 6);
        assert_eq!(matrix.at(1, 5).unwrap(), 0.01);
        assert_eq!(matrix.get(0, 0), 0.01);
    }

    #[test]
    fn test_row_major_layout() {
        let grid: Vec<f64> = (0..8).map(|i| i as f64 / 100.0).collect();
        let matrix = ReturnMatrix::new(vec![2, 4], 4, grid).unwrap();

        assert_eq!(matrix.get(0, 3), 0.03);
        assert_eq!(matrix.get(1, 0), 0.04);
    }

    #[test]
    fn test_shape_mismatch() {
        let err = ReturnMatrix::new(vec![3], 4, vec![0.0; 5]).unwrap_err();
        assert!(matches!(err, MatrixError::ShapeMismatch { expected: 4, actual: 5, .. }));
    }

    #[test]
    fn test_empty_dimensions_rejected() {
        assert_eq!(ReturnMatrix::new(vec![], 4, vec![]).unwrap_err(), MatrixError::Empty);
        assert_eq!(ReturnMatrix::new(vec![3], 0, vec![]).unwrap_err(), MatrixError::Empty);
    }

    #[test]
    fn test_too_few_months() {
        let err = ReturnMatrix::new(vec![6], 4, vec![0.0; 4]).unwrap_err();
        assert_eq!(err, MatrixError::TooFewMonths { shortest: 6, months: 4 });
    }

    #[test]
    fn test_unsorted_and_duplicate_tenors_rejected() {
        assert_eq!(
            ReturnMatrix::new(vec![6, 3], 6, vec![0.0; 12]).unwrap_err(),
            MatrixError::Unsorted
        );
        assert_eq!(
            ReturnMatrix::new(vec![3, 3], 6, vec![0.0; 12]).unwrap_err(),
            MatrixError::Unsorted
        );
    }

    #[test]
    fn test_non_finite_return_rejected() {
        let err = ReturnMatrix::new(vec![2], 3, vec![0.0, f64::INFINITY, 0.0]).unwrap_err();
        assert_eq!(err, MatrixError::NonFiniteReturn { tenor: 2, month: 1 });
    }

    #[test]
    fn test_out_of_range() {
        let matrix = ReturnMatrix::new(vec![3], 3, vec![0.0; 3]).unwrap();
        assert!(matches!(matrix.at(0, 3), Err(MatrixError::OutOfRange { .. })));
        assert!(matches!(matrix.at(1, 0), Err(MatrixError::OutOfRange { .. })));
    }
}
