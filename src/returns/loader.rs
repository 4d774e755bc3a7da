//! Load bond return grids from tenor-by-month CSV files

use super::{MatrixError, ReturnMatrix};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::env;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Spreadsheet-native extensions a user may mistake for CSV
const SPREADSHEET_EXTENSIONS: [&str; 6] = ["xlsx", "xls", "xlsm", "xlsb", "numbers", "ods"];

/// Errors raised while loading a bond return file.
///
/// All of these are recoverable at the prompt: the user is shown the message
/// and asked for another path.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("cannot read {path}: {source}")]
    Csv {
        path: String,
        source: csv::Error,
    },

    #[error("file extension .{0} is a spreadsheet format, save as CSV instead")]
    SpreadsheetExtension(String),

    #[error("file extension must be .csv or .txt, received .{0}")]
    UnsupportedExtension(String),

    #[error("{0} is empty")]
    EmptyFile(String),

    #[error("all lines blank")]
    AllLinesBlank,

    #[error("first entry should be \"Tenor\", received \"{0}\"")]
    BadHeader(String),

    #[error("missing or mislabelled month {expected}, received \"{found}\"")]
    MissingMonth { expected: usize, found: String },

    #[error("no bond return data")]
    NoReturnColumns,

    #[error("row {row}: {reason}")]
    BadTenor { row: usize, reason: String },

    #[error("row {row}: duplicate tenor {tenor}")]
    DuplicateTenor { row: usize, tenor: u32 },

    #[error("row {row}, column {column}: missing bond return")]
    MissingReturn { row: usize, column: usize },

    #[error("row {row}, column {column}: {reason}")]
    BadReturn {
        row: usize,
        column: usize,
        reason: String,
    },

    #[error("row {row}: expected {expected} bond returns, found {found}")]
    MissingColumns {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("row {row}: {extra} more column(s) than the {expected} months in the header")]
    TooManyColumns {
        row: usize,
        expected: usize,
        extra: usize,
    },

    #[error("cannot expand '~': home directory environment variable not set")]
    HomeDirUnavailable,

    #[error("cannot expand \"{0}\" (expansion of '~username' is not supported)")]
    UserExpansion(String),

    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

/// Returns the file extension, without '.', in lower case; empty if none
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Expand a leading `~` to the user's home directory.
///
/// `~username` forms are rejected rather than silently misread.
pub fn expand_user_path(raw: &str) -> Result<PathBuf, LoadError> {
    if !raw.starts_with('~') {
        return Ok(PathBuf::from(raw));
    }
    let rest = &raw[1..];
    if !rest.is_empty() && !rest.starts_with('/') && !rest.starts_with('\\') {
        let user_part = raw
            .split_once(['/', '\\'])
            .map(|(head, _)| head)
            .unwrap_or(raw);
        return Err(LoadError::UserExpansion(user_part.to_string()));
    }

    let home = env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .ok_or(LoadError::HomeDirUnavailable)?;

    let mut expanded = PathBuf::from(home);
    let tail = rest.trim_start_matches(['/', '\\']);
    if !tail.is_empty() {
        expanded.push(tail);
    }
    Ok(expanded)
}

/// Load a bond return matrix from a CSV/TXT file path.
///
/// Expands `~`, rejects spreadsheet extensions with a targeted message, and
/// sorts rows by ascending tenor (permuting the grid in lock-step) before
/// constructing the matrix.
pub fn load_return_csv(raw_path: &str) -> Result<ReturnMatrix, LoadError> {
    let path = expand_user_path(raw_path)?;

    let ext = extension_of(&path);
    if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
        return Err(LoadError::SpreadsheetExtension(ext));
    }
    if ext != "csv" && ext != "txt" {
        return Err(LoadError::UnsupportedExtension(ext));
    }

    let display = path.display().to_string();
    let file = File::open(&path).map_err(|source| LoadError::Io {
        path: display.clone(),
        source,
    })?;

    let matrix = load_from_reader(file, &display)?;
    log::debug!(
        "loaded {} tenors x {} months from {}",
        matrix.num_tenors(),
        matrix.num_months(),
        display
    );
    Ok(matrix.with_source_path(display))
}

/// Load a bond return matrix from any reader (e.g. string buffer in tests).
///
/// `name` is used only in error messages.
pub fn load_from_reader<R: Read>(reader: R, name: &str) -> Result<ReturnMatrix, LoadError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut records = csv_reader.records();

    // The header is the first non-blank row.
    let mut header: Option<StringRecord> = None;
    let mut row_num = 0usize;
    let mut saw_any = false;
    for result in records.by_ref() {
        let record = result.map_err(|source| LoadError::Csv {
            path: name.to_string(),
            source,
        })?;
        saw_any = true;
        row_num += 1;
        if !is_blank(&record) {
            header = Some(record);
            break;
        }
    }
    let header = match header {
        Some(h) => h,
        None if saw_any => return Err(LoadError::AllLinesBlank),
        None => return Err(LoadError::EmptyFile(name.to_string())),
    };

    let num_months = validate_header(&header)?;

    // READ ROWS
    let mut tenors_unsorted: Vec<u32> = Vec::new();
    let mut grid_unsorted: Vec<f64> = Vec::new();

    for result in records {
        let record = result.map_err(|source| LoadError::Csv {
            path: name.to_string(),
            source,
        })?;
        row_num += 1;
        if is_blank(&record) {
            continue;
        }

        let tenor = parse_tenor(record.get(0).unwrap_or(""), row_num)?;
        if tenors_unsorted.contains(&tenor) {
            return Err(LoadError::DuplicateTenor {
                row: row_num,
                tenor,
            });
        }
        tenors_unsorted.push(tenor);

        let cells = record.len().saturating_sub(1);
        if cells < num_months {
            return Err(LoadError::MissingColumns {
                row: row_num,
                expected: num_months,
                found: cells,
            });
        }
        if cells > num_months {
            return Err(LoadError::TooManyColumns {
                row: row_num,
                expected: num_months,
                extra: cells - num_months,
            });
        }

        for (month, cell) in record.iter().skip(1).enumerate() {
            if cell.is_empty() {
                return Err(LoadError::MissingReturn {
                    row: row_num,
                    column: month,
                });
            }
            grid_unsorted.push(parse_return(cell, row_num, month)?);
        }
    }

    if tenors_unsorted.is_empty() {
        return Err(LoadError::NoReturnColumns);
    }

    // SORT ROWS: order row indices by tenor, then copy tenors and grid rows in lock-step.
    let mut order: Vec<usize> = (0..tenors_unsorted.len()).collect();
    order.sort_by_key(|&i| tenors_unsorted[i]);

    let mut tenors_sorted = Vec::with_capacity(tenors_unsorted.len());
    let mut grid_sorted = vec![0.0; grid_unsorted.len()];
    for (r, &source) in order.iter().enumerate() {
        tenors_sorted.push(tenors_unsorted[source]);
        grid_sorted[r * num_months..(r + 1) * num_months]
            .copy_from_slice(&grid_unsorted[source * num_months..(source + 1) * num_months]);
    }

    Ok(ReturnMatrix::new(tenors_sorted, num_months, grid_sorted)?)
}

/// A record is blank when every cell trims to nothing (whitespace or commas only)
fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|cell| cell.is_empty())
}

/// Check the header starts with "Tenor" and lists the consecutive months 0..M-1
fn validate_header(header: &StringRecord) -> Result<usize, LoadError> {
    let first = header.get(0).unwrap_or("");
    if !first.eq_ignore_ascii_case("tenor") {
        return Err(LoadError::BadHeader(first.to_string()));
    }

    let mut expected = 0usize;
    for cell in header.iter().skip(1) {
        if cell != expected.to_string() {
            return Err(LoadError::MissingMonth {
                expected,
                found: cell.to_string(),
            });
        }
        expected += 1;
    }
    if expected == 0 {
        return Err(LoadError::NoReturnColumns);
    }
    Ok(expected)
}

/// Parse a tenor cell: non-empty, all digits, positive, within range
fn parse_tenor(cell: &str, row: usize) -> Result<u32, LoadError> {
    if cell.is_empty() {
        return Err(LoadError::BadTenor {
            row,
            reason: "tenor is empty".to_string(),
        });
    }
    if !cell.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LoadError::BadTenor {
            row,
            reason: "tenor must be a positive integer".to_string(),
        });
    }
    let tenor: u32 = cell.parse().map_err(|_| LoadError::BadTenor {
        row,
        reason: "tenor is too long".to_string(),
    })?;
    if tenor == 0 {
        return Err(LoadError::BadTenor {
            row,
            reason: "tenor must be a positive integer".to_string(),
        });
    }
    Ok(tenor)
}

/// Parse a bond return cell: an optionally signed decimal number, finite after 1 + g
fn parse_return(cell: &str, row: usize, column: usize) -> Result<f64, LoadError> {
    let digits = cell.strip_prefix(['+', '-']).unwrap_or(cell);
    let mut period_found = false;
    let well_formed = !digits.is_empty()
        && digits.bytes().all(|b| {
            if b == b'.' {
                if period_found {
                    return false;
                }
                period_found = true;
                return true;
            }
            b.is_ascii_digit()
        });
    if !well_formed {
        return Err(LoadError::BadReturn {
            row,
            column,
            reason: "bond return must be a number".to_string(),
        });
    }

    let value: f64 = cell.parse().map_err(|_| LoadError::BadReturn {
        row,
        column,
        reason: "bond return must be a number".to_string(),
    })?;
    if !(1.0 + value).is_finite() {
        return Err(LoadError::BadReturn {
            row,
            column,
            reason: "bond return is too large".to_string(),
        });
    }
    Ok(value)
}
