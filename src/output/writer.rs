//! Persist ranked results as CSV with a collision-free filename

use super::render::{format_percentage, render_short};
use crate::optimiser::OptimalResults;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Base name for exported results; suffixes _2, _3, ... avoid collisions
pub const RESULTS_BASENAME: &str = "bond_results";

/// How many numbered filenames to try before giving up
const MAX_FILENAME_ATTEMPTS: usize = 10_000;

/// Errors raised while exporting results.
///
/// All recoverable at the prompt: the user picks another directory or falls
/// back to the terminal output already shown.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("{0} does not exist")]
    MissingDirectory(String),

    #[error("{0} is not a directory")]
    NotADirectory(String),

    #[error("cannot access {path}: {source}")]
    DirectoryInaccessible {
        path: String,
        source: std::io::Error,
    },

    #[error("no free filename: {base}.csv through {base}_{max}.csv all exist in {dir}")]
    FilenameExhaustion {
        dir: String,
        base: &'static str,
        max: usize,
    },

    #[error("cannot write {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

/// Check that `dir` exists and is a directory
pub fn assert_directory_valid(dir: &Path) -> Result<(), WriteError> {
    let display = dir.display().to_string();
    match std::fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(WriteError::NotADirectory(display)),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(WriteError::MissingDirectory(display))
        }
        Err(source) => Err(WriteError::DirectoryInaccessible {
            path: display,
            source,
        }),
    }
}

/// First unused results filename in `dir`: `bond_results.csv`, then
/// `bond_results_2.csv`, `bond_results_3.csv`, ... capped at 10 000.
pub fn unique_results_path(dir: &Path) -> Result<PathBuf, WriteError> {
    assert_directory_valid(dir)?;

    for attempt in 1..=MAX_FILENAME_ATTEMPTS {
        let name = if attempt == 1 {
            format!("{RESULTS_BASENAME}.csv")
        } else {
            format!("{RESULTS_BASENAME}_{attempt}.csv")
        };
        let candidate = dir.join(name);
        if !candidate.exists() {
            return Ok(candidate);
        }
    }

    Err(WriteError::FilenameExhaustion {
        dir: dir.display().to_string(),
        base: RESULTS_BASENAME,
        max: MAX_FILENAME_ATTEMPTS,
    })
}

/// Write one CSV record per rank: `rank, "x.xx%", "<short-form actions>"`
pub fn write_results_csv(path: &Path, results: &OptimalResults) -> Result<(), WriteError> {
    let display = path.display().to_string();
    let mut writer = csv::Writer::from_path(path).map_err(|source| WriteError::Csv {
        path: display.clone(),
        source,
    })?;

    writer
        .write_record(["Rank", "Return", "Actions"])
        .and_then(|_| {
            for (rank, (crf, actions)) in results.crfs.iter().zip(&results.paths).enumerate() {
                writer.write_record([
                    (rank + 1).to_string(),
                    format_percentage(*crf),
                    render_short(actions),
                ])?;
            }
            writer.flush().map_err(csv::Error::from)
        })
        .map_err(|source| WriteError::Csv {
            path: display,
            source,
        })
}

/// Pick a unique filename in `dir`, write the results there, and return the
/// path actually used
pub fn export_results(dir: &Path, results: &OptimalResults) -> Result<PathBuf, WriteError> {
    let path = unique_results_path(dir)?;
    write_results_csv(&path, results)?;
    log::debug!("wrote {} ranked results to {}", results.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;

    fn sample_results() -> OptimalResults {
        OptimalResults {
            crfs: vec![1.041, 1.0],
            paths: vec![
                vec![Action::buy(0, 6), Action::buy(6, 3), Action::buy(9, 3)],
                vec![Action::wait(0, 12)],
            ],
        }
    }

    #[test]
    fn test_directory_validation() {
        let dir = tempfile::tempdir().unwrap();
        assert!(assert_directory_valid(dir.path()).is_ok());

        assert!(matches!(
            assert_directory_valid(Path::new("/definitely/missing/dir")).unwrap_err(),
            WriteError::MissingDirectory(_)
        ));

        let file_path = dir.path().join("plain.txt");
        std::fs::write(&file_path, "x").unwrap();
        assert!(matches!(
            assert_directory_valid(&file_path).unwrap_err(),
            WriteError::NotADirectory(_)
        ));
    }

    #[test]
    fn test_unique_names_count_upwards() {
        let dir = tempfile::tempdir().unwrap();

        let first = unique_results_path(dir.path()).unwrap();
        assert_eq!(first, dir.path().join("bond_results.csv"));
        std::fs::write(&first, "").unwrap();

        let second = unique_results_path(dir.path()).unwrap();
        assert_eq!(second, dir.path().join("bond_results_2.csv"));
        std::fs::write(&second, "").unwrap();

        let third = unique_results_path(dir.path()).unwrap();
        assert_eq!(third, dir.path().join("bond_results_3.csv"));
    }

    #[test]
    fn test_csv_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_results(dir.path(), &sample_results()).unwrap();

        let contents = std::fs::read_to_string(path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("Rank,Return,Actions"));
        assert_eq!(lines.next(), Some("1,4.10%,\"b6,b3,b3\""));
        assert_eq!(lines.next(), Some("2,0.00%,w12"));
    }
}
