//! Bond Ladder Optimiser CLI
//!
//! Interactive session: load a bond return data file, choose how many of the
//! top cumulative returns to rank, and optionally export the results as CSV.

use bond_ladder::cli;
use bond_ladder::optimiser::{count_sequences, LadderOptimiser, OptimalResults};
use bond_ladder::output::{export_results, format_percentage, render_short};
use bond_ladder::returns::loader::expand_user_path;
use bond_ladder::returns::{load_return_csv, ReturnMatrix};
use std::error::Error;
use std::process::ExitCode;
use std::time::Instant;

/// Above this many requested results, warn before grinding on
const SOFT_K_LIMIT: usize = 1_000_000;

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", cli::error_text(&format!("Error: {err}")));
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    println!();

    let Some(matrix) = prompt_for_matrix() else {
        return Ok(());
    };
    println!();

    let Some(k) = cli::prompt_validated::<usize, _>(
        "Enter how many of the top results you would like; OR press ENTER to quit:",
        cli::is_positive_integer,
        "Entry must be a positive integer",
    ) else {
        return Ok(());
    };
    if k > SOFT_K_LIMIT {
        cli::wrapped_println(&format!(
            "NOTE: ranking {k} results may take a long time and a lot of memory."
        ));
    }
    println!();

    let count = count_sequences(matrix.tenors(), matrix.num_months());
    println!("Total distinct action sequences: {count}");
    println!();

    let start = Instant::now();
    let results = LadderOptimiser::with_top_k(k).optimise(&matrix)?;
    let elapsed = start.elapsed();

    if results.len() == 1 {
        println!("{}", cli::heading("Optimal cumulative return and action sequence:"));
    } else {
        println!(
            "{}",
            cli::heading(&format!(
                "Top {} cumulative returns and action sequences:",
                results.len()
            ))
        );
    }
    for (rank, (crf, path)) in results.crfs.iter().zip(&results.paths).enumerate() {
        println!();
        println!("{}. {} ({})", rank + 1, format_percentage(*crf), render_short(path));
        for action in path {
            println!("   {action}");
        }
    }
    if results.len() < k {
        println!();
        cli::wrapped_println(&format!(
            "NOTE: {} results requested, but only {} solution{} exist",
            k,
            results.len(),
            if results.len() == 1 { "" } else { "s" },
        ));
    }

    println!();
    println!(
        "Elapsed time: {:.6} milliseconds",
        1000.0 * elapsed.as_secs_f64()
    );
    println!();

    prompt_for_export(&results);
    Ok(())
}

/// Loop until a bond return file loads, the user asks for help, or escapes
fn prompt_for_matrix() -> Option<ReturnMatrix> {
    loop {
        let entry = cli::prompt_line(
            "Enter the path to your bond return data file (e.g. bond_data.csv or txt);\n\
             OR enter 'h' to show file help;\n\
             OR press ENTER to quit:",
        )?;

        if entry.eq_ignore_ascii_case("h") {
            cli::print_file_help();
            println!();
            continue;
        }

        match load_return_csv(&entry) {
            Ok(matrix) => return Some(matrix),
            Err(err) => {
                eprintln!("{}", cli::error_text(&format!("Failed to load data: {err}")));
                println!();
            }
        }
    }
}

/// Offer CSV export until it succeeds or the user declines.
///
/// Failures are reprompted; the ranked results are already on the terminal,
/// so escaping here simply keeps that as the output.
fn prompt_for_export(results: &OptimalResults) {
    loop {
        let Some(entry) = cli::prompt_line(
            "Enter a directory to save the results as CSV (e.g. . for the current directory);\n\
             OR press ENTER to finish:",
        ) else {
            return;
        };

        let dir = match expand_user_path(&entry) {
            Ok(dir) => dir,
            Err(err) => {
                eprintln!("{}", cli::error_text(&format!("Cannot save there: {err}")));
                println!();
                continue;
            }
        };

        match export_results(&dir, results) {
            Ok(path) => {
                println!("Results written to {}", path.display());
                return;
            }
            Err(err) => {
                eprintln!("{}", cli::error_text(&format!("Cannot save there: {err}")));
                println!();
            }
        }
    }
}
