//! Help and notice text for the interactive session

use super::style::{heading, print_rule, wrapped_println};

/// Print an example of the bond data file contents
fn print_example_csv() {
    println!("Tenor, 0, 1, 2, ...");
    println!("3, 0.03197, 0.03225, 0.03179, ...");
    println!("6, 0.06517, 0.06606, 0.06554, ...");
    println!("...");
}

/// Print how the file looks when opened in spreadsheet software
fn print_example_table() {
    println!("  Tenor  |    0    |    1    |    2    |  ...   ");
    println!("---------+---------+---------+---------+--------");
    println!("    3    | 0.03197 | 0.03225 | 0.03179 |  ...   ");
    println!("---------+---------+---------+---------+--------");
    println!("    6    | 0.06517 | 0.06606 | 0.06554 |  ...   ");
    println!("---------+---------+---------+---------+--------");
    println!("   ...   |         |         |         |        ");
}

/// Print the full description of the required bond data file format
pub fn print_file_help() {
    println!();
    print_rule();
    println!("{}", heading("FILE HELP"));
    print_rule();
    println!();
    wrapped_println(
        "Bond return data should be provided as a CSV file (a .csv or .txt extension is required).",
    );
    println!();
    wrapped_println(
        "The first row should have as its first value the word \"Tenor\", followed by a \
         consecutive list of months starting at 0.",
    );
    println!();
    wrapped_println(
        "Subsequent rows should begin with the tenor, and then list the return should a bond of \
         that tenor be purchased in the month of the corresponding column.",
    );
    println!();
    println!("For example, the CSV file should resemble:");
    println!();
    print_example_csv();
    println!();
    println!("(spaces are optional, and blank rows will be ignored).");
    println!();
    wrapped_println("If opened in spreadsheet software such as Excel, the data should resemble:");
    println!();
    print_example_table();
    println!();
    wrapped_println(
        "but, if editing in such software, ensure that the file remains saved as .csv or .txt.",
    );
    println!();
    print_rule();
}
