// Entry point and high-level CLI flow.
//
// Two batch tasks over the same raw CSV:
// - Option [1] runs the dataset quality audit (read-only scans + charts).
// - Option [2] runs the cleaning pipeline and writes the cleaned dataset.
// - After a task finishes, the user can go back to the selection menu or
//   exit.
//
// The two tasks share no state: each one loads the raw file itself, so the
// audit always sees the untouched input regardless of what the pipeline did.
mod audit;
mod charts;
mod loader;
mod output;
mod pipeline;
mod types;
mod util;

use std::io::{self, Write};

const INPUT_PATH: &str = "amazon_reviews.csv";

/// Read a single line of input after printing the common "Enter choice:" prompt.
///
/// The prompt is reused for both the main menu and simple numeric inputs.
fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask the user whether to go back to the task selection menu after a task
/// finishes.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to Task Selection (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf).ok();
        let resp = buf.trim().to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Load the raw CSV, reporting the only fatal condition: a missing or
/// unreadable input file. Everything else downstream degrades to nulls.
fn load_raw_or_report() -> Option<(Vec<types::RawReview>, loader::LoadReport)> {
    match loader::load_raw(INPUT_PATH) {
        Ok(loaded) => Some(loaded),
        Err(e) => {
            eprintln!("Failed to load {}: {}\n", INPUT_PATH, e);
            None
        }
    }
}

/// Handle option [1]: run the read-only quality audit.
fn handle_audit() {
    if let Err(e) = output::ensure_output_dirs() {
        eprintln!("Failed to create output directories: {}\n", e);
        return;
    }
    let Some((raw, load)) = load_raw_or_report() else {
        return;
    };
    println!(
        "Auditing dataset... ({} rows loaded)",
        util::format_int(load.total_rows as i64)
    );
    if load.skipped_rows > 0 {
        println!(
            "Note: {} rows skipped due to malformed CSV records.",
            util::format_int(load.skipped_rows as i64)
        );
    }
    println!("");
    audit::run(&raw);
}

/// Handle option [2]: run the cleaning pipeline and persist the artifacts.
fn handle_clean() {
    if let Err(e) = output::ensure_output_dirs() {
        eprintln!("Failed to create output directories: {}\n", e);
        return;
    }
    let Some((raw, load)) = load_raw_or_report() else {
        return;
    };
    println!("Cleaning dataset...");
    println!("");
    match pipeline::run(&raw, &load) {
        Ok(summary) => {
            println!(
                "Cleaning complete: {} of {} rows kept ({} removed, {} columns).\n",
                util::format_int(summary.rows_after_cleaning as i64),
                util::format_int(summary.rows_original as i64),
                util::format_int(summary.rows_removed_total as i64),
                summary.final_columns
            );
        }
        Err(e) => {
            eprintln!("Cleaning failed: {}\n", e);
        }
    }
}

fn main() {
    loop {
        println!("Select Task:");
        println!("[1] Run dataset quality audit");
        println!("[2] Run cleaning pipeline\n");
        match read_choice().as_str() {
            "1" => {
                println!("");
                handle_audit();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "2" => {
                println!("");
                handle_clean();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1 or 2.\n");
            }
        }
    }
}
