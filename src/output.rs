use serde::Serialize;
use std::error::Error;
use std::fs;
use tabled::{settings::Style, Table, Tabled};

pub const TABLES_DIR: &str = "outputs/tables";
pub const FIGURES_DIR: &str = "outputs/figures";
pub const CLEANING_DIR: &str = "outputs/cleaning";

/// Create the output directory tree. `create_dir_all` is idempotent, so this
/// is safe to call before every run.
pub fn ensure_output_dirs() -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(TABLES_DIR)?;
    fs::create_dir_all(FIGURES_DIR)?;
    fs::create_dir_all(CLEANING_DIR)?;
    Ok(())
}

pub fn write_csv<T: Serialize>(path: &str, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Print the first `max_rows` rows of a generated table as Markdown, the
/// same preview the reports show before pointing at the exported file.
pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}
