use crate::types::RawReview;
use csv::ReaderBuilder;
use std::error::Error;

/// What happened while reading the raw CSV.
///
/// `total_rows` is captured here, at load time, and flows into the cleaning
/// summary as `rows_original` — the input's size is never hardcoded anywhere.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub skipped_rows: usize,
}

/// Read the raw reviews CSV into memory.
///
/// The only fatal condition is an absent or unreadable file, which surfaces
/// as the `Err` here. Rows the CSV reader cannot deserialize at all (ragged
/// quoting and the like) are skipped and counted; every value-level problem
/// is deferred to the pipeline's coercion stage, which turns it into a null.
pub fn load_raw(path: &str) -> Result<(Vec<RawReview>, LoadReport), Box<dyn Error>> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let mut rows: Vec<RawReview> = Vec::new();
    let mut skipped_rows = 0usize;

    for result in rdr.deserialize::<RawReview>() {
        match result {
            Ok(r) => rows.push(r),
            Err(_) => skipped_rows += 1,
        }
    }

    let report = LoadReport {
        total_rows: rows.len(),
        skipped_rows,
    };
    Ok((rows, report))
}
