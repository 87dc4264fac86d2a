// Cleaning pipeline.
//
// A strictly ordered chain of stages. Every stage takes the previous stage's
// table by value and returns a fresh snapshot plus any drop count; nothing
// mutates a caller's table in place, and no stage ever raises on malformed
// values — bad cells become nulls, bad bodies become drops that get counted.
use crate::loader::LoadReport;
use crate::output::{self, CLEANING_DIR};
use crate::types::{
    CleanedRow, CleaningSummary, NormalizedReview, RawReview, Review, CLEANED_COLUMN_COUNT,
};
use crate::util::{collapse_whitespace, format_int, parse_datetime_safe, parse_i64_safe};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::error::Error;

pub const CLEANED_DATASET_PATH: &str = "amazon_reviews_cleaned.csv";

/// Fill-in for missing categorical fields (user name, version columns).
pub const UNKNOWN_SENTINEL: &str = "Unknown";

/// Textual stand-ins for "no content" that are not true nulls. A trimmed,
/// case-folded body equal to one of these is treated as missing.
static PLACEHOLDER_TOKENS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["nan", "none", "null"].into_iter().collect());

/// Substrings whose case-insensitive presence sets the link flag.
const LINK_MARKERS: &[&str] = &["http://", "https://", "www."];

/// Stage 1 — type coercion.
///
/// Ratings and helpfulness counts become integers, timestamps become parsed
/// datetimes; anything unparseable is `None`. Row count is preserved.
pub fn coerce_types(raw: &[RawReview]) -> Vec<Review> {
    raw.iter()
        .map(|r| Review {
            review_id: r.review_id.clone().unwrap_or_default(),
            user_name: r.user_name.clone(),
            content: r.content.clone(),
            score: parse_i64_safe(r.score.as_deref()),
            thumbs_up: parse_i64_safe(r.thumbs_up_count.as_deref()),
            at_parsed: parse_datetime_safe(r.at.as_deref()),
            review_created_version: r.review_created_version.clone(),
            app_version: r.app_version.clone(),
        })
        .collect()
}

/// Stage 2 — drop rows with a missing, blank, or placeholder review body.
///
/// Returns the surviving rows and the number dropped.
pub fn drop_missing_content(rows: Vec<Review>) -> (Vec<Review>, usize) {
    let before = rows.len();
    let kept: Vec<Review> = rows
        .into_iter()
        .filter(|r| match r.content.as_deref() {
            None => false,
            Some(c) => {
                let trimmed = c.trim();
                !trimmed.is_empty() && !PLACEHOLDER_TOKENS.contains(trimmed.to_lowercase().as_str())
            }
        })
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

/// Stage 3 — backfill missing categoricals with the "Unknown" sentinel.
/// Never drops a row.
pub fn fill_missing_categoricals(rows: Vec<Review>) -> Vec<Review> {
    rows.into_iter()
        .map(|mut r| {
            if r.user_name.is_none() {
                r.user_name = Some(UNKNOWN_SENTINEL.to_string());
            }
            if r.review_created_version.is_none() {
                r.review_created_version = Some(UNKNOWN_SENTINEL.to_string());
            }
            if r.app_version.is_none() {
                r.app_version = Some(UNKNOWN_SENTINEL.to_string());
            }
            r
        })
        .collect()
}

/// Stage 4 — resolve duplicate identifiers, keeping the latest review.
///
/// Rows are stable-sorted by parsed timestamp ascending; `Option`'s total
/// order places unparsed (`None`) timestamps before every parsed one, so a
/// null-dated duplicate never outlives a dated one, and among duplicates
/// that are all null-dated the last input occurrence survives.
pub fn dedup_by_review_id(rows: Vec<Review>) -> (Vec<Review>, usize) {
    let before = rows.len();
    let mut sorted = rows;
    sorted.sort_by_key(|r| r.at_parsed);

    let mut last_index: HashMap<String, usize> = HashMap::new();
    for (i, r) in sorted.iter().enumerate() {
        last_index.insert(r.review_id.clone(), i);
    }
    let kept: Vec<Review> = sorted
        .into_iter()
        .enumerate()
        .filter(|(i, r)| last_index.get(&r.review_id).copied() == Some(*i))
        .map(|(_, r)| r)
        .collect();
    let removed = before - kept.len();
    (kept, removed)
}

/// Stage 5 — whitespace normalization of the review body.
///
/// Trims and collapses whitespace runs into single spaces; no case folding,
/// no punctuation changes. Rows whose body collapses to nothing are dropped
/// (rare: stage 2 already removed blank bodies) and counted.
pub fn normalize_content(rows: Vec<Review>) -> (Vec<NormalizedReview>, usize) {
    let before = rows.len();
    let kept: Vec<NormalizedReview> = rows
        .into_iter()
        .filter_map(|r| {
            let content_clean = collapse_whitespace(r.content.as_deref().unwrap_or(""));
            if content_clean.is_empty() {
                None
            } else {
                Some(NormalizedReview {
                    review: r,
                    content_clean,
                })
            }
        })
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

/// Stage 6 — derived feature computation. Never drops a row.
///
/// Character length counts Unicode scalars of the normalized body, word
/// count splits it on whitespace, and the link flag records whether it
/// contains a URL marker, case-insensitively.
pub fn derive_features(rows: Vec<NormalizedReview>) -> Vec<CleanedRow> {
    rows.into_iter()
        .map(|n| {
            let lower = n.content_clean.to_lowercase();
            let has_link = LINK_MARKERS.iter().any(|m| lower.contains(m)) as u8;
            let r = n.review;
            CleanedRow {
                review_id: r.review_id,
                user_name: r
                    .user_name
                    .unwrap_or_else(|| UNKNOWN_SENTINEL.to_string()),
                score: r.score.map(|v| v.to_string()).unwrap_or_default(),
                thumbs_up: r.thumbs_up.map(|v| v.to_string()).unwrap_or_default(),
                at_parsed: r
                    .at_parsed
                    .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_default(),
                review_created_version: r
                    .review_created_version
                    .unwrap_or_else(|| UNKNOWN_SENTINEL.to_string()),
                app_version: r
                    .app_version
                    .unwrap_or_else(|| UNKNOWN_SENTINEL.to_string()),
                content: r.content.unwrap_or_default(),
                review_len_chars: n.content_clean.chars().count(),
                review_len_words: n.content_clean.split_whitespace().count(),
                has_link,
                content_clean: n.content_clean,
            }
        })
        .collect()
}

/// Run the whole pipeline over the raw table and persist the artifacts
/// (stage 7): the 12-column cleaned dataset plus a one-record summary whose
/// original row count is the one captured at load time.
pub fn run(raw: &[RawReview], load: &LoadReport) -> Result<CleaningSummary, Box<dyn Error>> {
    let rows_original = load.total_rows;

    // Stage 1: coercion diagnostics mirror the audit's parse failures.
    let typed = coerce_types(raw);
    let invalid_dates = typed.iter().filter(|r| r.at_parsed.is_none()).count();
    let invalid_scores = typed.iter().filter(|r| r.score.is_none()).count();
    let invalid_thumbs = typed.iter().filter(|r| r.thumbs_up.is_none()).count();
    println!("Rows loaded: {}", format_int(rows_original as i64));
    println!("Invalid dates: {}", format_int(invalid_dates as i64));
    println!("Invalid scores: {}", format_int(invalid_scores as i64));
    println!(
        "Invalid thumbsUpCount: {}",
        format_int(invalid_thumbs as i64)
    );

    let (kept, dropped_content) = drop_missing_content(typed);
    println!(
        "Rows dropped due to missing content: {}",
        format_int(dropped_content as i64)
    );
    println!("Rows after missing-value handling: {}", format_int(kept.len() as i64));

    let filled = fill_missing_categoricals(kept);

    let (deduped, removed_duplicates) = dedup_by_review_id(filled);
    println!(
        "Duplicate reviewId removed: {}",
        format_int(removed_duplicates as i64)
    );
    println!("Rows after deduplication: {}", format_int(deduped.len() as i64));

    let (normalized, dropped_after_clean) = normalize_content(deduped);
    println!(
        "Rows dropped after text normalization: {}",
        format_int(dropped_after_clean as i64)
    );

    let cleaned = derive_features(normalized);
    println!("Final rows: {}", format_int(cleaned.len() as i64));
    println!("");

    output::write_csv(CLEANED_DATASET_PATH, &cleaned)?;

    let summary = CleaningSummary {
        rows_original,
        rows_after_cleaning: cleaned.len(),
        rows_removed_total: rows_original - cleaned.len(),
        final_columns: CLEANED_COLUMN_COUNT,
    };
    let summary_path = format!("{}/cleaning_summary.json", CLEANING_DIR);
    output::write_json(&summary_path, &summary)?;

    output::preview_table_rows(&cleaned, 3);
    println!("(Cleaned dataset exported to {})", CLEANED_DATASET_PATH);
    println!("(Cleaning summary exported to {})\n", summary_path);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str, content: Option<&str>, score: Option<&str>, at: Option<&str>) -> RawReview {
        RawReview {
            review_id: Some(id.to_string()),
            user_name: None,
            content: content.map(|s| s.to_string()),
            score: score.map(|s| s.to_string()),
            thumbs_up_count: None,
            review_created_version: None,
            at: at.map(|s| s.to_string()),
            app_version: None,
        }
    }

    fn clean_all(rows: &[RawReview]) -> Vec<CleanedRow> {
        let typed = coerce_types(rows);
        let (kept, _) = drop_missing_content(typed);
        let filled = fill_missing_categoricals(kept);
        let (deduped, _) = dedup_by_review_id(filled);
        let (normalized, _) = normalize_content(deduped);
        derive_features(normalized)
    }

    #[test]
    fn normalizes_body_and_derives_features() {
        let rows = vec![raw("R1", Some(" Great   app!! \n"), Some("5"), None)];
        let cleaned = clean_all(&rows);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].content_clean, "Great app!!");
        assert_eq!(cleaned[0].review_len_chars, 11);
        assert_eq!(cleaned[0].review_len_words, 2);
        assert_eq!(cleaned[0].has_link, 0);
        assert_eq!(cleaned[0].score, "5");
        // original body is carried unchanged
        assert_eq!(cleaned[0].content, " Great   app!! \n");
    }

    #[test]
    fn drops_placeholder_and_blank_bodies() {
        let rows = vec![
            raw("R1", Some("nan"), None, None),
            raw("R2", Some("  NULL "), None, None),
            raw("R3", Some("None"), None, None),
            raw("R4", Some("   "), None, None),
            raw("R5", None, None, None),
            raw("R6", Some("keep me"), None, None),
        ];
        let typed = coerce_types(&rows);
        let (kept, dropped) = drop_missing_content(typed);
        assert_eq!(dropped, 5);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].review_id, "R6");
    }

    #[test]
    fn cleaned_bodies_are_never_empty_or_placeholder() {
        let rows = vec![
            raw("R1", Some("nan"), None, None),
            raw("R2", Some("fine"), None, None),
            raw("R3", Some(" ok \t then "), None, None),
        ];
        for row in clean_all(&rows) {
            assert!(!row.content_clean.is_empty());
            let folded = row.content_clean.to_lowercase();
            assert!(!["nan", "none", "null"].contains(&folded.as_str()));
        }
    }

    #[test]
    fn dedup_keeps_chronologically_latest() {
        let rows = vec![
            raw("R3", Some("early"), None, Some("2021-01-01")),
            raw("R3", Some("late"), None, Some("2021-06-01")),
        ];
        let cleaned = clean_all(&rows);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].content, "late");
        assert_eq!(cleaned[0].at_parsed, "2021-06-01 00:00:00");
    }

    #[test]
    fn dedup_order_of_input_does_not_matter() {
        let rows = vec![
            raw("R3", Some("late"), None, Some("2021-06-01")),
            raw("R3", Some("early"), None, Some("2021-01-01")),
        ];
        let cleaned = clean_all(&rows);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].content, "late");
    }

    #[test]
    fn null_dated_duplicate_loses_to_dated_one() {
        let rows = vec![
            raw("R9", Some("dated"), None, Some("2020-03-05")),
            raw("R9", Some("undated"), None, Some("not a date")),
        ];
        let cleaned = clean_all(&rows);
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].content, "dated");
    }

    #[test]
    fn identifiers_unique_after_cleaning() {
        let rows = vec![
            raw("A", Some("one"), None, Some("2021-01-01")),
            raw("A", Some("two"), None, Some("2021-01-02")),
            raw("B", Some("three"), None, Some("2021-01-01")),
            raw("B", Some("four"), None, Some("2021-01-03")),
            raw("C", Some("five"), None, None),
        ];
        let cleaned = clean_all(&rows);
        let mut ids: Vec<&str> = cleaned.iter().map(|r| r.review_id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["A", "B", "C"]);
    }

    #[test]
    fn link_flag_marks_urls_case_insensitively() {
        let rows = vec![
            raw("R1", Some("visit HTTPS://example.com now"), None, None),
            raw("R2", Some("go to WWW.example.com"), None, None),
            raw("R3", Some("see http://x.y"), None, None),
            raw("R4", Some("nothing linked here"), None, None),
        ];
        let flags: Vec<u8> = clean_all(&rows).into_iter().map(|r| r.has_link).collect();
        assert_eq!(flags, vec![1, 1, 1, 0]);
    }

    #[test]
    fn coercion_nulls_bad_values_without_dropping() {
        let rows = vec![raw("R1", Some("ok"), Some("great"), Some("garbage"))];
        let typed = coerce_types(&rows);
        assert_eq!(typed.len(), 1);
        assert_eq!(typed[0].score, None);
        assert_eq!(typed[0].at_parsed, None);
    }

    #[test]
    fn backfill_fills_only_missing_categoricals() {
        let mut row = raw("R1", Some("ok"), None, None);
        row.user_name = Some("alice".to_string());
        let filled = fill_missing_categoricals(coerce_types(&[row]));
        assert_eq!(filled[0].user_name.as_deref(), Some("alice"));
        assert_eq!(filled[0].app_version.as_deref(), Some("Unknown"));
        assert_eq!(
            filled[0].review_created_version.as_deref(),
            Some("Unknown")
        );
    }

    #[test]
    fn row_count_never_increases_across_stages() {
        let rows = vec![
            raw("A", Some("one"), None, Some("2021-01-01")),
            raw("A", Some("two"), None, Some("2021-01-02")),
            raw("B", Some("nan"), None, None),
            raw("C", Some("  "), None, None),
            raw("D", Some("fine"), None, None),
        ];
        let typed = coerce_types(&rows);
        let n1 = typed.len();
        let (kept, _) = drop_missing_content(typed);
        let n2 = kept.len();
        let (deduped, _) = dedup_by_review_id(fill_missing_categoricals(kept));
        let n4 = deduped.len();
        let (normalized, _) = normalize_content(deduped);
        let n5 = normalized.len();
        assert!(n2 <= n1);
        assert!(n4 <= n2);
        assert!(n5 <= n4);
        assert_eq!(derive_features(normalized).len(), n5);
    }
}
