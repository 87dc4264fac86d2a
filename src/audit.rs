// Quality auditor.
//
// Read-only diagnostics over the raw dataset. Every scan is a pure function
// over `&[RawReview]`; the `run` driver persists each scan's artifacts and
// keeps going when a single table or chart fails to write, so one bad scan
// never silences the rest.
use crate::charts;
use crate::output::{self, FIGURES_DIR, TABLES_DIR};
use crate::types::{
    HelpfulnessStatRow, MedianByRatingRow, MissingSummaryRow, MonthlyCountRow, RatingCountRow,
    RatingPercentRow, RawReview,
};
use crate::util::{
    format_int, histogram, mean, median, parse_datetime_safe, parse_f64_safe, parse_i64_safe,
    percentile, std_sample,
};
use chrono::{Datelike, NaiveDateTime};
use std::collections::{BTreeMap, HashSet};

const HISTOGRAM_BINS: usize = 50;

#[derive(Debug, Clone)]
pub struct DuplicateCounts {
    /// Rows whose reviewId was already seen on an earlier row.
    pub duplicate_review_ids: usize,
    /// Rows whose exact raw body text was already seen on an earlier row.
    pub duplicate_contents: usize,
}

#[derive(Debug, Clone)]
pub struct TemporalReport {
    pub invalid_dates: usize,
    pub earliest: Option<NaiveDateTime>,
    pub latest: Option<NaiveDateTime>,
    pub monthly: Vec<MonthlyCountRow>,
}

/// Per-column null counts and percentages, sorted descending by count.
pub fn missing_values_summary(raw: &[RawReview]) -> Vec<MissingSummaryRow> {
    let total = raw.len();
    let columns: [(&str, usize); 8] = [
        (
            "reviewId",
            raw.iter().filter(|r| r.review_id.is_none()).count(),
        ),
        (
            "userName",
            raw.iter().filter(|r| r.user_name.is_none()).count(),
        ),
        ("content", raw.iter().filter(|r| r.content.is_none()).count()),
        ("score", raw.iter().filter(|r| r.score.is_none()).count()),
        (
            "thumbsUpCount",
            raw.iter().filter(|r| r.thumbs_up_count.is_none()).count(),
        ),
        (
            "reviewCreatedVersion",
            raw.iter()
                .filter(|r| r.review_created_version.is_none())
                .count(),
        ),
        ("at", raw.iter().filter(|r| r.at.is_none()).count()),
        (
            "appVersion",
            raw.iter().filter(|r| r.app_version.is_none()).count(),
        ),
    ];
    let mut rows: Vec<MissingSummaryRow> = columns
        .iter()
        .map(|(name, missing)| {
            let pct = if total == 0 {
                0.0
            } else {
                (*missing as f64 / total as f64) * 100.0
            };
            MissingSummaryRow {
                column: name.to_string(),
                missing_count: *missing,
                missing_percent: format!("{:.2}", pct),
            }
        })
        .collect();
    rows.sort_by(|a, b| b.missing_count.cmp(&a.missing_count));
    rows
}

/// Count rows that repeat an earlier reviewId, and rows that repeat an
/// earlier exact body string. Two independent measurements on the raw data;
/// no dedup happens here. Absent values compare equal to each other, so a
/// second missing body counts as a duplicate of the first.
pub fn duplicate_counts(raw: &[RawReview]) -> DuplicateCounts {
    let mut seen_ids: HashSet<Option<&str>> = HashSet::new();
    let mut seen_bodies: HashSet<Option<&str>> = HashSet::new();
    let mut duplicate_review_ids = 0usize;
    let mut duplicate_contents = 0usize;
    for r in raw {
        if !seen_ids.insert(r.review_id.as_deref()) {
            duplicate_review_ids += 1;
        }
        if !seen_bodies.insert(r.content.as_deref()) {
            duplicate_contents += 1;
        }
    }
    DuplicateCounts {
        duplicate_review_ids,
        duplicate_contents,
    }
}

/// Count and percentage of rows per parseable rating value, ascending.
///
/// Unparseable ratings are excluded from the counts but stay in the
/// percentage denominator (the whole dataset), matching the raw-data view.
pub fn rating_distribution(raw: &[RawReview]) -> (Vec<RatingCountRow>, Vec<RatingPercentRow>) {
    let total = raw.len();
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for r in raw {
        if let Some(score) = parse_i64_safe(r.score.as_deref()) {
            *counts.entry(score).or_insert(0) += 1;
        }
    }
    let count_rows: Vec<RatingCountRow> = counts
        .iter()
        .map(|(rating, count)| RatingCountRow {
            rating: *rating,
            count: *count,
        })
        .collect();
    let percent_rows: Vec<RatingPercentRow> = counts
        .iter()
        .map(|(rating, count)| {
            let pct = if total == 0 {
                0.0
            } else {
                (*count as f64 / total as f64) * 100.0
            };
            RatingPercentRow {
                rating: *rating,
                percent: format!("{:.2}", pct),
            }
        })
        .collect();
    (count_rows, percent_rows)
}

/// All parseable helpfulness values, for the stats table and the histogram.
pub fn helpfulness_values(raw: &[RawReview]) -> Vec<f64> {
    raw.iter()
        .filter_map(|r| parse_f64_safe(r.thumbs_up_count.as_deref()))
        .collect()
}

/// Describe-style summary of the helpfulness column: count, mean, sample
/// std, min, quartiles, max. An empty column yields an empty table instead
/// of failing the audit.
pub fn helpfulness_stats(values: &[f64]) -> Vec<HelpfulnessStatRow> {
    if values.is_empty() {
        return Vec::new();
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let stat = |name: &str, value: String| HelpfulnessStatRow {
        statistic: name.to_string(),
        value,
    };
    vec![
        stat("count", format!("{}", values.len())),
        stat("mean", format!("{:.2}", mean(values))),
        stat("std", format!("{:.2}", std_sample(values))),
        stat("min", format!("{:.2}", sorted[0])),
        stat("25%", format!("{:.2}", percentile(&sorted, 25.0))),
        stat("50%", format!("{:.2}", percentile(&sorted, 50.0))),
        stat("75%", format!("{:.2}", percentile(&sorted, 75.0))),
        stat("max", format!("{:.2}", sorted[sorted.len() - 1])),
    ]
}

/// Median helpfulness per rating value, ascending by rating. Median rather
/// than mean: a handful of viral reviews would dominate the mean.
pub fn median_helpfulness_by_rating(raw: &[RawReview]) -> Vec<MedianByRatingRow> {
    let mut groups: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for r in raw {
        if let (Some(score), Some(thumbs)) = (
            parse_i64_safe(r.score.as_deref()),
            parse_f64_safe(r.thumbs_up_count.as_deref()),
        ) {
            groups.entry(score).or_default().push(thumbs);
        }
    }
    groups
        .into_iter()
        .map(|(rating, thumbs)| MedianByRatingRow {
            rating,
            median_thumbs_up: format!("{:.1}", median(thumbs)),
        })
        .collect()
}

/// Permissive temporal scan: unparseable timestamps are counted and left
/// out of the month buckets, never dropped from the dataset.
pub fn temporal_scan(raw: &[RawReview]) -> TemporalReport {
    let mut invalid_dates = 0usize;
    let mut earliest: Option<NaiveDateTime> = None;
    let mut latest: Option<NaiveDateTime> = None;
    let mut buckets: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    for r in raw {
        match parse_datetime_safe(r.at.as_deref()) {
            None => invalid_dates += 1,
            Some(dt) => {
                earliest = Some(earliest.map_or(dt, |e| e.min(dt)));
                latest = Some(latest.map_or(dt, |l| l.max(dt)));
                *buckets.entry((dt.year(), dt.month())).or_insert(0) += 1;
            }
        }
    }
    let monthly = buckets
        .into_iter()
        .map(|((year, month), reviews)| MonthlyCountRow {
            month: format!("{:04}-{:02}", year, month),
            reviews,
        })
        .collect();
    TemporalReport {
        invalid_dates,
        earliest,
        latest,
        monthly,
    }
}

fn write_table<T: serde::Serialize>(path: &str, rows: &[T]) {
    if let Err(e) = output::write_csv(path, rows) {
        eprintln!("Write error ({}): {}", path, e);
    }
}

/// Run all six scans and persist their tables and charts.
pub fn run(raw: &[RawReview]) {
    // Missing values
    let missing = missing_values_summary(raw);
    let missing_path = format!("{}/missing_values_summary.csv", TABLES_DIR);
    write_table(&missing_path, &missing);
    println!("MISSING VALUES SUMMARY");
    output::preview_table_rows(&missing, 8);
    println!("(Full table exported to {})\n", missing_path);

    // Duplicates (console only; two independent measurements)
    let dups = duplicate_counts(raw);
    println!(
        "Duplicate reviewId count: {}",
        format_int(dups.duplicate_review_ids as i64)
    );
    println!(
        "Duplicate review text (content) count: {}\n",
        format_int(dups.duplicate_contents as i64)
    );

    // Rating distribution
    let (rating_counts, rating_percents) = rating_distribution(raw);
    write_table(&format!("{}/rating_counts.csv", TABLES_DIR), &rating_counts);
    write_table(
        &format!("{}/rating_percentages.csv", TABLES_DIR),
        &rating_percents,
    );
    println!("RATING COUNTS");
    output::preview_table_rows(&rating_counts, 10);
    println!("RATING PERCENTAGES");
    output::preview_table_rows(&rating_percents, 10);
    let bar_data: Vec<(String, usize)> = rating_counts
        .iter()
        .map(|r| (r.rating.to_string(), r.count))
        .collect();
    let rating_chart = format!("{}/rating_distribution.png", FIGURES_DIR);
    if let Err(e) = charts::bar_chart(
        &rating_chart,
        "Distribution of Review Ratings (1-5)",
        "Rating Score",
        "Number of Reviews",
        &bar_data,
    ) {
        eprintln!("Chart error ({}): {}", rating_chart, e);
    }

    // Helpfulness distribution
    let thumbs = helpfulness_values(raw);
    let stats = helpfulness_stats(&thumbs);
    write_table(&format!("{}/thumbs_up_stats.csv", TABLES_DIR), &stats);
    println!("THUMBS-UP BASIC STATISTICS");
    output::preview_table_rows(&stats, 8);
    let bins = histogram(&thumbs, HISTOGRAM_BINS);
    let thumbs_chart = format!("{}/thumbs_up_distribution.png", FIGURES_DIR);
    if let Err(e) = charts::histogram_chart(
        &thumbs_chart,
        "Distribution of Thumbs-Up Counts",
        "thumbsUpCount",
        "Frequency",
        &bins,
    ) {
        eprintln!("Chart error ({}): {}", thumbs_chart, e);
    }

    // Median helpfulness by rating
    let by_rating = median_helpfulness_by_rating(raw);
    write_table(
        &format!("{}/thumbs_up_median_by_rating.csv", TABLES_DIR),
        &by_rating,
    );
    println!("MEDIAN THUMBS-UP BY RATING");
    output::preview_table_rows(&by_rating, 10);

    // Temporal coverage
    let temporal = temporal_scan(raw);
    println!(
        "Invalid / unparseable dates: {}",
        format_int(temporal.invalid_dates as i64)
    );
    println!(
        "Earliest review date: {}",
        temporal
            .earliest
            .map(|d| d.to_string())
            .unwrap_or_else(|| "n/a".to_string())
    );
    println!(
        "Latest review date: {}\n",
        temporal
            .latest
            .map(|d| d.to_string())
            .unwrap_or_else(|| "n/a".to_string())
    );
    write_table(
        &format!("{}/reviews_per_month.csv", TABLES_DIR),
        &temporal.monthly,
    );
    println!("REVIEWS PER MONTH");
    output::preview_table_rows(&temporal.monthly, 12);
    let monthly_points: Vec<(String, usize)> = temporal
        .monthly
        .iter()
        .map(|m| (m.month.clone(), m.reviews))
        .collect();
    let monthly_chart = format!("{}/reviews_over_time.png", FIGURES_DIR);
    if let Err(e) = charts::line_chart(
        &monthly_chart,
        "Number of Reviews Over Time (Monthly)",
        "Time",
        "Number of Reviews",
        &monthly_points,
    ) {
        eprintln!("Chart error ({}): {}", monthly_chart, e);
    }
    println!("(Tables exported to {}/)", TABLES_DIR);
    println!("(Figures exported to {}/)\n", FIGURES_DIR);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(
        id: Option<&str>,
        content: Option<&str>,
        score: Option<&str>,
        thumbs: Option<&str>,
        at: Option<&str>,
    ) -> RawReview {
        RawReview {
            review_id: id.map(|s| s.to_string()),
            user_name: None,
            content: content.map(|s| s.to_string()),
            score: score.map(|s| s.to_string()),
            thumbs_up_count: thumbs.map(|s| s.to_string()),
            review_created_version: None,
            at: at.map(|s| s.to_string()),
            app_version: None,
        }
    }

    #[test]
    fn rating_counts_and_percentages() {
        let rows: Vec<RawReview> = ["1", "1", "2", "5", "5", "5"]
            .iter()
            .copied()
            .map(|s| raw(Some("id"), None, Some(s), None, None))
            .collect();
        let (counts, percents) = rating_distribution(&rows);
        let counted: Vec<(i64, usize)> = counts.iter().map(|r| (r.rating, r.count)).collect();
        assert_eq!(counted, vec![(1, 2), (2, 1), (5, 3)]);
        let pcts: Vec<&str> = percents.iter().map(|r| r.percent.as_str()).collect();
        assert_eq!(pcts, vec!["33.33", "16.67", "50.00"]);
    }

    #[test]
    fn unparseable_ratings_stay_in_percentage_denominator() {
        let rows = vec![
            raw(Some("a"), None, Some("5"), None, None),
            raw(Some("b"), None, Some("bad"), None, None),
        ];
        let (counts, percents) = rating_distribution(&rows);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].count, 1);
        assert_eq!(percents[0].percent, "50.00");
    }

    #[test]
    fn missingness_sorted_descending_with_rounded_percent() {
        let rows = vec![
            raw(Some("a"), Some("text"), None, None, None),
            raw(Some("b"), None, None, None, None),
            raw(Some("c"), Some("more"), Some("3"), None, None),
        ];
        let summary = missing_values_summary(&rows);
        assert_eq!(summary.len(), 8);
        // counts never increase down the table
        for pair in summary.windows(2) {
            assert!(pair[0].missing_count >= pair[1].missing_count);
        }
        let content_row = summary.iter().find(|r| r.column == "content").unwrap();
        assert_eq!(content_row.missing_count, 1);
        assert_eq!(content_row.missing_percent, "33.33");
        let id_row = summary.iter().find(|r| r.column == "reviewId").unwrap();
        assert_eq!(id_row.missing_count, 0);
        assert_eq!(id_row.missing_percent, "0.00");
    }

    #[test]
    fn missingness_of_empty_dataset_does_not_divide_by_zero() {
        let summary = missing_values_summary(&[]);
        assert_eq!(summary.len(), 8);
        assert!(summary.iter().all(|r| r.missing_percent == "0.00"));
    }

    #[test]
    fn duplicate_counts_are_independent_measurements() {
        let rows = vec![
            raw(Some("a"), Some("same text"), None, None, None),
            raw(Some("a"), Some("other text"), None, None, None),
            raw(Some("b"), Some("same text"), None, None, None),
            raw(None, None, None, None, None),
            raw(None, None, None, None, None),
        ];
        let dups = duplicate_counts(&rows);
        // second "a" plus second missing id
        assert_eq!(dups.duplicate_review_ids, 2);
        // second "same text" plus second missing body
        assert_eq!(dups.duplicate_contents, 2);
    }

    #[test]
    fn helpfulness_stats_describe_shape() {
        let values = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        let stats = helpfulness_stats(&values);
        let names: Vec<&str> = stats.iter().map(|s| s.statistic.as_str()).collect();
        assert_eq!(
            names,
            vec!["count", "mean", "std", "min", "25%", "50%", "75%", "max"]
        );
        assert_eq!(stats[0].value, "5");
        assert_eq!(stats[1].value, "2.00");
        assert_eq!(stats[4].value, "1.00");
        assert_eq!(stats[7].value, "4.00");
    }

    #[test]
    fn helpfulness_stats_empty_column_degrades() {
        assert!(helpfulness_stats(&[]).is_empty());
    }

    #[test]
    fn median_helpfulness_groups_by_rating() {
        let rows = vec![
            raw(Some("a"), None, Some("1"), Some("0"), None),
            raw(Some("b"), None, Some("1"), Some("10"), None),
            raw(Some("c"), None, Some("5"), Some("3"), None),
            raw(Some("d"), None, Some("bad"), Some("99"), None),
        ];
        let medians = median_helpfulness_by_rating(&rows);
        assert_eq!(medians.len(), 2);
        assert_eq!(medians[0].rating, 1);
        assert_eq!(medians[0].median_thumbs_up, "5.0");
        assert_eq!(medians[1].rating, 5);
        assert_eq!(medians[1].median_thumbs_up, "3.0");
    }

    #[test]
    fn temporal_scan_buckets_by_calendar_month() {
        let rows = vec![
            raw(Some("a"), None, None, None, Some("2021-01-15 08:00:00")),
            raw(Some("b"), None, None, None, Some("2021-01-31 23:59:59")),
            raw(Some("c"), None, None, None, Some("2021-02-01 00:00:00")),
            raw(Some("d"), None, None, None, Some("2022-01-05")),
            raw(Some("e"), None, None, None, Some("never")),
            raw(Some("f"), None, None, None, None),
        ];
        let report = temporal_scan(&rows);
        assert_eq!(report.invalid_dates, 2);
        assert_eq!(report.earliest.unwrap().to_string(), "2021-01-15 08:00:00");
        assert_eq!(report.latest.unwrap().to_string(), "2022-01-05 00:00:00");
        let months: Vec<(&str, usize)> = report
            .monthly
            .iter()
            .map(|m| (m.month.as_str(), m.reviews))
            .collect();
        assert_eq!(
            months,
            vec![("2021-01", 2), ("2021-02", 1), ("2022-01", 1)]
        );
    }
}
