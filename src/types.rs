use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// One row of `amazon_reviews.csv`, exactly as it arrives.
///
/// Every field is optional text: the export is dirty, and an empty CSV field
/// deserializes to `None`, which is what the missingness scan counts.
#[derive(Debug, Clone, Deserialize)]
pub struct RawReview {
    #[serde(rename = "reviewId")]
    pub review_id: Option<String>,
    #[serde(rename = "userName")]
    pub user_name: Option<String>,
    #[serde(rename = "content")]
    pub content: Option<String>,
    #[serde(rename = "score")]
    pub score: Option<String>,
    #[serde(rename = "thumbsUpCount")]
    pub thumbs_up_count: Option<String>,
    #[serde(rename = "reviewCreatedVersion")]
    pub review_created_version: Option<String>,
    #[serde(rename = "at")]
    pub at: Option<String>,
    #[serde(rename = "appVersion")]
    pub app_version: Option<String>,
}

/// A review after type coercion (pipeline stage 1).
///
/// Numeric and temporal fields that failed to parse are `None`; no row is
/// dropped for a bad value here. Categorical fields stay optional until the
/// backfill stage substitutes the "Unknown" sentinel.
#[derive(Debug, Clone)]
pub struct Review {
    pub review_id: String,
    pub user_name: Option<String>,
    pub content: Option<String>,
    pub score: Option<i64>,
    pub thumbs_up: Option<i64>,
    pub at_parsed: Option<NaiveDateTime>,
    pub review_created_version: Option<String>,
    pub app_version: Option<String>,
}

/// A review that survived body cleaning, paired with its normalized body.
///
/// Invariant: `content_clean` is non-empty and not a placeholder token.
#[derive(Debug, Clone)]
pub struct NormalizedReview {
    pub review: Review,
    pub content_clean: String,
}

/// Final projection written to the cleaned dataset artifact.
///
/// Fields are display-ready so the same struct serves the CSV writer and the
/// console preview; an empty string stands for a value that stayed null.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct CleanedRow {
    #[serde(rename = "reviewId")]
    #[tabled(rename = "reviewId")]
    pub review_id: String,
    #[serde(rename = "userName")]
    #[tabled(rename = "userName")]
    pub user_name: String,
    #[serde(rename = "score")]
    #[tabled(rename = "score")]
    pub score: String,
    #[serde(rename = "thumbsUpCount")]
    #[tabled(rename = "thumbsUpCount")]
    pub thumbs_up: String,
    #[serde(rename = "at_parsed")]
    #[tabled(rename = "at_parsed")]
    pub at_parsed: String,
    #[serde(rename = "reviewCreatedVersion")]
    #[tabled(rename = "reviewCreatedVersion")]
    pub review_created_version: String,
    #[serde(rename = "appVersion")]
    #[tabled(rename = "appVersion")]
    pub app_version: String,
    #[serde(rename = "content")]
    #[tabled(rename = "content")]
    pub content: String,
    #[serde(rename = "content_clean")]
    #[tabled(rename = "content_clean")]
    pub content_clean: String,
    #[serde(rename = "review_len_chars")]
    #[tabled(rename = "review_len_chars")]
    pub review_len_chars: usize,
    #[serde(rename = "review_len_words")]
    #[tabled(rename = "review_len_words")]
    pub review_len_words: usize,
    #[serde(rename = "has_link")]
    #[tabled(rename = "has_link")]
    pub has_link: u8,
}

/// Number of columns in the cleaned artifact; must track `CleanedRow`.
pub const CLEANED_COLUMN_COUNT: usize = 12;

/// One-record summary persisted next to the cleaned dataset.
#[derive(Debug, Clone, Serialize)]
pub struct CleaningSummary {
    pub rows_original: usize,
    pub rows_after_cleaning: usize,
    pub rows_removed_total: usize,
    pub final_columns: usize,
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct MissingSummaryRow {
    #[serde(rename = "Column")]
    #[tabled(rename = "Column")]
    pub column: String,
    #[serde(rename = "Missing_Count")]
    #[tabled(rename = "Missing_Count")]
    pub missing_count: usize,
    #[serde(rename = "Missing_Percent")]
    #[tabled(rename = "Missing_Percent")]
    pub missing_percent: String,
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct RatingCountRow {
    #[serde(rename = "Rating")]
    #[tabled(rename = "Rating")]
    pub rating: i64,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct RatingPercentRow {
    #[serde(rename = "Rating")]
    #[tabled(rename = "Rating")]
    pub rating: i64,
    #[serde(rename = "Percent")]
    #[tabled(rename = "Percent")]
    pub percent: String,
}

/// One `describe()`-style statistic of the helpfulness column.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct HelpfulnessStatRow {
    #[serde(rename = "Statistic")]
    #[tabled(rename = "Statistic")]
    pub statistic: String,
    #[serde(rename = "Value")]
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct MedianByRatingRow {
    #[serde(rename = "Rating")]
    #[tabled(rename = "Rating")]
    pub rating: i64,
    #[serde(rename = "MedianThumbsUp")]
    #[tabled(rename = "MedianThumbsUp")]
    pub median_thumbs_up: String,
}

#[derive(Debug, Clone, Serialize, Tabled)]
pub struct MonthlyCountRow {
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: String,
    #[serde(rename = "Reviews")]
    #[tabled(rename = "Reviews")]
    pub reviews: usize,
}
