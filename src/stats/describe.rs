use std::collections::HashMap;

use crate::stats::table::{ColumnValues, Table};

/// Header row shared by every statistics CSV.
pub const STATS_HEADER: [&str; 13] = [
    "column", "count", "unique", "top", "freq", "mean", "std", "min", "25%", "50%", "75%",
    "max", "cv",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// Descriptive statistics for one column.
///
/// Numeric columns fill the moment/quantile fields, categorical columns the
/// unique/top/freq fields; everything a column kind does not define stays
/// `None` and renders as an empty cell.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: String,
    pub kind: ColumnKind,
    pub count: u64,
    pub unique: Option<u64>,
    pub top: Option<String>,
    pub freq: Option<u64>,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub p25: Option<f64>,
    pub p50: Option<f64>,
    pub p75: Option<f64>,
    pub max: Option<f64>,
    pub cv: Option<f64>,
    pub sheet: Option<String>,
}

impl ColumnSummary {
    fn new(column: &str, kind: ColumnKind) -> Self {
        ColumnSummary {
            column: column.to_string(),
            kind,
            count: 0,
            unique: None,
            top: None,
            freq: None,
            mean: None,
            std: None,
            min: None,
            p25: None,
            p50: None,
            p75: None,
            max: None,
            cv: None,
            sheet: None,
        }
    }

    pub fn with_sheet(mut self, sheet: &str) -> Self {
        self.sheet = Some(sheet.to_string());
        self
    }

    /// Renders the row for a statistics CSV, in `STATS_HEADER` order.
    pub fn to_record(&self) -> Vec<String> {
        vec![
            self.column.clone(),
            self.count.to_string(),
            format_opt_count(self.unique),
            self.top.clone().unwrap_or_default(),
            format_opt_count(self.freq),
            format_opt_stat(self.mean),
            format_opt_stat(self.std),
            format_opt_stat(self.min),
            format_opt_stat(self.p25),
            format_opt_stat(self.p50),
            format_opt_stat(self.p75),
            format_opt_stat(self.max),
            format_opt_stat(self.cv),
        ]
    }

    /// One-line human-readable digest of this column's statistics.
    pub fn render_summary(&self) -> String {
        match self.kind {
            ColumnKind::Numeric => format!(
                "mean={}, std={}, cv={}",
                display_opt_stat(self.mean),
                display_opt_stat(self.std),
                display_opt_stat(self.cv)
            ),
            ColumnKind::Categorical => format!(
                "{} unique, top={}, freq={}",
                self.unique.unwrap_or(0),
                match &self.top {
                    Some(value) => format!("'{}'", value),
                    None => "n/a".to_string(),
                },
                match self.freq {
                    Some(freq) => freq.to_string(),
                    None => "n/a".to_string(),
                }
            ),
        }
    }
}

/// Computes per-column descriptive statistics for a table.
///
/// An empty table produces an empty result; all-missing columns produce
/// zero-count summaries. Never fails.
pub fn describe(table: &Table) -> Vec<ColumnSummary> {
    table
        .classify()
        .into_iter()
        .map(|column| match column.values {
            ColumnValues::Numeric(values) => summarize_numeric(&column.name, &values),
            ColumnValues::Categorical(values) => summarize_categorical(&column.name, &values),
        })
        .collect()
}

/// Describe-style statistics for a bare numeric series, used for series that
/// were mined from text rather than read from a table column.
pub fn describe_series(name: &str, values: &[f64]) -> ColumnSummary {
    let values: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
    summarize_numeric(name, &values)
}

/// One summary line per column: `(column name, rendered digest)`.
pub fn textual_summary(summaries: &[ColumnSummary]) -> Vec<(String, String)> {
    summaries
        .iter()
        .map(|summary| (summary.column.clone(), summary.render_summary()))
        .collect()
}

/// `std / mean`, defined only when the mean exists and is non-zero.
///
/// Zero and missing means both yield `None`; callers never see an infinity
/// or NaN from this.
pub fn coefficient_of_variation(mean: Option<f64>, std: Option<f64>) -> Option<f64> {
    match (mean, std) {
        (Some(mean), Some(std)) if mean != 0.0 => Some(round6(std / mean)),
        _ => None,
    }
}

/// Rounds to 6 decimal places and trims trailing zeros, so `20.0` renders
/// as `20` and `0.5` as `0.5`.
pub fn format_stat(value: f64) -> String {
    let rounded = round6(value);
    if rounded == rounded.trunc() && rounded.abs() < 1e15 {
        return format!("{}", rounded as i64);
    }
    let rendered = format!("{:.6}", rounded);
    rendered
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

fn summarize_numeric(name: &str, values: &[Option<f64>]) -> ColumnSummary {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    let mut summary = ColumnSummary::new(name, ColumnKind::Numeric);
    summary.count = present.len() as u64;
    if present.is_empty() {
        return summary;
    }

    let mean = present.iter().sum::<f64>() / present.len() as f64;
    let mut sorted = present.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));

    summary.mean = Some(mean);
    summary.std = sample_std(&present, mean);
    summary.min = Some(sorted[0]);
    summary.p25 = Some(percentile(&sorted, 0.25));
    summary.p50 = Some(percentile(&sorted, 0.5));
    summary.p75 = Some(percentile(&sorted, 0.75));
    summary.max = Some(sorted[sorted.len() - 1]);
    summary.cv = coefficient_of_variation(summary.mean, summary.std);
    summary
}

fn summarize_categorical(name: &str, values: &[Option<String>]) -> ColumnSummary {
    let mut summary = ColumnSummary::new(name, ColumnKind::Categorical);
    let mut occurrences: HashMap<&str, (u64, usize)> = HashMap::new();
    let mut seen = 0usize;

    for value in values.iter().flatten() {
        occurrences
            .entry(value.as_str())
            .and_modify(|entry| entry.0 += 1)
            .or_insert((1, seen));
        seen += 1;
    }

    summary.count = values.iter().flatten().count() as u64;
    summary.unique = Some(occurrences.len() as u64);

    // Highest frequency wins; ties resolve to the first-seen value.
    let mut top: Option<(&str, u64, usize)> = None;
    for (value, (count, first_seen)) in &occurrences {
        let replace = match top {
            None => true,
            Some((_, best_count, best_first)) => {
                *count > best_count || (*count == best_count && *first_seen < best_first)
            }
        };
        if replace {
            top = Some((value, *count, *first_seen));
        }
    }
    if let Some((value, count, _)) = top {
        summary.top = Some(value.to_string());
        summary.freq = Some(count);
    }
    summary
}

/// Sample standard deviation (denominator n-1); undefined for fewer than
/// two values.
fn sample_std(values: &[f64], mean: f64) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let sum_squares: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((sum_squares / (values.len() - 1) as f64).sqrt())
}

/// Linear interpolation between closest ranks over an ascending slice.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let position = q * (sorted.len() - 1) as f64;
    let low = position.floor() as usize;
    let high = position.ceil() as usize;
    let fraction = position - low as f64;
    sorted[low] + (sorted[high] - sorted[low]) * fraction
}

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

fn format_opt_stat(value: Option<f64>) -> String {
    value.map(format_stat).unwrap_or_default()
}

fn display_opt_stat(value: Option<f64>) -> String {
    value.map(format_stat).unwrap_or_else(|| "n/a".to_string())
}

fn format_opt_count(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn numeric_table(values: &[&str]) -> Table {
        Table::new(
            cells(&["score"]),
            values.iter().map(|v| cells(&[v])).collect(),
        )
    }

    #[test]
    fn test_numeric_column_statistics() {
        let stats = describe(&numeric_table(&["10", "20", "30"]));
        let score = &stats[0];
        assert_eq!(score.kind, ColumnKind::Numeric);
        assert_eq!(score.count, 3);
        assert_eq!(score.mean, Some(20.0));
        assert_eq!(score.std, Some(10.0));
        assert_eq!(score.min, Some(10.0));
        assert_eq!(score.p25, Some(15.0));
        assert_eq!(score.p50, Some(20.0));
        assert_eq!(score.p75, Some(25.0));
        assert_eq!(score.max, Some(30.0));
        assert_eq!(score.cv, Some(0.5));
    }

    #[test]
    fn test_cv_is_std_over_mean_rounded() {
        let stats = describe(&numeric_table(&["10", "", "30"]));
        let score = &stats[0];
        assert_eq!(score.count, 2);
        assert_eq!(score.mean, Some(20.0));
        assert_eq!(score.cv, Some(0.707107));
    }

    #[test]
    fn test_cv_missing_for_zero_mean() {
        let stats = describe(&numeric_table(&["-5", "5"]));
        let score = &stats[0];
        assert_eq!(score.mean, Some(0.0));
        assert!(score.std.is_some());
        assert_eq!(score.cv, None);
    }

    #[test]
    fn test_cv_missing_without_mean() {
        assert_eq!(coefficient_of_variation(None, Some(1.0)), None);
        assert_eq!(coefficient_of_variation(Some(2.0), None), None);
        assert_eq!(coefficient_of_variation(Some(0.0), Some(1.0)), None);
    }

    #[test]
    fn test_single_value_has_no_std() {
        let stats = describe(&numeric_table(&["42"]));
        let score = &stats[0];
        assert_eq!(score.count, 1);
        assert_eq!(score.mean, Some(42.0));
        assert_eq!(score.std, None);
        assert_eq!(score.cv, None);
        assert_eq!(score.p25, Some(42.0));
        assert_eq!(score.p75, Some(42.0));
    }

    #[test]
    fn test_all_missing_column_yields_missing_statistics() {
        let table = Table::new(cells(&["empty"]), vec![cells(&[""]), cells(&["na"])]);
        let stats = describe(&table);
        assert_eq!(stats[0].count, 0);
        assert_eq!(stats[0].unique, Some(0));
        assert_eq!(stats[0].top, None);
        assert_eq!(stats[0].mean, None);
        assert_eq!(stats[0].cv, None);
    }

    #[test]
    fn test_empty_table_yields_empty_statistics() {
        let table = Table::new(vec![], vec![]);
        assert!(describe(&table).is_empty());
    }

    #[test]
    fn test_categorical_top_and_frequency() {
        let table = Table::new(
            cells(&["name"]),
            vec![
                cells(&["alice"]),
                cells(&["bob"]),
                cells(&["alice"]),
                cells(&[""]),
            ],
        );
        let stats = describe(&table);
        assert_eq!(stats[0].kind, ColumnKind::Categorical);
        assert_eq!(stats[0].count, 3);
        assert_eq!(stats[0].unique, Some(2));
        assert_eq!(stats[0].top, Some("alice".to_string()));
        assert_eq!(stats[0].freq, Some(2));
    }

    #[test]
    fn test_categorical_tie_prefers_first_seen() {
        let table = Table::new(
            cells(&["name"]),
            vec![cells(&["zeta"]), cells(&["alpha"])],
        );
        let stats = describe(&table);
        assert_eq!(stats[0].top, Some("zeta".to_string()));
        assert_eq!(stats[0].freq, Some(1));
    }

    #[test]
    fn test_describe_series() {
        let summary = describe_series("value", &[1234.56]);
        assert_eq!(summary.count, 1);
        assert_eq!(summary.mean, Some(1234.56));
        assert_eq!(summary.std, None);
    }

    #[test]
    fn test_textual_summary_rows() {
        let table = Table::new(
            cells(&["name", "score"]),
            vec![cells(&["alice", "10"]), cells(&["bob", "30"])],
        );
        let rows = textual_summary(&describe(&table));
        assert_eq!(rows[0].0, "name");
        assert_eq!(rows[0].1, "2 unique, top='alice', freq=1");
        assert_eq!(rows[1].0, "score");
        assert_eq!(rows[1].1, "mean=20, std=14.142136, cv=0.707107");
    }

    #[test]
    fn test_format_stat_trims_trailing_zeros() {
        assert_eq!(format_stat(20.0), "20");
        assert_eq!(format_stat(0.5), "0.5");
        assert_eq!(format_stat(-2.5), "-2.5");
        assert_eq!(format_stat(1666.6666666666), "1666.666667");
        assert_eq!(format_stat(0.0000001), "0");
    }

    #[test]
    fn test_record_layout_matches_header() {
        let stats = describe(&numeric_table(&["10", "20", "30"]));
        let record = stats[0].to_record();
        assert_eq!(record.len(), STATS_HEADER.len());
        assert_eq!(record[0], "score");
        assert_eq!(record[1], "3");
        assert_eq!(record[2], "");
        assert_eq!(record[5], "20");
        assert_eq!(record[12], "0.5");
    }

    #[test]
    fn test_sheet_tagging() {
        let summary = ColumnSummary::new("a", ColumnKind::Numeric).with_sheet("north");
        assert_eq!(summary.sheet.as_deref(), Some("north"));
    }
}
