use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::models::{Dataset, DateSelector, FilterOptions, FilterSelection, Record};

/// The selectors a dataset offers. Week and day are only offered when their column exists.
pub fn options(dataset: &Dataset) -> FilterOptions {
    let weeks = dataset
        .has_week()
        .then(|| sorted_unique(dataset.records.iter().filter_map(|r| r.week.as_deref())));
    let days = dataset
        .has_day()
        .then(|| sorted_unique(dataset.records.iter().filter_map(|r| r.day.as_deref())));

    let dates: BTreeSet<NaiveDate> = dataset.records.iter().map(|r| r.date).collect();
    let date_selector = match (dates.first(), dates.last()) {
        (Some(min), Some(max)) if min == max => DateSelector::Fixed { date: *min },
        (Some(min), Some(max)) => DateSelector::Range {
            min: *min,
            max: *max,
        },
        _ => DateSelector::Empty,
    };

    FilterOptions {
        weeks,
        days,
        dates: date_selector,
    }
}

/// Week, then day, then exact date. An empty week or day selection keeps every row.
pub fn apply(dataset: &Dataset, selection: &FilterSelection) -> Dataset {
    let by_week = dataset.has_week() && !selection.weeks.is_empty();
    let by_day = dataset.has_day() && !selection.days.is_empty();

    let records: Vec<Record> = dataset
        .records
        .iter()
        .filter(|r| !by_week || matches_any(r.week.as_deref(), &selection.weeks))
        .filter(|r| !by_day || matches_any(r.day.as_deref(), &selection.days))
        .filter(|r| r.date == selection.date)
        .cloned()
        .collect();

    tracing::debug!(
        weeks = ?selection.weeks,
        days = ?selection.days,
        date = %selection.date,
        kept = records.len(),
        total = dataset.len(),
        "filters applied"
    );

    dataset.with_records(records)
}

fn matches_any(value: Option<&str>, selected: &[String]) -> bool {
    value.is_some_and(|value| selected.iter().any(|s| s == value))
}

/// Distinct values, sorted numerically when every value is a number, else lexically.
fn sorted_unique<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let unique: BTreeSet<&str> = values.collect();
    let mut sorted: Vec<String> = unique.into_iter().map(String::from).collect();

    let numeric: Option<Vec<f64>> = sorted.iter().map(|v| v.parse::<f64>().ok()).collect();
    if let Some(numbers) = numeric {
        let mut paired: Vec<(f64, String)> = numbers.into_iter().zip(sorted).collect();
        paired.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        sorted = paired.into_iter().map(|(_, value)| value).collect();
    }

    sorted
}
