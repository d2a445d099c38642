use chrono::NaiveDate;
use serde::Serialize;

use crate::adherence;
use crate::error::{PipelineError, Result};
use crate::filter;
use crate::ingest::{self, InputFormat};
use crate::models::{AdherenceSummary, Dataset, FilterOptions, FilterSelection};
use crate::schema;

/// What the user picked; the date falls back to the earliest date in the data.
#[derive(Debug, Clone, Default)]
pub struct FilterRequest {
    pub weeks: Vec<String>,
    pub days: Vec<String>,
    pub date: Option<NaiveDate>,
}

/// Everything one cycle hands to the renderer.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub options: FilterOptions,
    pub selection: FilterSelection,
    pub filtered: Dataset,
    pub summary: AdherenceSummary,
}

pub fn load(bytes: &[u8], format: InputFormat) -> Result<Dataset> {
    let table = ingest::read_table(bytes, format)?;
    schema::build_dataset(table)
}

pub fn inspect(bytes: &[u8], format: InputFormat) -> Result<FilterOptions> {
    let dataset = load(bytes, format)?;
    Ok(filter::options(&dataset))
}

/// One full validate, filter and calculate pass. Nothing is kept between calls.
pub fn run(bytes: &[u8], format: InputFormat, request: &FilterRequest) -> Result<Dashboard> {
    let dataset = load(bytes, format)?;
    let options = filter::options(&dataset);
    let selection = resolve_selection(&dataset, &options, request)?;

    let filtered = filter::apply(&dataset, &selection);
    let summary = adherence::summarize(&filtered);

    Ok(Dashboard {
        options,
        selection,
        filtered,
        summary,
    })
}

fn resolve_selection(
    dataset: &Dataset,
    options: &FilterOptions,
    request: &FilterRequest,
) -> Result<FilterSelection> {
    let date = match request.date {
        Some(date) if options.dates.allows(date) => date,
        Some(date) => {
            return Err(PipelineError::Computation(format!(
                "date {} is outside the dates present in the dataset",
                date.format("%d/%m/%Y")
            )))
        }
        None => options.dates.default_date().ok_or_else(|| {
            PipelineError::Computation("dataset contains no dates to select".to_string())
        })?,
    };

    if !options.dates.observed(date) {
        tracing::debug!(date = %date, "selected date lies outside the dates in the dataset");
    }

    if !request.weeks.is_empty() && !dataset.has_week() {
        tracing::warn!("dataset has no week column; week selection ignored");
    }
    if !request.days.is_empty() && !dataset.has_day() {
        tracing::warn!("dataset has no day column; day selection ignored");
    }

    Ok(FilterSelection {
        weeks: if dataset.has_week() { request.weeks.clone() } else { Vec::new() },
        days: if dataset.has_day() { request.days.clone() } else { Vec::new() },
        date,
    })
}
