use chrono::NaiveDate;

use crate::error::{PipelineError, Result};
use crate::ingest::RawTable;
use crate::models::{Dataset, Record, DAY_COLUMN, REQUIRED_COLUMNS, WEEK_COLUMN};

const YEAR_FIRST_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
// Two-digit years are tried before four-digit ones; `%Y` would accept "25" as year 25.
const DAY_FIRST_FORMATS: [&str; 8] = [
    "%d/%m/%y",
    "%d/%m/%Y",
    "%d-%m-%y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%d-%b-%Y",
];

/// Required columns absent from `columns`. Names are compared exactly.
pub fn missing_columns(columns: &[String]) -> Vec<String> {
    REQUIRED_COLUMNS
        .iter()
        .filter(|required| !columns.iter().any(|column| column == *required))
        .map(|required| required.to_string())
        .collect()
}

pub fn check_columns(columns: &[String]) -> Result<()> {
    let missing = missing_columns(columns);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::Schema { missing })
    }
}

/// Validate the header, then type every row.
pub fn build_dataset(table: RawTable) -> Result<Dataset> {
    check_columns(&table.headers)?;

    let index = |name: &str| table.headers.iter().position(|column| column == name);
    let required = |name: &str| {
        index(name).ok_or_else(|| PipelineError::Schema {
            missing: vec![name.to_string()],
        })
    };

    let date_idx = required("Date")?;
    let tsa_idx = required("TSA")?;
    let tts_idx = required("TTS")?;
    let supervisor_idx = required("supervisor")?;
    let teamlead_idx = required("teamlead")?;
    let campaign_idx = required("Campaign")?;
    let week_idx = index(WEEK_COLUMN);
    let day_idx = index(DAY_COLUMN);

    let mut records = Vec::with_capacity(table.rows.len());

    for (offset, cells) in table.rows.into_iter().enumerate() {
        let row = offset + 1;
        let cell = |idx: usize| cells.get(idx).map(String::as_str).unwrap_or("");

        let date_text = cell(date_idx);
        let date = parse_date(date_text).ok_or_else(|| invalid(row, "Date", date_text, "date"))?;
        let tsa = parse_number(cell(tsa_idx)).ok_or_else(|| invalid(row, "TSA", cell(tsa_idx), "number"))?;
        let tts = parse_number(cell(tts_idx)).ok_or_else(|| invalid(row, "TTS", cell(tts_idx), "number"))?;

        let record = Record {
            date,
            tsa,
            tts,
            supervisor: required_text(row, "supervisor", cell(supervisor_idx))?,
            teamlead: required_text(row, "teamlead", cell(teamlead_idx))?,
            campaign: required_text(row, "Campaign", cell(campaign_idx))?,
            week: week_idx.and_then(|idx| optional_text(cell(idx))),
            day: day_idx.and_then(|idx| optional_text(cell(idx))),
            cells: cells.clone(),
        };
        records.push(record);
    }

    tracing::info!(records = records.len(), "dataset validated");

    Ok(Dataset {
        columns: table.headers,
        records,
    })
}

/// Day-first date parsing: "03/04/2025" is 3 April. A trailing time of day is dropped.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = strip_time(value.trim());
    if value.is_empty() {
        return None;
    }

    let formats: &[&str] = if starts_with_year(value) {
        &YEAR_FIRST_FORMATS
    } else {
        &DAY_FIRST_FORMATS
    };

    formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

fn strip_time(value: &str) -> &str {
    match value.rsplit_once([' ', 'T']) {
        Some((date, time)) if time.contains(':') => date.trim_end(),
        _ => value,
    }
}

fn starts_with_year(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() > 4 && bytes[..4].iter().all(u8::is_ascii_digit) && matches!(bytes[4], b'-' | b'/')
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|number| number.is_finite())
}

fn required_text(row: usize, column: &str, value: &str) -> Result<String> {
    optional_text(value).ok_or_else(|| invalid(row, column, value, "non-empty value"))
}

fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn invalid(row: usize, column: &str, value: &str, expected: &str) -> PipelineError {
    PipelineError::Computation(format!(
        "row {row}: column '{column}' has '{value}', expected a {expected}"
    ))
}
