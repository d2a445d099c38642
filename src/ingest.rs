use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_from_rs, Data, DataType, Reader, Xlsx, XlsxError};

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Xlsx,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("csv") => Ok(InputFormat::Csv),
            Some("xlsx") => Ok(InputFormat::Xlsx),
            _ => Err(PipelineError::Parse(format!(
                "unsupported file type for {}; expected .csv or .xlsx",
                path.display()
            ))),
        }
    }
}

/// Header plus data rows as cell text, before any typing.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub fn read_table(bytes: &[u8], format: InputFormat) -> Result<RawTable> {
    let table = match format {
        InputFormat::Csv => read_csv(bytes)?,
        InputFormat::Xlsx => read_xlsx(bytes)?,
    };
    tracing::info!(
        columns = table.headers.len(),
        rows = table.rows.len(),
        ?format,
        "table decoded"
    );
    Ok(table)
}

fn read_csv(bytes: &[u8]) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let headers = reader.headers()?.iter().map(String::from).collect();
    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(String::from).collect());
    }

    Ok(RawTable { headers, rows })
}

fn read_xlsx(bytes: &[u8]) -> Result<RawTable> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|err: XlsxError| PipelineError::Parse(err.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| PipelineError::Parse("workbook has no worksheets".to_string()))?
        .map_err(|err| PipelineError::Parse(err.to_string()))?;

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = match sheet_rows.next() {
        Some(row) => row.iter().map(cell_text).collect(),
        None => Vec::new(),
    };

    let mut rows = Vec::new();
    for row in sheet_rows {
        let mut cells: Vec<String> = row.iter().map(cell_text).collect();
        cells.resize(headers.len().max(cells.len()), String::new());
        rows.push(cells);
    }

    Ok(RawTable { headers, rows })
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(value) => value.clone(),
        Data::Float(value) => value.to_string(),
        Data::Int(value) => value.to_string(),
        Data::Bool(value) => value.to_string(),
        Data::DateTime(value) => match cell.as_date() {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => value.as_f64().to_string(),
        },
        Data::DateTimeIso(value) => value.clone(),
        _ => String::new(),
    }
}
