use chrono::NaiveDate;
use serde::Serialize;

/// Columns every dataset must carry, in the order they are reported when missing.
pub const REQUIRED_COLUMNS: [&str; 6] = ["Date", "TSA", "TTS", "supervisor", "teamlead", "Campaign"];
pub const WEEK_COLUMN: &str = "week";
pub const DAY_COLUMN: &str = "day";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub date: NaiveDate,
    pub tsa: f64,
    pub tts: f64,
    pub supervisor: String,
    pub teamlead: String,
    pub campaign: String,
    pub week: Option<String>,
    pub day: Option<String>,
    /// Raw cell text for every column, in header order.
    #[serde(skip)]
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column == name)
    }

    pub fn has_week(&self) -> bool {
        self.has_column(WEEK_COLUMN)
    }

    pub fn has_day(&self) -> bool {
        self.has_column(DAY_COLUMN)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// A dataset with the same columns holding only `records`.
    pub fn with_records(&self, records: Vec<Record>) -> Dataset {
        Dataset {
            columns: self.columns.clone(),
            records,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterSelection {
    pub weeks: Vec<String>,
    pub days: Vec<String>,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdherenceRecord {
    #[serde(flatten)]
    pub record: Record,
    /// NaN when the record has no scheduled time.
    pub adherence_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateMetric {
    pub key: String,
    pub mean_adherence_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdherenceSummary {
    pub records: Vec<AdherenceRecord>,
    pub overall: f64,
    pub by_campaign: Vec<AggregateMetric>,
    pub by_supervisor: Vec<AggregateMetric>,
    pub by_teamlead: Vec<AggregateMetric>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DateSelector {
    Empty,
    Fixed { date: NaiveDate },
    Range { min: NaiveDate, max: NaiveDate },
}

impl DateSelector {
    pub fn default_date(&self) -> Option<NaiveDate> {
        match self {
            DateSelector::Empty => None,
            DateSelector::Fixed { date } => Some(*date),
            DateSelector::Range { min, .. } => Some(*min),
        }
    }

    /// Whether `date` lies within the dates the dataset actually contains.
    pub fn observed(&self, date: NaiveDate) -> bool {
        match self {
            DateSelector::Empty => false,
            DateSelector::Fixed { date: fixed } => *fixed == date,
            DateSelector::Range { min, max } => *min <= date && date <= *max,
        }
    }

    /// Only a range bounds the selectable dates.
    pub fn allows(&self, date: NaiveDate) -> bool {
        match self {
            DateSelector::Empty | DateSelector::Fixed { .. } => true,
            DateSelector::Range { min, max } => *min <= date && date <= *max,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    /// `None` when the dataset has no week column.
    pub weeks: Option<Vec<String>>,
    /// `None` when the dataset has no day column.
    pub days: Option<Vec<String>>,
    pub dates: DateSelector,
}
