use std::collections::BTreeMap;

use crate::models::{AdherenceRecord, AdherenceSummary, AggregateMetric, Dataset, Record};

/// `round(100 * TSA / TTS, 2)`; NaN when nothing was scheduled.
pub fn adherence_pct(tsa: f64, tts: f64) -> f64 {
    if tts == 0.0 {
        return f64::NAN;
    }
    round2(100.0 * tsa / tts)
}

/// Two decimals, ties to even.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Arithmetic mean; NaN for no values, and any NaN input makes the mean NaN.
pub fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

pub fn summarize(filtered: &Dataset) -> AdherenceSummary {
    let records: Vec<AdherenceRecord> = filtered
        .records
        .iter()
        .map(|record| AdherenceRecord {
            adherence_pct: adherence_pct(record.tsa, record.tts),
            record: record.clone(),
        })
        .collect();

    let overall = round2(mean(records.iter().map(|r| r.adherence_pct)));
    let by_campaign = group_means(&records, |r| &r.campaign);
    let by_supervisor = group_means(&records, |r| &r.supervisor);
    let by_teamlead = group_means(&records, |r| &r.teamlead);

    tracing::info!(
        records = records.len(),
        overall,
        campaigns = by_campaign.len(),
        supervisors = by_supervisor.len(),
        teamleads = by_teamlead.len(),
        "adherence calculated"
    );

    AdherenceSummary {
        records,
        overall,
        by_campaign,
        by_supervisor,
        by_teamlead,
    }
}

fn group_means<F>(records: &[AdherenceRecord], key: F) -> Vec<AggregateMetric>
where
    F: Fn(&Record) -> &String,
{
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for record in records {
        groups
            .entry(key(&record.record).as_str())
            .or_default()
            .push(record.adherence_pct);
    }

    groups
        .into_iter()
        .map(|(key, values)| AggregateMetric {
            key: key.to_string(),
            mean_adherence_pct: mean(values),
        })
        .collect()
}

/// Adherent / non-adherent shares for the overall donut; undefined shows as all non-adherent.
pub fn donut_split(overall: f64) -> (f64, f64) {
    if overall.is_nan() {
        (0.0, 100.0)
    } else {
        (overall, 100.0 - overall)
    }
}
