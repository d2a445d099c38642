use std::fmt::Write;

use crate::adherence;
use crate::config::ReportSettings;
use crate::models::{AggregateMetric, DateSelector, FilterOptions};
use crate::pipeline::Dashboard;

pub fn build_report(username: Option<&str>, dashboard: &Dashboard, settings: &ReportSettings) -> String {
    let mut output = String::new();
    let selection = &dashboard.selection;

    let _ = writeln!(output, "# Schedule Adherence Dashboard");
    if let Some(name) = username {
        let _ = writeln!(output, "Welcome, {name}!");
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "## Filters");
    let _ = writeln!(output, "- Date: {}", selection.date.format("%d/%m/%Y"));
    if dashboard.options.weeks.is_some() {
        let _ = writeln!(output, "- Weeks: {}", list_or_all(&selection.weeks));
    }
    if dashboard.options.days.is_some() {
        let _ = writeln!(output, "- Days: {}", list_or_all(&selection.days));
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Raw Data Preview");
    let filtered = &dashboard.filtered;
    if filtered.is_empty() {
        let _ = writeln!(output, "No records match these filters.");
    } else {
        write_row(&mut output, &filtered.columns);
        let divider: Vec<String> = filtered.columns.iter().map(|_| "---".to_string()).collect();
        write_row(&mut output, &divider);
        for record in filtered.records.iter().take(settings.preview_rows) {
            write_row(&mut output, &record.cells);
        }
        if filtered.len() > settings.preview_rows {
            let _ = writeln!(
                output,
                "\n_{} of {} records shown._",
                settings.preview_rows,
                filtered.len()
            );
        }
    }

    let summary = &dashboard.summary;
    let (adherent, non_adherent) = adherence::donut_split(summary.overall);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Overall Adherence");
    let _ = writeln!(output, "Overall adherence: {}", format_pct(summary.overall));
    let _ = writeln!(
        output,
        "- Adherence: {} {}",
        format_pct(adherent),
        bar(adherent, settings.bar_width)
    );
    let _ = writeln!(
        output,
        "- Non-Adherence: {} {}",
        format_pct(non_adherent),
        bar(non_adherent, settings.bar_width)
    );

    write_metrics(&mut output, "Campaign-wise Schedule Adherence", &summary.by_campaign, settings);
    write_metrics(&mut output, "Supervisor-wise Schedule Adherence", &summary.by_supervisor, settings);
    write_metrics(&mut output, "Team Lead-wise Schedule Adherence", &summary.by_teamlead, settings);

    output
}

pub fn build_json(dashboard: &Dashboard) -> serde_json::Result<String> {
    serde_json::to_string_pretty(dashboard)
}

pub fn build_options(options: &FilterOptions) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "## Available Filters");
    match &options.weeks {
        Some(weeks) => {
            let _ = writeln!(output, "- Weeks: {}", list_or_none(weeks));
        }
        None => {
            let _ = writeln!(output, "- Weeks: not available (no week column)");
        }
    }
    match &options.days {
        Some(days) => {
            let _ = writeln!(output, "- Days: {}", list_or_none(days));
        }
        None => {
            let _ = writeln!(output, "- Days: not available (no day column)");
        }
    }
    match options.dates {
        DateSelector::Empty => {
            let _ = writeln!(output, "- Date: no dates in dataset");
        }
        DateSelector::Fixed { date } => {
            let _ = writeln!(output, "- Date: {}", date.format("%d/%m/%Y"));
        }
        DateSelector::Range { min, max } => {
            let _ = writeln!(
                output,
                "- Date: {} to {}",
                min.format("%d/%m/%Y"),
                max.format("%d/%m/%Y")
            );
        }
    }

    output
}

fn write_metrics(output: &mut String, title: &str, metrics: &[AggregateMetric], settings: &ReportSettings) {
    // An empty grouping has no chart.
    if metrics.is_empty() {
        return;
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## {title}");
    for metric in metrics {
        let _ = writeln!(
            output,
            "- {}: {} {}",
            metric.key,
            format_pct(metric.mean_adherence_pct),
            bar(metric.mean_adherence_pct, settings.bar_width)
        );
    }
}

fn write_row(output: &mut String, cells: &[String]) {
    let escaped: Vec<String> = cells.iter().map(|cell| cell.replace('|', "\\|")).collect();
    let _ = writeln!(output, "| {} |", escaped.join(" | "));
}

fn format_pct(value: f64) -> String {
    if value.is_nan() {
        "n/a".to_string()
    } else {
        format!("{value:.2}%")
    }
}

fn bar(value: f64, width: usize) -> String {
    if !value.is_finite() {
        return String::new();
    }
    let filled = ((value.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    "#".repeat(filled)
}

fn list_or_all(values: &[String]) -> String {
    if values.is_empty() {
        "all".to_string()
    } else {
        values.join(", ")
    }
}

fn list_or_none(values: &[String]) -> String {
    if values.is_empty() {
        "none".to_string()
    } else {
        values.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::InputFormat;
    use crate::pipeline::{self, FilterRequest};
    use chrono::NaiveDate;

    const SCHEDULE: &[u8] = b"Date,TSA,TTS,supervisor,teamlead,Campaign,week\n\
01/01/2025,80,100,Sam,Lee,Retail,1\n\
01/01/2025,90,100,Sam,Kim,Retail,1\n\
01/01/2025,100,100,Ria,Kim,Sup|port,2\n\
05/01/2025,50,0,Ria,Kim,Support,2\n";

    fn dashboard(day: u32) -> Dashboard {
        let request = FilterRequest {
            date: NaiveDate::from_ymd_opt(2025, 1, day),
            ..FilterRequest::default()
        };
        pipeline::run(SCHEDULE, InputFormat::Csv, &request).unwrap()
    }

    #[test]
    fn markdown_contains_every_section() {
        let report = build_report(Some("admin"), &dashboard(1), &ReportSettings::default());
        assert!(report.starts_with("# Schedule Adherence Dashboard\nWelcome, admin!\n"));
        assert!(report.contains("- Date: 01/01/2025"));
        assert!(report.contains("- Weeks: all"));
        assert!(!report.contains("- Days:"));
        assert!(report.contains("| Date | TSA | TTS | supervisor | teamlead | Campaign | week |"));
        assert!(report.contains("Sup\\|port"));
        assert!(report.contains("Overall adherence: 90.00%"));
        assert!(report.contains("- Adherence: 90.00% ####################################\n"));
        assert!(report.contains("## Campaign-wise Schedule Adherence\n- Retail: 85.00%"));
        assert!(report.contains("## Supervisor-wise Schedule Adherence"));
        assert!(report.contains("## Team Lead-wise Schedule Adherence\n- Kim: 95.00%"));
    }

    #[test]
    fn empty_selection_renders_fallbacks() {
        let report = build_report(None, &dashboard(3), &ReportSettings::default());
        assert!(!report.contains("Welcome"));
        assert!(report.contains("No records match these filters."));
        assert!(report.contains("Overall adherence: n/a"));
        assert!(report.contains("- Adherence: 0.00% \n"));
        assert!(report.contains("- Non-Adherence: 100.00% "));
        assert!(!report.contains("Campaign-wise"));
    }

    #[test]
    fn undefined_group_renders_as_not_available() {
        let report = build_report(None, &dashboard(5), &ReportSettings::default());
        assert!(report.contains("- Support: n/a \n"));
    }

    #[test]
    fn preview_is_truncated() {
        let settings = ReportSettings {
            preview_rows: 1,
            bar_width: 10,
        };
        let report = build_report(None, &dashboard(1), &settings);
        assert!(report.contains("_1 of 3 records shown._"));
        assert!(report.contains("- Retail: 85.00% #########\n"));
    }

    #[test]
    fn json_uses_null_for_undefined_values() {
        let json = build_json(&dashboard(3)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["summary"]["overall"].is_null());
        assert_eq!(value["selection"]["date"], "2025-01-03");
        assert_eq!(value["options"]["dates"]["kind"], "range");
        assert_eq!(value["options"]["weeks"], serde_json::json!(["1", "2"]));
    }

    #[test]
    fn json_records_carry_their_percentage() {
        let json = build_json(&dashboard(1)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let records = value["summary"]["records"].as_array().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["adherence_pct"], 80.0);
        assert_eq!(records[0]["campaign"], "Retail");
        assert_eq!(value["summary"]["by_campaign"][0]["key"], "Retail");
    }

    #[test]
    fn options_listing() {
        let options = pipeline::inspect(SCHEDULE, InputFormat::Csv).unwrap();
        let listing = build_options(&options);
        assert!(listing.contains("- Weeks: 1, 2"));
        assert!(listing.contains("- Days: not available (no day column)"));
        assert!(listing.contains("- Date: 01/01/2025 to 05/01/2025"));
    }
}
