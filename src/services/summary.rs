use crate::models::Analysis;
use serde::Serialize;

const UNKNOWN_TYPE: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub name: String,
    pub data_type: String,
    pub missing: u64,
    pub tbd: u64,
    pub missing_percentage: f64,
    pub tbd_percentage: f64,
    pub missing_label: String,
    pub tbd_label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryReport {
    pub total_rows: usize,
    pub total_columns: usize,
    pub columns: Vec<ColumnSummary>,
}

fn percentage(reported: Option<f64>, count: u64, total_rows: usize) -> f64 {
    let value = match reported {
        Some(p) => p,
        None if total_rows == 0 => 0.0,
        None => count as f64 / total_rows as f64 * 100.0,
    };
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

pub fn percentage_label(value: f64) -> String {
    format!("{:.1}%", value)
}

pub fn build_summary(analysis: &Analysis) -> SummaryReport {
    let columns = analysis
        .columns
        .iter()
        .map(|name| {
            let missing = analysis.missing_values.get(name).copied().unwrap_or(0);
            let tbd = analysis.tbd_values.get(name).copied().unwrap_or(0);
            let missing_percentage = percentage(
                analysis.missing_percentage.get(name).copied(),
                missing,
                analysis.total_rows,
            );
            let tbd_percentage = percentage(
                analysis.tbd_percentage.get(name).copied(),
                tbd,
                analysis.total_rows,
            );

            ColumnSummary {
                name: name.clone(),
                data_type: analysis
                    .data_types
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_TYPE.to_string()),
                missing,
                tbd,
                missing_percentage,
                tbd_percentage,
                missing_label: percentage_label(missing_percentage),
                tbd_label: percentage_label(tbd_percentage),
            }
        })
        .collect();

    SummaryReport {
        total_rows: analysis.total_rows,
        total_columns: analysis.total_columns,
        columns,
    }
}
