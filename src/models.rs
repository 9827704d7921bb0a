use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A file picked for analysis, held in memory until it is uploaded.
#[derive(Clone)]
pub struct SelectedFile {
    pub name: String,
    pub bytes: Bytes,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// A single cell as delivered by the analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl CellValue {
    /// `true` when the value carries something worth showing.
    pub fn is_present(&self) -> bool {
        match self {
            CellValue::Null => false,
            CellValue::Text(s) => !s.is_empty(),
            CellValue::Bool(_) | CellValue::Number(_) => true,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            // Integral floats print without a fractional part.
            CellValue::Number(n) => match n.as_f64() {
                Some(v) if n.is_f64() && v.fract() == 0.0 && v.abs() < 1e15 => {
                    write!(f, "{}", v as i64)
                }
                _ => write!(f, "{}", n),
            },
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

pub type Row = HashMap<String, CellValue>;

/// Dataset quality analysis returned by the analysis service.
///
/// Positional maps arrive as JSON arrays and are held as sets so that
/// cell classification stays constant time regardless of dataset size.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub columns: Vec<String>,
    #[serde(default)]
    pub data: Vec<Row>,
    #[serde(default)]
    pub total_rows: usize,
    #[serde(default)]
    pub total_columns: usize,
    #[serde(default)]
    pub missing_positions: HashMap<String, HashSet<usize>>,
    #[serde(default)]
    pub tbd_positions: HashMap<String, HashSet<usize>>,
    #[serde(default)]
    pub missing_values: HashMap<String, u64>,
    #[serde(default)]
    pub tbd_values: HashMap<String, u64>,
    #[serde(default)]
    pub missing_percentage: HashMap<String, f64>,
    #[serde(default)]
    pub tbd_percentage: HashMap<String, f64>,
    #[serde(default)]
    pub data_types: HashMap<String, String>,
}

impl Analysis {
    /// Lists every way this payload departs from the documented invariants.
    /// The service stays authoritative, so callers only log these.
    pub fn consistency_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.total_rows != self.data.len() {
            issues.push(format!(
                "total_rows is {} but {} data rows were received",
                self.total_rows,
                self.data.len()
            ));
        }
        if self.total_columns != self.columns.len() {
            issues.push(format!(
                "total_columns is {} but {} column names were received",
                self.total_columns,
                self.columns.len()
            ));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.as_str()) {
                issues.push(format!("column '{}' appears more than once", column));
            }
        }

        for column in &self.columns {
            let missing = self.missing_positions.get(column);
            let tbd = self.tbd_positions.get(column);

            for (label, positions) in [("missing", missing), ("tbd", tbd)] {
                if let Some(out_of_range) = positions
                    .and_then(|set| set.iter().copied().filter(|&i| i >= self.total_rows).max())
                {
                    issues.push(format!(
                        "column '{}' has {} position {} outside of {} rows",
                        column, label, out_of_range, self.total_rows
                    ));
                }
            }

            if let (Some(missing), Some(tbd)) = (missing, tbd) {
                let overlap = missing.intersection(tbd).count();
                if overlap > 0 {
                    issues.push(format!(
                        "column '{}' lists {} positions as both missing and tbd",
                        column, overlap
                    ));
                }
            }
        }

        issues
    }
}

/// Success envelope of the analyze endpoint.
#[derive(Debug, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub analysis: Option<Analysis>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Structured error body of the analyze endpoint.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
}
