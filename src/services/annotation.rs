//! Turns an [`Analysis`] into display-ready grid structures.
//!
//! Nothing here mutates the analysis: rows are copied, classification is a
//! set lookup, and the em-dash substitution only exists in rendered output.

use crate::models::{Analysis, CellValue, Row};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// Shown in place of absent or empty values.
pub const EMPTY_CELL_SENTINEL: &str = "—";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellQuality {
    Missing,
    Placeholder,
    Present,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellStyle {
    pub background: &'static str,
    pub color: &'static str,
    pub italic: bool,
}

impl CellQuality {
    pub fn style(self) -> CellStyle {
        match self {
            CellQuality::Placeholder => CellStyle {
                background: "rgba(255, 165, 0, 0.1)",
                color: "orange",
                italic: true,
            },
            CellQuality::Missing => CellStyle {
                background: "rgba(255, 0, 0, 0.1)",
                color: "inherit",
                italic: false,
            },
            CellQuality::Present => CellStyle {
                background: "transparent",
                color: "inherit",
                italic: false,
            },
        }
    }
}

/// Placeholder wins over missing when a position appears in both sets.
pub fn classify(analysis: &Analysis, row_index: usize, column: &str) -> CellQuality {
    let in_set = |positions: &std::collections::HashMap<String, HashSet<usize>>| {
        positions
            .get(column)
            .map_or(false, |set| set.contains(&row_index))
    };

    if in_set(&analysis.tbd_positions) {
        CellQuality::Placeholder
    } else if in_set(&analysis.missing_positions) {
        CellQuality::Missing
    } else {
        CellQuality::Present
    }
}

pub fn display_value(value: Option<&CellValue>) -> String {
    match value {
        Some(value) if value.is_present() => value.to_string(),
        _ => EMPTY_CELL_SENTINEL.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct RenderRow {
    /// 1-based, follows source order.
    pub id: usize,
    pub source_index: usize,
    pub values: Row,
}

#[derive(Debug, Clone)]
pub struct RenderColumn {
    pub name: String,
    missing: HashSet<usize>,
    placeholder: HashSet<usize>,
}

impl RenderColumn {
    fn from_analysis(analysis: &Analysis, name: &str) -> Self {
        Self {
            name: name.to_string(),
            missing: analysis.missing_positions.get(name).cloned().unwrap_or_default(),
            placeholder: analysis.tbd_positions.get(name).cloned().unwrap_or_default(),
        }
    }

    pub fn classify(&self, row_index: usize) -> CellQuality {
        if self.placeholder.contains(&row_index) {
            CellQuality::Placeholder
        } else if self.missing.contains(&row_index) {
            CellQuality::Missing
        } else {
            CellQuality::Present
        }
    }

    pub fn render_cell(&self, row: &RenderRow) -> RenderedCell {
        let value = row.values.get(&self.name);
        let quality = self.classify(row.source_index);
        RenderedCell {
            column: self.name.clone(),
            value: value.cloned(),
            display: display_value(value),
            quality,
            style: quality.style(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedCell {
    pub column: String,
    pub value: Option<CellValue>,
    pub display: String,
    pub quality: CellQuality,
    pub style: CellStyle,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedRow {
    pub id: usize,
    pub cells: Vec<RenderedCell>,
}

/// Columns and rows derived from one analysis. Rebuilt, never patched.
#[derive(Debug, Clone, Default)]
pub struct AnnotatedGrid {
    columns: Vec<RenderColumn>,
    rows: Vec<RenderRow>,
}

impl AnnotatedGrid {
    pub fn columns(&self) -> &[RenderColumn] {
        &self.columns
    }

    pub fn rows(&self) -> &[RenderRow] {
        &self.rows
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Renders the rows in `start..end`, clamped to the grid.
    pub fn render_range(&self, start: usize, end: usize) -> Vec<RenderedRow> {
        let end = end.min(self.rows.len());
        let start = start.min(end);
        self.rows[start..end]
            .iter()
            .map(|row| RenderedRow {
                id: row.id,
                cells: self.columns.iter().map(|column| column.render_cell(row)).collect(),
            })
            .collect()
    }
}

pub fn annotate(analysis: &Analysis) -> AnnotatedGrid {
    let columns = analysis
        .columns
        .iter()
        .map(|name| RenderColumn::from_analysis(analysis, name))
        .collect();

    let rows = analysis
        .data
        .par_iter()
        .enumerate()
        .map(|(index, values)| RenderRow {
            id: index + 1,
            source_index: index,
            values: values.clone(),
        })
        .collect();

    AnnotatedGrid { columns, rows }
}

/// Shared handle used by the controller so snapshots stay cheap.
pub fn annotate_shared(analysis: &Analysis) -> Arc<AnnotatedGrid> {
    let start = std::time::Instant::now();
    let grid = annotate(analysis);
    tracing::debug!(
        "Annotated {} rows x {} columns in {:?}",
        grid.rows.len(),
        grid.columns.len(),
        start.elapsed()
    );
    Arc::new(grid)
}
