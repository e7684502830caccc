//! Spreadsheet protocol of the table parser.
//!
//! A workbook buffer is opened with `calamine`, the selected sheet is flattened
//! into a [`SheetGrid`] of raw cell texts, and the grid is turned into a
//! [`TypedTable`] using the header row and column subset of a
//! [`SheetSelection`]. Any change of sheet, header row or columns means a
//! fresh call; nothing is patched incrementally.

use std::{collections::HashMap, io::Cursor};

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use log::{debug, info};
use serde::Serialize;

use crate::{
    data::normalize_cell,
    error::{AnalysisError, Result},
    table::{Row, TypedTable},
};

pub const PREVIEW_ROWS: usize = 10;
pub const MAX_HEADER_ROW_CANDIDATES: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SheetSelection {
    /// Empty selects the first sheet of the workbook.
    pub sheet_name: String,
    pub header_row_index: usize,
    /// Subset and order of parsed headers to keep; empty keeps all of them.
    pub selected_columns: Vec<String>,
}

impl SheetSelection {
    pub fn sheet(name: impl Into<String>) -> Self {
        Self {
            sheet_name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_header_row(mut self, index: usize) -> Self {
        self.header_row_index = index;
        self
    }

    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.selected_columns = columns;
        self
    }
}

/// Raw text cells of one sheet, row-major.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SheetGrid {
    pub cells: Vec<Vec<String>>,
}

impl SheetGrid {
    pub fn new(cells: Vec<Vec<String>>) -> Self {
        Self { cells }
    }

    pub fn row_count(&self) -> usize {
        self.cells.len()
    }

    pub fn preview(&self, limit: usize) -> &[Vec<String>] {
        &self.cells[..limit.min(self.cells.len())]
    }

    /// Grid row indices offered as header row choices.
    pub fn header_row_candidates(&self) -> Vec<usize> {
        let preview_len = self.cells.len().min(PREVIEW_ROWS);
        (0..preview_len.min(MAX_HEADER_ROW_CANDIDATES)).collect()
    }

    /// Builds a typed table from the grid.
    ///
    /// Header names are the trimmed cells of `header_row_index`. Data rows are
    /// the rows after it holding at least one non-blank cell. A header row past
    /// the end of the grid yields an empty table.
    pub fn to_table(&self, header_row_index: usize, selected_columns: &[String]) -> TypedTable {
        let Some(header_cells) = self.cells.get(header_row_index) else {
            debug!(
                "Header row {header_row_index} is outside a grid of {} row(s)",
                self.cells.len()
            );
            return TypedTable::default();
        };
        let headers = header_cells
            .iter()
            .map(|cell| cell.trim().to_string())
            .collect::<Vec<_>>();

        let rows = self.cells[header_row_index + 1..]
            .iter()
            .filter(|cells| cells.iter().any(|cell| !cell.trim().is_empty()))
            .map(|cells| {
                headers
                    .iter()
                    .enumerate()
                    .map(|(idx, header)| {
                        let raw = cells.get(idx).map(String::as_str).unwrap_or("");
                        (header.clone(), normalize_cell(raw))
                    })
                    .collect::<Row>()
            })
            .collect::<Vec<_>>();

        TypedTable::new(headers, rows).project(selected_columns)
    }
}

/// Result of one spreadsheet parse.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetLoad {
    pub sheet_names: Vec<String>,
    pub sheet_name: String,
    pub grid: SheetGrid,
    pub table: TypedTable,
}

pub fn sheet_names(bytes: &[u8]) -> Result<Vec<String>> {
    let workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    Ok(workbook.sheet_names())
}

/// Parses a workbook buffer according to `selection`.
pub fn load_sheet(bytes: &[u8], selection: &SheetSelection) -> Result<SheetLoad> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let sheet_names = workbook.sheet_names();
    let sheet_name = if selection.sheet_name.is_empty() {
        match sheet_names.first() {
            Some(first) => first.clone(),
            None => {
                return Ok(SheetLoad {
                    sheet_names,
                    sheet_name: String::new(),
                    grid: SheetGrid::default(),
                    table: TypedTable::default(),
                });
            }
        }
    } else if sheet_names.contains(&selection.sheet_name) {
        selection.sheet_name.clone()
    } else {
        return Err(AnalysisError::SheetNotFound(selection.sheet_name.clone()));
    };

    let range = workbook.worksheet_range(&sheet_name)?;
    let grid = SheetGrid::new(
        range
            .rows()
            .map(|row| row.iter().map(cell_text).collect())
            .collect(),
    );
    let table = grid.to_table(selection.header_row_index, &selection.selected_columns);
    info!(
        "Loaded sheet '{}' with {} row(s) and {} column(s)",
        sheet_name,
        table.row_count(),
        table.headers.len()
    );
    Ok(SheetLoad {
        sheet_names,
        sheet_name,
        grid,
        table,
    })
}

/// Text form of a spreadsheet cell. Dates keep their serial number.
pub fn cell_text(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}

/// Per-file sheet choices remembered for the length of an analysis session.
///
/// Owned by the caller; nothing here is global.
#[derive(Debug, Clone, Default)]
pub struct SelectionMemory {
    entries: HashMap<String, SheetSelection>,
}

impl SelectionMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remember(&mut self, file_name: impl Into<String>, selection: SheetSelection) {
        self.entries.insert(file_name.into(), selection);
    }

    pub fn recall(&self, file_name: &str) -> Option<&SheetSelection> {
        self.entries.get(file_name)
    }

    pub fn forget(&mut self, file_name: &str) -> Option<SheetSelection> {
        self.entries.remove(file_name)
    }

    /// An explicit request wins, then a remembered choice, then the defaults.
    pub fn resolve(&self, file_name: &str, requested: Option<&SheetSelection>) -> SheetSelection {
        requested
            .or_else(|| self.recall(file_name))
            .cloned()
            .unwrap_or_default()
    }
}
