#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use csv_insight::{TypedTable, parser};
use tempfile::{TempDir, tempdir};

/// Returns the absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Parses a comma-separated fixture from `tests/data`.
pub fn load_fixture(name: &str) -> TypedTable {
    let text = std::fs::read_to_string(fixture_path(name)).expect("read fixture");
    parser::parse_delimited(&text).expect("parse fixture")
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes a real `.xlsx` workbook holding `sheets` in order and returns its path.
    pub fn write_workbook(&self, name: &str, sheets: &[(&str, &[&[&str]])]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, workbook_bytes(sheets)).expect("write workbook");
        path
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

/// Serializes `sheets` to `.xlsx` bytes. Number-like cells become numeric
/// cells; empty strings stay unset.
pub fn workbook_bytes(sheets: &[(&str, &[&[&str]])]) -> Vec<u8> {
    let mut book = umya_spreadsheet::new_file_empty_worksheet();
    for (name, rows) in sheets {
        let sheet = book.new_sheet(*name).expect("new sheet");
        for (row_idx, row) in rows.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                if cell.is_empty() {
                    continue;
                }
                let target = sheet.get_cell_mut((col_idx as u32 + 1, row_idx as u32 + 1));
                match cell.parse::<f64>() {
                    Ok(number) => target.set_value_number(number),
                    Err(_) => target.set_value(*cell),
                };
            }
        }
    }
    let mut buf = Vec::new();
    umya_spreadsheet::writer::xlsx::write_writer(&book, &mut buf).expect("write workbook");
    buf
}
