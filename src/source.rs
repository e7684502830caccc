//! Turns command-line input options into a [`TypedTable`].

use anyhow::{Context, Result};
use log::{debug, warn};

use crate::{
    cli::{InputArgs, InputFormat},
    io_utils,
    parser::{self, ParseOptions},
    table::TypedTable,
    workbook::{self, SelectionMemory, SheetSelection},
};

/// Loads the table described by `args`, applying the sheet, header row and
/// column selection.
pub fn load_table(args: &InputArgs) -> Result<TypedTable> {
    let mut memory = SelectionMemory::new();
    load_table_with_memory(args, &mut memory)
}

/// As [`load_table`], recording the spreadsheet selection in `memory` under
/// the input's file name. Options left unset on the command line fall back to
/// what `memory` holds for that file.
pub fn load_table_with_memory(args: &InputArgs, memory: &mut SelectionMemory) -> Result<TypedTable> {
    let (table, projected) = load_projected(args, memory)?;
    let mixed = table.columns_with_text(&projected);
    if !mixed.is_empty() {
        warn!(
            "Selected column(s) {} contain non-numeric values; they are skipped by numeric summaries",
            mixed.join(", ")
        );
    }
    Ok(table)
}

/// The loaded table together with the column subset actually applied to it,
/// which for a workbook may come from `memory` rather than `args`.
fn load_projected(
    args: &InputArgs,
    memory: &mut SelectionMemory,
) -> Result<(TypedTable, Vec<String>)> {
    let format = io_utils::resolve_format(&args.input, args.format);
    let bytes = io_utils::read_input(&args.input)?;
    debug!("Read {} byte(s) from {:?} as {:?}", bytes.len(), args.input, format);

    match format {
        InputFormat::Xlsx => {
            let file_name = io_utils::file_name(&args.input);
            let requested = explicit_selection(args);
            let selection = memory.resolve(&file_name, requested.as_ref());
            let load = workbook::load_sheet(&bytes, &selection)
                .with_context(|| format!("Reading workbook {:?}", args.input))?;
            let projected = selection.selected_columns.clone();
            memory.remember(
                file_name,
                SheetSelection {
                    sheet_name: load.sheet_name.clone(),
                    ..selection
                },
            );
            Ok((load.table, projected))
        }
        InputFormat::Csv | InputFormat::Tsv => {
            let options = ParseOptions {
                delimiter: io_utils::resolve_delimiter(format, args.delimiter),
                encoding: io_utils::resolve_encoding(args.input_encoding.as_deref())?,
            };
            let table = parser::parse_delimited_bytes(&bytes, options)
                .with_context(|| format!("Parsing {:?}", args.input))?
                .project(&args.columns);
            Ok((table, args.columns.clone()))
        }
    }
}

fn explicit_selection(args: &InputArgs) -> Option<SheetSelection> {
    let untouched = args.sheet.is_none() && args.header_row == 0 && args.columns.is_empty();
    if untouched {
        return None;
    }
    Some(
        SheetSelection::sheet(args.sheet.clone().unwrap_or_default())
            .with_header_row(args.header_row)
            .with_columns(args.columns.clone()),
    )
}
