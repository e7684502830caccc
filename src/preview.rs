use anyhow::{Context, Result, anyhow};
use log::info;

use crate::{
    cli::{PreviewArgs, SheetsArgs},
    io_utils, render, source,
    workbook::{self, PREVIEW_ROWS, SheetSelection},
};

pub fn execute(args: &PreviewArgs) -> Result<()> {
    let table = source::load_table(&args.input)
        .with_context(|| format!("Loading {:?}", args.input.input))?;
    let page = table.page(args.offset, args.rows);
    render::print_table(&table.headers, &table.display_rows(page));
    info!(
        "Displayed {} of {} row(s) from {:?}",
        page.len(),
        table.row_count(),
        args.input.input
    );
    Ok(())
}

pub fn execute_sheets(args: &SheetsArgs) -> Result<()> {
    if io_utils::is_dash(&args.input) {
        return Err(anyhow!("Sheet listing requires a spreadsheet file, not stdin"));
    }
    let bytes = io_utils::read_input(&args.input)?;
    let selection = SheetSelection::sheet(args.sheet.clone().unwrap_or_default());
    let load = workbook::load_sheet(&bytes, &selection)
        .with_context(|| format!("Reading workbook {:?}", args.input))?;

    println!("Sheets:");
    for name in &load.sheet_names {
        let marker = if *name == load.sheet_name { "*" } else { " " };
        println!("{marker} {name}");
    }
    println!();

    let preview = load.grid.preview(PREVIEW_ROWS);
    let width = preview.iter().map(Vec::len).max().unwrap_or(0);
    let headers = (0..width).map(|idx| format!("col{}", idx + 1)).collect::<Vec<_>>();
    let rows = preview
        .iter()
        .map(|cells| {
            let mut cells = cells.clone();
            cells.resize(width, String::new());
            cells
        })
        .collect::<Vec<_>>();
    render::print_table(&headers, &rows);

    let candidates = load
        .grid
        .header_row_candidates()
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>();
    println!("Header row candidates: {}", candidates.join(", "));
    info!(
        "Listed {} sheet(s) from {:?}; previewed {} row(s) of '{}'",
        load.sheet_names.len(),
        args.input,
        preview.len(),
        load.sheet_name
    );
    Ok(())
}
