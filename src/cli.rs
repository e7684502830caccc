use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about = "Explore CSV and spreadsheet data: typed preview, statistics, correlation and charts", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show a page of the parsed table with inferred cell types applied
    Preview(PreviewArgs),
    /// List the sheets of a spreadsheet and preview the raw rows of one sheet
    Sheets(SheetsArgs),
    /// Produce descriptive statistics for every numeric column
    Stats(StatsArgs),
    /// Compute the Pearson correlation and trend segment of two numeric columns
    Correlate(CorrelateArgs),
    /// Emit chart-ready JSON for a bar, pie, line or scatter view
    Chart(ChartArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum InputFormat {
    Csv,
    Tsv,
    Xlsx,
}

/// Options shared by every command that loads a table.
#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// Input file (`-` reads delimited text from stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Input format (detected from the file extension when omitted)
    #[arg(long = "format")]
    pub format: Option<InputFormat>,
    /// Delimiter for text input (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of text input (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Spreadsheet sheet to read (defaults to the first sheet)
    #[arg(long)]
    pub sheet: Option<String>,
    /// Zero-based spreadsheet row holding the column headers
    #[arg(long = "header-row", default_value_t = 0)]
    pub header_row: usize,
    /// Restrict and reorder the table to this comma-separated list of columns
    #[arg(short = 'C', long = "columns", value_delimiter = ',')]
    pub columns: Vec<String>,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Index of the first row to show
    #[arg(long, default_value_t = 0)]
    pub offset: usize,
    /// Number of rows to show
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
}

#[derive(Debug, Args)]
pub struct SheetsArgs {
    /// Spreadsheet file to inspect
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Sheet to preview (defaults to the first sheet)
    #[arg(long)]
    pub sheet: Option<String>,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct CorrelateArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Column used as x
    #[arg(long)]
    pub x: String,
    /// Column used as y
    #[arg(long)]
    pub y: String,
    /// Emit JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum ChartKind {
    Bar,
    Pie,
    Line,
    Scatter,
}

#[derive(Debug, Args)]
pub struct ChartArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Chart view to build
    #[arg(long, default_value = "bar")]
    pub kind: ChartKind,
    /// Category (or x) column; defaults to the first header
    #[arg(long)]
    pub category: Option<String>,
    /// Value (or y) column; defaults to the first other header
    #[arg(long)]
    pub value: Option<String>,
}

fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "," | "comma" => Ok(b','),
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        ";" | "semicolon" => Ok(b';'),
        "|" | "pipe" => Ok(b'|'),
        other if other.len() == 1 && other.is_ascii() => Ok(other.as_bytes()[0]),
        other => Err(format!("Unsupported delimiter '{other}'")),
    }
}
