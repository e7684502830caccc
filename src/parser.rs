//! Delimited-text protocol of the table parser.
//!
//! The first line is the header line. Fields are split positionally on the
//! delimiter with no quote handling, each field goes through
//! [`normalize_cell`], and blank lines are dropped. A byte order mark matching
//! the input encoding is stripped from the start of the input only. Lines with fewer fields
//! than headers get [`Value::Empty`] for the missing trailing columns; extra
//! fields beyond the header count are ignored.

use encoding_rs::{Encoding, UTF_8};
use log::debug;

use crate::{
    data::{Value, normalize_cell},
    error::{AnalysisError, Result},
    table::{Row, TypedTable},
};

pub const DEFAULT_DELIMITER: u8 = b',';

#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    pub delimiter: u8,
    pub encoding: &'static Encoding,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            encoding: UTF_8,
        }
    }
}

/// Parses comma-separated UTF-8 text.
pub fn parse_delimited(text: &str) -> Result<TypedTable> {
    parse_delimited_bytes(text.as_bytes(), ParseOptions::default())
}

pub fn parse_delimited_bytes(bytes: &[u8], options: ParseOptions) -> Result<TypedTable> {
    let bytes = strip_leading_bom(bytes, options.encoding);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(options.delimiter)
        .quoting(false)
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_reader(bytes);

    let mut records = reader.byte_records();
    let headers = match records.next() {
        Some(record) => decode_record(&record?, options.encoding)?
            .iter()
            .map(|field| field.trim().to_string())
            .collect::<Vec<_>>(),
        None => {
            debug!("Delimited input is empty");
            return Ok(TypedTable::default());
        }
    };

    let mut rows = Vec::new();
    for record in records {
        let fields = decode_record(&record?, options.encoding)?;
        if is_blank_line(&fields, options.delimiter) {
            continue;
        }
        let row = headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                let value = fields
                    .get(idx)
                    .map(|raw| normalize_cell(raw))
                    .unwrap_or(Value::Empty);
                (header.clone(), value)
            })
            .collect::<Row>();
        rows.push(row);
    }
    debug!(
        "Parsed {} row(s) across {} column(s) of delimited text",
        rows.len(),
        headers.len()
    );
    Ok(TypedTable::new(headers, rows))
}

/// True when the raw line was empty or whitespace only. With a whitespace
/// delimiter such a line splits into several blank fields.
fn is_blank_line(fields: &[String], delimiter: u8) -> bool {
    (fields.len() <= 1 || delimiter.is_ascii_whitespace())
        && fields.iter().all(|field| field.trim().is_empty())
}

fn strip_leading_bom<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> &'a [u8] {
    match Encoding::for_bom(bytes) {
        Some((bom_encoding, bom_len)) if bom_encoding == encoding => {
            debug!("Skipping {} byte order mark", encoding.name());
            &bytes[bom_len..]
        }
        _ => bytes,
    }
}

fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| {
            let (text, had_errors) = encoding.decode_without_bom_handling(field);
            if had_errors {
                Err(AnalysisError::Decode {
                    encoding: encoding.name(),
                })
            } else {
                Ok(text.into_owned())
            }
        })
        .collect()
}
