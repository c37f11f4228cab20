//! Delimited-text parsing into header-keyed records.

use crate::error::ParseError;
use crate::models::{Record, Table};
use csv::ReaderBuilder;

/// Decode `bytes` as UTF-8 and parse them as CSV with a header row.
pub fn parse_bytes(bytes: &[u8]) -> Result<Table, ParseError> {
    let text = std::str::from_utf8(bytes)?;
    parse_str(text)
}

/// Parse CSV text with a header row.
///
/// Short rows are padded with empty values and fields past the header are
/// dropped, so ragged rows never abort the dataset.
pub fn parse_str(text: &str) -> Result<Table, ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    // flexible reader over valid UTF-8: only a reader failure can surface here
    for result in rdr.records() {
        let raw = result?;
        let record: Record = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.as_str(), raw.get(i).unwrap_or("")))
            .collect();
        rows.push(record);
    }
    Ok(Table::new(headers, rows))
}
