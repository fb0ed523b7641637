//! Decoding and delimited-text parsing for the published feeds.

use csv::{ReaderBuilder, Trim};
use encoding_rs::{UTF_8, WINDOWS_1252};
use std::collections::HashSet;

use crate::config::FeedEncoding;
use crate::error::{DashboardError, Result};
use crate::table::{Column, ColumnData, Table};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decodes raw feed bytes to text.
///
/// Latin-1 never fails. UTF-8 is strict: malformed sequences are a parse error
/// rather than being replaced.
pub fn decode(feed: &str, bytes: &[u8], encoding: FeedEncoding) -> Result<String> {
    match encoding {
        FeedEncoding::Latin1 => {
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
            Ok(text.into_owned())
        }
        FeedEncoding::Utf8 => {
            let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
            UTF_8
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| text.into_owned())
                .ok_or_else(|| DashboardError::parse(feed, "feed is not valid UTF-8"))
        }
    }
}

/// Parses delimited text with a header row into a [`Table`].
///
/// # Errors
///
/// Returns a parse error if the header is missing or repeats a name, or if
/// any record's field count differs from the header's.
pub fn parse_table(feed: &str, text: &str, delimiter: u8) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(Trim::All)
        .flexible(false)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| DashboardError::parse(feed, format!("failed to read header: {e}")))?
        .clone();

    if headers.is_empty() || headers.iter().all(str::is_empty) {
        return Err(DashboardError::parse(feed, "missing header row"));
    }

    let mut seen = HashSet::new();
    for name in headers.iter() {
        if !seen.insert(name) {
            return Err(DashboardError::parse(
                feed,
                format!("duplicate column '{name}'"),
            ));
        }
    }

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(|e| {
            DashboardError::parse(feed, format!("row {}: {e}", index + 1))
        })?;
        for (column, value) in cells.iter_mut().zip(record.iter()) {
            column.push(if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            });
        }
    }

    let columns = headers
        .iter()
        .zip(cells)
        .map(|(name, values)| Column {
            name: name.to_string(),
            data: ColumnData::infer(values),
        })
        .collect();

    Table::new(columns).ok_or_else(|| DashboardError::parse(feed, "ragged columns"))
}

/// Decodes and parses in one step.
pub fn parse_feed(feed: &str, bytes: &[u8], delimiter: u8, encoding: FeedEncoding) -> Result<Table> {
    let text = decode(feed, bytes, encoding)?;
    parse_table(feed, &text, delimiter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin1_decodes_umlauts() {
        // "Neukölln" with ö as the single byte 0xF6.
        let bytes = b"Neuk\xF6lln";
        assert_eq!(decode("t", bytes, FeedEncoding::Latin1).unwrap(), "Neukölln");
    }

    #[test]
    fn test_utf8_rejects_latin1_bytes() {
        let err = decode("t", b"Neuk\xF6lln", FeedEncoding::Utf8).unwrap_err();
        assert_eq!(err.kind(), "parse_error");
    }

    #[test]
    fn test_utf8_strips_bom() {
        let text = decode("t", b"\xEF\xBB\xBFDatum", FeedEncoding::Utf8).unwrap();
        assert_eq!(text, "Datum");
    }

    #[test]
    fn test_parse_semicolon_table_infers_types() {
        let table = parse_table(
            "t",
            "Bezirk;Fallzahl;Inzidenz\nMitte;10;1.5\nPankow;;2\n",
            b';',
        )
        .unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_names(), vec!["Bezirk", "Fallzahl", "Inzidenz"]);
        assert_eq!(
            table.column("Fallzahl").unwrap().data,
            ColumnData::Integer(vec![Some(10), None])
        );
        assert_eq!(table.column("Inzidenz").unwrap().data.type_name(), "float");
        assert_eq!(table.column("Bezirk").unwrap().data.type_name(), "text");
    }

    #[test]
    fn test_wrong_delimiter_yields_single_column() {
        let table = parse_table("t", "a;b\n1;2\n", b',').unwrap();
        assert_eq!(table.column_names(), vec!["a;b"]);
    }

    #[test]
    fn test_ragged_row_is_parse_error() {
        let err = parse_table("t", "a;b\n1;2;3\n", b';').unwrap_err();
        assert_eq!(err.kind(), "parse_error");
    }

    #[test]
    fn test_duplicate_header_is_parse_error() {
        let err = parse_table("t", "a;a\n1;2\n", b';').unwrap_err();
        assert!(err.to_string().contains("duplicate column"));
    }

    #[test]
    fn test_empty_input_is_parse_error() {
        assert!(parse_table("t", "", b';').is_err());
    }
}
