use std::collections::{BTreeMap, HashMap};

use csv::{ReaderBuilder, StringRecord};
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::ErrorKind;

/// Column that carries the student identifier in every upload.
pub const IDENTIFIER_COLUMN: &str = "MATRICULA";

/// Wire form of the rows: matricula -> header -> raw cell value.
pub type RowPayload = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRow {
    pub matricula: String,
    pub values: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    TooFewFields { expected: usize, found: usize },
    TooManyFields { expected: usize, found: usize },
    BlankIdentifier,
    DuplicateIdentifier(String),
    DuplicateHeader(String),
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: u64,
    pub kind: DiagnosticKind,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedTable {
    /// Header names in source order, identifier column included. Always
    /// `Some` for tables returned by [`parse`], which rejects text without a
    /// header row; `None` only for tables built by hand.
    pub headers: Option<Vec<String>>,
    pub rows: Vec<StudentRow>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParsedTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, matricula: &str) -> Option<&StudentRow> {
        self.rows.iter().find(|r| r.matricula == matricula)
    }

    /// Headers with the identifier column left out.
    pub fn value_headers(&self) -> Vec<String> {
        self.headers
            .iter()
            .flatten()
            .filter(|h| h.as_str() != IDENTIFIER_COLUMN)
            .cloned()
            .collect()
    }

    pub fn payload(&self) -> RowPayload {
        self.rows
            .iter()
            .map(|r| (r.matricula.clone(), r.values.clone()))
            .collect()
    }
}

pub fn rows_from_payload(payload: RowPayload) -> Vec<StudentRow> {
    payload
        .into_iter()
        .map(|(matricula, values)| StudentRow { matricula, values })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CsvError {
    #[error("CSV has no header row")]
    NoHeaderRow,
    #[error("CSV does not contain `MATRICULA`.")]
    MissingIdentifierColumn,
    #[error("CSV has no data rows")]
    NoDataRows,
}

impl CsvError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CsvError::MissingIdentifierColumn => ErrorKind::SchemaMismatch,
            CsvError::NoHeaderRow | CsvError::NoDataRows => ErrorKind::InputAbsent,
        }
    }
}

fn normalize_header(raw: &str, first: bool) -> String {
    if first {
        raw.trim_start_matches('\u{feff}').to_string()
    } else {
        raw.to_string()
    }
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|cell| cell.trim().is_empty())
}

/// Parses an upload into rows keyed by `MATRICULA`.
///
/// Line-level problems are recorded in `diagnostics` and never abort the
/// parse. An error is returned only when nothing usable is left.
pub fn parse(text: &str) -> Result<ParsedTable, CsvError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    let header_record = match reader.headers() {
        Ok(h) => h.clone(),
        Err(e) => {
            warn!(error = %e, "csv header row unreadable");
            return Err(CsvError::NoHeaderRow);
        }
    };
    if header_record.is_empty() || is_blank(&header_record) {
        return Err(CsvError::NoHeaderRow);
    }

    let headers: Vec<String> = header_record
        .iter()
        .enumerate()
        .map(|(i, h)| normalize_header(h, i == 0))
        .collect();

    for (i, h) in headers.iter().enumerate() {
        if headers[..i].contains(h) {
            diagnostics.push(Diagnostic {
                line: 1,
                kind: DiagnosticKind::DuplicateHeader(h.clone()),
            });
        }
    }

    let Some(id_pos) = headers.iter().position(|h| h == IDENTIFIER_COLUMN) else {
        debug!(?headers, "identifier column absent");
        return Err(CsvError::MissingIdentifierColumn);
    };

    let mut rows: Vec<StudentRow> = Vec::new();
    let mut by_id: HashMap<String, usize> = HashMap::new();

    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                diagnostics.push(Diagnostic {
                    line,
                    kind: DiagnosticKind::Malformed(e.to_string()),
                });
                continue;
            }
        };
        if is_blank(&record) {
            continue;
        }
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.len() < headers.len() {
            diagnostics.push(Diagnostic {
                line,
                kind: DiagnosticKind::TooFewFields {
                    expected: headers.len(),
                    found: record.len(),
                },
            });
        } else if record.len() > headers.len() {
            diagnostics.push(Diagnostic {
                line,
                kind: DiagnosticKind::TooManyFields {
                    expected: headers.len(),
                    found: record.len(),
                },
            });
        }

        let matricula = record.get(id_pos).unwrap_or("").trim().to_string();
        if matricula.is_empty() {
            diagnostics.push(Diagnostic {
                line,
                kind: DiagnosticKind::BlankIdentifier,
            });
            continue;
        }

        let values: BTreeMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .enumerate()
            .filter(|(i, _)| *i != id_pos)
            .map(|(_, (h, v))| (h.clone(), v.to_string()))
            .collect();

        match by_id.get(&matricula) {
            Some(&idx) => {
                diagnostics.push(Diagnostic {
                    line,
                    kind: DiagnosticKind::DuplicateIdentifier(matricula.clone()),
                });
                rows[idx].values = values;
            }
            None => {
                by_id.insert(matricula.clone(), rows.len());
                rows.push(StudentRow { matricula, values });
            }
        }
    }

    for d in &diagnostics {
        warn!(line = d.line, kind = ?d.kind, "csv parse diagnostic");
    }

    if rows.is_empty() {
        return Err(CsvError::NoDataRows);
    }

    debug!(rows = rows.len(), headers = headers.len(), "csv parsed");
    Ok(ParsedTable {
        headers: Some(headers),
        rows,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keys_rows_by_matricula() {
        let t = parse("MATRICULA,AV1,AV2\n123,8.5,9.0\n456,7.0,6.5").expect("parse");
        assert_eq!(
            t.headers.as_deref(),
            Some(&["MATRICULA".to_string(), "AV1".into(), "AV2".into()][..])
        );
        assert_eq!(t.row_count(), 2);
        let r = t.row("123").expect("row 123");
        assert_eq!(r.values.get("AV1").map(String::as_str), Some("8.5"));
        assert!(!r.values.contains_key(IDENTIFIER_COLUMN));
        assert!(t.diagnostics.is_empty());
    }

    #[test]
    fn identifier_column_may_be_anywhere() {
        let t = parse("AV1,MATRICULA\n10,123\n").expect("parse");
        assert_eq!(t.row("123").unwrap().values.get("AV1").unwrap(), "10");
        assert_eq!(t.value_headers(), vec!["AV1".to_string()]);
    }

    #[test]
    fn empty_lines_are_skipped() {
        let t = parse("MATRICULA,AV1\n\n123,1\n\n\n456,2\n,\n").expect("parse");
        assert_eq!(t.row_count(), 2);
    }

    #[test]
    fn duplicate_identifier_keeps_last_values_at_first_position() {
        let t = parse("MATRICULA,AV1\n123,1\n456,2\n123,3").expect("parse");
        assert_eq!(t.row_count(), 2);
        assert_eq!(t.rows[0].matricula, "123");
        assert_eq!(t.rows[0].values.get("AV1").unwrap(), "3");
        assert!(t
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::DuplicateIdentifier("123".into())));
    }

    #[test]
    fn ragged_rows_are_kept_and_reported() {
        let t = parse("MATRICULA,AV1,AV2\n123,1\n456,2,3,4").expect("parse");
        assert_eq!(t.row_count(), 2);
        assert_eq!(t.row("123").unwrap().values.len(), 1);
        assert_eq!(t.row("456").unwrap().values.len(), 2);
        assert_eq!(t.diagnostics.len(), 2);
        assert_eq!(t.diagnostics[0].line, 2);
    }

    #[test]
    fn blank_identifier_rows_are_skipped() {
        let t = parse("MATRICULA,AV1\n,5\n123,6").expect("parse");
        assert_eq!(t.row_count(), 1);
        assert_eq!(t.diagnostics[0].kind, DiagnosticKind::BlankIdentifier);
    }

    #[test]
    fn leading_bom_is_stripped() {
        let t = parse("\u{feff}MATRICULA,FREQ\n123,95").expect("parse");
        assert_eq!(t.headers.unwrap()[0], "MATRICULA");
    }

    #[test]
    fn empty_result_conditions() {
        assert_eq!(parse("").unwrap_err(), CsvError::NoHeaderRow);
        assert_eq!(parse("MATRICULA,AV1\n").unwrap_err(), CsvError::NoDataRows);
        assert_eq!(
            parse("ID,AV1\n1,2").unwrap_err(),
            CsvError::MissingIdentifierColumn
        );
        assert_eq!(
            CsvError::MissingIdentifierColumn.kind(),
            ErrorKind::SchemaMismatch
        );
        assert_eq!(CsvError::NoDataRows.kind(), ErrorKind::InputAbsent);
    }

    #[test]
    fn payload_round_trips_rows() {
        let t = parse("MATRICULA,AV1\n123,1\n456,2").expect("parse");
        let rows = rows_from_payload(t.payload());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].matricula, "456");
    }
}
