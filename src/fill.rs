use std::collections::BTreeSet;

use thiserror::Error;
use tracing::{debug, info, info_span};

use crate::csv_table::StudentRow;
use crate::field::{self, FieldKey};
use crate::headers::FREQUENCY_COLUMN;
use crate::page::Page;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillOutcome {
    pub filled: usize,
    pub missing: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FillError {
    #[error("row {0} has no FREQ value")]
    MissingFrequency(String),
    #[error("malformed row data: {0}")]
    Payload(String),
}

/// The destination form writes decimals with a comma.
pub fn localize_decimal(raw: &str) -> String {
    raw.replace('.', ",")
}

/// Writes every grade the page recognizes.
///
/// Headers absent from the page's header bar are skipped. A row is counted
/// only when all of its recognized headers landed in writable fields; a row
/// that misses one is reported missing, and the values already written for
/// it stay written.
pub fn fill_grades<P>(page: &mut P, rows: &[StudentRow]) -> FillOutcome
where
    P: Page + ?Sized,
{
    let _span = info_span!("fill_grades", rows = rows.len()).entered();
    let index = page.discover_headers();
    let mut outcome = FillOutcome::default();

    for row in rows {
        let mut complete = true;
        for (header, raw) in &row.values {
            let Some(position) = index.position(header) else {
                continue;
            };
            let key = FieldKey::grade(&row.matricula, position);
            match field::resolve(page, &key) {
                Some(f) => f.write(localize_decimal(raw)),
                None => {
                    debug!(field = %key, "grade field absent or disabled");
                    complete = false;
                    outcome.missing.insert(row.matricula.clone());
                }
            }
        }
        if complete {
            outcome.filled += 1;
        }
    }

    info!(
        filled = outcome.filled,
        missing = outcome.missing.len(),
        "grade form filled"
    );
    outcome
}

/// Writes the single `FREQ` value of each row, unmodified.
pub fn fill_frequency<P>(page: &mut P, rows: &[StudentRow]) -> Result<FillOutcome, FillError>
where
    P: Page + ?Sized,
{
    let _span = info_span!("fill_frequency", rows = rows.len()).entered();
    let mut outcome = FillOutcome::default();

    let mut values = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(value) = row.values.get(FREQUENCY_COLUMN) else {
            return Err(FillError::MissingFrequency(row.matricula.clone()));
        };
        values.push((row, value));
    }

    for (row, value) in values {
        let key = FieldKey::frequency(&row.matricula);
        match field::resolve(page, &key) {
            Some(f) => {
                f.write(value.as_str());
                outcome.filled += 1;
            }
            None => {
                debug!(field = %key, "frequency field absent or disabled");
                outcome.missing.insert(row.matricula.clone());
            }
        }
    }

    info!(
        filled = outcome.filled,
        missing = outcome.missing.len(),
        "frequency form filled"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_table::parse;
    use crate::page::{Document, FormField};

    fn grade_page(matriculas: &[&str], labels: &[&str]) -> Document {
        let mut doc = Document::new();
        doc.push_active_tab("Lançamento de Notas");
        for l in labels {
            doc.push_header(*l);
        }
        for m in matriculas {
            for pos in 0..labels.len() {
                doc.push_field(FormField::with_id(format!("@{m}_{pos}")));
            }
        }
        doc
    }

    #[test]
    fn decimal_point_becomes_comma() {
        assert_eq!(localize_decimal("8.5"), "8,5");
        assert_eq!(localize_decimal("8,5"), "8,5");
        assert_eq!(localize_decimal("1.000.5"), "1,000,5");
    }

    #[test]
    fn fills_every_row_when_page_has_all_fields() {
        let t = parse("MATRICULA,AV1,AV2\n123,8.5,9.0\n456,7.0,6.5").unwrap();
        let mut doc = grade_page(&["123", "456"], &["AV1", "AV2"]);
        let out = fill_grades(&mut doc, &t.rows);
        assert_eq!(out.filled, 2);
        assert!(out.missing.is_empty());
        assert_eq!(doc.value_of("@123_0"), Some("8,5"));
        assert_eq!(doc.value_of("@456_1"), Some("6,5"));
    }

    #[test]
    fn positions_follow_page_order_not_csv_order() {
        let t = parse("MATRICULA,AV2,AV1\n123,2,1").unwrap();
        let mut doc = grade_page(&["123"], &["AV1", "AV2"]);
        fill_grades(&mut doc, &t.rows);
        assert_eq!(doc.value_of("@123_0"), Some("1"));
        assert_eq!(doc.value_of("@123_1"), Some("2"));
    }

    #[test]
    fn one_disabled_field_marks_row_missing_but_keeps_writes() {
        let t = parse("MATRICULA,AV1,AV2,AV3\n123,1,2,3").unwrap();
        let mut doc = Document::new();
        doc.push_header("AV1").push_header("AV2").push_header("AV3");
        doc.push_field(FormField::with_id("@123_0"))
            .push_field(FormField::with_id("@123_1").disabled())
            .push_field(FormField::with_id("@123_2"));

        let out = fill_grades(&mut doc, &t.rows);
        assert_eq!(out.filled, 0);
        assert!(out.missing.contains("123"));
        assert_eq!(doc.written_count(), 2);
        assert_eq!(doc.value_of("@123_2"), Some("3"));
    }

    #[test]
    fn headers_unknown_to_page_are_skipped_silently() {
        let t = parse("MATRICULA,AV1,EXTRA\n123,1,x").unwrap();
        let mut doc = grade_page(&["123"], &["AV1"]);
        let out = fill_grades(&mut doc, &t.rows);
        assert_eq!(out.filled, 1);
        assert!(out.missing.is_empty());
        assert_eq!(doc.written_count(), 1);
    }

    #[test]
    fn frequency_values_are_written_unmodified() {
        let t = parse("MATRICULA,FREQ\n123,9.5\n456,80").unwrap();
        let mut doc = Document::new();
        doc.push_field(FormField::with_name("@123"))
            .push_field(FormField::with_name("@456").disabled());
        let out = fill_frequency(&mut doc, &t.rows).expect("fill");
        assert_eq!(out.filled, 1);
        assert_eq!(out.missing.len(), 1);
        assert_eq!(doc.value_of_name("@123"), Some("9.5"));
        assert_eq!(doc.value_of_name("@456"), Some(""));
    }

    #[test]
    fn frequency_row_without_value_is_structural_error() {
        let rows = vec![StudentRow {
            matricula: "123".into(),
            values: Default::default(),
        }];
        let mut doc = Document::new();
        let err = fill_frequency(&mut doc, &rows).unwrap_err();
        assert_eq!(err, FillError::MissingFrequency("123".into()));
    }

    #[test]
    fn missing_frequency_in_a_later_row_leaves_the_page_untouched() {
        let mut first = StudentRow {
            matricula: "100".into(),
            values: Default::default(),
        };
        first.values.insert(FREQUENCY_COLUMN.to_string(), "3".to_string());
        let rows = vec![
            first,
            StudentRow {
                matricula: "200".into(),
                values: Default::default(),
            },
        ];
        let mut doc = Document::new();
        doc.push_field(FormField::with_name("@100"))
            .push_field(FormField::with_name("@200"));

        let err = fill_frequency(&mut doc, &rows).unwrap_err();
        assert_eq!(err, FillError::MissingFrequency("200".into()));
        assert_eq!(doc.written_count(), 0);
        assert_eq!(doc.value_of_name("@100"), Some(""));
    }
}
