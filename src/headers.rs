use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::csv_table::IDENTIFIER_COLUMN;

/// Column the frequency form expects besides the identifier.
pub const FREQUENCY_COLUMN: &str = "FREQ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormMode {
    /// "Lançamento de Notas / Todas as Avaliações": one field per evaluation.
    Grades,
    /// "Lançamento do Total de Faltas no Semestre": one field per student.
    Frequency,
}

impl FormMode {
    fn header_noun(self) -> &'static str {
        match self {
            FormMode::Grades => "AV",
            FormMode::Frequency => "freq",
        }
    }
}

/// Page header label -> zero-based anchor position, in encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderIndex {
    entries: Vec<(String, usize)>,
}

impl HeaderIndex {
    /// A label seen twice keeps the later anchor's position, since the
    /// form numbers its fields by anchor position.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entries: Vec<(String, usize)> = Vec::new();
        for (pos, label) in labels.into_iter().enumerate() {
            let label = label.into();
            match entries.iter_mut().find(|(l, _)| *l == label) {
                Some(entry) => entry.1 = pos,
                None => entries.push((label, pos)),
            }
        }
        HeaderIndex { entries }
    }

    pub fn position(&self, label: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, pos)| *pos)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Labels joined the way the header discovery response carries them.
    pub fn joined(&self) -> String {
        self.labels().collect::<Vec<_>>().join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaMismatch {
    #[error("CSV does not contain `MATRICULA`.")]
    MissingIdentifier,
    #[error(
        "The uploaded CSV does NOT have the same columns as the {} header in the webpage.",
        .mode.header_noun()
    )]
    HeadersDiffer {
        mode: FormMode,
        only_in_csv: Vec<String>,
        only_on_page: Vec<String>,
    },
}

/// Exact, order-independent, case-sensitive set equality.
pub fn same_set<A, B>(a: &[A], b: &[B]) -> bool
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    let a: BTreeSet<&str> = a.iter().map(AsRef::as_ref).collect();
    let b: BTreeSet<&str> = b.iter().map(AsRef::as_ref).collect();
    a == b
}

/// Labels the page is expected to expose for `mode` when the page itself
/// is not asked (frequency forms have a single fixed column).
pub fn fixed_labels(mode: FormMode) -> Option<Vec<String>> {
    match mode {
        FormMode::Grades => None,
        FormMode::Frequency => Some(vec![FREQUENCY_COLUMN.to_string()]),
    }
}

/// Gate between a parsed upload and a fill: the CSV columns, identifier
/// excluded, must be exactly the page's header set.
pub fn reconcile<C, P>(mode: FormMode, csv_headers: &[C], page_labels: &[P]) -> Result<(), SchemaMismatch>
where
    C: AsRef<str>,
    P: AsRef<str>,
{
    if !csv_headers.iter().any(|h| h.as_ref() == IDENTIFIER_COLUMN) {
        return Err(SchemaMismatch::MissingIdentifier);
    }

    let values: Vec<&str> = csv_headers
        .iter()
        .map(AsRef::as_ref)
        .filter(|h| *h != IDENTIFIER_COLUMN)
        .collect();
    if same_set(&values, page_labels) {
        debug!(?mode, headers = values.len(), "headers reconciled");
        return Ok(());
    }

    let csv: BTreeSet<&str> = values.into_iter().collect();
    let page: BTreeSet<&str> = page_labels.iter().map(AsRef::as_ref).collect();

    let only_in_csv: Vec<String> = csv.difference(&page).map(|s| s.to_string()).collect();
    let only_on_page: Vec<String> = page.difference(&csv).map(|s| s.to_string()).collect();
    debug!(?mode, ?only_in_csv, ?only_on_page, "header mismatch");
    Err(SchemaMismatch::HeadersDiffer {
        mode,
        only_in_csv,
        only_on_page,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_assigns_positions_in_encounter_order() {
        let idx = HeaderIndex::from_labels(["AV1", "AV2", "AV3"]);
        assert_eq!(idx.position("AV1"), Some(0));
        assert_eq!(idx.position("AV3"), Some(2));
        assert_eq!(idx.position("AV4"), None);
        assert_eq!(idx.joined(), "AV1, AV2, AV3");
    }

    #[test]
    fn repeated_label_takes_later_position() {
        let idx = HeaderIndex::from_labels(["AV1", "AV2", "AV1"]);
        assert_eq!(idx.len(), 2);
        assert_eq!(idx.position("AV1"), Some(2));
        assert_eq!(idx.labels().collect::<Vec<_>>(), vec!["AV1", "AV2"]);
    }

    #[test]
    fn reconcile_ignores_order() {
        assert!(reconcile(FormMode::Grades, &["AV2", "MATRICULA", "AV1"], &["AV1", "AV2"]).is_ok());
    }

    #[test]
    fn reconcile_rejects_subset_and_superset() {
        assert!(reconcile(FormMode::Grades, &["MATRICULA", "AV1"], &["AV1", "AV2"]).is_err());
        assert!(
            reconcile(FormMode::Grades, &["MATRICULA", "AV1", "AV2", "AV3"], &["AV1", "AV2"]).is_err()
        );
    }

    #[test]
    fn reconcile_is_case_sensitive() {
        assert!(reconcile(FormMode::Grades, &["MATRICULA", "av1"], &["AV1"]).is_err());
    }

    #[test]
    fn reconcile_reports_both_sides_of_a_mismatch() {
        let e = reconcile(FormMode::Grades, &["MATRICULA", "AV1", "AV3"], &["AV1", "AV2"]).unwrap_err();
        assert_eq!(
            e,
            SchemaMismatch::HeadersDiffer {
                mode: FormMode::Grades,
                only_in_csv: vec!["AV3".into()],
                only_on_page: vec!["AV2".into()],
            }
        );
        assert_eq!(
            e.to_string(),
            "The uploaded CSV does NOT have the same columns as the AV header in the webpage."
        );
    }

    #[test]
    fn reconcile_requires_identifier_column() {
        let e = reconcile(FormMode::Frequency, &["FREQ"], &["FREQ"]).unwrap_err();
        assert_eq!(e, SchemaMismatch::MissingIdentifier);
    }

    #[test]
    fn frequency_form_has_fixed_labels() {
        let labels = fixed_labels(FormMode::Frequency).unwrap();
        assert!(reconcile(FormMode::Frequency, &["MATRICULA", "FREQ"], &labels).is_ok());
        let e = reconcile(FormMode::Frequency, &["MATRICULA", "FALTAS"], &labels).unwrap_err();
        assert!(e.to_string().contains("freq header"));
        assert!(fixed_labels(FormMode::Grades).is_none());
    }
}
