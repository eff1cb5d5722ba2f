//! Error taxonomy shared by the parser, the filler and both sides of the
//! channel.

use serde::Serialize;
use thiserror::Error;

use crate::csv_table::CsvError;
use crate::fill::FillError;
use crate::headers::SchemaMismatch;
use crate::page::PageError;
use crate::transport::TransportError;

/// Coarse category every user-facing failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No CSV selected, or the CSV yields no usable rows/headers.
    InputAbsent,
    /// Identifier column missing, or header sets differ.
    SchemaMismatch,
    /// The live page lacks the expected markers.
    PageMismatch,
    /// Some rows could not be written.
    PartialResolution,
    /// The request never got an answer.
    TransportFailure,
    /// Malformed data shape or any other unexpected condition.
    Unexpected,
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("Please select a CSV file first.")]
    NoFileSelected,
    #[error("CSV is empty or could not be parsed.")]
    EmptyCsv(#[source] CsvError),
    #[error("There is no available parsed CSV data for filling the form.")]
    NothingToFill,
    #[error("{0}")]
    Csv(CsvError),
    #[error("{0}")]
    Schema(#[from] SchemaMismatch),
    #[error("This page is not a supported grade or frequency form, check URL and try again")]
    UnsupportedUrl(String),
    #[error("Form headers are not loaded yet, refresh the page and try again")]
    HeadersNotLoaded,
    #[error("{0}")]
    Page(#[from] PageError),
    #[error("Refresh the page and try again.")]
    Transport(#[from] TransportError),
    #[error("[filler] {0}")]
    Fill(#[from] FillError),
}

impl From<CsvError> for FormError {
    fn from(e: CsvError) -> Self {
        match e {
            CsvError::MissingIdentifierColumn => FormError::Csv(e),
            CsvError::NoHeaderRow | CsvError::NoDataRows => FormError::EmptyCsv(e),
        }
    }
}

impl FormError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FormError::NoFileSelected | FormError::EmptyCsv(_) | FormError::NothingToFill => {
                ErrorKind::InputAbsent
            }
            FormError::Csv(e) => e.kind(),
            FormError::Schema(_) => ErrorKind::SchemaMismatch,
            FormError::UnsupportedUrl(_) | FormError::HeadersNotLoaded => ErrorKind::PageMismatch,
            FormError::Page(e) => e.kind(),
            FormError::Transport(_) => ErrorKind::TransportFailure,
            FormError::Fill(_) => ErrorKind::Unexpected,
        }
    }
}
