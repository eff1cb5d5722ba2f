//! Fills the Diário de Classe grade and attendance forms from a CSV export.
//!
//! The popup side (`session`) parses and gates the upload; the page side
//! (`ipc`, served by the `diariofill` sidecar) writes the values into the
//! live form and reports how many rows landed.

pub mod csv_table;
pub mod error;
pub mod field;
pub mod fill;
pub mod headers;
pub mod ipc;
pub mod logging;
pub mod outcome;
pub mod page;
pub mod session;
pub mod settings;
pub mod transport;

pub use csv_table::{parse, ParsedTable, StudentRow, IDENTIFIER_COLUMN};
pub use error::{ErrorKind, FormError};
pub use fill::{fill_frequency, fill_grades, FillOutcome};
pub use headers::{reconcile, FormMode, HeaderIndex};
pub use outcome::Report;
pub use page::{Document, FormField, Page};
