pub mod core;
pub mod frequency;
pub mod grades;

use serde_json::json;

use crate::csv_table::{rows_from_payload, RowPayload, StudentRow};
use crate::fill::{FillError, FillOutcome};
use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::types::Request;
use crate::outcome::Report;

pub(super) fn no_page() -> HandlerErr {
    HandlerErr::new("no_page", "No page loaded, refresh the page and try again")
}

pub(super) fn page_mismatch(message: impl Into<String>) -> HandlerErr {
    HandlerErr::new("page_mismatch", message)
}

/// Structural failures carry a tag so the popup can tell them apart from
/// the expected outcomes.
pub(super) fn unexpected(e: FillError) -> HandlerErr {
    HandlerErr::new("bad_payload", format!("[filler] {e}"))
}

pub(super) fn rows_param(req: &Request) -> Result<Vec<StudentRow>, HandlerErr> {
    serde_json::from_value::<RowPayload>(req.data.clone())
        .map(rows_from_payload)
        .map_err(|e| unexpected(FillError::Payload(e.to_string())))
}

pub(super) fn report_response(req: &Request, outcome: &FillOutcome) -> serde_json::Value {
    let report = Report::from(outcome);
    let summary = json!({
        "filled": outcome.filled,
        "missing": outcome.missing,
    });
    if report.is_failure() {
        HandlerErr {
            code: "no_fields",
            message: report.message(),
            details: Some(summary),
        }
        .response(&req.id)
    } else {
        ok(&req.id, report.message(), Some(summary))
    }
}
