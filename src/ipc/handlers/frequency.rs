use crate::fill;
use crate::headers::FREQUENCY_COLUMN;
use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};
use crate::page::{Page, PageError};

const TOTAL_ABSENCES_TAB: &str = "Total de Faltas";

fn handle_check_total_freq_page(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(doc) = state.document.as_ref() else {
        return super::no_page().response(&req.id);
    };
    let on_totals_tab = doc
        .navigation_title()
        .map(|t| t.contains(TOTAL_ABSENCES_TAB))
        .unwrap_or(false);
    if on_totals_tab && doc.has_frequency_table() {
        ok(&req.id, FREQUENCY_COLUMN, None)
    } else {
        super::page_mismatch(PageError::NoFrequencyForm.to_string()).response(&req.id)
    }
}

fn handle_fill_frequency_form(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(doc) = state.document.as_mut() else {
        return super::no_page().response(&req.id);
    };
    if doc.active_tab_count() == 0 {
        return super::page_mismatch(PageError::NotFrequencyPage.to_string()).response(&req.id);
    }
    let rows = match super::rows_param(req) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };

    match fill::fill_frequency(doc, &rows) {
        Ok(outcome) => super::report_response(req, &outcome),
        Err(e) => super::unexpected(e).response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.action.as_str() {
        "check_if_in_total_freq_page" => Some(handle_check_total_freq_page(state, req)),
        "fill_frequency_form" => Some(handle_fill_frequency_form(state, req)),
        _ => None,
    }
}
