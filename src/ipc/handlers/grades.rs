use serde_json::json;

use crate::fill;
use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};
use crate::page::{Page, PageError};

fn handle_get_av_headers(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(doc) = state.document.as_ref() else {
        return super::no_page().response(&req.id);
    };
    let index = doc.discover_headers();
    if index.is_empty() {
        return super::page_mismatch(PageError::NoHeaders.to_string()).response(&req.id);
    }
    let labels: Vec<&str> = index.labels().collect();
    ok(&req.id, index.joined(), Some(json!({ "headers": labels })))
}

fn handle_fill_grade_form(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(doc) = state.document.as_mut() else {
        return super::no_page().response(&req.id);
    };
    if doc.active_tab_count() == 0 {
        return super::page_mismatch(PageError::NotGradePage.to_string()).response(&req.id);
    }
    if doc.discover_headers().is_empty() {
        return super::page_mismatch(PageError::NoHeaders.to_string()).response(&req.id);
    }
    let rows = match super::rows_param(req) {
        Ok(v) => v,
        Err(e) => return e.response(&req.id),
    };

    let outcome = fill::fill_grades(doc, &rows);
    super::report_response(req, &outcome)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.action.as_str() {
        "get_av_headers" => Some(handle_get_av_headers(state, req)),
        "fill_grade_form" => Some(handle_fill_grade_form(state, req)),
        _ => None,
    }
}
