use serde_json::json;
use tracing::info;

use crate::ipc::error::{ok, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::page::{Document, Page};

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        "ok",
        Some(json!({
            "version": env!("CARGO_PKG_VERSION"),
            "pageLoaded": state.document.is_some(),
            "url": state.url,
        })),
    )
}

fn handle_page_load(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(html) = req.data.get("html").and_then(|v| v.as_str()) else {
        return HandlerErr::new("bad_params", "missing data.html").response(&req.id);
    };
    let url = req
        .data
        .get("url")
        .and_then(|v| v.as_str())
        .map(str::to_string);

    match Document::from_html(html) {
        Ok(doc) => {
            let headers = doc.header_labels().len();
            let fields = doc.fields().len();
            info!(headers, fields, url = url.as_deref().unwrap_or(""), "page loaded");
            state.document = Some(doc);
            state.url = url;
            ok(
                &req.id,
                "Page loaded",
                Some(json!({ "headers": headers, "fields": fields })),
            )
        }
        Err(e) => HandlerErr::new("page_parse_failed", e.to_string()).response(&req.id),
    }
}

fn handle_page_fields(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(doc) = state.document.as_ref() else {
        return super::no_page().response(&req.id);
    };
    ok(
        &req.id,
        format!("{} fields", doc.fields().len()),
        Some(json!({ "fields": doc.fields() })),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.action.as_str() {
        "health" => Some(handle_health(state, req)),
        "page.load" => Some(handle_page_load(state, req)),
        "page.fields" => Some(handle_page_fields(state, req)),
        _ => None,
    }
}
