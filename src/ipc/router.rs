use tracing::{debug, warn};

use super::handlers;
use super::types::{AppState, Request};
use crate::ipc::error::err;

pub fn handle_request(state: &mut AppState, req: Request) -> serde_json::Value {
    debug!(id = %req.id, action = %req.action, "request");

    if let Some(resp) = handlers::core::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::grades::try_handle(state, &req) {
        return resp;
    }
    if let Some(resp) = handlers::frequency::try_handle(state, &req) {
        return resp;
    }

    warn!(action = %req.action, "unknown action");
    err(
        &req.id,
        "not_implemented",
        format!("unknown action: {}", req.action),
        None,
    )
}
