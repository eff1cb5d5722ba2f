use serde::{Deserialize, Serialize};

use crate::page::Document;

/// One line of input. Browser-side callers send `action`/`data`; the
/// desktop-style `method`/`params` spelling is accepted too.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub id: String,
    #[serde(alias = "method")]
    pub action: String,
    #[serde(default, alias = "params")]
    pub data: serde_json::Value,
}

impl Request {
    pub fn new(id: impl Into<String>, action: impl Into<String>, data: serde_json::Value) -> Self {
        Request {
            id: id.into(),
            action: action.into(),
            data,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Typed view of a response line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub id: String,
    pub status: Status,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl Response {
    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}

/// The live page the sidecar answers for. Replaced wholesale on every
/// `page.load`, the way a browser reload replaces the DOM.
#[derive(Debug, Default)]
pub struct AppState {
    pub document: Option<Document>,
    pub url: Option<String>,
}
