//! Popup-side state and the three user steps: open the page, load a CSV,
//! fill the form.

use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::csv_table::{self, ParsedTable};
use crate::error::{ErrorKind, FormError};
use crate::headers::{self, FormMode};
use crate::ipc::{Request, Response};
use crate::settings::Settings;
use crate::transport::Channel;

/// Everything the popup remembers between steps. Reset whenever a page is
/// (re)opened; nothing outlives the popup.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub parsed_table: Option<ParsedTable>,
    pub live_header_labels: Option<Vec<String>>,
    pub active_mode: Option<FormMode>,
}

impl Session {
    pub fn reset(&mut self) {
        *self = Session::default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

/// What the popup shows in its status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
    pub error: Option<ErrorKind>,
}

impl Status {
    fn success(text: impl Into<String>) -> Self {
        Status {
            kind: StatusKind::Success,
            text: text.into(),
            error: None,
        }
    }

    fn failed(e: &FormError) -> Self {
        let text = match e {
            FormError::Transport(_) => format!("Error: {e}"),
            _ => e.to_string(),
        };
        Status {
            kind: StatusKind::Error,
            text,
            error: Some(e.kind()),
        }
    }

    fn from_response(resp: &Response, error: ErrorKind) -> Self {
        if resp.is_success() {
            Status::success(format!("Success! {}.", resp.message))
        } else {
            Status {
                kind: StatusKind::Error,
                text: format!("Error: {}", resp.message),
                error: Some(error),
            }
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == StatusKind::Success
    }
}

pub struct Popup<C> {
    channel: C,
    settings: Settings,
    session: Session,
}

impl<C: Channel> Popup<C> {
    pub fn new(channel: C, settings: Settings) -> Self {
        Popup {
            channel,
            settings,
            session: Session::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    fn request(&mut self, action: &str, data: Value) -> Result<Response, FormError> {
        let req = Request::new(Uuid::new_v4().to_string(), action, data);
        Ok(self.channel.send(req)?)
    }

    /// Step 1: find out which form the tab shows and what headers it has.
    pub fn open(&mut self, url: &str) -> Status {
        self.session.reset();
        let Some(mode) = self.settings.mode_for_url(url) else {
            return Status::failed(&FormError::UnsupportedUrl(url.to_string()));
        };
        self.session.active_mode = Some(mode);

        let action = match mode {
            FormMode::Grades => "get_av_headers",
            FormMode::Frequency => "check_if_in_total_freq_page",
        };
        let resp = match self.request(action, Value::Null) {
            Ok(r) => r,
            Err(e) => return Status::failed(&e),
        };
        if !resp.is_success() {
            return Status::from_response(&resp, ErrorKind::PageMismatch);
        }

        let labels = match headers::fixed_labels(mode) {
            Some(fixed) => fixed,
            None => response_labels(&resp),
        };
        info!(?mode, headers = ?labels, "form page opened");
        let text = labels.join(", ");
        self.session.live_header_labels = Some(labels);
        Status::success(text)
    }

    /// Step 2: parse the upload and gate it against the page's headers.
    pub fn load_csv(&mut self, text: Option<&str>) -> Status {
        self.session.parsed_table = None;
        match self.try_load_csv(text) {
            Ok(table) => {
                info!(rows = table.row_count(), "csv ready");
                self.session.parsed_table = Some(table);
                Status::success("CSV data ready to fill the form!")
            }
            Err(e) => {
                warn!(error = %e, "csv rejected");
                Status::failed(&e)
            }
        }
    }

    fn try_load_csv(&self, text: Option<&str>) -> Result<ParsedTable, FormError> {
        let text = text.ok_or(FormError::NoFileSelected)?;
        let (Some(mode), Some(labels)) = (
            self.session.active_mode,
            self.session.live_header_labels.as_ref(),
        ) else {
            return Err(FormError::HeadersNotLoaded);
        };

        let table = csv_table::parse(text)?;
        let csv_headers = table.headers.as_deref().unwrap_or_default();
        headers::reconcile(mode, csv_headers, labels.as_slice())?;
        Ok(table)
    }

    /// Step 3: send the reconciled rows to the page.
    pub fn fill(&mut self) -> Status {
        let (Some(mode), Some(table)) = (self.session.active_mode, self.session.parsed_table.as_ref())
        else {
            return Status::failed(&FormError::NothingToFill);
        };
        let payload = match serde_json::to_value(table.payload()) {
            Ok(v) => v,
            Err(e) => {
                return Status {
                    kind: StatusKind::Error,
                    text: format!("Error: [popup] {e}"),
                    error: Some(ErrorKind::Unexpected),
                }
            }
        };
        let action = match mode {
            FormMode::Grades => "fill_grade_form",
            FormMode::Frequency => "fill_frequency_form",
        };

        match self.request(action, payload) {
            Ok(resp) => {
                let kind = match resp.code.as_deref() {
                    Some("bad_payload") => ErrorKind::Unexpected,
                    Some("no_fields") => ErrorKind::PartialResolution,
                    _ => ErrorKind::PageMismatch,
                };
                Status::from_response(&resp, kind)
            }
            Err(e) => Status::failed(&e),
        }
    }
}

/// Header labels from a discovery response: the structured list when the
/// page sent one, else the comma-joined message.
fn response_labels(resp: &Response) -> Vec<String> {
    let structured = resp
        .result
        .as_ref()
        .and_then(|r| r.get("headers"))
        .and_then(|h| serde_json::from_value::<Vec<String>>(h.clone()).ok());
    match structured {
        Some(labels) => labels,
        None => resp
            .message
            .split(", ")
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    }
}
