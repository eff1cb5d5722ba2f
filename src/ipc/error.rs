use serde_json::json;

pub fn ok(id: &str, message: impl Into<String>, result: Option<serde_json::Value>) -> serde_json::Value {
    let mut resp = json!({
        "id": id,
        "status": "success",
        "message": message.into(),
    });
    if let Some(r) = result {
        resp["result"] = r;
    }
    resp
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut resp = json!({
        "id": id,
        "status": "error",
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        resp["details"] = d;
    }
    resp
}

pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl HandlerErr {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        HandlerErr {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, self.details)
    }
}
