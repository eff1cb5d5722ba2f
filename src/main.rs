use std::io::{self, BufRead, Write};

use diariofill::ipc;
use diariofill::settings::Settings;
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    let settings = Settings::load()?;
    diariofill::logging::init(&settings)?;
    info!(version = env!("CARGO_PKG_VERSION"), "diariofill sidecar starting");

    let mut state = ipc::AppState::default();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                error!(error = %e, "stdin closed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // No id to answer with; reply anyway so the caller is not left waiting.
                let resp = serde_json::json!({
                    "id": "",
                    "status": "error",
                    "code": "bad_json",
                    "message": e.to_string(),
                });
                let _ = writeln!(stdout, "{resp}");
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp)
                .unwrap_or_else(|_| "{\"status\":\"error\",\"message\":\"encode failed\"}".to_string())
        );
        let _ = stdout.flush();
    }

    info!("diariofill sidecar stopped");
    Ok(())
}
