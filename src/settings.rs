use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::headers::FormMode;

/// Environment variable naming a JSON settings file.
pub const CONFIG_ENV: &str = "DIARIOFILL_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Substrings of page URLs that host the grade form.
    pub grade_url_patterns: Vec<String>,
    /// Substrings of page URLs that host the frequency form. Checked before
    /// the grade patterns.
    pub frequency_url_patterns: Vec<String>,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            grade_url_patterns: vec![
                "localhost".to_string(),
                "sistemas.ufmg.br/diario/notaTurma/notaAvaliacao/solicitar/solicitarNota.do?acao=lancarAvaliacaoCompleta"
                    .to_string(),
                "homepages.dcc.ufmg.br/~hector.azpurua/notas_mock/".to_string(),
            ],
            frequency_url_patterns: vec![
                "sistemas.ufmg.br/diario/frequenciaTurma/frequencia/solicitar/solicitarFrequencia.do"
                    .to_string(),
            ],
            log_filter: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn from_file(path: &Path) -> anyhow::Result<Settings> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read settings {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parse settings {}", path.display()))
    }

    /// Settings from the file named by `DIARIOFILL_CONFIG`, or defaults.
    pub fn load() -> anyhow::Result<Settings> {
        match std::env::var_os(CONFIG_ENV) {
            Some(p) if !p.is_empty() => Settings::from_file(Path::new(&p)),
            _ => Ok(Settings::default()),
        }
    }

    pub fn mode_for_url(&self, url: &str) -> Option<FormMode> {
        if self.frequency_url_patterns.iter().any(|p| url.contains(p.as_str())) {
            return Some(FormMode::Frequency);
        }
        if self.grade_url_patterns.iter().any(|p| url.contains(p.as_str())) {
            return Some(FormMode::Grades);
        }
        None
    }
}
