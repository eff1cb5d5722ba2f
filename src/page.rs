//! The live form as the filler sees it.
//!
//! `Page` is the narrow capability the reconciliation code depends on.
//! `Document` implements it over an HTML snapshot of the Diário page (or
//! over fields pushed by hand), and records which fields were written.

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::error::ErrorKind;
use crate::headers::HeaderIndex;

/// Container whose anchors are the evaluation headers.
pub const HEADER_CONTAINER_ID: &str = "notasHead";
/// Class of the highlighted tab on every Diário form page.
pub const ACTIVE_TAB_CLASS: &str = "tit_on";
pub const NAVIGATION_CLASS: &str = "tbNavegacao";
pub const FREQUENCY_TABLE_ID: &str = "tabelaFrequencias";

#[derive(Debug, Error)]
pub enum PageError {
    #[error("No AV headers found, check URL and try again")]
    NoHeaders,
    #[error("Current page is not `Lançamento de Notas/Todas as Avaliações`, check URL and try again")]
    NotGradePage,
    #[error("Current page is not `Lançamento do Total de Faltas no Semestre`, check URL and try again")]
    NotFrequencyPage,
    #[error("No frequency form found, please check URL")]
    NoFrequencyForm,
    #[error("invalid selector `{selector}`: {message}")]
    Selector { selector: String, message: String },
}

impl PageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PageError::Selector { .. } => ErrorKind::Unexpected,
            _ => ErrorKind::PageMismatch,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub id: Option<String>,
    pub name: Option<String>,
    pub disabled: bool,
    pub value: String,
    #[serde(skip)]
    written: bool,
}

impl FormField {
    pub fn with_id(id: impl Into<String>) -> Self {
        FormField {
            id: Some(id.into()),
            ..FormField::default()
        }
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        FormField {
            name: Some(name.into()),
            ..FormField::default()
        }
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn write(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.written = true;
    }

    pub fn is_written(&self) -> bool {
        self.written
    }
}

pub trait Page {
    /// Header anchor labels in document order.
    fn header_labels(&self) -> Vec<String>;

    fn active_tab_count(&self) -> usize;

    /// Title of the highlighted tab in the navigation bar, if any.
    fn navigation_title(&self) -> Option<String>;

    fn has_frequency_table(&self) -> bool;

    fn field_by_id(&mut self, id: &str) -> Option<&mut FormField>;

    /// First field carrying `name`.
    fn field_by_name(&mut self, name: &str) -> Option<&mut FormField>;

    /// Rebuilt on every call; the page may have been re-rendered.
    fn discover_headers(&self) -> HeaderIndex {
        HeaderIndex::from_labels(self.header_labels())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    header_labels: Vec<String>,
    active_tabs: Vec<String>,
    navigation_title: Option<String>,
    frequency_table: bool,
    fields: Vec<FormField>,
}

fn selector(css: &str) -> Result<Selector, PageError> {
    Selector::parse(css).map_err(|e| PageError::Selector {
        selector: css.to_string(),
        message: format!("{e:?}"),
    })
}

/// Text content with whitespace runs collapsed, close to `innerText`.
fn inner_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

impl Document {
    pub fn new() -> Self {
        Document::default()
    }

    pub fn from_html(html: &str) -> Result<Self, PageError> {
        let doc = Html::parse_document(html);

        let header_anchor = selector(&format!("#{HEADER_CONTAINER_ID} a"))?;
        let active_tab = selector(&format!(".{ACTIVE_TAB_CLASS}"))?;
        let navigation = selector(&format!(".{NAVIGATION_CLASS}"))?;
        let frequency_table = selector(&format!("#{FREQUENCY_TABLE_ID}"))?;
        let inputs = selector("input, select, textarea")?;

        let header_labels: Vec<String> = doc.select(&header_anchor).map(inner_text).collect();
        let active_tabs: Vec<String> = doc.select(&active_tab).map(inner_text).collect();
        let navigation_title = doc
            .select(&navigation)
            .next()
            .and_then(|nav| nav.select(&active_tab).next())
            .map(inner_text);

        let fields: Vec<FormField> = doc
            .select(&inputs)
            .map(|el| {
                let v = el.value();
                let value = if v.name() == "textarea" {
                    el.text().collect::<String>()
                } else {
                    v.attr("value").unwrap_or("").to_string()
                };
                FormField {
                    id: v.attr("id").map(str::to_string),
                    name: v.attr("name").map(str::to_string),
                    disabled: v.attr("disabled").is_some(),
                    value,
                    written: false,
                }
            })
            .collect();

        debug!(
            headers = header_labels.len(),
            tabs = active_tabs.len(),
            fields = fields.len(),
            "page snapshot parsed"
        );

        Ok(Document {
            header_labels,
            active_tabs,
            navigation_title,
            frequency_table: doc.select(&frequency_table).next().is_some(),
            fields,
        })
    }

    pub fn push_header(&mut self, label: impl Into<String>) -> &mut Self {
        self.header_labels.push(label.into());
        self
    }

    pub fn push_active_tab(&mut self, title: impl Into<String>) -> &mut Self {
        self.active_tabs.push(title.into());
        self
    }

    pub fn set_navigation_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.navigation_title = Some(title.into());
        self
    }

    pub fn set_frequency_table(&mut self, present: bool) -> &mut Self {
        self.frequency_table = present;
        self
    }

    pub fn push_field(&mut self, field: FormField) -> &mut Self {
        self.fields.push(field);
        self
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn written_count(&self) -> usize {
        self.fields.iter().filter(|f| f.is_written()).count()
    }

    pub fn value_of(&self, id: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.id.as_deref() == Some(id))
            .map(|f| f.value.as_str())
    }

    pub fn value_of_name(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name.as_deref() == Some(name))
            .map(|f| f.value.as_str())
    }
}

impl Page for Document {
    fn header_labels(&self) -> Vec<String> {
        self.header_labels.clone()
    }

    fn active_tab_count(&self) -> usize {
        self.active_tabs.len()
    }

    fn navigation_title(&self) -> Option<String> {
        self.navigation_title.clone()
    }

    fn has_frequency_table(&self) -> bool {
        self.frequency_table
    }

    fn field_by_id(&mut self, id: &str) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|f| f.id.as_deref() == Some(id))
    }

    fn field_by_name(&mut self, name: &str) -> Option<&mut FormField> {
        self.fields
            .iter_mut()
            .find(|f| f.name.as_deref() == Some(name))
    }
}
