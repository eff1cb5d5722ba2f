use std::fmt;

use crate::headers::FormMode;
use crate::page::{FormField, Page};

/// Address of one input on the Diário form.
///
/// Grade inputs carry the id `@<matricula>_<position>` where `position` is
/// the header anchor's index on the page. Frequency inputs carry the name
/// `@<matricula>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKey<'a> {
    Grade { matricula: &'a str, position: usize },
    Frequency { matricula: &'a str },
}

impl<'a> FieldKey<'a> {
    pub fn grade(matricula: &'a str, position: usize) -> Self {
        FieldKey::Grade {
            matricula,
            position,
        }
    }

    pub fn frequency(matricula: &'a str) -> Self {
        FieldKey::Frequency { matricula }
    }

    pub fn mode(&self) -> FormMode {
        match self {
            FieldKey::Grade { .. } => FormMode::Grades,
            FieldKey::Frequency { .. } => FormMode::Frequency,
        }
    }

    pub fn matricula(&self) -> &'a str {
        match *self {
            FieldKey::Grade { matricula, .. } | FieldKey::Frequency { matricula } => matricula,
        }
    }
}

impl fmt::Display for FieldKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::Grade {
                matricula,
                position,
            } => write!(f, "@{matricula}_{position}"),
            FieldKey::Frequency { matricula } => write!(f, "@{matricula}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    Writable,
    Disabled,
    Absent,
}

fn lookup<'p, P>(page: &'p mut P, key: &FieldKey<'_>) -> Option<&'p mut FormField>
where
    P: Page + ?Sized,
{
    let addr = key.to_string();
    match key {
        FieldKey::Grade { .. } => page.field_by_id(&addr),
        FieldKey::Frequency { .. } => page.field_by_name(&addr),
    }
}

pub fn classify<P>(page: &mut P, key: &FieldKey<'_>) -> FieldState
where
    P: Page + ?Sized,
{
    match lookup(page, key) {
        None => FieldState::Absent,
        Some(f) if f.disabled => FieldState::Disabled,
        Some(_) => FieldState::Writable,
    }
}

/// The field behind `key`, only if it exists and accepts input.
pub fn resolve<'p, P>(page: &'p mut P, key: &FieldKey<'_>) -> Option<&'p mut FormField>
where
    P: Page + ?Sized,
{
    lookup(page, key).filter(|f| !f.disabled)
}
