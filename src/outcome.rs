use crate::error::ErrorKind;
use crate::fill::FillOutcome;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    Failure,
    Partial { filled: usize, missing: usize },
    Success { filled: usize },
}

impl Report {
    pub fn from_outcome(outcome: &FillOutcome) -> Self {
        match (outcome.filled, outcome.missing.len()) {
            (0, _) => Report::Failure,
            (filled, 0) => Report::Success { filled },
            (filled, missing) => Report::Partial { filled, missing },
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Report::Failure)
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Report::Failure | Report::Partial { .. } => Some(ErrorKind::PartialResolution),
            Report::Success { .. } => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Report::Failure => "No matching form fields found".to_string(),
            Report::Partial { filled, missing } => {
                format!("Filled {filled} rows. Could not find: {missing}")
            }
            Report::Success { filled } => format!("Filled {filled} rows"),
        }
    }
}

impl From<&FillOutcome> for Report {
    fn from(outcome: &FillOutcome) -> Self {
        Report::from_outcome(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(filled: usize, missing: &[&str]) -> FillOutcome {
        FillOutcome {
            filled,
            missing: missing.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn nothing_filled_is_failure() {
        let r = Report::from(&outcome(0, &["1", "2"]));
        assert!(r.is_failure());
        assert_eq!(r.message(), "No matching form fields found");
        assert_eq!(Report::from(&outcome(0, &[])), Report::Failure);
    }

    #[test]
    fn missing_rows_make_partial_success() {
        let r = Report::from(&outcome(1, &["456"]));
        assert_eq!(r, Report::Partial { filled: 1, missing: 1 });
        assert_eq!(r.message(), "Filled 1 rows. Could not find: 1");
        assert_eq!(r.kind(), Some(ErrorKind::PartialResolution));
    }

    #[test]
    fn full_success_reports_filled_count() {
        let r = Report::from(&outcome(2, &[]));
        assert_eq!(r.message(), "Filled 2 rows");
        assert_eq!(r.kind(), None);
    }
}
