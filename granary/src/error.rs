use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GranaryError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("{table}/{slug}: parse error: {message}")]
    Parse {
        table: String,
        slug: String,
        message: String,
    },

    #[error("{table}/{slug}: validation failed: {}", .violations.join("; "))]
    Validation {
        table: String,
        slug: String,
        violations: Vec<String>,
    },

    #[error("Duplicate slug '{slug}' in table '{table}'")]
    DuplicateSlug { table: String, slug: String },

    #[error("{table}/{slug}: field '{field}' references '{value}', which does not exist in table '{target}'")]
    Reference {
        table: String,
        slug: String,
        field: String,
        target: String,
        value: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{} error(s):\n{}", .0.len(), .0)]
    Aggregate(ErrorList),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, GranaryError>;

/// An accumulating error list. Per-record and reference failures are
/// collected here instead of short-circuiting, so one bad file never hides
/// the rest of the problems in a pass.
#[derive(Debug, Default)]
pub struct ErrorList(Vec<GranaryError>);

impl ErrorList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, err: GranaryError) {
        self.0.push(err);
    }

    pub fn extend(&mut self, other: ErrorList) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GranaryError> {
        self.0.iter()
    }

    /// Collapse into a single result: `Ok(())` when nothing accumulated,
    /// otherwise one `Aggregate` error carrying everything.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(GranaryError::Aggregate(self))
        }
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  - {err}")?;
        }
        Ok(())
    }
}

impl From<Vec<GranaryError>> for ErrorList {
    fn from(errors: Vec<GranaryError>) -> Self {
        Self(errors)
    }
}

impl IntoIterator for ErrorList {
    type Item = GranaryError;
    type IntoIter = std::vec::IntoIter<GranaryError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list_is_ok() {
        assert!(ErrorList::new().into_result().is_ok());
    }

    #[test]
    fn test_non_empty_list_aggregates() {
        let mut errors = ErrorList::new();
        errors.push(GranaryError::DuplicateSlug {
            table: "posts".into(),
            slug: "hello".into(),
        });
        errors.push(GranaryError::Other("boom".into()));

        let err = errors.into_result().unwrap_err();
        match err {
            GranaryError::Aggregate(list) => assert_eq!(list.len(), 2),
            other => panic!("expected aggregate, got {other}"),
        }
    }

    #[test]
    fn test_display_lists_every_error() {
        let mut errors = ErrorList::new();
        errors.push(GranaryError::Other("first".into()));
        errors.push(GranaryError::Other("second".into()));

        let rendered = errors.to_string();
        assert!(rendered.contains("first"));
        assert!(rendered.contains("second"));
    }
}
