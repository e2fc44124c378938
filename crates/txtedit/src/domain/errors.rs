//! Errors raised while reconciling edited text with the model.

use std::fmt;
use std::str::Utf8Error;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    /// The re-parsed text serializes to fewer significant lines than the user wrote, so the
    /// parser probably dropped something.
    #[error("sanity check failed: {input} significant lines edited but only {reparsed} survived parsing")]
    SanityCheck { input: usize, reparsed: usize },

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("failed to serialize model: {0}")]
    Serialize(#[from] std::io::Error),

    #[error("editor text is not valid UTF-8: {0}")]
    Encoding(#[from] Utf8Error),

    #[error("host rejected the updated model: {0}")]
    Apply(String),

    #[error("no document is open in the editor")]
    NoDocument,
}

/// Malformed input reported by a parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ParseError {
    pub line: Option<usize>,
    pub message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            line: None,
            message: message.into(),
        }
    }

    pub fn at_line(line: usize, message: impl Into<String>) -> Self {
        Self {
            line: Some(line),
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {line}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl EditorError {
    /// True for failures caused by the edited text itself, which the user can fix and retry.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EditorError::SanityCheck { .. } | EditorError::Parse(_) | EditorError::Encoding(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_mentions_line() {
        let err = EditorError::from(ParseError::at_line(3, "unterminated table"));
        assert_eq!(err.to_string(), "parse error: line 3: unterminated table");
        assert!(err.is_recoverable());
    }

    #[test]
    fn apply_failures_are_not_text_errors() {
        assert!(!EditorError::Apply("read-only".into()).is_recoverable());
        assert!(!EditorError::NoDocument.is_recoverable());
    }
}
