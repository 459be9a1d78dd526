use std::path::PathBuf;

use thiserror::Error;

/// Error types for extraction and injection.
///
/// Every variant is scoped to a single document: a batch caller converts
/// each one into that file's row and keeps going.
#[derive(Debug, Error)]
pub enum SvgError {
    /// Input path does not exist
    #[error("SVG file not found: {}", .0.display())]
    DocumentNotFound(PathBuf),
    /// Reading an input failed
    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Malformed XML
    #[error("Parse error: {0}")]
    Parse(String),
    /// The document has no switch with a default text to work on
    #[error("No switch with a default text found")]
    NoText,
    /// Segment counts of a node and a translation disagree
    #[error(
        "Structure error for '{key}' [{language}]: node has {expected} segment(s), translation has {found}"
    )]
    StructuralIncompatibility {
        key: String,
        language: String,
        expected: usize,
        found: usize,
    },
    /// A node to be cloned or rewritten has a `<tspan>` inside a `<tspan>`
    #[error("Structure error for '{key}' [{language}]: nested tspan in node")]
    NestedTspans { key: String, language: String },
    /// Two batch inputs would be written to the same output file
    #[error("Duplicate file name in batch: {}", .0.display())]
    DuplicateName(PathBuf),
    /// Persisting a transformed document failed
    #[error("Failed to write '{}': {reason}", .path.display())]
    WriteFailed { path: PathBuf, reason: String },
    /// A translation mapping could not be decoded
    #[error("Invalid JSON in '{origin}': {reason}")]
    Json { origin: String, reason: String },
    /// A language tag that is not valid BCP 47
    #[error("Invalid language code: {0}")]
    InvalidLanguage(String),
}

impl SvgError {
    /// Stable token reported in per-file statistics.
    pub fn kind(&self) -> &'static str {
        match self {
            SvgError::DocumentNotFound(_) => "not-found",
            SvgError::Io { .. } => "read-failed",
            SvgError::Parse(_) => "parse-error",
            SvgError::NoText => "no-text",
            SvgError::StructuralIncompatibility { .. } | SvgError::NestedTspans { .. } => {
                "structure-error-nested-tspans-not-supported"
            }
            SvgError::DuplicateName(_) => "duplicate-name",
            SvgError::WriteFailed { .. } => "write-failed",
            SvgError::Json { .. } => "json-error",
            SvgError::InvalidLanguage(_) => "invalid-language",
        }
    }

    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            SvgError::StructuralIncompatibility { .. } | SvgError::NestedTspans { .. }
        )
    }
}

/// Result type for extraction and injection
pub type SvgResult<T> = Result<T, SvgError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tokens() {
        assert_eq!(SvgError::NoText.kind(), "no-text");
        assert_eq!(SvgError::Parse("x".into()).kind(), "parse-error");
        let err = SvgError::StructuralIncompatibility {
            key: "hello".into(),
            language: "fr".into(),
            expected: 2,
            found: 3,
        };
        assert_eq!(err.kind(), "structure-error-nested-tspans-not-supported");
        assert!(err.is_structural());
        assert!(!SvgError::NoText.is_structural());

        let nested = SvgError::NestedTspans {
            key: "hello".into(),
            language: "fr".into(),
        };
        assert_eq!(nested.kind(), "structure-error-nested-tspans-not-supported");
        assert!(nested.is_structural());
        assert_eq!(SvgError::DuplicateName("a/x.svg".into()).kind(), "duplicate-name");
    }

    #[test]
    fn test_display_mentions_counts() {
        let err = SvgError::StructuralIncompatibility {
            key: "hello".into(),
            language: "fr".into(),
            expected: 2,
            found: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("2 segment(s)"));
        assert!(msg.contains("[fr]"));
    }
}
