//! Error types for tabula-core

use std::fmt;

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// The kind of malformed input found while parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// A quoted field reached end of input without its closing quote
    UnterminatedQuote,
    /// An escape character appeared where nothing can follow it
    InvalidEscapePosition,
    /// A closing quote was followed by something other than a separator or terminator
    InvalidCharacterAfterQuote,
    /// A record ended with a different terminator than the ones before it
    InconsistentRecordTerminator,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ParseErrorKind::UnterminatedQuote => "closing quote not found",
            ParseErrorKind::InvalidEscapePosition => "invalid escape position",
            ParseErrorKind::InvalidCharacterAfterQuote => {
                "expected a field separator or record terminator after closing quote"
            }
            ParseErrorKind::InconsistentRecordTerminator => "inconsistent record terminator",
        };
        f.write_str(msg)
    }
}

/// Errors that can occur in tabula
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed CSV input
    #[error("{kind} (line {line}, position {column})")]
    Parse {
        kind: ParseErrorKind,
        line: usize,
        column: usize,
    },

    /// A record's field count disagrees with its header
    #[error("field count mismatch in record {record_number}: expected {expected}, got {actual}")]
    FieldCount {
        record_number: usize,
        expected: usize,
        actual: usize,
    },

    /// A column key that the header cannot resolve
    #[error("unknown column '{column}' (record {record_number})")]
    UnknownColumn { record_number: usize, column: String },

    /// A field value that could not be converted to the requested type
    #[error("cannot convert field '{column}' in record {record_number}: {message}")]
    Conversion {
        record_number: usize,
        column: String,
        message: String,
    },

    /// Incompatible reader settings
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// Column names that cannot form a header
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// An enum type that cannot be used as a column key
    #[error("Invalid column enum: {0}")]
    InvalidColumnEnum(String),

    /// The iterator or reader was used after being closed
    #[error("CSV source has been closed")]
    Closed,

    /// IO error from a caller-provided stream
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a parse error at the given line and position
    pub fn parse(kind: ParseErrorKind, line: usize, column: usize) -> Self {
        Error::Parse { kind, line, column }
    }

    /// The kind of parse error, if this is one
    pub fn parse_kind(&self) -> Option<ParseErrorKind> {
        match self {
            Error::Parse { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// The 1-based line and position this error points at, if any
    pub fn location(&self) -> Option<(usize, usize)> {
        match self {
            Error::Parse { line, column, .. } => Some((*line, *column)),
            _ => None,
        }
    }

    /// The 1-based record number this error refers to, if any
    pub fn record_number(&self) -> Option<usize> {
        match self {
            Error::FieldCount { record_number, .. }
            | Error::UnknownColumn { record_number, .. }
            | Error::Conversion { record_number, .. } => Some(*record_number),
            _ => None,
        }
    }
}
