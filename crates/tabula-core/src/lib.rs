//! # tabula-core
//!
//! The CSV parsing engine behind tabula.
//!
//! This crate provides:
//! - [`Settings`] - Separator, quote, escape, terminator, trimming and null value
//! - [`CharSource`] - Character cursors over strings ([`StrSource`]) and readers ([`ReadSource`])
//! - [`FieldParser`] and [`RecordParser`] - The field and record state machines
//! - [`CsvIterator`] - Forward-only iteration with line/position tracking
//!
//! ## Example
//!
//! ```rust
//! use tabula_core::{CsvIterator, Settings};
//!
//! let text = "\"Gas-operated,Rotating bolt\",Semi-automatic\r\n";
//! let mut it = CsvIterator::from_str(text, &Settings::default()).unwrap();
//!
//! assert!(it.advance().unwrap());
//! let record = it.record().unwrap().unwrap();
//! assert_eq!(record[0].as_deref(), Some("Gas-operated,Rotating bolt"));
//! assert_eq!(record[1].as_deref(), Some("Semi-automatic"));
//! ```

pub mod error;
pub mod iterator;
pub mod parser;
pub mod settings;
pub mod source;

// Re-exports for convenience
pub use error::{Error, ParseErrorKind, Result};
pub use iterator::{CsvIterator, IteratorState, Position, Records};
pub use parser::{FieldEnd, FieldParser, ParsedField, ParsedRecord, RecordParser};
pub use settings::{RecordTerminator, Settings, TrimMode};
pub use source::{CharSource, ReadSource, StrSource};
