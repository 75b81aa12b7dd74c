//! # tabula
//!
//! A streaming CSV reader with typed column access.
//!
//! Tabula parses CSV text from a string or any [`std::io::Read`] one record at
//! a time, tracking line and position for every error, and lets you address
//! fields by column name, index or enum member.
//!
//! ## Features
//!
//! - Configurable separator, quote, escape and record terminator
//! - Whitespace trimming and null-value substitution
//! - Headers from the first record, from user-supplied names or from an enum
//! - Typed conversions through [`Field`]
//! - Optional `serde` support for settings and records
//!
//! ## Example
//!
//! ```rust
//! use tabula::prelude::*;
//!
//! column_enum! {
//!     enum Rifle: u8 { Manufacturer, Name, Weight }
//! }
//!
//! let text = "Name,Manufacturer,Weight\r\nWA 2000,Walther,6.95\r\nNTW-20,Denel,31\r\n";
//! let policy = FirstRecordEnum::<Rifle>::new()?;
//! let mut reader = Reader::from_str(text, &Settings::default(), &policy)?;
//!
//! let mut total = 0.0;
//! for record in reader.records() {
//!     let record = record?;
//!     total += record.field(&Rifle::Weight)?.parse::<f64>()?.unwrap_or_default();
//! }
//! assert!((total - 37.95).abs() < 1e-9);
//! # Ok::<(), tabula::Error>(())
//! ```

pub mod field;
pub mod prelude;
pub mod reader;
pub mod record;

pub use field::Field;
pub use reader::{Reader, Records};
pub use record::Record;

// Re-export the parser and header crates
pub use tabula_core::{
    CharSource, CsvIterator, Error, IteratorState, ParseErrorKind, Position, ReadSource,
    RecordTerminator, Result, Settings, StrSource, TrimMode,
};
pub use tabula_header::{
    column_enum, column_letters, ColumnEnum, EnumHeader, FirstRecord, FirstRecordEnum, Header,
    HeaderPolicy, IndexHeader, IndexPolicy, LookupStrategy, NameHeader, NameMatching,
    UserDefined, UserDefinedEnum,
};

/// Read every record of `text` with default settings and an index header
///
/// ```rust
/// let records = tabula::read_str("a,b\nc,d")?;
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[1].get(&0)?, Some("c"));
/// # Ok::<(), tabula::Error>(())
/// ```
pub fn read_str(text: &str) -> Result<Vec<Record<IndexHeader>>> {
    Reader::from_str(text, &Settings::default(), &IndexPolicy)?
        .records()
        .collect()
}
