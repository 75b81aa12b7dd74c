//! Field and record parsers

mod field;
mod record;

pub use field::{FieldEnd, FieldParser, ParsedField};
pub use record::{ParsedRecord, RecordParser};
