//! Record-level parsing

use super::field::{FieldEnd, FieldParser};
use crate::error::Result;
use crate::settings::{RecordTerminator, Settings};
use crate::source::CharSource;

/// One parsed record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRecord {
    /// Field values in column order; `None` marks a null field
    pub fields: Vec<Option<String>>,
    /// Terminator that ended the record, `None` at end of input
    pub terminator: Option<RecordTerminator>,
    /// Characters consumed, including the terminator
    pub len: usize,
    /// Line after the record (1-based)
    pub line: usize,
    /// Position within that line after the record (1-based)
    pub column: usize,
}

/// Parses one record by repeating the field parser until a terminator or EOF
///
/// Each record owns its fields; the previous record's width sizes the next one.
#[derive(Debug, Clone)]
pub struct RecordParser {
    field_parser: FieldParser,
    width: usize,
}

impl RecordParser {
    /// Create a record parser from validated settings
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Self {
            field_parser: FieldParser::new(settings)?,
            width: 0,
        })
    }

    /// Parse the record starting at the cursor.
    ///
    /// Returns `Ok(None)` if the source is already exhausted.
    pub fn parse<S: CharSource + ?Sized>(
        &mut self,
        source: &mut S,
        line: usize,
        column: usize,
    ) -> Result<Option<ParsedRecord>> {
        if source.is_at_end()? {
            return Ok(None);
        }

        let mut fields = Vec::with_capacity(self.width);
        let mut line = line;
        let mut column = column;
        let mut len = 0;

        let terminator = loop {
            let field = self.field_parser.parse(source, line, column)?;
            fields.push(field.value);
            len += field.len;
            line = field.line;
            column = field.column;

            if field.end != FieldEnd::Separator {
                break field.end.terminator();
            }
        };

        self.width = fields.len();
        Ok(Some(ParsedRecord {
            fields,
            terminator,
            len,
            line,
            column,
        }))
    }
}
