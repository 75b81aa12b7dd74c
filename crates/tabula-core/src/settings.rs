//! Parser settings

use std::fmt;

use crate::error::{Error, Result};

bitflags::bitflags! {
    /// Which side of an unquoted field has its whitespace stripped
    ///
    /// Quoted fields are never trimmed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct TrimMode: u8 {
        /// Strip leading whitespace
        const LEFT = 0x01;
        /// Strip trailing whitespace
        const RIGHT = 0x02;
        /// Strip both sides
        const BOTH = Self::LEFT.bits() | Self::RIGHT.bits();
    }
}

impl TrimMode {
    /// Keep whitespace as it is
    pub const NONE: TrimMode = TrimMode::empty();
}

/// Character sequence that ends a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RecordTerminator {
    /// Carriage return (`\r`)
    Cr,
    /// Line feed (`\n`)
    Lf,
    /// Carriage return followed by line feed (`\r\n`)
    CrLf,
}

impl RecordTerminator {
    /// The terminator's characters
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordTerminator::Cr => "\r",
            RecordTerminator::Lf => "\n",
            RecordTerminator::CrLf => "\r\n",
        }
    }
}

impl fmt::Display for RecordTerminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordTerminator::Cr => "CR",
            RecordTerminator::Lf => "LF",
            RecordTerminator::CrLf => "CRLF",
        };
        f.write_str(name)
    }
}

/// Settings shared by every parser built from one configuration
///
/// # Example
///
/// ```rust
/// use tabula_core::{RecordTerminator, Settings, TrimMode};
///
/// let settings = Settings::default()
///     .with_separator(';')
///     .with_trim_mode(TrimMode::BOTH)
///     .with_null_value("NULL");
/// assert!(settings.validate().is_ok());
///
/// let strict = Settings::strict();
/// assert_eq!(strict.record_terminator, Some(RecordTerminator::CrLf));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Settings {
    /// Field separator (default: comma). Never CR or LF.
    pub separator: char,
    /// Quote character (default: double quote)
    pub quote: Option<char>,
    /// Escape character (default: double quote, i.e. doubled quotes)
    pub escape: Option<char>,
    /// Forced record terminator. `None` fixes the terminator from the first record.
    pub record_terminator: Option<RecordTerminator>,
    /// Whitespace trimming for unquoted fields
    pub trim_mode: TrimMode,
    /// Field value read back as a missing value, compared after trimming
    pub null_value: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            separator: ',',
            quote: Some('"'),
            escape: Some('"'),
            record_terminator: None,
            trim_mode: TrimMode::NONE,
            null_value: None,
        }
    }
}

impl Settings {
    /// Comma separated, doubled-quote escaping, CRLF terminators only
    pub fn strict() -> Self {
        Self {
            record_terminator: Some(RecordTerminator::CrLf),
            ..Self::default()
        }
    }

    /// Tab separated, unquoted, backslash escapes and LF terminators
    ///
    /// Matches the dialect written by `SELECT ... INTO OUTFILE` style exports.
    pub fn tab_escaped() -> Self {
        Self {
            separator: '\t',
            quote: None,
            escape: Some('\\'),
            record_terminator: Some(RecordTerminator::Lf),
            trim_mode: TrimMode::NONE,
            null_value: None,
        }
    }

    /// Set the field separator (builder pattern)
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Set or clear the quote character (builder pattern)
    pub fn with_quote(mut self, quote: Option<char>) -> Self {
        self.quote = quote;
        self
    }

    /// Set or clear the escape character (builder pattern)
    pub fn with_escape(mut self, escape: Option<char>) -> Self {
        self.escape = escape;
        self
    }

    /// Force a record terminator, or `None` to detect it (builder pattern)
    pub fn with_record_terminator(mut self, terminator: Option<RecordTerminator>) -> Self {
        self.record_terminator = terminator;
        self
    }

    /// Set the trim mode (builder pattern)
    pub fn with_trim_mode(mut self, trim_mode: TrimMode) -> Self {
        self.trim_mode = trim_mode;
        self
    }

    /// Set the null value (builder pattern)
    pub fn with_null_value<S: Into<String>>(mut self, null_value: S) -> Self {
        self.null_value = Some(null_value.into());
        self
    }

    /// Check that the characters can coexist
    pub fn validate(&self) -> Result<()> {
        if is_newline(self.separator) {
            return Err(Error::InvalidSettings(
                "newline cannot be used as field separator".into(),
            ));
        }

        if let Some(quote) = self.quote {
            if quote == self.separator {
                return Err(Error::InvalidSettings(format!(
                    "quote {quote:?} is the same as the field separator"
                )));
            }
            if is_newline(quote) {
                return Err(Error::InvalidSettings(
                    "newline cannot be used as quote".into(),
                ));
            }
        }

        if let Some(escape) = self.escape {
            if escape == self.separator {
                return Err(Error::InvalidSettings(format!(
                    "escape {escape:?} is the same as the field separator"
                )));
            }
            if is_newline(escape) {
                return Err(Error::InvalidSettings(
                    "newline cannot be used as escape".into(),
                ));
            }
        }

        Ok(())
    }
}

#[inline]
pub(crate) fn is_newline(c: char) -> bool {
    c == '\r' || c == '\n'
}
