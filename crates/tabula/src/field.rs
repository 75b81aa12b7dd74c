//! Typed access to a single field
//!
//! A [`Field`] remembers the record number and column it came from, so
//! conversion failures can say exactly where the bad value is.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use tabula_core::{Error, Result};
use tabula_header::ColumnEnum;

/// One field value together with its origin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field<'a> {
    record_number: usize,
    column: &'a str,
    value: Option<&'a str>,
}

impl<'a> Field<'a> {
    /// Create a field handle
    pub fn new(record_number: usize, column: &'a str, value: Option<&'a str>) -> Self {
        Self {
            record_number,
            column,
            value,
        }
    }

    /// 1-based number of the record the field belongs to
    pub fn record_number(&self) -> usize {
        self.record_number
    }

    /// Header name of the column
    pub fn column(&self) -> &'a str {
        self.column
    }

    /// The raw value, `None` for a null field
    pub fn as_str(&self) -> Option<&'a str> {
        self.value
    }

    /// Whether the field is null
    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }

    /// The value, treating empty as missing
    fn present(&self) -> Option<&'a str> {
        self.value.filter(|v| !v.is_empty())
    }

    fn conversion_error(&self, message: impl fmt::Display) -> Error {
        Error::Conversion {
            record_number: self.record_number,
            column: self.column.to_owned(),
            message: message.to_string(),
        }
    }

    fn format_error(&self, value: &str, format: &str, e: chrono::ParseError) -> Error {
        self.conversion_error(format!("'{value}' does not match '{format}': {e}"))
    }

    /// Parse the value with [`FromStr`]. Null and empty fields give `Ok(None)`.
    ///
    /// ```rust
    /// use tabula::Field;
    ///
    /// let field = Field::new(3, "Weight", Some("6.95"));
    /// assert_eq!(field.parse::<f64>()?, Some(6.95));
    ///
    /// let err = Field::new(3, "Weight", Some("heavy")).parse::<f64>().unwrap_err();
    /// assert_eq!(err.record_number(), Some(3));
    /// # Ok::<(), tabula::Error>(())
    /// ```
    pub fn parse<T>(&self) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        match self.present() {
            None => Ok(None),
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|e| self.conversion_error(format!("'{value}': {e}"))),
        }
    }

    /// `true` or `false`, compared case-insensitively
    pub fn as_bool(&self) -> Result<Option<bool>> {
        match self.present() {
            None => Ok(None),
            Some(v) if v.eq_ignore_ascii_case("true") => Ok(Some(true)),
            Some(v) if v.eq_ignore_ascii_case("false") => Ok(Some(false)),
            Some(v) => Err(self.conversion_error(format!("'{v}' is not a boolean"))),
        }
    }

    /// Date in the given `strftime` format
    pub fn as_date(&self, format: &str) -> Result<Option<NaiveDate>> {
        match self.present() {
            None => Ok(None),
            Some(value) => NaiveDate::parse_from_str(value, format)
                .map(Some)
                .map_err(|e| self.format_error(value, format, e)),
        }
    }

    /// Date and time in the given `strftime` format
    pub fn as_datetime(&self, format: &str) -> Result<Option<NaiveDateTime>> {
        match self.present() {
            None => Ok(None),
            Some(value) => NaiveDateTime::parse_from_str(value, format)
                .map(Some)
                .map_err(|e| self.format_error(value, format, e)),
        }
    }

    /// The enum member whose identifier equals the value
    pub fn as_enum<E: ColumnEnum>(&self, ignore_case: bool) -> Result<Option<E>> {
        let Some(value) = self.present() else {
            return Ok(None);
        };

        let found = E::MEMBERS.iter().copied().find(|m| {
            if ignore_case {
                m.name().eq_ignore_ascii_case(value)
            } else {
                m.name() == value
            }
        });
        match found {
            Some(member) => Ok(Some(member)),
            None => Err(self.conversion_error(format!(
                "'{value}' is not a member of {}",
                std::any::type_name::<E>()
            ))),
        }
    }

    /// Split the value on `separator`; null or empty values give no fields
    ///
    /// ```rust
    /// use tabula::Field;
    ///
    /// let field = Field::new(1, "Cartridges", Some(".338 Lapua|.300 Win Mag"));
    /// let parts: Vec<_> = field.split('|').iter().filter_map(|f| f.as_str()).collect();
    /// assert_eq!(parts, [".338 Lapua", ".300 Win Mag"]);
    /// ```
    pub fn split(&self, separator: char) -> Vec<Field<'a>> {
        match self.present() {
            None => Vec::new(),
            Some(value) => value.split(separator).map(|part| self.with_value(part)).collect(),
        }
    }

    /// Split the value on a string separator. An empty separator returns the field itself.
    pub fn split_str(&self, separator: &str) -> Vec<Field<'a>> {
        match self.present() {
            None => Vec::new(),
            Some(_) if separator.is_empty() => vec![*self],
            Some(value) => value.split(separator).map(|part| self.with_value(part)).collect(),
        }
    }

    fn with_value(&self, value: &'a str) -> Field<'a> {
        Field {
            value: Some(value),
            ..*self
        }
    }
}

impl fmt::Display for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value.unwrap_or_default())
    }
}
