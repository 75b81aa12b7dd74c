//! Headers keyed by column name

use std::borrow::Cow;

use ahash::AHashMap;
use tabula_core::{Error, Result};

use crate::header::Header;

/// How column names are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NameMatching {
    /// Byte-for-byte equality
    #[default]
    Exact,
    /// ASCII letters compare case-insensitively
    AsciiCaseInsensitive,
    /// Full Unicode lowercase folding
    CaseInsensitive,
}

impl NameMatching {
    fn normalize<'a>(&self, name: &'a str) -> Cow<'a, str> {
        match self {
            NameMatching::Exact => Cow::Borrowed(name),
            NameMatching::AsciiCaseInsensitive => {
                if name.bytes().any(|b| b.is_ascii_uppercase()) {
                    Cow::Owned(name.to_ascii_lowercase())
                } else {
                    Cow::Borrowed(name)
                }
            }
            NameMatching::CaseInsensitive => Cow::Owned(name.to_lowercase()),
        }
    }
}

/// Header whose columns are looked up by name
///
/// # Example
///
/// ```rust
/// use tabula_header::{Header, NameHeader, NameMatching};
///
/// let header = NameHeader::new(["Manufacturer", "Name"], NameMatching::AsciiCaseInsensitive)?;
/// assert_eq!(header.index_of("name"), Some(1));
/// assert_eq!(header.index_of("Cartridge"), None);
/// # Ok::<(), tabula_core::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct NameHeader {
    names: Vec<String>,
    matching: NameMatching,
    lookup: AHashMap<String, usize>,
}

impl NameHeader {
    /// Build a header from column names
    ///
    /// Non-empty names must be unique under `matching`.
    pub fn new<I, S>(names: I, matching: NameMatching) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut lookup = AHashMap::with_capacity(names.len());

        for (index, name) in names.iter().enumerate() {
            if name.is_empty() {
                continue;
            }
            let key = matching.normalize(name).into_owned();
            if lookup.insert(key, index).is_some() {
                return Err(Error::InvalidHeader(format!(
                    "duplicate column name '{name}'"
                )));
            }
        }

        Ok(Self {
            names,
            matching,
            lookup,
        })
    }

    /// Build a header from a parsed record; null names are rejected
    pub fn from_record(record: &[Option<String>], matching: NameMatching) -> Result<Self> {
        Self::new(required_names(record)?, matching)
    }

    /// The comparison used for lookups
    pub fn matching(&self) -> NameMatching {
        self.matching
    }
}

impl Header for NameHeader {
    type Key = str;

    fn names(&self) -> &[String] {
        &self.names
    }

    fn index_of(&self, key: &str) -> Option<usize> {
        if key.is_empty() {
            return None;
        }
        self.lookup.get(&*self.matching.normalize(key)).copied()
    }

    fn describe_key(&self, key: &str) -> String {
        key.to_owned()
    }
}

/// Column names from a record, failing on the first null
pub(crate) fn required_names(record: &[Option<String>]) -> Result<Vec<String>> {
    record
        .iter()
        .enumerate()
        .map(|(index, name)| {
            name.clone().ok_or_else(|| {
                Error::InvalidHeader(format!("column name in column {} is null", index + 1))
            })
        })
        .collect()
}
