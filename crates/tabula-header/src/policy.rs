//! Header policies
//!
//! A policy decides where a reader's header comes from. It is handed the
//! iterator right after the first record was parsed.

use std::fmt;
use std::marker::PhantomData;

use tabula_core::{CharSource, CsvIterator, Error, Result};

use crate::enum_header::{validate_column_enum, ColumnEnum, EnumHeader};
use crate::header::Header;
use crate::index::IndexHeader;
use crate::name::{required_names, NameHeader, NameMatching};

/// Builds the header for a reader
pub trait HeaderPolicy {
    /// The header this policy produces
    type Header: Header;

    /// Create the header, consuming records from `iter` if the policy needs to
    fn create_header<S: CharSource>(&self, iter: &mut CsvIterator<S>) -> Result<Self::Header>;
}

fn current_record<S: CharSource>(iter: &CsvIterator<S>) -> Result<&[Option<String>]> {
    iter.record()?
        .ok_or_else(|| Error::InvalidHeader("no record to read column names from".into()))
}

type Projection = Box<dyn Fn(&str) -> String + Send + Sync>;

/// Column names come from the first record, which is consumed
///
/// ```rust
/// use tabula_core::{CsvIterator, Settings};
/// use tabula_header::{FirstRecord, Header, HeaderPolicy};
///
/// let text = " Manufacturer , Name \r\nWalther,WA 2000";
/// let mut it = CsvIterator::from_str(text, &Settings::default())?;
/// it.advance()?;
///
/// let policy = FirstRecord::new().with_projection(|name| name.trim().to_lowercase());
/// let header = policy.create_header(&mut it)?;
/// assert_eq!(header.names(), ["manufacturer", "name"]);
/// assert_eq!(it.record_number()?, 2);
/// # Ok::<(), tabula_core::Error>(())
/// ```
#[derive(Default)]
pub struct FirstRecord {
    matching: NameMatching,
    projection: Option<Projection>,
}

impl FirstRecord {
    /// Exact names, no projection
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how names are compared on lookup (builder pattern)
    pub fn with_matching(mut self, matching: NameMatching) -> Self {
        self.matching = matching;
        self
    }

    /// Rewrite each name before the header is built (builder pattern)
    pub fn with_projection<F>(mut self, projection: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.projection = Some(Box::new(projection));
        self
    }
}

impl fmt::Debug for FirstRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirstRecord")
            .field("matching", &self.matching)
            .field("projection", &self.projection.is_some())
            .finish()
    }
}

impl HeaderPolicy for FirstRecord {
    type Header = NameHeader;

    fn create_header<S: CharSource>(&self, iter: &mut CsvIterator<S>) -> Result<NameHeader> {
        let mut names = required_names(current_record(iter)?)?;
        if let Some(projection) = &self.projection {
            for name in &mut names {
                *name = projection(name);
            }
        }

        let header = NameHeader::new(names, self.matching)?;
        log::debug!("header read from first record: {} columns", header.len());
        iter.advance()?;
        Ok(header)
    }
}

/// Enum column names come from the first record, which is consumed
pub struct FirstRecordEnum<E> {
    projection: Option<Projection>,
    _marker: PhantomData<fn() -> E>,
}

impl<E: ColumnEnum> FirstRecordEnum<E> {
    /// Fails if `E` cannot key a header
    pub fn new() -> Result<Self> {
        validate_column_enum::<E>()?;
        Ok(Self {
            projection: None,
            _marker: PhantomData,
        })
    }

    /// Rewrite each name before it is matched to a member (builder pattern)
    pub fn with_projection<F>(mut self, projection: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.projection = Some(Box::new(projection));
        self
    }
}

impl<E> fmt::Debug for FirstRecordEnum<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirstRecordEnum")
            .field("enum", &std::any::type_name::<E>())
            .field("projection", &self.projection.is_some())
            .finish()
    }
}

impl<E: ColumnEnum> HeaderPolicy for FirstRecordEnum<E> {
    type Header = EnumHeader<E>;

    fn create_header<S: CharSource>(&self, iter: &mut CsvIterator<S>) -> Result<EnumHeader<E>> {
        let mut names = required_names(current_record(iter)?)?;
        if let Some(projection) = &self.projection {
            for name in &mut names {
                *name = projection(name);
            }
        }

        let header = EnumHeader::with_names(names)?;
        iter.advance()?;
        Ok(header)
    }
}

/// Column names given up front; every record is data
#[derive(Debug, Clone)]
pub struct UserDefined {
    header: NameHeader,
}

impl UserDefined {
    /// Fails on duplicate names
    pub fn new<I, S>(names: I, matching: NameMatching) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            header: NameHeader::new(names, matching)?,
        })
    }

    /// The header every reader will share
    pub fn header(&self) -> &NameHeader {
        &self.header
    }
}

impl HeaderPolicy for UserDefined {
    type Header = NameHeader;

    fn create_header<S: CharSource>(&self, _iter: &mut CsvIterator<S>) -> Result<NameHeader> {
        Ok(self.header.clone())
    }
}

/// Enum columns given up front; every record is data
#[derive(Debug, Clone)]
pub struct UserDefinedEnum<E: ColumnEnum> {
    header: EnumHeader<E>,
}

impl<E: ColumnEnum> UserDefinedEnum<E> {
    /// Columns in declaration order
    pub fn new() -> Result<Self> {
        Ok(Self {
            header: EnumHeader::new()?,
        })
    }

    /// Columns in the order of `names`, which must list every member once
    pub fn with_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            header: EnumHeader::with_names(names)?,
        })
    }

    /// The header every reader will share
    pub fn header(&self) -> &EnumHeader<E> {
        &self.header
    }
}

impl<E: ColumnEnum> HeaderPolicy for UserDefinedEnum<E> {
    type Header = EnumHeader<E>;

    fn create_header<S: CharSource>(&self, _iter: &mut CsvIterator<S>) -> Result<EnumHeader<E>> {
        Ok(self.header.clone())
    }
}

/// Columns addressed by position; sized from the first record, which stays data
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexPolicy;

impl HeaderPolicy for IndexPolicy {
    type Header = IndexHeader;

    fn create_header<S: CharSource>(&self, iter: &mut CsvIterator<S>) -> Result<IndexHeader> {
        Ok(IndexHeader::new(current_record(iter)?.len()))
    }
}
