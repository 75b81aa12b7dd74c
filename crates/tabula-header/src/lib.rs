//! # tabula-header
//!
//! Column headers for tabula readers.
//!
//! - [`Header`] - Ordered column names with a key-to-position lookup
//! - [`NameHeader`], [`IndexHeader`], [`EnumHeader`] - String, integer and enum keys
//! - [`HeaderPolicy`] - Where a reader's header comes from
//!
//! ## Example
//!
//! ```rust
//! use tabula_core::{CsvIterator, Settings};
//! use tabula_header::{FirstRecord, Header, HeaderPolicy};
//!
//! let text = "Manufacturer,Name\r\nWalther,WA 2000";
//! let mut it = CsvIterator::from_str(text, &Settings::default())?;
//! it.advance()?;
//!
//! let header = FirstRecord::new().create_header(&mut it)?;
//! assert_eq!(header.index_of("Name"), Some(1));
//! # Ok::<(), tabula_core::Error>(())
//! ```

pub mod enum_header;
pub mod header;
pub mod index;
pub mod name;
pub mod policy;

pub use enum_header::{validate_column_enum, ColumnEnum, Discriminant, EnumHeader, LookupStrategy};
pub use header::Header;
pub use index::{column_letters, IndexHeader};
pub use name::{NameHeader, NameMatching};
pub use policy::{
    FirstRecord, FirstRecordEnum, HeaderPolicy, IndexPolicy, UserDefined, UserDefinedEnum,
};
