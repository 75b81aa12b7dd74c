//! Prelude module - common imports for tabula users
//!
//! ```rust
//! use tabula::prelude::*;
//! ```

pub use crate::{
    // Headers
    column_enum,
    ColumnEnum,
    // Core types
    CsvIterator,
    EnumHeader,
    // Error types
    Error,
    Field,
    // Policies
    FirstRecord,
    FirstRecordEnum,
    Header,
    HeaderPolicy,
    IndexHeader,
    IndexPolicy,
    NameHeader,
    NameMatching,
    // Reading
    Reader,
    Record,
    RecordTerminator,
    Result,
    Settings,
    TrimMode,
    UserDefined,
    UserDefinedEnum,
};
