//! Records handed out by a [`Reader`](crate::Reader)

use std::fmt;
use std::sync::Arc;

use tabula_core::{Error, Result};
use tabula_header::Header;

use crate::field::Field;

/// A record with its number and a shared handle to the reader's header
///
/// Records own their values and can be kept after the reader moves on.
pub struct Record<H> {
    record_number: usize,
    values: Vec<Option<String>>,
    header: Arc<H>,
}

impl<H: Header> Record<H> {
    pub(crate) fn new(record_number: usize, values: Vec<Option<String>>, header: Arc<H>) -> Self {
        debug_assert_eq!(values.len(), header.len());
        Self {
            record_number,
            values,
            header,
        }
    }

    /// 1-based record number within the source
    pub fn record_number(&self) -> usize {
        self.record_number
    }

    /// The header this record was read with
    pub fn header(&self) -> &H {
        &self.header
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the record has no fields
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All values in column order
    pub fn values(&self) -> &[Option<String>] {
        &self.values
    }

    /// Consume the record and return its values
    pub fn into_values(self) -> Vec<Option<String>> {
        self.values
    }

    /// Values in column order, `None` for null fields
    pub fn iter(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        self.values.iter().map(Option::as_deref)
    }

    fn index(&self, key: &H::Key) -> Result<usize> {
        self.header
            .index_of(key)
            .ok_or_else(|| Error::UnknownColumn {
                record_number: self.record_number,
                column: self.header.describe_key(key),
            })
    }

    /// Value of the column identified by `key`
    ///
    /// `Ok(None)` means the field is null; an unknown key is an error.
    pub fn get(&self, key: &H::Key) -> Result<Option<&str>> {
        let index = self.index(key)?;
        Ok(self.values[index].as_deref())
    }

    /// Field handle for typed conversions
    pub fn field(&self, key: &H::Key) -> Result<Field<'_>> {
        let index = self.index(key)?;
        let column = self.header.name_at(index).unwrap_or_default();
        Ok(Field::new(
            self.record_number,
            column,
            self.values[index].as_deref(),
        ))
    }

    /// Field handles for several columns, in the order given
    pub fn fields<'k, I>(&self, keys: I) -> Result<Vec<Field<'_>>>
    where
        I: IntoIterator<Item = &'k H::Key>,
        H::Key: 'k,
    {
        keys.into_iter().map(|key| self.field(key)).collect()
    }
}

impl<H> Clone for Record<H> {
    fn clone(&self) -> Self {
        Self {
            record_number: self.record_number,
            values: self.values.clone(),
            header: Arc::clone(&self.header),
        }
    }
}

impl<H: Header> fmt::Debug for Record<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("record_number", &self.record_number)
            .field("columns", &self.header.names())
            .field("values", &self.values)
            .finish()
    }
}

#[cfg(feature = "serde")]
impl<H: Header> serde::Serialize for Record<H> {
    /// Serialized as a map from column name to value
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.header.names().iter().zip(&self.values) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
