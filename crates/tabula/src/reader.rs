//! Reader: an iterator plus a header

use std::fmt;
use std::io::Read;
use std::sync::Arc;

use tabula_core::{CharSource, CsvIterator, Error, ReadSource, Result, Settings, StrSource};
use tabula_header::{Header, HeaderPolicy};

use crate::record::Record;

/// Reads records and checks each one against the header
///
/// # Example
///
/// ```rust
/// use tabula::prelude::*;
///
/// let text = "Manufacturer,Name\r\nWalther,WA 2000\r\nDenel,NTW-20\r\n";
/// let mut reader = Reader::from_str(text, &Settings::default(), &FirstRecord::new())?;
///
/// let mut names = Vec::new();
/// while reader.read()? {
///     if let Some(record) = reader.record()? {
///         names.push(record.get("Name")?.unwrap_or_default().to_owned());
///     }
/// }
/// assert_eq!(names, ["WA 2000", "NTW-20"]);
/// # Ok::<(), tabula::Error>(())
/// ```
pub struct Reader<S, H> {
    iter: CsvIterator<S>,
    header: Option<Arc<H>>,
    record: Option<Record<H>>,
}

impl<'a, H: Header> Reader<StrSource<'a>, H> {
    /// Read from an in-memory string
    pub fn from_str<P>(text: &'a str, settings: &Settings, policy: &P) -> Result<Self>
    where
        P: HeaderPolicy<Header = H>,
    {
        Self::new(CsvIterator::from_str(text, settings)?, policy)
    }
}

impl<R: Read, H: Header> Reader<ReadSource<R>, H> {
    /// Read UTF-8 text from `reader`
    ///
    /// Pass `&mut reader` to keep the reader open after this one is dropped.
    pub fn from_reader<P>(reader: R, settings: &Settings, policy: &P) -> Result<Self>
    where
        P: HeaderPolicy<Header = H>,
    {
        Self::new(CsvIterator::from_reader(reader, settings)?, policy)
    }
}

impl<S: CharSource, H: Header> Reader<S, H> {
    /// Wrap an iterator that has not been started
    ///
    /// The first record is parsed right away so the policy can build the
    /// header; an empty source has no header.
    pub fn new<P>(mut iter: CsvIterator<S>, policy: &P) -> Result<Self>
    where
        P: HeaderPolicy<Header = H>,
    {
        let header = if iter.advance()? {
            Some(Arc::new(policy.create_header(&mut iter)?))
        } else {
            log::debug!("source is empty, no header created");
            None
        };

        Ok(Self {
            iter,
            header,
            record: None,
        })
    }

    fn ensure_open(&self) -> Result<()> {
        if self.iter.is_closed() {
            Err(Error::Closed)
        } else {
            Ok(())
        }
    }

    /// Move to the next record. Returns `false` when there are no more.
    ///
    /// A record whose field count differs from the header length is an
    /// error; the reader stays on it.
    pub fn read(&mut self) -> Result<bool> {
        self.ensure_open()?;

        let (Some(actual), Some(header)) = (self.iter.record()?.map(<[_]>::len), &self.header)
        else {
            self.record = None;
            return Ok(false);
        };

        let record_number = self.iter.record_number()?;
        if actual != header.len() {
            return Err(Error::FieldCount {
                record_number,
                expected: header.len(),
                actual,
            });
        }

        let header = Arc::clone(header);
        let values = self.iter.take_record()?.unwrap_or_default();
        self.record = Some(Record::new(record_number, values, header));
        self.iter.advance()?;
        Ok(true)
    }

    /// The record returned by the last successful `read`
    pub fn record(&self) -> Result<Option<&Record<H>>> {
        self.ensure_open()?;
        Ok(self.record.as_ref())
    }

    /// The header, `None` if the source had no records
    pub fn header(&self) -> Result<Option<&H>> {
        self.ensure_open()?;
        Ok(self.header.as_deref())
    }

    /// Shared handle to the header
    pub fn shared_header(&self) -> Result<Option<Arc<H>>> {
        self.ensure_open()?;
        Ok(self.header.clone())
    }

    /// Release the source. Calling it again does nothing.
    pub fn close(&mut self) {
        self.iter.close();
        self.record = None;
        self.header = None;
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.iter.is_closed()
    }

    /// Stop reading and hand the source back, or `None` if already closed
    pub fn into_inner(self) -> Option<S> {
        self.iter.into_inner()
    }

    /// Iterate over the remaining records by value
    ///
    /// The adapter stops after the first error.
    pub fn records(&mut self) -> Records<'_, S, H> {
        Records {
            reader: self,
            failed: false,
        }
    }
}

impl<S: CharSource, H: Header> fmt::Debug for Reader<S, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reader")
            .field("state", &self.iter.state())
            .field("columns", &self.header.as_ref().map(|h| h.names()))
            .field("record", &self.record)
            .finish()
    }
}

/// Record-by-record adapter returned by [`Reader::records`]
pub struct Records<'a, S, H> {
    reader: &'a mut Reader<S, H>,
    failed: bool,
}

impl<S: CharSource, H: Header> Iterator for Records<'_, S, H> {
    type Item = Result<Record<H>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        match self.reader.read() {
            Ok(true) => self.reader.record.take().map(Ok),
            Ok(false) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
