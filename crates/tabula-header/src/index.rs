//! Headers keyed by zero-based column index

use crate::header::Header;

/// Identity header: column `i` is found at position `i`
///
/// Columns are named like spreadsheet columns: A, B, ..., Z, AA, AB, ...
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexHeader {
    names: Vec<String>,
}

impl IndexHeader {
    /// Create a header with `count` columns
    pub fn new(count: usize) -> Self {
        Self {
            names: (0..count).map(column_letters).collect(),
        }
    }
}

impl Header for IndexHeader {
    type Key = usize;

    fn names(&self) -> &[String] {
        &self.names
    }

    fn index_of(&self, key: &usize) -> Option<usize> {
        (*key < self.names.len()).then_some(*key)
    }

    fn describe_key(&self, key: &usize) -> String {
        format!("{} ({})", key, column_letters(*key))
    }
}

/// Convert a zero-based column index to letters (0 = A, 25 = Z, 26 = AA)
pub fn column_letters(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index;

    loop {
        letters.push((n % 26) as u8 + b'A');
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }

    letters.iter().rev().map(|&b| b as char).collect()
}
