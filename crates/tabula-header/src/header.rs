//! The header abstraction

/// Ordered column names plus a key-to-position lookup
///
/// Implemented by [`NameHeader`](crate::NameHeader) (string keys),
/// [`IndexHeader`](crate::IndexHeader) (integer keys) and
/// [`EnumHeader`](crate::EnumHeader) (enum keys). Empty names are
/// placeholders and never resolve.
pub trait Header {
    /// The column key type
    type Key: ?Sized;

    /// Column names in column order
    fn names(&self) -> &[String];

    /// Position of the column identified by `key`
    fn index_of(&self, key: &Self::Key) -> Option<usize>;

    /// Human-readable form of a key, used in error messages
    fn describe_key(&self, key: &Self::Key) -> String;

    /// Number of columns
    fn len(&self) -> usize {
        self.names().len()
    }

    /// Whether the header has no columns
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of the column at `index`
    fn name_at(&self, index: usize) -> Option<&str> {
        self.names().get(index).map(String::as_str)
    }

    /// Position of the first column named exactly `name` (linear search)
    fn position(&self, name: &str) -> Option<usize> {
        if name.is_empty() {
            return None;
        }
        self.names().iter().position(|n| n == name)
    }

    /// Whether a column is named exactly `name`
    fn contains_name(&self, name: &str) -> bool {
        self.position(name).is_some()
    }
}
