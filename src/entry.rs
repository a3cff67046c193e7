//! Entry - one archived file's name, offset and size.

use std::fmt;

/// One file record produced by an index parse.
///
/// `offset` is the absolute byte position within the underlying media, with
/// any offset-table indirection already resolved. Directories are traversed
/// during parsing but never emitted as entries.
#[derive(Clone, PartialEq, Eq)]
pub struct Entry {
    /// Path-like name, ancestor directory names joined with `/`.
    pub name: String,
    /// Absolute byte offset within the media.
    pub offset: u64,
    /// Byte length.
    pub size: u64,
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("name", &self.name)
            .field("offset", &self.offset)
            .field("size", &self.size)
            .finish()
    }
}

impl Entry {
    pub fn new(name: String, offset: u64, size: u64) -> Self {
        Self { name, offset, size }
    }

    /// File extension of the last path segment, without the dot.
    ///
    /// Hosts typically dispatch on this to pick an entry subtype; the parser
    /// itself only uses extension *absence* (plain variant directory
    /// heuristic, see [`parsing::plain_index`](crate::parsing::plain_index)).
    pub fn extension(&self) -> Option<&str> {
        let segment = self.name.rsplit('/').next().unwrap_or(&self.name);
        match segment.rfind('.') {
            Some(i) if i + 1 < segment.len() => Some(&segment[i + 1..]),
            _ => None,
        }
    }
}

/// Join a parent label and a child name with `/`, skipping empty parents.
pub(crate) fn join_name(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{}/{}", parent, child)
    }
}
