//! Errors reported by rope operations

use thiserror::Error;

/// Everything a caller can get back from a failed rope call.
///
/// A returned error always means the rope was left untouched.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RopeError {
    /// An index or range fell outside `0..=len`, or the range was inverted.
    /// Single-index operations report `start == end`. `len` is in chars,
    /// except for byte-offset queries where it is in bytes.
    #[error("range {start}..{end} is out of bounds for length {len}")]
    IndexOutOfRange { start: usize, end: usize, len: usize },

    /// Byte input was not valid UTF-8
    #[error("invalid UTF-8 after {valid_up_to} valid bytes")]
    InvalidEncoding { valid_up_to: usize },

    /// Leaf bounds that cannot hold every code point or leave no room to split
    #[error("invalid leaf bounds: min_leaf {min_leaf}, max_leaf {max_leaf}")]
    InvalidLeafBounds { min_leaf: usize, max_leaf: usize },
}

impl RopeError {
    pub(crate) fn index(index: usize, len: usize) -> Self {
        RopeError::IndexOutOfRange {
            start: index,
            end: index,
            len,
        }
    }
}

pub type Result<T, E = RopeError> = std::result::Result<T, E>;
