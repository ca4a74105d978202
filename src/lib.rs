//! Mutable UTF-8 rope
//!
//! Text lives in bounded, char-aligned leaves under a binary tree whose
//! internal nodes cache the char and byte totals of their left subtree.
//! Edits are split and concat over that tree, so inserting into or removing
//! from a large text copies at most the leaves at the cut points.
//!
//! ```
//! use std::io::Read;
//! use tiny_rope::Rope;
//!
//! let mut rope = Rope::from_str("🐿🐿🐿🐿🐿");
//! rope.insert(1, "a").unwrap();
//! assert_eq!(rope, "🐿a🐿🐿🐿🐿");
//! assert_eq!(rope.len_chars(), 6);
//! assert_eq!(rope.len_bytes(), 21);
//!
//! rope.remove(0..2).unwrap();
//! let mut text = String::new();
//! rope.reader().read_to_string(&mut text).unwrap();
//! assert_eq!(text, "🐿🐿🐿🐿");
//! ```

mod balance;
mod config;
mod edit;
mod error;
mod node;
mod reader;
mod rope;
mod utf8;

pub use config::{RopeConfig, DEFAULT_MAX_LEAF};
pub use error::{Result, RopeError};
pub use reader::{Chunks, RopeReader};
pub use rope::Rope;
