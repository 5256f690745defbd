//! Duplicate-set bookkeeping: content keys, ordered sets, the index.
//!
//! Files reduce to a [`ContentKey`]; byte-identical files share a key and
//! collect into a [`DuplicateSet`] inside the [`DuplicateIndex`]. Sets keep
//! their members in [`FilenameOrder`]; the index iterates keys ascending by
//! `(size, hex)`, so results are deterministic across runs.

pub mod index;
pub mod order;

pub use index::{ContentKey, DuplicateIndex, DuplicateSet};
pub use order::{same_object, sort_by_file_size, sort_by_modified, FilenameOrder};
