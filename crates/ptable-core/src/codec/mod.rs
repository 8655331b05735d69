//! Pattern-table codecs.
//!
//! Each file kind follows the same layering:
//! - `layout`: byte offsets and sizes (source of truth)
//! - `reader` (shared): bounds-checked byte access
//! - `parser`: decoding into domain values (no direct byte indexing)
//! - `writer`: encoding, including the trailing checksum
//!
//! Codecs are pure and contain no I/O; the `files` module handles paths.

pub(crate) mod common;
pub mod control;
pub mod error;
pub mod frame;
