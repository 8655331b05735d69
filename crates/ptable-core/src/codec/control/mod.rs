//! Control file codec.
//!
//! The control file declares the channel geometry (which OF channels are
//! enabled, how many LEDs each strip carries), the frame count and one
//! timestamp per frame, followed by an additive checksum over every preceding
//! byte. The channel geometry fixes the byte length of every record in the
//! paired frame file.
//!
//! Two channel-table encodings exist (see [`Schema`]); fixed 40/8 tables are
//! the default.

pub mod layout;
pub mod parser;
pub mod writer;

pub use layout::Schema;
pub use parser::{DecodedControl, decode_control};
pub use writer::encode_control;
