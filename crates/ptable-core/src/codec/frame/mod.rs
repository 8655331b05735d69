//! Frame file codec.
//!
//! A frame file is a 2-byte version header followed by fixed-size records.
//! Each record holds a start time, a fade flag, one color triple per enabled
//! OF channel, one triple per strip LED (strip-major) and a checksum over the
//! record's own bytes. Record length is never stored; it is derived from the
//! paired control file through [`FrameLayout`].

pub mod layout;
pub mod parser;
pub mod writer;

pub use layout::FrameLayout;
pub use parser::{DecodedFrame, FrameStream, decode_frame_file, decode_record, decode_stream};
pub use writer::{encode_frame_file, encode_record, encode_uniform_record};
