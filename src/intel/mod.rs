//! Intel tensor: a fixed-size visual summary of the battlefield.
//!
//! The tensor is the sole input of the learned engagement policy and the
//! payload of every training record. `CircleEncoder` is the reference
//! renderer; any `IntelEncoder` producing the same shape can replace it.

pub mod encoding;
pub mod frames;

pub use encoding::{CircleEncoder, IntelEncoder, IntelTensor, BAR_MAX_LEN, BAR_ROWS, CHANNELS};
pub use frames::FrameDumper;
