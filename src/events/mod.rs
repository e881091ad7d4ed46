//! Typed decoding of receipt logs.

pub mod decoder;

pub use decoder::{DecodedEvent, EventDecoder};
