//! Opus in Ogg: identification and comment headers plus the page writer.

pub mod header;
mod writer;

pub use writer::{OpusWriter, OpusWriterConfig};
