//! Ogg bitstream framing.
//!
//! Page layout:
//! - capture pattern `OggS` (4 bytes)
//! - version, always 0 (1 byte)
//! - header type flags (1 byte)
//! - granule position, i64 LE (8 bytes)
//! - bitstream serial number, u32 LE (4 bytes)
//! - page sequence number, u32 LE (4 bytes)
//! - CRC checksum, u32 LE (4 bytes)
//! - number of segments (1 byte), then the segment (lacing) table

pub mod crc;
pub mod page;

pub use page::{
    HEADER_TYPE_BOS, HEADER_TYPE_CONTINUATION, HEADER_TYPE_EOS, OGG_SIGNATURE, build_page,
    build_page_header, lacing_values,
};
