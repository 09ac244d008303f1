use super::crc;

pub const OGG_SIGNATURE: &[u8; 4] = b"OggS";

pub const HEADER_TYPE_CONTINUATION: u8 = 0x01;
/// Beginning of stream.
pub const HEADER_TYPE_BOS: u8 = 0x02;
/// End of stream.
pub const HEADER_TYPE_EOS: u8 = 0x04;

/// Fixed part of a page header, before the segment table.
pub const HEADER_LEN: usize = 27;
pub const CHECKSUM_OFFSET: usize = 22;
pub const MAX_SEGMENTS: usize = 255;
/// Largest packet whose lacing fits in one page.
pub const MAX_PACKET_LEN: usize = MAX_SEGMENTS * 255 - 1;

/// Lacing values for one packet: a run of 255s, then the remainder, which
/// is 0 when the length is a multiple of 255.
pub fn lacing_values(len: usize) -> Vec<u8> {
    let mut values = vec![255u8; len / 255];
    values.push((len % 255) as u8);
    values
}

/// Page header with a zeroed checksum slot.
///
/// `segments` is the lacing table; at most 255 entries are written.
pub fn build_page_header(
    header_type: u8,
    granule_position: i64,
    serial: u32,
    sequence: u32,
    segments: &[u8],
) -> Vec<u8> {
    let segments = &segments[..segments.len().min(MAX_SEGMENTS)];
    let mut header = Vec::with_capacity(HEADER_LEN + segments.len());
    header.extend_from_slice(OGG_SIGNATURE);
    header.push(0);
    header.push(header_type);
    header.extend_from_slice(&granule_position.to_le_bytes());
    header.extend_from_slice(&serial.to_le_bytes());
    header.extend_from_slice(&sequence.to_le_bytes());
    header.extend_from_slice(&[0; 4]);
    header.push(segments.len() as u8);
    header.extend_from_slice(segments);
    header
}

/// Complete page: header with its checksum filled in, followed by `payload`.
pub fn build_page(
    header_type: u8,
    granule_position: i64,
    serial: u32,
    sequence: u32,
    segments: &[u8],
    payload: &[u8],
) -> Vec<u8> {
    let mut page = build_page_header(header_type, granule_position, serial, sequence, segments);
    let sum = crc::checksum(crc::checksum(0, &page), payload);
    page[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 4].copy_from_slice(&sum.to_le_bytes());
    page.extend_from_slice(payload);
    page
}
