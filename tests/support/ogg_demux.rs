//! Minimal Ogg reader used to check writer output the way a decoder would.

use watson_sdk::audio::ogg::crc;

#[derive(Debug, Clone)]
pub struct Page {
    pub header_type: u8,
    pub granule_position: i64,
    pub serial: u32,
    pub sequence: u32,
    pub checksum: u32,
    pub lacing: Vec<u8>,
    pub payload: Vec<u8>,
    /// Checksum recomputed over the page with a zeroed checksum field.
    pub computed_checksum: u32,
}

impl Page {
    /// Packets whose last segment is on this page.
    pub fn packets(&self) -> Vec<Vec<u8>> {
        let mut packets = Vec::new();
        let mut current = Vec::new();
        let mut offset = 0;
        for &len in &self.lacing {
            let len = len as usize;
            current.extend_from_slice(&self.payload[offset..offset + len]);
            offset += len;
            if len < 255 {
                packets.push(std::mem::take(&mut current));
            }
        }
        packets
    }
}

/// Split a byte stream into pages; panics on malformed input.
pub fn parse_pages(mut data: &[u8]) -> Vec<Page> {
    let mut pages = Vec::new();
    while !data.is_empty() {
        assert!(data.len() >= 27, "truncated page header");
        assert_eq!(&data[..4], b"OggS", "missing capture pattern");
        assert_eq!(data[4], 0, "unknown stream structure version");
        let segments = data[26] as usize;
        let lacing = data[27..27 + segments].to_vec();
        let header_len = 27 + segments;
        let payload_len: usize = lacing.iter().map(|&v| v as usize).sum();
        let page_len = header_len + payload_len;
        assert!(data.len() >= page_len, "truncated page payload");

        let mut zeroed = data[..page_len].to_vec();
        zeroed[22..26].fill(0);

        pages.push(Page {
            header_type: data[5],
            granule_position: i64::from_le_bytes(data[6..14].try_into().unwrap()),
            serial: u32::from_le_bytes(data[14..18].try_into().unwrap()),
            sequence: u32::from_le_bytes(data[18..22].try_into().unwrap()),
            checksum: u32::from_le_bytes(data[22..26].try_into().unwrap()),
            lacing,
            payload: data[header_len..page_len].to_vec(),
            computed_checksum: crc::checksum(0, &zeroed),
        });
        data = &data[page_len..];
    }
    pages
}
