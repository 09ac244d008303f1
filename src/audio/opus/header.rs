pub const OPUS_HEAD_MAGIC: &[u8; 8] = b"OpusHead";
pub const OPUS_TAGS_MAGIC: &[u8; 8] = b"OpusTags";
pub const OPUS_HEAD_LEN: usize = 19;

/// `OpusHead` identification packet for a mono stream.
pub fn build_opus_head(sample_rate: u32) -> [u8; OPUS_HEAD_LEN] {
    let mut head = [0u8; OPUS_HEAD_LEN];
    head[..8].copy_from_slice(OPUS_HEAD_MAGIC);
    head[8] = 1; // version
    head[9] = 1; // channels
    // bytes 10..12: pre-skip 0
    head[12..16].copy_from_slice(&sample_rate.to_le_bytes());
    // bytes 16..18: output gain 0, byte 18: mapping family 0
    head
}

/// `OpusTags` comment packet with one user comment.
pub fn build_opus_tags(vendor: &str, comment: &str) -> Vec<u8> {
    let mut tags = Vec::with_capacity(8 + 4 + vendor.len() + 4 + 4 + comment.len());
    tags.extend_from_slice(OPUS_TAGS_MAGIC);
    tags.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
    tags.extend_from_slice(vendor.as_bytes());
    tags.extend_from_slice(&1u32.to_le_bytes());
    tags.extend_from_slice(&(comment.len() as u32).to_le_bytes());
    tags.extend_from_slice(comment.as_bytes());
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opus_head_fields() {
        let head = build_opus_head(16000);
        assert_eq!(&head[..8], b"OpusHead");
        assert_eq!(head[8], 1);
        assert_eq!(head[9], 1);
        assert_eq!(&head[10..12], &[0, 0]);
        assert_eq!(u32::from_le_bytes([head[12], head[13], head[14], head[15]]), 16000);
        assert_eq!(&head[16..], &[0, 0, 0]);
    }

    #[test]
    fn opus_tags_vendor_and_comment() {
        let tags = build_opus_tags("IBM", "ENCODER=test");
        assert_eq!(&tags[..8], b"OpusTags");
        assert_eq!(&tags[8..12], &3u32.to_le_bytes());
        assert_eq!(&tags[12..15], b"IBM");
        assert_eq!(&tags[15..19], &1u32.to_le_bytes());
        assert_eq!(&tags[19..23], &12u32.to_le_bytes());
        assert_eq!(&tags[23..], b"ENCODER=test");
    }
}
