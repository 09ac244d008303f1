use super::header::{build_opus_head, build_opus_tags};
use crate::audio::AudioConsumer;
use crate::audio::ogg::page::{
    HEADER_TYPE_BOS, HEADER_TYPE_EOS, MAX_PACKET_LEN, MAX_SEGMENTS, build_page, lacing_values,
};
use crate::defaults;
use crate::error::WatsonError;

/// Stream parameters of an [`OpusWriter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpusWriterConfig {
    pub sample_rate: u32,
    /// Samples per encoded frame; the granule position advances by twice
    /// this value per packet.
    pub frame_size: u32,
    /// Bitstream serial number. Random when unset.
    pub serial: Option<u32>,
}

impl Default for OpusWriterConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::audio::SAMPLE_RATE,
            frame_size: defaults::audio::FRAME_SIZE,
            serial: None,
        }
    }
}

impl OpusWriterConfig {
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_frame_size(mut self, frame_size: u32) -> Self {
        self.frame_size = frame_size;
        self
    }

    pub fn with_serial(mut self, serial: u32) -> Self {
        self.serial = Some(serial);
        self
    }
}

/// Writes encoded Opus packets as an Ogg/Opus stream.
///
/// Pages go to the consumer as soon as they are complete. A page is
/// flushed when a packet arrives while more than
/// [`PACKETS_PER_OGG_PAGE`](defaults::audio::PACKETS_PER_OGG_PAGE) packets
/// are pending, so a page carries up to 51 packets, or earlier when the
/// lacing table would overflow.
///
/// The writer is not thread safe; callers serialize access.
#[derive(Debug)]
pub struct OpusWriter<C: AudioConsumer> {
    consumer: C,
    sample_rate: u32,
    frame_size: u32,
    serial: u32,
    data: Vec<u8>,
    lacing: Vec<u8>,
    packet_count: usize,
    granule_position: i64,
    page_sequence: u32,
}

impl<C: AudioConsumer> OpusWriter<C> {
    pub fn new(consumer: C) -> Self {
        Self::with_config(consumer, OpusWriterConfig::default())
    }

    pub fn with_config(consumer: C, config: OpusWriterConfig) -> Self {
        Self {
            consumer,
            sample_rate: config.sample_rate,
            frame_size: config.frame_size,
            serial: config.serial.unwrap_or_else(rand::random),
            data: Vec::new(),
            lacing: Vec::with_capacity(MAX_SEGMENTS),
            packet_count: 0,
            granule_position: 0,
            page_sequence: 0,
        }
    }

    /// Emit the `OpusHead` page (BOS) and the `OpusTags` page.
    pub fn write_header(&mut self, comment: &str) -> Result<(), WatsonError> {
        let tags = build_opus_tags(defaults::audio::VENDOR, comment);
        if tags.len() > MAX_PACKET_LEN {
            return Err(WatsonError::InvalidParameter(format!(
                "Opus comment is too long ({} bytes)",
                comment.len()
            )));
        }

        let head = build_opus_head(self.sample_rate);
        self.emit_page(HEADER_TYPE_BOS, 0, &lacing_values(head.len()), &head)?;
        self.emit_page(0, 0, &lacing_values(tags.len()), &tags)
    }

    /// Queue one encoded packet. Empty packets are ignored.
    pub fn write_packet(&mut self, packet: &[u8]) -> Result<(), WatsonError> {
        if packet.is_empty() {
            return Ok(());
        }
        if packet.len() > MAX_PACKET_LEN {
            return Err(WatsonError::InvalidParameter(format!(
                "Opus packet of {} bytes exceeds the {MAX_PACKET_LEN} byte page limit",
                packet.len()
            )));
        }

        let lacing = lacing_values(packet.len());
        if self.packet_count > defaults::audio::PACKETS_PER_OGG_PAGE
            || self.lacing.len() + lacing.len() > MAX_SEGMENTS
        {
            self.emit_pending(false)?;
        }

        self.data.extend_from_slice(packet);
        self.lacing.extend_from_slice(&lacing);
        self.packet_count += 1;
        self.granule_position += i64::from(self.frame_size) * 2;
        Ok(())
    }

    /// Emit the pending packets as one page. End-of-stream is only ever
    /// marked by [`close`](Self::close).
    pub fn flush(&mut self) -> Result<(), WatsonError> {
        self.emit_pending(false)
    }

    fn emit_pending(&mut self, eos: bool) -> Result<(), WatsonError> {
        let header_type = if eos { HEADER_TYPE_EOS } else { 0 };
        let data = std::mem::take(&mut self.data);
        let lacing = std::mem::take(&mut self.lacing);
        self.packet_count = 0;
        self.emit_page(header_type, self.granule_position, &lacing, &data)
    }

    /// Flush the final page and return the consumer.
    pub fn close(mut self) -> Result<C, WatsonError> {
        self.emit_pending(true)?;
        tracing::debug!(
            target: "watson_sdk::audio",
            serial = self.serial,
            pages = self.page_sequence,
            granule_position = self.granule_position,
            "ogg stream closed"
        );
        Ok(self.consumer)
    }

    fn emit_page(
        &mut self,
        header_type: u8,
        granule_position: i64,
        lacing: &[u8],
        payload: &[u8],
    ) -> Result<(), WatsonError> {
        let page = build_page(
            header_type,
            granule_position,
            self.serial,
            self.page_sequence,
            lacing,
            payload,
        );
        self.page_sequence += 1;
        self.consumer.consume(&page)
    }

    pub fn serial(&self) -> u32 {
        self.serial
    }

    /// Samples written so far, as recorded in the next page.
    pub fn granule_position(&self) -> i64 {
        self.granule_position
    }

    /// Sequence number of the next page.
    pub fn page_sequence(&self) -> u32 {
        self.page_sequence
    }

    /// Packets waiting for the next flush.
    pub fn pending_packets(&self) -> usize {
        self.packet_count
    }

    pub fn consumer(&self) -> &C {
        &self.consumer
    }

    pub fn consumer_mut(&mut self) -> &mut C {
        &mut self.consumer
    }
}
