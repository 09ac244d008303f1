//! Audio container output for streaming speech services.
//!
//! [`OpusWriter`] frames encoded Opus packets into an Ogg bitstream and
//! hands every finished page to an [`AudioConsumer`], which may buffer it,
//! write it to a file or socket, or forward it to an upload channel.

pub mod ogg;
pub mod opus;

pub use opus::{OpusWriter, OpusWriterConfig};

use crate::error::WatsonError;
use bytes::Bytes;
use std::io;
use tokio::sync::mpsc;

/// Receives encoded container bytes, one Ogg page per call.
pub trait AudioConsumer: Send {
    fn consume(&mut self, data: &[u8]) -> Result<(), WatsonError>;
}

impl AudioConsumer for Vec<u8> {
    fn consume(&mut self, data: &[u8]) -> Result<(), WatsonError> {
        self.extend_from_slice(data);
        Ok(())
    }
}

impl<T: AudioConsumer + ?Sized> AudioConsumer for &mut T {
    fn consume(&mut self, data: &[u8]) -> Result<(), WatsonError> {
        (**self).consume(data)
    }
}

impl<T: AudioConsumer + ?Sized> AudioConsumer for Box<T> {
    fn consume(&mut self, data: &[u8]) -> Result<(), WatsonError> {
        (**self).consume(data)
    }
}

/// Adapts any [`io::Write`] sink, e.g. a `File` or `TcpStream`.
#[derive(Debug)]
pub struct WriterConsumer<W> {
    inner: W,
}

impl<W: io::Write + Send> WriterConsumer<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: io::Write + Send> AudioConsumer for WriterConsumer<W> {
    fn consume(&mut self, data: &[u8]) -> Result<(), WatsonError> {
        self.inner.write_all(data)?;
        Ok(())
    }
}

/// Forwards pages to an async task, typically a chunked upload.
#[derive(Debug, Clone)]
pub struct ChannelConsumer {
    tx: mpsc::UnboundedSender<Bytes>,
}

impl ChannelConsumer {
    pub fn new(tx: mpsc::UnboundedSender<Bytes>) -> Self {
        Self { tx }
    }

    /// Consumer plus the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Bytes>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl AudioConsumer for ChannelConsumer {
    fn consume(&mut self, data: &[u8]) -> Result<(), WatsonError> {
        self.tx
            .send(Bytes::copy_from_slice(data))
            .map_err(|_| WatsonError::IoError("audio receiver was dropped".to_string()))
    }
}
