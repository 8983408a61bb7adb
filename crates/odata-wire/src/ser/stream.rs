// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Lazily produced entity collections.
//!
//! A producer thread serializes into a [`RelayWriter`]; the caller reads the
//! same byte stream from a [`ContentStream`]. The relay is a bounded channel
//! of byte chunks, so a slow reader blocks the producer. Dropping the reader
//! makes the producer's next write fail with `BrokenPipe`.

use crate::data::Entity;
use crate::error::SerResult;

/// Source of entities for streamed collections.
///
/// Count and next link are read after iteration has ended, so sources that
/// learn them while producing can report them.
pub trait EntityIterator: Iterator<Item = SerResult<Entity>> {
    fn inline_count(&self) -> Option<i64> {
        None
    }

    fn next_link(&self) -> Option<String> {
        None
    }
}

/// [`EntityIterator`] over an in-memory list.
#[derive(Debug)]
pub struct VecEntityIterator {
    entities: std::vec::IntoIter<Entity>,
    count: Option<i64>,
    next_link: Option<String>,
}

impl VecEntityIterator {
    pub fn new(entities: Vec<Entity>) -> Self {
        Self {
            entities: entities.into_iter(),
            count: None,
            next_link: None,
        }
    }

    pub fn with_count(mut self, count: i64) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_next_link(mut self, link: impl Into<String>) -> Self {
        self.next_link = Some(link.into());
        self
    }
}

impl Iterator for VecEntityIterator {
    type Item = SerResult<Entity>;

    fn next(&mut self) -> Option<Self::Item> {
        self.entities.next().map(Ok)
    }
}

impl EntityIterator for VecEntityIterator {
    fn inline_count(&self) -> Option<i64> {
        self.count
    }

    fn next_link(&self) -> Option<String> {
        self.next_link.clone()
    }
}

#[cfg(feature = "streaming")]
pub use relay::{ContentStream, RelayWriter};

#[cfg(feature = "streaming")]
mod relay {
    use crate::error::{SerResult, SerializerError};
    use crossbeam::channel::{self, Receiver, Sender};
    use std::io::{self, Read, Write};
    use std::mem;
    use std::thread::JoinHandle;

    type Chunk = io::Result<Vec<u8>>;

    /// Producer side of the relay.
    #[derive(Debug)]
    pub struct RelayWriter {
        sender: Sender<Chunk>,
        buf: Vec<u8>,
        chunk_size: usize,
    }

    impl RelayWriter {
        fn new(sender: Sender<Chunk>, chunk_size: usize) -> Self {
            let chunk_size = chunk_size.max(1);
            Self {
                sender,
                buf: Vec::with_capacity(chunk_size),
                chunk_size,
            }
        }

        fn send_chunk(&mut self) -> io::Result<()> {
            if self.buf.is_empty() {
                return Ok(());
            }
            let chunk = mem::replace(&mut self.buf, Vec::with_capacity(self.chunk_size));
            self.sender.send(Ok(chunk)).map_err(|_| {
                io::Error::new(io::ErrorKind::BrokenPipe, "content stream closed by reader")
            })
        }

        /// Hand the remaining bytes over; the reader then sees end of stream.
        fn finish(mut self) -> io::Result<()> {
            self.send_chunk()
        }

        /// Discard buffered bytes and report `err` to the reader.
        fn fail(self, err: SerializerError) {
            let io_err = match err {
                SerializerError::Io(e) => e,
                other => io::Error::other(other.to_string()),
            };
            // the reader may already be gone
            let _ = self.sender.send(Err(io_err));
        }
    }

    impl Write for RelayWriter {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            self.buf.extend_from_slice(data);
            if self.buf.len() >= self.chunk_size {
                self.send_chunk()?;
            }
            Ok(data.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.send_chunk()
        }
    }

    /// Reader side of the relay.
    #[derive(Debug)]
    pub struct ContentStream {
        receiver: Option<Receiver<Chunk>>,
        current: Vec<u8>,
        pos: usize,
        producer: Option<JoinHandle<()>>,
    }

    impl ContentStream {
        /// Run `produce` on a new thread, writing into a relay with room for
        /// `capacity` chunks of `chunk_size` bytes.
        pub fn spawn<F>(capacity: usize, chunk_size: usize, produce: F) -> SerResult<Self>
        where
            F: FnOnce(&mut RelayWriter) -> SerResult<()> + Send + 'static,
        {
            let (sender, receiver) = channel::bounded(capacity.max(1));
            let producer = std::thread::Builder::new()
                .name("odata-relay".to_string())
                .spawn(move || {
                    let mut writer = RelayWriter::new(sender, chunk_size);
                    match produce(&mut writer) {
                        Ok(()) => {
                            if let Err(e) = writer.finish() {
                                log::debug!("[stream] reader left before end of stream: {}", e);
                            }
                        }
                        Err(e) => {
                            log::warn!("[stream] producer aborted: {}", e);
                            writer.fail(e);
                        }
                    }
                })?;
            Ok(Self {
                receiver: Some(receiver),
                current: Vec::new(),
                pos: 0,
                producer: Some(producer),
            })
        }
    }

    impl Read for ContentStream {
        fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
            loop {
                if self.pos < self.current.len() {
                    let n = out.len().min(self.current.len() - self.pos);
                    out[..n].copy_from_slice(&self.current[self.pos..self.pos + n]);
                    self.pos += n;
                    return Ok(n);
                }
                let Some(receiver) = &self.receiver else {
                    return Ok(0);
                };
                match receiver.recv() {
                    Ok(Ok(chunk)) => {
                        self.current = chunk;
                        self.pos = 0;
                    }
                    Ok(Err(e)) => {
                        self.receiver = None;
                        return Err(e);
                    }
                    // producer finished and dropped its sender
                    Err(_) => {
                        self.receiver = None;
                        return Ok(0);
                    }
                }
            }
        }
    }

    impl Drop for ContentStream {
        fn drop(&mut self) {
            // disconnect first so a blocked producer wakes up with BrokenPipe
            self.receiver = None;
            if let Some(handle) = self.producer.take() {
                if handle.join().is_err() {
                    log::warn!("[stream] producer thread panicked");
                }
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        #[test]
        fn test_relay_delivers_all_bytes() {
            let mut stream = ContentStream::spawn(2, 4, |w| {
                for i in 0..100u8 {
                    w.write_all(&[i])?;
                }
                Ok(())
            })
            .unwrap();
            let mut out = Vec::new();
            stream.read_to_end(&mut out).unwrap();
            assert_eq!(out, (0..100u8).collect::<Vec<_>>());
        }

        #[test]
        fn test_producer_error_reaches_reader() {
            let mut stream = ContentStream::spawn(2, 4, |w| {
                w.write_all(b"{\"value\":[")?;
                Err(SerializerError::MissingId)
            })
            .unwrap();
            let mut out = Vec::new();
            let err = stream.read_to_end(&mut out).unwrap_err();
            assert!(err.to_string().contains("Entity id"));
        }

        #[test]
        fn test_dropped_reader_stops_producer() {
            let written = Arc::new(AtomicUsize::new(0));
            let seen = Arc::clone(&written);
            let stream = ContentStream::spawn(1, 1, move |w| {
                loop {
                    w.write_all(b"x")?;
                    seen.fetch_add(1, Ordering::SeqCst);
                }
            })
            .unwrap();
            // joins the producer, which must observe the closed relay
            drop(stream);
            assert!(written.load(Ordering::SeqCst) < 10);
        }
    }
}
