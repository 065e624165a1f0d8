//! Raw Mode S feed connector
//!
//!  Reads newline separated `*...;` frames from a TCP feed (dump1090 raw
//!  output style) and hands each one to the decoder independently.

use std::io;
use std::time::Duration;

use bytes::BytesMut;
use crossbeam_channel::{Sender, TrySendError};
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::decoder::{self, DecodedMessage};
use crate::stats::SharedStats;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const READ_CHUNK: usize = 4096;
/// Longest run of bytes without a newline before it is thrown away.
const MAX_PENDING: usize = 4096;

/// Splits a byte stream into trimmed, non-empty lines.
#[derive(Debug, Default)]
pub struct FrameSplitter {
    buf: BytesMut,
}

impl FrameSplitter {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(READ_CHUNK),
        }
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Next complete frame, or `None` until more data arrives.
    pub fn next_frame(&mut self) -> Option<String> {
        loop {
            let Some(pos) = self.buf.iter().position(|&b| b == b'\n') else {
                if self.buf.len() > MAX_PENDING {
                    warn!("Discarding {} bytes without a frame separator", self.buf.len());
                    self.buf.clear();
                }
                return None;
            };

            let line = self.buf.split_to(pos + 1);
            if let Some(frame) = trim_frame(&line) {
                return Some(frame);
            }
        }
    }

    /// Whatever is left once the stream has ended.
    pub fn finish(&mut self) -> Option<String> {
        let rest = self.buf.split();
        trim_frame(&rest)
    }

    fn buffer_mut(&mut self) -> &mut BytesMut {
        &mut self.buf
    }
}

fn trim_frame(line: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(line);
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Where decoded records and counters go.
#[derive(Clone)]
pub struct FeedSink {
    tx: Sender<DecodedMessage>,
    stats: SharedStats,
}

impl FeedSink {
    pub fn new(tx: Sender<DecodedMessage>, stats: SharedStats) -> Self {
        Self { tx, stats }
    }

    /// Decode one frame for a live feed. Failures are counted and logged,
    /// never returned, so the next frame is always processed. A full queue
    /// drops the record rather than stalling the reader.
    pub fn handle_frame(&self, frame: &str) {
        let Some(msg) = self.decode_counted(frame) else {
            return;
        };

        match self.tx.try_send(msg) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => self.stats.write().dropped += 1,
            Err(TrySendError::Disconnected(_)) => {
                debug!("Processor gone, dropping decoded message");
                self.stats.write().dropped += 1;
            }
        }
    }

    /// Like [`handle_frame`](Self::handle_frame) but waits for room in the
    /// queue. Used for file and stdin input, where nothing may be lost.
    pub fn handle_frame_blocking(&self, frame: &str) {
        let Some(msg) = self.decode_counted(frame) else {
            return;
        };

        if self.tx.send(msg).is_err() {
            debug!("Processor gone, dropping decoded message");
            self.stats.write().dropped += 1;
        }
    }

    fn decode_counted(&self, frame: &str) -> Option<DecodedMessage> {
        let result = decoder::decode(frame);

        let mut stats = self.stats.write();
        stats.frames += 1;

        match result {
            Ok(msg) => {
                stats.decoded += 1;
                if msg.is_identification() {
                    stats.identification += 1;
                }
                Some(msg)
            }
            Err(e) => {
                stats.rejected += 1;
                debug!("Rejected frame {:?}: {}", frame, e);
                None
            }
        }
    }
}

/// Open a connection to the feed, giving up after a few seconds.
pub async fn connect(addr: &str) -> io::Result<TcpStream> {
    match tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect(addr)).await {
        Ok(result) => result,
        Err(_) => Err(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("connection to {} timed out", addr),
        )),
    }
}

/// Read frames until the feed closes.
pub async fn run_feed(mut stream: TcpStream, sink: FeedSink) -> io::Result<()> {
    let peer = stream.peer_addr()?;
    info!("Reading Mode S feed from {}", peer);

    let mut splitter = FrameSplitter::new();

    loop {
        let buf = splitter.buffer_mut();
        buf.reserve(READ_CHUNK);
        if stream.read_buf(buf).await? == 0 {
            break;
        }

        while let Some(frame) = splitter.next_frame() {
            sink.handle_frame(&frame);
        }
    }

    if let Some(frame) = splitter.finish() {
        sink.handle_frame(&frame);
    }

    info!("Feed {} closed", peer);
    Ok(())
}

/// Decode frames from any buffered reader, one per line. Every decoded
/// record reaches the queue; the reader waits when the processor is behind.
pub fn run_reader<R: io::BufRead>(mut reader: R, sink: &FeedSink) -> io::Result<()> {
    let mut splitter = FrameSplitter::new();

    loop {
        let chunk = reader.fill_buf()?;
        if chunk.is_empty() {
            break;
        }
        let len = chunk.len();
        splitter.push(chunk);
        reader.consume(len);

        while let Some(frame) = splitter.next_frame() {
            sink.handle_frame_blocking(&frame);
        }
    }

    if let Some(frame) = splitter.finish() {
        sink.handle_frame_blocking(&frame);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::FeedStats;
    use crossbeam_channel::bounded;
    use parking_lot::RwLock;
    use std::sync::Arc;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    const KLM: &str = "*8D4840D6202CC371C32CE0576098;";
    const POS: &str = "*8D40621D58C382D690C8AC2863A7;";

    fn sink(capacity: usize) -> (FeedSink, crossbeam_channel::Receiver<DecodedMessage>, SharedStats) {
        let (tx, rx) = bounded(capacity);
        let stats = Arc::new(RwLock::new(FeedStats::default()));
        (FeedSink::new(tx, Arc::clone(&stats)), rx, stats)
    }

    #[test]
    fn test_splitter_whole_lines() {
        let mut splitter = FrameSplitter::new();
        splitter.push(format!("{}\n{}\r\n", KLM, POS).as_bytes());
        assert_eq!(splitter.next_frame().as_deref(), Some(KLM));
        assert_eq!(splitter.next_frame().as_deref(), Some(POS));
        assert_eq!(splitter.next_frame(), None);
        assert_eq!(splitter.finish(), None);
    }

    #[test]
    fn test_splitter_partial_chunks() {
        let mut splitter = FrameSplitter::new();
        splitter.push(&KLM.as_bytes()[..10]);
        assert_eq!(splitter.next_frame(), None);
        splitter.push(&KLM.as_bytes()[10..]);
        splitter.push(b"\n\n   \n*8D40");
        assert_eq!(splitter.next_frame().as_deref(), Some(KLM));
        assert_eq!(splitter.next_frame(), None);
        assert_eq!(splitter.finish().as_deref(), Some("*8D40"));
    }

    #[test]
    fn test_splitter_discards_runaway_data() {
        let mut splitter = FrameSplitter::new();
        splitter.push(&vec![b'A'; MAX_PENDING + 1]);
        assert_eq!(splitter.next_frame(), None);
        splitter.push(format!("{}\n", KLM).as_bytes());
        assert_eq!(splitter.next_frame().as_deref(), Some(KLM));
    }

    #[test]
    fn test_sink_counts_and_continues_after_failure() {
        let (sink, rx, stats) = sink(8);
        sink.handle_frame("garbage");
        sink.handle_frame(KLM);
        sink.handle_frame(POS);

        let first = rx.try_recv().unwrap();
        assert_eq!(first.data.message, "KLM1023_");
        assert_eq!(rx.try_recv().unwrap().icao, "40621D");

        let stats = stats.read();
        assert_eq!(stats.frames, 3);
        assert_eq!(stats.decoded, 2);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.identification, 1);
        assert_eq!(stats.dropped, 0);
    }

    #[test]
    fn test_sink_drops_when_full() {
        let (sink, _rx, stats) = sink(1);
        sink.handle_frame(KLM);
        sink.handle_frame(KLM);
        assert_eq!(stats.read().dropped, 1);
    }

    #[test]
    fn test_run_reader() {
        let (sink, rx, stats) = sink(8);
        let input = format!("{}\nnot a frame\n{}", KLM, POS);
        run_reader(input.as_bytes(), &sink).unwrap();
        assert_eq!(rx.len(), 2);
        assert_eq!(stats.read().rejected, 1);
    }

    #[test]
    fn test_run_reader_waits_for_slow_processor() {
        const FRAMES: usize = 5000;
        let (sink, rx, stats) = sink(16);

        let consumer = std::thread::spawn(move || {
            let mut received = 0;
            while rx.recv().is_ok() {
                std::thread::sleep(std::time::Duration::from_micros(20));
                received += 1;
            }
            received
        });

        let input = format!("{}\n", KLM).repeat(FRAMES);
        run_reader(input.as_bytes(), &sink).unwrap();
        drop(sink);

        assert_eq!(consumer.join().unwrap(), FRAMES);
        let stats = stats.read();
        assert_eq!(stats.decoded, FRAMES as u64);
        assert_eq!(stats.dropped, 0);
    }

    #[test]
    fn test_blocking_sink_counts_closed_processor() {
        let (sink, rx, stats) = sink(1);
        drop(rx);
        sink.handle_frame_blocking(KLM);
        assert_eq!(stats.read().decoded, 1);
        assert_eq!(stats.read().dropped, 1);
    }

    #[tokio::test]
    async fn test_run_feed_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(format!("{}\n*BAD;\n", KLM).as_bytes()).await.unwrap();
            socket.write_all(POS.as_bytes()).await.unwrap();
            socket.write_all(b"\n").await.unwrap();
        });

        let (sink, rx, stats) = sink(8);
        let stream = connect(&addr.to_string()).await.unwrap();
        run_feed(stream, sink).await.unwrap();
        server.await.unwrap();

        let icaos: Vec<String> = rx.try_iter().map(|m| m.icao).collect();
        assert_eq!(icaos, vec!["4840D6", "40621D"]);
        assert_eq!(stats.read().rejected, 1);
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        assert!(connect(&addr.to_string()).await.is_err());
    }
}
