use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use lineage_types::Event;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::error::{Result, StoreError};

/// Flush/sync strategy for the event log.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncMode {
    /// `fsync` after every append.
    EveryWrite,
    /// Flush to the OS and rely on page-cache writeback.
    #[default]
    OsDefault,
}

/// Header size: 4 bytes length + 4 bytes CRC.
const HEADER_SIZE: usize = 8;

/// Destination for encoded frames that can be cut back after a failed write.
trait FrameSink: Write {
    fn truncate(&mut self, len: u64) -> io::Result<()>;
    fn sync(&mut self) -> io::Result<()>;
}

impl FrameSink for File {
    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }

    fn sync(&mut self) -> io::Result<()> {
        self.sync_all()
    }
}

/// A frame write that failed, and whether its bytes were removed again.
#[derive(Debug)]
enum FrameError {
    RolledBack(io::Error),
    RollbackFailed { cause: io::Error, rollback: io::Error },
}

impl FrameError {
    fn into_cause(self) -> io::Error {
        match self {
            Self::RolledBack(cause) | Self::RollbackFailed { cause, .. } => cause,
        }
    }
}

/// Write `frame` at `frame_offset`, cutting the sink back to `frame_offset`
/// if any part of the write, flush or sync fails.
fn write_frame<S: FrameSink>(
    sink: &mut S,
    frame_offset: u64,
    frame: &[u8],
    sync: bool,
) -> std::result::Result<(), FrameError> {
    let written = sink
        .write_all(frame)
        .and_then(|()| sink.flush())
        .and_then(|()| if sync { sink.sync() } else { Ok(()) });

    match written {
        Ok(()) => Ok(()),
        Err(cause) => match sink.truncate(frame_offset) {
            Ok(()) => Err(FrameError::RolledBack(cause)),
            Err(rollback) => Err(FrameError::RollbackFailed { cause, rollback }),
        },
    }
}

/// Serialize one event into a complete `[len][crc][payload]` frame.
fn encode_frame(event: &Event) -> Result<Vec<u8>> {
    let payload =
        bincode::serialize(event).map_err(|e| StoreError::Serialization(e.to_string()))?;
    let length = u32::try_from(payload.len())
        .map_err(|_| StoreError::Serialization("event exceeds 4 GiB frame".into()))?;
    let crc = crc32fast::hash(&payload);

    let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len());
    frame.extend_from_slice(&length.to_le_bytes());
    frame.extend_from_slice(&crc.to_le_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Decode every intact frame from `reader`, which holds `len` bytes.
fn decode_frames<R: Read>(reader: &mut R, len: u64) -> Result<Vec<Event>> {
    let mut events = Vec::new();
    let mut offset: u64 = 0;

    while offset + HEADER_SIZE as u64 <= len {
        let mut header = [0u8; HEADER_SIZE];
        match reader.read_exact(&mut header) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }

        let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let expected_crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

        if length == 0 || offset + HEADER_SIZE as u64 + u64::from(length) > len {
            warn!(offset, length, len, "invalid frame length; stopping recovery");
            break;
        }

        let mut payload = vec![0u8; length as usize];
        match reader.read_exact(&mut payload) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                warn!(offset, "truncated frame; stopping recovery");
                break;
            }
            Err(e) => return Err(e.into()),
        }
        offset += HEADER_SIZE as u64 + u64::from(length);

        let actual_crc = crc32fast::hash(&payload);
        if actual_crc != expected_crc {
            warn!(
                offset,
                expected = expected_crc,
                actual = actual_crc,
                "CRC mismatch; skipping frame"
            );
            continue;
        }

        match bincode::deserialize::<Event>(&payload) {
            Ok(event) => events.push(event),
            Err(e) => warn!(offset, error = %e, "undecodable frame; skipping"),
        }
    }

    debug!(recovered = events.len(), "event log recovery complete");
    Ok(events)
}

struct LogWriter {
    file: File,
    /// Current write offset in the log file.
    offset: u64,
    /// Set when a failed frame could not be cut off again.
    damaged: bool,
}

/// Append-only, crash-recoverable event log.
///
/// On-disk format, one frame per event:
/// ```text
/// [4 bytes: payload length (little-endian u32)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [N bytes: payload (bincode-serialized Event)]
/// ```
///
/// Recovery reads the file front-to-back. Frames failing the CRC check are
/// skipped; a truncated tail (torn write) ends recovery. Each frame goes to
/// the file in a single unbuffered write and is cut off again if that write
/// fails, so a rejected append never reaches the log.
pub struct EventLog {
    path: PathBuf,
    writer: Mutex<LogWriter>,
    sync_mode: SyncMode,
}

impl EventLog {
    /// Open (or create) the log file at `path`.
    pub fn open(path: &Path, sync_mode: SyncMode) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;
        let offset = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(LogWriter {
                file,
                offset,
                damaged: false,
            }),
            sync_mode,
        })
    }

    /// Append one event. Returns the byte offset of its frame.
    pub fn append(&self, event: &Event) -> Result<u64> {
        let frame = encode_frame(event)?;

        let mut w = self.writer.lock().map_err(|_| StoreError::LockPoisoned)?;
        if w.damaged {
            return Err(StoreError::LogDamaged { offset: w.offset });
        }
        let frame_offset = w.offset;
        let sync = self.sync_mode == SyncMode::EveryWrite;

        if let Err(e) = write_frame(&mut w.file, frame_offset, &frame, sync) {
            if let FrameError::RollbackFailed { rollback, .. } = &e {
                error!(offset = frame_offset, error = %rollback, "failed frame left in event log");
                w.damaged = true;
            }
            return Err(e.into_cause().into());
        }

        w.offset += frame.len() as u64;

        debug!(offset = frame_offset, len = frame.len(), "event log append");
        Ok(frame_offset)
    }

    /// Recover every intact event, in append order.
    pub fn recover(&self) -> Result<Vec<Event>> {
        let mut reader = BufReader::new(File::open(&self.path)?);
        let len = reader.get_ref().metadata()?.len();
        decode_frames(&mut reader, len)
    }

    /// Current write offset.
    pub fn offset(&self) -> Result<u64> {
        Ok(self.writer.lock().map_err(|_| StoreError::LockPoisoned)?.offset)
    }
}
