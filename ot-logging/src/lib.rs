//! ot-logging: NDJSON ingest events + dataset manifests.
//!
//! Append-only NDJSON logs for ingest post-mortems, plus the manifest
//! written next to each published store file.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Store manifest schema version.
pub const STORE_MANIFEST_VERSION: u32 = 1;

/// Manifest written next to a deduplicated store file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreManifestV1 {
    pub store_manifest_version: u32,
    pub created_ts_ms: u64,

    /// Fixed record stride of the store file.
    pub record_bytes: u32,
    /// Records retained after deduplication.
    pub num_records: u64,
    /// Records consumed from the raw input.
    pub records_read: u64,
    /// Exact duplicates discarded.
    pub duplicates: u64,

    /// Raw input the store was built from.
    pub input: String,
    /// blake3 of the published store file.
    pub store_hash: Option<String>,

    pub tool_version: String,
}

pub fn now_ms() -> u64 {
    let d = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    d.as_millis() as u64
}

/// Streaming blake3 hash of a file's contents.
pub fn hash_file(path: impl AsRef<Path>) -> io::Result<String> {
    let mut hasher = blake3::Hasher::new();
    let mut f = File::open(path)?;
    let mut buf = vec![0u8; 1 << 20];
    loop {
        let n = f.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

pub fn read_manifest(path: impl AsRef<Path>) -> Result<StoreManifestV1, NdjsonError> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice::<StoreManifestV1>(&bytes)?)
}

pub fn write_manifest_atomic(
    path: impl AsRef<Path>,
    m: &StoreManifestV1,
) -> Result<(), NdjsonError> {
    let path = path.as_ref();
    let tmp = path.with_extension("json.tmp");
    let bytes = serde_json::to_vec_pretty(m)?;
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Progress/summary event emitted while deduplicating a raw stream.
#[derive(Debug, Clone, Serialize)]
pub struct IngestEventV1 {
    pub event: &'static str,
    pub ts_ms: u64,

    pub records_read: u64,
    pub distinct: u64,
    pub duplicates: u64,
}

#[derive(Debug)]
pub enum NdjsonError {
    Io(io::Error),
    Json(serde_json::Error),
}

impl From<io::Error> for NdjsonError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for NdjsonError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Append-only NDJSON writer.
///
/// Contract: each call writes exactly one JSON object followed by a newline.
pub struct NdjsonWriter {
    w: BufWriter<File>,
    lines_since_flush: u64,
    flush_every_lines: u64,
}

impl NdjsonWriter {
    /// Open a file for append. Creates it if it doesn't exist.
    pub fn open_append(path: impl AsRef<Path>) -> Result<Self, NdjsonError> {
        Self::open_append_with_flush(path, 0)
    }

    /// `flush_every_lines=0` disables periodic flushing.
    pub fn open_append_with_flush(
        path: impl AsRef<Path>,
        flush_every_lines: u64,
    ) -> Result<Self, NdjsonError> {
        let f = OpenOptions::new()
            .create(true)
            .append(true)
            .write(true)
            .open(path)?;
        Ok(Self {
            w: BufWriter::new(f),
            lines_since_flush: 0,
            flush_every_lines,
        })
    }

    pub fn write_event<T: Serialize>(&mut self, event: &T) -> Result<(), NdjsonError> {
        let mut buf = serde_json::to_vec(event)?;
        buf.push(b'\n');
        self.w.write_all(&buf)?;
        self.lines_since_flush += 1;
        if self.flush_every_lines > 0 && self.lines_since_flush >= self.flush_every_lines {
            self.flush()?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), NdjsonError> {
        self.w.flush()?;
        self.lines_since_flush = 0;
        Ok(())
    }
}
