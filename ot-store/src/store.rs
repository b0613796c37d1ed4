//! Deduplicating ingest and random-access serving for sample stores.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;

use crate::error::StoreError;
use crate::record::{read_record, Sample, RECORD_BYTES};

/// Counters reported by a completed ingest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub records_read: u64,
    pub distinct: u64,
    pub duplicates: u64,
}

/// Deduplicate a raw 17-byte sample stream into a new store file.
///
/// Samples are keyed on the full (black, white, move) tuple; membership and
/// insert are O(1) amortized, so a single pass over the input suffices and
/// memory stays proportional to the distinct count. The retained set is
/// sorted by encoded record before writing, so identical raw inputs always
/// produce byte-identical stores. Output goes to a temp file and is renamed
/// into place only once the input is fully consumed; a truncated input
/// aborts the ingest with the offset of the malformed record and publishes
/// nothing.
pub fn ingest(input: &Path, out: &Path) -> Result<IngestSummary, StoreError> {
    let file = File::open(input)?;
    let mut reader = BufReader::new(file);

    let mut seen: FxHashSet<Sample> = FxHashSet::default();
    let mut records_read = 0u64;
    let mut offset = 0u64;
    while let Some(sample) = read_record(&mut reader, offset)? {
        records_read += 1;
        offset += RECORD_BYTES as u64;
        seen.insert(sample);
    }

    let mut retained: Vec<[u8; RECORD_BYTES]> =
        seen.into_iter().map(|s| s.encode()).collect();
    retained.sort_unstable();

    let tmp = tmp_path(out);
    {
        let mut w = BufWriter::new(File::create(&tmp)?);
        for rec in &retained {
            w.write_all(rec)?;
        }
        w.flush()?;
    }
    fs::rename(&tmp, out)?;

    let distinct = retained.len() as u64;
    Ok(IngestSummary {
        records_read,
        distinct,
        duplicates: records_read - distinct,
    })
}

fn tmp_path(out: &Path) -> PathBuf {
    let mut s = out.as_os_str().to_os_string();
    s.push(".tmp");
    PathBuf::from(s)
}

/// Read-only random-access view over a deduplicated store file.
///
/// Reads are positioned (`read_exact_at`), so one handle serves any number
/// of concurrent callers without a shared cursor. The file is treated as
/// immutable for the lifetime of the handle.
pub struct SampleStore {
    path: PathBuf,
    file: File,
    count: u64,
}

impl SampleStore {
    /// Open a store file, validating that its length is a whole number of
    /// records.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        if len % RECORD_BYTES as u64 != 0 {
            return Err(StoreError::MalformedStoreLength { len });
        }
        Ok(Self {
            path: path.to_path_buf(),
            file,
            count: len / RECORD_BYTES as u64,
        })
    }

    /// Number of records in the store.
    pub fn len(&self) -> u64 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fetch the record at `ordinal` (0-based).
    ///
    /// Callers are expected to stay within `[0, len)`; anything else is a
    /// contract violation surfaced as `OutOfRange`, never clamped.
    pub fn read_at(&self, ordinal: u64) -> Result<Sample, StoreError> {
        if ordinal >= self.count {
            return Err(StoreError::OutOfRange {
                ordinal,
                count: self.count,
            });
        }
        let mut buf = [0u8; RECORD_BYTES];
        self.file
            .read_exact_at(&mut buf, ordinal * RECORD_BYTES as u64)
            .map_err(|source| StoreError::ReadFailed { ordinal, source })?;
        Ok(Sample::decode(&buf))
    }

    /// Sequential iterator over all records in ordinal order, on its own
    /// buffered handle.
    pub fn iter(&self) -> Result<StoreIter, StoreError> {
        let file = File::open(&self.path)?;
        Ok(StoreIter {
            reader: BufReader::new(file),
            offset: 0,
        })
    }
}

/// Sequential reader over a store, in ordinal order.
pub struct StoreIter {
    reader: BufReader<File>,
    offset: u64,
}

impl Iterator for StoreIter {
    type Item = Result<Sample, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        match read_record(&mut self.reader, self.offset) {
            Ok(Some(sample)) => {
                self.offset += RECORD_BYTES as u64;
                Some(Ok(sample))
            }
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
