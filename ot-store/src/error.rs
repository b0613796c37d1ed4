//! Error taxonomy for the sample store.
//!
//! Every variant is unrecoverable at the point of detection: no clamping, no
//! repair, no default substitution. A tolerated malformed record would shift
//! every later ordinal and silently misalign labels.

use thiserror::Error;

use ot_core::square::InvalidSquare;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("safetensors: {0}")]
    Safetensors(#[from] safetensors::SafeTensorError),

    /// The stream ended inside a record. `offset` is where the record began.
    #[error("truncated record at byte offset {offset} ({got} of 17 bytes)")]
    TruncatedRecord { offset: u64, got: usize },

    /// A store file whose size is not a whole number of records.
    #[error("store length {len} bytes is not a multiple of 17")]
    MalformedStoreLength { len: u64 },

    /// Ordinal outside `[0, count)`.
    #[error("ordinal {ordinal} out of range: store holds {count} records")]
    OutOfRange { ordinal: u64, count: u64 },

    /// A positioned read failed; the ordinal pins down which sample.
    #[error("read of ordinal {ordinal} failed: {source}")]
    ReadFailed {
        ordinal: u64,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    InvalidSquare(#[from] InvalidSquare),

    /// A label index and store that were not built together.
    #[error("label index out of sync: {index} entries vs {store} store records")]
    LabelMismatch { index: u64, store: u64 },

    #[error("batch_size must be > 0")]
    InvalidBatchSize,
}
