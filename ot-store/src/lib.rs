//! ot-store: Deduplicated sample store, label index, and batch assembly.
//!
//! The store is a single flat file of fixed-width records; a record's
//! position is its ordinal ID and `ordinal * 17` its byte offset, so serving
//! is one positioned read per sample. Everything downstream (label index,
//! batch assembly) leans on that addressing invariant.

pub mod batch;
pub mod error;
pub mod labels;
pub mod record;
pub mod store;

pub use batch::{Batch, BatchAssembler, Epoch};
pub use error::StoreError;
pub use labels::{LabelIndex, LabelMeta};
pub use record::{Sample, RECORD_BYTES};
pub use store::{ingest, IngestSummary, SampleStore};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
