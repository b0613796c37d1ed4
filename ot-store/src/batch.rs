//! Shuffled fixed-size batch assembly for an external training loop.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use ot_core::config::BatchingConfig;
use ot_features::encode::{encode_position, BoardTensor};

use crate::error::StoreError;
use crate::labels::LabelIndex;
use crate::store::SampleStore;

/// One fixed-size batch of decoded tensors and class labels.
pub type Batch = Vec<(BoardTensor, u8)>;

/// Assembles epochs of `(tensor, class)` batches over an ordinal partition.
///
/// Only full batches are emitted: the trailing `len % batch_size` ordinals of
/// an epoch are dropped, matching the floor-division batch count the
/// classifier was trained against. When shuffling is enabled, a fresh
/// permutation is drawn at the start of every epoch from a seeded RNG, so a
/// given (seed, epoch) pair always yields the same order.
pub struct BatchAssembler<'a> {
    store: &'a SampleStore,
    labels: &'a LabelIndex,
    ordinals: Vec<u64>,
    batch_size: usize,
    shuffle: bool,
    seed: u64,
    epochs_started: u64,
}

impl<'a> BatchAssembler<'a> {
    /// Create an assembler over `ordinals` (a partition of the store).
    ///
    /// Fails if the label index was not built from `store` or if the batch
    /// size is zero.
    pub fn new(
        store: &'a SampleStore,
        labels: &'a LabelIndex,
        ordinals: Vec<u64>,
        batching: &BatchingConfig,
    ) -> Result<Self, StoreError> {
        if batching.batch_size == 0 {
            return Err(StoreError::InvalidBatchSize);
        }
        labels.verify_pairing(store)?;
        Ok(Self {
            store,
            labels,
            ordinals,
            batch_size: batching.batch_size,
            shuffle: batching.shuffle,
            seed: batching.seed,
            epochs_started: 0,
        })
    }

    /// Full batches per epoch (floor division; the remainder is dropped).
    pub fn batches_per_epoch(&self) -> usize {
        self.ordinals.len() / self.batch_size
    }

    /// Start a new epoch, reshuffling when enabled.
    pub fn epoch(&mut self) -> Epoch<'a> {
        let mut order = self.ordinals.clone();
        if self.shuffle {
            let mut rng = ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(self.epochs_started));
            order.shuffle(&mut rng);
        }
        self.epochs_started += 1;
        Epoch {
            store: self.store,
            labels: self.labels,
            order,
            batch_size: self.batch_size,
            next: 0,
        }
    }
}

/// Lazy iterator over one epoch's batches.
///
/// A failed element aborts its own batch with an error naming the ordinal;
/// the iterator stays usable for subsequent batches.
pub struct Epoch<'a> {
    store: &'a SampleStore,
    labels: &'a LabelIndex,
    order: Vec<u64>,
    batch_size: usize,
    next: usize,
}

impl Epoch<'_> {
    fn assemble(&self, ordinal: u64) -> Result<(BoardTensor, u8), StoreError> {
        let sample = self.store.read_at(ordinal)?;
        let tensor = encode_position(sample.black, sample.white);
        let class = self.labels.lookup(ordinal)?;
        Ok((tensor, class))
    }
}

impl Iterator for Epoch<'_> {
    type Item = Result<Batch, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.next * self.batch_size;
        let end = start + self.batch_size;
        if end > self.order.len() {
            return None;
        }
        self.next += 1;

        let mut batch = Vec::with_capacity(self.batch_size);
        for &ordinal in &self.order[start..end] {
            match self.assemble(ordinal) {
                Ok(pair) => batch.push(pair),
                Err(e) => return Some(Err(e)),
            }
        }
        Some(Ok(batch))
    }
}
