//! Dense ordinal-to-class label index derived from a store.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use safetensors::tensor::{Dtype, TensorView};
use safetensors::SafeTensors;
use serde::{Deserialize, Serialize};

use ot_core::square::{square_to_class, NUM_CLASSES};

use crate::error::StoreError;
use crate::store::SampleStore;

/// Label index format version.
pub const LABEL_SCHEMA_VERSION: u32 = 1;

/// Tensor name inside the safetensors file.
pub const T_LABELS: &str = "labels";

/// Sidecar metadata pairing a label index with the store it was built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelMeta {
    pub label_schema_version: u32,
    pub num_samples: u64,
    pub num_classes: usize,
    /// blake3 of the store file at build time.
    pub store_hash: Option<String>,
}

/// Ordinal-to-class mapping, one entry per store record.
///
/// Built once per store generation and immutable afterwards. Regenerating a
/// store without regenerating its index misaligns every label; the pairing
/// checks below exist to catch exactly that.
pub struct LabelIndex {
    classes: Vec<u8>,
}

impl LabelIndex {
    /// Build by scanning every record of `store` once, in ordinal order.
    ///
    /// A move byte in the excluded domain means the store is corrupt; the
    /// build fails fast with `InvalidSquare` rather than producing a
    /// misaligned index.
    pub fn build(store: &SampleStore) -> Result<Self, StoreError> {
        let mut classes = Vec::with_capacity(store.len() as usize);
        for sample in store.iter()? {
            let sample = sample?;
            classes.push(square_to_class(sample.mv)?);
        }
        Ok(Self { classes })
    }

    pub fn len(&self) -> u64 {
        self.classes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// O(1) class lookup for `ordinal`.
    pub fn lookup(&self, ordinal: u64) -> Result<u8, StoreError> {
        self.classes
            .get(ordinal as usize)
            .copied()
            .ok_or(StoreError::OutOfRange {
                ordinal,
                count: self.len(),
            })
    }

    /// Error unless the index covers exactly the records of `store`.
    pub fn verify_pairing(&self, store: &SampleStore) -> Result<(), StoreError> {
        if self.len() != store.len() {
            return Err(StoreError::LabelMismatch {
                index: self.len(),
                store: store.len(),
            });
        }
        Ok(())
    }

    /// Per-class occurrence counts.
    pub fn histogram(&self) -> [u64; NUM_CLASSES] {
        let mut counts = [0u64; NUM_CLASSES];
        for &c in &self.classes {
            counts[c as usize] += 1;
        }
        counts
    }

    /// Persist as a safetensors `u8` tensor plus a JSON meta sidecar, both
    /// written atomically via tmp+rename.
    pub fn save(&self, path: &Path, store_hash: Option<String>) -> Result<(), StoreError> {
        let mut tensors: BTreeMap<String, TensorView<'_>> = BTreeMap::new();
        tensors.insert(
            T_LABELS.to_string(),
            TensorView::new(Dtype::U8, vec![self.classes.len()], &self.classes)?,
        );
        let bytes = safetensors::serialize(&tensors, &None)?;

        let tmp = append_ext(path, ".tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, path)?;

        let meta = LabelMeta {
            label_schema_version: LABEL_SCHEMA_VERSION,
            num_samples: self.len(),
            num_classes: NUM_CLASSES,
            store_hash,
        };
        let meta_final = meta_path(path);
        let meta_tmp = append_ext(&meta_final, ".tmp");
        fs::write(&meta_tmp, serde_json::to_vec_pretty(&meta)?)?;
        fs::rename(&meta_tmp, &meta_final)?;
        Ok(())
    }

    /// Load a persisted index and its sidecar, checking they agree.
    pub fn load(path: &Path) -> Result<(Self, LabelMeta), StoreError> {
        let bytes = fs::read(path)?;
        let st = SafeTensors::deserialize(&bytes)?;
        let tensor = st.tensor(T_LABELS)?;
        let classes = tensor.data().to_vec();

        let meta: LabelMeta = serde_json::from_slice(&fs::read(meta_path(path))?)?;
        if meta.num_samples != classes.len() as u64 {
            return Err(StoreError::LabelMismatch {
                index: classes.len() as u64,
                store: meta.num_samples,
            });
        }
        Ok((Self { classes }, meta))
    }
}

/// Sidecar path for a label file (`<labels>.meta.json`).
pub fn meta_path(labels_path: &Path) -> PathBuf {
    append_ext(labels_path, ".meta.json")
}

fn append_ext(path: &Path, ext: &str) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(ext);
    PathBuf::from(s)
}
