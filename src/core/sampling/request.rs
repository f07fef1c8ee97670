use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::error::{SamplerError, SamplerResult};

/// What to sample and how
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingRequest {
    pub input_root: PathBuf,
    /// Visited in name order
    pub selected_folders: BTreeSet<String>,
    pub sample_size: usize,
    pub seed: u64,
}

impl SamplingRequest {
    pub fn new<I, S>(input_root: impl Into<PathBuf>, folders: I, sample_size: usize, seed: u64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            input_root: input_root.into(),
            selected_folders: folders.into_iter().map(Into::into).collect(),
            sample_size,
            seed,
        }
    }

    /// Reject requests that cannot run, before touching the filesystem
    pub fn validate(&self) -> SamplerResult<()> {
        if self.input_root.as_os_str().is_empty() {
            return Err(SamplerError::MissingInputPath);
        }
        if !self.input_root.is_dir() {
            return Err(SamplerError::InputRootNotFound(self.input_root.clone()));
        }
        if self.selected_folders.is_empty() {
            return Err(SamplerError::NoFoldersSelected);
        }
        if self.sample_size == 0 {
            return Err(SamplerError::InvalidSampleSize);
        }
        Ok(())
    }
}
