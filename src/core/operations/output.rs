//! Output materialization: directory preparation, conflict handling and the
//! copy loop.
//!
//! Every failure path leaves the output in a describable state: untouched,
//! partially purged (see `SamplerError::PurgeFailed`), purged then partially
//! repopulated with whole pairs (see `SamplerError::CopyFailed`), or fully
//! repopulated.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn, Level};

use super::file_ops::{copy_with_metadata, list_sorted, EntryKind};
use crate::core::dataset::Pair;
use crate::core::events::{report, SamplingObserver};
use crate::error::{SamplerError, SamplerResult};

/// Extension of every label written to the output
pub const OUTPUT_LABEL_EXTENSION: &str = "txt";

/// Destination directories for images and labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputDirs {
    pub images: PathBuf,
    pub labels: PathBuf,
}

/// File names already present in the destination directories
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExistingFiles {
    pub images: Vec<String>,
    pub labels: Vec<String>,
}

impl ExistingFiles {
    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.labels.is_empty()
    }
}

/// What to do when the destination already holds files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictResolution {
    /// Delete the existing files, then copy
    Purge,
    /// Leave existing files; same-named files get overwritten
    KeepAndOverwrite,
    /// Copy nothing
    Abort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOutcome {
    Proceed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyReport {
    /// Pairs processed, including ones that replaced an earlier pair
    pub pairs: usize,
    /// Distinct image files this batch left in the output
    pub written: usize,
    pub bytes: u64,
}

/// Two pairs of one batch that map to the same output file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameCollision {
    /// Output file name written twice
    pub destination: String,
    /// Folder of the pair copied first
    pub first_folder: String,
    /// Folder of the pair that replaces it
    pub later_folder: String,
}

impl std::fmt::Display for NameCollision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} from {} replaces the copy from {}",
            self.destination, self.later_folder, self.first_folder
        )
    }
}

fn label_destination(pair: &Pair) -> String {
    format!("{}.{}", pair.stem(), OUTPUT_LABEL_EXTENSION)
}

/// Find pairs whose image or label would land on a name an earlier pair of
/// the same batch already uses.
///
/// Frames extracted from different videos commonly share names, and both
/// copies keep their original name, so the later one wins.
pub fn find_name_collisions(pairs: &[Pair]) -> Vec<NameCollision> {
    let mut images: HashMap<String, &str> = HashMap::new();
    let mut labels: HashMap<String, &str> = HashMap::new();
    let mut collisions = Vec::new();

    for pair in pairs {
        for (seen, destination) in [
            (&mut images, pair.file_name.clone()),
            (&mut labels, label_destination(pair)),
        ] {
            if let Some(first) = seen.get(&destination) {
                collisions.push(NameCollision {
                    destination: destination.clone(),
                    first_folder: first.to_string(),
                    later_folder: pair.folder.clone(),
                });
            }
            seen.insert(destination, &pair.folder);
        }
    }

    collisions
}

/// Create `images/` and `labels/` under `output_root`. Safe to repeat.
pub fn prepare_output(output_root: &Path) -> SamplerResult<OutputDirs> {
    prepare_output_with_names(output_root, "images", "labels")
}

pub fn prepare_output_with_names(
    output_root: &Path,
    images_name: &str,
    labels_name: &str,
) -> SamplerResult<OutputDirs> {
    let dirs = OutputDirs {
        images: output_root.join(images_name),
        labels: output_root.join(labels_name),
    };
    for dir in [&dirs.images, &dirs.labels] {
        fs::create_dir_all(dir).map_err(|e| SamplerError::io(dir, e))?;
    }
    Ok(dirs)
}

/// List regular files directly inside both destination directories
pub fn check_conflicts(dirs: &OutputDirs) -> SamplerResult<ExistingFiles> {
    let names = |dir: &Path| -> SamplerResult<Vec<String>> {
        Ok(list_sorted(dir, EntryKind::File)
            .map_err(|e| SamplerError::io(dir, e))?
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect())
    };
    Ok(ExistingFiles {
        images: names(&dirs.images)?,
        labels: names(&dirs.labels)?,
    })
}

/// Apply the caller's decision about pre-existing output files.
///
/// Never asks anything: the host obtains the decision and passes it in.
pub fn resolve_conflicts(
    resolution: ConflictResolution,
    existing: &ExistingFiles,
    dirs: &OutputDirs,
    observer: &mut dyn SamplingObserver,
) -> SamplerResult<ResolutionOutcome> {
    match resolution {
        ConflictResolution::Abort => {
            report(observer, Level::INFO, "Sampling cancelled by user");
            Ok(ResolutionOutcome::Cancelled)
        }
        ConflictResolution::KeepAndOverwrite => {
            report(
                observer,
                Level::INFO,
                "Keeping existing files (may overwrite files with same names)",
            );
            Ok(ResolutionOutcome::Proceed)
        }
        ConflictResolution::Purge => {
            report(observer, Level::INFO, "Deleting existing files...");
            let mut deleted = 0;
            for (dir, names) in [(&dirs.images, &existing.images), (&dirs.labels, &existing.labels)] {
                for name in names {
                    let path = dir.join(name);
                    if let Err(e) = fs::remove_file(&path) {
                        error!("Failed to delete {:?} after deleting {} file(s): {}", path, deleted, e);
                        return Err(SamplerError::PurgeFailed {
                            path,
                            deleted,
                            total: existing.images.len() + existing.labels.len(),
                            source: e,
                        });
                    }
                    deleted += 1;
                }
            }
            report(
                observer,
                Level::INFO,
                format!(
                    "Deleted {} image(s) and {} label(s)",
                    existing.images.len(),
                    existing.labels.len()
                ),
            );
            Ok(ResolutionOutcome::Proceed)
        }
    }
}

/// Copy each pair into the output, calling `on_progress(done, total)` after
/// every pair.
///
/// Images keep their file name; labels are always written as
/// `<image stem>.txt`. The first failure stops the batch and is returned as
/// `CopyFailed` with the number of pairs already on disk. A pair is never
/// left half written: when its label fails, its image is removed again.
pub fn copy_pairs<F>(pairs: &[Pair], dirs: &OutputDirs, mut on_progress: F) -> SamplerResult<CopyReport>
where
    F: FnMut(usize, usize),
{
    let total = pairs.len();
    let mut copy_report = CopyReport::default();
    let mut written: HashSet<&str> = HashSet::new();

    let copy_failed = |idx: usize, src: &Path, dest: &Path, e: std::io::Error| {
        error!(
            "Failed to copy {:?} to {:?} ({}/{} pairs done): {}",
            src, dest, idx, total, e
        );
        SamplerError::CopyFailed {
            completed: idx,
            total,
            path: src.to_path_buf(),
            source: e,
        }
    };

    for (idx, pair) in pairs.iter().enumerate() {
        let dest_image = dirs.images.join(&pair.file_name);
        let dest_label = dirs.labels.join(label_destination(pair));

        copy_report.bytes += copy_with_metadata(&pair.image, &dest_image)
            .map_err(|e| copy_failed(idx, pair.image.as_path(), dest_image.as_path(), e))?;

        match copy_with_metadata(&pair.label, &dest_label) {
            Ok(bytes) => copy_report.bytes += bytes,
            Err(e) => {
                if let Err(remove_err) = fs::remove_file(&dest_image) {
                    warn!(
                        "Could not remove unpaired image {:?}: {}",
                        dest_image, remove_err
                    );
                }
                return Err(copy_failed(idx, pair.label.as_path(), dest_label.as_path(), e));
            }
        }

        written.insert(pair.file_name.as_str());
        copy_report.pairs = idx + 1;
        copy_report.written = written.len();
        debug!("Copied {} ({}/{})", pair.file_name, idx + 1, total);
        on_progress(idx + 1, total);
    }

    info!(
        "Copied {} pair(s) into {} distinct file name(s), {} bytes",
        copy_report.pairs, copy_report.written, copy_report.bytes
    );
    Ok(copy_report)
}
