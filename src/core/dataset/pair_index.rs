//! Image/label pair discovery.
//!
//! Each selected video folder is scanned once: the labels directory is read
//! into a stem set, then every image in the frames directory is checked
//! against that set. Cost is O(images + labels) per folder with no per-image
//! filesystem probe.

use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, Level};

use super::VideoFolder;
use crate::config::DatasetLayout;
use crate::core::events::{report, SamplingObserver};
use crate::core::operations::{file_name_of, list_sorted, stem_of, EntryKind};
use crate::error::{SamplerError, SamplerResult};

/// One image and its matching label, the unit of sampling
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Pair {
    pub image: PathBuf,
    pub label: PathBuf,
    /// Owning video folder name
    pub folder: String,
    /// Image file name, extension included
    pub file_name: String,
}

impl Pair {
    /// Image file name without extension
    pub fn stem(&self) -> String {
        stem_of(Path::new(&self.file_name)).unwrap_or_else(|| self.file_name.clone())
    }
}

/// Non-fatal reasons a selected folder contributed nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryWarning {
    FolderMissing(String),
    FramesMissing(String),
    LabelsMissing(String),
    Unreadable { folder: String, error: String },
}

impl fmt::Display for DiscoveryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryWarning::FolderMissing(folder) => {
                write!(f, "Folder '{}' not found in input root, skipping...", folder)
            }
            DiscoveryWarning::FramesMissing(folder) => {
                write!(f, "'frames' folder not found in {}, skipping...", folder)
            }
            DiscoveryWarning::LabelsMissing(folder) => {
                write!(f, "'labels' folder not found in {}, skipping...", folder)
            }
            DiscoveryWarning::Unreadable { folder, error } => {
                write!(f, "Could not read {}: {}, skipping...", folder, error)
            }
        }
    }
}

/// Result of a discovery pass
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub pairs: Vec<Pair>,
    pub warnings: Vec<DiscoveryWarning>,
}

/// Discover pairs in the selected folders using the default layout
pub fn discover_pairs(
    root: &Path,
    selected_folders: &BTreeSet<String>,
    observer: &mut dyn SamplingObserver,
) -> SamplerResult<Discovery> {
    discover_pairs_with_layout(root, selected_folders, &DatasetLayout::default(), observer)
}

/// Discover pairs in the selected folders.
///
/// Folders are visited in name order and files in each folder in name order,
/// so identical input trees always yield identical pair sequences. Returns
/// `EmptyDiscovery` when no folder produced a pair.
pub fn discover_pairs_with_layout(
    root: &Path,
    selected_folders: &BTreeSet<String>,
    layout: &DatasetLayout,
    observer: &mut dyn SamplingObserver,
) -> SamplerResult<Discovery> {
    if !root.is_dir() {
        return Err(SamplerError::InputRootNotFound(root.to_path_buf()));
    }

    let mut discovery = Discovery::default();

    for name in selected_folders {
        let folder = VideoFolder::new(root, name.as_str());
        match scan_folder(&folder, layout) {
            Ok(pairs) => {
                debug!("{} pair(s) in {}", pairs.len(), folder.name);
                discovery.pairs.extend(pairs);
            }
            Err(warning) => {
                report(observer, Level::WARN, format!("Warning: {}", warning));
                discovery.warnings.push(warning);
            }
        }
    }

    report(
        observer,
        Level::INFO,
        format!("Found {} valid image/label pairs", discovery.pairs.len()),
    );

    if discovery.pairs.is_empty() {
        report(observer, Level::ERROR, "Error: No valid image/label pairs found");
        return Err(SamplerError::EmptyDiscovery);
    }

    Ok(discovery)
}

fn scan_folder(folder: &VideoFolder, layout: &DatasetLayout) -> Result<Vec<Pair>, DiscoveryWarning> {
    if !folder.path.is_dir() {
        return Err(DiscoveryWarning::FolderMissing(folder.name.clone()));
    }

    let frames_dir = folder.frames_dir(layout);
    let labels_dir = folder.labels_dir(layout);
    if !frames_dir.is_dir() {
        return Err(DiscoveryWarning::FramesMissing(folder.name.clone()));
    }
    if !labels_dir.is_dir() {
        return Err(DiscoveryWarning::LabelsMissing(folder.name.clone()));
    }

    let unreadable = |e: std::io::Error| DiscoveryWarning::Unreadable {
        folder: folder.name.clone(),
        error: e.to_string(),
    };

    let label_stems: HashSet<String> = list_sorted(&labels_dir, EntryKind::File)
        .map_err(unreadable)?
        .iter()
        .filter(|path| layout.is_label(path))
        .filter_map(|path| stem_of(path))
        .collect();

    let pairs = list_sorted(&frames_dir, EntryKind::File)
        .map_err(unreadable)?
        .into_iter()
        .filter(|path| layout.is_image(path))
        .filter_map(|image| {
            let stem = stem_of(&image)?;
            if !label_stems.contains(&stem) {
                return None;
            }
            let file_name = file_name_of(&image)?;
            Some(Pair {
                label: labels_dir.join(layout.label_file_name(&stem)),
                image,
                folder: folder.name.clone(),
                file_name,
            })
        })
        .collect();

    Ok(pairs)
}
