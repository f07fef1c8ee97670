use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::DatasetLayout;
use crate::core::operations::{file_name_of, list_sorted, EntryKind};
use crate::error::{SamplerError, SamplerResult};

/// A top-level subdirectory of the dataset root, one per source video
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoFolder {
    pub name: String,
    pub path: PathBuf,
}

impl VideoFolder {
    pub fn new(root: &Path, name: impl Into<String>) -> Self {
        let name = name.into();
        let path = root.join(&name);
        Self { name, path }
    }

    pub fn frames_dir(&self, layout: &DatasetLayout) -> PathBuf {
        self.path.join(&layout.frames_dir)
    }

    pub fn labels_dir(&self, layout: &DatasetLayout) -> PathBuf {
        self.path.join(&layout.labels_dir)
    }
}

/// List every subdirectory of `root`, sorted by name.
///
/// This is what a host offers as the folder selection list. Whether each
/// folder actually has frames and labels is checked later, per phase.
pub fn list_video_folders(root: &Path) -> SamplerResult<Vec<VideoFolder>> {
    if !root.is_dir() {
        return Err(SamplerError::InputRootNotFound(root.to_path_buf()));
    }

    let folders: Vec<VideoFolder> = list_sorted(root, EntryKind::Dir)
        .map_err(|e| SamplerError::io(root, e))?
        .into_iter()
        .filter_map(|path| {
            file_name_of(&path).map(|name| VideoFolder { name, path })
        })
        .collect();

    if folders.is_empty() {
        return Err(SamplerError::NoVideoFolders(root.to_path_buf()));
    }

    info!("Found {} video folder(s) in {:?}", folders.len(), root);
    Ok(folders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_lists_only_directories_sorted() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir(temp.path().join("vid_b")).unwrap();
        fs::create_dir(temp.path().join("vid_a")).unwrap();
        fs::write(temp.path().join("notes.txt"), "not a folder").unwrap();

        let folders = list_video_folders(temp.path()).unwrap();
        let names: Vec<&str> = folders.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["vid_a", "vid_b"]);
        assert_eq!(folders[0].path, temp.path().join("vid_a"));
    }

    #[test]
    fn test_missing_root() {
        let temp = tempfile::tempdir().unwrap();
        let err = list_video_folders(&temp.path().join("missing")).unwrap_err();
        assert!(matches!(err, SamplerError::InputRootNotFound(_)));
    }

    #[test]
    fn test_root_without_subfolders() {
        let temp = tempfile::tempdir().unwrap();
        let err = list_video_folders(temp.path()).unwrap_err();
        assert!(matches!(err, SamplerError::NoVideoFolders(_)));
    }

    #[test]
    fn test_layout_paths() {
        let folder = VideoFolder::new(Path::new("/data"), "vid1");
        let layout = DatasetLayout::default();
        assert_eq!(folder.frames_dir(&layout), PathBuf::from("/data/vid1/frames"));
        assert_eq!(folder.labels_dir(&layout), PathBuf::from("/data/vid1/labels"));
    }
}
