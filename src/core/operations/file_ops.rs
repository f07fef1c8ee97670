use std::fs::{self, FileTimes, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Entry kinds accepted by [`list_sorted`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

/// List the direct children of `dir` of one kind, sorted by file name.
///
/// Directory iteration order is platform dependent; sorting keeps pair
/// ordering and therefore seeded draws reproducible. Entries whose type
/// cannot be determined are skipped.
pub fn list_sorted(dir: &Path, kind: EntryKind) -> io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        // Follow symlinks, like a plain `is_file`/`is_dir` check would
        let path = entry.path();
        let keep = match kind {
            EntryKind::File => path.is_file(),
            EntryKind::Dir => path.is_dir(),
        };
        if keep {
            paths.push(path);
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

/// File stem as an owned string
pub fn stem_of(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}

/// File name as an owned string
pub fn file_name_of(path: &Path) -> Option<String> {
    path.file_name().map(|s| s.to_string_lossy().into_owned())
}

/// Copy a file, then carry the source timestamps over where the platform allows.
///
/// `fs::copy` already preserves permission bits. Failing to set the times is
/// not an error: the bytes are what matter.
pub fn copy_with_metadata(src: &Path, dest: &Path) -> io::Result<u64> {
    let bytes = fs::copy(src, dest)?;

    if let Ok(meta) = fs::metadata(src) {
        let mut times = FileTimes::new();
        if let Ok(modified) = meta.modified() {
            times = times.set_modified(modified);
        }
        if let Ok(accessed) = meta.accessed() {
            times = times.set_accessed(accessed);
        }
        let applied = OpenOptions::new()
            .write(true)
            .open(dest)
            .and_then(|file| file.set_times(times));
        if let Err(e) = applied {
            debug!("Could not preserve timestamps on {:?}: {}", dest, e);
        }
    }

    Ok(bytes)
}
