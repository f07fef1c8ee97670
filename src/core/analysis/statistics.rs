use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn, Level};

use crate::config::AnalysisOptions;
use crate::core::dataset::{list_video_folders, read_label_summary};
use crate::core::events::{report, SamplingObserver};
use crate::core::operations::{list_sorted, EntryKind};
use crate::error::SamplerResult;

/// Min/max pair over some per-file quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Extent<T> {
    pub min: T,
    pub max: T,
}

impl<T: Copy + Ord> Extent<T> {
    fn widen(slot: &mut Option<Extent<T>>, value: T) {
        *slot = Some(match *slot {
            Some(e) => Extent {
                min: e.min.min(value),
                max: e.max.max(value),
            },
            None => Extent {
                min: value,
                max: value,
            },
        });
    }
}

/// Images-per-folder summary over folders holding at least one image
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FolderSummary {
    pub min: usize,
    pub max: usize,
    pub avg: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionCount {
    /// "WxH"
    pub resolution: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FileKind {
    Image,
    Label,
}

/// A file excluded from the aggregates
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileIssue {
    pub path: PathBuf,
    pub kind: FileKind,
    pub message: String,
}

/// Snapshot of a dataset root.
///
/// The resolution histogram is a sample, not a census: only images selected
/// by the configured probe cadence are opened. `probed_images` says how many.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DatasetStatistics {
    pub total_images: usize,
    pub total_labels: usize,
    /// Folders with frames and labels directories and at least one image
    pub video_folders: usize,
    pub images_per_folder: Option<FolderSummary>,
    /// Full sampled histogram in first-seen order
    pub resolutions: Vec<ResolutionCount>,
    /// Most frequent entries of `resolutions`, ties in first-seen order
    pub top_resolutions: Vec<ResolutionCount>,
    pub probed_images: usize,
    pub file_size: Option<Extent<u64>>,
    pub annotations_per_file: Option<Extent<usize>>,
    pub class_ids: BTreeSet<i64>,
    pub issues: Vec<FileIssue>,
}

impl DatasetStatistics {
    pub fn num_classes(&self) -> usize {
        self.class_ids.len()
    }

    /// The `n` most frequent resolutions; equal counts keep first-seen order
    pub fn most_common_resolutions(&self, n: usize) -> Vec<ResolutionCount> {
        let mut sorted = self.resolutions.clone();
        // stable sort keeps first-seen order among ties
        sorted.sort_by(|a, b| b.count.cmp(&a.count));
        sorted.truncate(n);
        sorted
    }

    /// Display lines in label/value form
    pub fn summary_lines(&self) -> Vec<String> {
        let per_folder = self.images_per_folder.unwrap_or(FolderSummary {
            min: 0,
            max: 0,
            avg: 0.0,
        });
        let resolutions = if self.top_resolutions.is_empty() {
            "N/A".to_string()
        } else {
            self.top_resolutions
                .iter()
                .map(|r| format!("{} ({})", r.resolution, r.count))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let size = self.file_size.unwrap_or(Extent { min: 0, max: 0 });
        let annotations = self.annotations_per_file.unwrap_or(Extent { min: 0, max: 0 });

        vec![
            format!("Total Images: {}", self.total_images),
            format!("Total Labels: {}", self.total_labels),
            format!("Video Folders: {}", self.video_folders),
            format!(
                "Images per Folder: Min: {}, Max: {}, Avg: {:.1}",
                per_folder.min, per_folder.max, per_folder.avg
            ),
            format!(
                "Image Resolutions: {} (sampled from {} image(s))",
                resolutions, self.probed_images
            ),
            format!(
                "Image File Size: Min: {}, Max: {}",
                format_file_size(size.min),
                format_file_size(size.max)
            ),
            format!(
                "Annotations per File: Min: {}, Max: {}",
                annotations.min, annotations.max
            ),
            format!("Classes Found: {}", self.num_classes()),
        ]
    }
}

/// Human-readable size: bytes, then KB and MB with one decimal
pub fn format_file_size(size_bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * 1024;
    if size_bytes < KIB {
        format!("{} B", size_bytes)
    } else if size_bytes < MIB {
        format!("{:.1} KB", size_bytes as f64 / KIB as f64)
    } else {
        format!("{:.1} MB", size_bytes as f64 / MIB as f64)
    }
}

#[derive(Default)]
struct Accumulator {
    stats: DatasetStatistics,
    folder_image_counts: Vec<usize>,
    resolution_index: HashMap<String, usize>,
}

impl Accumulator {
    fn record_resolution(&mut self, resolution: String) {
        self.stats.probed_images += 1;
        match self.resolution_index.get(&resolution) {
            Some(&idx) => self.stats.resolutions[idx].count += 1,
            None => {
                self.resolution_index
                    .insert(resolution.clone(), self.stats.resolutions.len());
                self.stats
                    .resolutions
                    .push(ResolutionCount { resolution, count: 1 });
            }
        }
    }

    fn issue(&mut self, path: &Path, kind: FileKind, message: String) {
        warn!("Skipping {:?} in statistics: {}", path, message);
        self.stats.issues.push(FileIssue {
            path: path.to_path_buf(),
            kind,
            message,
        });
    }

    fn finish(mut self, top_n: usize) -> DatasetStatistics {
        let non_empty: Vec<usize> = self
            .folder_image_counts
            .iter()
            .copied()
            .filter(|&count| count > 0)
            .collect();

        self.stats.video_folders = non_empty.len();
        if let (Some(&min), Some(&max)) = (non_empty.iter().min(), non_empty.iter().max()) {
            let sum: usize = non_empty.iter().sum();
            self.stats.images_per_folder = Some(FolderSummary {
                min,
                max,
                avg: sum as f64 / non_empty.len() as f64,
            });
        }
        self.stats.top_resolutions = self.stats.most_common_resolutions(top_n);
        self.stats
    }
}

/// Analyze every video folder under `root` with default options
pub fn analyze_dataset(
    root: &Path,
    observer: &mut dyn SamplingObserver,
) -> SamplerResult<DatasetStatistics> {
    analyze_dataset_with_options(root, &AnalysisOptions::default(), observer)
}

/// Analyze every video folder under `root`, selected or not.
///
/// Folders missing their frames or labels directory are skipped. Unreadable
/// or malformed files are recorded in `issues` and left out of the
/// aggregates; they never abort the pass.
pub fn analyze_dataset_with_options(
    root: &Path,
    options: &AnalysisOptions,
    observer: &mut dyn SamplingObserver,
) -> SamplerResult<DatasetStatistics> {
    let layout = &options.layout;
    let folders = list_video_folders(root)?;

    report(observer, Level::INFO, format!("Analyzing dataset at: {}", root.display()));

    let mut acc = Accumulator::default();

    for folder in &folders {
        let frames_dir = folder.frames_dir(layout);
        let labels_dir = folder.labels_dir(layout);
        if !frames_dir.is_dir() || !labels_dir.is_dir() {
            debug!("{} lacks frames or labels, not counted", folder.name);
            continue;
        }

        let images = match list_sorted(&frames_dir, EntryKind::File) {
            Ok(paths) => paths,
            Err(e) => {
                acc.issue(&frames_dir, FileKind::Image, e.to_string());
                continue;
            }
        };

        let mut folder_images = 0;
        for image_path in images.iter().filter(|p| layout.is_image(p)) {
            folder_images += 1;
            acc.stats.total_images += 1;

            match fs::metadata(image_path) {
                Ok(meta) => Extent::widen(&mut acc.stats.file_size, meta.len()),
                Err(e) => acc.issue(image_path, FileKind::Image, e.to_string()),
            }

            if options.resolution_sampling.should_probe(acc.stats.total_images) {
                match image::image_dimensions(image_path) {
                    Ok((width, height)) => acc.record_resolution(format!("{}x{}", width, height)),
                    Err(e) => acc.issue(image_path, FileKind::Image, e.to_string()),
                }
            }
        }
        acc.folder_image_counts.push(folder_images);

        let labels = match list_sorted(&labels_dir, EntryKind::File) {
            Ok(paths) => paths,
            Err(e) => {
                acc.issue(&labels_dir, FileKind::Label, e.to_string());
                continue;
            }
        };

        for label_path in labels.iter().filter(|p| layout.is_label(p)) {
            acc.stats.total_labels += 1;
            match read_label_summary(label_path) {
                Ok(summary) => {
                    Extent::widen(&mut acc.stats.annotations_per_file, summary.annotation_count);
                    acc.stats.class_ids.extend(summary.class_ids);
                }
                Err(e) => acc.issue(label_path, FileKind::Label, e.to_string()),
            }
        }
    }

    let stats = acc.finish(options.top_resolutions);

    report(observer, Level::INFO, "Analysis complete!");
    report(observer, Level::INFO, format!("  Total images: {}", stats.total_images));
    report(observer, Level::INFO, format!("  Total labels: {}", stats.total_labels));
    report(observer, Level::INFO, format!("  Video folders: {}", stats.video_folders));
    report(observer, Level::INFO, format!("  Classes found: {}", stats.num_classes()));
    if !stats.issues.is_empty() {
        report(
            observer,
            Level::WARN,
            format!("  {} file(s) skipped, see log for details", stats.issues.len()),
        );
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolutionSampling;
    use crate::core::events::NullObserver;
    use crate::error::SamplerError;
    use image::RgbImage;

    fn write_png(path: &Path, width: u32, height: u32) {
        RgbImage::new(width, height).save(path).unwrap();
    }

    fn folder(root: &Path, name: &str) -> (PathBuf, PathBuf) {
        let frames = root.join(name).join("frames");
        let labels = root.join(name).join("labels");
        fs::create_dir_all(&frames).unwrap();
        fs::create_dir_all(&labels).unwrap();
        (frames, labels)
    }

    #[test]
    fn test_counts_and_class_ids() {
        let temp = tempfile::tempdir().unwrap();
        let (frames, labels) = folder(temp.path(), "vid1");
        write_png(&frames.join("a.png"), 4, 2);
        write_png(&frames.join("b.png"), 4, 2);
        fs::write(labels.join("a.txt"), "0 0.5 0.5 0.1 0.1\n2 0.1 0.1 0.1 0.1\n").unwrap();
        fs::write(labels.join("b.txt"), "1 0.5 0.5 0.1 0.1\n").unwrap();

        let stats = analyze_dataset(temp.path(), &mut NullObserver).unwrap();

        assert_eq!(stats.total_images, 2);
        assert_eq!(stats.total_labels, 2);
        assert_eq!(stats.video_folders, 1);
        assert_eq!(stats.class_ids, BTreeSet::from([0, 1, 2]));
        assert_eq!(stats.num_classes(), 3);
        assert_eq!(stats.annotations_per_file, Some(Extent { min: 1, max: 2 }));
        assert_eq!(
            stats.top_resolutions,
            vec![ResolutionCount {
                resolution: "4x2".to_string(),
                count: 2
            }]
        );
        assert!(stats.issues.is_empty());
    }

    #[test]
    fn test_scans_all_folders_and_skips_incomplete() {
        let temp = tempfile::tempdir().unwrap();
        let (f1, _) = folder(temp.path(), "vid1");
        write_png(&f1.join("a.png"), 2, 2);
        let (f2, _) = folder(temp.path(), "vid2");
        write_png(&f2.join("a.png"), 2, 2);
        write_png(&f2.join("b.png"), 2, 2);
        write_png(&f2.join("c.png"), 2, 2);
        folder(temp.path(), "empty");
        fs::create_dir_all(temp.path().join("broken/frames")).unwrap();
        write_png(&temp.path().join("broken/frames/x.png"), 2, 2);

        let stats = analyze_dataset(temp.path(), &mut NullObserver).unwrap();

        assert_eq!(stats.total_images, 4);
        assert_eq!(stats.video_folders, 2);
        let per_folder = stats.images_per_folder.unwrap();
        assert_eq!(per_folder.min, 1);
        assert_eq!(per_folder.max, 3);
        assert!((per_folder.avg - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_malformed_label_skipped_not_fatal() {
        let temp = tempfile::tempdir().unwrap();
        let (frames, labels) = folder(temp.path(), "vid1");
        write_png(&frames.join("a.png"), 2, 2);
        fs::write(labels.join("a.txt"), "0 0.5 0.5 0.1 0.1\n").unwrap();
        fs::write(labels.join("bad.txt"), "7 0 0 0 0\ncar 0.5 0.5 0.1 0.1\n\n\n\n").unwrap();

        let stats = analyze_dataset(temp.path(), &mut NullObserver).unwrap();

        assert_eq!(stats.total_labels, 2);
        assert_eq!(stats.class_ids, BTreeSet::from([0]));
        assert_eq!(stats.annotations_per_file, Some(Extent { min: 1, max: 1 }));
        assert_eq!(stats.issues.len(), 1);
        assert_eq!(stats.issues[0].kind, FileKind::Label);
        assert!(stats.issues[0].path.ends_with("bad.txt"));
    }

    #[test]
    fn test_corrupt_image_excluded_from_resolutions() {
        let temp = tempfile::tempdir().unwrap();
        let (frames, _) = folder(temp.path(), "vid1");
        fs::write(frames.join("a.jpg"), b"not really a jpeg").unwrap();
        write_png(&frames.join("b.png"), 3, 3);

        let stats = analyze_dataset(temp.path(), &mut NullObserver).unwrap();

        assert_eq!(stats.total_images, 2);
        assert_eq!(stats.probed_images, 1);
        assert_eq!(stats.file_size.unwrap().min, 17);
        assert_eq!(stats.issues.len(), 1);
        assert_eq!(stats.issues[0].kind, FileKind::Image);
    }

    #[test]
    fn test_resolution_probe_cadence() {
        let temp = tempfile::tempdir().unwrap();
        let (frames, _) = folder(temp.path(), "vid1");
        for i in 0..25 {
            write_png(&frames.join(format!("f{:02}.png", i)), 1, 1);
        }

        let stats = analyze_dataset(temp.path(), &mut NullObserver).unwrap();
        // images 1..=10, then 20
        assert_eq!(stats.probed_images, 11);

        let options = AnalysisOptions {
            resolution_sampling: ResolutionSampling {
                probe_first: 1,
                probe_every: 5,
            },
            ..AnalysisOptions::default()
        };
        let stats = analyze_dataset_with_options(temp.path(), &options, &mut NullObserver).unwrap();
        // 1, 5, 10, 15, 20, 25
        assert_eq!(stats.probed_images, 6);
    }

    #[test]
    fn test_top_resolutions_ties_keep_first_seen() {
        let mut stats = DatasetStatistics::default();
        for (res, count) in [("640x480", 2), ("1920x1080", 3), ("800x600", 2), ("1x1", 1)] {
            stats.resolutions.push(ResolutionCount {
                resolution: res.to_string(),
                count,
            });
        }
        let top: Vec<String> = stats
            .most_common_resolutions(3)
            .into_iter()
            .map(|r| r.resolution)
            .collect();
        assert_eq!(top, vec!["1920x1080", "640x480", "800x600"]);
    }

    #[test]
    fn test_top_resolutions_limited_to_five() {
        let temp = tempfile::tempdir().unwrap();
        let (frames, _) = folder(temp.path(), "vid1");
        for i in 1..=7u32 {
            write_png(&frames.join(format!("f{}.png", i)), i, 1);
        }
        let stats = analyze_dataset(temp.path(), &mut NullObserver).unwrap();
        assert_eq!(stats.resolutions.len(), 7);
        assert_eq!(stats.top_resolutions.len(), 5);
        assert_eq!(stats.top_resolutions[0].resolution, "1x1");
    }

    #[test]
    fn test_empty_dataset_summary() {
        let temp = tempfile::tempdir().unwrap();
        folder(temp.path(), "vid1");
        let stats = analyze_dataset(temp.path(), &mut NullObserver).unwrap();
        assert_eq!(stats.video_folders, 0);
        assert!(stats.images_per_folder.is_none());

        let lines = stats.summary_lines();
        assert!(lines.contains(&"Images per Folder: Min: 0, Max: 0, Avg: 0.0".to_string()));
        assert!(lines.iter().any(|l| l.starts_with("Image Resolutions: N/A")));
    }

    #[test]
    fn test_missing_root() {
        let temp = tempfile::tempdir().unwrap();
        let err = analyze_dataset(&temp.path().join("nope"), &mut NullObserver).unwrap_err();
        assert!(matches!(err, SamplerError::InputRootNotFound(_)));
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(1023), "1023 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.0 MB");
    }
}
