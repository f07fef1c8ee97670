//! End-to-end sampling run, split in two steps.
//!
//! [`SamplingJob::plan`] does everything up to and including the conflict
//! check. The host inspects [`SamplingPlan::existing`], obtains a decision
//! however it likes, and passes it to [`SamplingPlan::execute`].

use std::path::PathBuf;
use tracing::{info_span, Level};

use super::request::SamplingRequest;
use super::sampler::{sample, Sample};
use crate::config::{AppConfig, DatasetLayout};
use crate::core::dataset::{discover_pairs_with_layout, DiscoveryWarning, Pair};
use crate::core::events::{report, SamplingObserver};
use crate::core::operations::{
    check_conflicts, copy_pairs, find_name_collisions, prepare_output_with_names, resolve_conflicts, ConflictResolution,
    ExistingFiles, OutputDirs, ResolutionOutcome,
};
use crate::error::{SamplerError, SamplerResult};

const RULE: &str = "==================================================";

#[derive(Debug, Clone)]
pub struct SamplingJob {
    pub request: SamplingRequest,
    pub output_root: PathBuf,
    pub layout: DatasetLayout,
    pub output_images_dir: String,
    pub output_labels_dir: String,
}

/// Everything decided before the first file is written
#[derive(Debug, Clone)]
pub struct SamplingPlan {
    pub discovered: usize,
    pub warnings: Vec<DiscoveryWarning>,
    pub sample: Sample<Pair>,
    pub dirs: OutputDirs,
    pub existing: ExistingFiles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingOutcome {
    /// `copied` counts distinct pairs left in the output; `replaced` counts
    /// sampled pairs overwritten by a later one with the same file name
    Completed { copied: usize, replaced: usize },
    Cancelled,
}

impl SamplingJob {
    pub fn new(request: SamplingRequest, output_root: impl Into<PathBuf>) -> Self {
        let config = AppConfig::default();
        Self {
            request,
            output_root: output_root.into(),
            layout: config.layout,
            output_images_dir: config.output_images_dir,
            output_labels_dir: config.output_labels_dir,
        }
    }

    /// Take layout and output directory names from `config`
    pub fn with_config(mut self, config: &AppConfig) -> Self {
        self.layout = config.layout.clone();
        self.output_images_dir = config.output_images_dir.clone();
        self.output_labels_dir = config.output_labels_dir.clone();
        self
    }

    pub fn validate(&self) -> SamplerResult<()> {
        if self.request.input_root.as_os_str().is_empty() {
            return Err(SamplerError::MissingInputPath);
        }
        if self.output_root.as_os_str().is_empty() {
            return Err(SamplerError::MissingOutputPath);
        }
        self.request.validate()
    }

    /// Validate, discover, sample, prepare the output and list what is already there
    pub fn plan(&self, observer: &mut dyn SamplingObserver) -> SamplerResult<SamplingPlan> {
        let _span = info_span!("plan").entered();
        if let Err(e) = self.validate() {
            report(observer, Level::ERROR, format!("Error: {}", e));
            return Err(e);
        }
        let request = &self.request;

        report(observer, Level::INFO, RULE);
        report(observer, Level::INFO, "Starting sampling process...");
        report(observer, Level::INFO, format!("Input folder: {}", request.input_root.display()));
        report(observer, Level::INFO, format!("Output folder: {}", self.output_root.display()));
        report(
            observer,
            Level::INFO,
            format!("Selected folders: {}", request.selected_folders.len()),
        );
        report(observer, Level::INFO, format!("Sample size: {}", request.sample_size));
        report(observer, Level::INFO, format!("Random seed: {}", request.seed));
        report(observer, Level::INFO, RULE);

        report(observer, Level::INFO, "Step 1: Collecting image/label pairs...");
        let discovery = discover_pairs_with_layout(
            &request.input_root,
            &request.selected_folders,
            &self.layout,
            observer,
        )?;

        report(
            observer,
            Level::INFO,
            format!("Step 2: Randomly sampling {} pairs...", request.sample_size),
        );
        let drawn = sample(&discovery.pairs, request.sample_size, request.seed);
        if drawn.clamped && drawn.requested > drawn.available {
            report(
                observer,
                Level::WARN,
                format!(
                    "Warning: Sample size ({}) is larger than available pairs ({})",
                    drawn.requested, drawn.available
                ),
            );
            report(observer, Level::WARN, "Using all available pairs instead");
        } else if drawn.clamped {
            report(
                observer,
                Level::WARN,
                format!(
                    "Warning: Sample size ({}) equals available pairs, using all of them",
                    drawn.requested
                ),
            );
        }
        report(observer, Level::INFO, format!("Sampled {} pairs", drawn.len()));

        report(observer, Level::INFO, "Step 3: Preparing output folders...");
        let dirs = prepare_output_with_names(
            &self.output_root,
            &self.output_images_dir,
            &self.output_labels_dir,
        )?;
        let existing = check_conflicts(&dirs)?;
        if !existing.is_empty() {
            report(
                observer,
                Level::WARN,
                format!(
                    "The output folders already contain files: {} image(s), {} label(s)",
                    existing.images.len(),
                    existing.labels.len()
                ),
            );
        }

        Ok(SamplingPlan {
            discovered: discovery.pairs.len(),
            warnings: discovery.warnings,
            sample: drawn,
            dirs,
            existing,
        })
    }
}

impl SamplingPlan {
    pub fn has_conflicts(&self) -> bool {
        !self.existing.is_empty()
    }

    /// Resolve conflicts (only if there are any) and copy the sampled pairs.
    ///
    /// `resolution` is ignored when the output was empty.
    pub fn execute(
        &self,
        resolution: ConflictResolution,
        observer: &mut dyn SamplingObserver,
    ) -> SamplerResult<SamplingOutcome> {
        let _span = info_span!("execute").entered();

        if self.has_conflicts()
            && resolve_conflicts(resolution, &self.existing, &self.dirs, observer)?
                == ResolutionOutcome::Cancelled
        {
            return Ok(SamplingOutcome::Cancelled);
        }

        report(
            observer,
            Level::INFO,
            format!("Output folder ready: {}", self.dirs.images.display()),
        );
        report(
            observer,
            Level::INFO,
            format!("Output folder ready: {}", self.dirs.labels.display()),
        );

        report(observer, Level::INFO, "Step 4: Copying files...");
        let pairs = &self.sample.items;
        for collision in find_name_collisions(pairs) {
            report(
                observer,
                Level::WARN,
                format!("Warning: duplicate output name, {}", collision),
            );
        }
        let copied = copy_pairs(pairs, &self.dirs, |done, total| {
            observer.on_progress(done, total)
        });

        match copied {
            Ok(copy_report) => {
                report(observer, Level::INFO, RULE);
                report(observer, Level::INFO, "Sampling completed successfully!");
                report(
                    observer,
                    Level::INFO,
                    format!("{} image/label pairs copied to output folder", copy_report.written),
                );
                let replaced = copy_report.pairs - copy_report.written;
                if replaced > 0 {
                    report(
                        observer,
                        Level::WARN,
                        format!(
                            "{} sampled pair(s) were overwritten by pairs with the same file name",
                            replaced
                        ),
                    );
                }
                report(observer, Level::INFO, RULE);
                Ok(SamplingOutcome::Completed {
                    copied: copy_report.written,
                    replaced,
                })
            }
            Err(e) => {
                report(
                    observer,
                    Level::ERROR,
                    format!("Error during sampling: {} (operation incomplete)", e),
                );
                Err(e)
            }
        }
    }
}

/// Plan and execute in one go with a decision made up front
pub fn run_sampling(
    job: &SamplingJob,
    resolution: ConflictResolution,
    observer: &mut dyn SamplingObserver,
) -> SamplerResult<SamplingOutcome> {
    job.plan(observer)?.execute(resolution, observer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::RecordingObserver;
    use std::fs;
    use std::path::Path;

    fn dataset(root: &Path, folder: &str, count: usize) {
        let frames = root.join(folder).join("frames");
        let labels = root.join(folder).join("labels");
        fs::create_dir_all(&frames).unwrap();
        fs::create_dir_all(&labels).unwrap();
        for i in 0..count {
            fs::write(frames.join(format!("{}_{:03}.jpg", folder, i)), b"img").unwrap();
            fs::write(labels.join(format!("{}_{:03}.txt", folder, i)), "0 0.5 0.5 0.1 0.1\n")
                .unwrap();
        }
    }

    #[test]
    fn test_missing_output_path_reported_first() {
        let temp = tempfile::tempdir().unwrap();
        let request = SamplingRequest::new(temp.path(), ["vid1"], 3, 7);
        let job = SamplingJob::new(request, "");

        let mut observer = RecordingObserver::new();
        let err = job.plan(&mut observer).unwrap_err();
        assert!(matches!(err, SamplerError::MissingOutputPath));
        assert!(observer.contains(Level::ERROR, "output folder"));
    }

    #[test]
    fn test_plan_then_execute_into_empty_output() {
        let temp = tempfile::tempdir().unwrap();
        let input = temp.path().join("input");
        dataset(&input, "vid1", 8);
        let out = temp.path().join("out");

        let job = SamplingJob::new(SamplingRequest::new(&input, ["vid1"], 3, 7), &out);
        let mut observer = RecordingObserver::new();
        let plan = job.plan(&mut observer).unwrap();

        assert_eq!(plan.discovered, 8);
        assert_eq!(plan.sample.len(), 3);
        assert!(!plan.has_conflicts());

        // decision is irrelevant when nothing is in the way
        let outcome = plan.execute(ConflictResolution::Abort, &mut observer).unwrap();
        assert_eq!(outcome, SamplingOutcome::Completed { copied: 3, replaced: 0 });
        assert_eq!(observer.progress, vec![(1, 3), (2, 3), (3, 3)]);
        assert_eq!(fs::read_dir(out.join("images")).unwrap().count(), 3);
        assert_eq!(fs::read_dir(out.join("labels")).unwrap().count(), 3);
    }

    #[test]
    fn test_abort_leaves_output_untouched() {
        let temp = tempfile::tempdir().unwrap();
        let input = temp.path().join("input");
        dataset(&input, "vid1", 4);
        let out = temp.path().join("out");
        fs::create_dir_all(out.join("images")).unwrap();
        fs::write(out.join("images/keep_me.jpg"), "old").unwrap();

        let job = SamplingJob::new(SamplingRequest::new(&input, ["vid1"], 2, 1), &out);
        let mut observer = RecordingObserver::new();
        let outcome = run_sampling(&job, ConflictResolution::Abort, &mut observer).unwrap();

        assert_eq!(outcome, SamplingOutcome::Cancelled);
        let names: Vec<_> = fs::read_dir(out.join("images")).unwrap().flatten().collect();
        assert_eq!(names.len(), 1);
        assert_eq!(fs::read_dir(out.join("labels")).unwrap().count(), 0);
        assert!(observer.progress.is_empty());
    }

    #[test]
    fn test_purge_replaces_previous_output() {
        let temp = tempfile::tempdir().unwrap();
        let input = temp.path().join("input");
        dataset(&input, "vid1", 5);
        let out = temp.path().join("out");
        fs::create_dir_all(out.join("labels")).unwrap();
        fs::write(out.join("labels/stale.txt"), "9 0 0 0 0").unwrap();

        let job = SamplingJob::new(SamplingRequest::new(&input, ["vid1"], 2, 99), &out);
        let outcome =
            run_sampling(&job, ConflictResolution::Purge, &mut RecordingObserver::new()).unwrap();

        assert_eq!(outcome, SamplingOutcome::Completed { copied: 2, replaced: 0 });
        assert!(!out.join("labels/stale.txt").exists());
        assert_eq!(fs::read_dir(out.join("labels")).unwrap().count(), 2);
    }

    #[test]
    fn test_oversized_request_warns() {
        let temp = tempfile::tempdir().unwrap();
        let input = temp.path().join("input");
        dataset(&input, "vid1", 4);

        let job = SamplingJob::new(
            SamplingRequest::new(&input, ["vid1"], 100, 5),
            temp.path().join("out"),
        );
        let mut observer = RecordingObserver::new();
        let plan = job.plan(&mut observer).unwrap();

        assert!(plan.sample.clamped);
        assert_eq!(plan.sample.len(), 4);
        assert!(observer.contains(Level::WARN, "larger than available pairs (4)"));
    }

    #[test]
    fn test_custom_output_names() {
        let temp = tempfile::tempdir().unwrap();
        let input = temp.path().join("input");
        dataset(&input, "vid1", 2);
        let out = temp.path().join("out");

        let config = AppConfig {
            output_images_dir: "imgs".to_string(),
            output_labels_dir: "anns".to_string(),
            ..AppConfig::default()
        };
        let job = SamplingJob::new(SamplingRequest::new(&input, ["vid1"], 1, 0), &out)
            .with_config(&config);
        run_sampling(&job, ConflictResolution::Purge, &mut RecordingObserver::new()).unwrap();

        assert_eq!(fs::read_dir(out.join("imgs")).unwrap().count(), 1);
        assert_eq!(fs::read_dir(out.join("anns")).unwrap().count(), 1);
    }

    #[test]
    fn test_shared_frame_names_are_reported() {
        let temp = tempfile::tempdir().unwrap();
        let input = temp.path().join("input");
        for folder in ["vid1", "vid2"] {
            fs::create_dir_all(input.join(folder).join("frames")).unwrap();
            fs::create_dir_all(input.join(folder).join("labels")).unwrap();
            fs::write(input.join(folder).join("frames/frame_0001.jpg"), folder).unwrap();
            fs::write(input.join(folder).join("labels/frame_0001.txt"), "0 0.5 0.5 0.1 0.1")
                .unwrap();
        }
        let out = temp.path().join("out");

        let job = SamplingJob::new(SamplingRequest::new(&input, ["vid1", "vid2"], 2, 3), &out);
        let mut observer = RecordingObserver::new();
        let outcome = run_sampling(&job, ConflictResolution::Purge, &mut observer).unwrap();

        assert_eq!(outcome, SamplingOutcome::Completed { copied: 1, replaced: 1 });
        assert_eq!(fs::read_dir(out.join("images")).unwrap().count(), 1);
        assert!(observer.contains(Level::WARN, "duplicate output name, frame_0001.jpg"));
        assert!(observer.contains(Level::WARN, "1 sampled pair(s) were overwritten"));
        assert!(observer.contains(Level::INFO, "1 image/label pairs copied"));
    }
}
