//! Sample image/label pairs from per-video YOLO datasets.
//!
//! Input layout: `<root>/<video>/frames/*.{jpg,jpeg,png,bmp,tiff,tif}` with
//! `<root>/<video>/labels/<stem>.txt`. Output layout:
//! `<out>/images/<file name>` and `<out>/labels/<stem>.txt`.

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod state;

pub use crate::config::{AnalysisOptions, AppConfig, DatasetLayout, ResolutionSampling};
pub use crate::core::{
    analyze_dataset, analyze_dataset_with_options, check_conflicts, copy_pairs, discover_pairs,
    discover_pairs_with_layout, list_video_folders, prepare_output, resolve_conflicts,
    run_sampling, sample, ConflictResolution, DatasetStatistics, NullObserver, Pair,
    RecordingObserver, SamplingJob, SamplingObserver, SamplingOutcome, SamplingPlan,
    SamplingRequest,
};
pub use crate::error::{SamplerError, SamplerResult};
