mod statistics;

pub use statistics::{
    analyze_dataset, analyze_dataset_with_options, format_file_size, DatasetStatistics, Extent,
    FileIssue, FileKind, FolderSummary, ResolutionCount,
};
