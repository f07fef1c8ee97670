mod file_ops;
mod output;

pub use file_ops::{copy_with_metadata, file_name_of, list_sorted, stem_of, EntryKind};
pub use output::{
    check_conflicts, copy_pairs, find_name_collisions, prepare_output, prepare_output_with_names, resolve_conflicts,
    ConflictResolution, CopyReport, ExistingFiles, NameCollision, OutputDirs, ResolutionOutcome,
    OUTPUT_LABEL_EXTENSION,
};
