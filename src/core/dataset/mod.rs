mod label;
mod pair_index;
mod video_folder;

pub use label::{parse_label_summary, read_label_summary, LabelParseError, LabelSummary};
pub use pair_index::{discover_pairs, discover_pairs_with_layout, Discovery, DiscoveryWarning, Pair};
pub use video_folder::{list_video_folders, VideoFolder};
