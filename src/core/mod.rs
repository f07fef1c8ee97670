pub mod analysis;
pub mod dataset;
pub mod events;
pub mod operations;
pub mod sampling;

pub use analysis::*;
pub use dataset::*;
pub use events::{report, NullObserver, RecordingObserver, SamplingObserver};
pub use operations::*;
pub use sampling::*;
