mod job;
mod request;
mod sampler;

pub use job::{run_sampling, SamplingJob, SamplingOutcome, SamplingPlan};
pub use request::SamplingRequest;
pub use sampler::{sample, Sample};
