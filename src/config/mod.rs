mod app_config;

pub use app_config::{AnalysisOptions, AppConfig, DatasetLayout, ResolutionSampling};
