//! Configuration for the Hearth engine.

mod settings;

pub use settings::{
    CacheConfig, Config, DedupConfig, ExtractionConfig, OcrConfig, ReviewConfig, TimezoneConfig,
};
