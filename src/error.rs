//! Error types for the Hearth engine.

use thiserror::Error;

/// Main error type for Hearth operations.
#[derive(Error, Debug)]
pub enum HearthError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Extraction pipeline errors.
///
/// Individual sub-extractors never error on a miss; these cover the cases
/// where the pipeline has nothing to work with at all.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Input text is empty")]
    EmptyInput,

    #[error("Invalid family context: {0}")]
    InvalidContext(String),
}

/// OCR boundary errors.
#[derive(Error, Debug)]
pub enum OcrError {
    #[error("OCR request failed: {0}")]
    Request(String),

    #[error("OCR backend returned status {0}")]
    Status(u16),

    #[error("OCR backend returned empty text for {0}")]
    EmptyText(String),

    #[error("Malformed OCR response: {0}")]
    MalformedResponse(String),
}

/// Storage and repository errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Event not found: {0}")]
    NotFound(String),

    #[error("Event already deleted: {0}")]
    AlreadyDeleted(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Query error: {0}")]
    Query(String),
}

/// Result type alias for Hearth operations.
pub type Result<T> = std::result::Result<T, HearthError>;
