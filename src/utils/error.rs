use thiserror::Error;

#[derive(Error, Debug)]
pub enum PressError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Conversion failed: {message}")]
    ConversionError { message: String },

    #[error("Template rendering failed: {message}")]
    TemplateError { message: String },

    #[error("Tree structure error: {message}")]
    TreeWalkError { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequestError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },
}

pub type Result<T> = std::result::Result<T, PressError>;
