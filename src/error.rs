use std::fmt;

/// Central error types for the photo upload demo app
#[derive(Debug)]
pub enum AppError {
    /// Filesystem error
    Filesystem(std::io::Error),
    /// Config file could not be parsed or written
    Config(String),
    /// Validation error (e.g. out of range settings)
    Validation(String),
    /// Picking, resizing or reading a photo failed
    Photo(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Filesystem(e) => write!(f, "Filesystem error: {}", e),
            AppError::Config(msg) => write!(f, "Config error: {}", msg),
            AppError::Validation(msg) => write!(f, "Validation error: {}", msg),
            AppError::Photo(msg) => write!(f, "Photo error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

// Conversions from other error types
impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Filesystem(e)
    }
}

impl From<toml::de::Error> for AppError {
    fn from(e: toml::de::Error) -> Self {
        AppError::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(e: toml::ser::Error) -> Self {
        AppError::Config(e.to_string())
    }
}

impl From<photo_upload_widget::PipelineError> for AppError {
    fn from(e: photo_upload_widget::PipelineError) -> Self {
        AppError::Photo(e.to_string())
    }
}

/// User-friendly error messages for UI
impl AppError {
    pub fn user_message(&self) -> String {
        match self {
            AppError::Filesystem(_) => {
                "Error accessing files. Please check app permissions.".to_string()
            }
            AppError::Config(_) => "The settings file is invalid, defaults are used.".to_string(),
            AppError::Validation(msg) => msg.clone(),
            AppError::Photo(_) => "Error processing image.".to_string(),
        }
    }
}
