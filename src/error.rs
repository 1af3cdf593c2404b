use thiserror::Error;

#[derive(Error, Debug)]
pub enum WidgetError {
    #[error("Failed to load config: {0}")]
    ConfigLoad(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Failed to export history: {0}")]
    ExportFailed(String),
}

pub type Result<T> = std::result::Result<T, WidgetError>;
