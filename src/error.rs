use thiserror::Error;

/// Errors from the editor's ambient operations.
///
/// Graph operations never fail; they ignore unknown ids instead. Only
/// configuration loading and renderer set-up can go wrong.
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Renderer error: {0}")]
    Renderer(String),
    #[error("No renderer backend could be initialized")]
    NoRenderer,
}

pub type Result<T, E = EditorError> = std::result::Result<T, E>;
