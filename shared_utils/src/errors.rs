use thiserror::Error;

#[derive(Error, Debug)]
pub enum Vid2GifError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unsupported input file: {0}")]
    UnsupportedInput(String),

    #[error("Palette generation failed: {0}")]
    PaletteGeneration(String),

    #[error("GIF synthesis failed: {0}")]
    GifSynthesis(String),

    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("Conversion cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Vid2GifError>;
