use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid structure: {0}")]
    Structure(String),

    #[error("object {0} not found in xref table")]
    MissingObject(u32),

    #[error("cannot verify to an undefined conformance level")]
    UndefinedLevel,

    #[error("path cannot be empty")]
    EmptyPath,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PdfError>;
