use thiserror::Error;

/// Errors returned by every fallible operation in this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// The requested farm, plan, post or task does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Input rejected before anything was written.
    #[error("{0}")]
    Validation(String),

    /// Crop allocations add up to more than the farm's area.
    #[error("allocated {allocated:.2} ha exceeds the farm's {available:.2} ha")]
    OverAllocated { allocated: f64, available: f64 },

    /// A stored value could not be decoded.
    #[error("corrupt record at '{key}': {message}")]
    Corrupt { key: String, message: String },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
