//! Error types.

use std::path::PathBuf;

pub type Result<T, E = ExtractError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The input dump could not be opened.
    #[error("cannot open input '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output file could not be created.
    #[error("cannot create output '{}': {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The XML reader rejected the document.
    #[error("XML error at byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    /// Well-formed XML events that do not add up to a complete document.
    #[error("malformed document at byte {position}: {message}")]
    Malformed { position: u64, message: String },
}

impl ExtractError {
    /// True for the variants raised while reading the dump itself.
    pub fn is_malformed(&self) -> bool {
        matches!(self, ExtractError::Xml { .. } | ExtractError::Malformed { .. })
    }
}
