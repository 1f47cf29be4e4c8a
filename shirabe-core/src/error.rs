use std::path::PathBuf;

/// Errors surfaced by the ELF/DWARF readers.
///
/// Fatal conditions are typed so callers can tell "attribute absent" apart
/// from "image malformed". Unhandled attribute forms are not errors; they
/// are logged and decode to [`crate::AttrValue::Absent`].
#[derive(thiserror::Error, Debug)]
pub enum DwarfError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed image: {0}")]
    Format(String),

    #[error("section {0} not found")]
    SectionNotFound(String),

    #[error("no entry at offset {offset:#x}")]
    Reference { offset: u64 },
}

impl DwarfError {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        DwarfError::Format(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, DwarfError>;
