//! Error types.
//!
//! Every failure in the conversion pipeline is fatal, so the library reports
//! a single `ConvertError` and lets the binary turn it into a non-zero exit.

use std::path::PathBuf;
use thiserror::Error;

use crate::section::SectionName;

#[derive(Error, Debug)]
pub enum ConvertError {
    /// A tool report (or ELF field) did not follow the expected grammar.
    #[error("format error: {0}")]
    Format(String),

    #[error("required section {0} is missing")]
    MissingSection(SectionName),

    #[error("required section {0} is empty")]
    EmptySection(SectionName),

    #[error("hex format error: token {token:?} is not an even-length hex string")]
    HexFormat { token: String },

    #[error("section {section}: content is {actual} bytes but header declares {declared}")]
    SectionSizeMismatch {
        section: SectionName,
        declared: u64,
        actual: u64,
    },

    #[error("address overflow: {0}")]
    AddressOverflow(String),

    #[error("image is {size} bytes, smaller than the {header}-byte header")]
    ImageTooSmall { size: u64, header: usize },

    #[error("write of {len} bytes at 0x{offset:x} exceeds image size 0x{size:x}")]
    OutOfBounds { offset: u64, len: u64, size: u64 },

    #[error("ELF parse error: {0}")]
    Elf(#[from] object::read::Error),

    #[error("{tool}: {message}")]
    Tool { tool: String, message: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConvertError>;
