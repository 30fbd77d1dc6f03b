//! Image file writer.
//!
//! This module persists a finished v9 image to disk.

use std::path::Path;
use tracing::info;

use crate::error::{ConvertError, Result};

/// Write a v9 image to disk, replacing any existing file.
pub fn write_image(output_path: &Path, image: &[u8]) -> Result<()> {
    std::fs::write(output_path, image).map_err(|source| ConvertError::Io {
        path: output_path.to_path_buf(),
        source,
    })?;
    info!("Wrote {} bytes to {}", image.len(), output_path.display());
    Ok(())
}
