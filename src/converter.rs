//! Conversion orchestration.
//!
//! This module contains the `Converter` struct which drives a single ELF to v9
//! image conversion:
//! 1. Extract: read the entry point and section headers from the inspector.
//! 2. Decode: attach raw bytes to every section that has file content.
//! 3. Build: lay the sections out in a zero-filled image behind the header.
//! 4. Write: persist the image.

use std::path::Path;
use tracing::{debug, info};

use crate::error::{ConvertError, Result};
use crate::image;
use crate::inspect::ElfInspector;
use crate::section::{SectionName, SectionTable};
use crate::writer;

pub struct Converter<I: ElfInspector> {
    inspector: I,
    entry_point: u64,
    sections: SectionTable,
    image: Option<Vec<u8>>,
}

impl<I: ElfInspector> Converter<I> {
    pub fn new(inspector: I) -> Self {
        Self {
            inspector,
            entry_point: 0,
            sections: SectionTable::new(),
            image: None,
        }
    }

    pub fn entry_point(&self) -> u64 {
        self.entry_point
    }

    pub fn sections(&self) -> &SectionTable {
        &self.sections
    }

    /// Reads the entry point and the section headers. `.text` is mandatory.
    pub fn extract(&mut self) -> Result<()> {
        self.entry_point = self.inspector.entry_point()?;
        self.sections = self.inspector.section_headers()?;
        if !self.sections.contains(SectionName::Text) {
            return Err(ConvertError::MissingSection(SectionName::Text));
        }
        info!(
            "Entry point 0x{:x}, {} section(s)",
            self.entry_point,
            self.sections.len()
        );
        Ok(())
    }

    /// Fetches the bytes of every extracted section that has file content.
    pub fn decode(&mut self) -> Result<()> {
        for name in SectionName::ALL {
            if !name.has_file_content() {
                continue;
            }
            let Some(section) = self.sections.get_mut(name) else {
                continue;
            };
            section.content = self.inspector.section_contents(name)?;
            match &section.content {
                Some(bytes) => debug!("{}: decoded {} bytes", name, bytes.len()),
                None => debug!("{}: no content found", name),
            }
        }
        Ok(())
    }

    /// Builds the image from the decoded sections.
    pub fn build(&mut self) -> Result<&[u8]> {
        let image = image::build_image(self.entry_point, &self.sections)?;
        info!("Built image of {} bytes", image.len());
        Ok(self.image.insert(image).as_slice())
    }

    /// Writes the built image, building it first if needed.
    pub fn write(&mut self, output_path: &Path) -> Result<()> {
        if self.image.is_none() {
            self.build()?;
        }
        let image = self.image.as_deref().unwrap_or_default();
        writer::write_image(output_path, image)
    }

    /// Runs every step and returns the image without writing it.
    pub fn run(&mut self) -> Result<Vec<u8>> {
        self.extract()?;
        self.decode()?;
        Ok(self.build()?.to_vec())
    }
}
