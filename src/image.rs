//! v9 image layout.
//!
//! A v9 image is a flat memory snapshot: every section sits at its virtual
//! address, gaps are zero, and a 16-byte header occupies the first bytes:
//!
//! | Offset | Size | Field |
//! |---|---|---|
//! | 0 | 4 | magic `0xC0DEF00D` |
//! | 4 | 4 | reserved, zero |
//! | 8 | 4 | entry point |
//! | 12 | 4 | data offset (end of `.text`) |
//!
//! All fields are little-endian.

use tracing::{debug, info};

use crate::error::{ConvertError, Result};
use crate::section::{SectionInfo, SectionName, SectionTable};

pub const V9_MAGIC: u32 = 0xC0DE_F00D;

const MAGIC_OFFSET: usize = 0;
const ENTRY_OFFSET: usize = 8;
const DATA_OFFSET_OFFSET: usize = 12;

/// The decoded fields of a v9 image header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHeader {
    pub entry_point: u32,
    /// Address just past `.text`, where the runtime looks for initialized data.
    pub data_offset: u32,
}

impl ImageHeader {
    pub const SIZE: usize = 16;

    /// Builds the header for an image whose text section is `text`.
    pub fn new(entry_point: u64, text: &SectionInfo) -> Result<Self> {
        let data_offset = text.end().ok_or_else(|| {
            ConvertError::AddressOverflow(format!("{} end overflows 64 bits", text.name))
        })?;
        Ok(Self {
            entry_point: fit_u32("entry point", entry_point)?,
            data_offset: fit_u32("data offset", data_offset)?,
        })
    }

    pub fn to_bytes(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        for (offset, value) in [
            (MAGIC_OFFSET, V9_MAGIC),
            (ENTRY_OFFSET, self.entry_point),
            (DATA_OFFSET_OFFSET, self.data_offset),
        ] {
            out[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        }
        out
    }

    /// Reads the header at the start of an image, if the magic matches.
    pub fn parse(image: &[u8]) -> Option<Self> {
        let field = |offset: usize| -> Option<u32> {
            let bytes = image.get(offset..offset + 4)?;
            Some(u32::from_le_bytes(bytes.try_into().ok()?))
        };
        if field(MAGIC_OFFSET)? != V9_MAGIC {
            return None;
        }
        Some(Self {
            entry_point: field(ENTRY_OFFSET)?,
            data_offset: field(DATA_OFFSET_OFFSET)?,
        })
    }
}

fn fit_u32(what: &str, value: u64) -> Result<u32> {
    u32::try_from(value).map_err(|_| {
        ConvertError::AddressOverflow(format!("{} 0x{:x} does not fit in 32 bits", what, value))
    })
}

/// A zero-filled image buffer that only accepts in-bounds writes.
#[derive(Debug)]
pub struct ImageArena {
    bytes: Vec<u8>,
}

impl ImageArena {
    pub fn new(size: u64) -> Result<Self> {
        let size = usize::try_from(size).map_err(|_| {
            ConvertError::AddressOverflow(format!("image size 0x{:x} exceeds address space", size))
        })?;
        Ok(Self {
            bytes: vec![0; size],
        })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Copies `data` to `[offset, offset + data.len())`.
    pub fn write(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        let out_of_bounds = || ConvertError::OutOfBounds {
            offset,
            len: data.len() as u64,
            size: self.bytes.len() as u64,
        };
        let start = usize::try_from(offset).map_err(|_| out_of_bounds())?;
        let end = start
            .checked_add(data.len())
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(out_of_bounds)?;
        self.bytes[start..end].copy_from_slice(data);
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Total image size: the highest section end address, `.bss` included.
pub fn image_size(sections: &SectionTable) -> Result<u64> {
    let mut size = 0;
    for section in sections.iter() {
        let end = section.end().ok_or_else(|| {
            ConvertError::AddressOverflow(format!("{} end overflows 64 bits", section.name))
        })?;
        size = size.max(end);
    }
    Ok(size)
}

/// Lays out `sections` into a v9 image.
///
/// Sections with content are copied in the order `.text`, `.rodata`, `.data`
/// after the header is written, so a section placed below address 16 would
/// overwrite header bytes. `.bss` only contributes to the image size.
pub fn build_image(entry_point: u64, sections: &SectionTable) -> Result<Vec<u8>> {
    let text = sections
        .get(SectionName::Text)
        .ok_or(ConvertError::MissingSection(SectionName::Text))?;
    if text.size == 0 {
        return Err(ConvertError::EmptySection(SectionName::Text));
    }

    let header = ImageHeader::new(entry_point, text)?;
    let size = image_size(sections)?;
    if size < ImageHeader::SIZE as u64 {
        return Err(ConvertError::ImageTooSmall {
            size,
            header: ImageHeader::SIZE,
        });
    }

    let mut arena = ImageArena::new(size)?;
    arena.write(0, &header.to_bytes())?;
    debug!(
        "header: entry=0x{:x} data_offset=0x{:x}",
        header.entry_point, header.data_offset
    );

    for section in sections.iter() {
        if !section.name.has_file_content() {
            debug!("{}: reserved 0x{:x} bytes at 0x{:x}", section.name, section.size, section.vma);
            continue;
        }
        let Some(content) = &section.content else {
            debug!("{}: no content, left zero-filled", section.name);
            continue;
        };
        if content.len() as u64 != section.size {
            return Err(ConvertError::SectionSizeMismatch {
                section: section.name,
                declared: section.size,
                actual: content.len() as u64,
            });
        }
        arena.write(section.vma, content)?;
        info!(
            "Placed {} at 0x{:x} ({} bytes)",
            section.name,
            section.vma,
            content.len()
        );
    }

    Ok(arena.into_bytes())
}
