//! Native ELF inspector.
//!
//! Reads the section header table and program headers directly with the
//! `object` crate. Supports ELF32 and ELF64 in either byte order.

use memmap2::Mmap;
use object::elf::PT_LOAD;
use object::read::elf::{ElfFile, ElfFile32, ElfFile64, FileHeader, ProgramHeader, SectionHeader};
use object::{Endianness, FileKind, Object, ObjectSection, SectionKind};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use tracing::debug;

use super::ElfInspector;
use crate::error::{ConvertError, Result};
use crate::section::{SectionInfo, SectionName, SectionTable};

/// Memory-maps an input file for inspection.
pub fn map_file(path: &Path) -> Result<Mmap> {
    let io_err = |source| ConvertError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(io_err)?;
    // The mapping is read-only and lives no longer than the conversion.
    unsafe { Mmap::map(&file) }.map_err(io_err)
}

/// A loadable segment: virtual address, physical address, memory size.
#[derive(Debug, Clone, Copy)]
struct LoadSegment {
    vaddr: u64,
    paddr: u64,
    memsz: u64,
}

/// ELF inspector backed by an in-memory parse of the file.
///
/// Everything is extracted up front; section bytes borrow from `data`.
pub struct NativeInspector<'data> {
    entry: u64,
    sections: SectionTable,
    contents: BTreeMap<SectionName, &'data [u8]>,
}

impl<'data> NativeInspector<'data> {
    pub fn parse(data: &'data [u8]) -> Result<Self> {
        match FileKind::parse(data)? {
            FileKind::Elf32 => Self::from_elf(&ElfFile32::<Endianness>::parse(data)?),
            FileKind::Elf64 => Self::from_elf(&ElfFile64::<Endianness>::parse(data)?),
            kind => Err(ConvertError::Format(format!(
                "expected an ELF file, found {:?}",
                kind
            ))),
        }
    }

    fn from_elf<Elf>(elf: &ElfFile<'data, Elf>) -> Result<Self>
    where
        Elf: FileHeader<Endian = Endianness>,
    {
        let endian = elf.endian();
        let segments: Vec<LoadSegment> = elf
            .elf_program_headers()
            .iter()
            .filter(|ph| ph.p_type(endian) == PT_LOAD)
            .map(|ph| LoadSegment {
                vaddr: ph.p_vaddr(endian).into(),
                paddr: ph.p_paddr(endian).into(),
                memsz: ph.p_memsz(endian).into(),
            })
            .collect();

        let mut sections = SectionTable::new();
        let mut contents = BTreeMap::new();
        for name in SectionName::ALL {
            let Some(section) = elf.section_by_name(name.elf_name()) else {
                debug!("{} not present", name);
                continue;
            };
            let vma = section.address();
            let size = section.size();
            let file_offset: u64 = section.elf_section_header().sh_offset(endian).into();
            let lma = load_address(&segments, vma);
            debug!(
                "{}: size=0x{:x} vma=0x{:x} lma=0x{:x} file_off=0x{:x}",
                name, size, vma, lma, file_offset
            );
            sections.insert(SectionInfo::new(name, size, vma, lma, file_offset));

            if name.has_file_content() && section.kind() != SectionKind::UninitializedData {
                contents.insert(name, section.data()?);
            }
        }

        Ok(Self {
            entry: elf.entry(),
            sections,
            contents,
        })
    }
}

/// Translates a virtual address to its load address through the `PT_LOAD`
/// segment that contains it. Addresses outside every segment load in place.
fn load_address(segments: &[LoadSegment], vma: u64) -> u64 {
    segments
        .iter()
        .find(|seg| vma >= seg.vaddr && vma - seg.vaddr < seg.memsz)
        .map(|seg| seg.paddr.wrapping_add(vma - seg.vaddr))
        .unwrap_or(vma)
}

impl ElfInspector for NativeInspector<'_> {
    fn entry_point(&self) -> Result<u64> {
        Ok(self.entry)
    }

    fn section_headers(&self) -> Result<SectionTable> {
        Ok(self.sections.clone())
    }

    fn section_contents(&self, name: SectionName) -> Result<Option<Vec<u8>>> {
        Ok(self.contents.get(&name).map(|bytes| bytes.to_vec()))
    }
}
