//! Section data model.
//!
//! Only four sections matter to the v9 runtime. Each one found in the input
//! is described by a `SectionInfo`, and the set of them forms a `SectionTable`.

use std::collections::BTreeMap;
use std::fmt;

/// The sections copied into (or reserved in) a v9 image.
///
/// Declaration order is the copy order used by the image builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SectionName {
    Text,
    Rodata,
    Data,
    Bss,
}

impl SectionName {
    pub const ALL: [SectionName; 4] = [
        SectionName::Text,
        SectionName::Rodata,
        SectionName::Data,
        SectionName::Bss,
    ];

    /// Name without the leading dot, as it appears after `Contents of section .`
    pub fn as_str(self) -> &'static str {
        match self {
            SectionName::Text => "text",
            SectionName::Rodata => "rodata",
            SectionName::Data => "data",
            SectionName::Bss => "bss",
        }
    }

    /// Name with the leading dot, as used in ELF section header string tables.
    pub fn elf_name(self) -> &'static str {
        match self {
            SectionName::Text => ".text",
            SectionName::Rodata => ".rodata",
            SectionName::Data => ".data",
            SectionName::Bss => ".bss",
        }
    }

    /// `.bss` never carries bytes in the file.
    pub fn has_file_content(self) -> bool {
        self != SectionName::Bss
    }
}

impl fmt::Display for SectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.elf_name())
    }
}

/// Layout and content of one input section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionInfo {
    pub name: SectionName,
    /// Size in bytes.
    pub size: u64,
    /// Virtual memory address; also the offset of the section in the image.
    pub vma: u64,
    /// Load memory address.
    pub lma: u64,
    /// Offset of the section bytes in the ELF file.
    pub file_offset: u64,
    /// Raw bytes, or `None` for `.bss` and sections without dumped content.
    pub content: Option<Vec<u8>>,
}

impl SectionInfo {
    pub fn new(name: SectionName, size: u64, vma: u64, lma: u64, file_offset: u64) -> Self {
        Self {
            name,
            size,
            vma,
            lma,
            file_offset,
            content: None,
        }
    }

    /// End address (`vma + size`), or `None` on overflow.
    pub fn end(&self) -> Option<u64> {
        self.vma.checked_add(self.size)
    }
}

/// The sections found in an input file, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionTable {
    sections: BTreeMap<SectionName, SectionInfo>,
}

impl SectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a section, replacing any previous entry with the same name.
    pub fn insert(&mut self, info: SectionInfo) {
        self.sections.insert(info.name, info);
    }

    pub fn get(&self, name: SectionName) -> Option<&SectionInfo> {
        self.sections.get(&name)
    }

    pub fn get_mut(&mut self, name: SectionName) -> Option<&mut SectionInfo> {
        self.sections.get_mut(&name)
    }

    pub fn contains(&self, name: SectionName) -> bool {
        self.sections.contains_key(&name)
    }

    /// Present sections in copy order (`.text`, `.rodata`, `.data`, `.bss`).
    pub fn iter(&self) -> impl Iterator<Item = &SectionInfo> {
        self.sections.values()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl FromIterator<SectionInfo> for SectionTable {
    fn from_iter<T: IntoIterator<Item = SectionInfo>>(iter: T) -> Self {
        let mut table = SectionTable::new();
        for info in iter {
            table.insert(info);
        }
        table
    }
}
