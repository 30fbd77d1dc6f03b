//! ELF inspection abstraction.
//!
//! This module defines the `ElfInspector` trait, which hides where section
//! layout and contents come from. The converter only sees entry points,
//! section headers and section bytes, so the source can be a native ELF parse
//! (`native`) or external reporting tools run as subprocesses (`tools`).

use crate::error::Result;
use crate::section::{SectionName, SectionTable};

pub mod native;
pub mod tools;

/// A source of ELF layout information.
pub trait ElfInspector {
    /// The ELF entry point address.
    fn entry_point(&self) -> Result<u64>;

    /// Headers of the known sections present in the file.
    ///
    /// Entries carry size, vma, lma and file offset only; `content` is `None`.
    fn section_headers(&self) -> Result<SectionTable>;

    /// Raw bytes of a section.
    ///
    /// Returns `None` if the section has no file content (`.bss`, or a
    /// section the content source does not list).
    fn section_contents(&self, name: SectionName) -> Result<Option<Vec<u8>>>;
}
