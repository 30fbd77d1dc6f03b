//! Builds small ELF executables for tests.

#![allow(dead_code)]

use object::elf;
use object::endian::{U16, U32, U64};
use object::pod::bytes_of;
use object::Endianness;

/// A section to place in a test ELF.
pub struct TestSection {
    pub name: &'static str,
    pub addr: u64,
    pub data: Vec<u8>,
    /// Size of a `SHT_NOBITS` section; `data` is ignored when set.
    pub nobits: Option<u64>,
}

impl TestSection {
    pub fn progbits(name: &'static str, addr: u64, data: &[u8]) -> Self {
        Self {
            name,
            addr,
            data: data.to_vec(),
            nobits: None,
        }
    }

    pub fn nobits(name: &'static str, addr: u64, size: u64) -> Self {
        Self {
            name,
            addr,
            data: Vec::new(),
            nobits: Some(size),
        }
    }

    fn size(&self) -> u64 {
        self.nobits.unwrap_or(self.data.len() as u64)
    }

    fn type_and_flags(&self) -> (u32, u32) {
        match (self.nobits, self.name) {
            (Some(_), _) => (elf::SHT_NOBITS, elf::SHF_ALLOC | elf::SHF_WRITE),
            (None, ".text") => (elf::SHT_PROGBITS, elf::SHF_ALLOC | elf::SHF_EXECINSTR),
            (None, ".data") => (elf::SHT_PROGBITS, elf::SHF_ALLOC | elf::SHF_WRITE),
            (None, _) => (elf::SHT_PROGBITS, elf::SHF_ALLOC),
        }
    }
}

/// A `PT_LOAD` segment: virtual address, physical address, memory size.
pub struct TestSegment {
    pub vaddr: u64,
    pub paddr: u64,
    pub memsz: u64,
}

/// Fields of one section header, independent of ELF class.
struct SectionFields {
    name: u32,
    sh_type: u32,
    flags: u32,
    addr: u64,
    offset: u64,
    size: u64,
    align: u64,
}

/// Section data starts here, after the file and program headers.
const DATA_START: usize = 0x100;

fn align8(n: usize) -> usize {
    (n + 7) & !7
}

/// Emits ELF executables of one class and byte order.
#[derive(Debug, Clone, Copy)]
pub struct ElfBuilder {
    endian: Endianness,
    is_64: bool,
}

impl ElfBuilder {
    pub const LITTLE_64: ElfBuilder = ElfBuilder::new(Endianness::Little, true);
    pub const LITTLE_32: ElfBuilder = ElfBuilder::new(Endianness::Little, false);
    pub const BIG_64: ElfBuilder = ElfBuilder::new(Endianness::Big, true);
    pub const BIG_32: ElfBuilder = ElfBuilder::new(Endianness::Big, false);

    pub const fn new(endian: Endianness, is_64: bool) -> Self {
        Self { endian, is_64 }
    }

    fn u16(&self, v: u16) -> U16<Endianness> {
        U16::new(self.endian, v)
    }

    fn u32(&self, v: u32) -> U32<Endianness> {
        U32::new(self.endian, v)
    }

    fn u64(&self, v: u64) -> U64<Endianness> {
        U64::new(self.endian, v)
    }

    fn ident(&self) -> elf::Ident {
        elf::Ident {
            magic: elf::ELFMAG,
            class: if self.is_64 { elf::ELFCLASS64 } else { elf::ELFCLASS32 },
            data: match self.endian {
                Endianness::Little => elf::ELFDATA2LSB,
                Endianness::Big => elf::ELFDATA2MSB,
            },
            version: elf::EV_CURRENT,
            os_abi: elf::ELFOSABI_SYSV,
            abi_version: 0,
            padding: [0; 7],
        }
    }

    fn machine(&self) -> u16 {
        match (self.endian, self.is_64) {
            (Endianness::Little, true) => elf::EM_X86_64,
            (Endianness::Little, false) => elf::EM_386,
            (Endianness::Big, true) => elf::EM_PPC64,
            (Endianness::Big, false) => elf::EM_PPC,
        }
    }

    fn header_sizes(&self) -> (usize, usize, usize) {
        if self.is_64 {
            (
                std::mem::size_of::<elf::FileHeader64<Endianness>>(),
                std::mem::size_of::<elf::ProgramHeader64<Endianness>>(),
                std::mem::size_of::<elf::SectionHeader64<Endianness>>(),
            )
        } else {
            (
                std::mem::size_of::<elf::FileHeader32<Endianness>>(),
                std::mem::size_of::<elf::ProgramHeader32<Endianness>>(),
                std::mem::size_of::<elf::SectionHeader32<Endianness>>(),
            )
        }
    }

    fn file_header(&self, entry: u64, phnum: usize, shoff: u64, shnum: usize) -> Vec<u8> {
        let (ehsize, phentsize, shentsize) = self.header_sizes();
        let phoff = if phnum == 0 { 0 } else { ehsize as u64 };
        let e_type = self.u16(elf::ET_EXEC);
        let e_machine = self.u16(self.machine());
        let e_version = self.u32(elf::EV_CURRENT.into());
        let e_flags = self.u32(0);
        let e_ehsize = self.u16(ehsize as u16);
        let e_phentsize = self.u16(phentsize as u16);
        let e_phnum = self.u16(phnum as u16);
        let e_shentsize = self.u16(shentsize as u16);
        let e_shnum = self.u16(shnum as u16);
        let e_shstrndx = self.u16(shnum as u16 - 1);
        if self.is_64 {
            bytes_of(&elf::FileHeader64 {
                e_ident: self.ident(),
                e_type,
                e_machine,
                e_version,
                e_entry: self.u64(entry),
                e_phoff: self.u64(phoff),
                e_shoff: self.u64(shoff),
                e_flags,
                e_ehsize,
                e_phentsize,
                e_phnum,
                e_shentsize,
                e_shnum,
                e_shstrndx,
            })
            .to_vec()
        } else {
            bytes_of(&elf::FileHeader32 {
                e_ident: self.ident(),
                e_type,
                e_machine,
                e_version,
                e_entry: self.u32(entry as u32),
                e_phoff: self.u32(phoff as u32),
                e_shoff: self.u32(shoff as u32),
                e_flags,
                e_ehsize,
                e_phentsize,
                e_phnum,
                e_shentsize,
                e_shnum,
                e_shstrndx,
            })
            .to_vec()
        }
    }

    fn program_header(&self, segment: &TestSegment) -> Vec<u8> {
        let p_type = self.u32(elf::PT_LOAD);
        let p_flags = self.u32(elf::PF_R | elf::PF_W | elf::PF_X);
        if self.is_64 {
            bytes_of(&elf::ProgramHeader64 {
                p_type,
                p_flags,
                p_offset: self.u64(0),
                p_vaddr: self.u64(segment.vaddr),
                p_paddr: self.u64(segment.paddr),
                p_filesz: self.u64(0),
                p_memsz: self.u64(segment.memsz),
                p_align: self.u64(1),
            })
            .to_vec()
        } else {
            bytes_of(&elf::ProgramHeader32 {
                p_type,
                p_flags,
                p_offset: self.u32(0),
                p_vaddr: self.u32(segment.vaddr as u32),
                p_paddr: self.u32(segment.paddr as u32),
                p_filesz: self.u32(0),
                p_memsz: self.u32(segment.memsz as u32),
                p_align: self.u32(1),
            })
            .to_vec()
        }
    }

    fn section_header(&self, f: &SectionFields) -> Vec<u8> {
        let sh_name = self.u32(f.name);
        let sh_type = self.u32(f.sh_type);
        let sh_link = self.u32(0);
        let sh_info = self.u32(0);
        if self.is_64 {
            bytes_of(&elf::SectionHeader64 {
                sh_name,
                sh_type,
                sh_flags: self.u64(f.flags.into()),
                sh_addr: self.u64(f.addr),
                sh_offset: self.u64(f.offset),
                sh_size: self.u64(f.size),
                sh_link,
                sh_info,
                sh_addralign: self.u64(f.align),
                sh_entsize: self.u64(0),
            })
            .to_vec()
        } else {
            bytes_of(&elf::SectionHeader32 {
                sh_name,
                sh_type,
                sh_flags: self.u32(f.flags),
                sh_addr: self.u32(f.addr as u32),
                sh_offset: self.u32(f.offset as u32),
                sh_size: self.u32(f.size as u32),
                sh_link,
                sh_info,
                sh_addralign: self.u32(f.align as u32),
                sh_entsize: self.u32(0),
            })
            .to_vec()
        }
    }

    /// Builds an executable holding `sections`, followed by `.shstrtab`.
    pub fn build(&self, entry: u64, sections: &[TestSection], segments: &[TestSegment]) -> Vec<u8> {
        let (ehsize, phentsize, _) = self.header_sizes();
        assert!(ehsize + segments.len() * phentsize <= DATA_START, "too many segments");

        // Layout: headers, section data, .shstrtab, section header table.
        let mut offsets = Vec::new();
        let mut cursor = DATA_START;
        for section in sections {
            cursor = align8(cursor);
            offsets.push(cursor);
            if section.nobits.is_none() {
                cursor += section.data.len();
            }
        }

        let mut shstrtab = vec![0u8];
        let mut name_offsets = Vec::new();
        for section in sections.iter().map(|s| s.name).chain([".shstrtab"]) {
            name_offsets.push(shstrtab.len() as u32);
            shstrtab.extend_from_slice(section.as_bytes());
            shstrtab.push(0);
        }
        let shstrtab_offset = cursor;
        let shoff = align8(shstrtab_offset + shstrtab.len());
        let shnum = sections.len() + 2;

        let mut out = self.file_header(entry, segments.len(), shoff as u64, shnum);
        for segment in segments {
            out.extend(self.program_header(segment));
        }
        for (section, &offset) in sections.iter().zip(&offsets) {
            out.resize(offset, 0);
            if section.nobits.is_none() {
                out.extend_from_slice(&section.data);
            }
        }
        out.resize(shstrtab_offset, 0);
        out.extend_from_slice(&shstrtab);
        out.resize(shoff, 0);

        out.extend(self.section_header(&SectionFields {
            name: 0,
            sh_type: elf::SHT_NULL,
            flags: 0,
            addr: 0,
            offset: 0,
            size: 0,
            align: 0,
        }));
        for (i, section) in sections.iter().enumerate() {
            let (sh_type, flags) = section.type_and_flags();
            out.extend(self.section_header(&SectionFields {
                name: name_offsets[i],
                sh_type,
                flags,
                addr: section.addr,
                offset: offsets[i] as u64,
                size: section.size(),
                align: 4,
            }));
        }
        out.extend(self.section_header(&SectionFields {
            name: name_offsets[sections.len()],
            sh_type: elf::SHT_STRTAB,
            flags: 0,
            addr: 0,
            offset: shstrtab_offset as u64,
            size: shstrtab.len() as u64,
            align: 1,
        }));
        out
    }

    /// A typical firmware layout: text, rodata, data and bss above the header.
    pub fn firmware(&self) -> Vec<u8> {
        self.build(
            0x20,
            &[
                TestSection::progbits(".text", 0x20, &[0xde, 0xad, 0xbe, 0xef, 0x90, 0x90, 0x90, 0xc3]),
                TestSection::progbits(".rodata", 0x40, b"hello\0\0\0"),
                TestSection::progbits(".data", 0x48, &[1, 2, 3, 4]),
                TestSection::nobits(".bss", 0x50, 0x30),
                TestSection::progbits(".comment", 0, b"GCC: test\0"),
            ],
            &[TestSegment {
                vaddr: 0x20,
                paddr: 0x8000_0020,
                memsz: 0x60,
            }],
        )
    }
}

/// Builds a little-endian ELF64 executable.
pub fn build_elf(entry: u64, sections: &[TestSection], segments: &[TestSegment]) -> Vec<u8> {
    ElfBuilder::LITTLE_64.build(entry, sections, segments)
}

/// `ElfBuilder::firmware` as little-endian ELF64.
pub fn firmware_elf() -> Vec<u8> {
    ElfBuilder::LITTLE_64.firmware()
}
