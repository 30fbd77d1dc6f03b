//! Configuration module.
//!
//! This module defines the command-line interface (CLI) for the converter using `clap`.
//! It handles the input ELF path, the output image path, and how the ELF is inspected.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::error::Result;
use crate::inspect::tools::{ToolCommand, Toolchain};

/// Where section layout and contents are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InspectorKind {
    /// Parse the ELF file directly
    Native,
    /// Scrape the output of external ELF reporting tools
    Tools,
}

/// Convert an ELF executable into a flat v9 firmware image.
///
/// Sections `.text`, `.rodata` and `.data` are placed at their virtual addresses
/// in a zero-filled buffer, `.bss` is reserved, and a 16-byte header carrying the
/// entry point and data offset is written at the start.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Input ELF executable
    pub input: PathBuf,

    /// Output image
    pub output: PathBuf,

    /// How to read the ELF file
    #[arg(long, value_enum, default_value_t = InspectorKind::Native)]
    pub inspector: InspectorKind,

    /// ELF header reporter (tools inspector)
    #[arg(long, default_value = "readelf -h")]
    pub readelf: String,

    /// Section header reporter (tools inspector)
    #[arg(long, default_value = "objdump -h")]
    pub objdump: String,

    /// Section content dumper (tools inspector)
    #[arg(long, default_value = "llvm-objdump -s")]
    pub content_dump: String,

    /// Target architecture passed to the content dumper as `-arch=<ARCH>`
    #[arg(long)]
    pub tool_arch: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", help = "Set the logging level")]
    pub log_level: String,
}

impl Config {
    /// The external tools to run when `--inspector tools` is selected.
    pub fn toolchain(&self) -> Result<Toolchain> {
        let mut section_contents = ToolCommand::parse(&self.content_dump)?;
        if let Some(arch) = &self.tool_arch {
            section_contents = section_contents.arg(format!("-arch={}", arch));
        }
        Ok(Toolchain {
            elf_header: ToolCommand::parse(&self.readelf)?,
            section_headers: ToolCommand::parse(&self.objdump)?,
            section_contents,
        })
    }
}
