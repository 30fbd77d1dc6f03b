//! External-tool ELF inspector.
//!
//! Runs an ELF header reporter, a section header reporter and a section
//! content dumper as subprocesses and scrapes their output with the grammars
//! in `crate::report`. Which programs are run is configuration; only their
//! output format is relied on.

use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

use super::ElfInspector;
use crate::error::{ConvertError, Result};
use crate::report;
use crate::section::{SectionName, SectionTable};

/// A program plus its leading arguments. The input path is appended last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    /// Splits a command line such as `"objdump -h"` on whitespace.
    pub fn parse(command_line: &str) -> Result<Self> {
        let mut words = command_line.split_whitespace().map(str::to_string);
        let program = words.next().ok_or_else(|| ConvertError::Tool {
            tool: command_line.to_string(),
            message: "empty command".to_string(),
        })?;
        Ok(Self {
            program,
            args: words.collect(),
        })
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Runs the command on `input` and returns its standard output.
    fn run(&self, input: &Path) -> Result<String> {
        debug!("running {} {:?} {}", self.program, self.args, input.display());
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(input)
            .output()
            .map_err(|e| ConvertError::Tool {
                tool: self.program.clone(),
                message: format!("failed to run: {}", e),
            })?;
        if !output.status.success() {
            return Err(ConvertError::Tool {
                tool: self.program.clone(),
                message: format!(
                    "exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// The three reporting tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub elf_header: ToolCommand,
    pub section_headers: ToolCommand,
    pub section_contents: ToolCommand,
}

/// ELF inspector that holds captured tool reports.
pub struct ToolsInspector {
    elf_header: String,
    section_headers: String,
    section_contents: String,
}

impl ToolsInspector {
    /// Runs every tool in `toolchain` on `input`.
    pub fn run(toolchain: &Toolchain, input: &Path) -> Result<Self> {
        info!("Inspecting {} with external tools", input.display());
        Ok(Self::from_reports(
            toolchain.elf_header.run(input)?,
            toolchain.section_headers.run(input)?,
            toolchain.section_contents.run(input)?,
        ))
    }

    /// Wraps already captured reports.
    pub fn from_reports(
        elf_header: impl Into<String>,
        section_headers: impl Into<String>,
        section_contents: impl Into<String>,
    ) -> Self {
        Self {
            elf_header: elf_header.into(),
            section_headers: section_headers.into(),
            section_contents: section_contents.into(),
        }
    }
}

impl ElfInspector for ToolsInspector {
    fn entry_point(&self) -> Result<u64> {
        report::parse_entry_point(&self.elf_header)
    }

    fn section_headers(&self) -> Result<SectionTable> {
        report::parse_section_headers(&self.section_headers)
    }

    fn section_contents(&self, name: SectionName) -> Result<Option<Vec<u8>>> {
        if !name.has_file_content() {
            return Ok(None);
        }
        report::find_section_contents(&self.section_contents, name)
    }
}
