//! Parsers for textual ELF tool reports.
//!
//! Three report grammars are understood:
//! - ELF header report: a line `Entry point address: 0x<hex>`.
//! - Section header report: lines `.<name> <size> <vma> <lma> <file-offset> ...`
//!   with all four numbers in hex, in exactly that order.
//! - Section content dump: `Contents of section .<name>:` markers, each followed
//!   by lines of the form ` <offset> <hex groups...> [ascii rendering]`.

use tracing::trace;

use crate::error::{ConvertError, Result};
use crate::section::{SectionInfo, SectionName, SectionTable};
use crate::utils::{decode_hex_token, is_hex_token, parse_hex_u64};

const ENTRY_LABEL: &str = "entry point address:";
const CONTENTS_MARKER: &str = "Contents of section ";

/// Extracts the entry point from an ELF header report.
pub fn parse_entry_point(report: &str) -> Result<u64> {
    for line in report.lines() {
        // ASCII lowercasing keeps byte offsets valid for `line`.
        let lower = line.to_ascii_lowercase();
        let Some(pos) = lower.find(ENTRY_LABEL) else {
            continue;
        };
        let value = line[pos + ENTRY_LABEL.len()..].trim();
        return value
            .strip_prefix("0x")
            .or_else(|| value.strip_prefix("0X"))
            .and_then(parse_hex_u64)
            .ok_or_else(|| {
                ConvertError::Format(format!("malformed entry point line: {:?}", line.trim()))
            });
    }
    Err(ConvertError::Format(
        "entry point address line not found".to_string(),
    ))
}

/// Extracts one section's header fields from a section header report.
///
/// Returns `Ok(None)` when the section is not listed. A listed section whose
/// four numeric fields are missing or not hex is a format error.
pub fn parse_section_header(report: &str, name: SectionName) -> Result<Option<SectionInfo>> {
    let wanted = name.elf_name();
    for line in report.lines() {
        let mut tokens = line.split_whitespace();
        if !tokens.by_ref().any(|t| t == wanted) {
            continue;
        }
        let fields: Vec<&str> = tokens.take(4).collect();
        let values: Option<Vec<u64>> = fields.iter().map(|t| parse_hex_u64(t)).collect();
        return match values.as_deref() {
            Some(&[size, vma, lma, file_offset]) => {
                Ok(Some(SectionInfo::new(name, size, vma, lma, file_offset)))
            }
            _ => Err(ConvertError::Format(format!(
                "malformed section header for {}: {:?}",
                name,
                line.trim()
            ))),
        };
    }
    Ok(None)
}

/// Parses the header of every known section present in the report.
pub fn parse_section_headers(report: &str) -> Result<SectionTable> {
    let mut table = SectionTable::new();
    for name in SectionName::ALL {
        if let Some(info) = parse_section_header(report, name)? {
            table.insert(info);
        }
    }
    Ok(table)
}

/// Decodes the bytes of `name` from a content dump.
///
/// Returns `Ok(None)` if the dump has no block for the section. Scanning stops
/// at the first marker for another section once the wanted block was entered.
pub fn find_section_contents(dump: &str, name: SectionName) -> Result<Option<Vec<u8>>> {
    let mut started = false;
    let mut content = Vec::new();

    for line in dump.lines() {
        if let Some(marker) = section_marker(line) {
            if marker == name.as_str() {
                started = true;
            } else if started {
                break;
            }
            continue;
        }
        if !started {
            continue;
        }
        let Some(tokens) = data_tokens(line) else {
            continue;
        };
        for token in tokens {
            if !is_hex_token(token) {
                trace!("{}: discarding non-hex token {:?}", name, token);
                continue;
            }
            decode_hex_token(token, &mut content)?;
        }
    }

    Ok(started.then_some(content))
}

/// Like `find_section_contents`, but a missing block decodes to no bytes.
pub fn decode_section_contents(dump: &str, name: SectionName) -> Result<Vec<u8>> {
    Ok(find_section_contents(dump, name)?.unwrap_or_default())
}

/// Section name (without the dot) named by a `Contents of section` line.
fn section_marker(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix(CONTENTS_MARKER)?;
    let rest = rest.trim_end().strip_suffix(':')?;
    rest.strip_prefix('.')
}

/// Tokens following the offset column of a dump data line.
fn data_tokens(line: &str) -> Option<std::str::SplitWhitespace<'_>> {
    if !line.starts_with(char::is_whitespace) {
        return None;
    }
    let mut tokens = line.split_whitespace();
    let offset = tokens.next()?;
    is_hex_token(offset).then_some(tokens)
}
