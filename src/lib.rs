//! ELF to v9 image converter library.
//!
//! This library provides the core components for the `v9img` tool.
//! It is organized into several modules:
//! - `config`: CLI configuration.
//! - `inspect`: Sources of ELF layout (native parser or external tools).
//! - `report`: Parsers for textual ELF tool reports.
//! - `converter`: The conversion orchestration.
//! - `image`: v9 header and image layout.
//! - `section`: Section data model.
//! - `writer`: Output file writing.

pub mod config;
pub mod converter;
pub mod error;
pub mod image;
pub mod inspect;
pub mod report;
pub mod section;
pub mod utils;
pub mod writer;
