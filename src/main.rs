//! Entry point for the v9img converter.
//!
//! This file handles high-level application flow:
//! 1. Parse command-line arguments using `clap`.
//! 2. Set up logging with `tracing-subscriber`.
//! 3. Pick an ELF inspector (native parser or external tools).
//! 4. Execute the conversion steps: extract, decode, build, write.
//!
//! Error handling is done via `anyhow`.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use v9img::config::{Config, InspectorKind};
use v9img::converter::Converter;
use v9img::inspect::native::{map_file, NativeInspector};
use v9img::inspect::tools::ToolsInspector;
use v9img::inspect::ElfInspector;

fn main() -> Result<()> {
    let config = Config::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match config.inspector {
        InspectorKind::Native => {
            let mmap = map_file(&config.input)?;
            let inspector = NativeInspector::parse(&mmap)
                .with_context(|| format!("failed to parse {}", config.input.display()))?;
            convert(inspector, &config)
        }
        InspectorKind::Tools => {
            let toolchain = config.toolchain()?;
            let inspector = ToolsInspector::run(&toolchain, &config.input)?;
            convert(inspector, &config)
        }
    }
}

fn convert<I: ElfInspector>(inspector: I, config: &Config) -> Result<()> {
    let mut converter = Converter::new(inspector);

    // 1. Entry point and section headers
    converter
        .extract()
        .with_context(|| format!("failed to read layout of {}", config.input.display()))?;

    // 2. Section bytes
    converter.decode().context("failed to decode section contents")?;

    // 3. Lay out the image
    converter.build().context("failed to build image")?;

    // 4. Write it out
    converter.write(&config.output)?;

    println!("Converted {} to {}", config.input.display(), config.output.display());
    Ok(())
}
