//! BYML CLI tool for converting between binary documents and YAML.

use anyhow::{Context, Result};
use byml::{from_yaml, to_yaml_with_config, EmitterConfig, Endian};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Parser)]
#[command(name = "byml")]
#[command(about = "BYML binary documents and their YAML form", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render a binary document (either byte order) as YAML
    ToYaml(ToYaml),
    /// Build a binary document from the first YAML document of a file
    ToBinary(ToBinary),
}

/// Render a binary document as YAML
#[derive(Debug, Parser)]
struct ToYaml {
    /// Binary document to read
    input: PathBuf,

    /// Output file path (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Use block form for every container
    #[arg(long)]
    indented: bool,

    /// Spaces per nesting level in block form
    #[arg(long, default_value = "2")]
    indent_width: usize,
}

/// Build a binary document from YAML
#[derive(Debug, Parser)]
struct ToBinary {
    /// YAML file to read
    input: PathBuf,

    /// Output file path (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write big endian (`BY`) instead of little endian (`YB`)
    #[arg(long)]
    big_endian: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::ToYaml(args) => {
            let data = std::fs::read(&args.input)
                .with_context(|| format!("Failed to read {}", args.input.display()))?;
            let config = EmitterConfig::default()
                .with_indented(args.indented)
                .with_indent_width(args.indent_width);
            let text = to_yaml_with_config(&data, config)
                .with_context(|| format!("Failed to render {}", args.input.display()))?;
            write_output(args.output.as_deref(), text.as_bytes())
        }
        Command::ToBinary(args) => {
            let text = std::fs::read_to_string(&args.input)
                .with_context(|| format!("Failed to read {}", args.input.display()))?;
            let value = from_yaml(&text)
                .with_context(|| format!("Failed to parse {}", args.input.display()))?;
            let endian = if args.big_endian {
                Endian::Big
            } else {
                Endian::Little
            };
            let bytes = value
                .to_binary(endian)
                .context("Failed to encode document")?;
            write_output(args.output.as_deref(), &bytes)
        }
    }
}

fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("✓ Wrote {} bytes to {}", bytes.len(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes).context("Failed to write to stdout")?;
            stdout.flush()?;
        }
    }
    Ok(())
}
