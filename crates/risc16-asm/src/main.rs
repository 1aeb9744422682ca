use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use risc16_rs::disasm;
use risc16_rs::{assemble_file, MemoryImage};

#[derive(Parser, Debug)]
#[command(author, version, about = "RISC16 assembler/disassembler CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Assemble a source file into a 128 KiB memory image
    Assemble {
        /// Input assembly file
        input: PathBuf,
        /// Output binary image
        output: PathBuf,
    },
    /// Disassemble a memory image
    Disassemble {
        /// Input binary image (at most 128 KiB; shorter files are zero-padded)
        input: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Write the listing to a file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Assemble { input, output } => {
            let img = assemble_file(&input)
                .with_context(|| format!("assembling {}", input.display()))?;
            fs::write(&output, img.as_bytes())
                .with_context(|| format!("writing {}", output.display()))?;
            println!("wrote {} bytes to {}", img.as_bytes().len(), output.display());
        }
        Command::Disassemble { input, format, out } => {
            let img = MemoryImage::load(&input)
                .with_context(|| format!("loading {}", input.display()))?;
            let listing = disasm::disassemble(&img);
            let rendered = match format {
                OutputFormat::Text => disasm::render_text(&listing),
                OutputFormat::Json => serde_json::to_string_pretty(&listing)?,
            };
            match out {
                Some(path) => {
                    fs::write(&path, &rendered)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("wrote {} bytes to {}", rendered.len(), path.display());
                }
                None => print!("{rendered}"),
            }
        }
    }
    Ok(())
}
