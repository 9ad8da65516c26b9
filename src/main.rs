mod px86;

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use px86::arch::{MEMORY_SIZE, ORIGIN};
use px86::{Emulator, EmulatorConfig, exec, loader};

#[derive(Parser, Debug)]
#[command(name = "px86")]
#[command(about = "Run a flat 32-bit x86 binary loaded at a boot-sector origin")]
struct Args {
    /// Flat binary image to execute
    file: PathBuf,

    /// Do not print EIP and opcode before each instruction
    #[arg(short, long)]
    quiet: bool,

    /// Load address; also the initial EIP and ESP
    #[arg(long, default_value_t = ORIGIN, value_parser = parse_u32)]
    origin: u32,

    /// Size of the memory image in bytes
    #[arg(long, default_value_t = MEMORY_SIZE, value_parser = parse_usize)]
    memory: usize,
}

/// Accepts decimal or `0x`-prefixed hex.
fn parse_u32(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid number '{s}': {e}"))
}

fn parse_usize(s: &str) -> Result<usize, String> {
    parse_u32(s).map(|v| v as usize)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let config = EmulatorConfig { memory_size: args.memory, origin: args.origin };
    let mut emu = Emulator::with_stdio(&config);

    let len = loader::load_file(&mut emu.mem, config.origin, &args.file)
        .with_context(|| format!("cannot load {}", args.file.display()))?;
    info!(len, origin = config.origin, "image loaded");

    let mut stdout = std::io::stdout();
    let trace: Option<&mut dyn Write> = if args.quiet { None } else { Some(&mut stdout) };

    // A fault is reported on stderr whatever RUST_LOG says
    match exec::run(&mut emu, trace) {
        Ok(exit) => info!(?exit, "stopped"),
        Err(e) => eprintln!("{e}"),
    }

    print!("{}", emu.cpu);
    Ok(())
}
