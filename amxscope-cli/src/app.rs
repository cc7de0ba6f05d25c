use std::path::PathBuf;

use clap::Parser;

/// amxdasm - disassemble a compiled AMX-style bytecode module into a text listing
#[derive(Debug, Parser)]
#[command(name = "amxdasm", version, about, long_about = None)]
pub struct Cli {
    /// Path to the compiled module file.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Path of the listing to write; defaults to the input with a `.lst` extension.
    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long)]
    pub verbose: bool,
}
