//! A disassembler library for compiled AMX-style bytecode modules.
//!
//! Loads a module container, validates its header, expands the compact cell encoding when
//! present, and streams a human-readable listing annotated with public, native, and debug
//! symbol names and, where debug information allows, interleaved source lines.
//!
//! # Examples
//!
//! ```no_run
//! use amxscope::{AmxModule, Disassembler};
//!
//! let module = AmxModule::from_file("plugin.amx".as_ref())?;
//! let stdout = std::io::stdout();
//! Disassembler::new(&module, stdout.lock()).run()?;
//! # Ok::<(), amxscope::Error>(())
//! ```

#[macro_use]
mod error;

pub mod disassembler;
pub mod file;
pub mod metadata;

pub use error::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// A machine word of the module's virtual machine.
pub type Cell = u32;

/// Byte width of one [`Cell`].
pub const CELL_SIZE: usize = 4;

pub use disassembler::Disassembler;
pub use file::{parser::Parser, File};
pub use metadata::module::AmxModule;
