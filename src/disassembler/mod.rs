//! Instruction decoding and listing output.

pub mod decoder;
pub mod opcodes;
mod source;

pub use decoder::Disassembler;
pub use opcodes::{lookup, Opcode, OpcodeKind, OPCODES};
