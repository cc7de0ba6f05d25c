//! Parsing of the optional debug block appended after the stored module image.
//!
//! When the header carries the debug flag, a self-contained block follows the image with
//! its own magic, listing the source files, the address-to-line mapping, and named code
//! addresses. The block is purely informational; any parse failure downgrades the listing
//! to address-only output instead of failing the load.

use crate::{file::parser::Parser, Result};

/// Magic identifier of the appended debug block.
pub const DBG_MAGIC: u16 = 0xF1EF;

/// A source file entry; `line` is the first line the file contributes to.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord {
    pub line: u32,
    pub path: String,
}

/// Maps a code address to the source line it was compiled from.
#[derive(Debug, Clone, Copy)]
pub struct LineRecord {
    pub address: u32,
    pub line: u32,
}

/// A named code address, typically a function entry point.
#[derive(Debug, Clone)]
pub struct SymbolRecord {
    pub address: u32,
    pub name: String,
}

/// The decoded debug block.
#[derive(Debug, Clone, Default)]
pub struct DebugInfo {
    pub files: Vec<FileRecord>,
    pub lines: Vec<LineRecord>,
    pub symbols: Vec<SymbolRecord>,
}

impl DebugInfo {
    /// Parse a debug block from `data`, which must start at the block magic.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] when the magic does not match and
    /// [`crate::Error::OutOfBounds`] when a record is truncated.
    pub fn parse(data: &[u8]) -> Result<DebugInfo> {
        let mut parser = Parser::new(data);

        let magic = parser.read_le::<u16>()?;
        if magic != DBG_MAGIC {
            return Err(malformed_error!("Invalid debug block magic: {:#06x}", magic));
        }
        let _file_version = parser.read_le::<u8>()?;
        let _flags = parser.read_le::<u8>()?;
        let num_files = parser.read_le::<u16>()? as usize;
        let num_lines = parser.read_le::<u16>()? as usize;
        let num_symbols = parser.read_le::<u16>()? as usize;

        let mut files = Vec::with_capacity(num_files);
        for _ in 0..num_files {
            let line = parser.read_le::<u32>()?;
            let path = parser.read_string_utf8()?;
            files.push(FileRecord { line, path });
        }

        let mut lines = Vec::with_capacity(num_lines);
        for _ in 0..num_lines {
            let address = parser.read_le::<u32>()?;
            let line = parser.read_le::<u32>()?;
            lines.push(LineRecord { address, line });
        }
        // The line table is address-ordered in well-formed blocks; enforce it so the
        // lookups below can rely on it.
        if lines.windows(2).any(|w| w[0].address > w[1].address) {
            return Err(malformed_error!("Debug line table not sorted by address"));
        }

        let mut symbols = Vec::with_capacity(num_symbols);
        for _ in 0..num_symbols {
            let address = parser.read_le::<u32>()?;
            let name = parser.read_string_utf8()?;
            symbols.push(SymbolRecord { address, name });
        }

        Ok(DebugInfo { files, lines, symbols })
    }

    /// Name of the symbol starting exactly at `address`, if any.
    #[must_use]
    pub fn lookup_function(&self, address: u32) -> Option<&str> {
        self.symbols
            .iter()
            .find(|sym| sym.address == address)
            .map(|sym| sym.name.as_str())
    }

    /// Source line the instruction at `address` was compiled from.
    #[must_use]
    pub fn line_for_address(&self, address: u32) -> Option<u32> {
        self.lines
            .iter()
            .take_while(|rec| rec.address <= address)
            .last()
            .map(|rec| rec.line)
    }

    /// The file record covering `line`.
    #[must_use]
    pub fn file_for_line(&self, line: u32) -> Option<&FileRecord> {
        self.files.iter().filter(|rec| rec.line <= line).last()
    }

    /// Path of the source file that contains `line`.
    #[must_use]
    pub fn file_name_for_line(&self, line: u32) -> Option<&str> {
        self.file_for_line(line).map(|rec| rec.path.as_str())
    }

    /// Path of the source file whose first line is exactly `line`, marking a file switch.
    #[must_use]
    pub fn source_file_for_line(&self, line: u32) -> Option<&str> {
        self.files
            .iter()
            .find(|rec| rec.line == line)
            .map(|rec| rec.path.as_str())
    }
}
