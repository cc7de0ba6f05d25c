//! Interleaving of original source lines into the listing.
//!
//! Driven by the debug line table: whenever the mapped source line changes between
//! instructions, a line header is emitted, followed by the literal source text covering
//! every line since the previous header. The file table partitions the global line numbers;
//! a span that crosses into the next file record emits a fresh file header and continues
//! with that file's text. Source files are loaded lazily from the paths recorded in the
//! debug block; an unreadable file degrades to line headers without text.

use std::{fs, io::Write};

use crate::{metadata::debug::DebugInfo, Result};

pub(crate) struct SourceInterleaver<'a> {
    debug: Option<&'a DebugInfo>,
    prev_line: u32,
    current_path: Option<String>,
    // First global line number the loaded file covers; text lookups are relative to it.
    file_start_line: u32,
    lines: Option<Vec<String>>,
}

impl<'a> SourceInterleaver<'a> {
    pub(crate) fn new(debug: Option<&'a DebugInfo>) -> SourceInterleaver<'a> {
        SourceInterleaver {
            debug,
            prev_line: 0,
            current_path: None,
            file_start_line: 0,
            lines: None,
        }
    }

    /// Emit line/file headers and source text for the instruction at `address`, when the
    /// mapped source line has changed since the last emission.
    pub(crate) fn emit<W: Write>(&mut self, out: &mut W, address: u32) -> Result<()> {
        let Some(debug) = self.debug else {
            return Ok(());
        };
        let Some(line) = debug.line_for_address(address) else {
            return Ok(());
        };
        if line == self.prev_line {
            return Ok(());
        }

        writeln!(out)?;
        writeln!(out, ";       Line {line}:")?;

        let first = if self.prev_line != 0 && line > self.prev_line {
            self.prev_line + 1
        } else {
            line
        };
        if let Some(record) = debug.file_for_line(first) {
            if self.current_path.as_deref() != Some(record.path.as_str()) {
                self.switch_file(out, &record.path, record.line)?;
            }
        }
        for number in first..=line {
            // A file record opening exactly at this line starts a new source file mid-span.
            if let Some(path) = debug.source_file_for_line(number) {
                if self.current_path.as_deref() != Some(path) || self.file_start_line != number
                {
                    self.switch_file(out, path, number)?;
                }
            }
            let Some(lines) = &self.lines else {
                continue;
            };
            let Some(local) = number.checked_sub(self.file_start_line) else {
                continue;
            };
            if let Some(text) = lines.get(local as usize) {
                writeln!(out, ";{number} {text}")?;
            }
        }

        self.prev_line = line;
        Ok(())
    }

    // One load attempt per switch; a read failure leaves only the headers.
    fn switch_file<W: Write>(&mut self, out: &mut W, path: &str, start_line: u32) -> Result<()> {
        writeln!(out, ";       File \"{path}\"")?;
        self.lines = fs::read_to_string(path)
            .ok()
            .map(|text| text.lines().map(String::from).collect());
        self.current_path = Some(path.to_string());
        self.file_start_line = start_line;
        Ok(())
    }
}
