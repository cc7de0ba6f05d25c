//! The instruction decoder and listing emitter.
//!
//! A single forward walk over the expanded code segment. Each step reads the opcode cell,
//! dispatches on its catalog entry, renders one listing line (plus continuation lines for
//! case tables), and advances by the instruction's width. Nothing is retained between
//! steps; output is flushed as it is produced.

use std::io::Write;

use crate::{
    disassembler::{
        opcodes::{self, OpcodeKind},
        source::SourceInterleaver,
    },
    file::parser::Parser,
    metadata::{module::AmxModule, stubs::SymbolResolver},
    Cell, Result,
};

/// Number of raw cells an unrecognized opcode consumes, including the opcode cell itself.
const UNKNOWN_FALLBACK_CELLS: usize = 4;

/// Streams a disassembly listing for one module into a writer.
///
/// # Examples
/// ```no_run
/// use amxscope::{AmxModule, Disassembler};
///
/// let module = AmxModule::from_file("plugin.amx".as_ref())?;
/// Disassembler::new(&module, std::io::stdout().lock()).run()?;
/// # Ok::<(), amxscope::Error>(())
/// ```
pub struct Disassembler<'a, W: Write> {
    module: &'a AmxModule,
    resolver: SymbolResolver<'a>,
    out: W,
}

impl<'a, W: Write> Disassembler<'a, W> {
    pub fn new(module: &'a AmxModule, out: W) -> Disassembler<'a, W> {
        Disassembler {
            module,
            resolver: SymbolResolver::new(module),
            out,
        }
    }

    /// Write the complete listing.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] when an instruction is truncated by the segment
    /// end and [`crate::Error::FileError`] when the writer fails. Lines already written
    /// stay written.
    pub fn run(mut self) -> Result<()> {
        self.banner()?;

        let code = self.module.code();
        if code.is_empty() {
            writeln!(self.out, "Empty code block")?;
            return Ok(());
        }

        let mut source = SourceInterleaver::new(self.module.debug_info());
        let mut parser = Parser::new(code);
        while parser.has_more_data() {
            let address = parser.pos() as u32;
            source.emit(&mut self.out, address)?;

            let opcode = read_cell(&mut parser, address)?;
            match opcodes::lookup(opcode) {
                Some(entry) => {
                    write!(self.out, "{:08x}  {}", address, entry.mnemonic)?;
                    match entry.kind {
                        OpcodeKind::Parm(arity) => {
                            for _ in 0..arity {
                                let operand = read_cell(&mut parser, address)?;
                                write!(self.out, " {operand:08x}")?;
                            }
                        }
                        OpcodeKind::Proc => {
                            if let Some(name) = self.resolver.name_for_address(address) {
                                write!(self.out, "\t; {name}")?;
                            }
                        }
                        OpcodeKind::Call => {
                            let target = read_cell(&mut parser, address)?;
                            write!(self.out, " {target:08x}")?;
                            if let Some(name) = self.resolver.name_for_address(target) {
                                write!(self.out, "\t; {name}")?;
                            }
                        }
                        OpcodeKind::Jump => {
                            let target = read_cell(&mut parser, address)?;
                            write!(self.out, " {target:08x}")?;
                        }
                        OpcodeKind::SysReq => {
                            let index = read_cell(&mut parser, address)?;
                            write!(self.out, " {index:08x}")?;
                            if let Some(name) =
                                self.resolver.name_for_native_index(index as usize)
                            {
                                write!(self.out, "\t; {name}")?;
                            }
                        }
                        OpcodeKind::CaseTbl => {
                            let count = read_cell(&mut parser, address)?;
                            let default = read_cell(&mut parser, address)?;
                            writeln!(self.out, " {count:08x} {default:08x}")?;
                            for _ in 0..count {
                                let value = read_cell(&mut parser, address)?;
                                let target = read_cell(&mut parser, address)?;
                                write!(
                                    self.out,
                                    "                  {value:08x} {target:08x}"
                                )?;
                                writeln!(self.out)?;
                            }
                            continue;
                        }
                    }
                    writeln!(self.out)?;
                }
                None => {
                    // Render the raw cells and resynchronize a fixed distance ahead.
                    write!(self.out, "{address:08x}  ???")?;
                    write!(self.out, " {opcode:08x}")?;
                    let extra = (parser.remaining() / crate::CELL_SIZE)
                        .min(UNKNOWN_FALLBACK_CELLS - 1);
                    for _ in 0..extra {
                        let cell = read_cell(&mut parser, address)?;
                        write!(self.out, " {cell:08x}")?;
                    }
                    writeln!(self.out)?;
                }
            }
        }
        writeln!(self.out)?;
        Ok(())
    }

    fn banner(&mut self) -> Result<()> {
        let header = self.module.header();
        writeln!(self.out, ";File version:    {}", header.file_version)?;
        writeln!(self.out, ";Flags:           {}", header.flags.describe())?;
        writeln!(self.out, ";Definition size: {}", header.defsize)?;
        writeln!(self.out, ";Code size:       {}", header.code_size())?;
        writeln!(self.out, ";Data size:       {}", header.data_size())?;
        writeln!(self.out, ";Stack size:      {}", header.stack_size())?;
        writeln!(self.out, ";Publics:         {}", header.num_publics())?;
        writeln!(self.out, ";Natives:         {}", header.num_natives())?;
        writeln!(self.out, ";Libraries:       {}", header.num_libraries())?;
        writeln!(self.out, ";Module name:     {}", header.name)?;
        writeln!(self.out)?;
        Ok(())
    }
}

// A short operand read past the segment end means a corrupt module, not an I/O problem.
fn read_cell(parser: &mut Parser<'_>, address: u32) -> Result<Cell> {
    parser
        .read_le::<Cell>()
        .map_err(|_| malformed_error!("Truncated instruction at {:08x}", address))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::header::{AMX_MAGIC, HEADER_SIZE},
        CELL_SIZE,
    };

    fn module_with_code(code: &[u32]) -> AmxModule {
        let cod = HEADER_SIZE as u32;
        let dat = cod + (code.len() * CELL_SIZE) as u32;
        let mut data = vec![0u8; HEADER_SIZE];
        for cell in code {
            data.extend_from_slice(&cell.to_le_bytes());
        }
        let size = data.len() as u32;
        data[0x00..0x04].copy_from_slice(&size.to_le_bytes());
        data[0x04..0x06].copy_from_slice(&AMX_MAGIC.to_le_bytes());
        data[0x06] = 8;
        data[0x07] = 8;
        data[0x0A..0x0C].copy_from_slice(&8u16.to_le_bytes());
        data[0x0C..0x10].copy_from_slice(&cod.to_le_bytes());
        data[0x10..0x14].copy_from_slice(&dat.to_le_bytes());
        data[0x14..0x18].copy_from_slice(&dat.to_le_bytes());
        data[0x18..0x1C].copy_from_slice(&(dat + 0x1000).to_le_bytes());
        for field in [0x20, 0x24, 0x28, 0x2C, 0x30, 0x34] {
            data[field..field + 4].copy_from_slice(&cod.to_le_bytes());
        }
        AmxModule::from_mem(data).unwrap()
    }

    fn listing(code: &[u32]) -> Vec<String> {
        let module = module_with_code(code);
        let mut out = Vec::new();
        Disassembler::new(&module, &mut out).run().unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .skip_while(|line| line.starts_with(';') || line.is_empty())
            .take_while(|line| !line.is_empty())
            .map(String::from)
            .collect()
    }

    #[test]
    fn const_and_return() {
        assert_eq!(
            listing(&[11, 5, 48]),
            ["00000000  const.pri 00000005", "00000008  retn"]
        );
    }

    #[test]
    fn case_table_continuation_lines() {
        // casetbl with two cases: count, default, then (value, target) pairs.
        let lines = listing(&[130, 2, 0x30, 1, 0x10, 2, 0x20, 48]);
        assert_eq!(
            lines,
            [
                "00000000  casetbl 00000002 00000030",
                "                  00000001 00000010",
                "                  00000002 00000020",
                "0000001c  retn",
            ]
        );
    }

    #[test]
    fn unknown_opcode_renders_raw_cells() {
        let lines = listing(&[200, 1, 2, 3, 48]);
        assert_eq!(
            lines,
            [
                "00000000  ??? 000000c8 00000001 00000002 00000003",
                "00000010  retn",
            ]
        );
    }

    #[test]
    fn unknown_opcode_clamped_at_segment_end() {
        let lines = listing(&[48, 200, 7]);
        assert_eq!(
            lines,
            ["00000000  retn", "00000004  ??? 000000c8 00000007"]
        );
    }

    #[test]
    fn truncated_operand_is_fatal() {
        let module = module_with_code(&[11]);
        let mut out = Vec::new();
        let err = Disassembler::new(&module, &mut out).run().unwrap_err();
        assert!(matches!(err, crate::Error::Malformed { .. }));
    }

    #[test]
    fn empty_code_block() {
        let module = module_with_code(&[]);
        let mut out = Vec::new();
        Disassembler::new(&module, &mut out).run().unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("Empty code block\n"));
    }
}
