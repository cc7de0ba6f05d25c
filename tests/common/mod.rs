//! Builders producing synthetic module images for integration tests.

#![allow(dead_code)]

use amxscope::metadata::{
    debug::DBG_MAGIC,
    header::{AmxFlags, AMX_MAGIC, HEADER_SIZE},
};

const DEFSIZE: usize = 8;

/// Assembles a minimal but fully valid module image around a sequence of code cells.
pub struct ModuleBuilder {
    code: Vec<u32>,
    publics: Vec<(u32, String)>,
    natives: Vec<String>,
    compact: bool,
    debug_block: Option<Vec<u8>>,
    name: String,
}

impl ModuleBuilder {
    pub fn new(code: &[u32]) -> ModuleBuilder {
        ModuleBuilder {
            code: code.to_vec(),
            publics: Vec::new(),
            natives: Vec::new(),
            compact: false,
            debug_block: None,
            name: "test".to_string(),
        }
    }

    pub fn public(mut self, address: u32, name: &str) -> ModuleBuilder {
        self.publics.push((address, name.to_string()));
        self
    }

    pub fn native(mut self, name: &str) -> ModuleBuilder {
        self.natives.push(name.to_string());
        self
    }

    pub fn compact(mut self) -> ModuleBuilder {
        self.compact = true;
        self
    }

    pub fn debug_block(mut self, block: Vec<u8>) -> ModuleBuilder {
        self.debug_block = Some(block);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let publics_ofs = HEADER_SIZE;
        let natives_ofs = publics_ofs + DEFSIZE * self.publics.len();
        let libraries_ofs = natives_ofs + DEFSIZE * self.natives.len();
        let names_ofs = libraries_ofs;

        // Lay out the name strings after the stub tables, then align the code start.
        let mut names = Vec::new();
        let mut public_stubs = Vec::new();
        for (address, name) in &self.publics {
            public_stubs.push((*address, (names_ofs + names.len()) as u32));
            names.extend_from_slice(name.as_bytes());
            names.push(0);
        }
        let mut native_stubs = Vec::new();
        for name in &self.natives {
            native_stubs.push((0u32, (names_ofs + names.len()) as u32));
            names.extend_from_slice(name.as_bytes());
            names.push(0);
        }
        let cod = (names_ofs + names.len() + 3) & !3;
        let dat = cod + self.code.len() * 4;
        let hea = dat;
        let stp = hea + 0x1000;

        let code_bytes = if self.compact {
            compact_encode(&self.code)
        } else {
            self.code.iter().flat_map(|c| c.to_le_bytes()).collect()
        };
        let size = cod + code_bytes.len();

        let mut flags = AmxFlags::empty();
        if self.compact {
            flags |= AmxFlags::COMPACT;
        }
        if self.debug_block.is_some() {
            flags |= AmxFlags::DEBUG;
        }

        let mut data = vec![0u8; HEADER_SIZE];
        data[0x00..0x04].copy_from_slice(&(size as u32).to_le_bytes());
        data[0x04..0x06].copy_from_slice(&AMX_MAGIC.to_le_bytes());
        data[0x06] = 8; // file_version
        data[0x07] = 8; // amx_version
        data[0x08..0x0A].copy_from_slice(&flags.bits().to_le_bytes());
        data[0x0A..0x0C].copy_from_slice(&(DEFSIZE as u16).to_le_bytes());
        data[0x0C..0x10].copy_from_slice(&(cod as u32).to_le_bytes());
        data[0x10..0x14].copy_from_slice(&(dat as u32).to_le_bytes());
        data[0x14..0x18].copy_from_slice(&(hea as u32).to_le_bytes());
        data[0x18..0x1C].copy_from_slice(&(stp as u32).to_le_bytes());
        data[0x20..0x24].copy_from_slice(&(publics_ofs as u32).to_le_bytes());
        data[0x24..0x28].copy_from_slice(&(natives_ofs as u32).to_le_bytes());
        data[0x28..0x2C].copy_from_slice(&(libraries_ofs as u32).to_le_bytes());
        data[0x2C..0x30].copy_from_slice(&(libraries_ofs as u32).to_le_bytes()); // pubvars
        data[0x30..0x34].copy_from_slice(&(names_ofs as u32).to_le_bytes()); // tags
        data[0x34..0x38].copy_from_slice(&(names_ofs as u32).to_le_bytes()); // nametable
        let name_bytes = self.name.as_bytes();
        data[0x38..0x38 + name_bytes.len()].copy_from_slice(name_bytes);

        for (address, nameofs) in public_stubs.iter().chain(&native_stubs) {
            data.extend_from_slice(&address.to_le_bytes());
            data.extend_from_slice(&nameofs.to_le_bytes());
        }
        data.extend_from_slice(&names);
        data.resize(cod, 0);
        data.extend_from_slice(&code_bytes);
        if let Some(block) = self.debug_block {
            data.extend_from_slice(&block);
        }
        data
    }
}

/// Builds a raw debug block in the appended-block wire format.
pub struct DebugBlockBuilder {
    files: Vec<(u32, String)>,
    lines: Vec<(u32, u32)>,
    symbols: Vec<(u32, String)>,
}

impl DebugBlockBuilder {
    pub fn new() -> DebugBlockBuilder {
        DebugBlockBuilder {
            files: Vec::new(),
            lines: Vec::new(),
            symbols: Vec::new(),
        }
    }

    pub fn file(mut self, line: u32, path: &str) -> DebugBlockBuilder {
        self.files.push((line, path.to_string()));
        self
    }

    pub fn line(mut self, address: u32, line: u32) -> DebugBlockBuilder {
        self.lines.push((address, line));
        self
    }

    pub fn symbol(mut self, address: u32, name: &str) -> DebugBlockBuilder {
        self.symbols.push((address, name.to_string()));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&DBG_MAGIC.to_le_bytes());
        data.push(8); // file_version
        data.push(0); // flags
        data.extend_from_slice(&(self.files.len() as u16).to_le_bytes());
        data.extend_from_slice(&(self.lines.len() as u16).to_le_bytes());
        data.extend_from_slice(&(self.symbols.len() as u16).to_le_bytes());
        for (line, path) in &self.files {
            data.extend_from_slice(&line.to_le_bytes());
            data.extend_from_slice(path.as_bytes());
            data.push(0);
        }
        for (address, line) in &self.lines {
            data.extend_from_slice(&address.to_le_bytes());
            data.extend_from_slice(&line.to_le_bytes());
        }
        for (address, name) in &self.symbols {
            data.extend_from_slice(&address.to_le_bytes());
            data.extend_from_slice(name.as_bytes());
            data.push(0);
        }
        data
    }
}

/// Encodes cells into the variable-length compact form, most significant group first.
pub fn compact_encode(cells: &[u32]) -> Vec<u8> {
    let mut out = Vec::new();
    for &cell in cells {
        let mut v = cell as i32;
        let mut groups = Vec::new();
        loop {
            let byte = (v & 0x7f) as u8;
            v >>= 7;
            groups.push(byte);
            if (v == 0 && byte & 0x40 == 0) || (v == -1 && byte & 0x40 != 0) {
                break;
            }
        }
        for (i, byte) in groups.iter().rev().enumerate() {
            if i + 1 == groups.len() {
                out.push(*byte);
            } else {
                out.push(*byte | 0x80);
            }
        }
    }
    out
}

/// Disassembles an in-memory image and returns the full listing text.
pub fn listing_for(image: Vec<u8>) -> String {
    let module = amxscope::AmxModule::from_mem(image).unwrap();
    let mut out = Vec::new();
    amxscope::Disassembler::new(&module, &mut out).run().unwrap();
    String::from_utf8(out).unwrap()
}

/// Instruction lines of a listing, with the banner and blank lines stripped.
pub fn instruction_lines(listing: &str) -> Vec<String> {
    listing
        .lines()
        .filter(|line| !line.is_empty() && !line.starts_with(';'))
        .map(String::from)
        .collect()
}
