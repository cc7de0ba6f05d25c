//! Function stub tables and name resolution for listing annotations.
//!
//! The tables between the header and the code segment hold fixed-size stub records, one
//! per public function, native function, and library. Each record pairs an address (or an
//! ordinal, for natives) with the file offset of a NUL-terminated name. Resolution is
//! best-effort: a record that points outside the file simply yields no annotation.

use crate::metadata::{header::MAX_NAME, module::AmxModule};

/// A single stub record from the public, native, or library table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuncStub {
    /// Code address for publics; unused for natives, which are resolved by table index.
    pub address: u32,
    /// File offset of the NUL-terminated name.
    pub nameofs: u32,
}

/// Resolves code addresses and native ordinals to function names.
///
/// Debug symbols take precedence over the public table, since they also cover
/// non-public functions.
pub struct SymbolResolver<'a> {
    module: &'a AmxModule,
}

impl<'a> SymbolResolver<'a> {
    pub fn new(module: &'a AmxModule) -> SymbolResolver<'a> {
        SymbolResolver { module }
    }

    /// Name of the function starting at code address `address`, if one is known.
    #[must_use]
    pub fn name_for_address(&self, address: u32) -> Option<String> {
        if let Some(debug) = self.module.debug_info() {
            if let Some(name) = debug.lookup_function(address) {
                return Some(name.to_string());
            }
        }

        let header = self.module.header();
        for index in 0..header.num_publics() {
            let stub = self.stub_at(header.publics, index)?;
            if stub.address == address {
                return self.read_name(stub.nameofs);
            }
        }
        None
    }

    /// Name of the native function with table ordinal `index`.
    #[must_use]
    pub fn name_for_native_index(&self, index: usize) -> Option<String> {
        let header = self.module.header();
        if index >= header.num_natives() {
            return None;
        }
        let stub = self.stub_at(header.natives, index)?;
        self.read_name(stub.nameofs)
    }

    fn stub_at(&self, table: u32, index: usize) -> Option<FuncStub> {
        let header = self.module.header();
        let offset = (table as usize).checked_add(index * usize::from(header.defsize))?;
        let data = self.module.file().data();
        let record = data.get(offset..offset.checked_add(8)?)?;
        Some(FuncStub {
            address: u32::from_le_bytes([record[0], record[1], record[2], record[3]]),
            nameofs: u32::from_le_bytes([record[4], record[5], record[6], record[7]]),
        })
    }

    // Bounded read of a NUL-terminated name; never trusts a terminator to exist.
    fn read_name(&self, nameofs: u32) -> Option<String> {
        let data = self.module.file().data();
        let start = nameofs as usize;
        if start >= data.len() {
            return None;
        }
        let end = start.checked_add(MAX_NAME)?.min(data.len());
        let bytes = &data[start..end];
        let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        if len == 0 {
            return None;
        }
        Some(String::from_utf8_lossy(&bytes[..len]).into_owned())
    }
}
