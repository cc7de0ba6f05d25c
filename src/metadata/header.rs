//! Fixed-layout module header parsing.
//!
//! Every compiled module starts with an 80-byte header that locates the code and data
//! segments, the function stub tables, and carries the flag word governing how the rest of
//! the container must be interpreted (compact encoding, appended debug block). All
//! multi-byte fields are stored little-endian and normalized on read; downstream components
//! only ever see host-order values.

use bitflags::bitflags;

use crate::{file::parser::Parser, Result};

/// Magic identifier of a compiled module, first two bytes after the size field.
pub const AMX_MAGIC: u16 = 0xF1E0;

/// Byte size of the fixed module header, including the embedded name field.
pub const HEADER_SIZE: usize = 0x50;

/// Maximum byte length of a function or symbol name.
///
/// Name reads from the file never exceed this bound and never assume a NUL terminator
/// exists within it.
pub const MAX_NAME: usize = 63;

bitflags! {
    /// Header flag word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AmxFlags: u16 {
        /// Runtime bounds/validity checks were compiled out.
        const NOCHECKS = 0x01;
        /// A debug block is appended after the module image.
        const DEBUG = 0x02;
        /// Code and data are stored in the variable-length compact encoding.
        const COMPACT = 0x04;
        /// Native functions may be registered without verification.
        const NTVREG = 0x08;
    }
}

impl AmxFlags {
    /// Space-separated list of set flag names, as printed in the listing banner.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut names = Vec::new();
        if self.contains(AmxFlags::COMPACT) {
            names.push("compact-encoding");
        }
        if self.contains(AmxFlags::DEBUG) {
            names.push("debug-info");
        }
        if self.contains(AmxFlags::NOCHECKS) {
            names.push("no-checks");
        }
        if self.contains(AmxFlags::NTVREG) {
            names.push("no-reg-verification");
        }
        names.join(" ")
    }
}

/// The fixed-layout header of a compiled module.
///
/// Offsets (`cod`, `dat`, ...) are byte offsets into the module file. The stored image ends
/// at `size`; a debug block, when present, begins there. Parsing validates that the magic
/// matches, that the segments are ordered, and that every offset lies within the input.
#[derive(Debug, Clone)]
pub struct AmxHeader {
    /// Byte size of the stored module image (header + tables + code/data as stored).
    pub size: u32,
    /// Container format version.
    pub file_version: u8,
    /// Minimum VM version required to run the module.
    pub amx_version: u8,
    /// Flag word, see [`AmxFlags`].
    pub flags: AmxFlags,
    /// Size in bytes of one function stub record.
    pub defsize: u16,
    /// Code segment start.
    pub cod: u32,
    /// Data segment start; also the end of the code segment.
    pub dat: u32,
    /// Heap start; also the end of the data segment.
    pub hea: u32,
    /// Stack top.
    pub stp: u32,
    /// Entry point address (informational).
    pub cip: u32,
    /// Public-function stub table offset.
    pub publics: u32,
    /// Native-function stub table offset.
    pub natives: u32,
    /// Library stub table offset.
    pub libraries: u32,
    /// Public-variable table offset; ends the library table.
    pub pubvars: u32,
    /// Tag table offset.
    pub tags: u32,
    /// Name table offset.
    pub nametable: u32,
    /// Embedded module name.
    pub name: String,
}

impl AmxHeader {
    /// Parse and validate the module header at the start of `data`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Empty`] for an empty input, [`crate::Error::NotSupported`] if
    /// the magic does not match [`AMX_MAGIC`], and [`crate::Error::Malformed`] for a
    /// truncated header or offsets that violate the container invariants.
    pub fn parse(data: &[u8]) -> Result<AmxHeader> {
        if data.is_empty() {
            return Err(crate::Error::Empty);
        }
        if data.len() < HEADER_SIZE {
            return Err(malformed_error!(
                "Truncated header: {} bytes, need {}",
                data.len(),
                HEADER_SIZE
            ));
        }

        let mut parser = Parser::new(data);

        let size = parser.read_le::<u32>()?;
        let magic = parser.read_le::<u16>()?;
        if magic != AMX_MAGIC {
            return Err(crate::Error::NotSupported);
        }

        let file_version = parser.read_le::<u8>()?;
        let amx_version = parser.read_le::<u8>()?;
        let flags = AmxFlags::from_bits_truncate(parser.read_le::<u16>()?);
        let defsize = parser.read_le::<u16>()?;
        let cod = parser.read_le::<u32>()?;
        let dat = parser.read_le::<u32>()?;
        let hea = parser.read_le::<u32>()?;
        let stp = parser.read_le::<u32>()?;
        let cip = parser.read_le::<u32>()?;
        let publics = parser.read_le::<u32>()?;
        let natives = parser.read_le::<u32>()?;
        let libraries = parser.read_le::<u32>()?;
        let pubvars = parser.read_le::<u32>()?;
        let tags = parser.read_le::<u32>()?;
        let nametable = parser.read_le::<u32>()?;

        let name_bytes = parser.read_bytes(HEADER_SIZE - parser.pos())?;
        let name_end = name_bytes
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(name_bytes.len());
        let name = String::from_utf8_lossy(&name_bytes[..name_end]).into_owned();

        let header = AmxHeader {
            size,
            file_version,
            amx_version,
            flags,
            defsize,
            cod,
            dat,
            hea,
            stp,
            cip,
            publics,
            natives,
            libraries,
            pubvars,
            tags,
            nametable,
            name,
        };

        header.validate(data.len())?;
        Ok(header)
    }

    fn validate(&self, input_len: usize) -> Result<()> {
        if self.size as usize > input_len {
            return Err(malformed_error!(
                "Header size {} exceeds input length {}",
                self.size,
                input_len
            ));
        }
        if self.defsize == 0 {
            return Err(malformed_error!("Zero stub record size"));
        }

        // The segment offsets must be ordered and the code segment must lie inside the
        // stored image.
        if (self.cod as usize) < HEADER_SIZE
            || self.cod > self.dat
            || self.dat > self.hea
            || self.hea > self.stp
        {
            return Err(malformed_error!(
                "Segment offsets out of order: cod={:#x} dat={:#x} hea={:#x} stp={:#x}",
                self.cod,
                self.dat,
                self.hea,
                self.stp
            ));
        }
        if self.cod > self.size {
            return Err(malformed_error!(
                "Code offset {:#x} beyond stored image end {:#x}",
                self.cod,
                self.size
            ));
        }

        // The stub tables sit between the header and the code segment.
        let tables_ordered = (self.publics as usize) >= HEADER_SIZE
            && self.publics <= self.natives
            && self.natives <= self.libraries
            && self.libraries <= self.pubvars
            && self.pubvars <= self.cod;
        if !tables_ordered {
            return Err(malformed_error!(
                "Stub tables out of order: publics={:#x} natives={:#x} libraries={:#x} pubvars={:#x}",
                self.publics,
                self.natives,
                self.libraries,
                self.pubvars
            ));
        }
        if self.tags > self.cod || self.nametable > self.cod {
            return Err(malformed_error!(
                "Auxiliary table offset beyond code start: tags={:#x} nametable={:#x}",
                self.tags,
                self.nametable
            ));
        }

        let defsize = u32::from(self.defsize);
        if (self.natives - self.publics) % defsize != 0
            || (self.libraries - self.natives) % defsize != 0
            || (self.pubvars - self.libraries) % defsize != 0
        {
            return Err(malformed_error!(
                "Stub table extent not a multiple of record size {}",
                self.defsize
            ));
        }

        Ok(())
    }

    /// Number of public-function stub records.
    #[must_use]
    pub fn num_publics(&self) -> usize {
        ((self.natives - self.publics) / u32::from(self.defsize)) as usize
    }

    /// Number of native-function stub records.
    #[must_use]
    pub fn num_natives(&self) -> usize {
        ((self.libraries - self.natives) / u32::from(self.defsize)) as usize
    }

    /// Number of library stub records.
    #[must_use]
    pub fn num_libraries(&self) -> usize {
        ((self.pubvars - self.libraries) / u32::from(self.defsize)) as usize
    }

    /// Byte size of the code segment.
    #[must_use]
    pub fn code_size(&self) -> usize {
        (self.dat - self.cod) as usize
    }

    /// Byte size of the data segment.
    #[must_use]
    pub fn data_size(&self) -> usize {
        (self.hea - self.dat) as usize
    }

    /// Byte size reserved for the stack and heap.
    #[must_use]
    pub fn stack_size(&self) -> usize {
        (self.stp - self.hea) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn minimal_header() -> Vec<u8> {
        let mut data = vec![0u8; HEADER_SIZE];
        let size = HEADER_SIZE as u32;
        data[0x00..0x04].copy_from_slice(&size.to_le_bytes());
        data[0x04..0x06].copy_from_slice(&AMX_MAGIC.to_le_bytes());
        data[0x06] = 8; // file_version
        data[0x07] = 8; // amx_version
        data[0x0A..0x0C].copy_from_slice(&8u16.to_le_bytes()); // defsize
        for field in [0x0C, 0x10, 0x14, 0x18] {
            data[field..field + 4].copy_from_slice(&size.to_le_bytes());
        }
        for field in [0x20, 0x24, 0x28, 0x2C, 0x30, 0x34] {
            data[field..field + 4].copy_from_slice(&size.to_le_bytes());
        }
        data[0x38..0x3B].copy_from_slice(b"foo");
        data
    }

    #[test]
    fn parse_minimal() {
        let header = AmxHeader::parse(&minimal_header()).unwrap();

        assert_eq!(header.file_version, 8);
        assert_eq!(header.flags, AmxFlags::empty());
        assert_eq!(header.name, "foo");
        assert_eq!(header.num_publics(), 0);
        assert_eq!(header.num_natives(), 0);
        assert_eq!(header.code_size(), 0);
    }

    #[test]
    fn reject_bad_magic() {
        let mut data = minimal_header();
        data[0x04] = 0xAA;

        assert!(matches!(
            AmxHeader::parse(&data),
            Err(Error::NotSupported)
        ));
    }

    #[test]
    fn reject_empty_and_truncated() {
        assert!(matches!(AmxHeader::parse(&[]), Err(Error::Empty)));
        assert!(matches!(
            AmxHeader::parse(&minimal_header()[..0x20]),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn reject_unordered_segments() {
        let mut data = minimal_header();
        // dat < cod
        data[0x10..0x14].copy_from_slice(&0x10u32.to_le_bytes());

        assert!(matches!(
            AmxHeader::parse(&data),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn reject_size_beyond_input() {
        let mut data = minimal_header();
        data[0x00..0x04].copy_from_slice(&0x1000u32.to_le_bytes());

        assert!(matches!(
            AmxHeader::parse(&data),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn describe_flags() {
        let flags = AmxFlags::COMPACT | AmxFlags::DEBUG;
        assert_eq!(flags.describe(), "compact-encoding debug-info");
        assert_eq!(AmxFlags::empty().describe(), "");
    }
}
