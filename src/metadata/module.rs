//! The loaded module container tying the header, the expanded image, and the optional
//! debug block together.

use std::path::Path;

use crate::{
    file::File,
    metadata::{
        debug::DebugInfo,
        expand::expand_in_place,
        header::{AmxFlags, AmxHeader},
    },
    Result, CELL_SIZE,
};

/// A compiled module loaded into memory, with the code and data segments expanded.
///
/// The raw file stays accessible for stub-table and name reads; `image` holds the code and
/// data segments after compact expansion, so the disassembler always walks plain
/// little-endian cells.
pub struct AmxModule {
    file: File,
    header: AmxHeader,
    image: Vec<u8>,
    debug: Option<DebugInfo>,
}

impl AmxModule {
    /// Load a module from a file on disk.
    ///
    /// # Errors
    /// Fails when the file cannot be read or the container is invalid, see [`Self::from_mem`].
    ///
    /// # Examples
    /// ```no_run
    /// use amxscope::AmxModule;
    ///
    /// let module = AmxModule::from_file("plugin.amx".as_ref())?;
    /// println!("{}", module.header().name);
    /// # Ok::<(), amxscope::Error>(())
    /// ```
    pub fn from_file(path: &Path) -> Result<AmxModule> {
        Self::load(File::from_file(path)?)
    }

    /// Load a module from an in-memory byte buffer.
    ///
    /// # Errors
    /// Returns [`crate::Error::Empty`] for an empty buffer, [`crate::Error::NotSupported`]
    /// for a foreign magic, and [`crate::Error::Malformed`] for a container whose header,
    /// segments, or compact stream are inconsistent.
    pub fn from_mem(data: Vec<u8>) -> Result<AmxModule> {
        Self::load(File::from_mem(data)?)
    }

    fn load(file: File) -> Result<AmxModule> {
        let header = AmxHeader::parse(file.data())?;

        let expanded = (header.hea - header.cod) as usize;
        if expanded % CELL_SIZE != 0 {
            return Err(malformed_error!(
                "Image size {} is not cell-aligned",
                expanded
            ));
        }
        let stored = (header.size - header.cod) as usize;
        if stored > expanded {
            return Err(malformed_error!(
                "Stored image of {} bytes exceeds the {} byte segment span",
                stored,
                expanded
            ));
        }

        let mut image = vec![0u8; expanded];
        let source = file.data_slice(header.cod as usize, stored)?;
        if header.flags.contains(AmxFlags::COMPACT) {
            image[..stored].copy_from_slice(source);
            expand_in_place(&mut image, stored)?;
        } else {
            if stored < header.code_size() + header.data_size() {
                return Err(malformed_error!(
                    "Code and data segments truncated: {} bytes stored, {} declared",
                    stored,
                    header.code_size() + header.data_size()
                ));
            }
            image[..stored].copy_from_slice(source);
        }

        // A broken debug block downgrades the listing instead of failing the load.
        let debug = if header.flags.contains(AmxFlags::DEBUG)
            && (header.size as usize) < file.len()
        {
            DebugInfo::parse(&file.data()[header.size as usize..]).ok()
        } else {
            None
        };

        Ok(AmxModule {
            file,
            header,
            image,
            debug,
        })
    }

    /// The parsed module header.
    #[must_use]
    pub fn header(&self) -> &AmxHeader {
        &self.header
    }

    /// The expanded code segment.
    #[must_use]
    pub fn code(&self) -> &[u8] {
        &self.image[..self.header.code_size()]
    }

    /// The expanded code and data segments.
    #[must_use]
    pub fn image(&self) -> &[u8] {
        &self.image
    }

    /// The decoded debug block, when present and intact.
    #[must_use]
    pub fn debug_info(&self) -> Option<&DebugInfo> {
        self.debug.as_ref()
    }

    pub(crate) fn file(&self) -> &File {
        &self.file
    }
}
