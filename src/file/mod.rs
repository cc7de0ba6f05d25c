//! Module file abstraction and raw byte access.
//!
//! This module provides access to a compiled module's raw bytes, abstracting over different
//! data sources (files on disk, memory buffers). The parsed views of the container — header,
//! stub tables, debug records — are built on top of it by [`crate::metadata`].
//!
//! # Key Components
//!
//! - [`crate::file::File`] - Main file abstraction over a pluggable data source
//! - [`crate::file::Backend`] - Trait for different data sources (disk files, memory buffers)
//! - [`crate::file::parser::Parser`] - Bounds-checked cursor for reading structures
//! - [`crate::file::io`] - Low-level endian-normalizing read utilities
//!
//! # Examples
//!
//! ```rust,no_run
//! use amxscope::File;
//! use std::path::Path;
//!
//! let file = File::from_file(Path::new("script.amx"))?;
//! println!("Loaded module file with {} bytes", file.len());
//! # Ok::<(), amxscope::Error>(())
//! ```

pub mod io;
pub mod parser;

mod memory;
mod physical;

use std::path::Path;

use crate::{Error::Empty, Result};
use memory::Memory;
use physical::Physical;

/// Backend trait for file data sources.
///
/// This trait abstracts over the source of module data, allowing for both in-memory and
/// on-disk representations. It provides a common interface for accessing the raw bytes
/// regardless of whether they're memory-mapped from a file or held in a buffer.
pub trait Backend: Send + Sync {
    /// Returns a slice of the data at the given offset and length.
    ///
    /// # Arguments
    ///
    /// * `offset` - The starting offset within the data.
    /// * `len` - The length of the slice in bytes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the requested range is out of bounds.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]>;

    /// Returns the entire data buffer.
    fn data(&self) -> &[u8];

    /// Returns the total length of the data buffer.
    fn len(&self) -> usize;
}

/// Represents an opened module file.
///
/// `File` owns the raw input bytes for the lifetime of a run and hands out bounds-checked
/// slices of them. It never interprets the content; header parsing, table reads, and code
/// expansion all happen in [`crate::metadata`] on top of this abstraction.
///
/// # Examples
///
/// ```rust,no_run
/// use amxscope::File;
/// use std::fs;
///
/// let data = fs::read("script.amx")?;
/// let file = File::from_mem(data)?;
/// println!("Module size: {} bytes", file.len());
/// # Ok::<(), amxscope::Error>(())
/// ```
pub struct File {
    /// The underlying data source (memory or file).
    data: Box<dyn Backend>,
}

impl File {
    /// Loads a module file from the given path.
    ///
    /// The file is memory-mapped for efficient access.
    ///
    /// # Arguments
    ///
    /// * `file` - Path to the module file on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or mapped, or if it is empty.
    pub fn from_file(file: &Path) -> Result<File> {
        let input = Physical::new(file)?;

        Self::load(Box::new(input))
    }

    /// Loads a module file from a memory buffer.
    ///
    /// # Arguments
    ///
    /// * `data` - The bytes of the module file.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Empty`] if the buffer is empty.
    pub fn from_mem(data: Vec<u8>) -> Result<File> {
        Self::load(Box::new(Memory::new(data)))
    }

    fn load(backend: Box<dyn Backend>) -> Result<File> {
        if backend.len() == 0 {
            return Err(Empty);
        }

        Ok(File { data: backend })
    }

    /// Returns the entire file contents.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.data.data()
    }

    /// Returns a bounds-checked slice of the file contents.
    ///
    /// # Arguments
    ///
    /// * `offset` - The starting offset within the file.
    /// * `len` - The length of the slice in bytes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the requested range is out of bounds.
    pub fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.data.data_slice(offset, len)
    }

    /// Returns the total file length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the file holds no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_mem_rejects_empty() {
        assert!(matches!(File::from_mem(vec![]), Err(Empty)));
    }

    #[test]
    fn from_mem_slices() {
        let file = File::from_mem(vec![0x10, 0x20, 0x30, 0x40]).unwrap();

        assert_eq!(file.len(), 4);
        assert!(!file.is_empty());
        assert_eq!(file.data_slice(1, 2).unwrap(), &[0x20, 0x30]);
        assert!(file.data_slice(3, 2).is_err());
    }
}
