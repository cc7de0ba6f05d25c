//! Low-level byte stream parser for module structures.
//!
//! This module provides the [`crate::file::parser::Parser`] type, a cursor-based binary data
//! parser for reading module headers, stub tables, debug records, and the expanded code
//! segment. It offers bounds-checked access to binary data; all multi-byte reads normalize
//! the stored little-endian byte order to the host representation.
//!
//! # Usage Example
//!
//! ```rust
//! use amxscope::Parser;
//!
//! let data = [0x01, 0x02, 0x03, 0x04];
//! let mut parser = Parser::new(&data);
//!
//! let value = parser.read_le::<u16>()?;
//! assert_eq!(value, 0x0201);
//! # Ok::<(), amxscope::Error>(())
//! ```

use crate::{
    file::io::{read_le_at, AmxIO},
    Result,
};

/// A generic binary data parser for reading module structures.
///
/// `Parser` provides a cursor-based interface for reading little-endian binary data. It
/// maintains an internal position cursor and provides bounds checking to prevent buffer
/// overruns when reading malformed or truncated data.
///
/// # Examples
///
/// ```rust,no_run
/// use amxscope::Parser;
///
/// let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
/// let mut parser = Parser::new(&data);
///
/// let first = parser.read_le::<u32>()?;
/// assert_eq!(first, 0x04030201);
///
/// let rest = parser.read_bytes(4)?;
/// assert_eq!(rest, &[0x05, 0x06, 0x07, 0x08]);
/// # Ok::<(), amxscope::Error>(())
/// ```
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`crate::file::parser::Parser`] from a byte slice.
    ///
    /// # Arguments
    /// * `data` - The byte slice to read from
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns `true` if there is more data available to parse.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Get the current position of the parser within the data buffer.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Returns the number of bytes remaining from the current position.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Read a type `T` from the current position in little-endian format and advance the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading would exceed the data length.
    pub fn read_le<T: AmxIO>(&mut self) -> Result<T> {
        read_le_at::<T>(self.data, &mut self.position)
    }

    /// Reads a slice of bytes of the specified length from the current position.
    ///
    /// # Arguments
    /// * `length` - The number of bytes to read
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading `length` bytes would exceed the data.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        let end = self
            .position
            .checked_add(length)
            .ok_or(out_of_bounds_error!())?;

        if end > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    /// Read a UTF-8 encoded null-terminated string.
    ///
    /// Reads bytes from the current position until a null terminator (0x00) is found, then
    /// decodes the bytes as UTF-8. The position is advanced past the null terminator. A
    /// string running to the end of the data without a terminator is accepted.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for invalid UTF-8 encoding.
    pub fn read_string_utf8(&mut self) -> Result<String> {
        let start = self.position;
        let mut end = start;

        while end < self.data.len() && self.data[end] != 0 {
            end += 1;
        }

        let string_data = &self.data[start..end];

        if end < self.data.len() {
            self.position = end + 1;
        } else {
            self.position = end;
        }

        String::from_utf8(string_data.to_vec()).map_err(|e| {
            malformed_error!(
                "Invalid UTF-8 string at offset {}-{}: {}",
                start,
                end,
                e.utf8_error()
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_read_le_sequence() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        let mut parser = Parser::new(&data);

        let first: u32 = parser.read_le().unwrap();
        assert_eq!(first, 0x04030201);
        assert_eq!(parser.pos(), 4);
        assert_eq!(parser.remaining(), 4);

        let last: u32 = parser.read_le().unwrap();
        assert_eq!(last, 0x08070605);
        assert!(!parser.has_more_data());
    }

    #[test]
    fn test_parse_string() {
        let test_cases = vec![
            (vec![0x61, 0x62, 0x63, 0x00], "abc"), // Simple string
            (vec![0x00], ""),                      // Empty string
            (vec![0x61, 0x62], "ab"),              // No terminator before end of data
        ];

        for (input, expected) in test_cases {
            let mut parser = Parser::new(&input);
            let result = parser.read_string_utf8().unwrap();
            assert_eq!(result, expected);
        }
    }

    #[test]
    fn test_read_bytes() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05];
        let mut parser = Parser::new(&data);

        let chunk = parser.read_bytes(3).unwrap();
        assert_eq!(chunk, &[0x01, 0x02, 0x03]);
        assert_eq!(parser.pos(), 3);

        assert!(matches!(
            parser.read_bytes(3),
            Err(Error::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_error_handling() {
        let mut parser = Parser::new(&[0x08]);
        assert!(matches!(parser.read_le::<u8>(), Ok(8)));
        assert!(matches!(
            parser.read_le::<u8>(),
            Err(Error::OutOfBounds { .. })
        ));
    }

}
