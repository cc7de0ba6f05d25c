//! Low-level byte order and safe reading utilities for module parsing.
//!
//! This module provides endian-aware binary reading for the module container format. All
//! multi-byte fields in a module file are stored little-endian; these helpers normalize them
//! to the host representation with bounds checking, preventing buffer overruns when parsing
//! malformed or truncated input.
//!
//! # Key Components
//!
//! - [`crate::file::io::AmxIO`] - Trait defining byte-to-value conversions for primitive types
//! - [`crate::file::io::read_le_at`] - Read a value at an offset (auto-advance), little-endian
//!
//! All functions return [`crate::Result`] and fail with [`crate::Error::OutOfBounds`] if there
//! are insufficient bytes to complete the operation.

use crate::{Error::OutOfBounds, Result};

/// Trait for implementing type-specific safe binary data reading operations.
///
/// This trait provides a unified interface for reading primitive types from byte slices in a
/// safe and endian-aware manner. It abstracts over the conversion from byte arrays to typed
/// values; the module format stores everything little-endian.
///
/// Each implementation defines a `Bytes` associated type that represents the fixed-size byte
/// array required for that particular type (e.g., `[u8; 4]` for `u32`).
pub trait AmxIO: Sized {
    /// Associated type representing the byte array type for this numeric type.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! impl_amx_io {
    ($($ty:ty => $len:literal),* $(,)?) => {
        $(
            impl AmxIO for $ty {
                type Bytes = [u8; $len];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }
            }
        )*
    };
}

impl_amx_io! {
    u8 => 1,
    i8 => 1,
    u16 => 2,
    i16 => 2,
    u32 => 4,
    i32 => 4,
    u64 => 8,
    i64 => 8,
}

/// Reads a value of type `T` at `offset` in little-endian byte order, advancing the offset.
///
/// # Arguments
/// * `data` - The buffer to read from
/// * `offset` - Position to read at; advanced by `size_of::<T>()` on success
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if fewer than `size_of::<T>()` bytes remain.
pub fn read_le_at<T: AmxIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    if (type_len + *offset) > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..*offset + type_len].try_into() else {
        return Err(OutOfBounds);
    };

    *offset += type_len;

    Ok(T::from_le_bytes(read))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_le_at_sequential() {
        let data = [0x01, 0x00, 0x02, 0x00, 0x03, 0x00, 0x00, 0x00];
        let mut offset = 0;

        let first: u16 = read_le_at(&data, &mut offset).unwrap();
        let second: u16 = read_le_at(&data, &mut offset).unwrap();
        let third: u32 = read_le_at(&data, &mut offset).unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(third, 3);
        assert_eq!(offset, 8);
    }

    #[test]
    fn read_le_at_out_of_bounds() {
        let data = [0x01, 0x02];
        let mut offset = 0;

        let result: Result<u32> = read_le_at(&data, &mut offset);
        assert!(matches!(result, Err(OutOfBounds)));
        // Offset must not move on failure
        assert_eq!(offset, 0);
    }

    #[test]
    fn read_le_at_signed() {
        let data = [0xFF, 0xFF, 0xFF, 0xFF];
        let mut offset = 0;

        let value: i32 = read_le_at(&data, &mut offset).unwrap();
        assert_eq!(value, -1);
    }
}
