//! In-place expansion of the compact cell encoding.
//!
//! Compact modules store each 32-bit cell as one to five 7-bit groups, most significant
//! group first. Every stored byte except the last of a group carries the continuation bit
//! (`0x80`); bit `0x40` of the first stored byte is the sign, which is extended to fill the
//! cell. Expansion walks the stored stream backwards and writes cells from the end of the
//! buffer towards the front, so it needs no second allocation. Cells whose target location
//! still overlaps unread stored bytes are parked in a small ring and flushed once the read
//! cursor has passed them.

use crate::{Result, CELL_SIZE};

/// Capacity of the ring holding cells that cannot be written yet.
///
/// Matches the scratch margin the encoder guarantees; a well-formed stream never has more
/// than this many cells pending.
pub(crate) const COMPACT_MARGIN: usize = 64;

#[derive(Clone, Copy, Default)]
struct Pending {
    memloc: usize,
    value: u32,
}

/// Expand the compact stream occupying `image[..stored]` so that `image` holds the fully
/// expanded cells afterwards.
///
/// `image.len()` must be the expanded size declared by the header and a multiple of the
/// cell size.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] when the stream is inconsistent with the declared
/// expanded size, a group exceeds the cell width, or the pending ring overflows.
pub fn expand_in_place(image: &mut [u8], stored: usize) -> Result<()> {
    if image.len() % CELL_SIZE != 0 {
        return Err(malformed_error!(
            "Expanded size {} is not cell-aligned",
            image.len()
        ));
    }
    if stored > image.len() {
        return Err(malformed_error!(
            "Stored size {} exceeds expanded size {}",
            stored,
            image.len()
        ));
    }

    let mut codesize = stored;
    let mut memsize = image.len();
    let mut spare = [Pending::default(); COMPACT_MARGIN];
    let mut sh = 0;
    let mut st = 0;
    let mut sc = 0;

    while codesize > 0 {
        // Read one group back to front; the byte read last is the most significant.
        let mut c: u32 = 0;
        let mut shift = 0;
        loop {
            codesize -= 1;
            if shift >= u32::BITS {
                return Err(malformed_error!(
                    "Compact group exceeds cell width at stored offset {}",
                    codesize
                ));
            }
            // The byte ending a group must have its continuation bit clear.
            if shift == 0 && image[codesize] & 0x80 != 0 {
                return Err(malformed_error!(
                    "Continuation bit set on a terminal byte at stored offset {}",
                    codesize
                ));
            }
            c |= u32::from(image[codesize] & 0x7f) << shift;
            shift += 7;
            if codesize == 0 || image[codesize - 1] & 0x80 == 0 {
                break;
            }
        }
        if image[codesize] & 0x40 != 0 {
            while shift < u32::BITS {
                c |= 0xff << shift;
                shift += 8;
            }
        }

        // Flush pending cells whose slot no longer overlaps unread stored bytes.
        while sc > 0 && spare[sh].memloc > codesize {
            image[spare[sh].memloc..spare[sh].memloc + CELL_SIZE]
                .copy_from_slice(&spare[sh].value.to_le_bytes());
            sh = (sh + 1) % COMPACT_MARGIN;
            sc -= 1;
        }

        if memsize < CELL_SIZE {
            return Err(malformed_error!(
                "Compact stream expands past the declared size"
            ));
        }
        memsize -= CELL_SIZE;
        if memsize > codesize || (memsize == codesize && memsize == 0) {
            image[memsize..memsize + CELL_SIZE].copy_from_slice(&c.to_le_bytes());
        } else {
            if sc >= COMPACT_MARGIN {
                return Err(malformed_error!("Compact pending ring overflow"));
            }
            spare[st] = Pending { memloc: memsize, value: c };
            st = (st + 1) % COMPACT_MARGIN;
            sc += 1;
        }
    }

    if memsize != 0 {
        return Err(malformed_error!(
            "Compact stream stopped {} bytes short of the declared size",
            memsize
        ));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn compact_encode(cells: &[u32]) -> Vec<u8> {
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
