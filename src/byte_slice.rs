// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Byte-level transpose of a batch of 16 128-bit elements.

use crate::lanes::{LANES, LaneVector};
use crate::word::BLOCK_BYTES;
use zeroize::Zeroize;

/// Byte-sliced form of a batch: row `b` holds byte `b` of every element.
pub type ByteSlicedRows = [LaneVector; BLOCK_BYTES];

/// Slice 16 elements into 16 rows; lane `i` of row `b` is byte `b` of element `i`.
///
/// Bytes are numbered little-endian, so row 0 holds the low bytes.
pub fn byte_slice(input: &[u128; LANES]) -> ByteSlicedRows {
    let mut elements = input.map(u128::to_le_bytes);
    let rows = core::array::from_fn(|byte| {
        LaneVector::from_bytes(core::array::from_fn(|lane| elements[lane][byte]))
    });
    elements.zeroize();
    rows
}

/// Inverse of [`byte_slice`].
pub fn un_byte_slice(rows: &ByteSlicedRows) -> [u128; LANES] {
    let mut bytes = rows.map(LaneVector::to_bytes);
    let elements =
        core::array::from_fn(|lane| u128::from_le_bytes(core::array::from_fn(|byte| bytes[byte][lane])));
    bytes.zeroize();
    elements
}
