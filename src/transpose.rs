// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bit-level transpose between plain blocks and bit-sliced words.
//!
//! A bit-sliced block gathers `W` plain 128-bit blocks ("rows") and stores
//! them as [`SLICED_WORDS`] words, where word `n` holds bit `n` of every row:
//! bit `k` of sliced word `(i << log2(W)) + j` is bit `j` of word `i` of row `k`.
//!
//! Rows live in a caller buffer and are addressed through a [`Stride`]: row `k`
//! starts at word `k * (128 / W) * stride`. Words between rows belong to
//! other data and are never read or written.

use crate::error::{Error, Result};
use crate::word::{BLOCK_BITS, Word};
use core::num::NonZeroUsize;
use zeroize::Zeroize;

/// Words in a bit-sliced block: `W` rows of `128 / W` words.
pub const SLICED_WORDS: usize = BLOCK_BITS;

/// A bit-sliced block: one word per bit position of a 128-bit block.
pub type SlicedBlock<W> = [W; SLICED_WORDS];

/// Width, in blocks, from one row to the next inside a shared buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Stride(NonZeroUsize);

impl Stride {
    /// Rows are adjacent blocks.
    pub const ONE: Self = Self(NonZeroUsize::MIN);

    /// Create a stride of `blocks` block-widths.
    pub fn new(blocks: usize) -> Result<Self> {
        NonZeroUsize::new(blocks)
            .map(Self)
            .ok_or(Error::InvalidStride)
    }

    /// Number of block-widths between rows.
    pub fn get(self) -> usize {
        self.0.get()
    }

    /// Word offset of row `row` for word type `W`, or `None` on overflow.
    pub fn row_offset<W: Word>(self, row: usize) -> Option<usize> {
        row.checked_mul(W::WORDS_PER_BLOCK)?.checked_mul(self.get())
    }

    /// Minimum buffer length, in words, that holds all `W` rows.
    ///
    /// `None` when the last row does not fit in the address space.
    pub fn required_len<W: Word>(self) -> Option<usize> {
        self.row_offset::<W>(W::BITS as usize - 1)?
            .checked_add(W::WORDS_PER_BLOCK)
    }

    /// Offset of a row already validated by [`check_len`].
    #[inline]
    pub(crate) fn offset<W: Word>(self, row: usize) -> usize {
        row * W::WORDS_PER_BLOCK * self.get()
    }
}

impl Default for Stride {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<usize> for Stride {
    type Error = Error;

    fn try_from(blocks: usize) -> Result<Self> {
        Self::new(blocks)
    }
}

/// Reject buffers that cannot hold every row, before any word is touched.
fn check_len<W: Word>(len: usize, stride: Stride) -> Result<()> {
    let expected = stride.required_len::<W>().ok_or(Error::InvalidStride)?;
    if len < expected {
        return Err(Error::BufferTooShort { expected, got: len });
    }
    Ok(())
}

/// Forward transpose of the strided rows of `blocks` into `dst`.
///
/// `dst` is cleared first; the body only ORs bits in. `blocks` must already
/// satisfy [`check_len`] for `stride`.
pub(crate) fn transpose_into<W: Word>(dst: &mut SlicedBlock<W>, blocks: &[W], stride: Stride) {
    dst.fill(W::ZERO);
    for k in 0..W::BITS {
        let row = stride.offset::<W>(k as usize);
        for i in 0..W::WORDS_PER_BLOCK {
            let w = blocks[row + i];
            let offset = i << W::LOG_BITS;
            for j in 0..W::BITS {
                // Branchless: the bit is moved, never tested.
                dst[offset + j as usize] |= ((w >> j) & W::ONE) << k;
            }
        }
    }
}

/// Inverse transpose of `sliced` into the strided rows of `dst`.
///
/// The rows of `dst` are cleared first; words between rows are untouched.
/// `dst` must already satisfy [`check_len`] for `stride`.
pub(crate) fn transpose_rev_into<W: Word>(dst: &mut [W], sliced: &SlicedBlock<W>, stride: Stride) {
    for j in 0..W::BITS as usize {
        let row = stride.offset::<W>(j);
        dst[row..row + W::WORDS_PER_BLOCK].fill(W::ZERO);
    }
    for offset in 0..W::WORDS_PER_BLOCK {
        for bit in 0..W::BITS {
            let w = sliced[(offset << W::LOG_BITS) + bit as usize];
            for j in 0..W::BITS {
                dst[stride.offset::<W>(j as usize) + offset] |= ((w >> j) & W::ONE) << bit;
            }
        }
    }
}

/// Copy the strided rows of `blocks` into a contiguous block.
fn gather_rows<W: Word>(dst: &mut SlicedBlock<W>, blocks: &[W], stride: Stride) {
    for (r, chunk) in dst.chunks_exact_mut(W::WORDS_PER_BLOCK).enumerate() {
        let row = stride.offset::<W>(r);
        chunk.copy_from_slice(&blocks[row..row + W::WORDS_PER_BLOCK]);
    }
}

/// Copy a contiguous block out to the strided rows of `blocks`.
fn scatter_rows<W: Word>(blocks: &mut [W], src: &SlicedBlock<W>, stride: Stride) {
    for (r, chunk) in src.chunks_exact(W::WORDS_PER_BLOCK).enumerate() {
        let row = stride.offset::<W>(r);
        blocks[row..row + W::WORDS_PER_BLOCK].copy_from_slice(chunk);
    }
}

/// Transpose the strided rows of `blocks` in place.
///
/// On return the rows hold the bit-sliced block: sliced word `n` is stored
/// at word `n % (128 / W)` of row `n / (128 / W)`. With [`Stride::ONE`] the
/// sliced block simply occupies the first [`SLICED_WORDS`] words.
pub fn transpose<W: Word>(blocks: &mut [W], stride: Stride) -> Result<()> {
    check_len::<W>(blocks.len(), stride)?;
    let mut scratch = [W::ZERO; SLICED_WORDS];
    transpose_into(&mut scratch, blocks, stride);
    scatter_rows(blocks, &scratch, stride);
    scratch.zeroize();
    Ok(())
}

/// Transpose the strided rows of `blocks` into `dst`.
///
/// Every word of `dst` is overwritten; its previous contents do not matter.
pub fn transpose_dst<W: Word>(
    dst: &mut SlicedBlock<W>,
    blocks: &[W],
    stride: Stride,
) -> Result<()> {
    check_len::<W>(blocks.len(), stride)?;
    transpose_into(dst, blocks, stride);
    Ok(())
}

/// Undo [`transpose`] in place. `stride` must match the forward call.
pub fn transpose_rev<W: Word>(blocks: &mut [W], stride: Stride) -> Result<()> {
    check_len::<W>(blocks.len(), stride)?;
    let mut scratch = [W::ZERO; SLICED_WORDS];
    gather_rows(&mut scratch, blocks, stride);
    transpose_rev_into(blocks, &scratch, stride);
    scratch.zeroize();
    Ok(())
}

/// Write the plain rows of a bit-sliced block into the strided rows of `dst`.
///
/// Inverse of [`transpose_dst`]; only the rows of `dst` are written.
pub fn transpose_rev_dst<W: Word>(
    dst: &mut [W],
    sliced: &SlicedBlock<W>,
    stride: Stride,
) -> Result<()> {
    check_len::<W>(dst.len(), stride)?;
    transpose_rev_into(dst, sliced, stride);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern<W: Word>(len: usize, seed: u128) -> Vec<W> {
        let mut state = seed | 1;
        (0..len)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                W::truncate(state >> 32)
            })
            .collect()
    }

    fn roundtrip<W: Word>(stride: usize) {
        let stride = Stride::new(stride).expect("stride");
        let len = stride.required_len::<W>().expect("required_len") + W::WORDS_PER_BLOCK;
        let original = pattern::<W>(len, 0x5eed_0000 + len as u128);
        let mut blocks = original.clone();
        transpose(&mut blocks, stride).expect("transpose");
        transpose_rev(&mut blocks, stride).expect("transpose_rev");
        assert_eq!(blocks, original);
    }

    #[test]
    fn single_bit_maps_to_word_zero_bit_zero() {
        let mut blocks = [0u64; SLICED_WORDS];
        blocks[0] = 1;
        transpose(&mut blocks, Stride::ONE).expect("transpose");
        assert_eq!(blocks[0], 1);
        assert_eq!(blocks.iter().filter(|&&w| w != 0).count(), 1);
        assert_eq!(blocks.iter().map(|w| w.count_ones()).sum::<u32>(), 1);
    }

    #[test]
    fn bit_position_follows_offset_and_row() {
        // row k = 3, word i = 1, bit j = 5 lands in sliced word (1 << 6) + 5, bit 3
        let mut blocks = [0u64; SLICED_WORDS];
        blocks[3 * 2 + 1] = 1 << 5;
        let mut sliced = [0u64; SLICED_WORDS];
        transpose_dst(&mut sliced, &blocks, Stride::ONE).expect("transpose");
        assert_eq!(sliced[69], 1 << 3);
        assert_eq!(sliced.iter().filter(|&&w| w != 0).count(), 1);
    }

    #[test]
    fn bit_position_u8() {
        // 16 words per block; row 7, word 15, bit 7 -> sliced word 127, bit 7
        let mut blocks = [0u8; SLICED_WORDS];
        blocks[7 * 16 + 15] = 0x80;
        transpose(&mut blocks, Stride::ONE).expect("transpose");
        assert_eq!(blocks[127], 0x80);
        assert_eq!(blocks.iter().filter(|&&w| w != 0).count(), 1);
    }

    #[test]
    fn roundtrip_all_widths_and_strides() {
        for stride in 1..=3 {
            roundtrip::<u8>(stride);
            roundtrip::<u16>(stride);
            roundtrip::<u32>(stride);
            roundtrip::<u64>(stride);
        }
    }

    #[test]
    fn dst_matches_in_place_and_ignores_stale_contents() {
        let blocks = pattern::<u32>(SLICED_WORDS, 42);
        let mut in_place = blocks.clone();
        transpose(&mut in_place, Stride::ONE).expect("transpose");

        let mut dst = [u32::MAX; SLICED_WORDS];
        transpose_dst(&mut dst, &blocks, Stride::ONE).expect("transpose_dst");
        assert_eq!(&dst[..], &in_place[..]);
    }

    #[test]
    fn strided_rows_leave_gaps_untouched() {
        let stride = Stride::new(2).expect("stride");
        let len = stride.required_len::<u64>().expect("required_len");
        let original = pattern::<u64>(len, 7);
        let mut blocks = original.clone();
        transpose(&mut blocks, stride).expect("transpose");
        for r in 0..63 {
            let gap = stride.row_offset::<u64>(r).expect("row_offset") + 2;
            assert_eq!(blocks[gap..gap + 2], original[gap..gap + 2]);
        }
    }

    #[test]
    fn rev_dst_inverts_dst() {
        let stride = Stride::new(3).expect("stride");
        let blocks = pattern::<u16>(stride.required_len::<u16>().expect("required_len"), 99);
        let mut sliced = [0u16; SLICED_WORDS];
        transpose_dst(&mut sliced, &blocks, stride).expect("transpose_dst");

        let mut restored = vec![0xaaaau16; blocks.len()];
        transpose_rev_dst(&mut restored, &sliced, stride).expect("transpose_rev_dst");
        for r in 0..16 {
            let row = stride.row_offset::<u16>(r).expect("row_offset");
            assert_eq!(restored[row..row + 8], blocks[row..row + 8]);
            if r < 15 {
                assert!(restored[row + 8..row + 24].iter().all(|&w| w == 0xaaaa));
            }
        }
    }

    #[test]
    fn short_buffer_is_rejected() {
        let mut blocks = [0u64; SLICED_WORDS - 1];
        assert_eq!(
            transpose(&mut blocks, Stride::ONE),
            Err(Error::BufferTooShort {
                expected: SLICED_WORDS,
                got: SLICED_WORDS - 1,
            })
        );
    }

    #[test]
    fn overflowing_stride_is_rejected_before_touching_data() {
        let stride = Stride::new(1 << (usize::BITS - 1)).expect("stride");
        assert_eq!(stride.required_len::<u64>(), None);
        assert_eq!(stride.row_offset::<u64>(1), None);
        assert_eq!(stride.row_offset::<u64>(0), Some(0));

        let mut blocks = [0xdead_beef_u64, 0x1234];
        assert_eq!(transpose(&mut blocks, stride), Err(Error::InvalidStride));
        assert_eq!(transpose_rev(&mut blocks, stride), Err(Error::InvalidStride));
        assert_eq!(blocks, [0xdead_beef, 0x1234]);

        let mut sliced = [0u64; SLICED_WORDS];
        assert_eq!(transpose_dst(&mut sliced, &blocks, stride), Err(Error::InvalidStride));
        assert_eq!(
            transpose_rev_dst(&mut blocks, &sliced, stride),
            Err(Error::InvalidStride)
        );
        assert_eq!(blocks, [0xdead_beef, 0x1234]);

        let stride = Stride::new(usize::MAX).expect("stride");
        let mut bytes = [0x5au8; 16];
        assert_eq!(transpose(&mut bytes, stride), Err(Error::InvalidStride));
        assert_eq!(bytes, [0x5a; 16]);
    }

    #[test]
    fn large_stride_reports_exact_length() {
        // u64: last row at 63 * 2 * stride, plus two words
        let stride = Stride::new(1 << 20).expect("stride");
        assert_eq!(stride.required_len::<u64>(), Some(63 * 2 * (1 << 20) + 2));
        let mut blocks = [0u64; 4];
        assert_eq!(
            transpose(&mut blocks, stride),
            Err(Error::BufferTooShort {
                expected: 63 * 2 * (1 << 20) + 2,
                got: 4,
            })
        );
    }

    #[test]
    fn zero_stride_is_rejected() {
        assert_eq!(Stride::new(0), Err(Error::InvalidStride));
        assert_eq!(Stride::try_from(4usize).map(Stride::get), Ok(4));
        assert_eq!(Stride::default(), Stride::ONE);
    }
}
