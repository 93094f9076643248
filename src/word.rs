// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Word widths and the 128-bit block model.
//!
//! Defines the sealed [`Word`] trait and its four implementations
//! (`u8`, `u16`, `u32`, `u64`). Any other word width fails to compile,
//! because nothing outside this module can implement [`Word`].

use core::fmt::Debug;
use core::ops::{BitAnd, BitOr, BitOrAssign, BitXor, BitXorAssign, Not, Shl, Shr};
use zeroize::Zeroize;

/// Bits in one block, independent of the word width.
pub const BLOCK_BITS: usize = 128;
/// Bytes in one block.
pub const BLOCK_BYTES: usize = BLOCK_BITS / 8;

/// The word width used by the fixed-size batch entry points.
pub type DefaultWord = u64;

mod private {
    pub trait Sealed {}
}

/// Trait defining a word width and the constants derived from it.
pub trait Word:
    private::Sealed
    + Copy
    + Default
    + Eq
    + Debug
    + Send
    + Sync
    + Zeroize
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + BitXor<Output = Self>
    + BitOrAssign
    + BitXorAssign
    + Not<Output = Self>
    + Shl<u32, Output = Self>
    + Shr<u32, Output = Self>
    + 'static
{
    /// Human-readable name of this word type.
    const NAME: &'static str;
    /// Bits per word (`W`).
    const BITS: u32;
    /// `log2(BITS)`, the shift that turns a word index into a bit offset.
    const LOG_BITS: u32;
    /// Words per 128-bit block (`128 / W`).
    const WORDS_PER_BLOCK: usize;
    /// The all-zero word.
    const ZERO: Self;
    /// The word with only bit 0 set.
    const ONE: Self;

    /// Keep the low `BITS` bits of `value`.
    fn truncate(value: u128) -> Self;

    /// Zero-extend this word to 128 bits.
    fn widen(self) -> u128;
}

macro_rules! define_word {
    ($ty:ty, $display:expr, log_bits = $log:expr) => {
        impl private::Sealed for $ty {}

        impl Word for $ty {
            const NAME: &'static str = $display;
            const BITS: u32 = <$ty>::BITS;
            const LOG_BITS: u32 = $log;
            const WORDS_PER_BLOCK: usize = BLOCK_BITS >> $log;
            const ZERO: Self = 0;
            const ONE: Self = 1;

            #[inline]
            #[allow(clippy::cast_possible_truncation)]
            fn truncate(value: u128) -> Self {
                value as $ty
            }

            #[inline]
            fn widen(self) -> u128 {
                u128::from(self)
            }
        }

        const _: () = assert!(1 << $log == <$ty>::BITS && BLOCK_BITS % (1 << $log) == 0);
    };
}

define_word!(u8, "u8", log_bits = 3);
define_word!(u16, "u16", log_bits = 4);
define_word!(u32, "u32", log_bits = 5);
define_word!(u64, "u64", log_bits = 6);

/// Split a 128-bit block into `W::WORDS_PER_BLOCK` little-endian words.
#[inline]
pub fn split_block<W: Word>(block: u128, dst: &mut [W]) {
    let mut rest = block;
    for word in dst.iter_mut().take(W::WORDS_PER_BLOCK) {
        *word = W::truncate(rest);
        rest >>= W::BITS;
    }
}

/// Reassemble a 128-bit block from `W::WORDS_PER_BLOCK` little-endian words.
#[inline]
pub fn join_block<W: Word>(src: &[W]) -> u128 {
    src.iter()
        .take(W::WORDS_PER_BLOCK)
        .rev()
        .fold(0u128, |acc, word| (acc << W::BITS) | word.widen())
}
