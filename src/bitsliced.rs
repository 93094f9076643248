// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bit-sliced tower multiplication.
//!
//! `W` elements are transposed into a [`SlicedBlock<W>`], where word `n`
//! carries bit `n` of every element. The tower recursion then runs all the
//! way down to GF(2), where a product is a single `AND` over `W` lanes and
//! multiplying by the level generator is the identity. No table is touched,
//! so the running time does not depend on the data.

use crate::batch::BATCH_SIZE;
use crate::error::{Error, Result};
use crate::transpose::{SLICED_WORDS, SlicedBlock, Stride, transpose_into, transpose_rev_into};
use crate::word::{DefaultWord, Word, join_block, split_block};
use zeroize::Zeroize;

/// Largest half-width, in words, seen by the recursion.
const MAX_HALF: usize = SLICED_WORDS / 2;

const _: () = assert!(DefaultWord::BITS as usize == BATCH_SIZE);

fn mul_words<W: Word>(a: &[W], b: &[W], dst: &mut [W]) {
    let n = a.len();
    if n == 1 {
        dst[0] = a[0] & b[0];
        return;
    }
    let half = n / 2;
    let (a0, a1) = a.split_at(half);
    let (b0, b1) = b.split_at(half);

    let mut sum_a = [W::ZERO; MAX_HALF];
    let mut sum_b = [W::ZERO; MAX_HALF];
    let mut z2 = [W::ZERO; MAX_HALF];
    let mut alpha_z2 = [W::ZERO; MAX_HALF];
    for i in 0..half {
        sum_a[i] = a0[i] ^ a1[i];
        sum_b[i] = b0[i] ^ b1[i];
    }

    let (lo, hi) = dst.split_at_mut(half);
    mul_words(a0, b0, lo);
    mul_words(a1, b1, &mut z2[..half]);
    mul_words(&sum_a[..half], &sum_b[..half], hi);
    mul_alpha_words(&z2[..half], &mut alpha_z2[..half]);

    for i in 0..half {
        hi[i] ^= lo[i] ^ z2[i] ^ alpha_z2[i];
        lo[i] ^= z2[i];
    }

    sum_a.zeroize();
    sum_b.zeroize();
    z2.zeroize();
    alpha_z2.zeroize();
}

fn mul_alpha_words<W: Word>(a: &[W], dst: &mut [W]) {
    if a.len() == 1 {
        dst[0] = a[0];
        return;
    }
    let half = a.len() / 2;
    let (a0, a1) = a.split_at(half);
    let (lo, hi) = dst.split_at_mut(half);
    lo.copy_from_slice(a1);
    mul_alpha_words(a1, hi);
    for (h, &x) in hi.iter_mut().zip(a0) {
        *h ^= x;
    }
}

/// `dst = a * b` for the `W` elements held by two bit-sliced blocks.
pub fn multiply_sliced<W: Word>(
    a: &SlicedBlock<W>,
    b: &SlicedBlock<W>,
    dst: &mut SlicedBlock<W>,
) {
    mul_words(a, b, dst);
}

/// `dst = alpha * a`, alpha being the generator of the top tower level.
pub fn mul_alpha_sliced<W: Word>(a: &SlicedBlock<W>, dst: &mut SlicedBlock<W>) {
    mul_alpha_words(a, dst);
}

/// Split `elements` into consecutive rows of `W::WORDS_PER_BLOCK` words.
fn load_rows<W: Word>(rows: &mut SlicedBlock<W>, elements: &[u128]) {
    for (row, &element) in rows.chunks_exact_mut(W::WORDS_PER_BLOCK).zip(elements) {
        split_block(element, row);
    }
}

/// Caller guarantees every slice holds exactly `W::BITS` elements.
fn multiply_unchecked<W: Word>(lhs: &[u128], rhs: &[u128], out: &mut [u128]) {
    let _span = tracing::trace_span!("multiply", strategy = "bit-sliced", word = W::NAME).entered();

    let mut rows = [W::ZERO; SLICED_WORDS];
    let mut a = [W::ZERO; SLICED_WORDS];
    let mut b = [W::ZERO; SLICED_WORDS];
    let mut c = [W::ZERO; SLICED_WORDS];

    load_rows(&mut rows, lhs);
    transpose_into(&mut a, &rows, Stride::ONE);
    load_rows(&mut rows, rhs);
    transpose_into(&mut b, &rows, Stride::ONE);

    multiply_sliced(&a, &b, &mut c);

    transpose_rev_into(&mut rows, &c, Stride::ONE);
    for (dst, row) in out.iter_mut().zip(rows.chunks_exact(W::WORDS_PER_BLOCK)) {
        *dst = join_block(row);
    }

    rows.zeroize();
    a.zeroize();
    b.zeroize();
    c.zeroize();
}

/// Element-wise product of `W::BITS` tower elements through a bit-sliced block.
///
/// `lhs`, `rhs` and `out` must each hold exactly `W::BITS` elements.
pub fn multiply<W: Word>(lhs: &[u128], rhs: &[u128], out: &mut [u128]) -> Result<()> {
    let expected = W::BITS as usize;
    for got in [lhs.len(), rhs.len(), out.len()] {
        if got != expected {
            return Err(Error::InvalidBatchLength { expected, got });
        }
    }
    multiply_unchecked::<W>(lhs, rhs, out);
    Ok(())
}

/// Element-wise product of 64 tower elements with [`DefaultWord`] words.
///
/// Agrees with [`crate::batch::multiply_64x128b`] on every input.
pub fn multiply_64x128b_bitsliced(
    lhs: &[u128; BATCH_SIZE],
    rhs: &[u128; BATCH_SIZE],
) -> [u128; BATCH_SIZE] {
    let mut out = [0u128; BATCH_SIZE];
    multiply_unchecked::<DefaultWord>(lhs, rhs, &mut out);
    out
}
