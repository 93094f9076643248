// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Byte-sliced multiplication of 64 independent 128-bit tower elements.
//!
//! The batch is processed as four groups of [`LANES`] elements. Each group is
//! byte-sliced so that row `b` holds coefficient `b` of every element; the
//! tower recursion then runs on whole rows, with every GF(2^8) product and
//! every multiply-by-alpha done sixteen lanes at a time.

use crate::byte_slice::{ByteSlicedRows, byte_slice, un_byte_slice};
use crate::lanes::{
    DefaultBackend, LANES, LaneVector, LookupBackend, packed_multiply, packed_multiply_constant,
};
use crate::word::BLOCK_BYTES;
use zeroize::Zeroize;

/// Elements per call of [`multiply_64x128b`].
pub const BATCH_SIZE: usize = 64;

/// Largest half-width, in rows, seen by the recursion.
const MAX_HALF: usize = BLOCK_BYTES / 2;

/// `dst = a * b` over rows of GF(2^8) coefficients, `a.len()` a power of two.
fn mul_rows<B: LookupBackend>(a: &[LaneVector], b: &[LaneVector], dst: &mut [LaneVector]) {
    let n = a.len();
    if n == 1 {
        dst[0] = packed_multiply::<B>(a[0], b[0]);
        return;
    }
    let half = n / 2;
    let (a0, a1) = a.split_at(half);
    let (b0, b1) = b.split_at(half);

    let mut sum_a = [LaneVector::ZERO; MAX_HALF];
    let mut sum_b = [LaneVector::ZERO; MAX_HALF];
    let mut z2 = [LaneVector::ZERO; MAX_HALF];
    let mut alpha_z2 = [LaneVector::ZERO; MAX_HALF];
    for i in 0..half {
        sum_a[i] = a0[i] ^ a1[i];
        sum_b[i] = b0[i] ^ b1[i];
    }

    let (lo, hi) = dst.split_at_mut(half);
    mul_rows::<B>(a0, b0, lo);
    mul_rows::<B>(a1, b1, &mut z2[..half]);
    mul_rows::<B>(&sum_a[..half], &sum_b[..half], hi);
    mul_alpha_rows::<B>(&z2[..half], &mut alpha_z2[..half]);

    // lo = z0 + z2, hi = (a0 + a1)(b0 + b1) + z0 + z2 + alpha * z2
    for i in 0..half {
        hi[i] ^= lo[i] ^ z2[i] ^ alpha_z2[i];
        lo[i] ^= z2[i];
    }

    sum_a.zeroize();
    sum_b.zeroize();
    z2.zeroize();
    alpha_z2.zeroize();
}

/// `dst = alpha * a` where alpha generates the level of `a`.
fn mul_alpha_rows<B: LookupBackend>(a: &[LaneVector], dst: &mut [LaneVector]) {
    let n = a.len();
    if n == 1 {
        dst[0] = packed_multiply_constant::<B>(a[0]);
        return;
    }
    let half = n / 2;
    let (a0, a1) = a.split_at(half);
    let (lo, hi) = dst.split_at_mut(half);
    lo.copy_from_slice(a1);
    mul_alpha_rows::<B>(a1, hi);
    for (h, &x) in hi.iter_mut().zip(a0) {
        *h ^= x;
    }
}

/// Multiply two byte-sliced groups of 16 elements.
pub fn multiply_sliced_rows<B: LookupBackend>(
    lhs: &ByteSlicedRows,
    rhs: &ByteSlicedRows,
) -> ByteSlicedRows {
    let mut out = [LaneVector::ZERO; BLOCK_BYTES];
    mul_rows::<B>(lhs, rhs, &mut out);
    out
}

/// Element-wise product of 16 elements through backend `B`.
pub fn multiply_16x128b_with<B: LookupBackend>(
    lhs: &[u128; LANES],
    rhs: &[u128; LANES],
) -> [u128; LANES] {
    let mut a = byte_slice(lhs);
    let mut b = byte_slice(rhs);
    let mut c = multiply_sliced_rows::<B>(&a, &b);
    let out = un_byte_slice(&c);
    a.zeroize();
    b.zeroize();
    c.zeroize();
    out
}

/// Element-wise product of 64 elements through backend `B`.
pub fn multiply_64x128b_with<B: LookupBackend>(
    lhs: &[u128; BATCH_SIZE],
    rhs: &[u128; BATCH_SIZE],
) -> [u128; BATCH_SIZE] {
    let _span = tracing::trace_span!("multiply_64x128b", strategy = "byte-sliced", backend = B::NAME)
        .entered();

    let mut out = [0u128; BATCH_SIZE];
    for ((dst, a), b) in out
        .chunks_exact_mut(LANES)
        .zip(lhs.chunks_exact(LANES))
        .zip(rhs.chunks_exact(LANES))
    {
        let mut group_a = [0u128; LANES];
        let mut group_b = [0u128; LANES];
        group_a.copy_from_slice(a);
        group_b.copy_from_slice(b);
        dst.copy_from_slice(&multiply_16x128b_with::<B>(&group_a, &group_b));
        group_a.zeroize();
        group_b.zeroize();
    }
    out
}

/// Element-wise product of 64 independent 128-bit tower elements.
///
/// `out[i] = lhs[i] * rhs[i]` for every `i`, computed with the
/// [`DefaultBackend`] lookup.
pub fn multiply_64x128b(lhs: &[u128; BATCH_SIZE], rhs: &[u128; BATCH_SIZE]) -> [u128; BATCH_SIZE] {
    multiply_64x128b_with::<DefaultBackend>(lhs, rhs)
}
