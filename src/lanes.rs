// SPDX-License-Identifier: Apache-2.0 OR MIT

//! 16-lane GF(2^8) arithmetic on byte vectors.
//!
//! The only platform-specific piece is [`LookupBackend::lookup_16x8b`], a
//! 16-way lookup into a 256-entry table built from four 64-entry lookups.
//! Packed multiplication and zero masking sit on top of it and are shared by
//! every backend.

use crate::gf256::{ALPHA_MAP, EXP_TABLE, LOG_TABLE, Table};
use core::ops::{BitAnd, BitOr, BitXor, BitXorAssign, Mul, Not};
use rand::CryptoRng;
use subtle::{ConditionallySelectable, ConstantTimeEq, ConstantTimeGreater};
use zeroize::Zeroize;

/// Number of byte lanes in a [`LaneVector`].
pub const LANES: usize = 16;

/// Entries reachable by one native table-lookup instruction.
const QUADRANT: usize = 64;
/// `log2(QUADRANT)`: index bits above this select the quadrant.
const QUADRANT_BITS: u32 = QUADRANT.trailing_zeros();

/// Sixteen GF(2^8) elements processed together.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Zeroize)]
#[repr(C, align(16))]
pub struct LaneVector([u8; LANES]);

impl LaneVector {
    /// All lanes zero.
    pub const ZERO: Self = Self([0; LANES]);

    /// Every lane set to `value`.
    pub const fn splat(value: u8) -> Self {
        Self([value; LANES])
    }

    /// Build from lane bytes, lane 0 first.
    pub const fn from_bytes(bytes: [u8; LANES]) -> Self {
        Self(bytes)
    }

    /// The lane bytes, lane 0 first.
    pub const fn to_bytes(self) -> [u8; LANES] {
        self.0
    }

    /// Lane 0 is the least significant byte.
    pub const fn from_u128(value: u128) -> Self {
        Self(value.to_le_bytes())
    }

    /// Inverse of [`LaneVector::from_u128`].
    pub const fn to_u128(self) -> u128 {
        u128::from_le_bytes(self.0)
    }

    /// Fill every lane from `rng`.
    pub fn random(rng: &mut impl CryptoRng) -> Self {
        let mut bytes = [0u8; LANES];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Multiply every lane by the extension constant.
    #[inline]
    pub fn mul_alpha(self) -> Self {
        packed_multiply_constant::<DefaultBackend>(self)
    }

    #[inline]
    fn map2(self, rhs: Self, f: impl Fn(u8, u8) -> u8) -> Self {
        Self(core::array::from_fn(|i| f(self.0[i], rhs.0[i])))
    }

    #[inline]
    fn wrapping_add(self, rhs: Self) -> Self {
        self.map2(rhs, u8::wrapping_add)
    }

    #[inline]
    fn wrapping_sub(self, rhs: Self) -> Self {
        self.map2(rhs, u8::wrapping_sub)
    }

    /// 0xFF in every lane where `self > rhs`, else 0.
    #[inline]
    fn gt_mask(self, rhs: Self) -> Self {
        self.map2(rhs, |a, b| u8::conditional_select(&0, &0xff, a.ct_gt(&b)))
    }

    /// 0xFF in every lane that is zero, else 0.
    #[inline]
    fn eq_zero_mask(self) -> Self {
        self.map2(Self::ZERO, |a, z| u8::conditional_select(&0, &0xff, a.ct_eq(&z)))
    }
}

impl From<[u8; LANES]> for LaneVector {
    fn from(bytes: [u8; LANES]) -> Self {
        Self(bytes)
    }
}

impl From<LaneVector> for [u8; LANES] {
    fn from(lanes: LaneVector) -> Self {
        lanes.0
    }
}

impl AsRef<[u8]> for LaneVector {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl core::fmt::Debug for LaneVector {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("LaneVector").field(&hex::encode(self.0)).finish()
    }
}

impl BitXor for LaneVector {
    type Output = Self;

    #[inline]
    fn bitxor(self, rhs: Self) -> Self {
        self.map2(rhs, |a, b| a ^ b)
    }
}

impl BitXorAssign for LaneVector {
    #[inline]
    fn bitxor_assign(&mut self, rhs: Self) {
        *self = *self ^ rhs;
    }
}

impl BitAnd for LaneVector {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        self.map2(rhs, |a, b| a & b)
    }
}

impl BitOr for LaneVector {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        self.map2(rhs, |a, b| a | b)
    }
}

impl Not for LaneVector {
    type Output = Self;

    #[inline]
    fn not(self) -> Self {
        Self(self.0.map(|a| !a))
    }
}

impl Mul for LaneVector {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        packed_multiply::<DefaultBackend>(self, rhs)
    }
}

/// A 16-lane lookup into a 256-entry table.
pub trait LookupBackend: Copy + Default + core::fmt::Debug + Send + Sync + 'static {
    /// Human-readable name of this backend.
    const NAME: &'static str;

    /// `result[i] = table[indices[i]]` for every lane.
    fn lookup_16x8b(table: &Table, indices: LaneVector) -> LaneVector;
}

/// Lookup built from an emulated 64-entry table instruction.
#[derive(Debug, Clone, Copy, Default)]
pub struct Portable;

/// 64-entry lookup; lanes with an index of 64 or more yield 0.
#[inline]
fn lookup_64(quadrant: &[u8], indices: LaneVector) -> LaneVector {
    LaneVector(indices.0.map(|idx| {
        let in_range = (idx >> QUADRANT_BITS).ct_eq(&0);
        u8::conditional_select(&0, &quadrant[usize::from(idx) % QUADRANT], in_range)
    }))
}

impl LookupBackend for Portable {
    const NAME: &'static str = "portable";

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    fn lookup_16x8b(table: &Table, indices: LaneVector) -> LaneVector {
        // Shifting the index by q * 0x40 moves quadrant q into 0..64 and
        // every other quadrant out of range, so exactly one term is live.
        table
            .chunks_exact(QUADRANT)
            .enumerate()
            .fold(LaneVector::ZERO, |acc, (q, quadrant)| {
                let shifted = indices ^ LaneVector::splat((q * QUADRANT) as u8);
                acc ^ lookup_64(quadrant, shifted)
            })
    }
}

/// Lookup through the NEON `tbl` instruction over four registers.
#[cfg(target_arch = "aarch64")]
#[derive(Debug, Clone, Copy, Default)]
pub struct Neon;

#[cfg(target_arch = "aarch64")]
impl LookupBackend for Neon {
    const NAME: &'static str = "neon";

    #[inline]
    fn lookup_16x8b(table: &Table, indices: LaneVector) -> LaneVector {
        use core::arch::aarch64::{
            vdupq_n_u8, veorq_u8, vld1q_u8, vld1q_u8_x4, vqtbl4q_u8, vst1q_u8,
        };

        let mut out = [0u8; LANES];
        // SAFETY: NEON is part of the aarch64 baseline. Each `vld1q_u8_x4`
        // reads 64 bytes starting at a multiple of 64 inside `table`, and the
        // single-register load and store touch exactly `LANES` bytes.
        unsafe {
            let x = vld1q_u8(indices.0.as_ptr());
            let t = table.as_ptr();
            let y0 = vqtbl4q_u8(vld1q_u8_x4(t), x);
            let y1 = vqtbl4q_u8(vld1q_u8_x4(t.add(64)), veorq_u8(x, vdupq_n_u8(0x40)));
            let y2 = vqtbl4q_u8(vld1q_u8_x4(t.add(128)), veorq_u8(x, vdupq_n_u8(0x80)));
            let y3 = vqtbl4q_u8(vld1q_u8_x4(t.add(192)), veorq_u8(x, vdupq_n_u8(0xc0)));
            vst1q_u8(out.as_mut_ptr(), veorq_u8(veorq_u8(y0, y1), veorq_u8(y2, y3)));
        }
        LaneVector(out)
    }
}

/// Backend selected for the target.
#[cfg(all(target_arch = "aarch64", not(feature = "portable")))]
pub type DefaultBackend = Neon;

/// Backend selected for the target.
#[cfg(not(all(target_arch = "aarch64", not(feature = "portable"))))]
pub type DefaultBackend = Portable;

/// 16 independent lookups of `indices` into `table`.
#[inline]
pub fn lane_lookup<B: LookupBackend>(table: &Table, indices: LaneVector) -> LaneVector {
    B::lookup_16x8b(table, indices)
}

/// Lane-wise GF(2^8) product, equal to 16 scalar [`crate::gf256::multiply`] calls.
#[inline]
pub fn packed_multiply<B: LookupBackend>(a: LaneVector, b: LaneVector) -> LaneVector {
    let log_a = B::lookup_16x8b(&LOG_TABLE, a);
    let log_b = B::lookup_16x8b(&LOG_TABLE, b);

    // A lane wrapped mod 256 iff its sum dropped below `log_a`. The mask is
    // all-ones there, so subtracting it adds the 1 that mod 255 needs.
    let sum = log_a.wrapping_add(log_b);
    let overflow = log_a.gt_mask(sum);
    let log_c = sum.wrapping_sub(overflow);

    let c = B::lookup_16x8b(&EXP_TABLE, log_c);
    let a_or_b_is_zero = a.eq_zero_mask() | b.eq_zero_mask();
    c & !a_or_b_is_zero
}

/// Lane-wise multiply by the extension constant.
#[inline]
pub fn packed_multiply_constant<B: LookupBackend>(b: LaneVector) -> LaneVector {
    B::lookup_16x8b(&ALPHA_MAP, b)
}
