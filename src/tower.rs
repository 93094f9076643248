// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scalar GF(2^128) arithmetic over the GF(2^8) tower base.
//!
//! A `2n`-bit element is `hi * X + lo` with `n`-bit halves, `lo` in the low
//! bits. Each level adjoins `X` with `X^2 = X * alpha + 1`, where `alpha` is
//! the generator of the level below, down to [`crate::gf256::ALPHA`] at
//! GF(2^8). Byte `b` of the little-endian encoding is therefore a GF(2^8)
//! coefficient, which is what the byte-sliced batch path relies on.

use crate::gf256;
use core::ops::{Add, AddAssign, Mul, MulAssign, Sub, SubAssign};
use rand::CryptoRng;
use zeroize::Zeroize;

/// Bits in the base field.
const BASE_BITS: u32 = 8;

/// Karatsuba product of two `bits`-wide tower elements.
#[allow(clippy::cast_possible_truncation)]
fn mul_bits(a: u128, b: u128, bits: u32) -> u128 {
    if bits == BASE_BITS {
        return u128::from(gf256::mul(a as u8, b as u8));
    }
    let half = bits / 2;
    let mask = (1u128 << half) - 1;
    let (a0, a1) = (a & mask, a >> half);
    let (b0, b1) = (b & mask, b >> half);
    let z0 = mul_bits(a0, b0, half);
    let z2 = mul_bits(a1, b1, half);
    let z1 = mul_bits(a0 ^ a1, b0 ^ b1, half) ^ z0 ^ z2;
    (z0 ^ z2) | ((z1 ^ mul_alpha_bits(z2, half)) << half)
}

/// Product of a `bits`-wide element with its level's generator.
#[allow(clippy::cast_possible_truncation)]
fn mul_alpha_bits(a: u128, bits: u32) -> u128 {
    if bits == BASE_BITS {
        return u128::from(gf256::mul_alpha(a as u8));
    }
    let half = bits / 2;
    let mask = (1u128 << half) - 1;
    let (a0, a1) = (a & mask, a >> half);
    a1 | ((a0 ^ mul_alpha_bits(a1, half)) << half)
}

/// An element of the 128-bit binary tower field.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Zeroize)]
pub struct TowerField128b(u128);

impl TowerField128b {
    /// Bits per element.
    pub const BITS: u32 = 128;
    /// The additive identity.
    pub const ZERO: Self = Self(0);
    /// The multiplicative identity.
    pub const ONE: Self = Self(1);

    /// Wrap a raw 128-bit value.
    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    /// The raw 128-bit value.
    pub const fn value(self) -> u128 {
        self.0
    }

    /// Multiply by the generator of the top extension.
    pub fn mul_alpha(self) -> Self {
        Self(mul_alpha_bits(self.0, Self::BITS))
    }

    /// `self * self`.
    pub fn square(self) -> Self {
        self * self
    }

    /// A uniformly random element.
    pub fn random(rng: &mut impl CryptoRng) -> Self {
        let mut bytes = [0u8; 16];
        rng.fill_bytes(&mut bytes);
        let value = u128::from_le_bytes(bytes);
        bytes.zeroize();
        Self(value)
    }
}

impl From<u128> for TowerField128b {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl From<TowerField128b> for u128 {
    fn from(element: TowerField128b) -> Self {
        element.0
    }
}

impl core::fmt::Debug for TowerField128b {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "TowerField128b({:#034x})", self.0)
    }
}

impl Add for TowerField128b {
    type Output = Self;

    #[allow(clippy::suspicious_arithmetic_impl)]
    fn add(self, rhs: Self) -> Self {
        Self(self.0 ^ rhs.0)
    }
}

impl AddAssign for TowerField128b {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for TowerField128b {
    type Output = Self;

    #[allow(clippy::suspicious_arithmetic_impl)]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 ^ rhs.0)
    }
}

impl SubAssign for TowerField128b {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul for TowerField128b {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self(mul_bits(self.0, rhs.0, Self::BITS))
    }
}

impl MulAssign for TowerField128b {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}
