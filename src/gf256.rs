// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scalar GF(2^8) arithmetic in the binary tower basis.
//!
//! GF(2^8) is built as GF(2) ⊂ GF(4) ⊂ GF(16) ⊂ GF(256), each level adjoining
//! `X_{k+1}` with `X_{k+1}^2 = X_{k+1} * X_k + 1`. Multiplication uses
//! discrete log/antilog tables for the generator [`GENERATOR`]; the
//! multiply-by-[`ALPHA`] shortcut used one level up is a direct table.

use subtle::{ConditionallySelectable, ConstantTimeEq, ConstantTimeGreater};

/// Entries in every lookup table.
pub const TABLE_SIZE: usize = 256;

/// A 256-entry byte lookup table.
pub type Table = [u8; TABLE_SIZE];

/// Order of the multiplicative group GF(2^8)*.
pub const GROUP_ORDER: u16 = 255;

/// Multiplicative generator used for the log/exp tables.
pub const GENERATOR: u8 = 0x13;

/// Extension constant of GF(2^8): the tower element `X_3`.
pub const ALPHA: u8 = 0x10;

/// Carry-free tower multiplication of two `bits`-wide elements.
///
/// Karatsuba over halves, down to GF(2) where the product is `AND`.
pub(crate) const fn tower_mul(a: u8, b: u8, bits: u32) -> u8 {
    if bits == 1 {
        return a & b;
    }
    let half = bits / 2;
    let mask = (1u8 << half) - 1;
    let (a0, a1) = (a & mask, a >> half);
    let (b0, b1) = (b & mask, b >> half);
    let z0 = tower_mul(a0, b0, half);
    let z2 = tower_mul(a1, b1, half);
    let z1 = tower_mul(a0 ^ a1, b0 ^ b1, half) ^ z0 ^ z2;
    (z0 ^ z2) | ((z1 ^ tower_mul_alpha(z2, half)) << half)
}

/// Multiply a `bits`-wide element by its level's generator.
pub(crate) const fn tower_mul_alpha(a: u8, bits: u32) -> u8 {
    if bits == 1 {
        return a;
    }
    let half = bits / 2;
    let mask = (1u8 << half) - 1;
    let (a0, a1) = (a & mask, a >> half);
    a1 | ((a0 ^ tower_mul_alpha(a1, half)) << half)
}

const fn build_exp_table() -> Table {
    let mut table = [0u8; TABLE_SIZE];
    let mut x = 1u8;
    let mut i = 0;
    while i < TABLE_SIZE {
        table[i] = x;
        x = tower_mul(x, GENERATOR, 8);
        i += 1;
    }
    table
}

#[allow(clippy::cast_possible_truncation)]
const fn build_log_table(exp: &Table) -> Table {
    // log[0] stays 0; it is never used for a nonzero product
    let mut table = [0u8; TABLE_SIZE];
    let mut i = 0;
    while i < GROUP_ORDER as usize {
        table[exp[i] as usize] = i as u8;
        i += 1;
    }
    table
}

#[allow(clippy::cast_possible_truncation)]
const fn build_alpha_map() -> Table {
    let mut table = [0u8; TABLE_SIZE];
    let mut i = 0;
    while i < TABLE_SIZE {
        table[i] = tower_mul(i as u8, ALPHA, 8);
        i += 1;
    }
    table
}

/// `EXP_TABLE[i] = GENERATOR^i`; entry 255 wraps back to 1.
pub const EXP_TABLE: Table = build_exp_table();

/// `LOG_TABLE[x]` is the discrete log of nonzero `x`; `LOG_TABLE[0]` is 0.
pub const LOG_TABLE: Table = build_log_table(&EXP_TABLE);

/// `ALPHA_MAP[x] = x * ALPHA`.
pub const ALPHA_MAP: Table = build_alpha_map();

/// Multiply two GF(2^8) elements through log/exp tables.
///
/// Returns 0 when either operand is 0. Exponent sums are reduced modulo
/// [`GROUP_ORDER`]; the largest sum is 508, so one subtraction is enough.
#[inline]
pub fn multiply(lhs: u8, rhs: u8, log_table: &Table, exp_table: &Table) -> u8 {
    let sum = u16::from(log_table[usize::from(lhs)]) + u16::from(log_table[usize::from(rhs)]);
    let wrapped = sum.ct_gt(&(GROUP_ORDER - 1));
    let index = sum - u16::conditional_select(&0, &GROUP_ORDER, wrapped);
    let product = exp_table[usize::from(index)];
    let either_zero = lhs.ct_eq(&0) | rhs.ct_eq(&0);
    u8::conditional_select(&product, &0, either_zero)
}

/// Multiply by the extension constant with a single table lookup.
#[inline]
pub fn multiply_constant(rhs: u8, alpha_map: &Table) -> u8 {
    alpha_map[usize::from(rhs)]
}

/// [`multiply`] with the crate's tables.
#[inline]
pub fn mul(lhs: u8, rhs: u8) -> u8 {
    multiply(lhs, rhs, &LOG_TABLE, &EXP_TABLE)
}

/// [`multiply_constant`] with [`ALPHA_MAP`].
#[inline]
pub fn mul_alpha(rhs: u8) -> u8 {
    multiply_constant(rhs, &ALPHA_MAP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exp_table_literals() {
        assert_eq!(
            EXP_TABLE[..16],
            [
                0x01, 0x13, 0x43, 0x66, 0xAB, 0x8C, 0x60, 0xC6, 0x91, 0xCA, 0x59, 0xB2, 0x6A,
                0x63, 0xF4, 0x53,
            ]
        );
        assert_eq!(
            EXP_TABLE[240..],
            [
                0x5E, 0xCC, 0x34, 0xAF, 0xC0, 0xFC, 0xD7, 0xF3, 0x2D, 0x49, 0xC3, 0xCE, 0x15,
                0x2E, 0x7B, 0x01,
            ]
        );
    }

    #[test]
    fn log_table_literals() {
        assert_eq!(
            LOG_TABLE[..16],
            [
                0x00, 0x00, 0xAA, 0x55, 0xCC, 0xBB, 0x33, 0xEE, 0x77, 0x99, 0x66, 0xDD, 0x22,
                0x88, 0x44, 0x11,
            ]
        );
        assert_eq!(
            LOG_TABLE[240..],
            [
                0xE3, 0x21, 0x64, 0xF7, 0x0E, 0x9E, 0xEA, 0x5F, 0x7F, 0x46, 0x12, 0x3E, 0xF5,
                0xAE, 0xE9, 0xE0,
            ]
        );
    }

    #[test]
    fn alpha_map_literals() {
        assert_eq!(
            ALPHA_MAP[..16],
            [
                0x00, 0x10, 0x20, 0x30, 0x40, 0x50, 0x60, 0x70, 0x80, 0x90, 0xa0, 0xb0, 0xc0,
                0xd0, 0xe0, 0xf0,
            ]
        );
        assert_eq!(
            ALPHA_MAP[16..32],
            [
                0x41, 0x51, 0x61, 0x71, 0x01, 0x11, 0x21, 0x31, 0xc1, 0xd1, 0xe1, 0xf1, 0x81,
                0x91, 0xa1, 0xb1,
            ]
        );
        assert_eq!(ALPHA_MAP[255], 0x4f);
    }

    #[test]
    fn exp_inverts_log() {
        for x in 1..=255u8 {
            assert_eq!(EXP_TABLE[usize::from(LOG_TABLE[usize::from(x)])], x);
        }
    }

    #[test]
    fn exp_table_is_a_permutation_of_nonzero_bytes() {
        let mut seen = [false; TABLE_SIZE];
        for &x in &EXP_TABLE[..255] {
            assert_ne!(x, 0);
            assert!(!seen[usize::from(x)], "duplicate {x:#04x}");
            seen[usize::from(x)] = true;
        }
    }

    #[test]
    fn zero_absorbs() {
        for a in 0..=255u8 {
            assert_eq!(mul(a, 0), 0);
            assert_eq!(mul(0, a), 0);
        }
    }

    #[test]
    fn one_is_identity() {
        assert_eq!(LOG_TABLE[1], 0);
        assert_eq!(mul(1, 1), EXP_TABLE[0]);
        assert_eq!(mul(1, 1), 0x01);
        for a in 0..=255u8 {
            assert_eq!(mul(a, 1), a);
        }
    }

    #[test]
    fn commutative() {
        for a in 0..=255u8 {
            for b in a..=255u8 {
                assert_eq!(mul(a, b), mul(b, a));
            }
        }
    }

    #[test]
    fn distributes_over_xor() {
        for a in (0..=255u8).step_by(7) {
            for b in 0..=255u8 {
                for c in (0..=255u8).step_by(13) {
                    assert_eq!(mul(a, b ^ c), mul(a, b) ^ mul(a, c));
                }
            }
        }
    }

    #[test]
    fn table_product_matches_tower_product() {
        for a in 0..=255u8 {
            for b in 0..=255u8 {
                assert_eq!(mul(a, b), tower_mul(a, b, 8), "{a:#04x} * {b:#04x}");
            }
        }
    }

    #[test]
    fn alpha_map_matches_multiply() {
        assert_eq!(multiply_constant(0, &ALPHA_MAP), 0);
        for r in 0..=255u8 {
            assert_eq!(
                multiply_constant(r, &ALPHA_MAP),
                multiply(r, ALPHA, &LOG_TABLE, &EXP_TABLE)
            );
            assert_eq!(mul_alpha(r), tower_mul_alpha(r, 8));
        }
    }

    #[test]
    fn wrapped_exponent_sum() {
        // log(0xE0) + log(0xE0) = 0xE0 * 2 = 448 > 254
        let x = EXP_TABLE[0xE0];
        assert_eq!(mul(x, x), EXP_TABLE[(0xE0 * 2) % 255]);
    }
}
