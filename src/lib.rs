// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bit/byte-slicing transposes and table-driven binary tower multiplication.
//!
//! This crate multiplies batches of 128-bit elements of the binary tower
//! field built over GF(2^8). It provides two cooperating pieces:
//!
//! - a slicing engine that moves a batch between the plain per-element
//!   layout and a sliced layout, either per bit ([`transpose`]) or per byte
//!   ([`byte_slice`]);
//! - GF(2^8) arithmetic from discrete log/antilog tables ([`gf256`]) and its
//!   16-lane packed form ([`lanes`]), used as the base case of the tower.
//!
//! Two batch strategies sit on top:
//!
//! - [`multiply_64x128b`] byte-slices the batch and runs the tower
//!   recursion on 16-lane GF(2^8) products;
//! - [`multiply_64x128b_bitsliced`] bit-slices the batch and runs the
//!   recursion down to GF(2) with plain word operations.
//!
//! Both agree with the scalar reference [`TowerField128b`].
//!
//! # Example
//!
//! ```
//! use tower_slice::{BATCH_SIZE, TowerField128b, multiply_64x128b, multiply_64x128b_bitsliced};
//!
//! let mut rng = rand::rng();
//! let lhs: [u128; BATCH_SIZE] =
//!     core::array::from_fn(|_| TowerField128b::random(&mut rng).value());
//! let rhs: [u128; BATCH_SIZE] =
//!     core::array::from_fn(|_| TowerField128b::random(&mut rng).value());
//!
//! let products = multiply_64x128b(&lhs, &rhs);
//! assert_eq!(products, multiply_64x128b_bitsliced(&lhs, &rhs));
//! for i in 0..BATCH_SIZE {
//!     let expected = TowerField128b::new(lhs[i]) * TowerField128b::new(rhs[i]);
//!     assert_eq!(products[i], expected.value());
//! }
//! ```

pub mod batch;
pub mod bitsliced;
pub mod byte_slice;
pub mod error;
pub mod gf256;
pub mod lanes;
pub mod tower;
pub mod transpose;
pub mod word;

pub use batch::{BATCH_SIZE, multiply_64x128b, multiply_64x128b_with};
pub use bitsliced::multiply_64x128b_bitsliced;
pub use byte_slice::{ByteSlicedRows, byte_slice, un_byte_slice};
pub use error::{Error, Result};
pub use lanes::{DefaultBackend, LANES, LaneVector, LookupBackend, Portable};
pub use tower::TowerField128b;
pub use transpose::{
    SLICED_WORDS, SlicedBlock, Stride, transpose, transpose_dst, transpose_rev, transpose_rev_dst,
};
pub use word::{DefaultWord, Word};
