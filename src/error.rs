// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for slicing and batch multiplication.

/// Errors that can occur when addressing caller-supplied buffers.
///
/// The arithmetic itself is total; every variant here describes a buffer
/// or parameter that does not satisfy a documented shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A stride of zero block-widths, or one whose row offsets overflow `usize`.
    #[error("invalid stride: width to adjacent block must be at least 1 and addressable")]
    InvalidStride,
    /// A strided block buffer is too short for the requested stride.
    #[error("block buffer too short: expected at least {expected} words, got {got}")]
    BufferTooShort {
        /// Minimum number of words.
        expected: usize,
        /// Actual number of words.
        got: usize,
    },
    /// A batch did not contain exactly one element per word bit.
    #[error("invalid batch length: expected {expected} elements, got {got}")]
    InvalidBatchLength {
        /// Expected number of elements.
        expected: usize,
        /// Actual number of elements.
        got: usize,
    },
}

/// Result type alias using [`Error`].
pub type Result<T> = core::result::Result<T, Error>;
