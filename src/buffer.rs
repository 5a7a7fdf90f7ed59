//! Worst-case buffer sizing.
//!
//! All functions are O(1), allocation-free and saturate instead of wrapping,
//! so a bound is never smaller than the space a backend may need.

use crate::algorithm::Algorithm;

/// Stream header (8 bytes) plus original length (8) and CRC-32 (4).
pub const FRAME_SIZE: u64 = 20;

/// One 64-bit flag signature.
pub const SIGNATURE_SIZE: u64 = 8;

/// Slack added to a caller's estimate of the decompressed size.
pub const DECOMPRESS_MARGIN: u64 = 8;

const UNIT_SIZE: u64 = 4;
const SIGNATURE_BITS: u64 = 64;

impl Algorithm {
    /// Largest frame this algorithm can produce for `input_len` bytes: every
    /// unit stored plain under its longest flag code, plus the raw tail.
    pub fn max_compressed_size(self, input_len: u64) -> u64 {
        let flag_bits = (input_len / UNIT_SIZE).saturating_mul(self.max_flag_bits());
        let signatures = flag_bits.div_ceil(SIGNATURE_BITS);
        FRAME_SIZE
            .saturating_add(input_len)
            .saturating_add(signatures.saturating_mul(SIGNATURE_SIZE))
    }
}

/// Output length sufficient to compress `input_len` bytes under any algorithm.
pub fn compress_safe_size(input_len: u64) -> u64 {
    Algorithm::ALL
        .iter()
        .map(|algorithm| algorithm.max_compressed_size(input_len))
        .max()
        .unwrap_or(u64::MAX)
}

/// Output length sufficient to decompress data whose original size is
/// claimed to be `expected_len`. The claim is not checked here; a wrong one
/// surfaces as `OutputBufferTooSmall` at decompression time.
pub fn decompress_safe_size(expected_len: u64) -> u64 {
    expected_len.saturating_add(DECOMPRESS_MARGIN)
}
