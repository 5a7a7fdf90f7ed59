//! # Density
//!
//! A byte-stream compression engine with three interchangeable algorithms
//! and two usage modes.
//!
//! ## Features
//!
//! - **Three algorithms**: Chameleon (fastest), Cheetah and Lion (best ratio),
//!   selected explicitly on every call
//! - **One-shot calls**: stateless and safe to run in parallel
//! - **Contexts**: a compression or decompression context carries an adaptive
//!   dictionary from one call to the next
//! - **Safe sizing**: worst-case output sizes are known before any call, and
//!   an undersized buffer is reported rather than grown
//! - **Integrity**: every frame carries a CRC-32 of the original bytes
//!
//! ## Quick Start
//!
//! ### One-shot compression
//!
//! ```rust
//! use density::{compress, decompress, decompress_safe_size, Algorithm};
//!
//! let original = b"Hello, world! Hello, world! Hello, world!";
//! let compressed = compress(original, Algorithm::Cheetah).unwrap();
//! let restored = decompress(&compressed, decompress_safe_size(original.len() as u64)).unwrap();
//! assert_eq!(original.to_vec(), restored);
//! ```
//!
//! ### Contexts
//!
//! ```rust
//! use density::{compress_with_context, decompress_with_context, decompress_safe_size};
//! use density::{prepare_compression, prepare_decompression, Algorithm};
//!
//! let chunks: [&[u8]; 2] = [b"first chunk of related data", b"second chunk of related data"];
//!
//! let mut compressor = prepare_compression(Algorithm::Lion, true).unwrap();
//! let frames: Vec<Vec<u8>> = chunks
//!     .iter()
//!     .map(|chunk| compress_with_context(&mut compressor, chunk).unwrap())
//!     .collect();
//! compressor.release().unwrap();
//!
//! let mut decompressor = prepare_decompression(&frames[0], true).unwrap();
//! for (frame, chunk) in frames.iter().zip(chunks) {
//!     let size = decompress_safe_size(chunk.len() as u64);
//!     assert_eq!(decompress_with_context(&mut decompressor, frame, size).unwrap(), chunk);
//! }
//! ```

pub mod algorithm;
pub mod allocator;
pub mod backend;
pub mod buffer;
pub mod cli;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod state;

// Re-export commonly used types for convenience
pub use algorithm::{dictionary_size_for, dictionary_size_for_id, Algorithm, IntoAlgorithm};
pub use allocator::{DictionaryAllocator, HeapAllocator};
pub use backend::{CodecBackend, DensityBackend, Version};
pub use buffer::{compress_safe_size, decompress_safe_size};
pub use config::DensityConfig;
pub use context::{CompressionContext, DecompressionContext};
pub use engine::{Engine, FrameInfo};
pub use error::{DensityError, Result};
pub use state::{describe, ProcessingResult, ResultState};

use std::sync::OnceLock;

/// Engine behind the free functions: built-in backend, heap allocator.
pub fn default_engine() -> &'static Engine {
    static ENGINE: OnceLock<Engine> = OnceLock::new();
    ENGINE.get_or_init(Engine::new)
}

/// Compresses `input` with `algorithm`, returning exactly the compressed bytes.
///
/// ```rust
/// let compressed = density::compress(b"abcdabcdabcdabcd", "chameleon").unwrap();
/// assert!(compressed.len() as u64 <= density::compress_safe_size(16));
/// ```
pub fn compress<A: IntoAlgorithm>(input: &[u8], algorithm: A) -> Result<Vec<u8>> {
    default_engine().compress(input, algorithm)
}

pub fn compress_into<A: IntoAlgorithm>(
    input: &[u8],
    output: &mut [u8],
    algorithm: A,
) -> Result<usize> {
    default_engine().compress_into(input, output, algorithm)
}

/// Decompresses into a buffer of `safe_size` bytes.
pub fn decompress(input: &[u8], safe_size: u64) -> Result<Vec<u8>> {
    default_engine().decompress(input, safe_size)
}

pub fn decompress_into(input: &[u8], output: &mut [u8]) -> Result<usize> {
    default_engine().decompress_into(input, output)
}

pub fn prepare_compression<A: IntoAlgorithm>(
    algorithm: A,
    use_custom_dictionary: bool,
) -> Result<CompressionContext> {
    default_engine().prepare_compression(algorithm, use_custom_dictionary)
}

pub fn prepare_decompression(
    header: &[u8],
    use_custom_dictionary: bool,
) -> Result<DecompressionContext> {
    default_engine().prepare_decompression(header, use_custom_dictionary)
}

pub fn compress_with_context(context: &mut CompressionContext, input: &[u8]) -> Result<Vec<u8>> {
    default_engine().compress_with_context(context, input)
}

pub fn decompress_with_context(
    context: &mut DecompressionContext,
    input: &[u8],
    safe_size: u64,
) -> Result<Vec<u8>> {
    default_engine().decompress_with_context(context, input, safe_size)
}

pub fn compress_with_config(input: &[u8], config: &DensityConfig) -> Result<Vec<u8>> {
    default_engine().compress_with_config(input, config)
}

/// Reads the header of a compressed frame.
pub fn frame_info(compressed: &[u8]) -> Result<FrameInfo> {
    default_engine().frame_info(compressed)
}

pub fn version() -> Version {
    default_engine().version()
}

pub fn major_version() -> u8 {
    default_engine().major_version()
}

pub fn minor_version() -> u8 {
    default_engine().minor_version()
}

pub fn revision_version() -> u8 {
    default_engine().revision_version()
}
