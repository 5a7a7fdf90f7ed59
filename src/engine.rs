use crate::algorithm::{Algorithm, IntoAlgorithm};
use crate::allocator::{DictionaryAllocator, HeapAllocator};
use crate::backend::{CodecBackend, DensityBackend, FrameHeader, Version};
use crate::config::DensityConfig;
use crate::context::{CompressionContext, DecompressionContext};
use crate::error::{DensityError, Result};
use crate::state::ResultState;
use std::fmt;
use std::sync::Arc;

/// Summary of a compressed frame, read without decompressing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    pub version: Version,
    pub algorithm: Algorithm,
    pub original_size: u64,
    pub compressed_size: u64,
}

impl FrameInfo {
    pub fn compression_ratio(&self) -> f64 {
        if self.compressed_size == 0 {
            return 0.0;
        }
        self.original_size as f64 / self.compressed_size as f64
    }
}

/// Runs one-shot and context-based operations against a [`CodecBackend`].
///
/// Every call is synchronous. One-shot calls share no mutable state, so an
/// engine can be used from many threads at once; a context must be used by
/// one caller at a time, which `&mut` enforces.
pub struct Engine<B: CodecBackend = DensityBackend> {
    backend: Arc<B>,
    allocator: Arc<dyn DictionaryAllocator>,
}

impl Engine<DensityBackend> {
    pub fn new() -> Self {
        Self::with_backend(DensityBackend::new())
    }

    /// Reads the frame header at the start of `compressed`.
    pub fn frame_info(&self, compressed: &[u8]) -> Result<FrameInfo> {
        let header = FrameHeader::parse(compressed).map_err(DensityError::from_state)?;
        Ok(FrameInfo {
            version: header.version,
            algorithm: header.algorithm,
            original_size: header.original_size,
            compressed_size: compressed.len() as u64,
        })
    }
}

impl Default for Engine<DensityBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: CodecBackend> Clone for Engine<B> {
    fn clone(&self) -> Self {
        Self { backend: Arc::clone(&self.backend), allocator: Arc::clone(&self.allocator) }
    }
}

impl<B: CodecBackend> fmt::Debug for Engine<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("version", &self.backend.version())
            .field("allocator", &self.allocator)
            .finish()
    }
}

impl<B: CodecBackend + 'static> Engine<B> {
    pub fn with_backend(backend: B) -> Self {
        Self { backend: Arc::new(backend), allocator: Arc::new(HeapAllocator) }
    }

    /// Replaces the allocator used for context dictionaries.
    pub fn with_allocator(mut self, allocator: Arc<dyn DictionaryAllocator>) -> Self {
        self.allocator = allocator;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn version(&self) -> Version {
        self.backend.version()
    }

    pub fn major_version(&self) -> u8 {
        self.version().major
    }

    pub fn minor_version(&self) -> u8 {
        self.version().minor
    }

    pub fn revision_version(&self) -> u8 {
        self.version().revision
    }

    pub fn compress_safe_size(&self, input_len: u64) -> u64 {
        self.backend.compress_safe_size(input_len)
    }

    pub fn decompress_safe_size(&self, expected_len: u64) -> u64 {
        self.backend.decompress_safe_size(expected_len)
    }

    pub fn dictionary_size(&self, algorithm: Algorithm) -> usize {
        self.backend.dictionary_size(algorithm)
    }

    /// Compresses `input` into a new buffer holding exactly the compressed bytes.
    ///
    /// The algorithm is validated before anything is allocated.
    pub fn compress<A: IntoAlgorithm>(&self, input: &[u8], algorithm: A) -> Result<Vec<u8>> {
        let algorithm = algorithm.into_algorithm()?;
        let mut output = output_buffer(self.compress_safe_size(input.len() as u64))?;
        let written = self.compress_into(input, &mut output, algorithm)?;
        output.truncate(written);
        Ok(output)
    }

    /// Compresses into `output`, whose length is the only bound. Returns the
    /// number of bytes written.
    pub fn compress_into<A: IntoAlgorithm>(
        &self,
        input: &[u8],
        output: &mut [u8],
        algorithm: A,
    ) -> Result<usize> {
        let algorithm = algorithm.into_algorithm()?;
        log::trace!(
            "compress {} bytes with {} into {} bytes",
            input.len(),
            algorithm,
            output.len()
        );
        let result = self.backend.compress(input, output, algorithm).into_result()?;
        Ok(result.bytes_written as usize)
    }

    /// Decompresses into a buffer of exactly `safe_size` bytes, usually
    /// [`decompress_safe_size`](Self::decompress_safe_size) of the expected
    /// length. A short estimate fails with
    /// [`DensityError::OutputBufferTooSmall`]; the buffer is never grown.
    pub fn decompress(&self, input: &[u8], safe_size: u64) -> Result<Vec<u8>> {
        let mut output = output_buffer(safe_size)?;
        let written = self.decompress_into(input, &mut output)?;
        output.truncate(written);
        Ok(output)
    }

    pub fn decompress_into(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        log::trace!("decompress {} bytes into {} bytes", input.len(), output.len());
        let result = self.backend.decompress(input, output).into_result()?;
        Ok(result.bytes_written as usize)
    }

    pub fn prepare_compression<A: IntoAlgorithm>(
        &self,
        algorithm: A,
        use_custom_dictionary: bool,
    ) -> Result<CompressionContext> {
        let algorithm = algorithm.into_algorithm()?;
        CompressionContext::prepare(
            algorithm,
            use_custom_dictionary,
            self.shared_backend(),
            Arc::clone(&self.allocator),
        )
    }

    /// Prepares a context for the algorithm named in the leading stream-header
    /// bytes of a compressed frame.
    pub fn prepare_decompression(
        &self,
        header: &[u8],
        use_custom_dictionary: bool,
    ) -> Result<DecompressionContext> {
        DecompressionContext::prepare(
            header,
            use_custom_dictionary,
            self.shared_backend(),
            Arc::clone(&self.allocator),
        )
    }

    /// Compresses through `context`, carrying its dictionary into the next call.
    pub fn compress_with_context(
        &self,
        context: &mut CompressionContext,
        input: &[u8],
    ) -> Result<Vec<u8>> {
        if context.is_released() {
            context.record(ResultState::InvalidContext);
            return Err(DensityError::InvalidContext);
        }
        let mut output = match output_buffer(self.compress_safe_size(input.len() as u64)) {
            Ok(output) => output,
            Err(err) => {
                context.record(ResultState::ProcessingError);
                return Err(err);
            }
        };
        log::trace!("compress {} bytes with {} context", input.len(), context.algorithm());
        let result =
            context.run(|backend, raw| backend.compress_with_context(input, &mut output, raw))?;
        output.truncate(result.bytes_written as usize);
        Ok(output)
    }

    pub fn decompress_with_context(
        &self,
        context: &mut DecompressionContext,
        input: &[u8],
        safe_size: u64,
    ) -> Result<Vec<u8>> {
        if context.is_released() {
            context.record(ResultState::InvalidContext);
            return Err(DensityError::InvalidContext);
        }
        let mut output = match output_buffer(safe_size) {
            Ok(output) => output,
            Err(err) => {
                context.record(ResultState::ProcessingError);
                return Err(err);
            }
        };
        log::trace!("decompress {} bytes with {} context", input.len(), context.algorithm());
        let result =
            context.run(|backend, raw| backend.decompress_with_context(input, &mut output, raw))?;
        output.truncate(result.bytes_written as usize);
        Ok(output)
    }

    /// Compresses `input` as one frame with `config.algorithm`, optionally
    /// decompressing it again to check the result.
    pub fn compress_with_config(&self, input: &[u8], config: &DensityConfig) -> Result<Vec<u8>> {
        let compressed = self.compress(input, config.algorithm)?;

        if config.verify {
            let safe_size = self.decompress_safe_size(input.len() as u64);
            let restored = self.decompress(&compressed, safe_size)?;
            if restored != input {
                return Err(DensityError::ProcessingError(
                    "verification failed: restored data differs".to_string(),
                ));
            }
            log::debug!("verified {} byte frame", compressed.len());
        }
        Ok(compressed)
    }

    fn shared_backend(&self) -> Arc<dyn CodecBackend> {
        self.backend.clone()
    }
}

/// Allocates a zeroed destination of `size` bytes without aborting on
/// impossible sizes.
fn output_buffer(size: u64) -> Result<Vec<u8>> {
    let size = usize::try_from(size).map_err(|_| {
        DensityError::ProcessingError(format!("cannot address a {} byte buffer", size))
    })?;
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(size).map_err(|_| {
        DensityError::ProcessingError(format!("cannot allocate a {} byte buffer", size))
    })?;
    buffer.resize(size, 0);
    Ok(buffer)
}
