use crate::algorithm::Algorithm;
use crate::allocator::DictionaryAllocator;
use crate::backend::{CodecBackend, Flavor, RawContext};
use crate::error::{DensityError, Result};
use crate::state::{ProcessingResult, ResultState};
use std::fmt;
use std::sync::Arc;

/// Lifecycle shared by both context flavors: owns the backend state until
/// it is released, exactly once.
struct ContextCore {
	raw: Option<RawContext>,
	algorithm: Algorithm,
	uses_custom_dictionary: bool,
	dictionary_size: usize,
	last_state: ResultState,
	backend: Arc<dyn CodecBackend>,
	allocator: Arc<dyn DictionaryAllocator>,
}

impl ContextCore {
	fn new(
		raw: RawContext,
		backend: Arc<dyn CodecBackend>,
		allocator: Arc<dyn DictionaryAllocator>,
	) -> Self {
		Self {
			algorithm: raw.algorithm(),
			uses_custom_dictionary: raw.uses_custom_dictionary(),
			dictionary_size: raw.dictionary_size(),
			raw: Some(raw),
			last_state: ResultState::Ok,
			backend,
			allocator,
		}
	}

	/// Runs one backend call against the live context and records its state.
	fn run<F>(&mut self, call: F) -> Result<ProcessingResult>
	where
		F: FnOnce(&dyn CodecBackend, &mut RawContext) -> ProcessingResult,
	{
		let Some(raw) = self.raw.as_mut() else {
			self.last_state = ResultState::InvalidContext;
			return Err(DensityError::InvalidContext);
		};
		let result = call(self.backend.as_ref(), raw);
		self.last_state = result.state;
		result.into_result()
	}

	fn record(&mut self, state: ResultState) {
		self.last_state = state;
	}

	fn release(&mut self) -> Result<()> {
		let raw = self.raw.take().ok_or(DensityError::InvalidContext)?;
		let held = if self.uses_custom_dictionary { self.dictionary_size } else { 0 };
		log::debug!("releasing {} context ({} dictionary bytes)", self.algorithm, held);
		self.backend.free_context(raw, self.allocator.as_ref());
		Ok(())
	}
}

impl Drop for ContextCore {
	fn drop(&mut self) {
		if self.raw.is_some() {
			let _ = self.release();
		}
	}
}

impl fmt::Debug for ContextCore {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Context")
			.field("algorithm", &self.algorithm)
			.field("uses_custom_dictionary", &self.uses_custom_dictionary)
			.field("dictionary_size", &self.dictionary_size)
			.field("last_state", &self.last_state)
			.field("released", &self.raw.is_none())
			.finish()
	}
}

macro_rules! context_accessors {
	($name:ident) => {
		impl $name {
			pub fn algorithm(&self) -> Algorithm {
				self.core.algorithm
			}

			/// Whether the context owns a persistent dictionary.
			pub fn uses_custom_dictionary(&self) -> bool {
				self.core.uses_custom_dictionary
			}

			/// Dictionary size the algorithm requires, whether or not one is held.
			pub fn dictionary_size(&self) -> usize {
				self.core.dictionary_size
			}

			/// State of the most recent operation on this context.
			pub fn last_state(&self) -> ResultState {
				self.core.last_state
			}

			pub fn is_released(&self) -> bool {
				self.core.raw.is_none()
			}

			/// Frees the dictionary and makes the context unusable.
			///
			/// Fails with [`DensityError::InvalidContext`] when the context was
			/// already released. Dropping a live context releases it too.
			pub fn release(&mut self) -> Result<()> {
				self.core.release()
			}

			pub(crate) fn run<F>(&mut self, call: F) -> Result<ProcessingResult>
			where
				F: FnOnce(&dyn CodecBackend, &mut RawContext) -> ProcessingResult,
			{
				self.core.run(call)
			}

			pub(crate) fn record(&mut self, state: ResultState) {
				self.core.record(state);
			}
		}
	};
}

/// Stateful compression handle bound to one algorithm.
#[derive(Debug)]
pub struct CompressionContext {
	core: ContextCore,
}

/// Stateful decompression handle bound to the algorithm named by a stream
/// header.
#[derive(Debug)]
pub struct DecompressionContext {
	core: ContextCore,
}

context_accessors!(CompressionContext);
context_accessors!(DecompressionContext);

impl CompressionContext {
	pub(crate) fn prepare(
		algorithm: Algorithm,
		use_custom_dictionary: bool,
		backend: Arc<dyn CodecBackend>,
		allocator: Arc<dyn DictionaryAllocator>,
	) -> Result<Self> {
		let raw = backend
			.prepare_compression_context(algorithm, use_custom_dictionary, allocator.as_ref())
			.map_err(DensityError::from_state)?;
		debug_assert_eq!(raw.flavor(), Flavor::Compression);
		log::debug!(
			"prepared {} compression context (custom dictionary: {})",
			algorithm,
			use_custom_dictionary
		);
		Ok(Self { core: ContextCore::new(raw, backend, allocator) })
	}
}

impl DecompressionContext {
	pub(crate) fn prepare(
		header: &[u8],
		use_custom_dictionary: bool,
		backend: Arc<dyn CodecBackend>,
		allocator: Arc<dyn DictionaryAllocator>,
	) -> Result<Self> {
		let raw = backend
			.prepare_decompression_context(header, use_custom_dictionary, allocator.as_ref())
			.map_err(DensityError::from_state)?;
		debug_assert_eq!(raw.flavor(), Flavor::Decompression);
		log::debug!(
			"prepared {} decompression context (custom dictionary: {})",
			raw.algorithm(),
			use_custom_dictionary
		);
		Ok(Self { core: ContextCore::new(raw, backend, allocator) })
	}
}
