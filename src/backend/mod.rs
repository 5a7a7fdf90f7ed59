//! Codec backends.
//!
//! [`CodecBackend`] is the narrow contract the engine drives. The crate ships
//! [`DensityBackend`], which frames every output with a [`FrameHeader`] and
//! dispatches to the Chameleon, Cheetah and Lion kernels.

mod chameleon;
mod cheetah;
mod cursor;
mod frame;
mod lion;
mod signature;

pub use frame::{parse_stream_header, FrameHeader, HEADER_SIZE};

use crate::algorithm::Algorithm;
use crate::allocator::DictionaryAllocator;
use crate::buffer;
use crate::state::{KernelStatus, ProcessingResult, ResultState};
use cursor::{Input, Output};
use frame::FRAME_LEN;
use std::cmp::Ordering;
use std::fmt;

pub const VERSION_MAJOR: u8 = 0;
pub const VERSION_MINOR: u8 = 1;
pub const VERSION_REVISION: u8 = 0;

const HASH_MULTIPLIER: u32 = 0x9D6E_F916;

#[inline]
pub(crate) fn hash(word: u32) -> usize {
	(word.wrapping_mul(HASH_MULTIPLIER) >> 16) as usize
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Version {
	pub major: u8,
	pub minor: u8,
	pub revision: u8,
}

impl fmt::Display for Version {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}.{}", self.major, self.minor, self.revision)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
	Compression,
	Decompression,
}

/// Backend-level context state. Owned by a
/// [`CompressionContext`](crate::CompressionContext) or
/// [`DecompressionContext`](crate::DecompressionContext), which never hand
/// it out.
#[derive(Debug)]
pub struct RawContext {
	flavor: Flavor,
	algorithm: Algorithm,
	dictionary_size: usize,
	dictionary: Option<Vec<u8>>,
}

impl RawContext {
	/// `dictionary`, when present, must be exactly the algorithm's dictionary size.
	pub fn new(flavor: Flavor, algorithm: Algorithm, dictionary: Option<Vec<u8>>) -> Self {
		Self { flavor, algorithm, dictionary_size: algorithm.dictionary_size(), dictionary }
	}

	pub fn flavor(&self) -> Flavor {
		self.flavor
	}

	pub fn algorithm(&self) -> Algorithm {
		self.algorithm
	}

	pub fn dictionary_size(&self) -> usize {
		self.dictionary_size
	}

	pub fn uses_custom_dictionary(&self) -> bool {
		self.dictionary.is_some()
	}

	pub fn dictionary_mut(&mut self) -> Option<&mut [u8]> {
		self.dictionary.as_deref_mut()
	}

	pub fn into_dictionary(self) -> Option<Vec<u8>> {
		self.dictionary
	}
}

/// Low-level compress/decompress primitive. Implementations are synchronous
/// and keep no reference to caller buffers once a call returns.
pub trait CodecBackend: Send + Sync {
	fn version(&self) -> Version;

	fn dictionary_size(&self, algorithm: Algorithm) -> usize;

	fn compress_safe_size(&self, input_len: u64) -> u64;

	fn decompress_safe_size(&self, expected_len: u64) -> u64;

	fn prepare_compression_context(
		&self,
		algorithm: Algorithm,
		use_custom_dictionary: bool,
		allocator: &dyn DictionaryAllocator,
	) -> Result<RawContext, ResultState>;

	fn prepare_decompression_context(
		&self,
		header: &[u8],
		use_custom_dictionary: bool,
		allocator: &dyn DictionaryAllocator,
	) -> Result<RawContext, ResultState>;

	fn compress(&self, input: &[u8], output: &mut [u8], algorithm: Algorithm) -> ProcessingResult;

	fn compress_with_context(
		&self,
		input: &[u8],
		output: &mut [u8],
		context: &mut RawContext,
	) -> ProcessingResult;

	fn decompress(&self, input: &[u8], output: &mut [u8]) -> ProcessingResult;

	fn decompress_with_context(
		&self,
		input: &[u8],
		output: &mut [u8],
		context: &mut RawContext,
	) -> ProcessingResult;

	fn free_context(&self, context: RawContext, allocator: &dyn DictionaryAllocator);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DensityBackend;

impl DensityBackend {
	pub fn new() -> Self {
		Self
	}

	fn allocate_dictionary(
		algorithm: Algorithm,
		use_custom_dictionary: bool,
		allocator: &dyn DictionaryAllocator,
	) -> Result<Option<Vec<u8>>, ResultState> {
		if !use_custom_dictionary {
			return Ok(None);
		}
		match allocator.allocate(algorithm.dictionary_size()) {
			Some(dictionary) => Ok(Some(dictionary)),
			None => {
				log::warn!(
					"{} dictionary allocation of {} bytes failed",
					algorithm,
					algorithm.dictionary_size()
				);
				Err(ResultState::ProcessingError)
			}
		}
	}

	fn encode_frame(
		&self,
		input: &[u8],
		out: &mut Output<'_>,
		algorithm: Algorithm,
		dictionary: &mut [u8],
	) -> Result<(), KernelStatus> {
		let at = out.reserve(FRAME_LEN)?;
		let (units, tail) = input.split_at(input.len() & !3);
		match algorithm {
			Algorithm::Chameleon => chameleon::encode(units, out, dictionary)?,
			Algorithm::Cheetah => cheetah::encode(units, out, dictionary)?,
			Algorithm::Lion => lion::encode(units, out, dictionary)?,
		}
		out.write_bytes(tail)?;

		let body_len = out.position() - at - FRAME_LEN;
		FrameHeader::new(self.version(), algorithm, input)
			.with_body_size(body_len)
			.write(&mut out.slice_mut(at, FRAME_LEN))
			.map_err(|_| KernelStatus::OutputStall)
	}

	fn compress_frame(
		&self,
		input: &[u8],
		output: &mut [u8],
		algorithm: Algorithm,
		dictionary: &mut [u8],
	) -> ProcessingResult {
		let mut out = Output::new(output);
		match self.encode_frame(input, &mut out, algorithm, dictionary) {
			Ok(()) => ProcessingResult::ok(input.len() as u64, out.position() as u64),
			Err(status) => ProcessingResult::failed(status.into()),
		}
	}

	/// Validates a frame against its input and the destination before any
	/// dictionary state is touched.
	fn check_frame(
		&self,
		input: &[u8],
		output_len: usize,
	) -> Result<(FrameHeader, usize), ResultState> {
		let header = FrameHeader::parse(input)?;
		if header.version.major != VERSION_MAJOR {
			log::debug!("rejecting frame with version {}", header.version);
			return Err(ResultState::ProcessingError);
		}
		if let Some(body_size) = header.body_size {
			let body_len = input.len() - FRAME_LEN;
			match body_len.cmp(&(body_size as usize)) {
				Ordering::Less => return Err(ResultState::InputBufferTooSmall),
				Ordering::Greater => return Err(ResultState::ProcessingError),
				Ordering::Equal => {}
			}
		}
		let len = usize::try_from(header.original_size)
			.map_err(|_| ResultState::OutputBufferTooSmall)?;
		if len > output_len {
			return Err(ResultState::OutputBufferTooSmall);
		}
		Ok((header, len))
	}

	fn decode_frame(
		&self,
		header: &FrameHeader,
		input: &[u8],
		target: &mut [u8],
		dictionary: &mut [u8],
	) -> Result<(), KernelStatus> {
		let mut reader = Input::new(&input[FRAME_LEN..]);
		let (units, tail) = target.split_at_mut(target.len() & !3);
		match header.algorithm {
			Algorithm::Chameleon => chameleon::decode(&mut reader, units, dictionary)?,
			Algorithm::Cheetah => cheetah::decode(&mut reader, units, dictionary)?,
			Algorithm::Lion => lion::decode(&mut reader, units, dictionary)?,
		}
		tail.copy_from_slice(reader.read_bytes(tail.len())?);

		if reader.remaining() != 0 {
			return Err(KernelStatus::Error);
		}
		if crc32fast::hash(target) != header.checksum {
			return Err(KernelStatus::Error);
		}
		Ok(())
	}

	fn decompress_frame(
		&self,
		header: &FrameHeader,
		len: usize,
		input: &[u8],
		output: &mut [u8],
		dictionary: &mut [u8],
	) -> ProcessingResult {
		match self.decode_frame(header, input, &mut output[..len], dictionary) {
			Ok(()) => ProcessingResult::ok(input.len() as u64, len as u64),
			Err(status) => ProcessingResult::failed(status.into()),
		}
	}
}

impl CodecBackend for DensityBackend {
	fn version(&self) -> Version {
		Version { major: VERSION_MAJOR, minor: VERSION_MINOR, revision: VERSION_REVISION }
	}

	fn dictionary_size(&self, algorithm: Algorithm) -> usize {
		algorithm.dictionary_size()
	}

	fn compress_safe_size(&self, input_len: u64) -> u64 {
		buffer::compress_safe_size(input_len)
	}

	fn decompress_safe_size(&self, expected_len: u64) -> u64 {
		buffer::decompress_safe_size(expected_len)
	}

	fn prepare_compression_context(
		&self,
		algorithm: Algorithm,
		use_custom_dictionary: bool,
		allocator: &dyn DictionaryAllocator,
	) -> Result<RawContext, ResultState> {
		let dictionary = Self::allocate_dictionary(algorithm, use_custom_dictionary, allocator)?;
		Ok(RawContext::new(Flavor::Compression, algorithm, dictionary))
	}

	fn prepare_decompression_context(
		&self,
		header: &[u8],
		use_custom_dictionary: bool,
		allocator: &dyn DictionaryAllocator,
	) -> Result<RawContext, ResultState> {
		let (_, algorithm) = parse_stream_header(header)?;
		let dictionary = Self::allocate_dictionary(algorithm, use_custom_dictionary, allocator)?;
		Ok(RawContext::new(Flavor::Decompression, algorithm, dictionary))
	}

	fn compress(&self, input: &[u8], output: &mut [u8], algorithm: Algorithm) -> ProcessingResult {
		let mut scratch = vec![0u8; algorithm.dictionary_size()];
		self.compress_frame(input, output, algorithm, &mut scratch)
	}

	fn compress_with_context(
		&self,
		input: &[u8],
		output: &mut [u8],
		context: &mut RawContext,
	) -> ProcessingResult {
		if context.flavor != Flavor::Compression {
			return ProcessingResult::failed(ResultState::InvalidContext);
		}
		let algorithm = context.algorithm;
		match context.dictionary_mut() {
			Some(dictionary) => self.compress_frame(input, output, algorithm, dictionary),
			None => self.compress(input, output, algorithm),
		}
	}

	fn decompress(&self, input: &[u8], output: &mut [u8]) -> ProcessingResult {
		let (header, len) = match self.check_frame(input, output.len()) {
			Ok(checked) => checked,
			Err(state) => return ProcessingResult::failed(state),
		};
		let mut scratch = vec![0u8; header.algorithm.dictionary_size()];
		self.decompress_frame(&header, len, input, output, &mut scratch)
	}

	fn decompress_with_context(
		&self,
		input: &[u8],
		output: &mut [u8],
		context: &mut RawContext,
	) -> ProcessingResult {
		if context.flavor != Flavor::Decompression {
			return ProcessingResult::failed(ResultState::InvalidContext);
		}
		let (header, len) = match self.check_frame(input, output.len()) {
			Ok(checked) => checked,
			Err(state) => return ProcessingResult::failed(state),
		};
		if header.algorithm != context.algorithm {
			return ProcessingResult::failed(ResultState::InvalidContext);
		}
		match context.dictionary_mut() {
			Some(dictionary) if header.body_size.is_some() => {
				self.decompress_frame(&header, len, input, output, dictionary)
			}
			Some(dictionary) => {
				// body length unknown up front: only commit history from a complete frame
				let mut working = dictionary.to_vec();
				let result = self.decompress_frame(&header, len, input, output, &mut working);
				if result.state.is_ok() {
					dictionary.copy_from_slice(&working);
				}
				result
			}
			None => {
				let mut scratch = vec![0u8; header.algorithm.dictionary_size()];
				self.decompress_frame(&header, len, input, output, &mut scratch)
			}
		}
	}

	fn free_context(&self, context: RawContext, allocator: &dyn DictionaryAllocator) {
		if let Some(dictionary) = context.into_dictionary() {
			allocator.deallocate(dictionary);
		}
	}
}
