use density::backend::RawContext;
use density::{
	Algorithm, CodecBackend, DensityBackend, DensityError, DictionaryAllocator, Engine,
	ProcessingResult, ResultState,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn random_bytes(rng: &mut StdRng, len: usize) -> Vec<u8> {
	let mut data = vec![0u8; len];
	rng.fill(&mut data[..]);
	data
}

/// Text-like data: random picks from a small vocabulary at random offsets.
fn redundant_bytes(rng: &mut StdRng, len: usize) -> Vec<u8> {
	let words: Vec<[u8; 4]> = (0..24).map(|_| rng.gen()).collect();
	let mut data = Vec::with_capacity(len + 4);
	while data.len() < len {
		if rng.gen_bool(0.1) {
			data.push(rng.gen());
		} else {
			data.extend_from_slice(&words[rng.gen_range(0..words.len())]);
		}
	}
	data.truncate(len);
	data
}

#[derive(Debug, Default)]
struct CountingAllocator {
	allocations: AtomicUsize,
	deallocations: AtomicUsize,
}

impl DictionaryAllocator for CountingAllocator {
	fn allocate(&self, size: usize) -> Option<Vec<u8>> {
		self.allocations.fetch_add(1, Ordering::SeqCst);
		Some(vec![0; size])
	}

	fn deallocate(&self, _buffer: Vec<u8>) {
		self.deallocations.fetch_add(1, Ordering::SeqCst);
	}
}

#[test]
fn round_trip_random_lengths() {
	let mut rng = StdRng::seed_from_u64(0xD3_5171);
	for algorithm in Algorithm::ALL {
		for len in (0..64).chain([255, 256, 257, 1023, 4096, 65_537]) {
			for data in [random_bytes(&mut rng, len), redundant_bytes(&mut rng, len)] {
				let compressed = density::compress(&data, algorithm).unwrap();
				let safe_size = density::decompress_safe_size(len as u64);
				let restored = density::decompress(&compressed, safe_size).unwrap();
				assert_eq!(restored, data, "{} len {}", algorithm, len);
			}
		}
	}
}

#[test]
fn safe_size_holds_for_incompressible_input() {
	let mut rng = StdRng::seed_from_u64(7);
	for len in [0usize, 1, 4, 31, 32, 33, 511, 512, 10_000, 100_003] {
		let data = random_bytes(&mut rng, len);
		let bound = density::compress_safe_size(len as u64) as usize;
		for algorithm in Algorithm::ALL {
			let mut output = vec![0u8; bound];
			let written = density::compress_into(&data, &mut output, algorithm).unwrap();
			assert!(written <= bound);
			assert!(written as u64 <= algorithm.max_compressed_size(len as u64));
		}
	}
}

#[test]
fn sizes_are_monotonic() {
	let mut previous = (0, 0);
	for len in 0..2048u64 {
		let current = (density::compress_safe_size(len), density::decompress_safe_size(len));
		assert!(current.0 >= previous.0 && current.1 >= previous.1);
		previous = current;
	}
}

#[test]
fn context_dictionary_continuity() {
	let mut rng = StdRng::seed_from_u64(42);
	let first = redundant_bytes(&mut rng, 8192);
	let second = first.clone();
	let size = density::decompress_safe_size(8192);

	for algorithm in Algorithm::ALL {
		let mut compressor = density::prepare_compression(algorithm, true).unwrap();
		let a = density::compress_with_context(&mut compressor, &first).unwrap();
		let b = density::compress_with_context(&mut compressor, &second).unwrap();
		assert!(b.len() < a.len(), "{}", algorithm);

		let mut continued = density::prepare_decompression(&a, true).unwrap();
		assert_eq!(density::decompress_with_context(&mut continued, &a, size).unwrap(), first);
		assert_eq!(density::decompress_with_context(&mut continued, &b, size).unwrap(), second);
		assert_eq!(continued.last_state(), ResultState::Ok);

		let mut fresh = density::prepare_decompression(&b, true).unwrap();
		let outcome = density::decompress_with_context(&mut fresh, &b, size);
		assert!(outcome.is_err(), "{}", algorithm);
		assert!(!fresh.last_state().is_ok(), "{}", algorithm);
	}
}

#[test]
fn truncated_frame_then_retry_on_same_context() {
	let mut rng = StdRng::seed_from_u64(99);
	let first = redundant_bytes(&mut rng, 4096);
	let second = redundant_bytes(&mut rng, 4096);
	let size = density::decompress_safe_size(4096);

	for algorithm in Algorithm::ALL {
		let mut compressor = density::prepare_compression(algorithm, true).unwrap();
		let a = density::compress_with_context(&mut compressor, &first).unwrap();
		let b = density::compress_with_context(&mut compressor, &second).unwrap();

		let mut decompressor = density::prepare_decompression(&a, true).unwrap();
		assert_eq!(density::decompress_with_context(&mut decompressor, &a, size).unwrap(), first);

		let cut = &b[..b.len() - 7];
		let err = density::decompress_with_context(&mut decompressor, cut, size).unwrap_err();
		assert!(matches!(err, DensityError::InputBufferTooSmall), "{}", algorithm);
		assert_eq!(decompressor.last_state(), ResultState::InputBufferTooSmall);

		let restored = density::decompress_with_context(&mut decompressor, &b, size).unwrap();
		assert_eq!(restored, second, "{}", algorithm);
		assert_eq!(decompressor.last_state(), ResultState::Ok);
	}
}

#[test]
fn context_without_dictionary_has_no_history() {
	let data = b"no history without a dictionary, no history without a dictionary".to_vec();
	let mut compressor = density::prepare_compression(Algorithm::Cheetah, false).unwrap();
	let a = density::compress_with_context(&mut compressor, &data).unwrap();
	let b = density::compress_with_context(&mut compressor, &data).unwrap();
	assert_eq!(a, b);
	assert_eq!(a, density::compress(&data, Algorithm::Cheetah).unwrap());
}

#[test]
fn undersized_destination() {
	let mut rng = StdRng::seed_from_u64(3);
	let data = redundant_bytes(&mut rng, 3000);
	for algorithm in Algorithm::ALL {
		let compressed = density::compress(&data, algorithm).unwrap();

		let mut short = vec![0u8; compressed.len() - 1];
		let err = density::compress_into(&data, &mut short, algorithm).unwrap_err();
		assert!(matches!(err, DensityError::OutputBufferTooSmall));

		let mut short = vec![0u8; data.len() - 1];
		let err = density::decompress_into(&compressed, &mut short).unwrap_err();
		assert!(matches!(err, DensityError::OutputBufferTooSmall));
		assert!(short.iter().all(|&b| b == 0));

		let mut exact = vec![0u8; data.len()];
		assert_eq!(density::decompress_into(&compressed, &mut exact).unwrap(), data.len());
		assert_eq!(exact, data);
	}
}

#[test]
fn released_context_reuse() {
	let mut compressor = density::prepare_compression(Algorithm::Lion, true).unwrap();
	let frame = density::compress_with_context(&mut compressor, b"some bytes to frame").unwrap();
	compressor.release().unwrap();
	let err = density::compress_with_context(&mut compressor, b"more bytes").unwrap_err();
	assert!(matches!(err, DensityError::InvalidContext));
	assert_eq!(compressor.last_state(), ResultState::InvalidContext);

	let mut decompressor = density::prepare_decompression(&frame, false).unwrap();
	decompressor.release().unwrap();
	assert!(matches!(decompressor.release(), Err(DensityError::InvalidContext)));
	let err = density::decompress_with_context(&mut decompressor, &frame, 64).unwrap_err();
	assert!(matches!(err, DensityError::InvalidContext));
}

#[test]
fn invalid_algorithm_fails_before_allocation() {
	let allocator = Arc::new(CountingAllocator::default());
	let engine = Engine::new().with_allocator(allocator.clone());
	for bad in [0u8, 4, 255] {
		let err = engine.compress(b"data", bad).unwrap_err();
		assert!(matches!(err, DensityError::InvalidAlgorithm(_)));
		let mut output = [0u8; 64];
		let err = engine.compress_into(b"data", &mut output, bad).unwrap_err();
		assert!(matches!(err, DensityError::InvalidAlgorithm(_)));
		let err = engine.prepare_compression(bad, true).unwrap_err();
		assert!(matches!(err, DensityError::InvalidAlgorithm(_)));
	}
	let err = engine.compress(b"data", "density").unwrap_err();
	assert!(matches!(err, DensityError::InvalidAlgorithm(_)));
	assert_eq!(allocator.allocations.load(Ordering::SeqCst), 0);
}

#[test]
fn empty_input_under_chameleon() {
	let compressed = density::compress(b"", Algorithm::Chameleon).unwrap();
	assert!(compressed.len() as u64 <= density::compress_safe_size(0));
	assert!(density::decompress(&compressed, density::decompress_safe_size(0)).unwrap().is_empty());
}

#[test]
fn allocator_sees_one_release_per_dictionary() {
	let allocator = Arc::new(CountingAllocator::default());
	let engine = Engine::new().with_allocator(allocator.clone());
	{
		let mut explicit = engine.prepare_compression(Algorithm::Chameleon, true).unwrap();
		let frame = engine.compress_with_context(&mut explicit, b"0123456789abcdef").unwrap();
		explicit.release().unwrap();
		let _dropped = engine.prepare_decompression(&frame, true).unwrap();
		let _no_dictionary = engine.prepare_compression(Algorithm::Lion, false).unwrap();
	}
	assert_eq!(allocator.allocations.load(Ordering::SeqCst), 2);
	assert_eq!(allocator.deallocations.load(Ordering::SeqCst), 2);
}

#[test]
fn independent_contexts_in_parallel() {
	let results: Vec<bool> = (0..16u64)
		.into_par_iter()
		.map(|seed| {
			let mut rng = StdRng::seed_from_u64(seed);
			let algorithm = Algorithm::ALL[seed as usize % 3];
			let chunks: Vec<Vec<u8>> = (0..4).map(|_| redundant_bytes(&mut rng, 2048)).collect();

			let mut compressor = density::prepare_compression(algorithm, true).unwrap();
			let frames: Vec<Vec<u8>> = chunks
				.iter()
				.map(|c| density::compress_with_context(&mut compressor, c).unwrap())
				.collect();
			let mut decompressor = density::prepare_decompression(&frames[0], true).unwrap();
			let size = density::decompress_safe_size(2048);
			frames.iter().zip(&chunks).all(|(frame, chunk)| {
				density::decompress_with_context(&mut decompressor, frame, size).unwrap() == *chunk
			})
		})
		.collect();
	assert!(results.into_iter().all(|ok| ok));
}

/// Wraps the built-in backend and counts one-shot compress calls.
struct CountingBackend {
	inner: DensityBackend,
	compressions: AtomicUsize,
}

impl CodecBackend for CountingBackend {
	fn version(&self) -> density::Version {
		self.inner.version()
	}

	fn dictionary_size(&self, algorithm: Algorithm) -> usize {
		self.inner.dictionary_size(algorithm)
	}

	fn compress_safe_size(&self, input_len: u64) -> u64 {
		self.inner.compress_safe_size(input_len)
	}

	fn decompress_safe_size(&self, expected_len: u64) -> u64 {
		self.inner.decompress_safe_size(expected_len)
	}

	fn prepare_compression_context(
		&self,
		algorithm: Algorithm,
		use_custom_dictionary: bool,
		allocator: &dyn DictionaryAllocator,
	) -> Result<RawContext, ResultState> {
		self.inner.prepare_compression_context(algorithm, use_custom_dictionary, allocator)
	}

	fn prepare_decompression_context(
		&self,
		header: &[u8],
		use_custom_dictionary: bool,
		allocator: &dyn DictionaryAllocator,
	) -> Result<RawContext, ResultState> {
		self.inner.prepare_decompression_context(header, use_custom_dictionary, allocator)
	}

	fn compress(&self, input: &[u8], output: &mut [u8], algorithm: Algorithm) -> ProcessingResult {
		self.compressions.fetch_add(1, Ordering::SeqCst);
		self.inner.compress(input, output, algorithm)
	}

	fn compress_with_context(
		&self,
		input: &[u8],
		output: &mut [u8],
		context: &mut RawContext,
	) -> ProcessingResult {
		self.inner.compress_with_context(input, output, context)
	}

	fn decompress(&self, input: &[u8], output: &mut [u8]) -> ProcessingResult {
		self.inner.decompress(input, output)
	}

	fn decompress_with_context(
		&self,
		input: &[u8],
		output: &mut [u8],
		context: &mut RawContext,
	) -> ProcessingResult {
		self.inner.decompress_with_context(input, output, context)
	}

	fn free_context(&self, context: RawContext, allocator: &dyn DictionaryAllocator) {
		self.inner.free_context(context, allocator)
	}
}

#[test]
fn injected_backend_is_used() {
	let engine = Engine::with_backend(CountingBackend {
		inner: DensityBackend::new(),
		compressions: AtomicUsize::new(0),
	});
	let compressed = engine.compress(b"through a custom backend", Algorithm::Cheetah).unwrap();
	assert!(engine.compress(b"x", 9u8).is_err());
	assert_eq!(engine.backend().compressions.load(Ordering::SeqCst), 1);
	assert_eq!(engine.decompress(&compressed, 64).unwrap(), b"through a custom backend");
}

#[test]
fn cli_round_trip() {
	let dir = tempfile::tempdir().unwrap();
	let input = dir.path().join("input.bin");
	let packed = dir.path().join("input.density");
	let output = dir.path().join("output.bin");
	let mut rng = StdRng::seed_from_u64(11);
	let data = redundant_bytes(&mut rng, 50_000);
	std::fs::write(&input, &data).unwrap();

	let input = input.to_str().unwrap();
	let packed = packed.to_str().unwrap();
	let output = output.to_str().unwrap();
	density::cli::run_from([
		"density", "compress", "-i", input, "-o", packed, "-a", "lion", "--verify",
	])
	.unwrap();
	density::cli::run_from(["density", "info", "-i", packed]).unwrap();
	density::cli::run_from(["density", "decompress", "-i", packed, "-o", output]).unwrap();
	assert_eq!(std::fs::read(output).unwrap(), data);

	let err = density::cli::run_from([
		"density", "decompress", "-i", packed, "-o", output, "--size-hint", "100",
	])
	.unwrap_err();
	assert!(matches!(err, DensityError::OutputBufferTooSmall));
}

#[test]
fn cli_rejects_bad_arguments() {
	let args = ["density", "compress", "-i", "a", "-o", "b", "-a", "snappy"];
	let err = density::cli::run_from(args).unwrap_err();
	assert!(matches!(err, DensityError::ConfigError(_)));
	density::cli::run_from(["density", "sizes", "4096"]).unwrap();
}
