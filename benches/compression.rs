use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use density::{compress_safe_size, decompress_safe_size, Algorithm, Engine};

fn sample(len: usize) -> Vec<u8> {
	let text = b"Density compresses four bytes at a time, hashing each word into a dictionary. ";
	text.iter().cycle().take(len).copied().collect()
}

fn bench_compress(c: &mut Criterion) {
	let data = sample(8 * 1024 * 1024);
	let engine = Engine::new();
	let mut output = vec![0u8; compress_safe_size(data.len() as u64) as usize];
	let mut group = c.benchmark_group("compression");
	group.throughput(Throughput::Bytes(data.len() as u64));
	for algorithm in Algorithm::ALL {
		let id = BenchmarkId::new("compress", algorithm);
		group.bench_with_input(id, &algorithm, |b, &algorithm| {
			b.iter(|| engine.compress_into(&data, &mut output, algorithm).unwrap());
		});
	}
	group.finish();
}

fn bench_decompress(c: &mut Criterion) {
	let data = sample(8 * 1024 * 1024);
	let engine = Engine::new();
	let mut output = vec![0u8; decompress_safe_size(data.len() as u64) as usize];
	let mut group = c.benchmark_group("decompression");
	group.throughput(Throughput::Bytes(data.len() as u64));
	for algorithm in Algorithm::ALL {
		let compressed = engine.compress(&data, algorithm).unwrap();
		let id = BenchmarkId::new("decompress", algorithm);
		group.bench_with_input(id, &compressed, |b, compressed| {
			b.iter(|| engine.decompress_into(compressed, &mut output).unwrap());
		});
	}
	group.finish();
}

fn bench_context(c: &mut Criterion) {
	let chunk = sample(64 * 1024);
	let engine = Engine::new();
	let mut group = c.benchmark_group("context");
	group.throughput(Throughput::Bytes(chunk.len() as u64));
	for algorithm in Algorithm::ALL {
		let mut context = engine.prepare_compression(algorithm, true).unwrap();
		group.bench_function(BenchmarkId::new("compress_with_context", algorithm), |b| {
			b.iter(|| engine.compress_with_context(&mut context, &chunk).unwrap());
		});
	}
	group.finish();
}

criterion_group!(benches, bench_compress, bench_decompress, bench_context);
criterion_main!(benches);
