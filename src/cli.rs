use crate::algorithm::Algorithm;
use crate::config::DensityConfig;
use crate::engine::Engine;
use crate::error::{DensityError, Result};
use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(author, version, about, long_about = "Density byte-stream compression")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compresses a file into a single frame
    Compress {
        /// Input file to compress
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Output file name
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Algorithm [chameleon, cheetah, lion] or its id
        #[arg(short, long)]
        algorithm: Algorithm,

        /// Decompress the result and compare it with the input
        #[arg(long)]
        verify: bool,
    },
    /// Decompresses a frame
    Decompress {
        /// Input file to decompress
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Output file name
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Expected original size; read from the frame when omitted
        #[arg(short, long)]
        size_hint: Option<u64>,
    },
    /// Prints the frame header of a compressed file
    Info {
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,
    },
    /// Prints safe buffer sizes for an input length
    Sizes {
        len: u64,
    },
}

pub fn run() -> Result<()> {
    execute(Cli::parse())
}

/// Parses `args` (program name first) and runs the command.
pub fn run_from<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::try_parse_from(args).map_err(|e| DensityError::ConfigError(e.to_string()))?;
    execute(cli)
}

fn execute(cli: Cli) -> Result<()> {
    let engine = Engine::new();

    match cli.command {
        Commands::Compress { input, output, algorithm, verify } => {
            println!(
                "Compressing {} to {} with {}...",
                input.display(),
                output.display(),
                algorithm
            );
            let config = DensityConfig::new(algorithm).with_verify(verify);

            let data = fs::read(&input)?;
            let start = Instant::now();
            let compressed = engine.compress_with_config(&data, &config)?;
            let duration = start.elapsed();
            fs::write(&output, &compressed)?;

            println!("Compression successful!");
            println!("  Original Size:    {} bytes", data.len());
            println!("  Compressed Size:  {} bytes", compressed.len());
            if !compressed.is_empty() {
                let ratio = data.len() as f64 / compressed.len() as f64;
                println!("  Ratio:            {:.2}x", ratio);
            }
            println!("  Elapsed Time:     {:.2?}", duration);
        }
        Commands::Decompress { input, output, size_hint } => {
            println!("Decompressing {} to {}...", input.display(), output.display());
            let data = fs::read(&input)?;
            let expected = match size_hint {
                Some(hint) => hint,
                None => engine.frame_info(&data)?.original_size,
            };

            let start = Instant::now();
            let restored = engine.decompress(&data, engine.decompress_safe_size(expected))?;
            let duration = start.elapsed();
            fs::write(&output, &restored)?;

            println!("Decompression successful!");
            println!("  Restored Size: {} bytes", restored.len());
            println!("  Elapsed Time:  {:.2?}", duration);
        }
        Commands::Info { input } => {
            let data = fs::read(&input)?;
            let info = engine.frame_info(&data)?;
            println!("{}", input.display());
            println!("  Format Version:   {}", info.version);
            println!("  Algorithm:        {} (id {})", info.algorithm, info.algorithm.id());
            println!("  Original Size:    {} bytes", info.original_size);
            println!("  Compressed Size:  {} bytes", info.compressed_size);
            println!("  Ratio:            {:.2}x", info.compression_ratio());
        }
        Commands::Sizes { len } => {
            println!("Input length: {} bytes", len);
            println!("  Compress safe size:   {}", engine.compress_safe_size(len));
            println!("  Decompress safe size: {}", engine.decompress_safe_size(len));
            for algorithm in Algorithm::ALL {
                println!(
                    "  {:<10} bound {:>12}  dictionary {:>8} bytes",
                    algorithm.name(),
                    algorithm.max_compressed_size(len),
                    engine.dictionary_size(algorithm)
                );
            }
        }
    }

    Ok(())
}
