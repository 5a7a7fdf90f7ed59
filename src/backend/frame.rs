//! Frame header written at the start of every compressed output.
//!
//! ```text
//! 0      major version
//! 1      minor version
//! 2      revision
//! 3      algorithm id
//! 4..8   body length, u32 LE; u32::MAX when it does not fit
//! 8..16  original length, u64 LE
//! 16..20 CRC-32 of the original bytes, u32 LE
//! ```
//!
//! The first eight bytes are the stream header; they are enough to prepare a
//! decompression context.

use super::Version;
use crate::algorithm::Algorithm;
use crate::buffer::FRAME_SIZE;
use crate::state::ResultState;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

pub const HEADER_SIZE: usize = 8;
pub(crate) const FRAME_LEN: usize = FRAME_SIZE as usize;
const UNRECORDED_BODY: u32 = u32::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
	pub version: Version,
	pub algorithm: Algorithm,
	/// Bytes following the header, `None` when too large to record.
	pub body_size: Option<u32>,
	pub original_size: u64,
	pub checksum: u32,
}

impl FrameHeader {
	pub fn new(version: Version, algorithm: Algorithm, original: &[u8]) -> Self {
		Self {
			version,
			algorithm,
			body_size: None,
			original_size: original.len() as u64,
			checksum: crc32fast::hash(original),
		}
	}

	pub fn with_body_size(mut self, body_len: usize) -> Self {
		self.body_size = u32::try_from(body_len).ok().filter(|len| *len != UNRECORDED_BODY);
		self
	}

	pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
		writer.write_u8(self.version.major)?;
		writer.write_u8(self.version.minor)?;
		writer.write_u8(self.version.revision)?;
		writer.write_u8(self.algorithm.id())?;
		writer.write_u32::<LittleEndian>(self.body_size.unwrap_or(UNRECORDED_BODY))?;
		writer.write_u64::<LittleEndian>(self.original_size)?;
		writer.write_u32::<LittleEndian>(self.checksum)?;
		Ok(())
	}

	/// Parses a full frame header from the start of `bytes`.
	pub fn parse(bytes: &[u8]) -> Result<Self, ResultState> {
		if bytes.len() < FRAME_LEN {
			return Err(ResultState::InputBufferTooSmall);
		}
		let (version, algorithm) = parse_stream_header(bytes)?;
		let mut reader = &bytes[4..FRAME_LEN];
		let body_size = reader.read_u32::<LittleEndian>().map_err(truncated)?;
		let body_size = Some(body_size).filter(|len| *len != UNRECORDED_BODY);
		let original_size = reader.read_u64::<LittleEndian>().map_err(truncated)?;
		let checksum = reader.read_u32::<LittleEndian>().map_err(truncated)?;
		Ok(Self { version, algorithm, body_size, original_size, checksum })
	}
}

fn truncated(_: io::Error) -> ResultState {
	ResultState::InputBufferTooSmall
}

/// Reads the version and algorithm from the leading stream-header bytes.
pub fn parse_stream_header(bytes: &[u8]) -> Result<(Version, Algorithm), ResultState> {
	if bytes.len() < HEADER_SIZE {
		return Err(ResultState::InputBufferTooSmall);
	}
	let mut reader: &[u8] = bytes;
	let mut fields = [0u8; 4];
	reader.read_exact(&mut fields).map_err(truncated)?;
	let version = Version { major: fields[0], minor: fields[1], revision: fields[2] };
	let algorithm = Algorithm::from_id(fields[3]).map_err(|_| ResultState::InvalidAlgorithm)?;
	Ok((version, algorithm))
}
