//! Chameleon: one flag bit per 4-byte unit. A unit already present in the
//! chunk map is replaced by its 16-bit hash, anything else is stored plain
//! and becomes the map entry for its hash.

use super::cursor::{Input, Output, Table};
use super::hash;
use super::signature::{FlagReader, FlagWriter};
use crate::state::KernelStatus;
use byteorder::{ByteOrder, LittleEndian};

const PLAIN: u64 = 0;
const MAP: u64 = 1;

pub(crate) fn encode(
	units: &[u8],
	out: &mut Output<'_>,
	dictionary: &mut [u8],
) -> Result<(), KernelStatus> {
	let mut chunks = Table::new(dictionary);
	let mut flags = FlagWriter::new();

	for unit in units.chunks_exact(4) {
		let word = LittleEndian::read_u32(unit);
		let h = hash(word);
		if chunks.get(h) == word {
			flags.push(out, MAP, 1)?;
			out.write_u16(h as u16)?;
		} else {
			flags.push(out, PLAIN, 1)?;
			out.write_u32(word)?;
			chunks.set(h, word);
		}
	}

	flags.finish(out);
	Ok(())
}

pub(crate) fn decode(
	input: &mut Input<'_>,
	units: &mut [u8],
	dictionary: &mut [u8],
) -> Result<(), KernelStatus> {
	let mut chunks = Table::new(dictionary);
	let mut flags = FlagReader::new();

	for unit in units.chunks_exact_mut(4) {
		let word = if flags.read_bit(input)? {
			chunks.get(input.read_u16()? as usize)
		} else {
			let word = input.read_u32()?;
			chunks.set(hash(word), word);
			word
		};
		LittleEndian::write_u32(unit, word);
	}

	Ok(())
}
