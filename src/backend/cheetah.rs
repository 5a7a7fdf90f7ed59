//! Cheetah: two flag bits per unit. Adds a second chunk-map slot and a
//! prediction table keyed by the hash of the previous unit, so a correctly
//! predicted unit costs no payload at all.

use super::cursor::{Input, Output, Table};
use super::hash;
use super::signature::{FlagReader, FlagWriter};
use crate::algorithm::HASH_SLOTS;
use crate::state::KernelStatus;
use byteorder::{ByteOrder, LittleEndian};

const PLAIN: u64 = 0;
const MAP_A: u64 = 1;
const MAP_B: u64 = 2;
const PREDICTED: u64 = 3;

struct State<'a> {
	chunks: Table<'a>,
	predictions: Table<'a>,
	last: usize,
}

impl<'a> State<'a> {
	fn new(dictionary: &'a mut [u8]) -> Self {
		let (chunks, predictions) = dictionary.split_at_mut(HASH_SLOTS * 8);
		Self { chunks: Table::new(chunks), predictions: Table::new(predictions), last: 0 }
	}

	fn update(&mut self, flag: u64, word: u32, h: usize) {
		match flag {
			MAP_B => self.chunks.swap(2 * h, 2 * h + 1),
			PLAIN => {
				let a = self.chunks.get(2 * h);
				self.chunks.set(2 * h + 1, a);
				self.chunks.set(2 * h, word);
			}
			_ => {}
		}
		if flag != PREDICTED {
			self.predictions.set(self.last, word);
		}
		self.last = h;
	}
}

pub(crate) fn encode(
	units: &[u8],
	out: &mut Output<'_>,
	dictionary: &mut [u8],
) -> Result<(), KernelStatus> {
	let mut state = State::new(dictionary);
	let mut flags = FlagWriter::new();

	for unit in units.chunks_exact(4) {
		let word = LittleEndian::read_u32(unit);
		let h = hash(word);
		let flag = if state.predictions.get(state.last) == word {
			PREDICTED
		} else if state.chunks.get(2 * h) == word {
			MAP_A
		} else if state.chunks.get(2 * h + 1) == word {
			MAP_B
		} else {
			PLAIN
		};

		flags.push(out, flag, 2)?;
		match flag {
			MAP_A | MAP_B => out.write_u16(h as u16)?,
			PLAIN => out.write_u32(word)?,
			_ => {}
		}
		state.update(flag, word, h);
	}

	flags.finish(out);
	Ok(())
}

pub(crate) fn decode(
	input: &mut Input<'_>,
	units: &mut [u8],
	dictionary: &mut [u8],
) -> Result<(), KernelStatus> {
	let mut state = State::new(dictionary);
	let mut flags = FlagReader::new();

	for unit in units.chunks_exact_mut(4) {
		let flag = flags.read(input, 2)?;
		let word = match flag {
			PREDICTED => state.predictions.get(state.last),
			MAP_A => state.chunks.get(2 * input.read_u16()? as usize),
			MAP_B => state.chunks.get(2 * input.read_u16()? as usize + 1),
			_ => input.read_u32()?,
		};
		state.update(flag, word, hash(word));
		LittleEndian::write_u32(unit, word);
	}

	Ok(())
}
