//! Lion: five unit forms with adaptively ranked variable-length flag codes.
//!
//! Each unit is coded as the first matching form of: prediction slot A,
//! prediction slot B, chunk slot A, chunk slot B, plain. Forms are ranked by
//! how often they were used; rank `r < 4` is written as `r` zero bits and a
//! one bit, rank 4 as four zero bits. The usage counters are kept at the end
//! of the dictionary so a context carries its ranking from call to call.

use super::cursor::{Input, Output, Table};
use super::hash;
use super::signature::{FlagReader, FlagWriter};
use crate::algorithm::HASH_SLOTS;
use crate::state::KernelStatus;
use byteorder::{ByteOrder, LittleEndian};

const FORMS: usize = 5;
const LAST_RANK: usize = FORMS - 1;
const RESCALE_THRESHOLD: u32 = 1 << 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Form {
	PredictedA = 0,
	PredictedB = 1,
	MapA = 2,
	MapB = 3,
	Plain = 4,
}

const ALL_FORMS: [Form; FORMS] = [
	Form::PredictedA,
	Form::PredictedB,
	Form::MapA,
	Form::MapB,
	Form::Plain,
];

struct FormModel {
	usage: [u32; FORMS],
	ranking: [Form; FORMS],
	rank_of: [usize; FORMS],
}

impl FormModel {
	fn load(stats: &[u8]) -> Self {
		let mut usage = [0u32; FORMS];
		for (i, count) in usage.iter_mut().enumerate() {
			*count = LittleEndian::read_u32(&stats[i * 4..i * 4 + 4]);
		}
		let mut ranking = ALL_FORMS;
		ranking.sort_by_key(|form| std::cmp::Reverse(usage[*form as usize]));
		let mut rank_of = [0usize; FORMS];
		for (rank, form) in ranking.iter().enumerate() {
			rank_of[*form as usize] = rank;
		}
		Self { usage, ranking, rank_of }
	}

	fn store(&self, stats: &mut [u8]) {
		for (i, count) in self.usage.iter().enumerate() {
			LittleEndian::write_u32(&mut stats[i * 4..i * 4 + 4], *count);
		}
	}

	fn code(&self, form: Form) -> (u64, u32) {
		let rank = self.rank_of[form as usize];
		if rank < LAST_RANK {
			(1 << rank, rank as u32 + 1)
		} else {
			(0, LAST_RANK as u32)
		}
	}

	fn read(&self, flags: &mut FlagReader, input: &mut Input<'_>) -> Result<Form, KernelStatus> {
		let mut rank = 0;
		while rank < LAST_RANK && !flags.read_bit(input)? {
			rank += 1;
		}
		Ok(self.ranking[rank])
	}

	/// Counts a use of `form` and lets it overtake its neighbour above.
	fn update(&mut self, form: Form) {
		let f = form as usize;
		self.usage[f] += 1;
		let rank = self.rank_of[f];
		if rank > 0 {
			let above = self.ranking[rank - 1];
			if self.usage[above as usize] < self.usage[f] {
				self.ranking.swap(rank - 1, rank);
				self.rank_of[f] = rank - 1;
				self.rank_of[above as usize] = rank;
			}
		}
		if self.usage[f] >= RESCALE_THRESHOLD {
			for count in self.usage.iter_mut() {
				*count >>= 1;
			}
		}
	}
}

struct State<'a> {
	chunks: Table<'a>,
	predictions: Table<'a>,
	stats: &'a mut [u8],
	model: FormModel,
	last: usize,
}

impl<'a> State<'a> {
	fn new(dictionary: &'a mut [u8]) -> Self {
		let (chunks, rest) = dictionary.split_at_mut(HASH_SLOTS * 8);
		let (predictions, stats) = rest.split_at_mut(HASH_SLOTS * 8);
		let model = FormModel::load(stats);
		Self {
			chunks: Table::new(chunks),
			predictions: Table::new(predictions),
			stats,
			model,
			last: 0,
		}
	}

	fn update(&mut self, form: Form, word: u32, h: usize) {
		match form {
			Form::MapB => self.chunks.swap(2 * h, 2 * h + 1),
			Form::Plain => {
				let a = self.chunks.get(2 * h);
				self.chunks.set(2 * h + 1, a);
				self.chunks.set(2 * h, word);
			}
			_ => {}
		}
		let p = 2 * self.last;
		match form {
			Form::PredictedA => {}
			Form::PredictedB => self.predictions.swap(p, p + 1),
			_ => {
				let a = self.predictions.get(p);
				self.predictions.set(p + 1, a);
				self.predictions.set(p, word);
			}
		}
		self.model.update(form);
		self.last = h;
	}

	fn finish(self) {
		self.model.store(self.stats);
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
		let p = 2 * state.last;
		let form = if state.predictions.get(p) == word {
			Form::PredictedA
		} else if state.predictions.get(p + 1) == word {
			Form::PredictedB
		} else if state.chunks.get(2 * h) == word {
			Form::MapA
		} else if state.chunks.get(2 * h + 1) == word {
			Form::MapB
		} else {
			Form::Plain
		};

		let (code, len) = state.model.code(form);
		flags.push(out, code, len)?;
		match form {
			Form::MapA | Form::MapB => out.write_u16(h as u16)?,
			Form::Plain => out.write_u32(word)?,
			_ => {}
		}
		state.update(form, word, h);
	}

	flags.finish(out);
	state.finish();
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
		let form = state.model.read(&mut flags, input)?;
		let p = 2 * state.last;
		let word = match form {
			Form::PredictedA => state.predictions.get(p),
			Form::PredictedB => state.predictions.get(p + 1),
			Form::MapA => state.chunks.get(2 * input.read_u16()? as usize),
			Form::MapB => state.chunks.get(2 * input.read_u16()? as usize + 1),
			Form::Plain => input.read_u32()?,
		};
		state.update(form, word, hash(word));
		LittleEndian::write_u32(unit, word);
	}

	state.finish();
	Ok(())
}
