//! Flag codes packed into 64-bit signatures.
//!
//! Codes are written LSB-first. A signature is reserved in the output only
//! when a bit needs room, which places it directly before the payload of the
//! first unit it describes. The reader loads signatures at the same points,
//! so a code may straddle two signatures.

use super::cursor::{Input, Output};
use crate::state::KernelStatus;

const SIGNATURE_BYTES: usize = 8;
const SIGNATURE_BITS: u32 = 64;

pub(crate) struct FlagWriter {
	slot: Option<usize>,
	bits: u64,
	used: u32,
}

impl FlagWriter {
	pub fn new() -> Self {
		Self { slot: None, bits: 0, used: 0 }
	}

	pub fn push(
		&mut self,
		out: &mut Output<'_>,
		mut code: u64,
		mut len: u32,
	) -> Result<(), KernelStatus> {
		while len > 0 {
			if self.slot.is_none() || self.used == SIGNATURE_BITS {
				self.flush(out);
				self.slot = Some(out.reserve(SIGNATURE_BYTES)?);
				self.bits = 0;
				self.used = 0;
			}
			let take = len.min(SIGNATURE_BITS - self.used);
			let mask = if take == SIGNATURE_BITS { u64::MAX } else { (1u64 << take) - 1 };
			self.bits |= (code & mask) << self.used;
			self.used += take;
			len -= take;
			code = if take == SIGNATURE_BITS { 0 } else { code >> take };
		}
		Ok(())
	}

	fn flush(&mut self, out: &mut Output<'_>) {
		if let Some(at) = self.slot.take() {
			out.patch_u64(at, self.bits);
		}
	}

	/// Writes the last, possibly partial, signature.
	pub fn finish(mut self, out: &mut Output<'_>) {
		self.flush(out);
	}
}

pub(crate) struct FlagReader {
	bits: u64,
	remaining: u32,
}

impl FlagReader {
	pub fn new() -> Self {
		Self { bits: 0, remaining: 0 }
	}

	pub fn read_bit(&mut self, input: &mut Input<'_>) -> Result<bool, KernelStatus> {
		if self.remaining == 0 {
			self.bits = input.read_u64()?;
			self.remaining = SIGNATURE_BITS;
		}
		let bit = self.bits & 1 == 1;
		self.bits >>= 1;
		self.remaining -= 1;
		Ok(bit)
	}

	pub fn read(&mut self, input: &mut Input<'_>, len: u32) -> Result<u64, KernelStatus> {
		let mut value = 0u64;
		for i in 0..len {
			if self.read_bit(input)? {
				value |= 1 << i;
			}
		}
		Ok(value)
	}
}
