//! Bounds-checked cursors over caller buffers and typed views over
//! dictionary bytes.

use crate::state::KernelStatus;
use byteorder::{ByteOrder, LittleEndian};

pub(crate) struct Output<'a> {
	buf: &'a mut [u8],
	pos: usize,
}

impl<'a> Output<'a> {
	pub fn new(buf: &'a mut [u8]) -> Self {
		Self { buf, pos: 0 }
	}

	pub fn position(&self) -> usize {
		self.pos
	}

	/// Claims `len` bytes and returns their offset; the bytes are filled later.
	pub fn reserve(&mut self, len: usize) -> Result<usize, KernelStatus> {
		if self.buf.len() - self.pos < len {
			return Err(KernelStatus::OutputStall);
		}
		let at = self.pos;
		self.pos += len;
		Ok(at)
	}

	pub fn slice_mut(&mut self, at: usize, len: usize) -> &mut [u8] {
		&mut self.buf[at..at + len]
	}

	pub fn patch_u64(&mut self, at: usize, value: u64) {
		LittleEndian::write_u64(&mut self.buf[at..at + 8], value);
	}

	pub fn write_u16(&mut self, value: u16) -> Result<(), KernelStatus> {
		let at = self.reserve(2)?;
		LittleEndian::write_u16(&mut self.buf[at..at + 2], value);
		Ok(())
	}

	pub fn write_u32(&mut self, value: u32) -> Result<(), KernelStatus> {
		let at = self.reserve(4)?;
		LittleEndian::write_u32(&mut self.buf[at..at + 4], value);
		Ok(())
	}

	pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), KernelStatus> {
		let at = self.reserve(bytes.len())?;
		self.buf[at..at + bytes.len()].copy_from_slice(bytes);
		Ok(())
	}
}

pub(crate) struct Input<'a> {
	buf: &'a [u8],
	pos: usize,
}

impl<'a> Input<'a> {
	pub fn new(buf: &'a [u8]) -> Self {
		Self { buf, pos: 0 }
	}

	pub fn remaining(&self) -> usize {
		self.buf.len() - self.pos
	}

	pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], KernelStatus> {
		if self.remaining() < len {
			return Err(KernelStatus::InputStall);
		}
		let bytes = &self.buf[self.pos..self.pos + len];
		self.pos += len;
		Ok(bytes)
	}

	pub fn read_u16(&mut self) -> Result<u16, KernelStatus> {
		self.read_bytes(2).map(LittleEndian::read_u16)
	}

	pub fn read_u32(&mut self) -> Result<u32, KernelStatus> {
		self.read_bytes(4).map(LittleEndian::read_u32)
	}

	pub fn read_u64(&mut self) -> Result<u64, KernelStatus> {
		self.read_bytes(8).map(LittleEndian::read_u64)
	}
}

/// Little-endian `u32` slots laid over a region of dictionary bytes.
pub(crate) struct Table<'a> {
	bytes: &'a mut [u8],
}

impl<'a> Table<'a> {
	pub fn new(bytes: &'a mut [u8]) -> Self {
		Self { bytes }
	}

	#[inline]
	pub fn get(&self, slot: usize) -> u32 {
		LittleEndian::read_u32(&self.bytes[slot * 4..slot * 4 + 4])
	}

	#[inline]
	pub fn set(&mut self, slot: usize, value: u32) {
		LittleEndian::write_u32(&mut self.bytes[slot * 4..slot * 4 + 4], value);
	}

	#[inline]
	pub fn swap(&mut self, a: usize, b: usize) {
		let (va, vb) = (self.get(a), self.get(b));
		self.set(a, vb);
		self.set(b, va);
	}
}
