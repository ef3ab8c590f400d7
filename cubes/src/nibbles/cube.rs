use super::{nibble_index, u4};
use crate::position::LocalPosition;
use std::fmt::{Debug, Formatter, Result};

/// A 16x16x16 collection of nibbles (`u4`s).
/// Indexed with LocalPosition.
#[derive(Eq, PartialEq)]
pub struct NibbleCube(Box<[u8; 2048]>);
impl NibbleCube {
	/// Creates a NibbleCube where every nibble holds `value`.
	pub fn filled(value: u4) -> Self {
		let mut cube = NibbleCube::default();
		cube.fill(value);

		cube
	}

	/// Creates a `NibbleCube` from a raw array of `u4x2`s.
	/// `a` is the even element, `b` is the odd element.
	/// For example:
	/// (x:0,y:0,z:0) is index 0, element `a`.
	/// (x:15,y:0,z:15) is index 127, element `b`.
	pub fn from_raw(raw: Box<[u8; 2048]>) -> Self {
		NibbleCube(raw)
	}

	pub fn get(&self, at: LocalPosition) -> u4 {
		let (index, shift) = nibble_index(at.yzx() as usize);

		let single = self.0[index] & (0xF << shift);

		u4::new(single >> shift)
	}

	pub fn set(&mut self, at: LocalPosition, value: u4) {
		let value = value.raw() & 15;

		let (index, shift) = nibble_index(at.yzx() as usize);

		let cleared = !((!self.0[index]) | (0xF << shift));

		self.0[index] = cleared | (value << shift);
	}

	pub fn fill(&mut self, value: u4) {
		let value = value.raw() & 15;
		let fill = (value << 4) | value;

		for term in self.0.iter_mut() {
			*term = fill;
		}
	}

	/// Returns a reference to the raw array of `u4x2`s, in the layout described by `from_raw`.
	pub fn raw(&self) -> &[u8; 2048] {
		&self.0
	}

	pub fn into_raw(self) -> Box<[u8; 2048]> {
		self.0
	}
}

impl Default for NibbleCube {
	fn default() -> Self {
		NibbleCube(Box::new([0; 2048]))
	}
}

impl Debug for NibbleCube {
	fn fmt(&self, f: &mut Formatter) -> Result {
		write!(f, "NibbleCube({:?})", &self.0[..])
	}
}

impl Clone for NibbleCube {
	fn clone(&self) -> Self {
		let mut other = Box::new([0; 2048]);

		other.copy_from_slice(&self.0[..]);

		NibbleCube(other)
	}
}
