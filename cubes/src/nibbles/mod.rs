mod cube;

pub use self::cube::NibbleCube;

/// Returns the yzx index into a nibble array. Returns in the form (index, shift).
fn nibble_index(index: usize) -> (usize, u8) {
	(index >> 1, ((index & 1) as u8) << 2)
}

/// The 4-bit unsigned integer type.
#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, PartialOrd, Ord, Default)]
pub struct u4(u8);
impl u4 {
	pub const MIN: u4 = u4(0);
	pub const MAX: u4 = u4(15);

	/// Casts a u8 to a u4, truncating the value in the process.
	pub const fn new(x: u8) -> Self {
		u4(x & 0xF)
	}

	/// Casts a u4 to an u8, returning a value in the range 0-15 (inclusive).
	pub fn raw(self) -> u8 {
		self.0
	}

	/// Adds a u4 to another u4, capping the result to 15 if it were to overflow.
	pub fn saturating_add(self, rhs: Self) -> Self {
		u4(::std::cmp::min(self.0 + rhs.0, 15))
	}

	/// Subtracts a u4 from another u4, capping the result to 0 if it were to underflow.
	pub fn saturating_sub(self, rhs: Self) -> Self {
		u4(self.0.saturating_sub(rhs.0))
	}
}
