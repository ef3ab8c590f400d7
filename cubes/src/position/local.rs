use crate::position::LayerPosition;
use std::fmt::{Debug, Display, Formatter, Result};

/// The position of a block within a cube, packed as `(Y<<8) | (Z<<4) | X`.
#[derive(Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Hash)]
pub struct LocalPosition(u16);

impl LocalPosition {
	/// Creates a new LocalPosition from the X, Y, and Z components.
	/// ### Out of bounds behavior
	/// If the arguments are out of bounds, then they are truncated.
	pub fn new(x: u8, y: u8, z: u8) -> Self {
		LocalPosition (
			(((y&0xF) as u16) << 8) |
			(((z&0xF) as u16) << 4) |
			 ((x&0xF) as u16)
		)
	}

	/// Creates a new LocalPosition from the Y component and LayerPosition containing the X and Z components.
	pub fn from_layer(y: u8, layer: LayerPosition) -> Self {
		LocalPosition(
			(((y&0xF) as u16) << 8) | (layer.zx() as u16)
		)
	}

	/// Creates a new LocalPosition from a YZX index.
	/// ### Out of bounds behavior
	/// If the index is out of bounds, it is truncated.
	pub fn from_yzx(yzx: u16) -> Self {
		LocalPosition(yzx & 4095)
	}

	/// Returns the X component.
	pub fn x(&self) -> u8 {
		 (self.0 & 0x00F) as u8
	}

	/// Returns the Z component.
	pub fn z(&self) -> u8 {
		((self.0 & 0x0F0) >> 4) as u8
	}

	/// Returns the Y component.
	pub fn y(&self) -> u8 {
		((self.0 & 0xF00) >> 8) as u8
	}

	/// Returns the index represented as `(Z<<4) | X`.
	pub fn zx(&self) -> u8 {
		(self.0 & 255) as u8
	}

	/// Returns the layer position. This is equivalent to `LayerPosition::from_zx(position.zx())`.
	pub fn layer(&self) -> LayerPosition {
		LayerPosition::from_zx(self.zx())
	}

	/// Returns the index represented as `(Y<<8) | (Z<<4) | X`, for in-cube indices.
	pub fn yzx(&self) -> u16 {
		self.0
	}

	/// Iterates over every position in a cube in YZX order.
	pub fn enumerate() -> impl Iterator<Item = LocalPosition> {
		(0..4096u16).map(LocalPosition)
	}
}

impl Display for LocalPosition {
	fn fmt(&self, f: &mut Formatter) -> Result {
		write!(f, "({}, {}, {})", self.x(), self.y(), self.z())
	}
}

impl Debug for LocalPosition {
	fn fmt(&self, f: &mut Formatter) -> Result {
		write!(f, "LocalPosition {{ x: {}, y: {}, z: {} }}", self.x(), self.y(), self.z())
	}
}
