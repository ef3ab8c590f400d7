use crate::error::PositionError;
use crate::position::{cube_of, local_of, LayerPosition, LocalPosition};
use std::fmt::{Debug, Display, Formatter, Result};

const MAX_U20: u64 = (1 << 20) - 1;
const MAX_U21: u64 = (1 << 21) - 1;

/// Lowest representable horizontal cube coordinate.
pub const HORIZONTAL_MIN: i32 = -(1 << 20);
/// Highest representable horizontal cube coordinate.
pub const HORIZONTAL_MAX: i32 = (1 << 20) - 1;
/// Highest representable vertical cube coordinate.
pub const VERTICAL_MAX: u32 = (1 << 20) - 1;

/// The position of a block in the world.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Hash)]
pub struct GlobalPosition {
	x: i32,
	y: i32,
	z: i32
}

impl GlobalPosition {
	pub fn new(x: i32, y: i32, z: i32) -> Self {
		GlobalPosition { x, y, z }
	}

	pub fn local(&self) -> LocalPosition {
		LocalPosition::new(local_of(self.x), local_of(self.y), local_of(self.z))
	}

	pub fn cube(&self) -> std::result::Result<CubePosition, PositionError> {
		CubePosition::new(cube_of(self.x), cube_of(self.y), cube_of(self.z))
	}

	pub fn column(&self) -> ColumnPosition {
		ColumnPosition::new(cube_of(self.x), cube_of(self.z))
	}

	pub fn x(&self) -> i32 {
		self.x
	}

	pub fn y(&self) -> i32 {
		self.y
	}

	pub fn z(&self) -> i32 {
		self.z
	}
}

impl Display for GlobalPosition {
	fn fmt(&self, f: &mut Formatter) -> Result {
		write!(f, "({}, {}, {})", self.x, self.y, self.z)
	}
}

/// The position of a cube in cube space. Every block coordinate divided by 16, rounding down.
/// Y is never negative.
#[derive(Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Hash)]
pub struct CubePosition {
	x: i32,
	y: u32,
	z: i32
}

impl CubePosition {
	/// Creates a new CubePosition, checking that it can be packed into a `SparseKey`.
	pub fn new(x: i32, y: i32, z: i32) -> std::result::Result<Self, PositionError> {
		Self::from_wide(x as i64, y as i64, z as i64)
	}

	fn from_wide(x: i64, y: i64, z: i64) -> std::result::Result<Self, PositionError> {
		if y < 0 {
			return Err(PositionError::NegativeY(y));
		}

		let horizontal = (HORIZONTAL_MIN as i64)..=(HORIZONTAL_MAX as i64);

		if !horizontal.contains(&x) || !horizontal.contains(&z) || y > VERTICAL_MAX as i64 {
			return Err(PositionError::OutOfRange { x, y, z });
		}

		Ok(CubePosition { x: x as i32, y: y as u32, z: z as i32 })
	}

	pub fn from_column(column: ColumnPosition, y: u32) -> std::result::Result<Self, PositionError> {
		Self::from_wide(column.x() as i64, y as i64, column.z() as i64)
	}

	pub fn x(&self) -> i32 {
		self.x
	}

	pub fn y(&self) -> u32 {
		self.y
	}

	pub fn z(&self) -> i32 {
		self.z
	}

	pub fn key(&self) -> SparseKey {
		SparseKey::pack(*self)
	}

	pub fn column(&self) -> ColumnPosition {
		ColumnPosition::new(self.x, self.z)
	}

	/// Returns the position of the block at local (0, 0, 0) in this cube.
	pub fn min_block(&self) -> GlobalPosition {
		GlobalPosition::new(self.x << 4, (self.y << 4) as i32, self.z << 4)
	}

	/// Combines this cube position with a cube-local position into a block position.
	pub fn with_local(&self, local: LocalPosition) -> GlobalPosition {
		let min = self.min_block();

		GlobalPosition::new(
			min.x() | (local.x() as i32),
			min.y() | (local.y() as i32),
			min.z() | (local.z() as i32)
		)
	}

	pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> std::result::Result<Self, PositionError> {
		Self::from_wide(
			self.x as i64 + dx as i64,
			self.y as i64 + dy as i64,
			self.z as i64 + dz as i64
		)
	}
}

impl Display for CubePosition {
	fn fmt(&self, f: &mut Formatter) -> Result {
		write!(f, "({}, {}, {})", self.x, self.y, self.z)
	}
}

impl Debug for CubePosition {
	fn fmt(&self, f: &mut Formatter) -> Result {
		write!(f, "CubePosition {{ x: {}, y: {}, z: {} }}", self.x, self.y, self.z)
	}
}

/// The horizontal position of a column, in cube space.
#[derive(Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Hash)]
pub struct ColumnPosition {
	x: i32,
	z: i32
}

impl ColumnPosition {
	pub fn new(x: i32, z: i32) -> Self {
		ColumnPosition { x, z }
	}

	pub fn x(&self) -> i32 {
		self.x
	}

	pub fn z(&self) -> i32 {
		self.z
	}

	pub fn cube(&self, y: u32) -> std::result::Result<CubePosition, PositionError> {
		CubePosition::from_column(*self, y)
	}

	/// Returns the position of the block column at the given layer position in this column.
	pub fn block_column(&self, layer: LayerPosition) -> (i32, i32) {
		((self.x << 4) | (layer.x() as i32), (self.z << 4) | (layer.z() as i32))
	}
}

impl Display for ColumnPosition {
	fn fmt(&self, f: &mut Formatter) -> Result {
		write!(f, "({}, {})", self.x, self.z)
	}
}

impl Debug for ColumnPosition {
	fn fmt(&self, f: &mut Formatter) -> Result {
		write!(f, "ColumnPosition {{ x: {}, z: {} }}", self.x, self.z)
	}
}

/// A cube position packed into a single integer for use as a map key.
///
/// Layout: `Y << 42 | Z << 21 | X`, where X and Z are 21-bit two's complement values and Y is an
/// unsigned 20-bit value. The top 2 bits are reserved and must be zero.
#[derive(Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Hash)]
pub struct SparseKey(u64);

impl SparseKey {
	const RESERVED_MASK: u64 = !((1 << 62) - 1);

	pub fn pack(position: CubePosition) -> Self {
		let (x, y, z) = (
			(position.x() as u64) & MAX_U21,
			(position.y() as u64) & MAX_U20,
			(position.z() as u64) & MAX_U21
		);

		SparseKey(
			(y << 42) |
			(z << 21) |
			 x
		)
	}

	/// Wraps a raw key, for example one read back from storage. The key is checked when it is
	/// unpacked.
	pub fn from_raw(raw: u64) -> Self {
		SparseKey(raw)
	}

	pub fn raw(&self) -> u64 {
		self.0
	}

	pub fn unpack(&self) -> std::result::Result<CubePosition, PositionError> {
		if self.0 & Self::RESERVED_MASK != 0 {
			return Err(PositionError::MalformedKey(self.0));
		}

		let x = ((self.0 & MAX_U21) as i32) << 11 >> 11;
		let z = (((self.0 >> 21) & MAX_U21) as i32) << 11 >> 11;
		let y = ((self.0 >> 42) & MAX_U20) as u32;

		Ok(CubePosition { x, y, z })
	}
}

impl Debug for SparseKey {
	fn fmt(&self, f: &mut Formatter) -> Result {
		write!(f, "SparseKey({:#018x})", self.0)
	}
}
