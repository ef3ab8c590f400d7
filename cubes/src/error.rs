use crate::position::{ColumnPosition, CubePosition};

/// A coordinate that cannot be represented as a cube position or sparse key.
/// These always indicate a caller bug.
#[derive(thiserror::Error, Debug, Clone, Eq, PartialEq)]
pub enum PositionError {
	#[error("cube y coordinate {0} is negative")]
	NegativeY(i64),
	#[error("cube coordinate ({x}, {y}, {z}) is outside of the addressable range")]
	OutOfRange { x: i64, y: i64, z: i64 },
	#[error("sparse key {0:#018x} has reserved bits set")]
	MalformedKey(u64)
}

#[derive(thiserror::Error, Debug, Clone, Eq, PartialEq)]
pub enum ColumnError {
	#[error("cube {cube} does not belong in column {column}")]
	WrongColumn { cube: CubePosition, column: ColumnPosition },
	#[error("column already holds a cube at {0}")]
	Occupied(CubePosition)
}

#[derive(thiserror::Error, Debug, Clone, Eq, PartialEq)]
pub enum HeightDataError {
	#[error("raw height data must be {expected} bytes long, got {actual}")]
	Length { expected: usize, actual: usize }
}
