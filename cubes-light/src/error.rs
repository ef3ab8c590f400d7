use cubes::position::{ColumnPosition, CubePosition, GlobalPosition};
use cubes::PositionError;
use std::fmt::{self, Display, Formatter};

#[derive(thiserror::Error, Debug, Clone, Eq, PartialEq)]
pub enum SnapshotError {
	#[error("{0}")]
	MissingCube(MissingCubeReport),
	#[error("column {0} of a snapshot cube has already been dropped")]
	MissingColumn(ColumnPosition),
	#[error("block {at} is outside of the snapshot window {min} to {max}")]
	OutsideWindow { at: GlobalPosition, min: CubePosition, max: CubePosition },
	#[error("invalid snapshot coordinate: {0}")]
	OutOfRange(#[from] PositionError)
}

/// Everything known about a missing neighbor at the time a snapshot was built: the cube that
/// was asked for, and every cube that was resident in every loaded column.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MissingCubeReport {
	pub cube: CubePosition,
	pub columns: Vec<ColumnReport>
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ColumnReport {
	pub position: ColumnPosition,
	pub cubes: Vec<CubePosition>
}

impl MissingCubeReport {
	/// Whether any resident column holds the missing cube's column position.
	pub fn column_resident(&self) -> bool {
		let column = self.cube.column();

		self.columns.iter().any(|report| report.position == column)
	}
}

impl Display for MissingCubeReport {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		writeln!(f, "Cube not loaded while creating cube cache")?;
		write!(f, "\tGetting cube: {}", self.cube)?;

		for (index, column) in self.columns.iter().enumerate() {
			write!(f, "\n\tColumn{} {}: ", index, column.position)?;

			if column.cubes.is_empty() {
				write!(f, "<none>")?;
			}

			for (index, cube) in column.cubes.iter().enumerate() {
				if index != 0 {
					write!(f, ", ")?;
				}

				write!(f, "{}", cube)?;
			}
		}

		Ok(())
	}
}
