use crate::task::LoadStatus;
use cubes::position::{ColumnPosition, CubePosition};
use cubes::{ColumnError, PositionError};
use std::path::PathBuf;

/// A broken loader contract. Unlike a storage error, which only fails the one task, these are
/// fatal and are propagated to the caller.
#[derive(thiserror::Error, Debug)]
pub enum LoaderError {
	#[error("column dependency of cube {0} was dropped without being resolved")]
	DependencyDropped(CubePosition),
	#[error("cube {cube} was given column {column} as its dependency")]
	ColumnMismatch { cube: CubePosition, column: ColumnPosition },
	#[error("I/O worker panicked while loading cube {position}: {message}")]
	WorkerPanicked { position: CubePosition, message: String },
	#[error("storage produced cube {actual} for a load of cube {expected}")]
	PositionMismatch { expected: CubePosition, actual: CubePosition },
	#[error("completion for cube {0} has no outstanding task")]
	UnknownTask(CubePosition),
	#[error("completion for cube {position} arrived in state {status:?}")]
	UnexpectedState { position: CubePosition, status: LoadStatus },
	#[error("invalid cube position: {0}")]
	Position(#[from] PositionError),
	#[error("could not install loaded cube: {0}")]
	Install(#[from] ColumnError),
	#[error("could not build the I/O worker pool: {0}")]
	Pool(#[from] rayon::ThreadPoolBuildError),
	#[error("could not read loader config {}: {source}", .path.display())]
	ConfigRead { path: PathBuf, source: std::io::Error },
	#[error("invalid loader config: {0}")]
	Config(#[from] serde_json::Error)
}

impl LoaderError {
	/// The cube whose task a worker fault belongs to, if the error came from a worker.
	pub fn task_position(&self) -> Option<CubePosition> {
		match *self {
			LoaderError::DependencyDropped(position) => Some(position),
			LoaderError::ColumnMismatch { cube, .. } => Some(cube),
			LoaderError::WorkerPanicked { position, .. } => Some(position),
			_ => None
		}
	}
}
