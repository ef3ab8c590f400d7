use crate::error::LoaderError;
use crate::storage::CubeIo;
use crossbeam_channel::Sender;
use cubes::position::CubePosition;
use cubes::{ColumnHandle, WorldContext};
use rayon::ThreadPool;
use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

static LOG: &str = "cube-loading";

/// The state of one load task. Moves strictly forward:
/// `Pending` -> `IoComplete` or `IoFailed` -> `Installed`.
#[derive(Debug)]
pub enum LoadState<D> {
	/// Waiting for the owning column, or for the storage read.
	Pending,
	/// The storage read finished. `None` means the cube was not in storage.
	IoComplete(Option<D>),
	/// The storage read failed. Terminal: no cube is produced.
	IoFailed(io::Error),
	/// The result was handed over to the world on the main context. Terminal.
	Installed
}

impl<D> LoadState<D> {
	pub fn from_io(result: io::Result<Option<D>>) -> Self {
		match result {
			Ok(raw) => LoadState::IoComplete(raw),
			Err(error) => LoadState::IoFailed(error)
		}
	}

	pub fn status(&self) -> LoadStatus {
		match self {
			LoadState::Pending => LoadStatus::Pending,
			LoadState::IoComplete(_) => LoadStatus::IoComplete,
			LoadState::IoFailed(_) => LoadStatus::IoFailed,
			LoadState::Installed => LoadStatus::Installed
		}
	}
}

/// `LoadState` without its data, for reporting.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum LoadStatus {
	Pending,
	IoComplete,
	IoFailed,
	Installed
}

impl LoadStatus {
	pub fn is_terminal(self) -> bool {
		match self {
			LoadStatus::IoFailed | LoadStatus::Installed => true,
			_ => false
		}
	}
}

pub(crate) enum Message<W, D> where W: WorldContext {
	Complete {
		position: CubePosition,
		column: ColumnHandle<W>,
		state: LoadState<D>
	},
	Fault(LoaderError)
}

pub(crate) struct IoJob<W, S> where W: WorldContext + 'static, S: CubeIo<W> {
	pub(crate) position: CubePosition,
	pub(crate) storage: Arc<S>,
	pub(crate) pool: Arc<ThreadPool>,
	pub(crate) sender: Sender<Message<W, S::Raw>>
}

impl<W, S> IoJob<W, S> where W: WorldContext + 'static, S: CubeIo<W> {
	fn run(self, column: ColumnHandle<W>) {
		let position = self.position;
		let column_position = column.read().position();

		let message = if column_position != position.column() {
			Message::Fault(LoaderError::ColumnMismatch { cube: position, column: column_position })
		} else {
			let storage = &self.storage;
			let result = panic::catch_unwind(AssertUnwindSafe(|| storage.load_cube_async_part(&column, position.y())));

			match result {
				Ok(result) => Message::Complete { position, column, state: LoadState::from_io(result) },
				Err(panic) => Message::Fault(LoaderError::WorkerPanicked { position, message: panic_message(&*panic) })
			}
		};

		if self.sender.send(message).is_err() {
			log::trace!(target: LOG, "loader dropped before cube {} finished loading", position);
		}
	}
}

/// The I/O phase of a load, waiting for the column that owns the cube.
///
/// Nothing is read until `resolve` is called, so I/O workers never sit blocked on a column that is
/// still loading. Dropping the dependency without resolving it breaks the loader contract, and is
/// reported as a fatal `LoaderError::DependencyDropped` by the next `process_completed`.
#[must_use = "the cube is never loaded unless the dependency is resolved"]
pub struct ColumnDependency<W, S> where W: WorldContext + 'static, S: CubeIo<W> {
	job: Option<IoJob<W, S>>
}

impl<W, S> ColumnDependency<W, S> where W: WorldContext + 'static, S: CubeIo<W> {
	pub(crate) fn new(job: IoJob<W, S>) -> Self {
		ColumnDependency { job: Some(job) }
	}

	pub fn position(&self) -> Option<CubePosition> {
		self.job.as_ref().map(|job| job.position)
	}

	/// Supplies the owning column and starts the storage read on the worker pool. May be called
	/// from any thread.
	pub fn resolve(mut self, column: ColumnHandle<W>) {
		if let Some(job) = self.job.take() {
			let pool = job.pool.clone();

			pool.spawn(move || job.run(column));
		}
	}
}

impl<W, S> Drop for ColumnDependency<W, S> where W: WorldContext + 'static, S: CubeIo<W> {
	fn drop(&mut self) {
		if let Some(job) = self.job.take() {
			let _ = job.sender.send(Message::Fault(LoaderError::DependencyDropped(job.position)));
		}
	}
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
	if let Some(message) = panic.downcast_ref::<&str>() {
		(*message).to_owned()
	} else if let Some(message) = panic.downcast_ref::<String>() {
		message.clone()
	} else {
		"unknown panic".to_owned()
	}
}
