use crate::config::LoaderConfig;
use crate::error::LoaderError;
use crate::storage::CubeIo;
use crate::task::{ColumnDependency, IoJob, LoadState, LoadStatus, Message};
use crossbeam_channel::{Receiver, Sender};
use cubes::position::{CubePosition, SparseKey};
use cubes::{ColumnHandle, CubeHandle, WorldContext};
use rayon::{ThreadPool, ThreadPoolBuilder};
use rustc_hash::FxHashMap;
use std::sync::Arc;

static LOG: &str = "cube-loading";

/// Called on the main context once a load finishes, with the installed cube, or `None` if the
/// cube was not in storage or could not be read.
pub type Callback<W> = Box<dyn FnOnce(Option<&CubeHandle<W>>)>;

struct Task<W> where W: WorldContext {
	position: CubePosition,
	callbacks: Vec<Callback<W>>
}

/// The outcome of one finished task.
pub struct LoadReport<W> where W: WorldContext {
	pub position: CubePosition,
	/// Always terminal: `Installed` or `IoFailed`.
	pub status: LoadStatus,
	/// The installed cube. `None` if the read failed or found nothing.
	pub cube: Option<CubeHandle<W>>
}

/// Loads cubes in two phases: a storage read on a pool of I/O workers, then installation into
/// the world on the main context.
///
/// Nothing a task produces is visible to the world before `process_completed` installs it, and
/// that is the only place where columns are modified and callbacks are run.
pub struct CubeLoader<W, S> where W: WorldContext + 'static, S: CubeIo<W> {
	storage: Arc<S>,
	pool: Arc<ThreadPool>,
	sender: Sender<Message<W, S::Raw>>,
	receiver: Receiver<Message<W, S::Raw>>,
	tasks: FxHashMap<SparseKey, Task<W>>,
	drain_limit: usize,
	// Fault met after other reports were already drained, returned by the next call
	fault: Option<LoaderError>
}

impl<W, S> CubeLoader<W, S> where W: WorldContext + 'static, S: CubeIo<W> {
	pub fn new(storage: S, config: &LoaderConfig) -> Result<Self, LoaderError> {
		let thread_name = config.thread_name.clone();

		let pool = ThreadPoolBuilder::new()
			.num_threads(config.worker_threads)
			.thread_name(move |index| format!("{}-{}", thread_name, index))
			.build()?;

		log::debug!(target: LOG, "Started cube I/O pool with {} workers", pool.current_num_threads());

		let (sender, receiver) = crossbeam_channel::unbounded();

		Ok(CubeLoader {
			storage: Arc::new(storage),
			pool: Arc::new(pool),
			sender,
			receiver,
			tasks: FxHashMap::default(),
			drain_limit: config.drain_limit,
			fault: None
		})
	}

	pub fn storage(&self) -> &S {
		&self.storage
	}

	/// Requests a cube load. Returns the dependency that starts the read once it is given the
	/// owning column.
	///
	/// If a load of the same cube is already outstanding, the callback joins that task and `None`
	/// is returned.
	pub fn queue_load<F>(&mut self, position: CubePosition, callback: F) -> Option<ColumnDependency<W, S>>
		where F: FnOnce(Option<&CubeHandle<W>>) + 'static {

		let key = position.key();

		if let Some(task) = self.tasks.get_mut(&key) {
			task.callbacks.push(Box::new(callback));
			return None;
		}

		self.tasks.insert(key, Task { position, callbacks: vec![Box::new(callback)] });

		log::debug!(target: LOG, "Queued load of cube {}", position);

		Some(ColumnDependency::new(IoJob {
			position,
			storage: self.storage.clone(),
			pool: self.pool.clone(),
			sender: self.sender.clone()
		}))
	}

	/// Returns `Pending` while a load of the cube is outstanding, and `None` otherwise.
	///
	/// A load whose read has finished stays `Pending` until `process_completed` installs it. The
	/// terminal state of a load is only reported through its `LoadReport` and callbacks.
	pub fn status(&self, position: CubePosition) -> Option<LoadStatus> {
		self.tasks.get(&position.key()).map(|_| LoadStatus::Pending)
	}

	pub fn outstanding(&self) -> usize {
		self.tasks.len()
	}

	/// The number of finished reads and faults waiting for `process_completed`.
	pub fn ready(&self) -> usize {
		self.receiver.len()
	}

	/// Installs every finished read, without blocking. Must be called on the main context.
	///
	/// Draining stops at the first fault. If reports were already collected they are returned, and
	/// the fault is returned by the next call instead.
	pub fn process_completed(&mut self, world: &mut W) -> Result<Vec<LoadReport<W>>, LoaderError> {
		if let Some(fault) = self.fault.take() {
			return Err(fault);
		}

		let mut reports = Vec::new();

		while self.drain_limit == 0 || reports.len() < self.drain_limit {
			let message = match self.receiver.try_recv() {
				Ok(message) => message,
				Err(_) => break
			};

			match self.handle(message, world) {
				Ok(report) => reports.push(report),
				Err(error) if reports.is_empty() => return Err(error),
				Err(error) => {
					self.fault = Some(error);
					break;
				}
			}
		}

		Ok(reports)
	}

	/// Blocks until the load of `position` finishes, installing any other loads that finish first.
	/// The caller must make sure that the column dependency of the cube gets resolved.
	pub fn wait_for(&mut self, position: CubePosition, world: &mut W) -> Result<Option<CubeHandle<W>>, LoaderError> {
		if let Some(fault) = self.fault.take() {
			return Err(fault);
		}

		if !self.tasks.contains_key(&position.key()) {
			return Err(LoaderError::UnknownTask(position));
		}

		// The loader holds a sender, so the channel never disconnects.
		while let Ok(message) = self.receiver.recv() {
			let report = self.handle(message, world)?;

			if report.position == position {
				return Ok(report.cube);
			}
		}

		Err(LoaderError::UnknownTask(position))
	}

	/// Queues a load for a cube of a column that is already resident, resolving the dependency
	/// right away.
	pub fn load_in_column<F>(&mut self, column: &ColumnHandle<W>, y: u32, callback: F) -> Result<(), LoaderError>
		where F: FnOnce(Option<&CubeHandle<W>>) + 'static {

		let position = column.read().position().cube(y)?;

		if let Some(dependency) = self.queue_load(position, callback) {
			dependency.resolve(column.clone());
		}

		Ok(())
	}

	fn handle(&mut self, message: Message<W, S::Raw>, world: &mut W) -> Result<LoadReport<W>, LoaderError> {
		let (position, column, state) = match message {
			Message::Complete { position, column, state } => (position, column, state),
			Message::Fault(error) => {
				log::error!(target: LOG, "Cube loader fault: {}", error);

				// The task can never complete, so the cube may be queued again.
				if let Some(position) = error.task_position() {
					self.tasks.remove(&position.key());
				}

				return Err(error);
			}
		};

		let task = self.tasks.remove(&position.key()).ok_or(LoaderError::UnknownTask(position))?;

		let (status, cube) = match state {
			LoadState::IoComplete(Some(raw)) => {
				let cube = self.storage.load_cube_sync_part(raw, &column, world);

				if cube.position() != position {
					return Err(LoaderError::PositionMismatch { expected: position, actual: cube.position() });
				}

				let handle = column.write().insert_cube(cube)?;
				handle.write().on_load(world);

				log::debug!(target: LOG, "Installed cube {}", position);

				(LoadStatus::Installed, Some(handle))
			},
			LoadState::IoComplete(None) => (LoadStatus::Installed, None),
			LoadState::IoFailed(error) => {
				log::error!(target: LOG, "Could not load cube {}: {}", position, error);

				(LoadStatus::IoFailed, None)
			},
			other => return Err(LoaderError::UnexpectedState { position, status: other.status() })
		};

		for callback in task.callbacks {
			callback(cube.as_ref());
		}

		Ok(LoadReport { position: task.position, status, cube })
	}
}
