//! # `cubes-io`: Asynchronous cube loading
//!
//! Loading a cube is split into two phases:
//!
//!  * The I/O phase runs on a worker pool. It starts once the column that owns the cube is
//!    available, and reads the raw cube data from a `CubeIo` backend. It never touches the world.
//!  * The install phase runs on the main context, inside `CubeLoader::process_completed`. It turns
//!    the raw data into a `Cube`, inserts it into its column, runs the load hooks, and finally
//!    notifies every callback that asked for the cube.
//!
//! Results cross from the workers to the main context over a channel, so a task's state is only
//! ever owned by one side at a time. A failed storage read only fails its own task; a broken
//! loader contract (for example a column dependency that is dropped without being resolved) is a
//! `LoaderError` and stops the caller.

pub mod config;
pub mod error;
pub mod loader;
pub mod storage;
pub mod task;

pub use crate::config::LoaderConfig;
pub use crate::error::LoaderError;
pub use crate::loader::{Callback, CubeLoader, LoadReport};
pub use crate::storage::CubeIo;
pub use crate::task::{ColumnDependency, LoadState, LoadStatus};
