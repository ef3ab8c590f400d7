use cubes::{ColumnHandle, Cube, WorldContext};
use std::io;

/// A cube storage backend, split along the thread boundary.
///
/// `load_cube_async_part` runs on an I/O worker: it may read the column it is given, but must not
/// modify it or reach into the rest of the world. `load_cube_sync_part` turns the raw data into a
/// cube on the main context. It must not insert the cube into its column; the loader does that.
pub trait CubeIo<W>: Send + Sync + 'static where W: WorldContext {
	/// Data read from storage, but not yet turned into a cube.
	type Raw: Send + 'static;

	/// Reads the cube at height `y` of the column. `Ok(None)` means the cube was never stored.
	fn load_cube_async_part(&self, column: &ColumnHandle<W>, y: u32) -> io::Result<Option<Self::Raw>>;

	fn load_cube_sync_part(&self, raw: Self::Raw, column: &ColumnHandle<W>, world: &mut W) -> Cube<W>;
}
