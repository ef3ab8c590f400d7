use cubes::position::{ColumnPosition, CubePosition};
use cubes::{Column, ColumnHandle, Cube, CubeHandle, WorldContext};
use rustc_hash::FxHashMap;

/// Looks up cubes by position.
pub trait CubeProvider<W> where W: WorldContext {
	/// Returns the cube if it is resident. Never loads anything.
	fn loaded_cube(&self, position: CubePosition) -> Option<CubeHandle<W>>;

	/// Returns the cube, loading or creating it if needed.
	fn cube(&mut self, position: CubePosition) -> CubeHandle<W>;
}

/// Lists the resident columns of whichever side (server or client) the caller runs on. Only used
/// to describe the world when something is missing.
pub trait LoadedRegionSource<W> where W: WorldContext {
	fn loaded_columns(&self) -> Vec<ColumnHandle<W>>;
}

/// A plain map of resident columns. Cubes that are asked for with `CubeProvider::cube` but are
/// not resident are created empty, as a world generator would.
pub struct ResidentColumns<W> where W: WorldContext {
	columns: FxHashMap<ColumnPosition, ColumnHandle<W>>,
	has_sky: bool
}

impl<W> ResidentColumns<W> where W: WorldContext {
	pub fn new(has_sky: bool) -> Self {
		ResidentColumns { columns: FxHashMap::default(), has_sky }
	}

	pub fn insert(&mut self, column: ColumnHandle<W>) {
		let position = column.read().position();

		self.columns.insert(position, column);
	}

	pub fn column(&self, position: ColumnPosition) -> Option<&ColumnHandle<W>> {
		self.columns.get(&position)
	}

	/// Returns the column, creating an empty one if there is none.
	pub fn column_or_create(&mut self, position: ColumnPosition) -> &ColumnHandle<W> {
		self.columns.entry(position).or_insert_with(|| Column::handle(position))
	}

	pub fn remove(&mut self, position: ColumnPosition) -> Option<ColumnHandle<W>> {
		self.columns.remove(&position)
	}

	pub fn len(&self) -> usize {
		self.columns.len()
	}

	pub fn is_empty(&self) -> bool {
		self.columns.is_empty()
	}
}

impl<W> CubeProvider<W> for ResidentColumns<W> where W: WorldContext {
	fn loaded_cube(&self, position: CubePosition) -> Option<CubeHandle<W>> {
		self.columns.get(&position.column())?.read().cube(position.y()).cloned()
	}

	fn cube(&mut self, position: CubePosition) -> CubeHandle<W> {
		let has_sky = self.has_sky;
		let column = self.column_or_create(position.column()).clone();
		let mut guard = column.write();

		if let Some(cube) = guard.cube(position.y()) {
			return cube.clone();
		}

		match guard.insert_cube(Cube::new(&column, position, has_sky)) {
			Ok(handle) => handle,
			// The column was looked up by the cube's own position, and the slot is empty.
			Err(error) => unreachable!("{}", error)
		}
	}
}

impl<W> LoadedRegionSource<W> for ResidentColumns<W> where W: WorldContext {
	fn loaded_columns(&self) -> Vec<ColumnHandle<W>> {
		let mut columns: Vec<_> = self.columns.values().cloned().collect();

		columns.sort_by_key(|column| column.read().position());
		columns
	}
}
