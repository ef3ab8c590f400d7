use crate::cube::Cube;
use crate::error::ColumnError;
use crate::heightmap::{ColumnHeightMap, HeightMap};
use crate::position::{ColumnPosition, CubePosition, LayerPosition};
use crate::world::WorldContext;
use spin::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

pub type CubeHandle<W> = Arc<RwLock<Cube<W>>>;
pub type ColumnHandle<W> = Arc<RwLock<Column<W>>>;

/// A vertical stack of cubes sharing one horizontal position. Only resident cubes are stored.
pub struct Column<W> where W: WorldContext {
	position: ColumnPosition,
	cubes: BTreeMap<u32, CubeHandle<W>>,
	height_map: Box<dyn HeightMap + Send + Sync>
}

impl<W> Column<W> where W: WorldContext {
	pub fn new(position: ColumnPosition, height_map: Box<dyn HeightMap + Send + Sync>) -> Self {
		Column {
			position,
			cubes: BTreeMap::new(),
			height_map
		}
	}

	/// Creates a shared column with an empty `ColumnHeightMap`.
	pub fn handle(position: ColumnPosition) -> ColumnHandle<W> {
		Column::new(position, Box::new(ColumnHeightMap::new())).into_handle()
	}

	pub fn into_handle(self) -> ColumnHandle<W> {
		Arc::new(RwLock::new(self))
	}

	pub fn position(&self) -> ColumnPosition {
		self.position
	}

	/// Adds a cube to this column and returns the shared handle to it.
	pub fn insert_cube(&mut self, cube: Cube<W>) -> Result<CubeHandle<W>, ColumnError> {
		let position = cube.position();

		if position.column() != self.position {
			return Err(ColumnError::WrongColumn { cube: position, column: self.position });
		}

		if self.cubes.contains_key(&position.y()) {
			return Err(ColumnError::Occupied(position));
		}

		let handle = Arc::new(RwLock::new(cube));
		self.cubes.insert(position.y(), handle.clone());

		Ok(handle)
	}

	pub fn cube(&self, y: u32) -> Option<&CubeHandle<W>> {
		self.cubes.get(&y)
	}

	/// Iterates over the resident cubes, from bottom to top.
	pub fn cubes(&self) -> impl Iterator<Item = (u32, &CubeHandle<W>)> {
		self.cubes.iter().map(|(&y, cube)| (y, cube))
	}

	pub fn loaded_cube_positions(&self) -> Vec<CubePosition> {
		self.cubes.values().map(|cube| cube.read().position()).collect()
	}

	pub fn len(&self) -> usize {
		self.cubes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.cubes.is_empty()
	}

	/// Removes a cube without running its unload hook.
	pub fn remove_cube(&mut self, y: u32) -> Option<CubeHandle<W>> {
		self.cubes.remove(&y)
	}

	/// Unloads a cube: the world releases everything inside it, then the cube leaves the column.
	pub fn unload_cube(&mut self, world: &mut W, y: u32) -> Option<CubeHandle<W>> {
		let cube = self.cubes.remove(&y)?;

		{
			let mut cube = cube.write();

			if cube.is_loaded() {
				cube.on_unload(world);
			}
		}

		Some(cube)
	}

	/// Returns the Y coordinate of the topmost occupied block at the position, or `NO_HEIGHT`.
	pub fn height_at(&self, layer: LayerPosition) -> i32 {
		self.height_map.top_block_y(layer)
	}

	pub fn height_map(&self) -> &dyn HeightMap {
		&*self.height_map
	}

	pub fn height_map_mut(&mut self) -> &mut (dyn HeightMap + Send + Sync) {
		&mut *self.height_map
	}
}
