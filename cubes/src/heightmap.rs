use crate::error::HeightDataError;
use crate::position::LayerPosition;
use std::cmp;
use std::ops::Index;

/// Height of a block column that contains no occupied blocks at all.
pub const NO_HEIGHT: i32 = i32::MIN;

/// Tracks the topmost occupied block of each block column in a column. Keeping it consistent
/// with block changes is the job of whoever implements `on_opacity_change`.
pub trait HeightMap {
	/// Y coordinate of the topmost occupied block, or `NO_HEIGHT`.
	fn top_block_y(&self, at: LayerPosition) -> i32;

	/// Notifies the height map that the opacity of the block at (at, y) changed.
	fn on_opacity_change(&mut self, at: LayerPosition, y: i32, opacity: u8);

	/// Whether the block at (at, y) is at or below the topmost occupied block.
	fn is_occluded(&self, at: LayerPosition, y: i32) -> bool {
		y <= self.top_block_y(at)
	}

	/// The lowest `top_block_y` across the whole column.
	fn lowest_top_block_y(&self) -> i32;
}

/// A plain array height map, updated from outside with `set_height` or `set_data` rather than
/// tracking opacity itself. This is what a client uses, since the server sends it the heights.
#[derive(Debug, Clone)]
pub struct ColumnHeightMap {
	heights: Box<[i32; 256]>,
	lowest: i32
}

impl ColumnHeightMap {
	pub fn new() -> Self {
		ColumnHeightMap {
			heights: Box::new([NO_HEIGHT; 256]),
			lowest: NO_HEIGHT
		}
	}

	pub fn set_height(&mut self, at: LayerPosition, height: i32) {
		let old = std::mem::replace(&mut self.heights[at.zx() as usize], height);

		if height < self.lowest {
			self.lowest = height;
		} else if old == self.lowest && height > old {
			self.recompute_lowest();
		}
	}

	fn recompute_lowest(&mut self) {
		self.lowest = self.heights.iter().fold(i32::MAX, |lowest, &height| cmp::min(lowest, height));
	}

	/// Replaces every height from raw data: 256 big endian 32-bit integers in ZX order.
	pub fn set_data(&mut self, data: &[u8]) -> Result<(), HeightDataError> {
		if data.len() != 256 * 4 {
			return Err(HeightDataError::Length { expected: 256 * 4, actual: data.len() });
		}

		for (height, bytes) in self.heights.iter_mut().zip(data.chunks_exact(4)) {
			*height = i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
		}

		self.recompute_lowest();

		Ok(())
	}

	pub fn data(&self) -> Vec<u8> {
		self.heights.iter().flat_map(|height| height.to_be_bytes().to_vec()).collect()
	}
}

impl Default for ColumnHeightMap {
	fn default() -> Self {
		ColumnHeightMap::new()
	}
}

impl HeightMap for ColumnHeightMap {
	fn top_block_y(&self, at: LayerPosition) -> i32 {
		self.heights[at.zx() as usize]
	}

	fn on_opacity_change(&mut self, _at: LayerPosition, _y: i32, _opacity: u8) {
		// Heights are pushed in from outside.
	}

	fn lowest_top_block_y(&self) -> i32 {
		self.lowest
	}
}

impl Index<LayerPosition> for ColumnHeightMap {
	type Output = i32;

	fn index(&self, index: LayerPosition) -> &i32 {
		&self.heights[index.zx() as usize]
	}
}
