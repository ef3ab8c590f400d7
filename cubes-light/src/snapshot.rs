use crate::access::{LightAccess, LightRules};
use crate::error::{ColumnReport, MissingCubeReport, SnapshotError};
use crate::provider::{CubeProvider, LoadedRegionSource};
use cubes::position::{CubePosition, GlobalPosition};
use cubes::{u4, BlockId, ColumnHandle, CubeHandle, LightChannel, WorldContext};
use std::cmp;

static LOG: &str = "cube-snapshot";

/// A fixed window of resident cubes, resolved once so that a light engine can address every
/// block in it without looking cubes up again.
///
/// The snapshot holds the cubes themselves, not copies of their data: reads always see the live
/// cube, and light writes go straight to it.
pub struct NeighborSnapshot<W, R> where W: WorldContext, R: LightRules {
	min: CubePosition,
	max: CubePosition,
	// Size along the X, Y and Z axes
	size: (usize, usize, usize),
	// Indexed with ((x * size.1) + y) * size.2 + z
	cubes: Vec<CubeHandle<W>>,
	// Indexed with x * size.2 + z
	columns: Vec<ColumnHandle<W>>,
	rules: R
}

impl<W, R> NeighborSnapshot<W, R> where W: WorldContext, R: LightRules {
	/// Builds a snapshot over the cubes between two corners, inclusive, given in any order. Every
	/// cube in the window must already be resident.
	pub fn new<P, L>(provider: &P, regions: &L, rules: R, start: CubePosition, end: CubePosition) -> Result<Self, SnapshotError>
		where P: CubeProvider<W> + ?Sized, L: LoadedRegionSource<W> + ?Sized {

		let min = CubePosition::new(
			cmp::min(start.x(), end.x()),
			cmp::min(start.y(), end.y()) as i32,
			cmp::min(start.z(), end.z())
		)?;

		let max = CubePosition::new(
			cmp::max(start.x(), end.x()),
			cmp::max(start.y(), end.y()) as i32,
			cmp::max(start.z(), end.z())
		)?;

		let size = (
			(max.x() as i64 - min.x() as i64 + 1) as usize,
			(max.y() - min.y() + 1) as usize,
			(max.z() as i64 - min.z() as i64 + 1) as usize
		);

		// Not reserved up front: the window may be far larger than what is resident.
		let mut cubes = Vec::new();

		for dx in 0..size.0 {
			for dy in 0..size.1 {
				for dz in 0..size.2 {
					let position = min.offset(dx as i32, dy as i32, dz as i32)?;

					match provider.loaded_cube(position) {
						Some(cube) => cubes.push(cube),
						None => return Err(missing_cube(position, regions))
					}
				}
			}
		}

		let mut columns = Vec::with_capacity(cubes.len() / size.1);

		for dx in 0..size.0 {
			for dz in 0..size.2 {
				let bottom = &cubes[(dx * size.1) * size.2 + dz];
				let column = bottom.read().column()
					.ok_or_else(|| SnapshotError::MissingColumn(bottom.read().position().column()))?;

				columns.push(column);
			}
		}

		Ok(NeighborSnapshot { min, max, size, cubes, columns, rules })
	}

	/// Builds a snapshot over every cube within `radius` cubes of `center` along each axis.
	pub fn around<P, L>(provider: &P, regions: &L, rules: R, center: CubePosition, radius: u32) -> Result<Self, SnapshotError>
		where P: CubeProvider<W> + ?Sized, L: LoadedRegionSource<W> + ?Sized {

		let radius = radius as i32;
		let start = center.offset(-radius, -radius, -radius)?;
		let end = center.offset(radius, radius, radius)?;

		Self::new(provider, regions, rules, start, end)
	}

	/// Builds a snapshot over the cubes containing a region of blocks. The cube in the middle of
	/// the region is fetched through `CubeProvider::cube` first, so it is loaded if it was not.
	pub fn for_block_region<P, L>(provider: &mut P, regions: &L, rules: R, start: GlobalPosition, end: GlobalPosition) -> Result<Self, SnapshotError>
		where P: CubeProvider<W> + ?Sized, L: LoadedRegionSource<W> + ?Sized {

		let mid = GlobalPosition::new(
			midpoint(start.x(), end.x()),
			midpoint(start.y(), end.y()),
			midpoint(start.z(), end.z())
		);

		provider.cube(mid.cube()?);

		Self::new(provider, regions, rules, start.cube()?, end.cube()?)
	}

	/// The lowest and highest cube in the window, inclusive.
	pub fn bounds(&self) -> (CubePosition, CubePosition) {
		(self.min, self.max)
	}

	pub fn contains(&self, at: GlobalPosition) -> bool {
		self.index(at).is_ok()
	}

	pub fn cubes(&self) -> std::slice::Iter<'_, CubeHandle<W>> {
		self.cubes.iter()
	}

	pub fn rules(&self) -> &R {
		&self.rules
	}

	pub fn cube_at(&self, at: GlobalPosition) -> Result<&CubeHandle<W>, SnapshotError> {
		Ok(&self.cubes[self.index(at)?.0])
	}

	pub fn block_at(&self, at: GlobalPosition) -> Result<BlockId, SnapshotError> {
		Ok(self.cube_at(at)?.read().block(at.local()))
	}

	pub fn metadata_at(&self, at: GlobalPosition) -> Result<u4, SnapshotError> {
		Ok(self.cube_at(at)?.read().metadata(at.local()))
	}

	/// Returns the (cube, column) indices of the block position.
	fn index(&self, at: GlobalPosition) -> Result<(usize, usize), SnapshotError> {
		let cube = at.cube()?;

		let (dx, dy, dz) = (
			cube.x() as i64 - self.min.x() as i64,
			cube.y() as i64 - self.min.y() as i64,
			cube.z() as i64 - self.min.z() as i64
		);

		let inside = |delta: i64, size: usize| delta >= 0 && (delta as usize) < size;

		if !inside(dx, self.size.0) || !inside(dy, self.size.1) || !inside(dz, self.size.2) {
			return Err(SnapshotError::OutsideWindow { at, min: self.min, max: self.max });
		}

		let (dx, dy, dz) = (dx as usize, dy as usize, dz as usize);

		Ok((((dx * self.size.1) + dy) * self.size.2 + dz, dx * self.size.2 + dz))
	}
}

impl<W, R> LightAccess for NeighborSnapshot<W, R> where W: WorldContext, R: LightRules {
	fn light_opacity(&self, at: GlobalPosition) -> Result<u8, SnapshotError> {
		let cube = self.cube_at(at)?.read();
		let local = at.local();

		Ok(self.rules.light_opacity(cube.block(local), cube.metadata(local)))
	}

	fn light_for(&self, channel: LightChannel, at: GlobalPosition) -> Result<u4, SnapshotError> {
		Ok(self.cube_at(at)?.read().light(channel, at.local()))
	}

	fn set_light_for(&self, channel: LightChannel, at: GlobalPosition, value: u4) -> Result<(), SnapshotError> {
		self.cube_at(at)?.write().set_light(channel, at.local(), value);

		Ok(())
	}

	fn can_see_sky(&self, at: GlobalPosition) -> Result<bool, SnapshotError> {
		let (_, column) = self.index(at)?;
		let top = self.columns[column].read().height_at(at.local().layer());

		Ok(at.y() > top)
	}

	fn emitted_light(&self, at: GlobalPosition, channel: LightChannel) -> Result<u4, SnapshotError> {
		match channel {
			LightChannel::Block => {
				let cube = self.cube_at(at)?.read();
				let local = at.local();

				Ok(self.rules.light_emission(cube.block(local), cube.metadata(local)))
			},
			LightChannel::Sky => Ok(if self.can_see_sky(at)? { u4::MAX } else { u4::MIN })
		}
	}
}

fn midpoint(a: i32, b: i32) -> i32 {
	((a as i64 + b as i64) >> 1) as i32
}

fn missing_cube<W, L>(position: CubePosition, regions: &L) -> SnapshotError
	where W: WorldContext, L: LoadedRegionSource<W> + ?Sized {

	let columns = regions.loaded_columns()
		.iter()
		.map(|column| {
			let column = column.read();

			ColumnReport { position: column.position(), cubes: column.loaded_cube_positions() }
		})
		.collect();

	let report = MissingCubeReport { cube: position, columns };

	log::error!(target: LOG, "{}", report);

	SnapshotError::MissingCube(report)
}
