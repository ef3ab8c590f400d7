mod global;
mod local;
mod layer;

pub use self::global::*;
pub use self::local::LocalPosition;
pub use self::layer::LayerPosition;

/// Side length of a cube, in blocks.
pub const CUBE_SIZE: i32 = 16;

/// Returns the cube coordinate containing a block coordinate. Rounds towards negative infinity,
/// so block -1 lives in cube -1.
pub fn cube_of(block: i32) -> i32 {
	block >> 4
}

/// Returns the cube-local coordinate of a block coordinate, in the range 0-15 (inclusive).
pub fn local_of(block: i32) -> u8 {
	(block & 15) as u8
}

/// Returns the cube coordinates containing a point in continuous world space, such as the
/// position of an entity. The Y coordinate is not validated, since an entity may drift out of
/// the world.
pub fn cube_of_point(point: [f64; 3]) -> (i32, i32, i32) {
	(
		cube_of(point[0].floor() as i32),
		cube_of(point[1].floor() as i32),
		cube_of(point[2].floor() as i32)
	)
}
