use crate::error::SnapshotError;
use cubes::position::GlobalPosition;
use cubes::{u4, BlockId, LightChannel};

/// Light related properties of block types.
pub trait LightRules {
	/// How much light is lost when passing through the block. 0 is fully transparent, and
	/// anything of 15 or more blocks light entirely.
	fn light_opacity(&self, block: BlockId, metadata: u4) -> u8;

	/// How much block light the block emits by itself.
	fn light_emission(&self, block: BlockId, metadata: u4) -> u4;
}

impl<'a, R> LightRules for &'a R where R: LightRules + ?Sized {
	fn light_opacity(&self, block: BlockId, metadata: u4) -> u8 {
		(**self).light_opacity(block, metadata)
	}

	fn light_emission(&self, block: BlockId, metadata: u4) -> u4 {
		(**self).light_emission(block, metadata)
	}
}

/// Per block ID light properties. IDs that were never registered are fully opaque and emit
/// nothing, except for air, which is fully transparent.
#[derive(Debug, Clone)]
pub struct BlockLightTable {
	opacity: Vec<u8>,
	emission: Vec<u4>
}

impl BlockLightTable {
	pub fn new() -> Self {
		BlockLightTable { opacity: vec![0], emission: vec![u4::MIN] }
	}

	pub fn set(&mut self, block: BlockId, opacity: u8, emission: u4) {
		let index = block.0 as usize;

		if index >= self.opacity.len() {
			self.opacity.resize(index + 1, 255);
			self.emission.resize(index + 1, u4::MIN);
		}

		self.opacity[index] = opacity;
		self.emission[index] = emission;
	}
}

impl Default for BlockLightTable {
	fn default() -> Self {
		BlockLightTable::new()
	}
}

impl LightRules for BlockLightTable {
	fn light_opacity(&self, block: BlockId, _metadata: u4) -> u8 {
		self.opacity.get(block.0 as usize).cloned().unwrap_or(255)
	}

	fn light_emission(&self, block: BlockId, _metadata: u4) -> u4 {
		self.emission.get(block.0 as usize).cloned().unwrap_or(u4::MIN)
	}
}

/// What a light engine needs from the world, addressed by block position.
pub trait LightAccess {
	fn light_opacity(&self, at: GlobalPosition) -> Result<u8, SnapshotError>;

	fn light_for(&self, channel: LightChannel, at: GlobalPosition) -> Result<u4, SnapshotError>;

	fn set_light_for(&self, channel: LightChannel, at: GlobalPosition, value: u4) -> Result<(), SnapshotError>;

	/// Whether nothing occupied lies above the block.
	fn can_see_sky(&self, at: GlobalPosition) -> Result<bool, SnapshotError>;

	/// The light a block is a source of: its own emission for block light, and full light for
	/// sky light if it can see the sky.
	fn emitted_light(&self, at: GlobalPosition, channel: LightChannel) -> Result<u4, SnapshotError>;
}
