use crate::nibbles::{u4, NibbleCube};
use crate::position::LocalPosition;
use std::fmt::{self, Debug, Formatter};

/// A numeric block type. The meaning of each ID, beyond `AIR`, belongs to the world.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Default)]
pub struct BlockId(pub u16);

impl BlockId {
	pub const AIR: BlockId = BlockId(0);

	pub fn is_air(self) -> bool {
		self == BlockId::AIR
	}
}

/// The blocks and metadata of a single cube. Keeps a running count of non-air blocks so that
/// emptiness can be checked without a scan.
#[derive(Clone, Eq, PartialEq)]
pub struct CubeBlocks {
	blocks: Box<[BlockId; 4096]>,
	metadata: NibbleCube,
	non_air: u16
}

impl CubeBlocks {
	/// Builds storage from bulk data, such as the output of a storage codec.
	pub fn from_raw(blocks: Box<[BlockId; 4096]>, metadata: NibbleCube) -> Self {
		let mut storage = CubeBlocks { blocks, metadata, non_air: 0 };
		storage.recount();

		storage
	}

	pub fn get(&self, at: LocalPosition) -> BlockId {
		self.blocks[at.yzx() as usize]
	}

	/// Writes a block, returning the block that was there before.
	pub fn set(&mut self, at: LocalPosition, block: BlockId) -> BlockId {
		let slot = &mut self.blocks[at.yzx() as usize];
		let old = *slot;
		*slot = block;

		match (old.is_air(), block.is_air()) {
			(true, false) => self.non_air += 1,
			(false, true) => self.non_air -= 1,
			_ => ()
		}

		old
	}

	pub fn metadata(&self, at: LocalPosition) -> u4 {
		self.metadata.get(at)
	}

	pub fn set_metadata(&mut self, at: LocalPosition, metadata: u4) {
		self.metadata.set(at, metadata)
	}

	pub fn is_empty(&self) -> bool {
		self.non_air == 0
	}

	pub fn non_air_count(&self) -> u16 {
		self.non_air
	}

	/// Recomputes the non-air count from scratch.
	pub fn recount(&mut self) {
		self.non_air = self.blocks.iter().filter(|block| !block.is_air()).count() as u16;
	}

	pub fn blocks(&self) -> &[BlockId; 4096] {
		&self.blocks
	}

	pub fn metadata_nibbles(&self) -> &NibbleCube {
		&self.metadata
	}
}

impl Default for CubeBlocks {
	fn default() -> Self {
		CubeBlocks {
			blocks: Box::new([BlockId::AIR; 4096]),
			metadata: NibbleCube::default(),
			non_air: 0
		}
	}
}

impl Debug for CubeBlocks {
	fn fmt(&self, f: &mut Formatter) -> fmt::Result {
		write!(f, "CubeBlocks {{ non_air: {} }}", self.non_air)
	}
}
