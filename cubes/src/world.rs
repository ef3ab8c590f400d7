use crate::block_entity::BlockEntity;
use crate::cube::Cube;
use crate::entity::Entity;
use crate::nibbles::u4;
use crate::position::{GlobalPosition, LocalPosition};
use crate::storage::BlockId;

/// Everything a cube needs from the world it lives in: block type rules, execution context and
/// the registries of loaded entities and block entities.
///
/// Only the main context holds a `WorldContext`, so every method that takes one is implicitly
/// restricted to the main context.
pub trait WorldContext: Sized {
	type Entity: Entity + Send + Sync;
	type BlockEntity: BlockEntity + Send + Sync;

	/// True on the server, which runs block callbacks. Clients only mirror state.
	fn is_authoritative(&self) -> bool;

	fn has_sky(&self) -> bool;

	/// Whether blocks of this type carry a block entity.
	fn has_block_entity(&self, block: BlockId) -> bool;

	fn create_block_entity(&mut self, block: BlockId, metadata: u4) -> Option<Self::BlockEntity>;

	/// Called before the block at `at` is overwritten, while the cube still holds the old block.
	fn on_block_pre_destroy(&mut self, _cube: &mut Cube<Self>, _at: LocalPosition, _old: BlockId, _old_metadata: u4) {}

	/// Called after the block at `at` has been overwritten. The block type may refuse the
	/// replacement by writing the old block back into `cube.storage_mut()`, and is responsible for
	/// removing its block entity if it has one.
	fn on_block_removed(&mut self, _cube: &mut Cube<Self>, _at: LocalPosition, _old: BlockId, _old_metadata: u4) {}

	/// Called once the new block and its metadata are in place.
	fn on_block_added(&mut self, _cube: &mut Cube<Self>, _at: LocalPosition, _block: BlockId, _metadata: u4) {}

	fn register_entity(&mut self, entity: &Self::Entity);

	fn unregister_entity(&mut self, entity: &Self::Entity);

	fn register_block_entity(&mut self, at: GlobalPosition, block_entity: &Self::BlockEntity);

	fn unregister_block_entity(&mut self, at: GlobalPosition, block_entity: &Self::BlockEntity);
}
