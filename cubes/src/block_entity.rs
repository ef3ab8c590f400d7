use crate::nibbles::u4;
use crate::position::GlobalPosition;
use crate::storage::BlockId;

/// Extra state attached to a single block, such as the inventory of a chest.
///
/// A block entity exists only for blocks whose type asks for one (see
/// `WorldContext::has_block_entity`). Once invalidated it is dead: the cube evicts it the next
/// time it is looked up.
pub trait BlockEntity {
	fn is_invalid(&self) -> bool;

	fn invalidate(&mut self);

	fn validate(&mut self);

	/// Attaches this block entity to the block it belongs to.
	fn set_position(&mut self, at: GlobalPosition);

	/// Refreshes the cached block type and metadata after the containing block changed.
	fn update_containing_block(&mut self, block: BlockId, metadata: u4);
}
