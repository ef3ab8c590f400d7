//! A small in-memory world for tests. Records every block callback it receives, and keeps the
//! sets of registered entities and block entities so that lifecycle hooks can be checked.

use crate::block_entity::BlockEntity;
use crate::cube::Cube;
use crate::entity::{Aabb, Entity, EntityId};
use crate::nibbles::u4;
use crate::position::{GlobalPosition, LocalPosition};
use crate::storage::BlockId;
use crate::world::WorldContext;
use rustc_hash::FxHashSet;

pub mod blocks {
	use crate::storage::BlockId;

	pub const AIR: BlockId = BlockId::AIR;
	pub const STONE: BlockId = BlockId(1);
	/// Refuses to be replaced.
	pub const BEDROCK: BlockId = BlockId(7);
	pub const GLASS: BlockId = BlockId(20);
	pub const TORCH: BlockId = BlockId(50);
	/// Carries a block entity.
	pub const CHEST: BlockId = BlockId(54);
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
	PreDestroy(GlobalPosition, BlockId),
	Removed(GlobalPosition, BlockId, u4),
	Added(GlobalPosition, BlockId, u4)
}

#[derive(Debug)]
pub struct TestWorld {
	pub authoritative: bool,
	pub has_sky: bool,
	pub events: Vec<Event>,
	pub entities: FxHashSet<EntityId>,
	pub block_entities: FxHashSet<GlobalPosition>
}

impl TestWorld {
	pub fn server() -> Self {
		TestWorld {
			authoritative: true,
			has_sky: true,
			events: Vec::new(),
			entities: FxHashSet::default(),
			block_entities: FxHashSet::default()
		}
	}

	pub fn client() -> Self {
		TestWorld { authoritative: false, ..TestWorld::server() }
	}
}

impl WorldContext for TestWorld {
	type Entity = TestEntity;
	type BlockEntity = TestBlockEntity;

	fn is_authoritative(&self) -> bool {
		self.authoritative
	}

	fn has_sky(&self) -> bool {
		self.has_sky
	}

	fn has_block_entity(&self, block: BlockId) -> bool {
		block == blocks::CHEST
	}

	fn create_block_entity(&mut self, block: BlockId, _metadata: u4) -> Option<TestBlockEntity> {
		if block == blocks::CHEST {
			Some(TestBlockEntity::default())
		} else {
			None
		}
	}

	fn on_block_pre_destroy(&mut self, cube: &mut Cube<Self>, at: LocalPosition, old: BlockId, _old_metadata: u4) {
		self.events.push(Event::PreDestroy(cube.position().with_local(at), old));
	}

	fn on_block_removed(&mut self, cube: &mut Cube<Self>, at: LocalPosition, old: BlockId, old_metadata: u4) {
		self.events.push(Event::Removed(cube.position().with_local(at), old, old_metadata));

		if old == blocks::BEDROCK {
			cube.storage_mut().set(at, blocks::BEDROCK);
		} else if self.has_block_entity(old) && cube.block(at) != old {
			cube.remove_block_entity(self, at);
		}
	}

	fn on_block_added(&mut self, cube: &mut Cube<Self>, at: LocalPosition, block: BlockId, metadata: u4) {
		self.events.push(Event::Added(cube.position().with_local(at), block, metadata));
	}

	fn register_entity(&mut self, entity: &TestEntity) {
		self.entities.insert(entity.id);
	}

	fn unregister_entity(&mut self, entity: &TestEntity) {
		self.entities.remove(&entity.id);
	}

	fn register_block_entity(&mut self, at: GlobalPosition, _block_entity: &TestBlockEntity) {
		self.block_entities.insert(at);
	}

	fn unregister_block_entity(&mut self, at: GlobalPosition, _block_entity: &TestBlockEntity) {
		self.block_entities.remove(&at);
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestEntity {
	pub id: EntityId,
	pub position: [f64; 3],
	pub cube_coords: Option<(i32, i32, i32)>,
	pub loaded: bool
}

impl TestEntity {
	pub fn new(id: u64, position: [f64; 3]) -> Self {
		TestEntity { id: EntityId(id), position, cube_coords: None, loaded: false }
	}
}

impl Entity for TestEntity {
	fn id(&self) -> EntityId {
		self.id
	}

	fn position(&self) -> [f64; 3] {
		self.position
	}

	fn bounds(&self) -> Aabb {
		Aabb::around(self.position, [0.3, 0.9, 0.3])
	}

	fn type_name(&self) -> &str {
		"test_entity"
	}

	fn set_cube_coords(&mut self, x: i32, y: i32, z: i32) {
		self.cube_coords = Some((x, y, z));
	}

	fn on_cube_load(&mut self) {
		self.loaded = true;
	}
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestBlockEntity {
	pub valid: bool,
	pub position: Option<GlobalPosition>,
	pub containing: Option<(BlockId, u4)>
}

impl BlockEntity for TestBlockEntity {
	fn is_invalid(&self) -> bool {
		!self.valid
	}

	fn invalidate(&mut self) {
		self.valid = false;
	}

	fn validate(&mut self) {
		self.valid = true;
	}

	fn set_position(&mut self, at: GlobalPosition) {
		self.position = Some(at);
	}

	fn update_containing_block(&mut self, block: BlockId, metadata: u4) {
		self.containing = Some((block, metadata));
	}
}
