use crate::block_entity::BlockEntity;
use crate::column::{Column, ColumnHandle};
use crate::entity::{Aabb, Entity, EntityContainer, EntityId};
use crate::light::{CubeLight, LightChannel};
use crate::nibbles::u4;
use crate::position::{cube_of, CubePosition, LocalPosition, SparseKey};
use crate::storage::{BlockId, CubeBlocks};
use crate::world::WorldContext;
use rustc_hash::FxHashMap;
use spin::RwLock;
use std::sync::Weak;

static LOG: &str = "cube";

/// A 16x16x16 region of the world: blocks, metadata, light, block entities and the entities
/// inside it. The unit of loading and saving.
///
/// Every mutation marks the cube as dirty until `mark_saved` is called.
pub struct Cube<W> where W: WorldContext {
	position: CubePosition,
	column: Weak<RwLock<Column<W>>>,
	blocks: CubeBlocks,
	light: CubeLight,
	block_entities: FxHashMap<LocalPosition, W::BlockEntity>,
	entities: EntityContainer<W::Entity>,
	dirty: bool,
	loaded: bool
}

impl<W> Cube<W> where W: WorldContext {
	pub fn new(column: &ColumnHandle<W>, position: CubePosition, has_sky: bool) -> Self {
		Self::from_parts(column, position, CubeBlocks::default(), CubeLight::new(has_sky))
	}

	/// Creates a cube from already decoded storage, as done by storage backends.
	pub fn from_parts(column: &ColumnHandle<W>, position: CubePosition, blocks: CubeBlocks, light: CubeLight) -> Self {
		Cube {
			position,
			column: std::sync::Arc::downgrade(column),
			blocks,
			light,
			block_entities: FxHashMap::default(),
			entities: EntityContainer::new(),
			dirty: false,
			loaded: false
		}
	}

	pub fn position(&self) -> CubePosition {
		self.position
	}

	pub fn key(&self) -> SparseKey {
		self.position.key()
	}

	/// Returns the owning column, unless it has already been dropped.
	pub fn column(&self) -> Option<ColumnHandle<W>> {
		self.column.upgrade()
	}

	// Blocks

	pub fn block(&self, at: LocalPosition) -> BlockId {
		self.blocks.get(at)
	}

	pub fn metadata(&self, at: LocalPosition) -> u4 {
		self.blocks.metadata(at)
	}

	pub fn has_blocks(&self) -> bool {
		!self.blocks.is_empty()
	}

	pub fn storage(&self) -> &CubeBlocks {
		&self.blocks
	}

	/// Raw access to block storage. Writes through this do not mark the cube as dirty.
	pub fn storage_mut(&mut self) -> &mut CubeBlocks {
		&mut self.blocks
	}

	/// Writes a block and its metadata without running any block callbacks. Used for bulk writes
	/// such as world generation.
	pub fn set_block_silently(&mut self, at: LocalPosition, block: BlockId, metadata: u4) {
		self.blocks.set(at, block);
		self.blocks.set_metadata(at, metadata);
		self.dirty = true;
	}

	/// Replaces a block, running the block callbacks of both the old and the new block type.
	/// Returns false if nothing changed or if the old block type refused the replacement.
	pub fn set_block(&mut self, world: &mut W, at: LocalPosition, block: BlockId, metadata: u4) -> bool {
		let old = self.blocks.get(at);
		let old_metadata = self.blocks.metadata(at);

		if old == block && old_metadata == metadata {
			return false;
		}

		let authoritative = world.is_authoritative();

		// Removal callbacks must see the old block still in place.
		if authoritative {
			world.on_block_pre_destroy(self, at, old, old_metadata);
		}

		self.blocks.set(at, block);

		if authoritative {
			world.on_block_removed(self, at, old, old_metadata);
		} else if old != block && world.has_block_entity(old) {
			self.remove_block_entity(world, at);
		}

		if self.blocks.get(at) != block {
			return false;
		}

		self.dirty = true;
		self.blocks.set_metadata(at, metadata);

		if world.has_block_entity(old) {
			if let Some(block_entity) = self.valid_block_entity_mut(at) {
				block_entity.update_containing_block(block, metadata);
			}
		}

		if authoritative {
			world.on_block_added(self, at, block, metadata);
		}

		if world.has_block_entity(block) {
			// on_block_added may have changed the block again.
			let (current, current_metadata) = (self.blocks.get(at), self.blocks.metadata(at));

			if let Some(block_entity) = self.ensure_block_entity(world, at) {
				block_entity.update_containing_block(current, current_metadata);
			}
		}

		true
	}

	pub fn set_metadata(&mut self, world: &mut W, at: LocalPosition, metadata: u4) -> bool {
		if self.blocks.metadata(at) == metadata {
			return false;
		}

		self.dirty = true;
		self.blocks.set_metadata(at, metadata);

		let block = self.blocks.get(at);

		if world.has_block_entity(block) {
			if let Some(block_entity) = self.valid_block_entity_mut(at) {
				block_entity.update_containing_block(block, metadata);
			}
		}

		true
	}

	// Block entities

	/// Returns the block entity at the position, if there is a valid one.
	/// Never creates a block entity, see `ensure_block_entity` for that.
	pub fn block_entity(&self, at: LocalPosition) -> Option<&W::BlockEntity> {
		self.block_entities.get(&at).filter(|block_entity| !block_entity.is_invalid())
	}

	pub fn block_entities(&self) -> impl Iterator<Item = (LocalPosition, &W::BlockEntity)> {
		self.block_entities.iter().map(|(&at, block_entity)| (at, block_entity))
	}

	/// Returns the block entity at the position, creating and installing one if the block type
	/// requires it and there is none yet. An invalidated block entity is evicted instead, and
	/// `None` is returned.
	pub fn ensure_block_entity(&mut self, world: &mut W, at: LocalPosition) -> Option<&mut W::BlockEntity> {
		match self.block_entities.get(&at).map(BlockEntity::is_invalid) {
			Some(true) => {
				self.block_entities.remove(&at);
				return None;
			},
			Some(false) => return self.block_entities.get_mut(&at),
			None => ()
		}

		let (block, metadata) = (self.blocks.get(at), self.blocks.metadata(at));

		if !world.has_block_entity(block) {
			return None;
		}

		let block_entity = world.create_block_entity(block, metadata)?;

		if !self.add_block_entity(world, at, block_entity) {
			return None;
		}

		self.block_entities.get_mut(&at)
	}

	/// Installs a block entity, replacing and invalidating any previous one. Returns false and
	/// drops the block entity if the block at the position does not take one.
	pub fn add_block_entity(&mut self, world: &mut W, at: LocalPosition, mut block_entity: W::BlockEntity) -> bool {
		let global = self.position.with_local(at);

		block_entity.set_position(global);

		if !world.has_block_entity(self.blocks.get(at)) {
			return false;
		}

		if let Some(mut previous) = self.block_entities.remove(&at) {
			previous.invalidate();

			if self.loaded {
				world.unregister_block_entity(global, &previous);
			}
		}

		block_entity.validate();

		if self.loaded {
			world.register_block_entity(global, &block_entity);
		}

		self.block_entities.insert(at, block_entity);
		self.dirty = true;

		true
	}

	pub fn remove_block_entity(&mut self, world: &mut W, at: LocalPosition) -> Option<W::BlockEntity> {
		let mut block_entity = self.block_entities.remove(&at)?;

		block_entity.invalidate();

		if self.loaded {
			world.unregister_block_entity(self.position.with_local(at), &block_entity);
		}

		self.dirty = true;

		Some(block_entity)
	}

	fn valid_block_entity_mut(&mut self, at: LocalPosition) -> Option<&mut W::BlockEntity> {
		if self.block_entities.get(&at)?.is_invalid() {
			self.block_entities.remove(&at);
			return None;
		}

		self.block_entities.get_mut(&at)
	}

	// Entities

	/// Adds an entity to this cube. An entity that is not actually inside this cube is still
	/// added, but a warning is logged; the migration pass will move it later.
	pub fn add_entity(&mut self, mut entity: W::Entity) {
		let (x, y, z) = entity.current_cube();
		let position = self.position;

		if (x, z) != (position.x(), position.z()) || y != position.y() as i32 {
			log::warn!(
				target: LOG,
				"Wrong entity location! {} ({:?}) is in cube ({}, {}, {}) but was added to cube {}",
				entity.type_name(), entity.id(), x, y, z, position
			);
		}

		// The Y coordinate comes from the entity itself, so that the world does not see a
		// mismatch and add the entity to this cube over and over again.
		entity.set_cube_coords(position.x(), cube_of(entity.position()[1].floor() as i32), position.z());

		self.entities.add(entity);
		self.dirty = true;
	}

	pub fn remove_entity(&mut self, id: EntityId) -> Option<W::Entity> {
		let removed = self.entities.remove(id);

		if removed.is_some() {
			self.dirty = true;
		}

		removed
	}

	pub fn entity(&self, id: EntityId) -> Option<&W::Entity> {
		self.entities.get(id)
	}

	pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut W::Entity> {
		self.entities.get_mut(id)
	}

	pub fn entities(&self) -> std::slice::Iter<'_, W::Entity> {
		self.entities.iter()
	}

	pub fn entity_container(&self) -> &EntityContainer<W::Entity> {
		&self.entities
	}

	/// Appends the IDs of every entity that has moved out of this cube.
	pub fn collect_migrated(&self, out: &mut Vec<EntityId>) {
		let position = (self.position.x(), self.position.y() as i32, self.position.z());

		out.extend(
			self.entities.iter()
				.filter(|entity| entity.current_cube() != position)
				.map(Entity::id)
		);
	}

	/// Appends every entity whose bounds intersect `bounds` and that passes `filter`.
	pub fn entities_within<'a, F>(&'a self, bounds: &Aabb, filter: F, out: &mut Vec<&'a W::Entity>)
		where F: Fn(&W::Entity) -> bool {

		out.extend(
			self.entities.iter()
				.filter(|entity| entity.bounds().intersects(bounds) && filter(*entity))
		);
	}

	/// Like `entities_within`, but never reports the excluded entity.
	pub fn entities_within_except<'a, F>(&'a self, excluded: EntityId, bounds: &Aabb, filter: F, out: &mut Vec<&'a W::Entity>)
		where F: Fn(&W::Entity) -> bool {

		self.entities_within(bounds, |entity| entity.id() != excluded && filter(entity), out)
	}

	// Lifecycle

	pub fn is_loaded(&self) -> bool {
		self.loaded
	}

	/// Registers every contained entity and block entity with the world.
	pub fn on_load(&mut self, world: &mut W) {
		assert!(!self.loaded, "cube {} was loaded twice", self.position);

		for entity in self.entities.iter_mut() {
			entity.on_cube_load();
			world.register_entity(entity);
		}

		for (&at, block_entity) in &self.block_entities {
			world.register_block_entity(self.position.with_local(at), block_entity);
		}

		self.loaded = true;
	}

	/// Releases every contained entity and block entity from the world.
	pub fn on_unload(&mut self, world: &mut W) {
		assert!(self.loaded, "cube {} was unloaded without being loaded", self.position);

		for entity in self.entities.iter() {
			world.unregister_entity(entity);
		}

		for (&at, block_entity) in &self.block_entities {
			world.unregister_block_entity(self.position.with_local(at), block_entity);
		}

		self.loaded = false;
	}

	// Persistence

	pub fn is_dirty(&self) -> bool {
		self.dirty
	}

	pub fn needs_saving(&self, tick: u64) -> bool {
		self.dirty || self.entities.needs_saving(tick)
	}

	pub fn mark_saved(&mut self, tick: u64) {
		self.entities.mark_saved(tick);
		self.dirty = false;
	}

	// Light

	pub fn light(&self, channel: LightChannel, at: LocalPosition) -> u4 {
		self.light.get(channel, at)
	}

	/// Writes a light value. Sky light writes are discarded in worlds without a sky, but the cube
	/// is still marked as dirty.
	pub fn set_light(&mut self, channel: LightChannel, at: LocalPosition, value: u4) {
		self.light.set(channel, at, value);
		self.dirty = true;
	}

	/// The light level used for rendering and mob spawning: sky light darkened by
	/// `sky_subtracted`, unless block light is brighter. Darkening never applies to block light.
	pub fn effective_light(&self, at: LocalPosition, sky_subtracted: u8) -> u4 {
		let sky = self.light.get(LightChannel::Sky, at).raw() as i32 - sky_subtracted as i32;
		let block = self.light.get(LightChannel::Block, at);

		if block.raw() as i32 > sky {
			block
		} else {
			u4::new(sky as u8)
		}
	}

	pub fn light_storage(&self) -> &CubeLight {
		&self.light
	}
}
