use crate::position::cube_of_point;

/// Entities are only counted as unsaved once this many ticks have passed since the last save.
pub const ENTITY_SAVE_INTERVAL: u64 = 600;

#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct EntityId(pub u64);

/// An axis aligned bounding box in continuous world space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
	pub min: [f64; 3],
	pub max: [f64; 3]
}

impl Aabb {
	pub fn new(min: [f64; 3], max: [f64; 3]) -> Self {
		Aabb { min, max }
	}

	/// Creates a box of the given half extents around a point.
	pub fn around(center: [f64; 3], half: [f64; 3]) -> Self {
		Aabb {
			min: [center[0] - half[0], center[1] - half[1], center[2] - half[2]],
			max: [center[0] + half[0], center[1] + half[1], center[2] + half[2]]
		}
	}

	pub fn intersects(&self, other: &Aabb) -> bool {
		(0..3).all(|axis| self.min[axis] < other.max[axis] && other.min[axis] < self.max[axis])
	}
}

/// A free-moving object that lives inside a cube's volume.
pub trait Entity {
	fn id(&self) -> EntityId;

	/// The current position in continuous world space.
	fn position(&self) -> [f64; 3];

	fn bounds(&self) -> Aabb;

	/// Human readable type name, used in diagnostics.
	fn type_name(&self) -> &str;

	/// Records the cube the entity was added to. The world uses these coordinates to decide
	/// whether the entity needs to be moved to another cube.
	fn set_cube_coords(&mut self, x: i32, y: i32, z: i32);

	/// Called for each contained entity when its cube is loaded.
	fn on_cube_load(&mut self) {}

	/// Returns the coordinates of the cube that this entity currently occupies.
	fn current_cube(&self) -> (i32, i32, i32) {
		cube_of_point(self.position())
	}
}

/// The entities inside one cube, along with the bookkeeping needed to decide when they must be
/// saved.
#[derive(Debug)]
pub struct EntityContainer<E> {
	entities: Vec<E>,
	last_save: u64
}

impl<E> EntityContainer<E> where E: Entity {
	pub fn new() -> Self {
		EntityContainer { entities: Vec::new(), last_save: 0 }
	}

	pub fn add(&mut self, entity: E) {
		self.entities.push(entity);
	}

	pub fn remove(&mut self, id: EntityId) -> Option<E> {
		let index = self.entities.iter().position(|entity| entity.id() == id)?;

		Some(self.entities.swap_remove(index))
	}

	pub fn get(&self, id: EntityId) -> Option<&E> {
		self.entities.iter().find(|entity| entity.id() == id)
	}

	pub fn get_mut(&mut self, id: EntityId) -> Option<&mut E> {
		self.entities.iter_mut().find(|entity| entity.id() == id)
	}

	pub fn iter(&self) -> std::slice::Iter<'_, E> {
		self.entities.iter()
	}

	pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, E> {
		self.entities.iter_mut()
	}

	pub fn len(&self) -> usize {
		self.entities.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entities.is_empty()
	}

	pub fn needs_saving(&self, tick: u64) -> bool {
		!self.entities.is_empty() && tick >= self.last_save + ENTITY_SAVE_INTERVAL
	}

	pub fn mark_saved(&mut self, tick: u64) {
		self.last_save = tick;
	}

	pub fn last_save(&self) -> u64 {
		self.last_save
	}

	/// Removes and returns every entity, for example when moving them into a fresh cube.
	pub fn drain(&mut self) -> std::vec::Drain<'_, E> {
		self.entities.drain(..)
	}
}

impl<E> Default for EntityContainer<E> where E: Entity {
	fn default() -> Self {
		EntityContainer::new()
	}
}
