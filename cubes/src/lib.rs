#![forbid(unsafe_code)]

//! # `cubes`: Cubic world storage
//!
//! A world of effectively unbounded height, split into 16x16x16 cubes that are grouped into
//! vertical columns. Unlike a fixed-height chunk, a column only holds the cubes that are actually
//! resident, so a column may contain cube 0 and cube 40000 and nothing in between.
//!
//! A `Cube` is the unit of persistence: it owns the block IDs, metadata, both light channels,
//! the block entities attached to its blocks, and the free-moving entities inside its volume.
//! Anything that has rules attached to it (what happens when a block is removed, which blocks
//! carry a block entity, how the world tracks loaded entities) lives behind the `WorldContext`
//! trait, so this crate only enforces the structural contract.
//!
//! Lifecycle and concurrency are split the same way everywhere in this workspace: all mutation of
//! the world graph happens on one main context that holds the `WorldContext`, while shared handles
//! (`CubeHandle`, `ColumnHandle`) use fine-grained spin locks so that I/O workers can hold a
//! column without touching it.

// Efficient and fine-grained spin locks
extern crate spin;

// Fast hash map
extern crate rustc_hash;

pub mod position;

/// Bulk nibble storage, used for both light channels and block metadata.
pub mod nibbles;

/// Dense block storage with an O(1) emptiness check.
pub mod storage;

pub mod light;
pub mod entity;
pub mod block_entity;
pub mod world;
pub mod cube;
pub mod column;
pub mod heightmap;
pub mod error;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use crate::block_entity::BlockEntity;
pub use crate::column::{Column, ColumnHandle, CubeHandle};
pub use crate::cube::Cube;
pub use crate::entity::{Aabb, Entity, EntityId};
pub use crate::error::{ColumnError, HeightDataError, PositionError};
pub use crate::heightmap::{ColumnHeightMap, HeightMap, NO_HEIGHT};
pub use crate::light::LightChannel;
pub use crate::nibbles::u4;
pub use crate::storage::BlockId;
pub use crate::world::WorldContext;
