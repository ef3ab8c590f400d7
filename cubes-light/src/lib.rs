#![forbid(unsafe_code)]

//! # `cubes-light`: Neighbor snapshots for lighting
//!
//! Light propagation touches a block and its neighbors, which often lie in adjacent cubes. A
//! `NeighborSnapshot` resolves every cube in a small window once, up front, and then serves
//! block addressed reads and light writes from that window.
//!
//! Building a snapshot never loads anything. If a neighbor is not resident, the snapshot fails
//! with a report of every cube that was resident in every loaded column at that time.

extern crate rustc_hash;

pub mod access;
pub mod error;
pub mod provider;
pub mod snapshot;

pub use crate::access::{BlockLightTable, LightAccess, LightRules};
pub use crate::error::{ColumnReport, MissingCubeReport, SnapshotError};
pub use crate::provider::{CubeProvider, LoadedRegionSource, ResidentColumns};
pub use crate::snapshot::NeighborSnapshot;
