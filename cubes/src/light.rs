use crate::nibbles::{u4, NibbleCube};
use crate::position::LocalPosition;

/// The two independent light channels stored per block.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum LightChannel {
	Sky,
	Block
}

/// Light storage of a single cube. Worlds without a sky carry no sky light at all: reads return
/// zero and writes are discarded.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CubeLight {
	block: NibbleCube,
	sky: Option<NibbleCube>
}

impl CubeLight {
	pub fn new(has_sky: bool) -> Self {
		CubeLight {
			block: NibbleCube::default(),
			sky: if has_sky { Some(NibbleCube::default()) } else { None }
		}
	}

	pub fn from_raw(block: NibbleCube, sky: Option<NibbleCube>) -> Self {
		CubeLight { block, sky }
	}

	pub fn has_sky(&self) -> bool {
		self.sky.is_some()
	}

	pub fn get(&self, channel: LightChannel, at: LocalPosition) -> u4 {
		match channel {
			LightChannel::Block => self.block.get(at),
			LightChannel::Sky => self.sky.as_ref().map(|sky| sky.get(at)).unwrap_or(u4::MIN)
		}
	}

	pub fn set(&mut self, channel: LightChannel, at: LocalPosition, value: u4) {
		match channel {
			LightChannel::Block => self.block.set(at, value),
			LightChannel::Sky => if let Some(sky) = self.sky.as_mut() {
				sky.set(at, value)
			}
		}
	}

	pub fn block_light(&self) -> &NibbleCube {
		&self.block
	}

	pub fn sky_light(&self) -> Option<&NibbleCube> {
		self.sky.as_ref()
	}
}
