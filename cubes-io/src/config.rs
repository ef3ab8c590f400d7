use crate::error::LoaderError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
	/// Number of I/O worker threads. 0 means one per CPU.
	#[serde(default)]
	pub worker_threads: usize,
	#[serde(default = "LoaderConfig::default_thread_name")]
	pub thread_name: String,
	/// Maximum number of completions installed per `process_completed` call. 0 means no limit.
	#[serde(default)]
	pub drain_limit: usize
}

impl LoaderConfig {
	fn default_thread_name() -> String {
		"cube-io".to_owned()
	}

	pub fn from_json(raw: &str) -> Result<Self, LoaderError> {
		Ok(serde_json::from_str(raw)?)
	}

	/// Loads the config from a JSON file. A missing file gives the default config.
	pub fn load(path: &Path) -> Result<Self, LoaderError> {
		if !path.exists() {
			return Ok(Self::default());
		}

		let raw = std::fs::read_to_string(path)
			.map_err(|source| LoaderError::ConfigRead { path: path.to_owned(), source })?;

		Self::from_json(&raw)
	}
}

impl Default for LoaderConfig {
	fn default() -> Self {
		LoaderConfig {
			worker_threads: 0,
			thread_name: Self::default_thread_name(),
			drain_limit: 0
		}
	}
}
