//! Stored connection settings.
//!
//! Settings merge across a fixed search path — system, user, then working
//! directory — with later files overriding earlier ones. `bes config save`
//! writes the user file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bes::ConnectionConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
	pub root_server: Option<String>,
	pub username: Option<String>,
	pub password: Option<String>,
	#[serde(default)]
	pub verify: bool,
}

impl CliConfig {
	/// Search path, least to most specific.
	pub fn search_paths() -> Vec<PathBuf> {
		let mut paths = vec![PathBuf::from("/etc/bes.toml")];
		if let Some(path) = Self::user_path() {
			paths.push(path);
		}
		paths.push(PathBuf::from("bes.toml"));
		paths
	}

	/// The user config file written by `config save`.
	pub fn user_path() -> Option<PathBuf> {
		dirs::config_dir().map(|dir| dir.join("bes").join("config.toml"))
	}

	/// Loads settings, either from one explicit file or merged across the
	/// search path.
	pub fn load(explicit: Option<&Path>) -> Result<(CliConfig, Vec<PathBuf>)> {
		let candidates = match explicit {
			Some(path) => vec![path.to_path_buf()],
			None => Self::search_paths(),
		};

		let mut merged = CliConfig::default();
		let mut loaded = Vec::new();
		for path in candidates {
			let Ok(raw) = fs::read_to_string(&path) else {
				continue;
			};
			let parsed: CliConfig = toml::from_str(&raw)
				.with_context(|| format!("malformed config file {}", path.display()))?;
			debug!(path = %path.display(), "loaded config file");
			merged.merge(parsed);
			loaded.push(path);
		}

		Ok((merged, loaded))
	}

	fn merge(&mut self, other: CliConfig) {
		if other.root_server.is_some() {
			self.root_server = other.root_server;
		}
		if other.username.is_some() {
			self.username = other.username;
		}
		if other.password.is_some() {
			self.password = other.password;
		}
		self.verify = other.verify || self.verify;
	}

	/// Writes the current settings to the user config file.
	pub fn save(&self) -> Result<PathBuf> {
		let path = Self::user_path().context("no user config directory available")?;
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)?;
		}
		let rendered = toml::to_string_pretty(self)?;
		fs::write(&path, rendered)?;
		Ok(path)
	}

	/// Connection settings, when all required fields are present.
	pub fn connection_config(&self) -> Option<ConnectionConfig> {
		let root_server = self.root_server.as_deref()?;
		let username = self.username.as_deref()?;
		let password = self.password.as_deref()?;
		let mut config = ConnectionConfig::new(username, password, root_server);
		config.verify = self.verify;
		Some(config)
	}

	/// Password length stands in for the password itself when displaying.
	pub fn describe(&self) -> String {
		format!(
			"root_server: {}\n   username: {}\n   password: ({} chars)\n     verify: {}",
			self.root_server.as_deref().unwrap_or(""),
			self.username.as_deref().unwrap_or(""),
			self.password.as_deref().map(str::len).unwrap_or(0),
			self.verify
		)
	}
}
