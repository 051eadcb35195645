use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SettingsError;
use crate::resolver::DEFAULT_DAILY_FOLDER;

pub const ENV_CONFIG: &str = "TASK_MIGRATE_CONFIG";
const FILE_NAME: &str = "settings.toml";

/// The one persisted setting: where daily notes live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	pub daily_folder: String,
}

impl Default for Settings {
	fn default() -> Self {
		Self { daily_folder: DEFAULT_DAILY_FOLDER.to_string() }
	}
}

impl Settings {
	/// `$TASK_MIGRATE_CONFIG`, else the platform config directory.
	pub fn default_path() -> Result<PathBuf, SettingsError> {
		if let Ok(p) = env::var(ENV_CONFIG) {
			return Ok(PathBuf::from(p));
		}
		let proj = ProjectDirs::from("dev", "local", "task_migrate").ok_or(SettingsError::NoConfigDir)?;
		Ok(proj.config_dir().join(FILE_NAME))
	}

	/// Vault-relative folder only: no leading `/`, no `.` or `..` segments.
	pub fn set_daily_folder(&mut self, folder: &str) -> Result<(), SettingsError> {
		let folder = folder.trim().trim_end_matches('/');
		let escapes = folder.starts_with('/') || folder.split(['/', '\\']).any(|p| p == ".." || p == ".");
		if escapes {
			return Err(SettingsError::InvalidFolder(folder.to_string()));
		}
		self.daily_folder = folder.to_string();
		Ok(())
	}

	/// Missing file or missing keys fall back to the defaults.
	pub fn load(path: &Path) -> Result<Self, SettingsError> {
		if !path.exists() {
			debug!(path = %path.display(), "no settings file; using defaults");
			return Ok(Self::default());
		}
		let raw = fs::read_to_string(path)
			.map_err(|source| SettingsError::Io { context: format!("read {}", path.display()), source })?;
		toml::from_str(&raw).map_err(|source| SettingsError::Parse { path: path.display().to_string(), source })
	}

	pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
		if let Some(dir) = path.parent() {
			fs::create_dir_all(dir)
				.map_err(|source| SettingsError::Io { context: format!("create dir {}", dir.display()), source })?;
		}
		let raw = toml::to_string_pretty(self)?;
		fs::write(path, raw).map_err(|source| SettingsError::Io { context: format!("write {}", path.display()), source })?;
		debug!(path = %path.display(), "saved settings");
		Ok(())
	}
}
