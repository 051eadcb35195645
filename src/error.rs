use thiserror::Error;

use crate::host::HostError;

#[derive(Debug, Error)]
pub enum MigrateError {
	#[error("cannot create {path}: {source}")]
	CreateTarget {
		path: String,
		#[source]
		source: HostError,
	},
	#[error("cannot write tasks into {path}: {source}")]
	WriteTarget {
		path: String,
		#[source]
		source: HostError,
	},
	/// The target already holds the tasks but only `applied` source lines were rewritten.
	#[error("tasks written to {path} but only {applied} source line(s) were updated: {source}")]
	PartialSource {
		path: String,
		applied: usize,
		#[source]
		source: HostError,
	},
}

#[derive(Debug, Error)]
pub enum SettingsError {
	#[error("cannot resolve a configuration directory")]
	NoConfigDir,
	#[error("{context}: {source}")]
	Io {
		context: String,
		#[source]
		source: std::io::Error,
	},
	#[error("invalid settings in {path}: {source}")]
	Parse {
		path: String,
		#[source]
		source: toml::de::Error,
	},
	#[error("daily folder must stay inside the vault: {0:?}")]
	InvalidFolder(String),
	#[error("cannot serialize settings: {0}")]
	Serialize(#[from] toml::ser::Error),
}
