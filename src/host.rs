//! Capabilities the migration core borrows from whatever application hosts it.
//!
//! Everything the resolver and the writers touch comes in through these traits,
//! so the core runs the same against a directory on disk, an in-memory vault in
//! tests, or an embedding editor.

use std::io;

use chrono::NaiveDate;
use thiserror::Error;

use crate::tasks::Selection;

#[derive(Debug, Error)]
pub enum HostError {
	#[error("document not found: {0}")]
	NotFound(String),
	#[error("path leaves the vault: {0}")]
	OutsideVault(String),
	#[error("document already exists: {0}")]
	AlreadyExists(String),
	#[error("line {index} is out of range ({len} lines)")]
	LineOutOfRange { index: usize, len: usize },
	#[error("{context}: {source}")]
	Io {
		context: String,
		#[source]
		source: io::Error,
	},
}

impl HostError {
	pub fn io(context: impl Into<String>, source: io::Error) -> Self {
		HostError::Io { context: context.into(), source }
	}
}

/// The document index plus whole-document reads and writes. Paths are
/// vault-relative and `/`-separated; the path doubles as the document handle.
pub trait Vault {
	/// Every text document, in the vault's natural enumeration order.
	fn list_paths(&self) -> Result<Vec<String>, HostError>;
	fn exists(&self, path: &str) -> bool;
	fn create(&mut self, path: &str, initial: &str) -> Result<(), HostError>;
	fn read(&self, path: &str) -> Result<String, HostError>;
	fn overwrite(&mut self, path: &str, content: &str) -> Result<(), HostError>;
}

/// Best-effort natural-language date recognition.
pub trait DateParser {
	fn parse(&self, phrase: &str) -> Option<NaiveDate>;
}

/// The active editor. `selection` is `None` when no document is focused.
pub trait Editor {
	fn selection(&self) -> Option<Selection>;
	fn line(&self, index: usize) -> Option<String>;
	fn set_line(&mut self, index: usize, text: &str) -> Result<(), HostError>;
}

/// Produces a cross-reference token in the host's linking syntax.
pub trait LinkBuilder {
	fn link(&self, target_path: &str, display: &str) -> String;
}

/// Obsidian-style `[[wiki links]]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WikiLinks;

impl LinkBuilder for WikiLinks {
	fn link(&self, target_path: &str, display: &str) -> String {
		let target = target_path.strip_suffix(".md").unwrap_or(target_path);
		let display = display.strip_suffix(".md").unwrap_or(display);
		if display.is_empty() || display == target {
			format!("[[{}]]", target)
		} else {
			format!("[[{}|{}]]", target, display)
		}
	}
}
