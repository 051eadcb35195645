use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::host::{HostError, Vault};

/// A vault backed by a directory tree of Markdown files.
#[derive(Debug, Clone)]
pub struct FsVault {
	root: PathBuf,
}

impl FsVault {
	pub fn open(root: impl Into<PathBuf>) -> Result<Self, HostError> {
		let root = root.into();
		if !root.is_dir() {
			return Err(HostError::NotFound(root.display().to_string()));
		}
		Ok(Self { root })
	}

	/// Map a vault-relative path onto disk. `..` and `.` segments are refused.
	pub fn full_path(&self, path: &str) -> Result<PathBuf, HostError> {
		let mut full = self.root.clone();
		for part in path.split(['/', '\\']).filter(|p| !p.is_empty()) {
			if part == ".." || part == "." {
				return Err(HostError::OutsideVault(path.to_string()));
			}
			full.push(part);
		}
		Ok(full)
	}

	/// The vault-relative form of a path on disk, if it lives inside the vault.
	pub fn relative(&self, path: &Path) -> Option<String> {
		let rel = path.strip_prefix(&self.root).ok()?;
		let parts: Vec<String> = rel.components().map(|c| c.as_os_str().to_string_lossy().into_owned()).collect();
		if parts.is_empty() { None } else { Some(parts.join("/")) }
	}
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
	entry.depth() > 0 && entry.file_name().to_str().map(|s| s.starts_with('.')).unwrap_or(false)
}

impl Vault for FsVault {
	fn list_paths(&self) -> Result<Vec<String>, HostError> {
		let mut out = Vec::new();
		let walker = WalkDir::new(&self.root).sort_by_file_name().into_iter().filter_entry(|e| !is_hidden(e));
		for entry in walker {
			let entry = entry.map_err(|e| {
				let context = format!("walk {}", self.root.display());
				HostError::io(context, e.into())
			})?;
			if !entry.file_type().is_file() {
				continue;
			}
			if entry.path().extension().and_then(|e| e.to_str()) != Some("md") {
				continue;
			}
			if let Some(rel) = self.relative(entry.path()) {
				out.push(rel);
			}
		}
		debug!(root = %self.root.display(), count = out.len(), "listed vault documents");
		Ok(out)
	}

	fn exists(&self, path: &str) -> bool {
		self.full_path(path).map(|p| p.is_file()).unwrap_or(false)
	}

	fn create(&mut self, path: &str, initial: &str) -> Result<(), HostError> {
		let full = self.full_path(path)?;
		if let Some(parent) = full.parent() {
			fs::create_dir_all(parent).map_err(|e| HostError::io(format!("create dir {}", parent.display()), e))?;
		}
		let mut f = OpenOptions::new().write(true).create_new(true).open(&full).map_err(|e| {
			if e.kind() == ErrorKind::AlreadyExists {
				HostError::AlreadyExists(path.to_string())
			} else {
				HostError::io(format!("create {}", full.display()), e)
			}
		})?;
		f.write_all(initial.as_bytes()).map_err(|e| HostError::io(format!("write {}", full.display()), e))?;
		Ok(())
	}

	fn read(&self, path: &str) -> Result<String, HostError> {
		let full = self.full_path(path)?;
		fs::read_to_string(&full).map_err(|e| {
			if e.kind() == ErrorKind::NotFound {
				HostError::NotFound(path.to_string())
			} else {
				HostError::io(format!("read {}", full.display()), e)
			}
		})
	}

	fn overwrite(&mut self, path: &str, content: &str) -> Result<(), HostError> {
		let full = self.full_path(path)?;
		if !full.is_file() {
			return Err(HostError::NotFound(path.to_string()));
		}
		fs::write(&full, content).map_err(|e| HostError::io(format!("write {}", full.display()), e))
	}
}

/// An in-memory vault that keeps documents in creation order.
#[derive(Debug, Clone, Default)]
pub struct MemoryVault {
	docs: Vec<(String, String)>,
}

impl MemoryVault {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_docs<I, P, C>(docs: I) -> Self
	where
		I: IntoIterator<Item = (P, C)>,
		P: Into<String>,
		C: Into<String>,
	{
		Self { docs: docs.into_iter().map(|(p, c)| (p.into(), c.into())).collect() }
	}

	fn position(&self, path: &str) -> Option<usize> {
		self.docs.iter().position(|(p, _)| p == path)
	}
}

impl Vault for MemoryVault {
	fn list_paths(&self) -> Result<Vec<String>, HostError> {
		Ok(self.docs.iter().map(|(p, _)| p.clone()).collect())
	}

	fn exists(&self, path: &str) -> bool {
		self.position(path).is_some()
	}

	fn create(&mut self, path: &str, initial: &str) -> Result<(), HostError> {
		if self.exists(path) {
			return Err(HostError::AlreadyExists(path.to_string()));
		}
		self.docs.push((path.to_string(), initial.to_string()));
		Ok(())
	}

	fn read(&self, path: &str) -> Result<String, HostError> {
		self.position(path).map(|i| self.docs[i].1.clone()).ok_or_else(|| HostError::NotFound(path.to_string()))
	}

	fn overwrite(&mut self, path: &str, content: &str) -> Result<(), HostError> {
		let i = self.position(path).ok_or_else(|| HostError::NotFound(path.to_string()))?;
		self.docs[i].1 = content.to_string();
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn memory_vault_keeps_creation_order() {
		let mut vault = MemoryVault::with_docs([("B.md", ""), ("A.md", "")]);
		vault.create("C.md", "c").unwrap();
		assert_eq!(vault.list_paths().unwrap(), vec!["B.md", "A.md", "C.md"]);
		assert!(matches!(vault.create("A.md", ""), Err(HostError::AlreadyExists(_))));
	}

	#[test]
	fn parent_segments_cannot_leave_the_vault() {
		let dir = tempfile::tempdir().unwrap();
		let mut vault = FsVault::open(dir.path()).unwrap();
		assert!(matches!(vault.full_path("../elsewhere/2024-03-01.md"), Err(HostError::OutsideVault(_))));
		assert!(matches!(vault.create("Logs/../../x.md", ""), Err(HostError::OutsideVault(_))));
		assert!(!vault.exists("../x.md"));
		assert_eq!(vault.full_path("Daily Logs/2024-03-01.md").unwrap(), vault.root.join("Daily Logs").join("2024-03-01.md"));
	}

	#[test]
	fn memory_vault_overwrite_requires_document() {
		let mut vault = MemoryVault::new();
		assert!(matches!(vault.overwrite("x.md", "y"), Err(HostError::NotFound(_))));
	}
}
