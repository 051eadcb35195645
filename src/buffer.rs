use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::path::Path;

use crate::host::{Editor, HostError};
use crate::tasks::Selection;

/// A document held as lines, with the cursor and selection of whoever opened it.
#[derive(Debug, Clone, Default)]
pub struct LineBuffer {
	lines: Vec<String>,
	line_ending: &'static str,
	trailing_newline: bool,
	selection: Option<Selection>,
}

impl LineBuffer {
	pub fn from_text(text: &str) -> Self {
		Self {
			lines: text.lines().map(|l| l.to_string()).collect(),
			line_ending: if text.contains("\r\n") { "\r\n" } else { "\n" },
			trailing_newline: text.ends_with('\n'),
			selection: None,
		}
	}

	pub fn load(path: &Path) -> Result<Self, HostError> {
		let mut f = OpenOptions::new()
			.read(true)
			.open(path)
			.map_err(|e| HostError::io(format!("open {}", path.display()), e))?;
		let mut s = String::new();
		f.read_to_string(&mut s).map_err(|e| HostError::io(format!("read {}", path.display()), e))?;
		Ok(Self::from_text(&s))
	}

	pub fn save(&self, path: &Path) -> Result<(), HostError> {
		let mut f = OpenOptions::new()
			.create(true)
			.truncate(true)
			.write(true)
			.open(path)
			.map_err(|e| HostError::io(format!("write {}", path.display()), e))?;
		f.write_all(self.to_text().as_bytes()).map_err(|e| HostError::io(format!("write {}", path.display()), e))?;
		Ok(())
	}

	pub fn to_text(&self) -> String {
		let mut s = self.lines.join(self.line_ending);
		if self.trailing_newline && !self.lines.is_empty() {
			s.push_str(self.line_ending);
		}
		s
	}

	pub fn lines(&self) -> &[String] {
		&self.lines
	}

	pub fn select(&mut self, selection: Selection) {
		self.selection = Some(selection);
	}

	pub fn with_selection(mut self, selection: Selection) -> Self {
		self.select(selection);
		self
	}
}

impl Editor for LineBuffer {
	fn selection(&self) -> Option<Selection> {
		self.selection.clone()
	}

	fn line(&self, index: usize) -> Option<String> {
		self.lines.get(index).cloned()
	}

	fn set_line(&mut self, index: usize, text: &str) -> Result<(), HostError> {
		let len = self.lines.len();
		let slot = self.lines.get_mut(index).ok_or(HostError::LineOutOfRange { index, len })?;
		*slot = text.to_string();
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn text_round_trip_keeps_trailing_newline() {
		assert_eq!(LineBuffer::from_text("a\nb\n").to_text(), "a\nb\n");
		assert_eq!(LineBuffer::from_text("a\nb").to_text(), "a\nb");
		assert_eq!(LineBuffer::from_text("").to_text(), "");
	}

	#[test]
	fn crlf_survives_a_line_rewrite() {
		let mut buf = LineBuffer::from_text("- [ ] a\r\nkeep\r\n");
		buf.set_line(0, "- [>] a [[T]]").unwrap();
		assert_eq!(buf.lines(), &["- [>] a [[T]]".to_string(), "keep".to_string()]);
		assert_eq!(buf.to_text(), "- [>] a [[T]]\r\nkeep\r\n");
		assert_eq!(LineBuffer::from_text("x\r\ny").to_text(), "x\r\ny");
	}

	#[test]
	fn set_line_out_of_range_fails() {
		let mut buf = LineBuffer::from_text("only\n");
		let err = buf.set_line(3, "x").unwrap_err();
		assert!(matches!(err, HostError::LineOutOfRange { index: 3, len: 1 }));
	}

	#[test]
	fn no_selection_until_selected() {
		let buf = LineBuffer::from_text("- [ ] a");
		assert!(buf.selection().is_none());
		let buf = buf.with_selection(Selection::cursor(0));
		assert_eq!(buf.selection(), Some(Selection::cursor(0)));
	}

	#[test]
	fn load_and_save_through_disk() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("note.md");
		std::fs::write(&path, "- [ ] a\ntext\n").unwrap();
		let mut buf = LineBuffer::load(&path).unwrap();
		buf.set_line(0, "- [>] a [[X]]").unwrap();
		buf.save(&path).unwrap();
		assert_eq!(std::fs::read_to_string(&path).unwrap(), "- [>] a [[X]]\ntext\n");
	}
}
