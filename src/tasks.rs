use std::collections::BTreeSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::host::{Editor, HostError};

static TASK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^- \[(.)\] (.*)$").expect("valid regex"));

/// Status written into a migrated task's checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
	/// `>`: moved forward to a later page.
	Forward,
	/// `<`: scheduled, or moved back to an earlier page.
	Backward,
}

impl Marker {
	pub fn symbol(self) -> char {
		match self {
			Marker::Forward => '>',
			Marker::Backward => '<',
		}
	}
}

impl fmt::Display for Marker {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Marker::Forward => write!(f, "migrated"),
			Marker::Backward => write!(f, "scheduled"),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
	pub anchor: usize,
	pub head: usize,
}

impl LineRange {
	pub fn new(anchor: usize, head: usize) -> Self {
		Self { anchor, head }
	}

	pub fn lines(self) -> std::ops::RangeInclusive<usize> {
		self.anchor.min(self.head)..=self.anchor.max(self.head)
	}
}

/// Cursor plus any active selection ranges, as the editor reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
	pub cursor: usize,
	pub ranges: Vec<LineRange>,
}

impl Selection {
	pub fn cursor(line: usize) -> Self {
		Self { cursor: line, ranges: Vec::new() }
	}

	pub fn with_ranges(cursor: usize, ranges: Vec<LineRange>) -> Self {
		Self { cursor, ranges }
	}

	/// Fit the selection to a document of `line_count` lines. Range ends past
	/// the last line are pulled back to it. `None` when the cursor or a range
	/// start lies beyond the document.
	pub fn clamp_to(&self, line_count: usize) -> Option<Self> {
		let last = line_count.checked_sub(1)?;
		if self.cursor > last {
			return None;
		}
		let mut ranges = Vec::with_capacity(self.ranges.len());
		for r in &self.ranges {
			if r.anchor.min(r.head) > last {
				return None;
			}
			ranges.push(LineRange::new(r.anchor.min(last), r.head.min(last)));
		}
		Some(Self { cursor: self.cursor, ranges })
	}

	/// Ascending, deduplicated line indices covered by the selection.
	pub fn line_indices(&self) -> Vec<usize> {
		if self.ranges.is_empty() {
			return vec![self.cursor];
		}
		let set: BTreeSet<usize> = self.ranges.iter().flat_map(|r| r.lines()).collect();
		set.into_iter().collect()
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskLine {
	pub index: usize,
	pub marker: char,
	pub content: String,
}

impl TaskLine {
	pub fn parse(index: usize, line: &str) -> Option<Self> {
		let caps = TASK_RE.captures(line)?;
		let marker = caps.get(1)?.as_str().chars().next()?;
		let content = caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default();
		Some(Self { index, marker, content })
	}
}

/// Swap the checkbox marker and append the back-link. Only the first
/// `- [old] ` is touched.
pub fn rewrite_line(line: &str, old: char, new: Marker, link: &str) -> String {
	let from = format!("- [{}] ", old);
	let to = format!("- [{}] ", new.symbol());
	format!("{} {}", line.replacen(&from, &to, 1), link)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
	Migrated { index: usize, original: String, rewritten: String },
	Skipped { index: usize },
}

impl LineOutcome {
	pub fn index(&self) -> usize {
		match self {
			LineOutcome::Migrated { index, .. } | LineOutcome::Skipped { index } => *index,
		}
	}
}

/// Rewrites computed against the source document but not yet applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagedRewrite {
	pub outcomes: Vec<LineOutcome>,
}

impl StagedRewrite {
	/// Original text of every task line, in line order.
	pub fn batch(&self) -> Vec<String> {
		self.outcomes
			.iter()
			.filter_map(|o| match o {
				LineOutcome::Migrated { original, .. } => Some(original.clone()),
				LineOutcome::Skipped { .. } => None,
			})
			.collect()
	}

	pub fn is_empty(&self) -> bool {
		self.outcomes.iter().all(|o| matches!(o, LineOutcome::Skipped { .. }))
	}

	pub fn skipped(&self) -> usize {
		self.outcomes.iter().filter(|o| matches!(o, LineOutcome::Skipped { .. })).count()
	}
}

/// Classify every selected line and compute its rewrite. Reads only.
pub fn stage(editor: &dyn Editor, lines: &[usize], marker: Marker, link: &str) -> StagedRewrite {
	let mut outcomes = Vec::with_capacity(lines.len());
	for &index in lines {
		let Some(text) = editor.line(index) else {
			debug!(index, "selected line missing from document");
			outcomes.push(LineOutcome::Skipped { index });
			continue;
		};
		match TaskLine::parse(index, &text) {
			Some(task) => {
				let rewritten = rewrite_line(&text, task.marker, marker, link);
				outcomes.push(LineOutcome::Migrated { index, original: text, rewritten });
			}
			None => {
				debug!(index, "skipping non-task line");
				outcomes.push(LineOutcome::Skipped { index });
			}
		}
	}
	StagedRewrite { outcomes }
}

/// Write the staged rewrites back into the editor. Returns how many lines
/// were applied before the first failure, along with that failure.
pub fn apply(editor: &mut dyn Editor, staged: &StagedRewrite) -> Result<usize, (usize, HostError)> {
	let mut applied = 0usize;
	for outcome in &staged.outcomes {
		if let LineOutcome::Migrated { index, rewritten, .. } = outcome {
			editor.set_line(*index, rewritten).map_err(|e| (applied, e))?;
			applied += 1;
		}
	}
	Ok(applied)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::buffer::LineBuffer;
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	#[test]
	fn cursor_only_selection_is_single_line() {
		assert_eq!(Selection::cursor(4).line_indices(), vec![4]);
	}

	#[test]
	fn ranges_are_normalized_and_merged() {
		let sel = Selection::with_ranges(0, vec![LineRange::new(5, 3), LineRange::new(1, 1), LineRange::new(4, 6)]);
		assert_eq!(sel.line_indices(), vec![1, 3, 4, 5, 6]);
	}

	#[test]
	fn huge_range_is_clamped_to_document() {
		let sel = Selection::with_ranges(0, vec![LineRange::new(0, 50_000_000), LineRange::new(7, 2)]);
		let fitted = sel.clamp_to(3).unwrap();
		assert_eq!(fitted.ranges, vec![LineRange::new(0, 2), LineRange::new(2, 2)]);
		assert_eq!(fitted.line_indices(), vec![0, 1, 2]);
	}

	#[test]
	fn selection_past_the_end_does_not_fit() {
		assert_eq!(Selection::cursor(3).clamp_to(3), None);
		assert_eq!(Selection::with_ranges(0, vec![LineRange::new(5, 9)]).clamp_to(3), None);
		assert_eq!(Selection::cursor(0).clamp_to(0), None);
		assert_eq!(Selection::cursor(2).clamp_to(3), Some(Selection::cursor(2)));
	}

	#[rstest]
	#[case("- [ ] Buy milk", Some(' '), "Buy milk")]
	#[case("- [x] Done thing", Some('x'), "Done thing")]
	#[case("- [/] ", Some('/'), "")]
	#[case("- [] nope", None, "")]
	#[case("  - [ ] indented", None, "")]
	#[case("* [ ] star bullet", None, "")]
	#[case("- [ ]no space", None, "")]
	#[case("plain text", None, "")]
	fn task_pattern(#[case] line: &str, #[case] marker: Option<char>, #[case] content: &str) {
		let parsed = TaskLine::parse(0, line);
		assert_eq!(parsed.as_ref().map(|t| t.marker), marker);
		if let Some(task) = parsed {
			assert_eq!(task.content, content);
		}
	}

	#[test]
	fn rewrites_buy_milk_forward() {
		let out = rewrite_line("- [ ] Buy milk", ' ', Marker::Forward, "[[Daily Logs/2024-03-01]]");
		assert_eq!(out, "- [>] Buy milk [[Daily Logs/2024-03-01]]");
	}

	#[test]
	fn rewritten_line_loses_old_marker_and_gains_link() {
		let link = "[[Projects/Alpha]]";
		let out = rewrite_line("- [?] Ask about - [?] twice", '?', Marker::Backward, link);
		assert_eq!(out, "- [<] Ask about - [?] twice [[Projects/Alpha]]");
		assert!(!out.starts_with("- [?] "));
		assert!(out.contains(link));
	}

	#[test]
	fn stage_collects_originals_and_skips_non_tasks() {
		let buf = LineBuffer::from_text("# Today\n- [ ] Buy milk\nnotes\n- [x] Call mom\n");
		let staged = stage(&buf, &[0, 1, 2, 3, 9], Marker::Forward, "[[T]]");
		assert_eq!(staged.batch(), vec!["- [ ] Buy milk".to_string(), "- [x] Call mom".to_string()]);
		assert_eq!(staged.skipped(), 3);
		let indices: Vec<usize> = staged.outcomes.iter().map(|o| o.index()).collect();
		assert_eq!(indices, vec![0, 1, 2, 3, 9]);
	}

	#[test]
	fn apply_rewrites_only_task_lines() {
		let mut buf = LineBuffer::from_text("- [ ] Buy milk\nnot a task\n");
		let staged = stage(&buf, &[0, 1], Marker::Forward, "[[Daily Logs/2024-03-01]]");
		assert_eq!(apply(&mut buf, &staged).unwrap(), 1);
		assert_eq!(buf.lines(), &["- [>] Buy milk [[Daily Logs/2024-03-01]]".to_string(), "not a task".to_string()]);
	}

	#[test]
	fn staging_does_not_touch_the_editor() {
		let buf = LineBuffer::from_text("- [ ] a\n- [ ] b");
		let staged = stage(&buf, &[0, 1], Marker::Backward, "[[X]]");
		assert!(!staged.is_empty());
		assert_eq!(buf.lines(), &["- [ ] a".to_string(), "- [ ] b".to_string()]);
	}
}
