//! Turns what the user typed into the ordered list of places a task can move to.

use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDate;
use tracing::debug;

use crate::host::{DateParser, HostError, Vault};
use crate::phrase;

pub const DEFAULT_DAILY_FOLDER: &str = "Daily Logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationTarget {
	pub file_path: String,
	/// The recognized day phrase ("Today"); set only on the synthesized daily note.
	pub date: Option<String>,
	pub file_exists: bool,
}

impl MigrationTarget {
	pub fn existing(path: impl Into<String>) -> Self {
		Self { file_path: path.into(), date: None, file_exists: true }
	}

	pub fn is_daily_note(&self) -> bool {
		self.date.is_some()
	}

	pub fn label(&self) -> String {
		match (&self.date, self.file_exists) {
			(Some(_), false) => format!("Create new daily note: {}", self.file_path),
			(Some(date), true) => format!("{}: {}", date, self.file_path),
			(None, _) => self.file_path.clone(),
		}
	}
}

impl fmt::Display for MigrationTarget {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.label())
	}
}

pub fn daily_note_path(folder: &str, date: NaiveDate) -> String {
	let folder = folder.trim_end_matches('/');
	let name = format!("{}.md", date.format("%Y-%m-%d"));
	if folder.is_empty() { name } else { format!("{}/{}", folder, name) }
}

/// Rank candidate targets for `query`: a daily note for a recognized day
/// phrase first, then every path containing the query, in vault order.
pub fn resolve_candidates(query: &str, paths: &[String], folder: &str, dates: &dyn DateParser) -> Vec<MigrationTarget> {
	let query = query.to_lowercase();
	let phrase = phrase::normalize(&query);

	let mut out: Vec<MigrationTarget> = paths
		.iter()
		.filter(|p| p.to_lowercase().contains(&query))
		.map(|p| MigrationTarget::existing(p.clone()))
		.collect();

	if let Some(date) = dates.parse(&phrase) {
		let path = daily_note_path(folder, date);
		let known: HashSet<&str> = paths.iter().map(|p| p.as_str()).collect();
		let file_exists = known.contains(path.as_str());
		out.insert(0, MigrationTarget { file_path: path, date: Some(phrase), file_exists });
	}

	debug!(query = query.as_str(), count = out.len(), "resolved migration candidates");
	out
}

/// List the vault and resolve candidates against it.
pub fn suggest(vault: &dyn Vault, dates: &dyn DateParser, folder: &str, query: &str) -> Result<Vec<MigrationTarget>, HostError> {
	let paths = vault.list_paths()?;
	Ok(resolve_candidates(query, &paths, folder, dates))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dates::NaturalDates;
	use crate::vault::MemoryVault;
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	struct NoDates;

	impl DateParser for NoDates {
		fn parse(&self, _phrase: &str) -> Option<NaiveDate> {
			None
		}
	}

	// Recognizes only "Today", resolving it to 2024-03-01.
	struct FixedToday;

	impl DateParser for FixedToday {
		fn parse(&self, phrase: &str) -> Option<NaiveDate> {
			(phrase == "Today").then(|| NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
		}
	}

	fn paths(items: &[&str]) -> Vec<String> {
		items.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn empty_query_lists_vault_in_order() {
		let got = resolve_candidates("", &paths(&["A.md", "B.md"]), DEFAULT_DAILY_FOLDER, &NoDates);
		assert_eq!(got, vec![MigrationTarget::existing("A.md"), MigrationTarget::existing("B.md")]);
	}

	#[test]
	fn today_abbreviation_synthesizes_daily_note() {
		let got = resolve_candidates("tod", &paths(&["A.md"]), DEFAULT_DAILY_FOLDER, &FixedToday);
		assert_eq!(
			got[0],
			MigrationTarget { file_path: "Daily Logs/2024-03-01.md".into(), date: Some("Today".into()), file_exists: false }
		);
		assert_eq!(got.len(), 1);
	}

	#[test]
	fn daily_note_is_first_and_duplicates_are_kept() {
		let vault = paths(&["Daily Logs/2024-03-01.md", "Today notes.md", "today/plan.md"]);
		let got = resolve_candidates("today", &vault, DEFAULT_DAILY_FOLDER, &FixedToday);
		assert_eq!(got[0].date.as_deref(), Some("Today"));
		assert!(got[0].file_exists);
		assert_eq!(got[0].file_path, "Daily Logs/2024-03-01.md");
		let rest: Vec<&str> = got[1..].iter().map(|t| t.file_path.as_str()).collect();
		assert_eq!(rest, vec!["Today notes.md", "today/plan.md"]);
		assert!(got[1..].iter().all(|t| t.date.is_none()));
	}

	#[test]
	fn synthesized_target_can_also_match_by_substring() {
		let vault = paths(&["Daily Logs/2024-03-01.md"]);
		let got = resolve_candidates("2024-03-01", &vault, DEFAULT_DAILY_FOLDER, &NaturalDates::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
		assert_eq!(got.len(), 2);
		assert_eq!(got[0].file_path, got[1].file_path);
		assert!(got[0].is_daily_note() && !got[1].is_daily_note());
	}

	#[rstest]
	#[case("zzz")]
	#[case("no such note")]
	fn nothing_matches(#[case] query: &str) {
		assert!(resolve_candidates(query, &paths(&["A.md", "Projects/B.md"]), DEFAULT_DAILY_FOLDER, &FixedToday).is_empty());
	}

	#[test]
	fn substring_match_is_case_insensitive() {
		let got = resolve_candidates("PROJ", &paths(&["Projects/Alpha.md", "Inbox.md", "old/projection.md"]), DEFAULT_DAILY_FOLDER, &NoDates);
		let got: Vec<&str> = got.iter().map(|t| t.file_path.as_str()).collect();
		assert_eq!(got, vec!["Projects/Alpha.md", "old/projection.md"]);
	}

	#[test]
	fn date_always_leads_regardless_of_match_count() {
		let many: Vec<String> = (0..50).map(|i| format!("tod-{}.md", i)).collect();
		let got = resolve_candidates("tod", &many, DEFAULT_DAILY_FOLDER, &FixedToday);
		assert_eq!(got.len(), 51);
		assert!(got[0].is_daily_note());
	}

	#[rstest]
	#[case("Daily Logs", "Daily Logs/2024-03-01.md")]
	#[case("Journal/", "Journal/2024-03-01.md")]
	#[case("", "2024-03-01.md")]
	fn daily_paths(#[case] folder: &str, #[case] expected: &str) {
		assert_eq!(daily_note_path(folder, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()), expected);
	}

	#[test]
	fn labels() {
		let new = MigrationTarget { file_path: "Daily Logs/2024-03-01.md".into(), date: Some("Today".into()), file_exists: false };
		assert_eq!(new.label(), "Create new daily note: Daily Logs/2024-03-01.md");
		let old = MigrationTarget { file_exists: true, ..new.clone() };
		assert_eq!(old.label(), "Today: Daily Logs/2024-03-01.md");
		assert_eq!(MigrationTarget::existing("Inbox.md").to_string(), "Inbox.md");
	}

	#[test]
	fn suggest_reads_the_vault() {
		let vault = MemoryVault::with_docs([("Inbox.md", ""), ("Daily Logs/2024-03-01.md", "")]);
		let got = suggest(&vault, &FixedToday, DEFAULT_DAILY_FOLDER, "tod").unwrap();
		assert_eq!(got.len(), 1);
		assert!(got[0].file_exists);
	}
}
