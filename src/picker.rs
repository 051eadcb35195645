use tracing::debug;

use crate::resolver::MigrationTarget;

pub const EMPTY_STATE_TEXT: &str = "No files found";

/// Identifies one candidate refresh. Only the newest ticket may update the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// The visible state of an open picker.
#[derive(Debug, Default)]
pub struct SuggestionSession {
	generation: u64,
	query: String,
	visible: Vec<MigrationTarget>,
}

impl SuggestionSession {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a new query. Any ticket handed out earlier goes stale.
	pub fn begin(&mut self, query: &str) -> Ticket {
		self.generation += 1;
		self.query = query.to_string();
		Ticket(self.generation)
	}

	/// Apply a finished resolution. Returns false, leaving the list as is,
	/// when a newer query was started in the meantime.
	pub fn deliver(&mut self, ticket: Ticket, results: Vec<MigrationTarget>) -> bool {
		if ticket.0 != self.generation {
			debug!(stale = ticket.0, current = self.generation, "dropping out-of-order candidates");
			return false;
		}
		self.visible = results;
		true
	}

	pub fn query(&self) -> &str {
		&self.query
	}

	pub fn visible(&self) -> &[MigrationTarget] {
		&self.visible
	}

	pub fn choose(&self, index: usize) -> Option<&MigrationTarget> {
		self.visible.get(index)
	}

	pub fn rows(&self) -> Vec<String> {
		if self.visible.is_empty() {
			return vec![EMPTY_STATE_TEXT.to_string()];
		}
		self.visible.iter().map(|t| t.label()).collect()
	}
}
