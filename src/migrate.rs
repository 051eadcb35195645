use tracing::{info, warn};

use crate::error::MigrateError;
use crate::host::{Editor, LinkBuilder, Vault};
use crate::resolver::MigrationTarget;
use crate::tasks::{self, LineOutcome, Marker};
use crate::writer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOutcome {
	pub target: String,
	pub created: bool,
	/// Original text of every migrated task line.
	pub batch: Vec<String>,
	pub lines: Vec<LineOutcome>,
}

impl MigrationOutcome {
	pub fn moved(&self) -> usize {
		self.batch.len()
	}
}

/// Move the task lines under the editor's selection into `target`.
///
/// Rewrites are staged first. The target is then created if needed and
/// written, and only after that are the source lines changed, so a target
/// failure leaves the source as it was. Returns `Ok(None)` when no editor is
/// active.
pub fn migrate_selection(
	vault: &mut dyn Vault,
	editor: &mut dyn Editor,
	links: &dyn LinkBuilder,
	target: &MigrationTarget,
	marker: Marker,
) -> Result<Option<MigrationOutcome>, MigrateError> {
	let Some(selection) = editor.selection() else {
		warn!("no active editor selection; nothing to migrate");
		return Ok(None);
	};
	let path = target.file_path.as_str();
	let link = links.link(path, path);
	let staged = tasks::stage(&*editor, &selection.line_indices(), marker, &link);
	let batch = staged.batch();
	if batch.is_empty() {
		info!(path, "selection holds no task lines");
		return Ok(Some(MigrationOutcome { target: path.to_string(), created: false, batch, lines: staged.outcomes }));
	}

	let mut created = false;
	if !vault.exists(path) {
		vault
			.create(path, "")
			.map_err(|source| MigrateError::CreateTarget { path: path.to_string(), source })?;
		info!(path, "created target document");
		created = true;
	}
	writer::write_batch(vault, path, &batch).map_err(|source| MigrateError::WriteTarget { path: path.to_string(), source })?;

	tasks::apply(editor, &staged)
		.map_err(|(applied, source)| MigrateError::PartialSource { path: path.to_string(), applied, source })?;
	info!(path, moved = batch.len(), %marker, "migrated tasks");

	Ok(Some(MigrationOutcome { target: path.to_string(), created, batch, lines: staged.outcomes }))
}
