use crate::host::{HostError, Vault};

const DELIMITER: &str = "---";

/// Byte offset where migrated tasks go: just past the line holding the second
/// `---`, or 0 when there are fewer than two delimiters.
pub fn insertion_point(content: &str) -> usize {
	let Some(first) = content.find(DELIMITER) else { return 0 };
	let after_first = first + DELIMITER.len();
	let Some(second) = content[after_first..].find(DELIMITER) else { return 0 };
	let end = after_first + second + DELIMITER.len();
	match content[end..].find('\n') {
		Some(nl) => end + nl + 1,
		None => content.len(),
	}
}

/// Splice the batch into `content` at the insertion point.
pub fn splice(content: &str, batch: &[String]) -> String {
	let at = insertion_point(content);
	let (before, after) = content.split_at(at);
	let mut out = String::with_capacity(content.len() + batch.iter().map(|l| l.len() + 1).sum::<usize>() + 1);
	out.push_str(before);
	// a closing delimiter on the last line has no line break to insert after
	if at > 0 && !before.ends_with('\n') {
		out.push('\n');
	}
	out.push_str(&batch.join("\n"));
	out.push('\n');
	out.push_str(after);
	out
}

/// Read the target, splice the batch in and overwrite the whole document.
pub fn write_batch(vault: &mut dyn Vault, path: &str, batch: &[String]) -> Result<String, HostError> {
	let content = vault.read(path)?;
	let updated = splice(&content, batch);
	vault.overwrite(path, &updated)?;
	Ok(updated)
}
