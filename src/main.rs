use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use task_migrate::dates::NaturalDates;
use task_migrate::notify::Notifier;
use task_migrate::picker::SuggestionSession;
use task_migrate::{migrate_selection, suggest, FsVault, LineBuffer, LineRange, Marker, MigrationTarget, Selection, Settings, WikiLinks};

#[derive(Parser)]
#[command(
	name = "tmig",
	version,
	about = "Move checklist tasks between Markdown notes",
	long_about = "Move `- [ ]` task lines out of one note and into another.\n\nThe destination is picked from the notes in the vault whose path contains the query.\nA query that names a day (tod, tomorrow, fri, next monday, in 3 days, 2024-03-01)\nalso offers that day's daily note, creating it when it does not exist yet.\nMigrated lines are marked [>] (or [<] with --backward) and linked to their new home.",
	after_help = "Examples:\n  tmig suggest tod\n  tmig migrate Inbox.md -l 3 --to tomorrow\n  tmig migrate Inbox.md -l 2-6 --to project --pick 2\n  tmig migrate Inbox.md -l 4 --backward\n  tmig config set-folder Journal"
)]
struct Cli {
	/// Vault root directory
	#[arg(long = "vault", env = "TASK_MIGRATE_VAULT", default_value = ".", global = true)]
	vault: PathBuf,
	/// Settings file (default: platform config dir)
	#[arg(long = "config", global = true)]
	config: Option<PathBuf>,
	/// Tracing filter, e.g. "debug" (default: $RUST_LOG or "warn")
	#[arg(long = "log", value_name = "DIRECTIVE", global = true)]
	log_filter: Option<String>,
	/// Resolve day phrases relative to this date YYYY-MM-DD (default: today)
	#[arg(long = "today", global = true)]
	today: Option<String>,
	#[command(subcommand)]
	action: Action,
}

#[derive(Subcommand)]
enum Action {
	/// List the migration targets a query resolves to
	Suggest {
		/// Free-text query
		query: Vec<String>,
	},
	/// Migrate the selected task lines of a note into another note
	Migrate {
		/// Source note (path on disk or vault-relative)
		file: PathBuf,
		/// Selected line N or range A-B, 1-based (can repeat)
		#[arg(short = 'l', long = "line")]
		lines: Vec<String>,
		/// Cursor line, used when no --line is given
		#[arg(short = 'c', long = "cursor")]
		cursor: Option<usize>,
		/// Target query; omit to pick interactively
		#[arg(short = 't', long = "to")]
		to: Option<String>,
		/// Which candidate to take for --to (1-based)
		#[arg(short = 'p', long = "pick", default_value_t = 1)]
		pick: usize,
		/// Mark as scheduled [<] instead of migrated [>]
		#[arg(short = 'b', long = "backward")]
		backward: bool,
		/// Also send a desktop notification
		#[arg(long = "notify")]
		notify: bool,
	},
	/// Show or change settings
	Config {
		#[command(subcommand)]
		cmd: ConfigCmd,
	},
}

#[derive(Subcommand)]
enum ConfigCmd {
	/// Print the current settings
	Show,
	/// Set the folder daily notes are created in
	SetFolder {
		folder: String,
	},
}

fn main() -> Result<()> {
	let cli = Cli::parse();
	init_logging(cli.log_filter.as_deref());
	let settings_path = match &cli.config {
		Some(p) => p.clone(),
		None => Settings::default_path()?,
	};
	let mut settings = Settings::load(&settings_path)?;
	let dates = match cli.today.as_deref() {
		Some(d) => NaturalDates::new(parse_date(d)?),
		None => NaturalDates::local(),
	};
	match cli.action {
		Action::Suggest { query } => {
			let vault = open_vault(&cli.vault)?;
			list_suggestions(&vault, &dates, &settings.daily_folder, &query.join(" "))?
		}
		Action::Migrate { file, lines, cursor, to, pick, backward, notify } => {
			let vault = open_vault(&cli.vault)?;
			let marker = if backward { Marker::Backward } else { Marker::Forward };
			let selection = parse_selection(&lines, cursor)?;
			let notifier = Notifier::new(notify);
			let request = MigrateRequest { file: &file, selection, to: to.as_deref(), pick, marker };
			if let Err(e) = run_migration(vault, &dates, &settings.daily_folder, request, &notifier) {
				notifier.failure(&format!("{:#}", e));
				return Err(e);
			}
		}
		Action::Config { cmd } => match cmd {
			ConfigCmd::Show => {
				println!("settings file: {}", settings_path.display());
				println!("daily_folder = {:?}", settings.daily_folder);
			}
			ConfigCmd::SetFolder { folder } => {
				settings.set_daily_folder(&folder)?;
				settings.save(&settings_path)?;
				println!("Daily notes now go to {:?}", settings.daily_folder);
			}
		},
	}
	Ok(())
}

fn init_logging(directive: Option<&str>) {
	let filter = match directive {
		Some(d) => EnvFilter::new(d),
		None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
	};
	let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).try_init();
}

fn parse_date(s: &str) -> Result<NaiveDate> {
	NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date: {}", s))
}

fn open_vault(root: &Path) -> Result<FsVault> {
	let root = root.canonicalize().with_context(|| format!("open vault {}", root.display()))?;
	FsVault::open(root).context("open vault")
}

fn parse_line_number(s: &str) -> Result<usize> {
	let n: usize = s.trim().parse().with_context(|| format!("invalid line number: {}", s))?;
	if n == 0 {
		bail!("line numbers start at 1");
	}
	Ok(n - 1)
}

fn parse_line_spec(spec: &str) -> Result<LineRange> {
	match spec.split_once(['-', ':']) {
		Some((a, b)) => Ok(LineRange::new(parse_line_number(a)?, parse_line_number(b)?)),
		None => {
			let n = parse_line_number(spec)?;
			Ok(LineRange::new(n, n))
		}
	}
}

fn parse_selection(lines: &[String], cursor: Option<usize>) -> Result<Option<Selection>> {
	let ranges = lines.iter().map(|l| parse_line_spec(l)).collect::<Result<Vec<_>>>()?;
	let cursor = match cursor {
		Some(c) => Some(c.checked_sub(1).context("line numbers start at 1")?),
		None => ranges.first().map(|r| r.anchor.min(r.head)),
	};
	Ok(cursor.map(|c| Selection::with_ranges(c, ranges)))
}

fn list_suggestions(vault: &FsVault, dates: &NaturalDates, folder: &str, query: &str) -> Result<()> {
	let mut session = SuggestionSession::new();
	let ticket = session.begin(query);
	session.deliver(ticket, suggest(vault, dates, folder, query)?);
	print_rows(&session);
	Ok(())
}

fn print_rows(session: &SuggestionSession) {
	if session.visible().is_empty() {
		for row in session.rows() {
			println!("{}", row.dimmed());
		}
		return;
	}
	for (i, target) in session.visible().iter().enumerate() {
		let label = if target.is_daily_note() { target.label().cyan().to_string() } else { target.label() };
		println!("{:>3}. {}", i + 1, label);
	}
}

struct MigrateRequest<'a> {
	file: &'a Path,
	selection: Option<Selection>,
	to: Option<&'a str>,
	pick: usize,
	marker: Marker,
}

fn run_migration(mut vault: FsVault, dates: &NaturalDates, folder: &str, req: MigrateRequest<'_>, notifier: &Notifier) -> Result<()> {
	let source = if req.file.exists() { req.file.to_path_buf() } else { vault.full_path(&req.file.to_string_lossy())? };
	let source = source.canonicalize().with_context(|| format!("open {}", req.file.display()))?;
	let mut buffer = LineBuffer::load(&source)?;
	let Some(selection) = req.selection else {
		warn!(file = %source.display(), "no cursor or selected lines given; nothing to migrate");
		return Ok(());
	};
	buffer.select(fit_selection(selection, buffer.lines().len(), &source)?);

	let target = match req.to {
		Some(query) => {
			let candidates = suggest(&vault, dates, folder, query)?;
			let Some(target) = req.pick.checked_sub(1).and_then(|i| candidates.get(i)) else {
				bail!("no candidate #{} for {:?} ({} found)", req.pick, query, candidates.len());
			};
			target.clone()
		}
		None => match pick_interactively(&vault, dates, folder)? {
			Some(t) => t,
			None => return Ok(()),
		},
	};
	ensure_not_source(&vault, &source, &target)?;

	let Some(outcome) = migrate_selection(&mut vault, &mut buffer, &WikiLinks, &target, req.marker)? else {
		return Ok(());
	};
	if outcome.moved() == 0 {
		println!("No task lines in the selection");
		return Ok(());
	}
	buffer
		.save(&source)
		.with_context(|| format!("tasks were written to {} but {} was not updated", outcome.target, source.display()))?;
	let created = if outcome.created { " (new note)" } else { "" };
	notifier.success(&format!("{} {} task(s) to {}{}", req.marker, outcome.moved(), outcome.target, created));
	Ok(())
}

fn fit_selection(selection: Selection, line_count: usize, source: &Path) -> Result<Selection> {
	selection
		.clamp_to(line_count)
		.with_context(|| format!("selection is past the end of {} ({} lines)", source.display(), line_count))
}

fn ensure_not_source(vault: &FsVault, source: &Path, target: &MigrationTarget) -> Result<()> {
	if vault.relative(source).as_deref() == Some(target.file_path.as_str()) {
		bail!("{} is the note being migrated from", target.file_path);
	}
	Ok(())
}

// Esc on the candidate list cancels; a query with no hits asks again.
fn pick_interactively(vault: &FsVault, dates: &NaturalDates, folder: &str) -> Result<Option<MigrationTarget>> {
	let theme = ColorfulTheme::default();
	let mut session = SuggestionSession::new();
	loop {
		let query: String = Input::with_theme(&theme)
			.with_prompt("Migrate to")
			.allow_empty(true)
			.interact_text()
			.context("read query")?;
		let ticket = session.begin(&query);
		session.deliver(ticket, suggest(vault, dates, folder, &query)?);
		if session.visible().is_empty() {
			print_rows(&session);
			continue;
		}
		let choice = Select::with_theme(&theme)
			.with_prompt(format!("{} candidate(s) for {:?}, Esc to cancel", session.visible().len(), session.query()))
			.items(&session.rows())
			.default(0)
			.interact_opt()
			.context("read choice")?;
		return Ok(choice.and_then(|i| session.choose(i).cloned()));
	}
}
