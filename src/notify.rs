use std::process::Command;

use colored::Colorize;
use tracing::debug;

/// How migration results reach the user.
#[derive(Debug, Clone, Copy, Default)]
pub struct Notifier {
	desktop: bool,
}

impl Notifier {
	pub fn new(desktop: bool) -> Self {
		Self { desktop }
	}

	pub fn success(&self, message: &str) {
		println!("{} {}", "✔".green().bold(), message);
		self.desktop_notice("Tasks migrated", message);
	}

	pub fn failure(&self, message: &str) {
		eprintln!("{} {}", "✘".red().bold(), message);
		self.desktop_notice("Task migration failed", message);
	}

	fn desktop_notice(&self, title: &str, message: &str) {
		if !self.desktop {
			return;
		}
		match which::which("notify-send") {
			Ok(bin) => {
				let _ = Command::new(bin).arg(title).arg(message).status();
			}
			Err(_) => debug!("notify-send not found; skipping desktop notification"),
		}
	}
}
