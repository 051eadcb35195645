//! Move checklist tasks between Markdown notes, creating daily notes on demand.

pub mod buffer;
pub mod dates;
pub mod error;
pub mod host;
pub mod migrate;
pub mod notify;
pub mod phrase;
pub mod picker;
pub mod resolver;
pub mod settings;
pub mod tasks;
pub mod vault;
pub mod writer;

pub use buffer::LineBuffer;
pub use dates::NaturalDates;
pub use error::{MigrateError, SettingsError};
pub use host::{DateParser, Editor, HostError, LinkBuilder, Vault, WikiLinks};
pub use migrate::{migrate_selection, MigrationOutcome};
pub use resolver::{resolve_candidates, suggest, MigrationTarget};
pub use settings::Settings;
pub use tasks::{LineOutcome, LineRange, Marker, Selection};
pub use vault::{FsVault, MemoryVault};
