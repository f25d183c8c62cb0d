//! Domain entities and retention rules.

#![forbid(unsafe_code)]

mod default_rules;
mod file_entry;
mod retention;

pub use default_rules::{DEFAULT_LOG_RETENTION_DAYS, default_retention_rules};
pub use file_entry::{FileEntry, remote_path};
pub use retention::{
    DatedLogRule, FolderRule, PatternRule, RetentionDecision, RetentionRule, RetentionRuleInput,
    matches_any_glob, parse_embedded_date, should_delete,
};
