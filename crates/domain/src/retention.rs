//! Retention rules and their evaluation.
//!
//! Evaluation is pure: it reads a [`FileEntry`] and the current day and
//! returns a [`RetentionDecision`]. Listing and deleting remote files is left
//! to the application layer.

use chrono::format::{Item, StrftimeItems};
use chrono::{Days, NaiveDate};
use glob::{MatchOptions, Pattern};
use hostkeeper_core::{AppError, AppResult};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::FileEntry;

const GLOB_MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Unvalidated retention rule, as supplied by configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RetentionRuleInput {
    /// Deletes entries whose path matches any of the globs.
    Pattern {
        /// Folder to list, empty for the server root.
        #[serde(default)]
        folder_path: String,
        /// Shell globs tried in order.
        globs: Vec<String>,
    },
    /// Deletes every entry listed under the folder.
    Folder {
        /// Folder to wipe.
        folder_path: String,
    },
    /// Deletes entries whose embedded date is older than the retention window.
    DatedLog {
        /// Folder to list.
        folder_path: String,
        /// Regex locating the date inside the entry path.
        date_regex: String,
        /// `strftime` format of the located date.
        date_format: String,
        /// Retention window in days.
        max_age_days: u32,
    },
}

/// Glob-based rule.
#[derive(Debug, Clone)]
pub struct PatternRule {
    folder_path: String,
    globs: Vec<Pattern>,
}

impl PatternRule {
    /// Compiles the globs of a pattern rule.
    pub fn new(folder_path: impl Into<String>, globs: &[String]) -> AppResult<Self> {
        if globs.is_empty() {
            return Err(AppError::Validation(
                "pattern rule requires at least one glob".to_owned(),
            ));
        }

        let globs = globs
            .iter()
            .map(|glob| {
                Pattern::new(glob).map_err(|error| {
                    AppError::Validation(format!("invalid glob '{glob}': {error}"))
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self {
            folder_path: normalize_folder_path(folder_path.into()),
            globs,
        })
    }

    /// Returns the listed folder.
    #[must_use]
    pub fn folder_path(&self) -> &str {
        self.folder_path.as_str()
    }

    /// Returns the compiled globs in evaluation order.
    #[must_use]
    pub fn globs(&self) -> &[Pattern] {
        &self.globs
    }
}

/// Unconditional folder wipe.
#[derive(Debug, Clone)]
pub struct FolderRule {
    folder_path: String,
}

impl FolderRule {
    /// Creates a folder rule. The server root cannot be wiped.
    pub fn new(folder_path: impl Into<String>) -> AppResult<Self> {
        let folder_path = normalize_folder_path(folder_path.into());
        if folder_path.trim().is_empty() {
            return Err(AppError::Validation(
                "folder rule requires a non-root folder path".to_owned(),
            ));
        }

        Ok(Self { folder_path })
    }

    /// Returns the wiped folder.
    #[must_use]
    pub fn folder_path(&self) -> &str {
        self.folder_path.as_str()
    }
}

/// Age-based rule driven by a date embedded in the file name.
#[derive(Debug, Clone)]
pub struct DatedLogRule {
    folder_path: String,
    date_regex: Regex,
    date_format: String,
    max_age_days: u32,
}

impl DatedLogRule {
    /// Compiles a dated log rule.
    pub fn new(
        folder_path: impl Into<String>,
        date_regex: &str,
        date_format: impl Into<String>,
        max_age_days: u32,
    ) -> AppResult<Self> {
        let date_regex = Regex::new(date_regex).map_err(|error| {
            AppError::Validation(format!("invalid date regex '{date_regex}': {error}"))
        })?;

        let date_format = date_format.into();
        if date_format.trim().is_empty()
            || StrftimeItems::new(date_format.as_str()).any(|item| item == Item::Error)
        {
            return Err(AppError::Validation(format!(
                "invalid date format '{date_format}'"
            )));
        }

        Ok(Self {
            folder_path: normalize_folder_path(folder_path.into()),
            date_regex,
            date_format,
            max_age_days,
        })
    }

    /// Returns the listed folder.
    #[must_use]
    pub fn folder_path(&self) -> &str {
        self.folder_path.as_str()
    }

    /// Returns the retention window in days.
    #[must_use]
    pub fn max_age_days(&self) -> u32 {
        self.max_age_days
    }

    /// Returns the oldest day that is still retained.
    #[must_use]
    pub fn cutoff(&self, today: NaiveDate) -> Option<NaiveDate> {
        today.checked_sub_days(Days::new(u64::from(self.max_age_days)))
    }

    fn evaluate(&self, entry: &FileEntry, today: NaiveDate) -> RetentionDecision {
        let Some(file_date) =
            parse_embedded_date(entry.path(), &self.date_regex, self.date_format.as_str())
        else {
            return RetentionDecision::UnparseableDate {
                reason: format!(
                    "no date matching '{}' with format '{}' in '{}'",
                    self.date_regex.as_str(),
                    self.date_format,
                    entry.path()
                ),
            };
        };

        match self.cutoff(today) {
            Some(cutoff) if file_date < cutoff => RetentionDecision::Delete,
            _ => RetentionDecision::Retain,
        }
    }
}

/// Validated retention rule.
#[derive(Debug, Clone)]
pub enum RetentionRule {
    /// Glob-based deletion.
    Pattern(PatternRule),
    /// Unconditional folder wipe.
    Folder(FolderRule),
    /// Embedded-date deletion.
    DatedLog(DatedLogRule),
}

impl RetentionRule {
    /// Validates and compiles a configured rule.
    pub fn new(input: RetentionRuleInput) -> AppResult<Self> {
        match input {
            RetentionRuleInput::Pattern { folder_path, globs } => {
                PatternRule::new(folder_path, &globs).map(Self::Pattern)
            }
            RetentionRuleInput::Folder { folder_path } => {
                FolderRule::new(folder_path).map(Self::Folder)
            }
            RetentionRuleInput::DatedLog {
                folder_path,
                date_regex,
                date_format,
                max_age_days,
            } => DatedLogRule::new(folder_path, date_regex.as_str(), date_format, max_age_days)
                .map(Self::DatedLog),
        }
    }

    /// Returns stable rule type value.
    #[must_use]
    pub fn rule_type(&self) -> &'static str {
        match self {
            Self::Pattern(_) => "pattern",
            Self::Folder(_) => "folder",
            Self::DatedLog(_) => "dated_log",
        }
    }

    /// Returns the folder whose listing the rule applies to.
    #[must_use]
    pub fn folder_path(&self) -> &str {
        match self {
            Self::Pattern(rule) => rule.folder_path(),
            Self::Folder(rule) => rule.folder_path(),
            Self::DatedLog(rule) => rule.folder_path(),
        }
    }

    /// Decides what should happen to a listed entry.
    #[must_use]
    pub fn evaluate(&self, entry: &FileEntry, today: NaiveDate) -> RetentionDecision {
        match self {
            Self::Pattern(rule) => {
                if matches_any_glob(entry.path(), rule.globs()) {
                    RetentionDecision::Delete
                } else {
                    RetentionDecision::Retain
                }
            }
            Self::Folder(_) => RetentionDecision::Delete,
            Self::DatedLog(rule) => rule.evaluate(entry, today),
        }
    }
}

/// Outcome of evaluating one entry against one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetentionDecision {
    /// The entry should be removed.
    Delete,
    /// The entry is kept.
    Retain,
    /// The entry is kept because no date could be read from its path.
    UnparseableDate {
        /// Human-readable parse failure.
        reason: String,
    },
}

impl RetentionDecision {
    /// Returns whether the entry is marked for deletion.
    #[must_use]
    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete)
    }
}

/// Returns whether the rule marks the entry for deletion.
#[must_use]
pub fn should_delete(entry: &FileEntry, rule: &RetentionRule, today: NaiveDate) -> bool {
    rule.evaluate(entry, today).is_delete()
}

/// Returns whether the path matches at least one glob.
#[must_use]
pub fn matches_any_glob(path: &str, globs: &[Pattern]) -> bool {
    globs
        .iter()
        .any(|glob| glob.matches_with(path, GLOB_MATCH_OPTIONS))
}

/// Extracts the first date matching `date_regex` from `path` and parses it.
#[must_use]
pub fn parse_embedded_date(path: &str, date_regex: &Regex, date_format: &str) -> Option<NaiveDate> {
    let matched = date_regex.find(path)?;
    NaiveDate::parse_from_str(matched.as_str(), date_format).ok()
}

fn normalize_folder_path(folder_path: String) -> String {
    folder_path.trim().trim_end_matches('/').to_owned()
}
