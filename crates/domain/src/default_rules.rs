use crate::RetentionRuleInput;

/// Retention window applied to dated logs when none is configured.
pub const DEFAULT_LOG_RETENTION_DAYS: u32 = 7;

const ROOT_ROUND_BACKUP_GLOBS: [&str; 2] = ["matchzy_*_*_round*.txt", "backup_round*.txt"];

const WIPED_FOLDERS: [&str; 3] = ["MatchZy", "MatchZyDataBackup", "MatchZy_Stats"];

const DATED_LOG_FOLDERS: [(&str, &str, &str); 2] = [
    ("/addons/counterstrikesharp/logs", r"\d{8}", "%Y%m%d"),
    ("/logs", r"\d{4}_\d{2}_\d{2}", "%Y_%m_%d"),
];

/// Returns the MatchZy / CounterStrikeSharp rule set in evaluation order:
/// root round backups, then plugin data folders, then dated server logs.
#[must_use]
pub fn default_retention_rules(max_age_days: u32) -> Vec<RetentionRuleInput> {
    let mut rules = vec![RetentionRuleInput::Pattern {
        folder_path: String::new(),
        globs: ROOT_ROUND_BACKUP_GLOBS
            .iter()
            .map(|glob| (*glob).to_owned())
            .collect(),
    }];

    rules.extend(
        WIPED_FOLDERS
            .iter()
            .map(|folder_path| RetentionRuleInput::Folder {
                folder_path: (*folder_path).to_owned(),
            }),
    );

    rules.extend(DATED_LOG_FOLDERS.iter().map(
        |(folder_path, date_regex, date_format)| RetentionRuleInput::DatedLog {
            folder_path: (*folder_path).to_owned(),
            date_regex: (*date_regex).to_owned(),
            date_format: (*date_format).to_owned(),
            max_age_days,
        },
    ));

    rules
}
