use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate, TimeZone};

use hostkeeper_core::AppError;
use hostkeeper_domain::{RetentionRule, RetentionRuleInput, default_retention_rules};

use crate::{CleanupService, calendar_day};
use crate::fake_hosting_api::{FakeHostingApi, HostingCall, server_ids};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 10).unwrap_or_else(|| unreachable!())
}

fn default_rules() -> Vec<RetentionRule> {
    default_retention_rules(7)
        .into_iter()
        .map(RetentionRule::new)
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_else(|_| unreachable!())
}

fn service(api: &Arc<FakeHostingApi>) -> CleanupService {
    CleanupService::new(api.clone(), default_rules())
}

#[tokio::test]
async fn deletes_only_matching_root_files_per_server() {
    let api = Arc::new(
        FakeHostingApi::new()
            .with_listing("A", "", &["matchzy_1_2_round3.txt", "notes.txt"])
            .with_listing("B", "", &[]),
    );

    let report = service(&api).run_on(&server_ids(&["A", "B"]), today()).await;
    assert!(report.is_ok());
    let report = report.unwrap_or_default();

    assert_eq!(api.deleted_paths("A").await, vec!["matchzy_1_2_round3.txt"]);
    assert!(api.deleted_paths("B").await.is_empty());
    assert_eq!(report.servers.len(), 2);
    assert_eq!(report.servers[0].server_id.as_str(), "A");
    assert_eq!(report.servers[0].listed_entries, 2);
    assert_eq!(report.servers[0].deleted_entries, 1);
    assert_eq!(report.servers[1].deleted_entries, 0);
    assert_eq!(report.deleted_entries(), 1);
}

#[tokio::test]
async fn authentication_failure_touches_no_server() {
    let api = Arc::new(
        FakeHostingApi::new()
            .rejecting_credentials()
            .with_listing("A", "", &["matchzy_1_2_round3.txt"]),
    );

    let result = service(&api).run_on(&server_ids(&["A", "B"]), today()).await;

    assert!(matches!(result, Err(AppError::Unauthorized(_))));
    assert_eq!(api.calls().await, vec![HostingCall::VerifyCredentials]);
}

#[tokio::test]
async fn rules_run_in_configured_order() {
    let api = Arc::new(FakeHostingApi::new());

    let result = service(&api).run_on(&server_ids(&["A"]), today()).await;
    assert!(result.is_ok());

    let listed_folders: Vec<String> = api
        .calls()
        .await
        .into_iter()
        .filter_map(|call| match call {
            HostingCall::List { folder_path, .. } => Some(folder_path),
            _ => None,
        })
        .collect();
    assert_eq!(
        listed_folders,
        vec![
            "",
            "MatchZy",
            "MatchZyDataBackup",
            "MatchZy_Stats",
            "/addons/counterstrikesharp/logs",
            "/logs",
        ]
    );
}

#[tokio::test]
async fn folder_rule_wipes_every_listed_entry() {
    let api = Arc::new(FakeHostingApi::new().with_listing(
        "A",
        "MatchZy",
        &["stats_1.json", "20991231.log", "nested"],
    ));

    let report = service(&api).cleanup_server(&server_ids(&["A"])[0], today()).await;

    assert_eq!(
        api.deleted_paths("A").await,
        vec![
            "MatchZy/stats_1.json",
            "MatchZy/20991231.log",
            "MatchZy/nested",
        ]
    );
    assert_eq!(report.deleted_entries, 3);
}

#[tokio::test]
async fn dated_logs_respect_the_retention_boundary() {
    let api = Arc::new(
        FakeHostingApi::new()
            .with_listing(
                "A",
                "/addons/counterstrikesharp/logs",
                &["log-20240102.txt", "log-20240103.txt", "log-20240110.txt"],
            )
            .with_listing("A", "/logs", &["L2023_12_31_000.log", "L2024_01_09_000.log"]),
    );

    let report = service(&api).cleanup_server(&server_ids(&["A"])[0], today()).await;

    assert_eq!(
        api.deleted_paths("A").await,
        vec![
            "/addons/counterstrikesharp/logs/log-20240102.txt",
            "/logs/L2023_12_31_000.log",
        ]
    );
    assert_eq!(report.deleted_entries, 2);
    assert_eq!(report.unparseable_entries, 0);
}

#[test]
fn calendar_day_follows_the_local_wall_clock() {
    let new_york = FixedOffset::west_opt(5 * 3600).unwrap_or_else(|| unreachable!());
    let evening = new_york
        .with_ymd_and_hms(2024, 1, 9, 21, 0, 0)
        .single()
        .unwrap_or_else(|| unreachable!());

    assert_eq!(
        calendar_day(&evening),
        NaiveDate::from_ymd_opt(2024, 1, 9).unwrap_or_else(|| unreachable!())
    );
    assert_eq!(
        calendar_day(&evening.to_utc()),
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap_or_else(|| unreachable!())
    );
}

#[tokio::test]
async fn late_evening_west_of_utc_keeps_the_cutoff_day() {
    let api = Arc::new(FakeHostingApi::new().with_listing(
        "A",
        "/addons/counterstrikesharp/logs",
        &["20240101.txt", "20240102.txt"],
    ));
    let new_york = FixedOffset::west_opt(5 * 3600).unwrap_or_else(|| unreachable!());
    let evening = new_york
        .with_ymd_and_hms(2024, 1, 9, 21, 0, 0)
        .single()
        .unwrap_or_else(|| unreachable!());

    let report = service(&api)
        .cleanup_server(&server_ids(&["A"])[0], calendar_day(&evening))
        .await;

    assert_eq!(
        api.deleted_paths("A").await,
        vec!["/addons/counterstrikesharp/logs/20240101.txt"]
    );
    assert_eq!(report.deleted_entries, 1);
}

#[tokio::test]
async fn unparseable_dates_are_retained_and_counted() {
    let api = Arc::new(FakeHostingApi::new().with_listing(
        "A",
        "/addons/counterstrikesharp/logs",
        &["abc.txt", "log-20231201.txt"],
    ));

    let report = service(&api).cleanup_server(&server_ids(&["A"])[0], today()).await;

    assert_eq!(
        api.deleted_paths("A").await,
        vec!["/addons/counterstrikesharp/logs/log-20231201.txt"]
    );
    assert_eq!(report.unparseable_entries, 1);
}

#[tokio::test]
async fn failed_listing_does_not_block_other_folders_or_servers() {
    let api = Arc::new(
        FakeHostingApi::new()
            .with_failing_listing("A", "")
            .with_listing("A", "MatchZy_Stats", &["match_12.csv"])
            .with_listing("B", "", &["backup_round02.txt"]),
    );

    let report = service(&api).run_on(&server_ids(&["A", "B"]), today()).await;
    assert!(report.is_ok());
    let report = report.unwrap_or_default();

    assert_eq!(api.deleted_paths("A").await, vec!["MatchZy_Stats/match_12.csv"]);
    assert_eq!(api.deleted_paths("B").await, vec!["backup_round02.txt"]);
    assert_eq!(report.servers[0].failed_listings, 1);
    assert_eq!(report.servers[1].failed_listings, 0);
}

#[tokio::test]
async fn failed_delete_continues_with_next_entry() {
    let api = Arc::new(
        FakeHostingApi::new()
            .with_listing(
                "A",
                "",
                &["backup_round01.txt", "backup_round02.txt"],
            )
            .with_failing_delete("backup_round01.txt"),
    );

    let report = service(&api).run_on(&server_ids(&["A"]), today()).await;
    assert!(report.is_ok());
    let report = report.unwrap_or_default();

    assert_eq!(
        api.deleted_paths("A").await,
        vec!["backup_round01.txt", "backup_round02.txt"]
    );
    assert_eq!(report.servers[0].deleted_entries, 1);
    assert_eq!(report.servers[0].failed_deletions, 1);
    assert_eq!(report.failed_deletions(), 1);
}

#[tokio::test]
async fn synthetic_rules_replace_the_defaults() {
    let rule = RetentionRule::new(RetentionRuleInput::Pattern {
        folder_path: "demos".to_owned(),
        globs: vec!["*.dem".to_owned()],
    })
    .unwrap_or_else(|_| unreachable!());
    let api = Arc::new(FakeHostingApi::new().with_listing(
        "A",
        "demos",
        &["final.dem", "final.json"],
    ));

    let report = CleanupService::new(api.clone(), vec![rule])
        .run_on(&server_ids(&["A"]), today())
        .await;
    assert!(report.is_ok());

    assert_eq!(api.deleted_paths("A").await, vec!["demos/final.dem"]);
}
