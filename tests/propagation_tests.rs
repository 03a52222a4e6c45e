//! End-to-end tests for the watch-status propagation engine against a real
//! SQLite store.

use chrono::{Duration, Utc};
use trackarr::db::Store;
use trackarr::domain::{EpisodeId, ProfileId, SeasonId, ShowId, WatchStatus};
use trackarr::models::catalog::{EpisodeInput, SeasonInput, ShowInput};
use trackarr::services::{SeaOrmWatchStatusService, WatchStatusError, WatchStatusService};
use trackarr::status::calculator;
use trackarr::status::{EpisodeSnapshot, SeasonSnapshot, ShowSnapshot, WatchEntity};

use std::sync::Arc;

async fn spawn_store() -> Store {
    let db_path =
        std::env::temp_dir().join(format!("trackarr-test-{}.db", uuid::Uuid::new_v4()));

    Store::new(&format!("sqlite:{}", db_path.display()))
        .await
        .expect("failed to open store")
}

fn days_ago(n: i64) -> String {
    (Utc::now() - Duration::days(n)).to_rfc3339()
}

fn days_ahead(n: i64) -> String {
    (Utc::now() + Duration::days(n)).to_rfc3339()
}

fn episode(id: i32, number: i32, air_date: Option<String>) -> EpisodeInput {
    EpisodeInput {
        id,
        episode_number: number,
        title: Some(format!("Episode {number}")),
        air_date,
    }
}

fn season(id: i32, number: i32, release: Option<String>, episodes: Vec<EpisodeInput>) -> SeasonInput {
    SeasonInput {
        id,
        season_number: number,
        title: None,
        release_date: release,
        episodes,
    }
}

fn show(id: i32, in_production: bool, seasons: Vec<SeasonInput>) -> ShowInput {
    ShowInput {
        id,
        title: format!("Test Show {id}"),
        release_date: Some(days_ago(400)),
        in_production,
        seasons,
    }
}

/// One season of three episodes that all aired in the past.
fn finished_show(id: i32, in_production: bool) -> ShowInput {
    show(
        id,
        in_production,
        vec![season(
            id * 10,
            1,
            Some(days_ago(30)),
            vec![
                episode(id * 100 + 1, 1, Some(days_ago(30))),
                episode(id * 100 + 2, 2, Some(days_ago(23))),
                episode(id * 100 + 3, 3, Some(days_ago(16))),
            ],
        )],
    )
}

async fn setup(input: &ShowInput) -> (Arc<Store>, SeaOrmWatchStatusService, ProfileId) {
    let store = Arc::new(spawn_store().await);
    store.add_show(input).await.expect("seed show");
    let profile = store.create_profile("primary").await.expect("profile");
    let service = SeaOrmWatchStatusService::new(store.clone());
    (store, service, ProfileId::new(profile.id))
}

async fn episode_status(
    store: &Store,
    profile: ProfileId,
    show_id: i32,
    episode_id: i32,
) -> Option<WatchStatus> {
    store
        .episode_watch_rows(profile.value(), show_id)
        .await
        .expect("episode rows")
        .into_iter()
        .find(|row| row.episode_id == episode_id)
        .and_then(|row| row.status)
}

async fn season_status(
    store: &Store,
    profile: ProfileId,
    show_id: i32,
    season_id: i32,
) -> Option<WatchStatus> {
    store
        .season_watch_rows(profile.value(), show_id)
        .await
        .expect("season rows")
        .into_iter()
        .find(|row| row.season_id == season_id)
        .and_then(|row| row.status)
}

async fn show_status(store: &Store, profile: ProfileId, show_id: i32) -> Option<WatchStatus> {
    store
        .show_watch_context(profile.value(), show_id)
        .await
        .expect("show context")
        .and_then(|ctx| ctx.show_status)
}

/// Recomputes every stored season and show status from the raw rows and
/// asserts the stored values match: the upward-consistency invariant.
async fn assert_hierarchy_consistent(store: &Store, profile: ProfileId, show_id: i32) {
    let now = Utc::now();
    let seasons = store
        .season_watch_rows(profile.value(), show_id)
        .await
        .expect("season rows");
    let episodes = store
        .episode_watch_rows(profile.value(), show_id)
        .await
        .expect("episode rows");
    let ctx = store
        .show_watch_context(profile.value(), show_id)
        .await
        .expect("show context")
        .expect("show exists");

    let snapshots: Vec<SeasonSnapshot> = seasons
        .iter()
        .map(|season| SeasonSnapshot {
            season_id: season.season_id,
            release_date: season.release_date.clone(),
            status: season.status,
            episodes: episodes
                .iter()
                .filter(|ep| ep.season_id == season.season_id)
                .map(|ep| EpisodeSnapshot {
                    episode_id: ep.episode_id,
                    air_date: ep.air_date.clone(),
                    status: calculator::effective_episode_status(
                        ep.status,
                        ep.air_date.as_deref(),
                        now,
                    ),
                })
                .collect(),
        })
        .collect();

    for (season, snapshot) in seasons.iter().zip(&snapshots) {
        if let Some(stored) = season.status {
            assert_eq!(
                stored,
                calculator::season_status(snapshot, now),
                "season {} status drifted from its episodes",
                season.season_id
            );
        }
    }

    if let Some(stored) = ctx.show_status {
        let snapshot = ShowSnapshot {
            release_date: ctx.release_date.clone(),
            in_production: ctx.in_production,
            seasons: snapshots,
        };
        assert_eq!(
            stored,
            calculator::show_status(&snapshot, now),
            "show {show_id} status drifted from its seasons"
        );
    }
}

#[tokio::test]
async fn finishing_a_season_marks_season_and_show_watched() {
    let input = finished_show(1, false);
    let (store, service, profile) = setup(&input).await;

    for episode_id in [101, 102] {
        service
            .update_episode_status(profile, EpisodeId::new(episode_id), WatchStatus::Watched)
            .await
            .expect("update episode");
    }

    let outcome = service
        .update_episode_status(profile, EpisodeId::new(103), WatchStatus::Watched)
        .await
        .expect("update last episode");

    assert_eq!(season_status(&store, profile, 1, 10).await, Some(WatchStatus::Watched));
    assert_eq!(show_status(&store, profile, 1).await, Some(WatchStatus::Watched));

    let season_change = outcome
        .changes
        .iter()
        .find(|c| c.entity == WatchEntity::Season)
        .expect("season change recorded");
    assert_eq!(season_change.from, WatchStatus::Watching);
    assert_eq!(season_change.to, WatchStatus::Watched);

    assert_hierarchy_consistent(&store, profile, 1).await;
}

#[tokio::test]
async fn show_in_production_reports_up_to_date_not_watched() {
    let input = finished_show(2, true);
    let (store, service, profile) = setup(&input).await;

    service
        .update_season_status(profile, SeasonId::new(20), WatchStatus::Watched)
        .await
        .expect("update season");

    // The season itself is finished, but the show expects more content.
    assert_eq!(season_status(&store, profile, 2, 20).await, Some(WatchStatus::Watched));
    assert_eq!(show_status(&store, profile, 2).await, Some(WatchStatus::UpToDate));

    assert_hierarchy_consistent(&store, profile, 2).await;
}

#[tokio::test]
async fn bulk_season_update_skips_unaired_episodes() {
    let input = show(
        3,
        true,
        vec![season(
            30,
            1,
            Some(days_ago(30)),
            vec![
                episode(301, 1, Some(days_ago(30))),
                episode(302, 2, Some(days_ago(23))),
                episode(303, 3, Some(days_ago(16))),
                episode(304, 4, Some(days_ago(9))),
                episode(305, 5, Some(days_ahead(1))),
            ],
        )],
    );
    let (store, service, profile) = setup(&input).await;

    let outcome = service
        .update_season_status(profile, SeasonId::new(30), WatchStatus::Watched)
        .await
        .expect("update season");

    for episode_id in [301, 302, 303, 304] {
        assert_eq!(
            episode_status(&store, profile, 3, episode_id).await,
            Some(WatchStatus::Watched)
        );
    }
    assert_eq!(
        episode_status(&store, profile, 3, 305).await,
        Some(WatchStatus::Unaired)
    );

    // Four episodes moved; the fifth was materialized as Unaired without a
    // change entry.
    let episode_changes = outcome
        .changes
        .iter()
        .filter(|c| c.entity == WatchEntity::Episode)
        .count();
    assert_eq!(episode_changes, 4);

    // Everything aired is watched and one episode is still pending, so the
    // season is caught up rather than finished.
    assert_eq!(
        season_status(&store, profile, 3, 30).await,
        Some(WatchStatus::UpToDate)
    );
    assert_ne!(
        season_status(&store, profile, 3, 30).await,
        Some(WatchStatus::Watched)
    );

    assert_hierarchy_consistent(&store, profile, 3).await;
}

#[tokio::test]
async fn reconcile_promotes_episodes_that_aired_while_pending() {
    let mut input = show(
        4,
        true,
        vec![season(
            40,
            1,
            Some(days_ago(30)),
            vec![
                episode(401, 1, Some(days_ago(30))),
                episode(402, 2, Some(days_ahead(3))),
            ],
        )],
    );
    let (store, service, profile) = setup(&input).await;

    // Touch the future episode so a row stored as Unaired exists, then let
    // the catalog move its air date into the past.
    service
        .update_episode_status(profile, EpisodeId::new(402), WatchStatus::Watched)
        .await
        .expect("touch future episode");
    assert_eq!(
        episode_status(&store, profile, 4, 402).await,
        Some(WatchStatus::Unaired)
    );

    input.seasons[0].episodes[1].air_date = Some(days_ago(1));
    store.add_show(&input).await.expect("refresh catalog");

    let outcome = service
        .check_and_update_show_status(profile, ShowId::new(4))
        .await
        .expect("reconcile");

    assert_eq!(
        episode_status(&store, profile, 4, 402).await,
        Some(WatchStatus::NotWatched)
    );
    let change = outcome
        .changes
        .iter()
        .find(|c| c.entity == WatchEntity::Episode && c.entity_id == 402)
        .expect("promotion recorded");
    assert_eq!(change.from, WatchStatus::Unaired);
    assert_eq!(change.to, WatchStatus::NotWatched);
    assert_eq!(change.reason, "content updates detected");

    assert_hierarchy_consistent(&store, profile, 4).await;
}

#[tokio::test]
async fn repeated_calls_are_idempotent() {
    let input = finished_show(5, false);
    let (_store, service, profile) = setup(&input).await;

    let first = service
        .update_show_status(profile, ShowId::new(5), WatchStatus::Watched)
        .await
        .expect("first update");
    assert!(first.affected_rows > 0);
    assert!(!first.changes.is_empty());

    let second = service
        .update_show_status(profile, ShowId::new(5), WatchStatus::Watched)
        .await
        .expect("second update");
    assert!(second.is_noop(), "second identical call must write nothing");

    let reconcile = service
        .check_and_update_show_status(profile, ShowId::new(5))
        .await
        .expect("reconcile after update");
    assert!(reconcile.is_noop());
}

#[tokio::test]
async fn future_episodes_stay_unaired_regardless_of_target() {
    let input = show(
        6,
        true,
        vec![season(
            60,
            1,
            Some(days_ago(10)),
            vec![
                episode(601, 1, Some(days_ago(10))),
                episode(602, 2, None),
                episode(603, 3, Some(days_ahead(7))),
            ],
        )],
    );
    let (store, service, profile) = setup(&input).await;

    for episode_id in [602, 603] {
        let outcome = service
            .update_episode_status(profile, EpisodeId::new(episode_id), WatchStatus::Watched)
            .await
            .expect("update unaired episode");
        assert_eq!(
            episode_status(&store, profile, 6, episode_id).await,
            Some(WatchStatus::Unaired)
        );
        assert!(
            outcome.changes.iter().all(|c| c.entity_id != episode_id),
            "no status move should be recorded for an unaired episode"
        );
    }

    assert_hierarchy_consistent(&store, profile, 6).await;
}

#[tokio::test]
async fn mixed_season_progress_surfaces_as_watching_show() {
    let input = show(
        7,
        false,
        vec![
            season(
                70,
                1,
                Some(days_ago(60)),
                vec![
                    episode(701, 1, Some(days_ago(60))),
                    episode(702, 2, Some(days_ago(53))),
                ],
            ),
            season(
                71,
                2,
                Some(days_ago(30)),
                vec![
                    episode(711, 1, Some(days_ago(30))),
                    episode(712, 2, Some(days_ago(23))),
                ],
            ),
        ],
    );
    let (store, service, profile) = setup(&input).await;

    service
        .update_season_status(profile, SeasonId::new(70), WatchStatus::Watched)
        .await
        .expect("finish first season");

    // Season one Watched, season two untouched: no season is Watching, yet
    // series progress is partial.
    assert_eq!(season_status(&store, profile, 7, 70).await, Some(WatchStatus::Watched));
    assert_eq!(season_status(&store, profile, 7, 71).await, None);
    assert_eq!(show_status(&store, profile, 7).await, Some(WatchStatus::Watching));

    assert_hierarchy_consistent(&store, profile, 7).await;
}

#[tokio::test]
async fn bulk_show_update_covers_every_season() {
    let input = show(
        8,
        true,
        vec![
            season(
                80,
                1,
                Some(days_ago(60)),
                vec![
                    episode(801, 1, Some(days_ago(60))),
                    episode(802, 2, Some(days_ago(53))),
                ],
            ),
            season(
                81,
                2,
                Some(days_ago(30)),
                vec![
                    episode(811, 1, Some(days_ago(30))),
                    episode(812, 2, Some(days_ahead(4))),
                ],
            ),
        ],
    );
    let (store, service, profile) = setup(&input).await;

    service
        .update_show_status(profile, ShowId::new(8), WatchStatus::Watched)
        .await
        .expect("update show");

    assert_eq!(season_status(&store, profile, 8, 80).await, Some(WatchStatus::Watched));
    assert_eq!(season_status(&store, profile, 8, 81).await, Some(WatchStatus::UpToDate));
    assert_eq!(
        episode_status(&store, profile, 8, 812).await,
        Some(WatchStatus::Unaired)
    );
    // The show is still producing content, so it is caught up, not finished.
    assert_eq!(show_status(&store, profile, 8).await, Some(WatchStatus::UpToDate));

    assert_hierarchy_consistent(&store, profile, 8).await;
}

#[tokio::test]
async fn unknown_entities_surface_not_found() {
    let input = finished_show(9, false);
    let (_store, service, profile) = setup(&input).await;

    let err = service
        .update_episode_status(profile, EpisodeId::new(999_999), WatchStatus::Watched)
        .await
        .expect_err("missing episode");
    assert!(matches!(err, WatchStatusError::EpisodeNotFound(_)));

    let err = service
        .update_season_status(profile, SeasonId::new(999_999), WatchStatus::Watched)
        .await
        .expect_err("missing season");
    assert!(matches!(err, WatchStatusError::SeasonNotFound(_)));

    let err = service
        .check_and_update_show_status(profile, ShowId::new(999_999))
        .await
        .expect_err("missing show");
    assert!(matches!(err, WatchStatusError::ShowNotFound(_)));
}

#[tokio::test]
async fn marking_an_episode_resets_aged_siblings() {
    let mut input = show(
        10,
        true,
        vec![season(
            100,
            1,
            Some(days_ago(30)),
            vec![
                episode(1001, 1, Some(days_ago(30))),
                episode(1002, 2, Some(days_ahead(2))),
            ],
        )],
    );
    let (store, service, profile) = setup(&input).await;

    // Materialize episode 2 as Unaired, then age it past its air date.
    service
        .update_episode_status(profile, EpisodeId::new(1002), WatchStatus::Watched)
        .await
        .expect("touch future episode");
    input.seasons[0].episodes[1].air_date = Some(days_ago(1));
    store.add_show(&input).await.expect("refresh catalog");

    // A plain user action on a sibling closes the gap without a reconcile.
    service
        .update_episode_status(profile, EpisodeId::new(1001), WatchStatus::Watched)
        .await
        .expect("watch first episode");

    assert_eq!(
        episode_status(&store, profile, 10, 1002).await,
        Some(WatchStatus::NotWatched)
    );
    assert_eq!(
        season_status(&store, profile, 10, 100).await,
        Some(WatchStatus::Watching)
    );

    assert_hierarchy_consistent(&store, profile, 10).await;
}

#[tokio::test]
async fn unwatching_an_episode_walks_the_hierarchy_back() {
    let input = finished_show(11, false);
    let (store, service, profile) = setup(&input).await;

    service
        .update_show_status(profile, ShowId::new(11), WatchStatus::Watched)
        .await
        .expect("watch everything");
    assert_eq!(show_status(&store, profile, 11).await, Some(WatchStatus::Watched));

    let outcome = service
        .update_episode_status(profile, EpisodeId::new(1102), WatchStatus::NotWatched)
        .await
        .expect("unwatch one episode");

    assert_eq!(
        season_status(&store, profile, 11, 110).await,
        Some(WatchStatus::Watching)
    );
    assert_eq!(show_status(&store, profile, 11).await, Some(WatchStatus::Watching));
    assert_eq!(outcome.changes.len(), 3);

    assert_hierarchy_consistent(&store, profile, 11).await;
}
