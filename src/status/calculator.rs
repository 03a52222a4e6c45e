//! Pure status derivation over immutable snapshots.
//!
//! Every function takes the reference time as an explicit parameter and
//! never reads the system clock, so results are reproducible in tests. A
//! missing or unparsable date is always treated as "not yet aired".

use crate::domain::WatchStatus;
use chrono::{DateTime, NaiveDate, Utc};

/// Episode state as seen by the aggregation functions.
#[derive(Debug, Clone)]
pub struct EpisodeSnapshot {
    pub episode_id: i32,
    pub air_date: Option<String>,
    pub status: WatchStatus,
}

impl EpisodeSnapshot {
    #[must_use]
    pub fn aired(&self, now: DateTime<Utc>) -> bool {
        has_aired(self.air_date.as_deref(), now)
    }
}

/// Season state: its own premiere date, the stored status if one exists,
/// and its episodes.
#[derive(Debug, Clone)]
pub struct SeasonSnapshot {
    pub season_id: i32,
    pub release_date: Option<String>,
    pub status: Option<WatchStatus>,
    pub episodes: Vec<EpisodeSnapshot>,
}

impl SeasonSnapshot {
    /// A season counts as aired once at least one of its episodes has aired.
    #[must_use]
    pub fn has_aired_episode(&self, now: DateTime<Utc>) -> bool {
        self.episodes.iter().any(|ep| ep.aired(now))
    }
}

#[derive(Debug, Clone)]
pub struct ShowSnapshot {
    pub release_date: Option<String>,
    pub in_production: bool,
    pub seasons: Vec<SeasonSnapshot>,
}

/// Parses a stored air/release date. Accepts RFC 3339 timestamps and plain
/// `YYYY-MM-DD` dates (read as midnight UTC).
#[must_use]
pub fn parse_air_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

/// True when `raw` parses to a date at or before `now`. Missing and
/// unparsable dates are never aired.
#[must_use]
pub fn has_aired(raw: Option<&str>, now: DateTime<Utc>) -> bool {
    raw.and_then(parse_air_date).is_some_and(|date| date <= now)
}

/// Derives an episode's status from its air date and the profile's watched
/// flag. An episode that has not aired is `Unaired` regardless of the flag.
#[must_use]
pub fn episode_status(air_date: Option<&str>, watched: bool, now: DateTime<Utc>) -> WatchStatus {
    if !has_aired(air_date, now) {
        WatchStatus::Unaired
    } else if watched {
        WatchStatus::Watched
    } else {
        WatchStatus::NotWatched
    }
}

/// Status an episode reads as when no row has been written for it yet:
/// `NotWatched` once aired, `Unaired` before.
#[must_use]
pub fn effective_episode_status(
    stored: Option<WatchStatus>,
    air_date: Option<&str>,
    now: DateTime<Utc>,
) -> WatchStatus {
    stored.unwrap_or_else(|| episode_status(air_date, false, now))
}

/// Derives a season's status from its episodes.
#[must_use]
pub fn season_status(season: &SeasonSnapshot, now: DateTime<Utc>) -> WatchStatus {
    if !has_aired(season.release_date.as_deref(), now) {
        return WatchStatus::Unaired;
    }

    let (aired, unaired): (Vec<_>, Vec<_>) =
        season.episodes.iter().partition(|ep| ep.aired(now));

    if aired.is_empty() {
        return WatchStatus::Unaired;
    }

    let watched = aired
        .iter()
        .filter(|ep| ep.status == WatchStatus::Watched)
        .count();

    if watched == 0 {
        WatchStatus::NotWatched
    } else if watched < aired.len() {
        WatchStatus::Watching
    } else if unaired.is_empty() {
        WatchStatus::Watched
    } else {
        WatchStatus::UpToDate
    }
}

/// Derives a show's status from its seasons.
///
/// Seasons with a stored status keep it; seasons without one are derived
/// from their episodes. Mixed progress across seasons counts as `Watching`
/// even when no single season is itself `Watching`.
#[must_use]
pub fn show_status(show: &ShowSnapshot, now: DateTime<Utc>) -> WatchStatus {
    if !has_aired(show.release_date.as_deref(), now) {
        return WatchStatus::Unaired;
    }

    let (aired, unaired): (Vec<_>, Vec<_>) = show
        .seasons
        .iter()
        .partition(|season| season.has_aired_episode(now));

    if aired.is_empty() {
        return WatchStatus::Unaired;
    }

    let mut watching = 0usize;
    let mut untouched = 0usize;
    let mut complete = 0usize;

    for season in &aired {
        let status = match season.status {
            // A stored Unaired on a season that has aired episodes is drift;
            // fall back to the derived value.
            Some(status) if status != WatchStatus::Unaired => status,
            _ => season_status(season, now),
        };
        match status {
            WatchStatus::Watching => watching += 1,
            WatchStatus::Watched | WatchStatus::UpToDate => complete += 1,
            WatchStatus::NotWatched | WatchStatus::Unaired => untouched += 1,
        }
    }

    if watching > 0 {
        return WatchStatus::Watching;
    }
    if untouched == aired.len() {
        return WatchStatus::NotWatched;
    }
    if complete == aired.len() {
        if show.in_production || !unaired.is_empty() {
            WatchStatus::UpToDate
        } else {
            WatchStatus::Watched
        }
    } else {
        // Some seasons finished, some untouched: series progress is partial.
        WatchStatus::Watching
    }
}
