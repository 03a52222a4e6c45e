//! Change accounting for one propagation run.

use crate::domain::WatchStatus;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Hierarchy level a status change applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchEntity {
    Episode,
    Season,
    Show,
}

impl fmt::Display for WatchEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Episode => "episode",
            Self::Season => "season",
            Self::Show => "show",
        };
        f.write_str(name)
    }
}

/// One recorded status move. Not persisted; handed back to the caller so it
/// can drive notifications or cache invalidation.
#[derive(Debug, Clone, Serialize)]
pub struct StatusChange {
    pub entity: WatchEntity,
    pub entity_id: i32,
    pub from: WatchStatus,
    pub to: WatchStatus,
    pub reason: String,
    pub changed_at: DateTime<Utc>,
}

/// Aggregate result of one propagation run.
///
/// `affected_rows` counts status rows actually written; `changes` lists the
/// status values that moved. A repeated call with no new data yields zero of
/// both.
#[derive(Debug, Default, Serialize)]
pub struct PropagationOutcome {
    pub changes: Vec<StatusChange>,
    pub affected_rows: u64,
}

impl PropagationOutcome {
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty() && self.affected_rows == 0
    }
}

/// Accumulates the change list for a single run. One instance per run, no
/// cross-call state.
#[derive(Debug)]
pub struct ChangeRecorder {
    now: DateTime<Utc>,
    changes: Vec<StatusChange>,
}

impl ChangeRecorder {
    #[must_use]
    pub const fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            changes: Vec::new(),
        }
    }

    /// Appends a change tuple when `from != to`; no-op moves are dropped.
    /// Returns whether the change was recorded.
    pub fn record(
        &mut self,
        entity: WatchEntity,
        entity_id: i32,
        from: WatchStatus,
        to: WatchStatus,
        reason: &str,
    ) -> bool {
        if from == to {
            return false;
        }
        self.changes.push(StatusChange {
            entity,
            entity_id,
            from,
            to,
            reason: reason.to_string(),
            changed_at: self.now,
        });
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Consumes the recorder, yielding the finished change list.
    #[must_use]
    pub fn into_changes(self) -> Vec<StatusChange> {
        self.changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_only_real_moves() {
        let now = Utc::now();
        let mut recorder = ChangeRecorder::new(now);

        assert!(recorder.record(
            WatchEntity::Episode,
            5,
            WatchStatus::NotWatched,
            WatchStatus::Watched,
            "marked watched",
        ));
        assert!(!recorder.record(
            WatchEntity::Season,
            2,
            WatchStatus::Watching,
            WatchStatus::Watching,
            "recomputed",
        ));

        let changes = recorder.into_changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].entity, WatchEntity::Episode);
        assert_eq!(changes[0].entity_id, 5);
        assert_eq!(changes[0].changed_at, now);
    }

    #[test]
    fn outcome_noop_detection() {
        let outcome = PropagationOutcome::default();
        assert!(outcome.is_noop());

        let outcome = PropagationOutcome {
            changes: Vec::new(),
            affected_rows: 3,
        };
        assert!(!outcome.is_noop());
    }
}
