//! Domain types for watch tracking with strong typing.
//!
//! This module provides type-safe wrappers and domain primitives for the
//! watch-status subsystem. It follows the Newtype pattern to prevent ID
//! mixing between the content hierarchy levels.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Watch status of an episode, season or show for one profile.
///
/// Stored as TEXT in the per-profile status tables and recomputed bottom-up
/// by the propagation engine; see [`crate::status::calculator`] for the
/// derivation rules.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WatchStatus {
    /// Release date missing or in the future, or no children have aired.
    #[sea_orm(string_value = "UNAIRED")]
    Unaired,
    /// Aired with zero progress.
    #[sea_orm(string_value = "NOT_WATCHED")]
    NotWatched,
    /// Partial progress.
    #[sea_orm(string_value = "WATCHING")]
    Watching,
    /// Everything aired so far is consumed but more content is expected.
    #[sea_orm(string_value = "UP_TO_DATE")]
    UpToDate,
    /// Everything is consumed and nothing more is expected.
    #[sea_orm(string_value = "WATCHED")]
    Watched,
}

impl WatchStatus {
    /// Canonical string form, matching the persisted column value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unaired => "UNAIRED",
            Self::NotWatched => "NOT_WATCHED",
            Self::Watching => "WATCHING",
            Self::UpToDate => "UP_TO_DATE",
            Self::Watched => "WATCHED",
        }
    }
}

impl fmt::Display for WatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WatchStatus {
    type Err = String;

    /// Accepts the canonical form as well as lowercase/dashed spellings,
    /// e.g. `not-watched` or `up_to_date`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "UNAIRED" => Ok(Self::Unaired),
            "NOT_WATCHED" => Ok(Self::NotWatched),
            "WATCHING" => Ok(Self::Watching),
            "UP_TO_DATE" => Ok(Self::UpToDate),
            "WATCHED" => Ok(Self::Watched),
            other => Err(format!("unknown watch status: {other}")),
        }
    }
}

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Default,
            Serialize,
            Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Creates a new id from a raw i32 value.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                debug_assert!(id >= 0, "ids should be non-negative");
                Self(id)
            }

            /// Returns the underlying i32 value.
            #[must_use]
            pub const fn value(&self) -> i32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self::new(id)
            }
        }
    };
}

entity_id! {
    /// Unique identifier of a viewing profile.
    ///
    /// Profiles own the per-entity status rows; deleting a profile cascades
    /// through them at the store level.
    ProfileId
}

entity_id! {
    /// Unique identifier of a show.
    ShowId
}

entity_id! {
    /// Unique identifier of a season within a show.
    SeasonId
}

entity_id! {
    /// Unique identifier of an episode within a season.
    EpisodeId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_conversions() {
        let id = ShowId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(i32::from(id), 42);
        assert_eq!(ShowId::from(42), id);
    }

    #[test]
    fn watch_status_round_trips_through_str() {
        for status in [
            WatchStatus::Unaired,
            WatchStatus::NotWatched,
            WatchStatus::Watching,
            WatchStatus::UpToDate,
            WatchStatus::Watched,
        ] {
            assert_eq!(status.as_str().parse::<WatchStatus>(), Ok(status));
        }
    }

    #[test]
    fn watch_status_accepts_relaxed_spellings() {
        assert_eq!("watched".parse(), Ok(WatchStatus::Watched));
        assert_eq!("not-watched".parse(), Ok(WatchStatus::NotWatched));
        assert_eq!("up_to_date".parse(), Ok(WatchStatus::UpToDate));
        assert!("binged".parse::<WatchStatus>().is_err());
    }

    #[test]
    fn watch_status_serializes_as_screaming_snake() {
        let json = serde_json::to_string(&WatchStatus::UpToDate).unwrap();
        assert_eq!(json, "\"UP_TO_DATE\"");
        let back: WatchStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, WatchStatus::UpToDate);
    }

    #[test]
    fn profile_id_serializes_transparently() {
        let id = ProfileId::new(3);
        assert_eq!(serde_json::to_string(&id).unwrap(), "3");
        let back: ProfileId = serde_json::from_str("3").unwrap();
        assert_eq!(back, id);
    }
}
