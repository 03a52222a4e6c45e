//! Input shapes for catalog ingestion.
//!
//! The hierarchy (shows, seasons, episodes) is produced upstream by a
//! metadata refresher; these types carry its output into the store, either
//! programmatically or via the CLI `import` command's JSON files.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowInput {
    pub id: i32,
    pub title: String,
    pub release_date: Option<String>,
    #[serde(default)]
    pub in_production: bool,
    #[serde(default)]
    pub seasons: Vec<SeasonInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonInput {
    pub id: i32,
    pub season_number: i32,
    #[serde(default)]
    pub title: Option<String>,
    pub release_date: Option<String>,
    #[serde(default)]
    pub episodes: Vec<EpisodeInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeInput {
    pub id: i32,
    pub episode_number: i32,
    #[serde(default)]
    pub title: Option<String>,
    pub air_date: Option<String>,
}
