pub use super::episode_watch_status::Entity as EpisodeWatchStatus;
pub use super::episodes::Entity as Episodes;
pub use super::profiles::Entity as Profiles;
pub use super::season_watch_status::Entity as SeasonWatchStatus;
pub use super::seasons::Entity as Seasons;
pub use super::show_watch_status::Entity as ShowWatchStatus;
pub use super::shows::Entity as Shows;
