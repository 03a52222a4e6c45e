pub mod prelude;

pub mod episode_watch_status;
pub mod episodes;
pub mod profiles;
pub mod season_watch_status;
pub mod seasons;
pub mod show_watch_status;
pub mod shows;
