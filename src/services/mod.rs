pub mod watch_status_service;
pub mod watch_status_service_impl;

pub use watch_status_service::{WatchStatusError, WatchStatusService};
pub use watch_status_service_impl::SeaOrmWatchStatusService;
