//! Watch-status derivation and change tracking.
//!
//! Pure logic only: the calculator derives an entity's status from its
//! children and an explicit reference time, and the recorder accumulates the
//! changes one propagation run produces. Neither touches the store.

pub mod calculator;
pub mod recorder;

pub use calculator::{EpisodeSnapshot, SeasonSnapshot, ShowSnapshot, has_aired};
pub use recorder::{ChangeRecorder, PropagationOutcome, StatusChange, WatchEntity};
