//! Onboarding tour: step progression and tooltip placement.

mod geometry;
mod state;

pub use geometry::*;
pub use state::*;

use tracing::info;

use crate::error::StorageResult;
use crate::storage::SqliteStorage;

/// Preference key recording that the tour was shown once.
pub const TOUR_FLAG_KEY: &str = "tourHasRun";

/// Start `tour` if it has never run on this installation.
///
/// Returns whether the tour was started. The flag is written before the
/// tour is shown, so an interrupted tour does not restart on next launch.
pub async fn start_if_first_run(storage: &SqliteStorage, tour: &mut Tour) -> StorageResult<bool> {
    if storage.get_flag(TOUR_FLAG_KEY).await? {
        return Ok(false);
    }
    storage.set_flag(TOUR_FLAG_KEY, true).await?;
    tour.start();
    info!(steps = tour.len(), "Starting onboarding tour");
    Ok(true)
}
