use anyhow::{Context, Result};
use tracing::info;

use crate::core::state::AppState;
use crate::wal::wal::WalOperation;

// this runs at boot time, before any listener is bound
pub fn apply_wal_operations(state: &AppState, operations: &[WalOperation]) {
    for op in operations {
        match op {
            WalOperation::PutUser { user } => state.users.restore(user.clone()),
            WalOperation::PutHotel { hotel } => state.hotels.restore(hotel.clone()),
        }
    }
}

/// Rewrite the log so it holds exactly one record per live user and hotel
pub fn compact_wal(state: &AppState) -> Result<usize> {
    let users = state.users.snapshot();
    let hotels = state.hotels.snapshot();

    let operations: Vec<WalOperation> = users
        .into_iter()
        .map(|user| WalOperation::PutUser { user })
        .chain(hotels.into_iter().map(|hotel| WalOperation::PutHotel { hotel }))
        .collect();

    state.wal.compact(&operations).context("Failed to compact WAL")?;
    Ok(operations.len())
}

/// Replay the log into the stores, then compact it
pub fn restore_from_wal(state: &AppState) -> Result<()> {
    let operations = state.wal.replay().context("Failed to replay WAL")?;
    apply_wal_operations(state, &operations);

    let live_records = compact_wal(state)?;

    info!(
        operations_replayed = operations.len(),
        live_records,
        users_loaded = state.users.len(),
        hotels_loaded = state.hotels.len(),
        "WAL replay completed"
    );
    Ok(())
}
