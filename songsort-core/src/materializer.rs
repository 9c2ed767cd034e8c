//! Rank materializer
//!
//! Writes a finished best-first order into the rank field of each song. This
//! is the only code path that assigns ranks. The whole order is validated
//! before the first write, so either every song receives its rank or none do.

use crate::error::{Error, Result};
use crate::song::{Rank, SongId};
use crate::song_list::SongList;
use std::collections::HashSet;
use tracing::debug;

/// Assign rank = position + 1 to every song in `order`
///
/// Fails without writing anything when `order` repeats a song or names one
/// that is absent from `list`. Returns the number of songs ranked.
pub fn materialize(order: &[SongId], list: &mut SongList) -> Result<usize> {
    let mut seen = HashSet::with_capacity(order.len());
    for &id in order {
        if !seen.insert(id) {
            return Err(Error::InvalidState(format!(
                "{} appears more than once in the final order",
                id
            )));
        }
        if !list.contains(id) {
            return Err(Error::SongNotFound(id));
        }
    }

    for (index, &id) in order.iter().enumerate() {
        list.require_mut(id)?.set_rank(Rank::from_position(index));
    }

    debug!(songs = order.len(), "Ranks materialized");
    Ok(order.len())
}
