//! The winner draw: a short roll of random names that settles on a winner.

use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Duration;

use crate::model::eligible;
use crate::store::{ListStore, StoreResult};
use crate::ParticipantList;

/// Names shown before the roll settles.
pub const DRAW_FLASHES: u32 = 20;
/// Delay after the first flash; every later flash waits [`DRAW_SLOWDOWN_MS`] longer.
pub const DRAW_BASE_DELAY_MS: u64 = 100;
pub const DRAW_SLOWDOWN_MS: u64 = 20;

/// One name shown during the roll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub name: String,
    /// How long the name stays up. `None` on the final flash (the winner).
    pub hold: Option<Duration>,
}

impl Flash {
    pub fn is_final(&self) -> bool {
        self.hold.is_none()
    }
}

/// Iterator over the flashes of one roll. The last item is the winner.
pub struct DrawRoll<'a, R: Rng> {
    names: &'a [String],
    shown: u32,
    rng: R,
}

impl<'a, R: Rng> DrawRoll<'a, R> {
    pub fn new(names: &'a [String], rng: R) -> Self {
        Self { names, shown: 0, rng }
    }
}

impl<R: Rng> Iterator for DrawRoll<'_, R> {
    type Item = Flash;

    fn next(&mut self) -> Option<Flash> {
        if self.shown >= DRAW_FLASHES {
            return None;
        }
        let name = self.names.choose(&mut self.rng)?.clone();
        self.shown += 1;
        let hold = (self.shown < DRAW_FLASHES).then(|| {
            Duration::from_millis(DRAW_BASE_DELAY_MS + u64::from(self.shown) * DRAW_SLOWDOWN_MS)
        });
        Some(Flash { name, hold })
    }
}

/// Outcome of a completed draw against a stored list.
#[derive(Debug, Clone)]
pub struct Draw {
    pub winner: String,
    pub flashes: Vec<Flash>,
    /// The list after the winner's counter was bumped.
    pub list: ParticipantList,
    /// True if every participant was exhausted and counters were reset first.
    pub was_reset: bool,
}

/// Roll a plain set of names. Returns `None` for an empty set.
pub fn roll<R: Rng>(names: &[String], rng: R) -> Option<(String, Vec<Flash>)> {
    let flashes: Vec<Flash> = DrawRoll::new(names, rng).collect();
    let winner = flashes.last()?.name.clone();
    Some((winner, flashes))
}

/// Draw a winner from a stored list and record the selection.
///
/// Only eligible participants are rolled. When nobody is eligible the list's
/// counters are reset first. Returns `Ok(None)` if the list is empty.
pub fn draw_winner<S: ListStore + ?Sized, R: Rng>(
    store: &mut S,
    list_id: &str,
    rng: R,
) -> StoreResult<Option<Draw>> {
    let mut list = store.load(list_id)?;
    let mut was_reset = false;
    let mut names: Vec<String> = eligible(&list).iter().map(|p| p.name.clone()).collect();
    if names.is_empty() && !list.participants.is_empty() {
        log::info!("Everyone in {:?} reached the selection limit, resetting", list.name);
        list = store.reset_selections(list_id)?;
        names = list.names();
        was_reset = true;
    }

    let Some((winner, flashes)) = roll(&names, rng) else {
        return Ok(None);
    };
    let list = store.mark_selected(list_id, &winner)?;
    log::info!("Drew {:?} from {:?}", winner, list.name);
    Ok(Some(Draw {
        winner,
        flashes,
        list,
        was_reset,
    }))
}
