//! Meeting point for propagations arriving at the same join saddle.
//!
//! A propagation that reaches a vertex whose lower star it does not fully own
//! parks itself here with the number of lower edges it owns. Whichever
//! arrival brings the outstanding count to zero is the last one: it leaves
//! with every parked propagation and continues alone. Parked propagations
//! are plain data, so no worker ever blocks.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::propagation::Propagation;

struct Arrivals {
    /// Lower edges of the saddle not yet accounted for.
    remaining: usize,
    parked: Vec<Propagation>,
}

/// Result of [`SaddleRendezvous::arrive`].
pub(crate) enum Arrival {
    /// Other propagations still have to arrive; the caller stops.
    Parked,
    /// The caller is last and takes over the parked propagations.
    Last(Propagation, Vec<Propagation>),
}

#[derive(Default)]
pub(crate) struct SaddleRendezvous {
    saddles: DashMap<usize, Arrivals>,
}

impl SaddleRendezvous {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `prop` at `vertex`, owning `owned` of its `total` lower edges.
    pub fn arrive(&self, vertex: usize, total: usize, owned: usize, prop: Propagation) -> Arrival {
        match self.saddles.entry(vertex) {
            Entry::Vacant(slot) => {
                if owned >= total {
                    return Arrival::Last(prop, Vec::new());
                }
                slot.insert(Arrivals {
                    remaining: total - owned,
                    parked: vec![prop],
                });
                Arrival::Parked
            }
            Entry::Occupied(mut slot) => {
                let arrivals = slot.get_mut();
                debug_assert!(
                    owned <= arrivals.remaining,
                    "saddle {vertex}: {owned} edges claimed, {} outstanding",
                    arrivals.remaining
                );
                arrivals.remaining = arrivals.remaining.saturating_sub(owned);
                if arrivals.remaining > 0 {
                    arrivals.parked.push(prop);
                    return Arrival::Parked;
                }
                let Arrivals { parked, .. } = slot.remove();
                Arrival::Last(prop, parked)
            }
        }
    }

    /// Saddles with parked propagations.
    pub fn pending(&self) -> usize {
        self.saddles.len()
    }
}
