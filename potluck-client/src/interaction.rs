//! Likes and bookmarks, applied optimistically.
//!
//! A toggle is shown to the user immediately, then sent to the server. If the server
//! refuses it or cannot be reached, the exact previous state is put back.

use std::collections::{HashMap, HashSet};

use crate::{
    api::{InteractionKind, Target, Toggled, UserId},
    Error, RemoteError,
};

/// What the user sees: whether they acted, and how many people did
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct ToggleState {
    pub active: bool,
    pub count: u64,
}

impl ToggleState {
    pub fn from_likers(likers: &HashSet<UserId>, viewer: Option<UserId>) -> ToggleState {
        ToggleState {
            active: viewer.map(|v| likers.contains(&v)).unwrap_or(false),
            count: likers.len() as u64,
        }
    }

    /// `active` and `count` only ever change together, through this function
    pub fn flipped(self) -> ToggleState {
        match self.active {
            true => ToggleState {
                active: false,
                count: self.count.saturating_sub(1),
            },
            false => ToggleState {
                active: true,
                count: self.count.saturating_add(1),
            },
        }
    }
}

impl From<Toggled> for ToggleState {
    fn from(t: Toggled) -> ToggleState {
        ToggleState {
            active: t.active,
            count: t.count,
        }
    }
}

/// A toggle that was applied locally and still has to be sent to the server
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PendingToggle {
    pub kind: InteractionKind,
    pub target: Target,
    pub seq: u64,

    /// State to restore if the request fails
    pub before: ToggleState,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Settlement {
    /// The server accepted without saying more, the optimistic state stays
    Confirmed,

    /// The server sent back the actual state, which replaced the optimistic one
    Reconciled(ToggleState),

    /// The request failed and the previous state was restored
    RolledBack(ToggleState),

    /// Another toggle on the same target was issued since; this response was ignored
    Superseded,
}

#[derive(Clone, Debug, Default)]
struct Slot {
    state: ToggleState,

    /// Sequence number of the latest toggle still waiting for the server
    in_flight: Option<u64>,
}

#[derive(Clone, Debug, Default)]
pub struct Interactions {
    slots: HashMap<(InteractionKind, Target), Slot>,
    next_seq: u64,
}

impl Interactions {
    pub fn new() -> Interactions {
        Interactions::default()
    }

    /// Installs state received from the server. Slots with a toggle in flight keep their
    /// optimistic state, as the server data may predate the toggle.
    pub fn seed(&mut self, kind: InteractionKind, target: Target, state: ToggleState) {
        let slot = self.slots.entry((kind, target)).or_default();
        if slot.in_flight.is_some() {
            tracing::debug!(?kind, %target, "not overwriting state of in-flight toggle");
            return;
        }
        slot.state = state;
    }

    pub fn get(&self, kind: InteractionKind, target: &Target) -> Option<ToggleState> {
        self.slots.get(&(kind, *target)).map(|s| s.state)
    }

    pub fn is_pending(&self, kind: InteractionKind, target: &Target) -> bool {
        self.slots
            .get(&(kind, *target))
            .map(|s| s.in_flight.is_some())
            .unwrap_or(false)
    }

    /// Applies the toggle locally, returning the request the caller must now send.
    ///
    /// Nothing is changed if this returns an error.
    pub fn toggle(
        &mut self,
        kind: InteractionKind,
        target: Target,
        viewer: Option<UserId>,
    ) -> Result<PendingToggle, Error> {
        if viewer.is_none() {
            return Err(Error::LoginRequired);
        }
        if !kind.applies_to(&target) {
            return Err(Error::Unsupported);
        }
        let slot = self
            .slots
            .get_mut(&(kind, target))
            .ok_or(Error::NotSeeded)?;
        let seq = self.next_seq;
        self.next_seq += 1;
        let before = slot.state;
        slot.state = before.flipped();
        slot.in_flight = Some(seq);
        tracing::debug!(?kind, %target, seq, ?before, after = ?slot.state, "optimistic toggle");
        Ok(PendingToggle {
            kind,
            target,
            seq,
            before,
        })
    }

    /// Reconciles local state with the server's answer to `pending`
    pub fn settle(
        &mut self,
        pending: &PendingToggle,
        res: &Result<Option<Toggled>, RemoteError>,
    ) -> Settlement {
        let slot = match self.slots.get_mut(&(pending.kind, pending.target)) {
            Some(slot) if slot.in_flight == Some(pending.seq) => slot,
            _ => {
                tracing::warn!(
                    kind = ?pending.kind,
                    target = %pending.target,
                    seq = pending.seq,
                    "ignoring answer to superseded toggle"
                );
                return Settlement::Superseded;
            }
        };
        slot.in_flight = None;
        match res {
            Ok(None) => Settlement::Confirmed,
            Ok(Some(t)) => {
                slot.state = ToggleState::from(*t);
                Settlement::Reconciled(slot.state)
            }
            Err(err) => {
                tracing::error!(?err, kind = ?pending.kind, target = %pending.target, "toggle failed, rolling back");
                slot.state = pending.before;
                Settlement::RolledBack(slot.state)
            }
        }
    }

    /// Drops all state, eg. on logout
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}
