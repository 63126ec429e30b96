//! Emoji reactions on blog posts.
//!
//! Unlike likes, reactions are never predicted locally: picking an emoji may add,
//! replace or remove the viewer's reaction depending on what the server knows of their
//! previous pick, so the list is only ever replaced by the server's answer.

use std::collections::HashMap;

use crate::{
    api::{Reaction, ReactionToggle, Target, UserId},
    Error, RemoteError,
};

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ReactionSet(Vec<Reaction>);

impl ReactionSet {
    pub fn new(reactions: Vec<Reaction>) -> ReactionSet {
        ReactionSet(reactions)
    }

    pub fn reactions(&self) -> &[Reaction] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of users per emoji, in order of first appearance
    pub fn counts(&self) -> Vec<(&str, usize)> {
        let mut res: Vec<(&str, usize)> = Vec::new();
        for r in &self.0 {
            match res.iter_mut().find(|(e, _)| *e == r.emoji) {
                Some((_, n)) => *n += 1,
                None => res.push((&r.emoji, 1)),
            }
        }
        res
    }

    pub fn reaction_of(&self, user: &UserId) -> Option<&str> {
        self.0
            .iter()
            .find(|r| r.user_id == *user)
            .map(|r| &r.emoji as &str)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PendingReaction {
    pub target: Target,
    pub seq: u64,
    pub request: ReactionToggle,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ReactionOutcome {
    /// The server's list replaced the local one
    Replaced,

    /// The request failed, local state was left as it was
    Failed,

    /// A more recent reaction request was issued on this target; this answer was ignored
    Superseded,
}

#[derive(Clone, Debug, Default)]
struct Slot {
    set: ReactionSet,
    in_flight: Option<u64>,
}

#[derive(Clone, Debug, Default)]
pub struct Reactions {
    slots: HashMap<Target, Slot>,
    next_seq: u64,
}

impl Reactions {
    pub fn new() -> Reactions {
        Reactions::default()
    }

    pub fn seed(&mut self, target: Target, reactions: Vec<Reaction>) {
        let slot = self.slots.entry(target).or_default();
        if slot.in_flight.is_some() {
            tracing::debug!(%target, "not overwriting reactions while a pick is in flight");
            return;
        }
        slot.set = ReactionSet::new(reactions);
    }

    pub fn get(&self, target: &Target) -> Option<&ReactionSet> {
        self.slots.get(target).map(|s| &s.set)
    }

    pub fn is_pending(&self, target: &Target) -> bool {
        self.slots
            .get(target)
            .map(|s| s.in_flight.is_some())
            .unwrap_or(false)
    }

    /// Prepares a reaction request. Local state does not change until `apply`.
    pub fn request(
        &mut self,
        target: Target,
        emoji: &str,
        viewer: Option<UserId>,
    ) -> Result<PendingReaction, Error> {
        if viewer.is_none() {
            return Err(Error::LoginRequired);
        }
        if !target.accepts_reactions() {
            return Err(Error::Unsupported);
        }
        let request = ReactionToggle {
            emoji: String::from(emoji),
        };
        request.validate()?;
        let seq = self.next_seq;
        self.next_seq += 1;
        self.slots.entry(target).or_default().in_flight = Some(seq);
        Ok(PendingReaction {
            target,
            seq,
            request,
        })
    }

    pub fn apply(
        &mut self,
        pending: &PendingReaction,
        res: Result<Vec<Reaction>, RemoteError>,
    ) -> ReactionOutcome {
        let slot = match self.slots.get_mut(&pending.target) {
            Some(slot) if slot.in_flight == Some(pending.seq) => slot,
            _ => {
                tracing::warn!(target = %pending.target, seq = pending.seq, "ignoring answer to superseded reaction");
                return ReactionOutcome::Superseded;
            }
        };
        slot.in_flight = None;
        match res {
            Ok(reactions) => {
                slot.set = ReactionSet::new(reactions);
                ReactionOutcome::Replaced
            }
            Err(err) => {
                tracing::error!(?err, target = %pending.target, "reaction failed");
                ReactionOutcome::Failed
            }
        }
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }
}
