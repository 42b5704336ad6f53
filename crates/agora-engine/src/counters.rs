//! Process-wide aggregate counters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use agora_types::ActionKind;

/// Tallies updated in the same critical section as each mutation.
///
/// The counters are never recomputed by scanning the store. `actions` always
/// equals the sum of `breakdown`, and each per-kind total equals the number
/// of successful mutations of that kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub posts: u64,
    pub comments: u64,
    pub votes: u64,
    pub messages: u64,
    pub actions: u64,
    /// Users whose connectivity flag is currently false.
    pub disconnected_users: u64,
    /// Action totals keyed by kind. Every kind is present, zero or not.
    pub breakdown: BTreeMap<ActionKind, u64>,
}

impl Counters {
    pub fn new() -> Self {
        Self {
            posts: 0,
            comments: 0,
            votes: 0,
            messages: 0,
            actions: 0,
            disconnected_users: 0,
            breakdown: ActionKind::ALL.iter().map(|&kind| (kind, 0)).collect(),
        }
    }

    /// Count one successful action of the given kind.
    pub fn record(&mut self, kind: ActionKind) {
        match kind {
            ActionKind::Post => self.posts += 1,
            ActionKind::Comment => self.comments += 1,
            ActionKind::Vote => self.votes += 1,
            ActionKind::Message => self.messages += 1,
            ActionKind::Join | ActionKind::Leave => {}
        }
        self.actions += 1;
        *self.breakdown.entry(kind).or_insert(0) += 1;
    }

    /// Total recorded for one kind.
    pub fn count(&self, kind: ActionKind) -> u64 {
        self.breakdown.get(&kind).copied().unwrap_or(0)
    }

    pub fn breakdown_total(&self) -> u64 {
        self.breakdown.values().sum()
    }

    /// Check the conservation rules between the totals and the breakdown.
    pub fn is_consistent(&self) -> bool {
        self.actions == self.breakdown_total()
            && self.posts == self.count(ActionKind::Post)
            && self.comments == self.count(ActionKind::Comment)
            && self.votes == self.count(ActionKind::Vote)
            && self.messages == self.count(ActionKind::Message)
    }
}

impl Default for Counters {
    fn default() -> Self {
        Self::new()
    }
}
