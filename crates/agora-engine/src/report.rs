use serde::{Deserialize, Serialize};

use agora_store::EntityStore;

use crate::counters::Counters;

/// Member and post totals for one community.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityStats {
    pub name: String,
    pub members: usize,
    pub posts: usize,
}

/// Point-in-time summary of engine state for reporting layers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineReport {
    pub users: usize,
    pub posts: usize,
    pub comments: usize,
    pub messages: usize,
    /// Sorted by member count descending, then by name.
    pub communities: Vec<CommunityStats>,
    pub counters: Counters,
}

impl EngineReport {
    pub(crate) fn build(store: &EntityStore, counters: &Counters) -> Self {
        let mut communities: Vec<CommunityStats> = store
            .communities()
            .map(|c| CommunityStats {
                name: c.name.clone(),
                members: c.members.len(),
                posts: c.posts.len(),
            })
            .collect();
        communities.sort_by(|a, b| b.members.cmp(&a.members).then_with(|| a.name.cmp(&b.name)));

        Self {
            users: store.user_count(),
            posts: store.post_count(),
            comments: store.comment_count(),
            messages: store.messages().len(),
            communities,
            counters: counters.clone(),
        }
    }

    /// The community with the most members, if any exist.
    pub fn largest_community(&self) -> Option<&CommunityStats> {
        self.communities.first()
    }
}
