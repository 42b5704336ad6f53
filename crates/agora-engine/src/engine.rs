use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info};

use agora_store::{CommentParent, EntityStore, StoreError, ThreadEntry};
use agora_types::{
    ActionKind, Comment, CommentId, Community, Message, Post, PostId, User, UserId, Vote,
};

use crate::counters::Counters;
use crate::error::{EngineError, EngineResult};
use crate::report::EngineReport;
use crate::traits::{SocialReader, SocialWriter};

/// The shared Agora engine.
///
/// All state (store, id sequences, message log, counters) sits behind one
/// `RwLock`. Every operation takes the lock exactly once and holds it for
/// its whole duration, so the history of operations is linearizable.
/// Mutations take the write guard; queries take the read guard and may run
/// concurrently with each other. Nothing blocks while a guard is held.
pub struct Engine {
    inner: RwLock<EngineState>,
}

#[derive(Debug, Default)]
struct EngineState {
    store: EntityStore,
    counters: Counters,
}

impl EngineState {
    /// Count an action performed by `actor`. The actor has already been
    /// validated by the caller.
    fn charge(&mut self, actor: UserId, kind: ActionKind) {
        if let Some(user) = self.store.user_mut(actor) {
            user.actions += 1;
        }
        self.counters.record(kind);
    }

    fn membership(
        &mut self,
        user: UserId,
        community: &str,
        kind: ActionKind,
    ) -> EngineResult<bool> {
        self.store.require_user(user)?;
        let members = &mut self
            .store
            .community_mut(community)
            .ok_or_else(|| StoreError::CommunityNotFound(community.to_string()))?
            .members;

        let changed = match kind {
            ActionKind::Leave => members.remove(&user),
            _ => members.insert(user),
        };
        self.charge(user, kind);
        Ok(changed)
    }
}

impl Engine {
    pub fn new() -> Self {
        info!("agora engine created");
        Self {
            inner: RwLock::new(EngineState::default()),
        }
    }

    fn write(&self) -> EngineResult<RwLockWriteGuard<'_, EngineState>> {
        self.inner
            .write()
            .map_err(|_| EngineError::LockPoisoned("write"))
    }

    fn read(&self) -> EngineResult<RwLockReadGuard<'_, EngineState>> {
        self.inner
            .read()
            .map_err(|_| EngineError::LockPoisoned("read"))
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut debug = f.debug_struct("Engine");
        if let Ok(state) = self.inner.try_read() {
            debug
                .field("users", &state.store.user_count())
                .field("communities", &state.store.community_count())
                .field("actions", &state.counters.actions);
        }
        debug.finish()
    }
}

impl SocialWriter for Engine {
    fn register_user(&self, name: &str) -> EngineResult<User> {
        let mut state = self.write()?;
        let user = state.store.insert_user(name).clone();
        debug!(user = %user.id, name, "registered user");
        Ok(user)
    }

    fn create_community(&self, name: &str) -> EngineResult<Community> {
        let mut state = self.write()?;
        let community = state.store.insert_community(name)?.clone();
        debug!(community = name, "created community");
        Ok(community)
    }

    fn join_community(&self, user: UserId, community: &str) -> EngineResult<bool> {
        let mut state = self.write()?;
        let joined = state.membership(user, community, ActionKind::Join)?;
        debug!(user = %user, community, joined, "join community");
        Ok(joined)
    }

    fn leave_community(&self, user: UserId, community: &str) -> EngineResult<bool> {
        let mut state = self.write()?;
        let left = state.membership(user, community, ActionKind::Leave)?;
        debug!(user = %user, community, left, "leave community");
        Ok(left)
    }

    fn create_post(&self, author: UserId, community: &str, content: &str) -> EngineResult<Post> {
        let mut state = self.write()?;
        let post = state
            .store
            .insert_post(author, community, content, None)?
            .clone();
        state.charge(author, ActionKind::Post);
        debug!(post = %post.id, author = %author, community, "created post");
        Ok(post)
    }

    fn repost(&self, author: UserId, source: PostId, community: &str) -> EngineResult<Post> {
        let mut state = self.write()?;
        let content = state
            .store
            .post(source)
            .ok_or(StoreError::PostNotFound(source))?
            .content
            .clone();
        let post = state
            .store
            .insert_post(author, community, content, Some(source))?
            .clone();
        state.charge(author, ActionKind::Post);
        debug!(post = %post.id, source = %source, community, "created repost");
        Ok(post)
    }

    fn comment_on_post(
        &self,
        author: UserId,
        post: PostId,
        content: &str,
    ) -> EngineResult<Comment> {
        let mut state = self.write()?;
        let comment = state
            .store
            .insert_comment(author, CommentParent::Post(post), content)?
            .clone();
        state.charge(author, ActionKind::Comment);
        debug!(comment = %comment.id, post = %post, "commented on post");
        Ok(comment)
    }

    fn reply_to_comment(
        &self,
        author: UserId,
        parent: CommentId,
        content: &str,
    ) -> EngineResult<Comment> {
        let mut state = self.write()?;
        let reply = state
            .store
            .insert_comment(author, CommentParent::Comment(parent), content)?
            .clone();
        state.charge(author, ActionKind::Comment);
        debug!(comment = %reply.id, parent = %parent, "replied to comment");
        Ok(reply)
    }

    fn vote_post(&self, post: PostId, vote: Vote) -> EngineResult<Post> {
        let mut state = self.write()?;
        let stored = state
            .store
            .post_mut(post)
            .ok_or(StoreError::PostNotFound(post))?;
        stored.votes += vote.delta();
        let snapshot = stored.clone();

        if let Some(author) = state.store.user_mut(snapshot.author) {
            author.karma += vote.delta();
        }
        state.counters.record(ActionKind::Vote);
        debug!(post = %post, ?vote, votes = snapshot.votes, "voted on post");
        Ok(snapshot)
    }

    fn vote_comment(&self, comment: CommentId, vote: Vote) -> EngineResult<Comment> {
        let mut state = self.write()?;
        let stored = state
            .store
            .comment_mut(comment)
            .ok_or(StoreError::CommentNotFound(comment))?;
        stored.votes += vote.delta();
        let snapshot = stored.clone();
        state.counters.record(ActionKind::Vote);
        debug!(comment = %comment, ?vote, votes = snapshot.votes, "voted on comment");
        Ok(snapshot)
    }

    fn send_message(&self, from: UserId, to: UserId, content: &str) -> EngineResult<Message> {
        let mut state = self.write()?;
        let message = state.store.append_message(from, to, content)?.clone();
        state.charge(from, ActionKind::Message);
        debug!(from = %from, to = %to, "sent message");
        Ok(message)
    }

    fn set_connected(&self, user: UserId, connected: bool) -> EngineResult<bool> {
        let mut state = self.write()?;
        let stored = state.store.require_user_mut(user)?;
        let changed = stored.connected != connected;
        stored.connected = connected;

        if changed {
            let disconnected = &mut state.counters.disconnected_users;
            *disconnected = if connected {
                disconnected.saturating_sub(1)
            } else {
                *disconnected + 1
            };
            debug!(user = %user, connected, "connectivity changed");
        }
        Ok(changed)
    }
}

impl SocialReader for Engine {
    fn user(&self, id: UserId) -> EngineResult<Option<User>> {
        Ok(self.read()?.store.user(id).cloned())
    }

    fn community(&self, name: &str) -> EngineResult<Option<Community>> {
        Ok(self.read()?.store.community(name).cloned())
    }

    fn post(&self, id: PostId) -> EngineResult<Option<Post>> {
        Ok(self.read()?.store.post(id).cloned())
    }

    fn comment(&self, id: CommentId) -> EngineResult<Option<Comment>> {
        Ok(self.read()?.store.comment(id).cloned())
    }

    fn feed(&self, user: UserId) -> EngineResult<Vec<Post>> {
        let state = self.read()?;
        let feed = state.store.feed(user)?;
        Ok(feed.into_iter().cloned().collect())
    }

    fn inbox(&self, user: UserId) -> EngineResult<Vec<Message>> {
        let state = self.read()?;
        let inbox = state.store.inbox(user)?;
        Ok(inbox.into_iter().cloned().collect())
    }

    fn thread(&self, post: PostId) -> EngineResult<Vec<ThreadEntry>> {
        Ok(self.read()?.store.thread(post)?)
    }

    fn messages(&self) -> EngineResult<Vec<Message>> {
        Ok(self.read()?.store.messages().to_vec())
    }

    fn users(&self) -> EngineResult<Vec<User>> {
        Ok(self.read()?.store.users().cloned().collect())
    }

    fn counters(&self) -> EngineResult<Counters> {
        Ok(self.read()?.counters.clone())
    }

    fn report(&self) -> EngineResult<EngineReport> {
        let state = self.read()?;
        Ok(EngineReport::build(&state.store, &state.counters))
    }
}


#[cfg(test)]
mod properties {
    use std::collections::BTreeMap;

    use proptest::prelude::*;

    use super::*;

    const USERS: u64 = 3;
    const COMMUNITIES: [&str; 3] = ["alpha", "beta", "gamma"];

    #[derive(Clone, Debug)]
    enum Op {
        Join(u64, usize),
        Leave(u64, usize),
        Post(u64, usize),
        Repost(u64, u64, usize),
        Comment(u64, u64),
        Reply(u64, u64),
        Vote(u64, bool),
        VoteComment(u64, bool),
        Message(u64, u64),
    }

    fn op() -> impl Strategy<Value = Op> {
        // Indices run one past the valid range so unknown identities are exercised too.
        let user = 1..=USERS + 1;
        let community = 0..=COMMUNITIES.len();
        let target = 1u64..12;
        prop_oneof![
            (user.clone(), community.clone()).prop_map(|(u, c)| Op::Join(u, c)),
            (user.clone(), community.clone()).prop_map(|(u, c)| Op::Leave(u, c)),
            (user.clone(), community.clone()).prop_map(|(u, c)| Op::Post(u, c)),
            (user.clone(), target.clone(), community).prop_map(|(u, p, c)| Op::Repost(u, p, c)),
            (user.clone(), target.clone()).prop_map(|(u, p)| Op::Comment(u, p)),
            (user.clone(), target.clone()).prop_map(|(u, c)| Op::Reply(u, c)),
            (target.clone(), any::<bool>()).prop_map(|(p, up)| Op::Vote(p, up)),
            (target, any::<bool>()).prop_map(|(c, up)| Op::VoteComment(c, up)),
            (user.clone(), user).prop_map(|(f, t)| Op::Message(f, t)),
        ]
    }

    fn community(index: usize) -> &'static str {
        COMMUNITIES.get(index).copied().unwrap_or("missing")
    }

    fn vote(up: bool) -> Vote {
        if up {
            Vote::Up
        } else {
            Vote::Down
        }
    }

    /// Ids handed out by successful ops, in call order.
    #[derive(Default)]
    struct Created {
        posts: Vec<PostId>,
        comments: Vec<CommentId>,
    }

    /// Apply one op; returns the action kind it counted, if it succeeded.
    fn apply(engine: &Engine, op: &Op, created: &mut Created) -> Option<ActionKind> {
        let ok = |r: EngineResult<()>| r.is_ok();
        let (kind, succeeded) = match *op {
            Op::Join(u, c) => (
                ActionKind::Join,
                ok(engine.join_community(UserId::new(u), community(c)).map(drop)),
            ),
            Op::Leave(u, c) => (
                ActionKind::Leave,
                ok(engine.leave_community(UserId::new(u), community(c)).map(drop)),
            ),
            Op::Post(u, c) => match engine.create_post(UserId::new(u), community(c), "p") {
                Ok(post) => {
                    created.posts.push(post.id);
                    (ActionKind::Post, true)
                }
                Err(_) => (ActionKind::Post, false),
            },
            Op::Repost(u, p, c) => {
                match engine.repost(UserId::new(u), PostId::new(p), community(c)) {
                    Ok(post) => {
                        created.posts.push(post.id);
                        (ActionKind::Post, true)
                    }
                    Err(_) => (ActionKind::Post, false),
                }
            }
            Op::Comment(u, p) => {
                match engine.comment_on_post(UserId::new(u), PostId::new(p), "c") {
                    Ok(comment) => {
                        created.comments.push(comment.id);
                        (ActionKind::Comment, true)
                    }
                    Err(_) => (ActionKind::Comment, false),
                }
            }
            Op::Reply(u, c) => {
                match engine.reply_to_comment(UserId::new(u), CommentId::new(c), "r") {
                    Ok(reply) => {
                        created.comments.push(reply.id);
                        (ActionKind::Comment, true)
                    }
                    Err(_) => (ActionKind::Comment, false),
                }
            }
            Op::Vote(p, up) => (
                ActionKind::Vote,
                ok(engine.vote_post(PostId::new(p), vote(up)).map(drop)),
            ),
            Op::VoteComment(c, up) => (
                ActionKind::Vote,
                ok(engine.vote_comment(CommentId::new(c), vote(up)).map(drop)),
            ),
            Op::Message(f, t) => (
                ActionKind::Message,
                ok(engine
                    .send_message(UserId::new(f), UserId::new(t), "m")
                    .map(drop)),
            ),
        };
        succeeded.then_some(kind)
    }

    fn seeded_engine() -> Engine {
        let engine = Engine::new();
        for i in 0..USERS {
            engine.register_user(&format!("user-{i}")).unwrap();
        }
        for name in COMMUNITIES {
            engine.create_community(name).unwrap();
        }
        engine
    }

    proptest! {
        #[test]
        fn counters_match_successful_operations(ops in prop::collection::vec(op(), 0..120)) {
            let engine = seeded_engine();
            let mut created = Created::default();
            let mut expected: BTreeMap<ActionKind, u64> = BTreeMap::new();

            for op in &ops {
                if let Some(kind) = apply(&engine, op, &mut created) {
                    *expected.entry(kind).or_insert(0) += 1;
                }
                let counters = engine.counters().unwrap();
                prop_assert!(counters.is_consistent());
            }

            let counters = engine.counters().unwrap();
            for kind in ActionKind::ALL {
                prop_assert_eq!(counters.count(kind), expected.get(&kind).copied().unwrap_or(0));
            }
            let per_user: u64 = engine.users().unwrap().iter().map(|u| u.actions).sum();
            prop_assert_eq!(per_user, counters.actions - counters.votes);
        }

        #[test]
        fn karma_equals_net_votes_on_authored_posts(ops in prop::collection::vec(op(), 0..120)) {
            let engine = seeded_engine();
            let mut created = Created::default();
            for op in &ops {
                apply(&engine, op, &mut created);
            }

            let mut net: BTreeMap<UserId, i64> = BTreeMap::new();
            for id in &created.posts {
                let post = engine.post(*id).unwrap().unwrap();
                *net.entry(post.author).or_insert(0) += post.votes;
            }
            for user in engine.users().unwrap() {
                prop_assert_eq!(user.karma, net.get(&user.id).copied().unwrap_or(0));
            }
        }

        #[test]
        fn ids_increase_in_creation_order(ops in prop::collection::vec(op(), 0..120)) {
            let engine = seeded_engine();
            let mut created = Created::default();
            for op in &ops {
                apply(&engine, op, &mut created);
            }
            prop_assert!(created.posts.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(created.comments.windows(2).all(|w| w[0] < w[1]));

            let counters = engine.counters().unwrap();
            prop_assert_eq!(created.posts.len() as u64, counters.posts);
            prop_assert_eq!(created.comments.len() as u64, counters.comments);
            for id in &created.comments {
                prop_assert!(engine.comment(*id).unwrap().is_some());
            }
        }

        #[test]
        fn feed_contains_exactly_member_community_posts(ops in prop::collection::vec(op(), 0..120)) {
            let engine = seeded_engine();
            let mut created = Created::default();
            for op in &ops {
                apply(&engine, op, &mut created);
            }

            for user in engine.users().unwrap() {
                let feed: Vec<PostId> = engine.feed(user.id).unwrap().iter().map(|p| p.id).collect();
                let mut expected = Vec::new();
                for name in COMMUNITIES {
                    let community = engine.community(name).unwrap().unwrap();
                    if community.is_member(user.id) {
                        expected.extend(community.posts.iter().copied());
                    }
                }
                prop_assert_eq!(feed, expected);
            }
        }
    }
}
