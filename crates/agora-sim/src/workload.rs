//! Concurrent workload driver.
//!
//! Actors run on scoped threads and share one [`Engine`]. Each actor owns a
//! round-robin slice of the user population and its own seeded RNG; the
//! engine is the only shared state.

use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use agora_engine::{Engine, SocialReader, SocialWriter};
use agora_types::UserId;

use crate::config::SimConfig;

/// What a finished run reports besides engine state.
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub seed: u64,
    pub elapsed: Duration,
    pub users_registered: usize,
}

impl RunSummary {
    /// Counted actions per second of wall-clock run time.
    pub fn throughput(&self, actions: u64) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            actions as f64 / secs
        } else {
            0.0
        }
    }
}

/// Populate `engine` according to `config`.
pub fn run(engine: &Engine, config: &SimConfig) -> Result<RunSummary> {
    config.validate()?;
    let seed = config.seed.unwrap_or_else(rand::random);
    let started = Instant::now();

    for index in 0..config.communities {
        let name = SimConfig::community_name(index);
        if let Err(err) = engine.create_community(&name) {
            warn!(community = %name, error = %err, "community not created");
        }
    }

    let results: Vec<Result<usize>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..config.actors)
            .map(|index| {
                let actor = Actor::new(engine, config, index, seed);
                scope.spawn(move || actor.run())
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(anyhow!("actor thread panicked")))
            })
            .collect()
    });

    let mut users_registered = 0;
    for (index, result) in results.into_iter().enumerate() {
        users_registered += result.with_context(|| format!("actor {index} failed"))?;
    }

    let elapsed = started.elapsed();
    info!(seed, users = users_registered, ?elapsed, "simulation complete");
    Ok(RunSummary {
        seed,
        elapsed,
        users_registered,
    })
}

struct Actor<'a> {
    engine: &'a Engine,
    config: &'a SimConfig,
    index: usize,
    rng: StdRng,
}

impl<'a> Actor<'a> {
    fn new(engine: &'a Engine, config: &'a SimConfig, index: usize, seed: u64) -> Self {
        Self {
            engine,
            config,
            index,
            rng: StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
        }
    }

    /// Drive every user dealt to this actor. Returns how many were registered.
    fn run(mut self) -> Result<usize> {
        let mut registered = 0;
        for user_index in (self.index..self.config.users).step_by(self.config.actors) {
            self.simulate_user(user_index)?;
            registered += 1;
        }
        debug!(actor = self.index, registered, "actor finished");
        Ok(registered)
    }

    fn simulate_user(&mut self, user_index: usize) -> Result<()> {
        let name = format!("User{}", user_index + 1);
        let user = self.engine.register_user(&name)?.id;

        let communities = self.config.communities;
        let draw: f64 = self.rng.gen();
        let joins = (communities as f64 * draw.powf(self.config.membership_skew)) as usize + 1;
        for community in 0..joins.min(communities) {
            self.engine
                .join_community(user, &SimConfig::community_name(community))?;
        }

        if self.rng.gen_bool(self.config.disconnect_probability) {
            self.engine.set_connected(user, false)?;
        } else {
            self.write_posts(user, &name)?;
        }

        if self.rng.gen_bool(self.config.message_probability) {
            self.exchange_message(user, &name)?;
        }
        Ok(())
    }

    fn write_posts(&mut self, user: UserId, name: &str) -> Result<()> {
        let communities = self.config.communities;
        let posts = self.rng.gen_range(1..=self.config.max_posts_per_user);

        for n in 1..=posts {
            let community = SimConfig::community_name(self.rng.gen_range(0..communities));
            let content = format!("Post content {n} from {name}");
            let post = self.engine.create_post(user, &community, &content)?.id;

            for _ in 0..self.rng.gen_range(1..=self.config.max_upvotes_per_post) {
                self.engine.upvote(post)?;
            }

            for c in 1..=self.rng.gen_range(1..=self.config.max_comments_per_post) {
                let comment = self
                    .engine
                    .comment_on_post(user, post, &format!("Comment {c} on post {post}"))?
                    .id;
                for r in 1..=self.rng.gen_range(1..=self.config.max_replies_per_comment) {
                    self.engine.reply_to_comment(
                        user,
                        comment,
                        &format!("Reply {r} to comment {comment}"),
                    )?;
                }
            }

            if self.rng.gen_bool(self.config.repost_probability) {
                let target = SimConfig::community_name(self.rng.gen_range(0..communities));
                self.engine.repost(user, post, &target)?;
            }
        }
        Ok(())
    }

    /// Message a random other registered user, who answers the first message
    /// in their inbox.
    fn exchange_message(&mut self, user: UserId, name: &str) -> Result<()> {
        let others: Vec<_> = self
            .engine
            .users()?
            .into_iter()
            .filter(|other| other.id != user)
            .collect();
        let Some(target) = others.choose(&mut self.rng) else {
            return Ok(());
        };

        let content = format!("Hello from {name} to {}!", target.name);
        self.engine.send_message(user, target.id, &content)?;

        if let Some(first) = self.engine.inbox(target.id)?.first() {
            let reply = format!("Thanks for writing, from {}", target.name);
            self.engine.reply_to_message(target.id, first, &reply)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use agora_types::ActionKind;

    use super::*;

    fn small_config(actors: usize) -> SimConfig {
        SimConfig {
            users: 30,
            communities: 4,
            actors,
            seed: Some(42),
            ..Default::default()
        }
    }

    #[test]
    fn run_registers_every_user_and_keeps_counters_consistent() {
        let engine = Engine::new();
        let summary = run(&engine, &small_config(3)).unwrap();

        assert_eq!(summary.seed, 42);
        assert_eq!(summary.users_registered, 30);

        let report = engine.report().unwrap();
        assert_eq!(report.users, 30);
        assert_eq!(report.communities.len(), 4);
        assert!(report.counters.is_consistent());
        assert_eq!(report.counters.posts as usize, report.posts);
        assert_eq!(report.counters.comments as usize, report.comments);
        assert_eq!(report.counters.messages as usize, report.messages);
        assert!(report.counters.count(ActionKind::Join) >= 30);
    }

    #[test]
    fn every_user_joins_the_first_community() {
        let engine = Engine::new();
        run(&engine, &small_config(2)).unwrap();
        let first = engine
            .community(&SimConfig::community_name(0))
            .unwrap()
            .unwrap();
        assert_eq!(first.members.len(), 30);
    }

    #[test]
    fn disconnected_users_do_not_post() {
        let engine = Engine::new();
        let config = SimConfig {
            disconnect_probability: 1.0,
            message_probability: 0.0,
            ..small_config(2)
        };
        run(&engine, &config).unwrap();

        let counters = engine.counters().unwrap();
        assert_eq!(counters.disconnected_users, 30);
        assert_eq!(counters.posts, 0);
        assert!(engine.users().unwrap().iter().all(|u| !u.connected));
    }

    #[test]
    fn single_actor_runs_are_reproducible() {
        let first = Engine::new();
        let second = Engine::new();
        run(&first, &small_config(1)).unwrap();
        run(&second, &small_config(1)).unwrap();

        assert_eq!(first.counters().unwrap(), second.counters().unwrap());
        assert_eq!(first.messages().unwrap(), second.messages().unwrap());
    }

    #[test]
    fn invalid_config_is_rejected_before_running() {
        let engine = Engine::new();
        let config = SimConfig {
            communities: 0,
            ..Default::default()
        };
        assert!(run(&engine, &config).is_err());
        assert_eq!(engine.report().unwrap().users, 0);
    }

    #[test]
    fn throughput_handles_zero_elapsed() {
        let summary = RunSummary {
            seed: 0,
            elapsed: Duration::ZERO,
            users_registered: 0,
        };
        assert_eq!(summary.throughput(10), 0.0);

        let summary = RunSummary {
            elapsed: Duration::from_secs(2),
            ..summary
        };
        assert_eq!(summary.throughput(10), 5.0);
    }
}
