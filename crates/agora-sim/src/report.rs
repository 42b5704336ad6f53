//! Read-only summary of a finished run, rendered as text or JSON.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use anyhow::{Context, Result};
use colored::Colorize;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;

use agora_engine::{EngineReport, SocialReader};
use agora_types::{ActionKind, Message, Post, User, UserId};

use crate::workload::RunSummary;

/// One user's feed at report time.
#[derive(Debug, Serialize)]
pub struct FeedSample {
    pub user: User,
    pub posts: Vec<Post>,
}

#[derive(Debug, Serialize)]
pub struct SimReport {
    pub seed: u64,
    pub elapsed_secs: f64,
    /// Counted actions per second.
    pub throughput: f64,
    pub engine: EngineReport,
    pub feed: Option<FeedSample>,
    pub messages: Vec<Message>,
    #[serde(skip)]
    names: BTreeMap<UserId, String>,
}

impl SimReport {
    /// Gather everything the report shows. `feed_user` picks whose feed is
    /// included; when absent a user is sampled with the run's seed.
    pub fn collect(
        reader: &dyn SocialReader,
        summary: &RunSummary,
        feed_user: Option<UserId>,
    ) -> Result<Self> {
        let engine = reader.report().context("failed to read engine report")?;
        let users = reader.users()?;

        let sampled = match feed_user {
            Some(id) => Some(
                reader
                    .user(id)?
                    .with_context(|| format!("feed user {id} does not exist"))?,
            ),
            None => {
                let mut rng = StdRng::seed_from_u64(summary.seed);
                users.choose(&mut rng).cloned()
            }
        };
        let feed = match sampled {
            Some(user) => {
                let posts = reader.feed(user.id)?;
                Some(FeedSample { user, posts })
            }
            None => None,
        };

        Ok(Self {
            seed: summary.seed,
            elapsed_secs: summary.elapsed.as_secs_f64(),
            throughput: summary.throughput(engine.counters.actions),
            engine,
            feed,
            messages: reader.messages()?,
            names: users.into_iter().map(|u| (u.id, u.name)).collect(),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_text(&mut out);
        out
    }

    fn name(&self, id: UserId) -> String {
        self.names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    fn write_text(&self, out: &mut String) -> std::fmt::Result {
        let counters = &self.engine.counters;

        writeln!(out, "{}", "Simulation Metrics".bold().underline())?;
        writeln!(out, "  Seed: {}", self.seed.to_string().cyan())?;
        writeln!(out, "  Elapsed: {:.3}s", self.elapsed_secs)?;
        writeln!(out, "  Users: {}", self.engine.users.to_string().bold())?;
        writeln!(
            out,
            "  Actions: {} ({:.1} actions/sec)",
            counters.actions.to_string().bold(),
            self.throughput
        )?;
        writeln!(out, "  Posts: {}", counters.posts)?;
        writeln!(out, "  Comments: {}", counters.comments)?;
        writeln!(out, "  Votes: {}", counters.votes)?;
        writeln!(out, "  Messages: {}", counters.messages)?;
        writeln!(out, "  Disconnected users: {}", counters.disconnected_users)?;

        writeln!(out, "\n{}", "Action Breakdown".bold().underline())?;
        for kind in ActionKind::ALL {
            writeln!(out, "  {:<9} {}", kind.as_str(), counters.count(kind))?;
        }

        writeln!(out, "\n{}", "Communities".bold().underline())?;
        match self.engine.largest_community() {
            Some(largest) => writeln!(
                out,
                "  Largest: {} ({} members)",
                largest.name.yellow().bold(),
                largest.members
            )?,
            None => writeln!(out, "  {}", "none".dimmed())?,
        }
        for stats in &self.engine.communities {
            writeln!(
                out,
                "  {:<14} {} members, {} posts",
                stats.name.yellow(),
                stats.members,
                stats.posts
            )?;
        }

        if let Some(feed) = &self.feed {
            writeln!(
                out,
                "\n{} {} ({})",
                "Feed for".bold().underline(),
                feed.user.name.green().bold(),
                feed.user.id
            )?;
            if feed.posts.is_empty() {
                writeln!(out, "  {}", "no posts".dimmed())?;
            }
            for post in &feed.posts {
                write!(
                    out,
                    "  [{}] {} {:+} {} by {}",
                    post.id.to_string().yellow(),
                    post.community.cyan(),
                    post.votes,
                    post.content,
                    self.name(post.author)
                )?;
                if let Some(source) = post.reposted_from {
                    write!(out, " {}", format!("(repost of {source})").dimmed())?;
                }
                writeln!(out)?;
            }
        }

        writeln!(out, "\n{}", "Direct Messages".bold().underline())?;
        if self.messages.is_empty() {
            writeln!(out, "  {}", "none".dimmed())?;
        }
        for message in &self.messages {
            writeln!(
                out,
                "  {} -> {}: {}",
                self.name(message.from).green(),
                self.name(message.to).green(),
                message.content
            )?;
        }
        Ok(())
    }
}
