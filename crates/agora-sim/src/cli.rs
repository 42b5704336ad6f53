use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::SimConfig;

#[derive(Parser)]
#[command(
    name = "agora-sim",
    about = "Agora: simulated social workload against the in-memory engine",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a simulated workload and print the report
    Run(RunArgs),
    /// Print the default configuration as TOML
    Config,
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// TOML file with simulation settings; flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Number of users to register
    #[arg(long)]
    pub users: Option<usize>,
    /// Number of communities to create
    #[arg(long)]
    pub communities: Option<usize>,
    /// Number of concurrent actor threads
    #[arg(long)]
    pub actors: Option<usize>,
    /// RNG seed; random when omitted
    #[arg(long)]
    pub seed: Option<u64>,
    /// Show this user's feed instead of a randomly sampled one
    #[arg(long)]
    pub feed_user: Option<u64>,
}

impl RunArgs {
    /// Apply command-line overrides on top of a loaded config.
    pub fn apply(&self, config: &mut SimConfig) {
        if let Some(users) = self.users {
            config.users = users;
        }
        if let Some(communities) = self.communities {
            config.communities = communities;
        }
        if let Some(actors) = self.actors {
            config.actors = actors;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_with_overrides() {
        let cli = Cli::try_parse_from([
            "agora-sim", "--format", "json", "run", "--users", "20", "--seed", "7",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        let Command::Run(args) = cli.command else {
            panic!("expected run command");
        };

        let mut config = SimConfig::default();
        args.apply(&mut config);
        assert_eq!(config.users, 20);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.communities, SimConfig::default().communities);
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::try_parse_from(["agora-sim", "config", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Config));
    }
}
