use anyhow::Context;
use colored::Colorize;
use tracing::info;

use agora_engine::Engine;
use agora_types::UserId;

use crate::cli::*;
use crate::config::SimConfig;
use crate::report::SimReport;
use crate::workload;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let Cli { command, format, .. } = cli;
    match command {
        Command::Run(args) => cmd_run(args, format),
        Command::Config => cmd_config(),
    }
}

fn cmd_run(args: RunArgs, format: OutputFormat) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => SimConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SimConfig::default(),
    };
    args.apply(&mut config);
    config.validate().context("invalid simulation config")?;
    info!(
        users = config.users,
        communities = config.communities,
        actors = config.actors,
        "starting simulation"
    );

    let engine = Engine::new();
    let summary = workload::run(&engine, &config)?;
    let report = SimReport::collect(&engine, &summary, args.feed_user.map(UserId::new))?;

    match format {
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Text => {
            println!(
                "{} Simulated {} users across {} communities",
                "✓".green().bold(),
                summary.users_registered.to_string().bold(),
                config.communities.to_string().bold()
            );
            println!();
            print!("{}", report.render_text());
        }
    }
    Ok(())
}

fn cmd_config() -> anyhow::Result<()> {
    print!("{}", SimConfig::default().to_toml()?);
    Ok(())
}
