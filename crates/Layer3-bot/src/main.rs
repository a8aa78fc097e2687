//! Pinboard - Main entry point

mod commands;
mod console;
mod events;

use anyhow::Context;
use clap::{Parser, Subcommand};
use console::ConsoleResponder;
use pinboard_core::{
    DirectorySource, DispatchOutcome, Interaction, InteractionUser, PinboardClient, RestTransport,
};
use pinboard_foundation::{logging, GuildStore, PinboardConfig, PINBOARD_CONFIG_FILE};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Pinboard - plugin-based Discord bot runtime
#[derive(Parser, Debug)]
#[command(name = "pinboard")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Path to the config file
    #[arg(short, long, default_value = PINBOARD_CONFIG_FILE)]
    config: PathBuf,

    /// Plugin directory
    #[arg(long, default_value = "plugins")]
    plugins: PathBuf,

    /// Event handler directory
    #[arg(long, default_value = "events")]
    events: PathBuf,

    /// Enable debug logging on every channel
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load plugins, log in and update remote commands when needed
    Sync,
    /// Load plugins, log in and report whether an update is required
    Check,
    /// List the commands the plugin directory provides (no network)
    Commands,
    /// Run a command locally, printing its responses
    Invoke {
        /// Command name
        name: String,

        /// Guild to invoke from
        #[arg(short, long, default_value = "0")]
        guild: String,

        /// Invoke as a direct message instead of from a guild
        #[arg(long)]
        dm: bool,

        /// Invoking user id
        #[arg(short, long, default_value = "0")]
        user: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let offline = matches!(args.command, Command::Commands | Command::Invoke { .. });
    let config = load_config(&args.config, offline)?;
    logging::init(&config, args.debug)?;

    let store = match &config.database {
        Some(path) => GuildStore::open(path)?,
        None => GuildStore::in_memory()?,
    };
    let source = DirectorySource::new(args.plugins.clone(), args.events.clone())
        .with_commands(commands::command_table())
        .with_events(events::event_table(store));

    let transport = Arc::new(RestTransport::new(
        config.token.clone(),
        config.discord.api_base.clone(),
    )?);
    let client = PinboardClient::new(config, transport);

    match args.command {
        Command::Sync => {
            let report = client.login(&source, &source).await?;
            match report.sync {
                Some(sync) => println!(
                    "Updated {} global command(s){}",
                    sync.global,
                    sync.developer
                        .map(|n| format!(" and {} developer command(s)", n))
                        .unwrap_or_default()
                ),
                None => println!("Commands are already up to date."),
            }
        }
        Command::Check => {
            if client.check(&source, &source).await? {
                println!("Remote commands need an update.");
            } else {
                println!("Remote commands are up to date.");
            }
        }
        Command::Commands => {
            client.registry().load_from(&source).await?;
            let set = client.registry().snapshot();
            for plugin in set.plugins() {
                let hidden = if plugin.config.hidden { " (hidden)" } else { "" };
                println!("{}{} [{}]", plugin.config.name, hidden, plugin.id);
                for command in plugin.commands.values() {
                    println!(
                        "  /{:<20} {:<10} {}",
                        command.name(),
                        command.permission(),
                        command.config().description
                    );
                }
            }
        }
        Command::Invoke {
            name,
            guild,
            dm,
            user,
        } => {
            client.registry().load_from(&source).await?;

            let mut interaction = Interaction::new(
                name,
                InteractionUser::new(user.clone(), format!("console#{}", user)),
                Arc::new(ConsoleResponder),
            );
            if !dm {
                interaction = interaction.in_guild(guild);
            }

            match client.dispatch(interaction).await {
                DispatchOutcome::Failed(failure) => warn!("Command failed: {}", failure),
                outcome => info!("Dispatch finished: {:?}", outcome),
            }
        }
    }

    Ok(())
}

/// 설정 로드
///
/// 네트워크를 쓰지 않는 서브커맨드는 설정 파일이 없어도 기본값으로 실행된다.
fn load_config(path: &Path, offline: bool) -> anyhow::Result<PinboardConfig> {
    if offline && !path.exists() {
        return Ok(PinboardConfig::default());
    }

    PinboardConfig::load(path).with_context(|| format!("Failed to start Pinboard ({})", path.display()))
}
