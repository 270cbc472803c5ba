use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use packing::client::PackingApi;
use packing::model::{EventId, ItemFilter, ItemStatus, UserId};
use packing::module::InitOptions;
use packing::PackingModule;
use runtime::{AppConfig, AppConfigProvider, CliArgs};
use std::path::{Path, PathBuf};

mod render;

/// PackPal - coordinate who brings what to an event
#[derive(Parser)]
#[command(name = "packpal")]
#[command(about = "PackPal - coordinate who brings what to an event")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Seed snapshot (YAML or JSON), overrides modules.packing.seed_file
    #[arg(long, global = true)]
    seed: Option<PathBuf>,

    /// Act as this user id (must be known to the seed)
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List events with their progress
    Events {
        /// Case-insensitive filter on title and description
        #[arg(short, long, default_value = "")]
        query: String,
    },
    /// Show an event's items grouped by category
    Show {
        event: String,
        /// Only this category id
        #[arg(long)]
        category: Option<String>,
        /// Only this status (to_pack, packed, delivered)
        #[arg(long)]
        status: Option<ItemStatus>,
    },
    /// Packing and delivery progress of an event
    Progress { event: String },
    /// Members of an event and what the current user may do there
    Members { event: String },
    /// Validate configuration and seed data
    Check,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.app.home_dir));
    tracing::info!("PackPal starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    // --seed is relative to where the command runs, not to home_dir
    let seed = match cli.seed {
        Some(p) if p.is_relative() => Some(std::env::current_dir()?.join(p)),
        other => other,
    };
    let provider = AppConfigProvider::new(config);
    let module = PackingModule::init(
        &provider,
        InitOptions {
            seed,
            user: cli.user.map(UserId::from),
        },
    )?;
    let client = module.client();

    let output = match cli.command.unwrap_or(Commands::Events {
        query: String::new(),
    }) {
        Commands::Events { query } => render::events(&client.event_summaries(&query), cli.json)?,
        Commands::Show {
            event,
            category,
            status,
        } => {
            let event = client.get_event(&EventId::from(event))?;
            let filter = ItemFilter {
                category_id: category.map(Into::into),
                status,
            };
            let groups = client.group_items_by_category(&event.id, &filter)?;
            render::groups(&event, &groups, cli.json)?
        }
        Commands::Progress { event } => {
            let event = client.get_event(&EventId::from(event))?;
            let progress = client.compute_progress(&event.id)?;
            render::progress(&event, progress, cli.json)?
        }
        Commands::Members { event } => {
            let event = client.get_event(&EventId::from(event))?;
            let capabilities = client.capabilities(&event.id)?;
            render::members(&event, capabilities, cli.json)?
        }
        Commands::Check => check(&module, client.as_ref(), cli.json)?,
    };

    println!("{output}");
    Ok(())
}

fn check(module: &PackingModule, client: &dyn PackingApi, json: bool) -> Result<String> {
    tracing::info!("Checking configuration...");
    let snapshot = module.service().store().snapshot();
    let user = client.current_user();
    tracing::info!("Configuration is valid");

    if json {
        return serde_json::to_string_pretty(&serde_json::json!({
            "status": "ok",
            "events": snapshot.events.len(),
            "users": snapshot.users.len(),
            "currentUser": user.id.as_str(),
        }))
        .context("Failed to serialize check result");
    }
    Ok(format!(
        "Configuration check passed\nEvents: {}\nUsers: {}\nActing as: {} ({})",
        snapshot.events.len(),
        snapshot.users.len(),
        user.name,
        user.id
    ))
}
