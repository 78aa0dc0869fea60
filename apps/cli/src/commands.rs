//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use url::Url;
use webbaby_core::{CommandPipeline, CommandResult, topic_key};
use webbaby_server::AppState;
use webbaby_shared::{AppConfig, init_config, load_config};
use webbaby_storage::Storage;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Web Baby: a baby AI that learns words from you and topics from the web.
#[derive(Parser)]
#[command(
    name = "webbaby",
    version,
    about = "Teach a baby AI words and let it learn recipes and topics from the internet.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Database file (overrides `storage.db_path`).
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Personal fetch proxy base URL (overrides `providers.proxy_url`).
    #[arg(long, env = "WEBBABY_PROXY_URL", global = true)]
    pub proxy_url: Option<Url>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run the HTTP backend.
    Serve {
        /// Address to bind (overrides `server.host`).
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides `server.port`).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run one command, e.g. `webbaby ask learn about black holes`.
    Ask {
        /// The command text. Multiple words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        command: Vec<String>,

        /// Print the raw JSON result.
        #[arg(long)]
        json: bool,
    },

    /// Teach the baby that `word` is a `label`.
    Teach { word: String, label: String },

    /// Inspect or prune stored knowledge.
    Knowledge {
        #[command(subcommand)]
        action: KnowledgeAction,
    },

    /// List taught concepts.
    Concepts,

    /// Forget everything: concepts, experiences and knowledge.
    Reset {
        /// Confirm the reset.
        #[arg(long)]
        yes: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Knowledge subcommands.
#[derive(Subcommand)]
pub(crate) enum KnowledgeAction {
    /// Print the full stored summary for a topic.
    Show { topic: String },
    /// List the most recently updated topics.
    List {
        #[arg(short, long, default_value = "20")]
        limit: u32,
    },
    /// Delete one topic.
    Delete { topic: String },
    /// Delete all stored knowledge.
    Clear,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "webbaby=info",
        1 => "webbaby=debug",
        _ => "webbaby=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    if let Command::Config { action } = &cli.command {
        return match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&cli),
        };
    }

    let config = resolved_config(&cli)?;
    let storage = open_storage(&config).await?;

    match cli.command {
        Command::Serve { host, port } => cmd_serve(config, storage, host, port).await,
        Command::Ask { command, json } => cmd_ask(&config, storage, &command.join(" "), json).await,
        Command::Teach { word, label } => cmd_teach(&storage, &word, &label).await,
        Command::Knowledge { action } => match action {
            KnowledgeAction::Show { topic } => cmd_knowledge_show(&storage, &topic).await,
            KnowledgeAction::List { limit } => cmd_knowledge_list(&storage, limit).await,
            KnowledgeAction::Delete { topic } => cmd_knowledge_delete(&storage, &topic).await,
            KnowledgeAction::Clear => cmd_knowledge_clear(&storage).await,
        },
        Command::Concepts => cmd_concepts(&storage).await,
        Command::Reset { yes } => cmd_reset(&storage, yes).await,
        Command::Config { .. } => Ok(()),
    }
}

/// Load the config file and apply command-line overrides.
fn resolved_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = load_config()?;
    apply_overrides(&mut config, cli);
    Ok(config)
}

fn apply_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(db) = &cli.db {
        config.storage.db_path = Some(db.clone());
    }
    if let Some(proxy) = &cli.proxy_url {
        config.providers.proxy_url = Some(proxy.clone());
    }
}

async fn open_storage(config: &AppConfig) -> Result<Arc<Storage>> {
    let path = config.storage.resolved_db_path()?;
    info!(path = %path.display(), "opening database");
    Ok(Arc::new(Storage::open(&path).await?))
}

fn spinner(message: &str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")?
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    Ok(spinner)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_serve(
    mut config: AppConfig,
    storage: Arc<Storage>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let pipeline = CommandPipeline::from_config(&config.providers, storage)?;
    if config.providers.proxy_url.is_none() {
        info!("no proxy URL configured, the raw-page provider will always fall back");
    }

    let addr = config.server.addr();
    println!("Web Baby listening on http://{addr}");
    webbaby_server::serve(&addr, AppState::new(pipeline)).await?;
    Ok(())
}

async fn cmd_ask(config: &AppConfig, storage: Arc<Storage>, command: &str, json: bool) -> Result<()> {
    let pipeline = CommandPipeline::from_config(&config.providers, storage)?;

    let progress = spinner(&format!("Learning: {command}"))?;
    let result = pipeline.handle(command).await;
    progress.finish_and_clear();
    let result = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_command_result(&result);
    }
    Ok(())
}

fn print_command_result(result: &CommandResult) {
    let status = if result.from_internet {
        "learned from the internet"
    } else {
        "used fallback text"
    };

    println!();
    println!("  Subject: {}", result.subject);
    println!("  Intent:  {}", result.intent);
    println!("  Source:  {} ({status})", result.source);
    if let Some(detail) = &result.error_detail {
        println!("  Error:   {detail}");
    }
    println!();
    println!("{}", result.summary_preview);
    println!();
}

async fn cmd_teach(storage: &Storage, word: &str, label: &str) -> Result<()> {
    let concept = webbaby_core::teach(storage, word, label).await?;
    println!(
        "Baby learned! {} is a {} (seen {} times)",
        concept.word, concept.label, concept.seen_count
    );
    Ok(())
}

async fn cmd_knowledge_show(storage: &Storage, topic: &str) -> Result<()> {
    let record = storage.get_knowledge(&topic_key(topic)).await?;
    println!("  Topic:   {}", record.topic);
    println!("  Source:  {}", record.source);
    println!("  Updated: {}", record.updated_at.to_rfc3339());
    println!();
    println!("{}", record.summary);
    Ok(())
}

async fn cmd_knowledge_list(storage: &Storage, limit: u32) -> Result<()> {
    let records = storage.list_knowledge(limit).await?;
    if records.is_empty() {
        println!("No stored knowledge yet.");
        return Ok(());
    }

    let total = storage.count_knowledge().await?;
    for record in &records {
        println!(
            "  {:<32} {:<20} {}",
            record.topic,
            record.source,
            record.updated_at.format("%Y-%m-%d %H:%M")
        );
    }
    println!();
    println!("  Showing {} of {total} topics", records.len());
    Ok(())
}

async fn cmd_knowledge_delete(storage: &Storage, topic: &str) -> Result<()> {
    let key = topic_key(topic);
    storage.delete_knowledge(&key).await?;
    println!("Deleted '{key}'");
    Ok(())
}

async fn cmd_knowledge_clear(storage: &Storage) -> Result<()> {
    let deleted = storage.delete_all_knowledge().await?;
    println!("Deleted {deleted} topics");
    Ok(())
}

async fn cmd_concepts(storage: &Storage) -> Result<()> {
    let concepts = storage.list_concepts().await?;
    if concepts.is_empty() {
        println!("Nothing taught yet. Try `webbaby teach apple fruit`.");
        return Ok(());
    }

    for concept in &concepts {
        println!(
            "  {:<24} {:<24} seen {:>3}  correct {:>3}",
            concept.word, concept.label, concept.seen_count, concept.correct_count
        );
    }
    Ok(())
}

async fn cmd_reset(storage: &Storage, yes: bool) -> Result<()> {
    if !yes {
        return Err(eyre!("reset deletes all concepts, experiences and knowledge; pass --yes to confirm"));
    }
    storage.reset_all().await?;
    println!("All memory cleared.");
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(cli: &Cli) -> Result<()> {
    let config = resolved_config(cli)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
