mod app;
mod cache;
mod config;
mod engine;
mod error;
mod headless;
mod http_client;
mod metadata;
mod metrics;
mod models;
mod plugin;
mod presenter;
mod repository;
mod resolver;
mod server;
mod usecase;
mod util;
mod validator;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use config::Config;
use tabled::{Table, Tabled, settings::Style};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    /// No logs
    Off,
    /// Only errors
    Error,
    /// Errors and warnings
    Warn,
    /// Info, warnings and errors (default)
    Info,
    /// Debug logs
    Debug,
    /// All logs including trace
    Trace,
}

impl LogLevel {
    fn as_filter(&self) -> &str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser)]
#[command(name = "scavengarr")]
#[command(about = "Scavengarr: Torznab/Stremio meta-indexer over pluggable scraping sources")]
#[command(version)]
struct Cli {
    /// Host to bind the web server to (overrides config)
    #[arg(short = 'H', long, env = "SCAVENGARR_HOST")]
    host: Option<String>,

    /// Port to bind the web server to (overrides config)
    #[arg(short, long, env = "SCAVENGARR_PORT")]
    port: Option<u16>,

    /// Log level (can also use RUST_LOG env var)
    #[arg(short = 'l', long, value_enum, default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Torznab/Stremio HTTP server
    Serve,

    /// Manage plugin-backed indexers
    Indexer {
        #[command(subcommand)]
        command: IndexerCommands,
    },

    /// Print a plugin's Torznab capabilities document
    Caps {
        /// Plugin name
        plugin: String,
    },

    /// Run a one-off search against a plugin (bypasses the HTTP layer)
    Search {
        /// Plugin name
        plugin: String,

        /// Search query
        query: String,

        /// Category filter
        #[arg(short, long)]
        cat: Option<i32>,

        /// Output format: table, json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
}

#[derive(Subcommand)]
enum IndexerCommands {
    /// List discovered plugins and whether they're enabled
    List,
    /// Probe a plugin's configured domains for reachability
    Test {
        /// Plugin name
        name: String,
    },
}

#[derive(Tabled)]
struct PluginRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Provides")]
    provides: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Domains")]
    domains: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
}

#[derive(Tabled)]
struct ResultRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Seeders")]
    seeders: String,
    #[tabled(rename = "Cat")]
    category: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(cli.log_level.as_filter())
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_thread_ids(false))
        .with(filter)
        .init();

    tracing::debug!("Scavengarr starting...");

    let mut config = Config::load()?;
    if let Some(host) = cli.host {
        config.bind_host = host;
    }
    if let Some(port) = cli.port {
        config.bind_port = port;
    }

    match cli.command {
        Some(Commands::Serve) | None => {
            let ctx = std::sync::Arc::new(app::AppContext::build(config).await?);
            server::start_server(ctx).await?;
        }
        Some(Commands::Indexer { command }) => handle_indexer_command(command, config).await?,
        Some(Commands::Caps { plugin }) => handle_caps_command(plugin).await?,
        Some(Commands::Search { plugin, query, cat, output }) => {
            handle_search_command(plugin, query, cat, output, config).await?
        }
    }

    Ok(())
}

async fn handle_indexer_command(command: IndexerCommands, config: Config) -> Result<()> {
    let ctx = app::AppContext::build(config).await?;

    match command {
        IndexerCommands::List => {
            let names = ctx.plugin_registry.list_names();
            if names.is_empty() {
                println!("No plugins discovered. Check `plugin_dir` in the config file.");
                return Ok(());
            }

            let mut rows = Vec::new();
            for name in names {
                let enabled = ctx.plugin_registry.is_enabled(name).await;
                let plugin = ctx.plugin_registry.get(name).await?;
                let descriptor = plugin.descriptor();
                rows.push(PluginRow {
                    name: name.to_string(),
                    provides: format!("{:?}", descriptor.provides),
                    mode: format!("{:?}", descriptor.mode),
                    domains: descriptor.domains.join(", "),
                    enabled: if enabled { "✓".green().to_string() } else { "✗".red().to_string() },
                });
            }
            println!("{}", Table::new(rows).with(Style::rounded()));
        }
        IndexerCommands::Test { name } => {
            let plugin = ctx.plugin_registry.get(&name).await?;
            println!("{} Probing domains for '{}'...", "→".cyan(), name);
            for domain in &plugin.descriptor().domains {
                let url = format!("https://{domain}");
                let reachable = ctx.http_client.head(&url).send().await.is_ok_and(|r| r.status().as_u16() < 500);
                if reachable {
                    println!("{} {}", "✓".green(), domain);
                } else {
                    println!("{} {}", "✗".red(), domain);
                }
            }
        }
    }
    Ok(())
}

async fn handle_caps_command(plugin: String) -> Result<()> {
    let document = presenter::torznab::caps_document();
    println!("{} {}", "Caps for".cyan(), plugin.bold());
    println!("{document}");
    Ok(())
}

async fn handle_search_command(plugin: String, query: String, cat: Option<i32>, output: String, config: Config) -> Result<()> {
    let ctx = app::AppContext::build(config).await?;
    let q = models::Query { plugin_name: plugin.clone(), q: Some(query), category: cat, ..Default::default() };

    let outcome = usecase::search::search(&ctx, &q).await?;

    if outcome.items.is_empty() {
        println!("{}", "No results found.".yellow());
        return Ok(());
    }

    match output.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&outcome.items)?),
        _ => {
            println!("{} {} results from {}", "Found".green(), outcome.items.len().to_string().cyan().bold(), plugin);
            println!();
            let rows: Vec<ResultRow> = outcome
                .items
                .iter()
                .enumerate()
                .map(|(i, r)| ResultRow {
                    index: i + 1,
                    title: if r.title.len() > 60 { format!("{}...", &r.title[..57]) } else { r.title.clone() },
                    size: r.size.map(util::size::format_size).unwrap_or_default(),
                    seeders: r.seeders.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string()),
                    category: r.category.map(|c| c.to_string()).unwrap_or_default(),
                })
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
        }
    }
    Ok(())
}
