//! Scribbly CLI — the main entry point.
//!
//! Commands:
//! - `onboard`  — Write the default config file
//! - `gateway`  — Start the HTTP API server
//! - `ask`      — Run one assistant request from the terminal
//! - `doctor`   — Diagnose configuration and provider reachability

use clap::{Parser, Subcommand};
use scribbly_core::assistant::{Mode, Tone};

mod commands;

#[derive(Parser)]
#[command(
    name = "scribbly",
    about = "Scribbly — content assistant for social posts",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default configuration file
    Onboard,

    /// Start the HTTP gateway server
    Gateway {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,

        /// Override the bind address
        #[arg(long)]
        host: Option<String>,
    },

    /// Run a single assistant request and print the JSON result
    Ask {
        /// The post text
        content: String,

        /// summary, reply, tags, polish, emojify, title, translate or vibe
        #[arg(short, long, default_value = "summary")]
        mode: Mode,

        /// friendly, professional or humorous
        #[arg(short, long, default_value = "friendly")]
        tone: Tone,

        /// Do not compute tags for non-tag modes
        #[arg(long)]
        no_tags: bool,

        /// Target language for translate mode
        #[arg(long, default_value = "zh")]
        target_lang: String,

        /// Client identity charged by the rate limiter
        #[arg(long, default_value = "cli")]
        client: String,
    },

    /// Diagnose configuration and provider reachability
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is normal.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Gateway { port, host } => commands::gateway::run(port, host).await?,
        Commands::Ask {
            content,
            mode,
            tone,
            no_tags,
            target_lang,
            client,
        } => {
            let request = scribbly_core::assistant::AssistantRequest::new(content, mode)
                .with_tone(tone)
                .with_tags(!no_tags)
                .with_target_lang(target_lang);
            commands::ask::run(request, &client).await?
        }
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
