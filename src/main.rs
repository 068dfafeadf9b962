use clap::{Parser, Subcommand};
use std::sync::Arc;

use crispr_bot::application::errors::BotError;
use crispr_bot::application::messaging::{CommandDispatcher, CommandParser};
use crispr_bot::application::services::GuideService;
use crispr_bot::domain::traits::Bot;
use crispr_bot::infrastructure::adapters::SlackAdapter;
use crispr_bot::infrastructure::config::{Config, Credentials};
use crispr_bot::infrastructure::idt::{self, IdtClient, TokenProvider};

#[derive(Parser)]
#[command(name = "crispr-bot")]
#[command(about = "Slack /crispr bot for IDT guide RNA design", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    // A missing .env is fine; real deployments set the environment directly
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run => run_bot(&cli.config),
        Commands::Version => {
            println!("crispr-bot v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig => init_config(),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run_bot(config_path: &str) -> Result<(), BotError> {
    let config = Config::load_or_default(config_path)?;
    let credentials = Credentials::from_env()?;

    tracing::info!(
        "Starting {} ({} via IDT at {})",
        config.bot.name,
        config.bot.command,
        config.idt.base_url
    );

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| BotError::Internal(format!("Failed to start runtime: {}", e)))?;

    rt.block_on(async {
        let http = idt::build_http_client(&config.idt)?;
        let tokens = Arc::new(TokenProvider::new(http.clone(), &config.idt, &credentials));
        let vendor = Arc::new(IdtClient::new(http, config.idt.clone()));
        let service = GuideService::new(tokens, vendor);

        let mut adapter = SlackAdapter::new(
            &credentials.slack_bot_token,
            &credentials.slack_app_token,
            &config.bot.command,
            &config.slack,
        );
        adapter.fetch_bot_info().await?;
        let info = adapter.bot_info();
        tracing::info!("Connected to Slack as {} ({}) in {}", info.name, info.id, info.team);

        let adapter = Arc::new(adapter);
        let dispatcher = Arc::new(CommandDispatcher::new(
            CommandParser::new(config.bot.default_species),
            service,
            adapter.clone(),
        ));

        tokio::select! {
            _ = adapter.run(dispatcher) => {}
            _ = shutdown_signal() => {
                tracing::info!("Shutting down");
            }
        }

        Ok::<(), BotError>(())
    })
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!("SIGTERM handler unavailable: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_config() -> Result<(), BotError> {
    let yaml = Config::default().to_yaml()?;
    println!("{}", yaml);
    println!("\nSave this to config.yaml and export the required secrets:");
    for name in crispr_bot::infrastructure::config::REQUIRED_ENV {
        println!("  {}", name);
    }
    Ok(())
}
