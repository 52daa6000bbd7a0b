mod commands;
mod gateway;
mod notify;

use clap::{Parser, Subcommand};
use corredor_channels::WhatsAppChannel;
use corredor_core::{config, traits::{Channel, Provider}};
use corredor_extract::Extractor;
use corredor_memory::{DbKeySource, Store};
use corredor_providers::{GeminiProvider, OpenAiProvider};
use corredor_sheets::SheetsClient;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "corredor",
    version,
    about = "Corredor — WhatsApp real-estate listing intake agent"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the agent.
    Start,
    /// Check configuration and collaborator availability.
    Status,
    /// Run a one-shot extraction against a message (debugging aid).
    Extract {
        /// The message text to analyze.
        #[arg(trailing_var_arg = true)]
        message: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cfg.corredor.log_level.clone())),
        )
        .init();

    match cli.command {
        Commands::Start => {
            let store = Store::new(&cfg.memory).await?;
            let provider = build_provider(&cfg, &store)?;

            if !provider.is_available().await {
                anyhow::bail!("provider '{}' is not available", provider.name());
            }

            let mut channels: HashMap<String, Arc<dyn Channel>> = HashMap::new();
            if let Some(ref wa) = cfg.channel.whatsapp {
                if wa.enabled {
                    let channel = WhatsAppChannel::new(wa.clone());
                    channels.insert("whatsapp".to_string(), Arc::new(channel));
                }
            }
            if channels.is_empty() {
                anyhow::bail!("No channels enabled. Enable [channel.whatsapp] in config.toml.");
            }

            let sheets = Arc::new(SheetsClient::new(resolve_sheets_token(&cfg)));

            println!("Corredor — starting agent...");
            let gw = gateway::Gateway::new(provider, channels, store, sheets, &cfg);
            Arc::new(gw).run().await?;
        }
        Commands::Status => {
            println!("Corredor — status check\n");
            println!("Config: {}", cli.config);
            println!("Provider: {}", cfg.provider.default);

            let store = Store::new(&cfg.memory).await?;
            let provider = build_provider(&cfg, &store)?;
            println!(
                "  {}: {}",
                provider.name(),
                if provider.is_available().await {
                    "available"
                } else {
                    "not available"
                }
            );

            match store.designated_sheet().await? {
                Some(sheet) => println!("Designated sheet: {} ({})", sheet.name, sheet.sheet_id),
                None if !cfg.sheets.fallback_sheet_id.is_empty() => {
                    println!("Designated sheet: none (fallback {})", cfg.sheets.fallback_sheet_id)
                }
                None => println!("Designated sheet: NONE — intake will fail"),
            }

            match cfg.channel.whatsapp {
                Some(ref wa) if wa.enabled => {
                    println!("WhatsApp: enabled via {}", wa.bridge_url)
                }
                Some(_) => println!("WhatsApp: disabled"),
                None => println!("WhatsApp: not configured"),
            }
        }
        Commands::Extract { message } => {
            if message.is_empty() {
                anyhow::bail!("no message provided. Usage: corredor extract <message>");
            }

            let text = message.join(" ");
            let store = Store::new(&cfg.memory).await?;
            let provider = build_provider(&cfg, &store)?;
            let extractor = Extractor::new(provider, &cfg.extract);

            let records = extractor.extract(&text).await;
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }

    Ok(())
}

/// Build the configured provider, with DB-backed rotatable keys.
fn build_provider(
    cfg: &config::Config,
    store: &Store,
) -> anyhow::Result<Arc<dyn Provider>> {
    match cfg.provider.default.as_str() {
        "gemini" => {
            let keys = Arc::new(DbKeySource::new(
                store.clone(),
                "GEMINI_API_KEY",
                cfg.provider.gemini.api_key.clone(),
            ));
            Ok(Arc::new(GeminiProvider::new(
                keys,
                cfg.provider.gemini.model.clone(),
            )))
        }
        "openai" => {
            let keys = Arc::new(DbKeySource::new(
                store.clone(),
                "OPENAI_API_KEY",
                cfg.provider.openai.api_key.clone(),
            ));
            Ok(Arc::new(OpenAiProvider::new(
                keys,
                cfg.provider.openai.model.clone(),
            )))
        }
        other => anyhow::bail!("unsupported provider: {other}"),
    }
}

/// Sheets bearer token: config value, then GOOGLE_SHEETS_TOKEN env var.
fn resolve_sheets_token(cfg: &config::Config) -> String {
    if !cfg.sheets.api_token.is_empty() {
        return cfg.sheets.api_token.clone();
    }
    std::env::var("GOOGLE_SHEETS_TOKEN").unwrap_or_default()
}
