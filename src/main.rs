use clap::{Parser, Subcommand};

use relay_bot::application::commands;
use relay_bot::application::messaging::CommandBus;
use relay_bot::domain::entities::Update;
use relay_bot::domain::traits::ClientHandle;
use relay_bot::infrastructure::adapters::{ConsoleAdapter, TelegramAdapter};
use relay_bot::infrastructure::config::Config;

#[derive(Parser)]
#[command(name = "relay-bot")]
#[command(about = "A command-dispatch chat bot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Bot token (overrides config)
    #[arg(short, long)]
    token: Option<String>,
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
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            run_bot(cli.config, cli.token);
        }
        Commands::Version => {
            println!("relay-bot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            init_config(&cli.config);
        }
    }
}

fn run_bot(config_path: String, token_override: Option<String>) {
    // Load config
    let config = if std::path::Path::new(&config_path).exists() {
        Config::load(&config_path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::load_env()
        })
    } else {
        Config::load_env()
    };

    tracing::info!("Starting relay-bot: {}", config.bot.name);

    // Build the bus: built-ins minus the disabled list, fallback from config.
    // Registration failures abort here, before any traffic.
    let mut bus = CommandBus::new();
    if let Some(ref fallback) = config.commands.fallback {
        bus = bus.with_fallback(fallback.clone());
    }

    let enabled: Vec<&str> = commands::builtin_names()
        .into_iter()
        .filter(|name| !config.commands.disabled.iter().any(|d| d == name))
        .collect();
    if let Err(e) = bus.add_commands(enabled) {
        tracing::error!("Command registration failed: {}", e);
        std::process::exit(1);
    }
    tracing::info!("Registered {} command entries", bus.commands().len());

    // Select adapter
    let rt = tokio::runtime::Runtime::new().expect("Failed to start tokio runtime");

    let token = token_override.or_else(|| {
        config
            .adapters
            .telegram
            .as_ref()
            .filter(|t| t.enabled)
            .and_then(|t| t.token.clone())
    });

    if let Some(token) = token {
        rt.block_on(async {
            let adapter = TelegramAdapter::new(token, config.bot.name.clone());
            run_telegram_bot(adapter, &bus).await;
        });
    } else {
        // Console mode (dev)
        rt.block_on(async {
            let adapter = ConsoleAdapter::new(config.bot.name.clone(), config.bot.username.clone());
            run_console_bot(adapter, &bus).await;
        });
    }
}

async fn run_telegram_bot(mut adapter: TelegramAdapter, bus: &CommandBus) {
    if let Err(e) = adapter.fetch_bot_info().await {
        tracing::error!("Failed to fetch bot info: {}", e);
        return;
    }

    let info = adapter.bot_info();
    tracing::info!("Bot started: @{}", info.username);

    // Publish the command list to the platform UI; alias entries are skipped
    let listing: Vec<(String, String)> = bus
        .commands()
        .into_iter()
        .filter(|(name, command)| name == command.name())
        .map(|(name, command)| {
            let description = if command.description().is_empty() {
                name.clone()
            } else {
                command.description().to_string()
            };
            (name, description)
        })
        .collect();
    if let Err(e) = adapter.register_commands(&listing).await {
        tracing::warn!("Failed to register commands: {}", e);
    }

    let mut offset: i64 = 0;
    let timeout_seconds = 30;

    tracing::info!("Starting message loop...");

    loop {
        match adapter.get_updates(offset, timeout_seconds).await {
            Ok(updates) => {
                if !updates.is_empty() {
                    tracing::info!("Received {} updates", updates.len());
                    offset = TelegramAdapter::next_offset(&updates);
                }
                for update in &updates {
                    let Some(msg) = &update.message else { continue };
                    let Some(text) = msg.text.clone() else { continue };
                    if text.is_empty() {
                        continue;
                    }

                    if let Err(e) = bus.handle(&text, msg.to_domain(), &adapter).await {
                        tracing::error!("Dispatch failed: {}", e);
                    }
                }
            }
            Err(e) => {
                tracing::error!("Failed to get updates: {}", e);
                tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;
            }
        }
    }
}

async fn run_console_bot(adapter: ConsoleAdapter, bus: &CommandBus) {
    tracing::info!("Console mode. Type /help to list commands, Ctrl-D to exit.");

    loop {
        let Some(line) = adapter.read_line("> ").await else {
            break;
        };
        if line.is_empty() {
            continue;
        }

        let update = Update::new("console", line.clone()).with_platform("console");
        if let Err(e) = bus.handle(&line, update, &adapter).await {
            tracing::error!("Dispatch failed: {}", e);
        }
    }
}

fn init_config(path: &str) {
    if std::path::Path::new(path).exists() {
        tracing::warn!("{} already exists, not overwriting", path);
        return;
    }

    let yaml = match Config::default().to_yaml() {
        Ok(yaml) => yaml,
        Err(e) => {
            tracing::error!("Failed to render default config: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = std::fs::write(path, yaml) {
        tracing::error!("Failed to write {}: {}", path, e);
        std::process::exit(1);
    }
    println!("Wrote default config to {}", path);
}
