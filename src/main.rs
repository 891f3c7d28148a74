//! Solana agent.
//!
//! Usage:
//!   solana-agent serve     Create the assistant and serve the HTTP API
//!   solana-agent chat      Chat with the assistant in the terminal
//!   solana-agent tools     List the registered tools
//!   solana-agent prompt    Print the assistant instructions

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use solana_agent::agent::build_system_prompt;
use solana_agent::assistant::{create_assistant, AssistantOptions, TokioSleeper};
use solana_agent::chat::{terminal, Conversation, PollSettings};
use solana_agent::config::{self, AgentConfig};
use solana_agent::identity::Wallet;
use solana_agent::notify::TelegramNotifier;
use solana_agent::openai::OpenAiClient;
use solana_agent::server::{self, AppState};
use solana_agent::solana::SolanaClient;
use solana_agent::state::{Database, SharedDatabase};
use solana_agent::tools::{build_registry, ToolContext, ToolRegistry};
use solana_agent::types::{AssistantHandle, ThreadRecord};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[derive(Parser, Debug)]
#[command(name = "solana-agent")]
#[command(version)]
#[command(about = "Conversational AI agent for the Solana blockchain")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to agent.toml (defaults to ~/.solana-agent/agent.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level (debug, info, warn, error). Overrides the config file.
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the assistant and serve the HTTP API.
    Serve,

    /// Chat with the assistant in the terminal.
    Chat,

    /// List the registered tools.
    Tools,

    /// Print the assistant instructions.
    Prompt,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Exit explicitly: a pending stdin read would otherwise hold the runtime open.
    let code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            1
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let config = config::load_with_env(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Serve => cmd_serve(config).await,
        Commands::Chat => cmd_chat(config).await,
        Commands::Tools => cmd_tools(&config),
        Commands::Prompt => cmd_prompt(),
    }
}

async fn cmd_serve(config: AgentConfig) -> Result<()> {
    let db = open_database(&config)?;
    let runtime = Runtime::build(&config)?;
    let assistant = runtime.create_assistant(&config).await?;
    db.lock().await.kv_set("assistant_id", &assistant.id)?;

    println!(
        "{} Assistant '{}' ready (model: {}, wallet: {})",
        ">>>".green().bold(),
        assistant.name,
        assistant.model,
        runtime.wallet_address,
    );

    let cancel = CancellationToken::new();
    let state = Arc::new(AppState::new(
        &config,
        runtime.api.clone(),
        runtime.registry.clone(),
        &assistant.id,
        db.clone(),
    ));
    let origins = config.allowed_origins();
    let port = config.port;
    let server_cancel = cancel.clone();
    let server_handle = tokio::spawn(async move {
        server::serve(state, port, &origins, server_cancel).await
    });

    let chat_handle = if config.cli_mode {
        let conversation = runtime
            .start_conversation(&config, &assistant.id, db.clone())
            .await?;
        Some(tokio::spawn(terminal::run(conversation, cancel.clone())))
    } else {
        None
    };

    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => println!("\n{} Shutting down gracefully...", "<<<".red().bold()),
            Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
        }
    };
    let outcome = supervise(ctrl_c, server_handle, chat_handle, cancel, SHUTDOWN_GRACE).await;

    // The runtime and app state hold clones of the handle; drop them first.
    drop(runtime);
    let closed = close_database(db);
    match outcome {
        Err(e) => {
            if let Err(close_err) = closed {
                error!("{:#}", close_err);
            }
            Err(e)
        }
        Ok(()) => closed,
    }
}

/// Wait for `shutdown` or for the server to stop on its own, then cancel and
/// join every task. A task still running after `grace` is aborted.
///
/// Returns the server's error when it stopped by itself with one.
async fn supervise(
    shutdown: impl Future<Output = ()>,
    mut server: JoinHandle<Result<()>>,
    chat: Option<JoinHandle<Result<()>>>,
    cancel: CancellationToken,
    grace: Duration,
) -> Result<()> {
    let mut server_joined = false;
    let outcome = tokio::select! {
        _ = shutdown => Ok(()),
        result = &mut server => {
            server_joined = true;
            match result {
                Ok(Ok(())) => {
                    warn!("HTTP server exited");
                    Ok(())
                }
                Ok(Err(e)) => Err(e),
                Err(e) => Err(anyhow!("HTTP server task failed: {}", e)),
            }
        }
    };
    if let Err(e) = &outcome {
        error!("{:#}", e);
    }

    cancel.cancel();
    let deadline = Instant::now() + grace;
    if !server_joined {
        join_or_abort("HTTP server", server, deadline).await;
    }
    if let Some(chat) = chat {
        join_or_abort("Chat", chat, deadline).await;
    }
    outcome
}

/// Join `handle`, aborting it if it is still running at `deadline`.
async fn join_or_abort(name: &str, mut handle: JoinHandle<Result<()>>, deadline: Instant) {
    let joined = match tokio::time::timeout_at(deadline, &mut handle).await {
        Ok(joined) => joined,
        Err(_) => {
            warn!("{} did not stop in time; aborting", name);
            handle.abort();
            handle.await
        }
    };
    match joined {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("{} stopped with error: {:#}", name, e),
        Err(e) if e.is_cancelled() => {}
        Err(e) => warn!("{} task join error: {}", name, e),
    }
}

async fn cmd_chat(config: AgentConfig) -> Result<()> {
    let db = open_database(&config)?;
    let runtime = Runtime::build(&config)?;
    let assistant = runtime.create_assistant(&config).await?;
    let conversation = runtime
        .start_conversation(&config, &assistant.id, db.clone())
        .await?;

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_cancel.cancel();
        }
    });

    terminal::run(conversation, cancel).await?;
    drop(runtime);
    close_database(db)
}

fn cmd_tools(config: &AgentConfig) -> Result<()> {
    let runtime = Runtime::build(config)?;
    println!(
        "{} {} tools registered",
        ">>>".green().bold(),
        runtime.registry.len()
    );
    for tool in runtime.registry.iter() {
        println!(
            "  {:<24} {:<8} {}",
            tool.name().bold(),
            tool.category().to_string().dimmed(),
            tool.description()
        );
    }
    Ok(())
}

fn cmd_prompt() -> Result<()> {
    println!("{}", build_system_prompt());
    Ok(())
}

/// Clients and the tool registry shared by the commands.
struct Runtime {
    wallet_address: String,
    api: Arc<OpenAiClient>,
    registry: Arc<ToolRegistry>,
}

impl Runtime {
    fn build(config: &AgentConfig) -> Result<Self> {
        let wallet_path = config.resolved_wallet_path();
        let wallet = Wallet::load_or_create(Path::new(&wallet_path))
            .with_context(|| format!("Failed to load or create wallet at {}", wallet_path))?;

        if config.openai_api_key.is_empty() {
            warn!("OpenAI API key is not set; assistant requests will fail");
        }
        let api = Arc::new(OpenAiClient::new(
            &config.openai_api_url,
            &config.openai_api_key,
        ));

        let ctx = ToolContext {
            solana: Arc::new(SolanaClient::from_config(config, wallet.clone())),
            images: api.clone(),
            notifier: Arc::new(TelegramNotifier::new(
                &config.telegram_bot_token,
                &config.telegram_chat_id,
            )),
        };
        let registry = build_registry(&ctx).context("Failed to build tool registry")?;

        Ok(Self {
            wallet_address: wallet.address,
            api,
            registry: Arc::new(registry),
        })
    }

    async fn create_assistant(&self, config: &AgentConfig) -> Result<AssistantHandle> {
        let options = AssistantOptions::from_config(config)?;
        match create_assistant(self.api.as_ref(), &self.registry, options, &TokioSleeper).await {
            Ok(handle) => Ok(handle),
            Err(e) => {
                error!("{}", e);
                Err(e.into())
            }
        }
    }

    async fn start_conversation(
        &self,
        config: &AgentConfig,
        assistant_id: &str,
        db: SharedDatabase,
    ) -> Result<Conversation> {
        let conversation = Conversation::start(self.api.clone(), self.registry.clone(), assistant_id)
            .await?
            .with_database(db.clone())
            .with_polling(PollSettings::from_config(config));

        db.lock().await.save_thread(&ThreadRecord {
            id: conversation.thread_id().to_string(),
            assistant_id: Some(assistant_id.to_string()),
            source: "cli".into(),
            created_at: Utc::now(),
        })?;
        Ok(conversation)
    }
}

fn open_database(config: &AgentConfig) -> Result<SharedDatabase> {
    let db_path = config.resolved_database_path();
    match Database::open(Path::new(&db_path)) {
        Ok(db) => {
            info!("Database ready at {}", db_path);
            Ok(Arc::new(Mutex::new(db)))
        }
        Err(e) => {
            error!("Failed to initialize database at {}: {:#}", db_path, e);
            Err(e)
        }
    }
}

fn close_database(db: SharedDatabase) -> Result<()> {
    let db = Arc::try_unwrap(db)
        .map_err(|_| anyhow!("database is still in use"))?
        .into_inner();
    match db.close() {
        Ok(()) => {
            info!("Database connection closed");
            Ok(())
        }
        Err(e) => {
            error!("Error closing database: {:#}", e);
            Err(e)
        }
    }
}
