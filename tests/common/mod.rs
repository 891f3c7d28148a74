//! In-process fakes for the external services.

#![allow(dead_code)]

use anyhow::{bail, Result};
use async_trait::async_trait;
use solana_agent::assistant::{AssistantConfig, Sleeper};
use solana_agent::chat::PollSettings;
use solana_agent::errors::ServiceError;
use solana_agent::notify::Notifier;
use solana_agent::openai::{AssistantsApi, ImageGenerator};
use solana_agent::server::middleware::RateLimiter;
use solana_agent::server::AppState;
use solana_agent::solana::{
    Balance, ChainAction, PriceQuote, SolanaAgent, TokenData, TokenQuery, TxReceipt,
};
use solana_agent::state::{Database, SharedDatabase};
use solana_agent::tools::{build_registry, ToolContext, ToolRegistry};
use solana_agent::types::*;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const WALLET: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

#[derive(Default)]
pub struct FakeSolana {
    pub submitted: Mutex<Vec<ChainAction>>,
    pub airdrops: Mutex<Vec<u64>>,
}

#[async_trait]
impl SolanaAgent for FakeSolana {
    fn wallet_address(&self) -> &str {
        WALLET
    }

    async fn balance(&self, mint: Option<&str>) -> Result<Balance, ServiceError> {
        Ok(match mint {
            None => Balance {
                amount: 2.5,
                token: "SOL".into(),
            },
            Some(mint) => Balance {
                amount: 100.0,
                token: mint.to_string(),
            },
        })
    }

    async fn request_airdrop(&self, lamports: u64) -> Result<String, ServiceError> {
        self.airdrops.lock().unwrap().push(lamports);
        Ok("airdropsig".into())
    }

    async fn tps(&self) -> Result<f64, ServiceError> {
        Ok(2817.4)
    }

    async fn token_data(&self, _query: &TokenQuery) -> Result<TokenData, ServiceError> {
        Err(ServiceError::NotFound("token".into()))
    }

    async fn price(&self, feed_id: &str) -> Result<PriceQuote, ServiceError> {
        Ok(PriceQuote {
            feed_id: feed_id.to_string(),
            price: 145.23,
            confidence: 0.05,
            publish_time: 1_700_000_000,
        })
    }

    async fn submit(&self, action: ChainAction) -> Result<TxReceipt, ServiceError> {
        self.submitted.lock().unwrap().push(action);
        Ok(TxReceipt {
            signature: "5igsig".into(),
            address: None,
            signer: Some(WALLET.into()),
        })
    }
}

pub struct FakeImages;

#[async_trait]
impl ImageGenerator for FakeImages {
    async fn generate(&self, _prompt: &str, _size: &str, n: u8) -> Result<Vec<String>, ServiceError> {
        Ok((0..n).map(|i| format!("https://img.example/{}.png", i)).collect())
    }
}

#[derive(Default)]
pub struct FakeNotifier {
    pub sent: Mutex<Vec<String>>,
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn notify(&self, _chat_id: Option<&str>, message: &str) -> Result<(), ServiceError> {
        self.sent.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

/// Never actually waits.
pub struct InstantSleeper;

#[async_trait]
impl Sleeper for InstantSleeper {
    async fn sleep(&self, _delay: Duration) {}
}

/// Assistants API that replays queued run snapshots.
pub struct ScriptedApi {
    pub runs: Mutex<VecDeque<Run>>,
    pub messages: Mutex<Vec<(String, String)>>,
    pub submitted: Mutex<Vec<Vec<ToolResult>>>,
    pub reply: String,
    pub fail_threads: bool,
}

impl ScriptedApi {
    pub fn new(runs: Vec<Run>, reply: &str) -> Self {
        Self {
            runs: Mutex::new(runs.into()),
            messages: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
            reply: reply.to_string(),
            fail_threads: false,
        }
    }

    fn next_run(&self) -> Result<Run> {
        match self.runs.lock().unwrap().pop_front() {
            Some(run) => Ok(run),
            None => bail!("no scripted run left"),
        }
    }
}

pub fn run(status: RunStatus, calls: Vec<ToolCall>) -> Run {
    Run {
        id: "run_1".into(),
        thread_id: "thread_1".into(),
        status,
        required_tool_calls: calls,
        last_error: None,
    }
}

#[async_trait]
impl AssistantsApi for ScriptedApi {
    async fn create_assistant(&self, config: &AssistantConfig) -> Result<AssistantHandle> {
        Ok(AssistantHandle {
            id: "asst_1".into(),
            name: config.name.clone(),
            model: config.model.to_string(),
        })
    }

    async fn create_thread(&self) -> Result<ThreadHandle> {
        if self.fail_threads {
            bail!("OpenAI create_thread failed (503): upstream unavailable");
        }
        Ok(ThreadHandle {
            id: "thread_1".into(),
        })
    }

    async fn add_message(&self, thread_id: &str, content: &str) -> Result<()> {
        self.messages
            .lock()
            .unwrap()
            .push((thread_id.to_string(), content.to_string()));
        Ok(())
    }

    async fn create_run(&self, _thread_id: &str, _assistant_id: &str) -> Result<Run> {
        self.next_run()
    }

    async fn retrieve_run(&self, _thread_id: &str, _run_id: &str) -> Result<Run> {
        self.next_run()
    }

    async fn submit_tool_outputs(
        &self,
        _thread_id: &str,
        _run_id: &str,
        outputs: &[ToolResult],
    ) -> Result<Run> {
        self.submitted.lock().unwrap().push(outputs.to_vec());
        self.next_run()
    }

    async fn latest_assistant_message(&self, _thread_id: &str) -> Result<Option<String>> {
        Ok(Some(self.reply.clone()))
    }
}

pub struct Harness {
    pub api: Arc<ScriptedApi>,
    pub solana: Arc<FakeSolana>,
    pub notifier: Arc<FakeNotifier>,
    pub db: SharedDatabase,
    pub state: Arc<AppState>,
}

pub fn registry(solana: Arc<FakeSolana>, notifier: Arc<FakeNotifier>) -> ToolRegistry {
    let ctx = ToolContext {
        solana,
        images: Arc::new(FakeImages),
        notifier,
    };
    build_registry(&ctx).unwrap()
}

pub fn harness(api: ScriptedApi, development: bool) -> Harness {
    harness_with_limiter(api, development, RateLimiter::new(1_000, Duration::from_secs(900)))
}

pub fn harness_with_limiter(api: ScriptedApi, development: bool, limiter: RateLimiter) -> Harness {
    let api = Arc::new(api);
    let solana = Arc::new(FakeSolana::default());
    let notifier = Arc::new(FakeNotifier::default());
    let db: SharedDatabase = Arc::new(tokio::sync::Mutex::new(Database::open_memory().unwrap()));

    let state = Arc::new(AppState {
        api: api.clone(),
        registry: Arc::new(registry(solana.clone(), notifier.clone())),
        assistant_id: "asst_1".into(),
        db: db.clone(),
        poll: PollSettings {
            interval: Duration::from_millis(10),
            timeout: Duration::from_secs(1),
        },
        sleeper: Arc::new(InstantSleeper),
        limiter: Arc::new(limiter),
        development,
    });

    Harness {
        api,
        solana,
        notifier,
        db,
        state,
    }
}
