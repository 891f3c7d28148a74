//! One conversation thread with the remote assistant.
//!
//! A user turn adds the message, starts a run and polls it. When the run asks
//! for tool calls they are dispatched through the registry in the order given
//! and all outputs are submitted together; the turn ends when the run
//! completes and the newest assistant message is read.

use crate::assistant::{Sleeper, TokioSleeper};
use crate::config::AgentConfig;
use crate::openai::AssistantsApi;
use crate::state::SharedDatabase;
use crate::tools::ToolRegistry;
use crate::types::*;
use anyhow::{bail, Result};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// How runs are polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollSettings {
    pub fn from_config(config: &AgentConfig) -> Self {
        Self {
            interval: Duration::from_millis(config.run_poll_interval_ms.max(1)),
            timeout: Duration::from_secs(config.run_timeout_secs),
        }
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            timeout: Duration::from_secs(120),
        }
    }
}

pub struct Conversation {
    api: Arc<dyn AssistantsApi>,
    registry: Arc<ToolRegistry>,
    assistant_id: String,
    thread_id: String,
    state: ConversationState,
    db: Option<SharedDatabase>,
    sleeper: Arc<dyn Sleeper>,
    poll: PollSettings,
}

impl Conversation {
    /// Open a new remote thread.
    pub async fn start(
        api: Arc<dyn AssistantsApi>,
        registry: Arc<ToolRegistry>,
        assistant_id: &str,
    ) -> Result<Self> {
        let thread = api.create_thread().await?;
        info!("Created thread {}", thread.id);
        Ok(Self::resume(api, registry, assistant_id, &thread.id))
    }

    /// Continue an existing remote thread.
    pub fn resume(
        api: Arc<dyn AssistantsApi>,
        registry: Arc<ToolRegistry>,
        assistant_id: &str,
        thread_id: &str,
    ) -> Self {
        Self {
            api,
            registry,
            assistant_id: assistant_id.to_string(),
            thread_id: thread_id.to_string(),
            state: ConversationState::Created,
            db: None,
            sleeper: Arc::new(TokioSleeper),
            poll: PollSettings::default(),
        }
    }

    /// Record every tool call in the audit table.
    pub fn with_database(mut self, db: SharedDatabase) -> Self {
        self.db = Some(db);
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_polling(mut self, poll: PollSettings) -> Self {
        self.poll = poll;
        self
    }

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    /// Send a user message and return the assistant's reply.
    ///
    /// A failed, cancelled or expired run is an error for this turn only.
    pub async fn send(&mut self, text: &str) -> Result<String> {
        self.api.add_message(&self.thread_id, text).await?;
        let mut run = self.api.create_run(&self.thread_id, &self.assistant_id).await?;
        debug!("Run {} started on thread {}", run.id, self.thread_id);
        self.transition(ConversationState::AwaitingModelResponse);

        let mut waited = Duration::ZERO;
        loop {
            match run.status {
                RunStatus::RequiresAction => {
                    self.transition(ConversationState::ToolCallRequested);
                    let outputs = self.dispatch(&run.required_tool_calls).await;
                    run = self
                        .api
                        .submit_tool_outputs(&self.thread_id, &run.id, &outputs)
                        .await?;
                    self.transition(ConversationState::ToolExecuted);
                    self.transition(ConversationState::AwaitingModelResponse);
                }
                RunStatus::Completed => {
                    let reply = self
                        .api
                        .latest_assistant_message(&self.thread_id)
                        .await?
                        .unwrap_or_default();
                    self.transition(ConversationState::Completed);
                    return Ok(reply);
                }
                status if status.is_terminal() => {
                    self.transition(ConversationState::Completed);
                    let reason = run.last_error.as_deref().unwrap_or("no error details");
                    warn!("Run {} ended with status {}: {}", run.id, status, reason);
                    bail!("Assistant run {}: {}", status, reason);
                }
                _ => {
                    if waited >= self.poll.timeout {
                        self.transition(ConversationState::Completed);
                        bail!(
                            "Assistant run {} did not finish within {}s",
                            run.id,
                            self.poll.timeout.as_secs()
                        );
                    }
                    self.sleeper.sleep(self.poll.interval).await;
                    waited += self.poll.interval;
                    run = self.api.retrieve_run(&self.thread_id, &run.id).await?;
                }
            }
        }
    }

    fn transition(&mut self, next: ConversationState) {
        debug!("Thread {}: {} -> {}", self.thread_id, self.state, next);
        self.state = next;
    }

    /// Run each requested tool in order. Unknown tools and failures become
    /// unsuccessful outputs, never errors.
    async fn dispatch(&self, calls: &[ToolCall]) -> Vec<ToolResult> {
        let mut outputs = Vec::with_capacity(calls.len());
        for call in calls {
            let result = self.registry.execute(call).await;
            self.audit(call, &result).await;
            outputs.push(result);
        }
        outputs
    }

    async fn audit(&self, call: &ToolCall, result: &ToolResult) {
        let Some(db) = &self.db else {
            return;
        };
        let record = ToolCallRecord {
            id: ulid::Ulid::new().to_string(),
            thread_id: Some(self.thread_id.clone()),
            tool_name: call.name.clone(),
            arguments: call.arguments.clone(),
            output: result.output.clone(),
            success: result.success,
            created_at: Utc::now(),
        };
        if let Err(e) = db.lock().await.log_tool_call(&record) {
            error!("Failed to record tool call {}: {}", call.name, e);
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::assistant::AssistantConfig;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Plays back a fixed sequence of run snapshots.
    #[derive(Default)]
    pub(crate) struct ScriptedApi {
        pub runs: Mutex<VecDeque<Run>>,
        pub messages: Mutex<Vec<String>>,
        pub submitted: Mutex<Vec<Vec<ToolResult>>>,
        pub reply: Mutex<Option<String>>,
    }

    pub(crate) fn run(status: RunStatus, calls: Vec<ToolCall>) -> Run {
        Run {
            id: "run_1".into(),
            thread_id: "thread_1".into(),
            status,
            required_tool_calls: calls,
            last_error: None,
        }
    }

    impl ScriptedApi {
        pub fn with_runs(runs: Vec<Run>, reply: &str) -> Self {
            Self {
                runs: Mutex::new(runs.into()),
                reply: Mutex::new(Some(reply.to_string())),
                ..Default::default()
            }
        }

        pub fn push_runs(&self, runs: Vec<Run>) {
            self.runs.lock().unwrap().extend(runs);
        }

        fn next_run(&self) -> Result<Run> {
            match self.runs.lock().unwrap().pop_front() {
                Some(run) => Ok(run),
                None => bail!("no scripted run left"),
            }
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
            Ok(ThreadHandle {
                id: "thread_1".into(),
            })
        }

        async fn add_message(&self, _thread_id: &str, content: &str) -> Result<()> {
            self.messages.lock().unwrap().push(content.to_string());
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
            Ok(self.reply.lock().unwrap().clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{run, ScriptedApi};
    use super::*;
    use crate::assistant::retry::testing::RecordingSleeper;
    use crate::state::Database;
    use crate::tools::{build_registry, testing as tool_testing};
    use serde_json::json;

    fn call(id: &str, name: &str, arguments: serde_json::Value) -> ToolCall {
        ToolCall {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    fn conversation(api: Arc<ScriptedApi>, sleeper: Arc<RecordingSleeper>) -> Conversation {
        let registry = Arc::new(build_registry(&tool_testing::context()).unwrap());
        Conversation::resume(api, registry, "asst_1", "thread_1").with_sleeper(sleeper)
    }

    #[tokio::test]
    async fn plain_reply_after_polling() {
        let api = Arc::new(ScriptedApi::with_runs(
            vec![
                run(RunStatus::Queued, vec![]),
                run(RunStatus::InProgress, vec![]),
                run(RunStatus::Completed, vec![]),
            ],
            "gm!",
        ));
        let sleeper = Arc::new(RecordingSleeper::default());
        let mut convo = conversation(api.clone(), sleeper.clone());
        assert_eq!(convo.state(), ConversationState::Created);

        let reply = convo.send("hello").await.unwrap();
        assert_eq!(reply, "gm!");
        assert_eq!(convo.state(), ConversationState::Completed);
        assert_eq!(*api.messages.lock().unwrap(), vec!["hello"]);
        assert_eq!(sleeper.delays_ms(), vec![1000, 1000]);
    }

    #[tokio::test]
    async fn tool_calls_dispatched_in_order_and_submitted_together() {
        let api = Arc::new(ScriptedApi::with_runs(
            vec![
                run(
                    RunStatus::RequiresAction,
                    vec![
                        call("call_a", "get_wallet_address", json!({})),
                        call("call_b", "get_balance", json!({})),
                    ],
                ),
                run(RunStatus::Completed, vec![]),
            ],
            "You have 2.5 SOL",
        ));
        let mut convo = conversation(api.clone(), Arc::new(RecordingSleeper::default()));

        let reply = convo.send("what's my balance?").await.unwrap();
        assert_eq!(reply, "You have 2.5 SOL");

        let submitted = api.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        let ids: Vec<&str> = submitted[0].iter().map(|r| r.tool_call_id.as_str()).collect();
        assert_eq!(ids, vec!["call_a", "call_b"]);
        assert_eq!(submitted[0][1].output, "2.5 SOL");
        assert!(submitted[0].iter().all(|r| r.success));
    }

    #[tokio::test]
    async fn consecutive_tool_rounds_in_one_turn() {
        let api = Arc::new(ScriptedApi::with_runs(
            vec![
                run(
                    RunStatus::RequiresAction,
                    vec![call("call_1", "get_wallet_address", json!({}))],
                ),
                run(
                    RunStatus::RequiresAction,
                    vec![call("call_2", "get_balance", json!({}))],
                ),
                run(RunStatus::Completed, vec![]),
            ],
            "Your wallet holds 2.5 SOL",
        ));
        let mut convo = conversation(api.clone(), Arc::new(RecordingSleeper::default()));

        let reply = convo.send("address and balance please").await.unwrap();
        assert_eq!(reply, "Your wallet holds 2.5 SOL");
        assert_eq!(convo.state(), ConversationState::Completed);

        let submitted = api.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 2);
        assert_eq!(submitted[0][0].tool_call_id, "call_1");
        assert_eq!(submitted[0][0].output, tool_testing::WALLET);
        assert_eq!(submitted[1][0].tool_call_id, "call_2");
        assert_eq!(submitted[1][0].output, "2.5 SOL");
    }

    #[tokio::test]
    async fn unparseable_model_arguments_never_reach_the_chain() {
        let solana = Arc::new(tool_testing::FakeSolana::default());
        let ctx = crate::tools::ToolContext {
            solana: solana.clone(),
            ..tool_testing::context()
        };
        let registry = Arc::new(build_registry(&ctx).unwrap());
        let api = Arc::new(ScriptedApi::with_runs(
            vec![
                run(
                    RunStatus::RequiresAction,
                    vec![call(
                        "call_1",
                        "request_faucet_funds",
                        serde_json::Value::String(r#"{"amount": 0.1,"#.into()),
                    )],
                ),
                run(RunStatus::Completed, vec![]),
            ],
            "That request was malformed.",
        ));
        let mut convo = Conversation::resume(api.clone(), registry, "asst_1", "thread_1")
            .with_sleeper(Arc::new(RecordingSleeper::default()));

        convo.send("airdrop me a little").await.unwrap();

        let submitted = api.submitted.lock().unwrap();
        let result = &submitted[0][0];
        assert!(!result.success);
        assert!(result.output.starts_with("Error (validation)"));
        assert!(solana.airdrops.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_tool_is_reported_and_conversation_continues() {
        let api = Arc::new(ScriptedApi::with_runs(
            vec![
                run(
                    RunStatus::RequiresAction,
                    vec![call("call_x", "nonexistent_tool", json!({}))],
                ),
                run(RunStatus::Completed, vec![]),
            ],
            "Sorry, that tool is unavailable.",
        ));
        let mut convo = conversation(api.clone(), Arc::new(RecordingSleeper::default()));

        let reply = convo.send("do the thing").await.unwrap();
        assert_eq!(reply, "Sorry, that tool is unavailable.");
        {
            let submitted = api.submitted.lock().unwrap();
            let result = &submitted[0][0];
            assert!(!result.success);
            assert!(result.output.contains("'nonexistent_tool' is not available"));
        }

        api.push_runs(vec![run(RunStatus::Completed, vec![])]);
        assert!(convo.send("thanks").await.is_ok());
        assert_eq!(api.messages.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn failed_run_errors_only_that_turn() {
        let mut failed = run(RunStatus::Failed, vec![]);
        failed.last_error = Some("rate limit exceeded".into());
        let api = Arc::new(ScriptedApi::with_runs(vec![failed], "ok"));
        let mut convo = conversation(api.clone(), Arc::new(RecordingSleeper::default()));

        let err = convo.send("hi").await.unwrap_err();
        assert!(err.to_string().contains("rate limit exceeded"));

        api.push_runs(vec![run(RunStatus::Completed, vec![])]);
        assert_eq!(convo.send("hi again").await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn polling_gives_up_after_timeout() {
        let runs = (0..10).map(|_| run(RunStatus::InProgress, vec![])).collect();
        let api = Arc::new(ScriptedApi::with_runs(runs, "never"));
        let sleeper = Arc::new(RecordingSleeper::default());
        let mut convo = conversation(api, sleeper.clone()).with_polling(PollSettings {
            interval: Duration::from_millis(500),
            timeout: Duration::from_secs(2),
        });

        let err = convo.send("slow").await.unwrap_err();
        assert!(err.to_string().contains("did not finish within 2s"));
        assert_eq!(sleeper.delays_ms(), vec![500, 500, 500, 500]);
    }

    #[tokio::test]
    async fn tool_calls_are_audited_when_database_attached() {
        let api = Arc::new(ScriptedApi::with_runs(
            vec![
                run(
                    RunStatus::RequiresAction,
                    vec![
                        call("call_1", "get_tps", json!({})),
                        call("call_2", "nonexistent_tool", json!({"x": 1})),
                    ],
                ),
                run(RunStatus::Completed, vec![]),
            ],
            "done",
        ));
        let db: SharedDatabase = Arc::new(tokio::sync::Mutex::new(Database::open_memory().unwrap()));
        let mut convo = conversation(api, Arc::new(RecordingSleeper::default()))
            .with_database(db.clone());

        convo.send("tps?").await.unwrap();

        let records = db.lock().await.tool_calls_for_thread("thread_1").unwrap();
        assert_eq!(records.len(), 2);
        let names: Vec<&str> = records.iter().map(|r| r.tool_name.as_str()).collect();
        assert!(names.contains(&"get_tps"));
        assert!(records.iter().any(|r| !r.success));
    }
}
