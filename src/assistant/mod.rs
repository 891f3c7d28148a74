pub mod bootstrap;
pub mod retry;

pub use bootstrap::{
    assistant_config, create_assistant, validate_tools, AssistantConfig, AssistantModel,
    AssistantOptions, BootstrapError, ResolvedOptions,
};
pub use retry::{backoff_delay, RetryMachine, RetryState, Sleeper, TokioSleeper};
