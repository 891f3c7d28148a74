pub mod system_prompt;

pub use system_prompt::build_system_prompt;
