pub mod client;
pub mod images;

pub use client::{AssistantsApi, OpenAiClient};
pub use images::ImageGenerator;
