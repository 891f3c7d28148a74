//! Solana agent: a conversational assistant that operates a Solana wallet.
//!
//! The remote assistant is created with the registered tool definitions,
//! then driven over threads from the terminal or the HTTP API. Tool calls
//! are executed locally against the chain and reported back to the run.

pub mod agent;
pub mod assistant;
pub mod chat;
pub mod config;
pub mod errors;
pub mod identity;
pub mod notify;
pub mod openai;
pub mod server;
pub mod solana;
pub mod state;
pub mod tools;
pub mod types;
