//! Solana identity: keypair storage and address derivation.

pub mod wallet;

pub use wallet::{verify_signature, Wallet};
