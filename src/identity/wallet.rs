//! Solana wallet generation and management.
//!
//! Generates or loads an ed25519 keypair, derives the base58 Solana address,
//! and persists the keypair to `~/.solana-agent/wallet.json` in the
//! `solana-keygen` format (a JSON array of 64 bytes) with strict file permissions.

use anyhow::{bail, Context, Result};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use std::path::{Path, PathBuf};
use tracing::info;

/// An in-memory wallet handle.
#[derive(Debug, Clone)]
pub struct Wallet {
    signing_key: SigningKey,
    /// Base58-encoded public key.
    pub address: String,
    /// Path to the keypair file on disk.
    pub path: PathBuf,
}

impl Wallet {
    /// Load an existing wallet or generate a new one at the given path.
    pub fn load_or_create(wallet_path: &Path) -> Result<Self> {
        if wallet_path.exists() {
            Self::load(wallet_path)
        } else {
            Self::generate(wallet_path)
        }
    }

    /// Load a keypair file from disk.
    pub fn load(wallet_path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(wallet_path).context("Failed to read wallet file")?;
        let bytes: Vec<u8> =
            serde_json::from_str(&contents).context("Failed to parse wallet JSON")?;

        let signing_key = signing_key_from_keypair_bytes(&bytes)?;
        let address = encode_address(&signing_key);

        info!("Loaded wallet: {}", address);

        Ok(Self {
            signing_key,
            address,
            path: wallet_path.to_path_buf(),
        })
    }

    /// Generate a new random keypair and persist it.
    pub fn generate(wallet_path: &Path) -> Result<Self> {
        let signing_key = SigningKey::generate(&mut OsRng);
        let address = encode_address(&signing_key);

        if let Some(parent) = wallet_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string(&signing_key.to_keypair_bytes().to_vec())?;
        std::fs::write(wallet_path, &json).context("Failed to write wallet file")?;

        // Restrict permissions (Unix only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(wallet_path, std::fs::Permissions::from_mode(0o600))?;
        }

        info!("Generated new wallet: {}", address);

        Ok(Self {
            signing_key,
            address,
            path: wallet_path.to_path_buf(),
        })
    }

    /// Raw 32-byte public key.
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Base58 ed25519 signature over `message`.
    pub fn sign(&self, message: &[u8]) -> String {
        bs58::encode(self.signing_key.sign(message).to_bytes()).into_string()
    }
}

/// Check a base58 signature produced by [`Wallet::sign`] against a base58 address.
pub fn verify_signature(address: &str, message: &[u8], signature: &str) -> bool {
    let Ok(key) = bs58::decode(address).into_vec() else {
        return false;
    };
    let Ok(key) = <[u8; 32]>::try_from(key.as_slice()) else {
        return false;
    };
    let Ok(key) = VerifyingKey::from_bytes(&key) else {
        return false;
    };
    let Ok(sig) = bs58::decode(signature).into_vec() else {
        return false;
    };
    let Ok(sig) = Signature::from_slice(&sig) else {
        return false;
    };
    key.verify(message, &sig).is_ok()
}

/// Rebuild a signing key from a 64-byte `secret || public` keypair, checking
/// that the stored public half matches the secret.
fn signing_key_from_keypair_bytes(bytes: &[u8]) -> Result<SigningKey> {
    let keypair: [u8; 64] = match bytes.try_into() {
        Ok(k) => k,
        Err(_) => bail!("Keypair must be 64 bytes, got {}", bytes.len()),
    };
    SigningKey::from_keypair_bytes(&keypair).context("Keypair public key does not match secret")
}

fn encode_address(signing_key: &SigningKey) -> String {
    bs58::encode(signing_key.verifying_key().to_bytes()).into_string()
}
