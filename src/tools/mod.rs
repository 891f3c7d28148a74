//! Assistant tools: definitions, registry, validation and the handlers.

pub mod args;
pub mod defi;
pub mod error;
pub mod nft;
pub mod pools;
pub mod registry;
pub mod schema;
pub mod staking;
pub mod token;
pub mod traits;
pub mod utility;
pub mod wallet;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{ToolError, ToolErrorKind};
pub use registry::{RegistryError, ToolRegistry};
pub use traits::{Tool, ToolDefinition};

use crate::notify::Notifier;
use crate::openai::ImageGenerator;
use crate::solana::SolanaAgent;
use std::sync::Arc;

/// External collaborators the handlers forward to.
#[derive(Clone)]
pub struct ToolContext {
    pub solana: Arc<dyn SolanaAgent>,
    pub images: Arc<dyn ImageGenerator>,
    pub notifier: Arc<dyn Notifier>,
}

/// Every built-in tool, in the order they are offered to the assistant.
pub fn builtin_tools(ctx: &ToolContext) -> Vec<Arc<dyn Tool>> {
    let s = &ctx.solana;
    vec![
        Arc::new(wallet::GetBalance::new(s.clone())),
        Arc::new(wallet::GetWalletAddress::new(s.clone())),
        Arc::new(wallet::RequestFaucetFunds::new(s.clone())),
        Arc::new(wallet::SendTransfer::new(s.clone())),
        Arc::new(nft::CreateNftCollection::new(s.clone())),
        Arc::new(token::DeployToken::new(s.clone())),
        Arc::new(nft::MintNft::new(s.clone())),
        Arc::new(staking::StakeSol::new(s.clone())),
        Arc::new(defi::TradeTokens::new(s.clone())),
        Arc::new(nft::CreateImage::new(ctx.images.clone())),
        Arc::new(utility::GetTps::new(s.clone())),
        Arc::new(token::LaunchPumpfunToken::new(s.clone())),
        Arc::new(defi::LendAsset::new(s.clone())),
        Arc::new(defi::PythFetchPrice::new(s.clone())),
        Arc::new(token::GetTokenData::new(s.clone())),
        Arc::new(pools::RaydiumCreateAmmV4::new(s.clone())),
        Arc::new(pools::RaydiumCreateClmm::new(s.clone())),
        Arc::new(pools::RaydiumCreateCpmm::new(s.clone())),
        Arc::new(utility::RegisterDomain::new(s.clone())),
        Arc::new(staking::StakeWithJup::new(s.clone())),
        Arc::new(pools::CreateOrcaWhirlpool::new(s.clone())),
        Arc::new(utility::TelegramNotify::new(ctx.notifier.clone())),
    ]
}

/// Build the registry of built-in tools.
pub fn build_registry(ctx: &ToolContext) -> Result<ToolRegistry, RegistryError> {
    ToolRegistry::new(builtin_tools(ctx))
}
