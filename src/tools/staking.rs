use crate::solana::{ChainAction, SolanaAgent};
use crate::tools::args::positive_arg;
use crate::tools::{Tool, ToolError};
use crate::types::ToolCategory;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

fn amount_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "amount": { "type": "number", "description": description }
        },
        "required": ["amount"]
    })
}

pub struct StakeSol {
    solana: Arc<dyn SolanaAgent>,
}

impl StakeSol {
    pub fn new(solana: Arc<dyn SolanaAgent>) -> Self {
        Self { solana }
    }
}

#[async_trait]
impl Tool for StakeSol {
    fn name(&self) -> &str {
        "stake_sol"
    }

    fn description(&self) -> &str {
        "Stake SOL for liquid staking rewards."
    }

    fn parameters_schema(&self) -> Value {
        amount_schema("Amount of SOL to stake")
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Staking
    }

    async fn execute(&self, args: &Value) -> Result<String, ToolError> {
        let amount = positive_arg(args, "amount")?;
        let receipt = self.solana.submit(ChainAction::StakeSol { amount }).await?;
        Ok(format!("Staked {} SOL. Signature: {}", amount, receipt.signature))
    }
}

pub struct StakeWithJup {
    solana: Arc<dyn SolanaAgent>,
}

impl StakeWithJup {
    pub fn new(solana: Arc<dyn SolanaAgent>) -> Self {
        Self { solana }
    }
}

#[async_trait]
impl Tool for StakeWithJup {
    fn name(&self) -> &str {
        "stake_with_jup"
    }

    fn description(&self) -> &str {
        "Stake SOL with Jupiter to receive jupSOL."
    }

    fn parameters_schema(&self) -> Value {
        amount_schema("Amount of SOL to stake")
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Staking
    }

    async fn execute(&self, args: &Value) -> Result<String, ToolError> {
        let amount = positive_arg(args, "amount")?;
        let receipt = self
            .solana
            .submit(ChainAction::StakeWithJup { amount })
            .await?;
        Ok(format!(
            "Staked {} SOL for jupSOL. Signature: {}",
            amount, receipt.signature
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ServiceError;
    use crate::tools::testing::FakeSolana;
    use crate::tools::ToolErrorKind;

    #[tokio::test]
    async fn stake_routes_to_matching_action() {
        let fake = Arc::new(FakeSolana::default());
        StakeSol::new(fake.clone())
            .execute(&json!({"amount": 1}))
            .await
            .unwrap();
        StakeWithJup::new(fake.clone())
            .execute(&json!({"amount": 2}))
            .await
            .unwrap();
        assert_eq!(
            fake.submitted(),
            vec![
                ChainAction::StakeSol { amount: 1.0 },
                ChainAction::StakeWithJup { amount: 2.0 }
            ]
        );
    }

    #[tokio::test]
    async fn gateway_failure_is_network_error() {
        let fake = FakeSolana::failing(ServiceError::Network("connection refused".into()));
        let err = StakeSol::new(Arc::new(fake))
            .execute(&json!({"amount": 1}))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::Network);
        assert!(err.message.contains("connection refused"));
    }
}
