//! NFT tools: collections, minting and artwork generation.

use crate::openai::images::IMAGE_SIZES;
use crate::openai::ImageGenerator;
use crate::solana::{ChainAction, NftCreator, SolanaAgent, TxReceipt};
use crate::tools::args::{address_arg, bps, opt_address, opt_str, opt_u64, str_arg};
use crate::tools::{Tool, ToolError};
use crate::types::ToolCategory;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

const MAX_IMAGES: u64 = 4;

fn created_address(receipt: &TxReceipt) -> &str {
    receipt.address.as_deref().unwrap_or("unknown address")
}

pub struct CreateNftCollection {
    solana: Arc<dyn SolanaAgent>,
}

impl CreateNftCollection {
    pub fn new(solana: Arc<dyn SolanaAgent>) -> Self {
        Self { solana }
    }
}

/// Parse the optional `creators` array. Shares must add up to 100.
fn parse_creators(args: &Value) -> Result<Vec<NftCreator>, ToolError> {
    let Some(list) = args.get("creators").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    let mut creators = Vec::with_capacity(list.len());
    for entry in list {
        let address = address_arg(entry, "address")?;
        let percentage = opt_u64(entry, "percentage")
            .filter(|p| *p <= 100)
            .ok_or_else(|| {
                ToolError::validation("creator 'percentage' must be an integer between 0 and 100")
            })?;
        creators.push(NftCreator {
            address,
            percentage: percentage as u8,
        });
    }

    let total: u32 = creators.iter().map(|c| c.percentage as u32).sum();
    if !creators.is_empty() && total != 100 {
        return Err(ToolError::validation(format!(
            "creator percentages must sum to 100, got {}",
            total
        )));
    }
    Ok(creators)
}

#[async_trait]
impl Tool for CreateNftCollection {
    fn name(&self) -> &str {
        "create_nft_collection"
    }

    fn description(&self) -> &str {
        "Create a new NFT collection with on-chain metadata and optional royalties."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Collection name" },
                "uri": { "type": "string", "description": "Metadata JSON URI" },
                "royalty_basis_points": {
                    "type": "integer",
                    "description": "Royalty in basis points (500 = 5%)"
                },
                "creators": {
                    "type": "array",
                    "description": "Royalty recipients",
                    "items": {
                        "type": "object",
                        "properties": {
                            "address": { "type": "string" },
                            "percentage": { "type": "integer" }
                        },
                        "required": ["address", "percentage"]
                    }
                }
            },
            "required": ["name", "uri"]
        })
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Nft
    }

    async fn execute(&self, args: &Value) -> Result<String, ToolError> {
        let name = str_arg(args, "name")?.to_string();
        let uri = str_arg(args, "uri")?.to_string();
        let royalty_basis_points = opt_u64(args, "royalty_basis_points")
            .map(|v| bps("royalty_basis_points", v))
            .transpose()?;
        let creators = parse_creators(args)?;

        let receipt = self
            .solana
            .submit(ChainAction::CreateNftCollection {
                name: name.clone(),
                uri,
                royalty_basis_points,
                creators,
            })
            .await?;

        Ok(format!(
            "Created NFT collection '{}' at {}. Signature: {}",
            name,
            created_address(&receipt),
            receipt.signature
        ))
    }
}

pub struct MintNft {
    solana: Arc<dyn SolanaAgent>,
}

impl MintNft {
    pub fn new(solana: Arc<dyn SolanaAgent>) -> Self {
        Self { solana }
    }
}

#[async_trait]
impl Tool for MintNft {
    fn name(&self) -> &str {
        "mint_nft"
    }

    fn description(&self) -> &str {
        "Mint an NFT into an existing collection, optionally to another recipient."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "collection_mint": {
                    "type": "string",
                    "description": "Address of the collection"
                },
                "name": { "type": "string", "description": "NFT name" },
                "uri": { "type": "string", "description": "Metadata JSON URI" },
                "recipient": {
                    "type": "string",
                    "description": "Recipient address (defaults to the agent's wallet)"
                }
            },
            "required": ["collection_mint", "name", "uri"]
        })
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Nft
    }

    async fn execute(&self, args: &Value) -> Result<String, ToolError> {
        let collection_mint = address_arg(args, "collection_mint")?;
        let name = str_arg(args, "name")?.to_string();
        let uri = str_arg(args, "uri")?.to_string();
        let recipient = opt_address(args, "recipient")?;

        let receipt = self
            .solana
            .submit(ChainAction::MintNft {
                collection_mint: collection_mint.clone(),
                name: name.clone(),
                uri,
                recipient,
            })
            .await?;

        Ok(format!(
            "Minted NFT '{}' at {} in collection {}. Signature: {}",
            name,
            created_address(&receipt),
            collection_mint,
            receipt.signature
        ))
    }
}

pub struct CreateImage {
    images: Arc<dyn ImageGenerator>,
}

impl CreateImage {
    pub fn new(images: Arc<dyn ImageGenerator>) -> Self {
        Self { images }
    }
}

#[async_trait]
impl Tool for CreateImage {
    fn name(&self) -> &str {
        "create_image"
    }

    fn description(&self) -> &str {
        "Generate images from a text prompt, e.g. NFT artwork. Returns the image URLs."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "prompt": { "type": "string", "description": "Image description" },
                "size": {
                    "type": "string",
                    "enum": IMAGE_SIZES,
                    "description": "Image size (default 1024x1024)"
                },
                "n": {
                    "type": "integer",
                    "description": "Number of images, 1 to 4 (default 1)"
                }
            },
            "required": ["prompt"]
        })
    }

    fn category(&self) -> ToolCategory {
        ToolCategory::Nft
    }

    async fn execute(&self, args: &Value) -> Result<String, ToolError> {
        let prompt = str_arg(args, "prompt")?;
        let size = opt_str(args, "size").unwrap_or("1024x1024");
        if !IMAGE_SIZES.contains(&size) {
            return Err(ToolError::validation(format!(
                "size must be one of {}",
                IMAGE_SIZES.join(", ")
            )));
        }
        let n = opt_u64(args, "n").unwrap_or(1);
        if !(1..=MAX_IMAGES).contains(&n) {
            return Err(ToolError::validation(format!(
                "n must be between 1 and {}, got {}",
                MAX_IMAGES, n
            )));
        }

        let urls = self.images.generate(prompt, size, n as u8).await?;
        Ok(format!("Generated {} image(s): {}", urls.len(), urls.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{FakeImages, FakeSolana, MINT_A, MINT_B};
    use crate::tools::ToolErrorKind;

    #[tokio::test]
    async fn collection_with_creators() {
        let fake = Arc::new(FakeSolana::default());
        let tool = CreateNftCollection::new(fake.clone());
        let out = tool
            .execute(&json!({
                "name": "Degens",
                "uri": "https://meta.example/c.json",
                "royalty_basis_points": 500,
                "creators": [
                    {"address": MINT_A, "percentage": 60},
                    {"address": MINT_B, "percentage": 40}
                ]
            }))
            .await
            .unwrap();
        assert!(out.starts_with("Created NFT collection 'Degens' at NewAccount1111"));

        match &fake.submitted()[0] {
            ChainAction::CreateNftCollection {
                royalty_basis_points,
                creators,
                ..
            } => {
                assert_eq!(*royalty_basis_points, Some(500));
                assert_eq!(creators.len(), 2);
            }
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[tokio::test]
    async fn creator_shares_must_total_one_hundred() {
        let fake = Arc::new(FakeSolana::default());
        let tool = CreateNftCollection::new(fake.clone());
        let err = tool
            .execute(&json!({
                "name": "x",
                "uri": "y",
                "creators": [{"address": MINT_A, "percentage": 50}]
            }))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::Validation);
        assert!(err.message.contains("sum to 100"));
        assert!(fake.submitted().is_empty());
    }

    #[tokio::test]
    async fn royalty_above_ten_thousand_bps_is_rejected() {
        let tool = CreateNftCollection::new(Arc::new(FakeSolana::default()));
        let err = tool
            .execute(&json!({"name": "x", "uri": "y", "royalty_basis_points": 20000}))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::Validation);
    }

    #[tokio::test]
    async fn mint_into_collection() {
        let fake = Arc::new(FakeSolana::default());
        let tool = MintNft::new(fake.clone());
        let out = tool
            .execute(&json!({"collection_mint": MINT_A, "name": "#1", "uri": "u"}))
            .await
            .unwrap();
        assert!(out.contains(MINT_A));
        assert_eq!(fake.submitted()[0].name(), "mint_nft");
    }

    #[tokio::test]
    async fn image_defaults_and_bounds() {
        let images = Arc::new(FakeImages::default());
        let tool = CreateImage::new(images.clone());

        let out = tool.execute(&json!({"prompt": "a cat"})).await.unwrap();
        assert_eq!(out, "Generated 1 image(s): https://img.example/0.png");
        assert_eq!(
            images.prompts.lock().unwrap()[0],
            ("a cat".to_string(), "1024x1024".to_string(), 1)
        );

        let err = tool.execute(&json!({"prompt": "a cat", "n": 5})).await.unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::Validation);
        let err = tool
            .execute(&json!({"prompt": "a cat", "size": "64x64"}))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::Validation);
    }
}
