//! CLI for driving the NFT bundle auction system.
//!
//! This binary provides commands for:
//! - Creating bundles and escrowing assets
//! - Issuing claim tokens and bidding on items
//! - Unlock voting, claims, and proceeds redemption
//! - Admin helpers for the mock chain (funding, clock, asset minting)

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use bundle_client::rpc::{CreateBundleRequest, DepositRequest};
use bundle_client::{format_address, parse_address, BundleRpcClient};

#[derive(Parser)]
#[command(name = "bundle-cli")]
#[command(about = "CLI for the NFT bundle auction system")]
struct Cli {
    /// Mock chain RPC endpoint
    #[arg(long, default_value = "http://127.0.0.1:9944")]
    rpc: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new bundle
    CreateBundle {
        /// Issuer address (hex)
        #[arg(long)]
        sender: String,

        /// Fixed claim-token supply
        #[arg(long)]
        total_supply: u128,

        /// Claim-token precision
        #[arg(long, default_value = "18")]
        decimals: u8,

        /// Claim-token name
        #[arg(long)]
        name: String,

        /// Claim-token ticker symbol
        #[arg(long)]
        symbol: String,

        /// Locked votes required to unlock the escrow
        #[arg(long)]
        threshold: u128,

        /// Free-form description
        #[arg(long, default_value = "")]
        description: String,

        /// Protocol fee divisor (optional)
        #[arg(long)]
        fee_divisor: Option<u128>,

        /// Top-bid lock window in seconds (optional)
        #[arg(long)]
        top_bid_lock_secs: Option<u64>,
    },

    /// Escrow assets into a bundle
    Deposit {
        /// Issuer address (hex)
        #[arg(long)]
        sender: String,

        /// Bundle address (hex)
        #[arg(long)]
        bundle: String,

        /// Asset contract address (hex)
        #[arg(long)]
        asset_contract: String,

        /// Token ids (comma-separated)
        #[arg(long)]
        token_ids: String,

        /// Quantities, one per token id (comma-separated; omit for
        /// single-unit contracts)
        #[arg(long)]
        amounts: Option<String>,
    },

    /// Mint the claim token and open the auctions
    Issue {
        #[arg(long)]
        sender: String,

        #[arg(long)]
        bundle: String,
    },

    /// Abandon an inactive bundle, returning its escrow
    Refund {
        #[arg(long)]
        sender: String,

        #[arg(long)]
        bundle: String,

        /// Recipient of the returned items (hex)
        #[arg(long)]
        to: String,
    },

    /// Bid native currency on an item
    Bid {
        #[arg(long)]
        sender: String,

        #[arg(long)]
        bundle: String,

        /// Item index
        #[arg(long)]
        index: u64,

        /// Bid amount in native currency
        #[arg(long)]
        amount: u128,
    },

    /// Withdraw a top bid or collect an outbid refund
    Unbid {
        #[arg(long)]
        sender: String,

        #[arg(long)]
        bundle: String,

        #[arg(long)]
        index: u64,
    },

    /// Claim a won item once the unlock threshold is met
    Claim {
        #[arg(long)]
        sender: String,

        #[arg(long)]
        bundle: String,

        #[arg(long)]
        index: u64,
    },

    /// Lock claim tokens toward the unlock threshold
    ApproveUnlock {
        #[arg(long)]
        sender: String,

        #[arg(long)]
        bundle: String,

        #[arg(long)]
        amount: u128,
    },

    /// Take back locked claim tokens
    UnapproveUnlock {
        #[arg(long)]
        sender: String,

        #[arg(long)]
        bundle: String,

        #[arg(long)]
        amount: u128,
    },

    /// Burn claim tokens for a pro-rata share of the proceeds pool
    Redeem {
        #[arg(long)]
        sender: String,

        #[arg(long)]
        bundle: String,

        /// Liquid tokens to burn on top of anything locked
        #[arg(long)]
        amount: u128,
    },

    /// Transfer claim tokens between holders
    TransferToken {
        #[arg(long)]
        sender: String,

        #[arg(long)]
        bundle: String,

        #[arg(long)]
        to: String,

        #[arg(long)]
        amount: u128,
    },

    /// Set the protocol fee recipient (fee-to setter only)
    SetFeeTo {
        #[arg(long)]
        sender: String,

        /// New recipient (hex); omit to clear
        #[arg(long)]
        fee_to: Option<String>,
    },

    /// List all bundles
    ListBundles,

    /// Get a bundle's immutable parameters
    GetParams {
        #[arg(long)]
        bundle: String,
    },

    /// Get a bundle's ledger snapshot
    GetSummary {
        #[arg(long)]
        bundle: String,
    },

    /// Get a bundle's escrowed items
    GetItems {
        #[arg(long)]
        bundle: String,
    },

    /// Get the standing top bid for an item
    GetTopBid {
        #[arg(long)]
        bundle: String,

        #[arg(long)]
        index: u64,
    },

    /// Get the outbid refund owed to a bidder for an item
    GetRefund {
        #[arg(long)]
        bundle: String,

        #[arg(long)]
        index: u64,

        #[arg(long)]
        bidder: String,
    },

    /// Get a holder's locked claim-token balance
    GetLocked {
        #[arg(long)]
        bundle: String,

        #[arg(long)]
        holder: String,
    },

    /// Get a holder's liquid claim-token balance
    GetTokenBalance {
        #[arg(long)]
        bundle: String,

        #[arg(long)]
        owner: String,
    },

    /// Get an account's native-currency balance
    GetBankBalance {
        #[arg(long)]
        address: String,
    },

    /// Get the full event journal
    GetEvents,

    /// Get current block info
    BlockInfo,

    /// Advance chain time (for testing)
    AdvanceBlock,

    /// Set chain timestamp (for testing)
    SetTimestamp {
        /// Unix timestamp to set
        #[arg(long)]
        timestamp: u64,
    },

    /// Credit native currency to an account (for testing)
    Fund {
        #[arg(long)]
        address: String,

        #[arg(long)]
        amount: u128,
    },

    /// Deploy an asset contract (for testing)
    CreateAssetContract {
        #[arg(long)]
        address: String,

        /// Contract kind: single or multi
        #[arg(long, default_value = "single")]
        kind: String,
    },

    /// Mint a token into an account (for testing)
    MintAsset {
        #[arg(long)]
        contract: String,

        #[arg(long)]
        token_id: u128,

        #[arg(long)]
        to: String,

        /// Quantity, ignored for single-unit contracts
        #[arg(long, default_value = "1")]
        amount: u128,
    },

    /// Approve or revoke an operator for an owner's assets
    SetAssetOperator {
        #[arg(long)]
        contract: String,

        #[arg(long)]
        owner: String,

        #[arg(long)]
        operator: String,

        /// Revoke instead of approve
        #[arg(long)]
        revoke: bool,
    },
}

/// Canonicalize a user-supplied hex address.
fn addr(s: &str) -> Result<String> {
    Ok(format_address(&parse_address(s)?))
}

/// Parse a comma-separated list of numbers.
fn parse_list(s: &str) -> Result<Vec<u128>> {
    s.split(',')
        .map(|part| Ok(part.trim().parse::<u128>()?))
        .collect()
}

async fn create_bundle_cmd(client: &BundleRpcClient, req: CreateBundleRequest) -> Result<()> {
    let bundle = client.create_bundle(req).await?;
    info!("Created bundle {}", bundle);
    println!("Bundle address: {}", bundle);
    Ok(())
}

async fn deposit_cmd(client: &BundleRpcClient, req: DepositRequest) -> Result<()> {
    let count = client.deposit(req).await?;
    println!("Deposit accepted; bundle now holds {} items", count);
    Ok(())
}

async fn list_bundles_cmd(client: &BundleRpcClient) -> Result<()> {
    let bundles = client.list_bundles().await?;

    if bundles.is_empty() {
        println!("No bundles found");
    } else {
        println!("Bundles:");
        for b in bundles {
            println!(
                "  {} - {} ({} items, pool {}, votes {}/{})",
                b.address, b.phase, b.item_count, b.total_bid_amount, b.unlock_votes, b.threshold
            );
        }
    }

    Ok(())
}

async fn get_params_cmd(client: &BundleRpcClient, bundle: &str) -> Result<()> {
    let p = client.params(bundle).await?;

    println!("Bundle {}:", bundle);
    println!("  Token: {} ({}), {} decimals", p.name, p.symbol, p.decimals);
    println!("  Issuer: {}", p.issuer);
    println!("  Supply: {}", p.total_supply);
    println!("  Threshold: {}", p.threshold);
    println!("  Fee divisor: {}", p.fee_divisor);
    println!("  Top-bid lock: {}s", p.top_bid_lock_secs);
    if !p.description.is_empty() {
        println!("  Description: {}", p.description);
    }

    Ok(())
}

async fn get_summary_cmd(client: &BundleRpcClient, bundle: &str) -> Result<()> {
    let s = client.summary(bundle).await?;

    println!("Bundle {}:", s.address);
    println!("  Phase: {}", s.phase);
    println!("  Items: {} ({} claimed)", s.item_count, s.items_claimed);
    println!("  Proceeds pool: {}", s.total_bid_amount);
    println!(
        "  Unlock votes: {}/{}{}",
        s.unlock_votes,
        s.threshold,
        if s.threshold_met { " (met)" } else { "" }
    );

    Ok(())
}

async fn get_items_cmd(client: &BundleRpcClient, bundle: &str) -> Result<()> {
    let items = client.items(bundle).await?;

    if items.is_empty() {
        println!("No items escrowed in {}", bundle);
    } else {
        println!("Items in {}:", bundle);
        for (index, item) in items.iter().enumerate() {
            println!(
                "  [{}] contract {} id {} x{}{}",
                index,
                item.asset_contract,
                item.token_id,
                item.amount,
                if item.claimed { " (claimed)" } else { "" }
            );
        }
    }

    Ok(())
}

async fn get_events_cmd(client: &BundleRpcClient) -> Result<()> {
    let records = client.events().await?;

    if records.is_empty() {
        println!("No events recorded");
    } else {
        for r in records {
            println!("[{}] {} {}", r.height, r.bundle, serde_json::to_string(&r.event)?);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bundle_cli=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let client = BundleRpcClient::connect(&cli.rpc)?;

    match cli.command {
        Commands::CreateBundle {
            sender,
            total_supply,
            decimals,
            name,
            symbol,
            threshold,
            description,
            fee_divisor,
            top_bid_lock_secs,
        } => {
            let req = CreateBundleRequest {
                sender: addr(&sender)?,
                total_supply,
                decimals,
                name,
                symbol,
                threshold,
                description,
                fee_divisor,
                top_bid_lock_secs,
            };
            create_bundle_cmd(&client, req).await?;
        }

        Commands::Deposit {
            sender,
            bundle,
            asset_contract,
            token_ids,
            amounts,
        } => {
            let req = DepositRequest {
                sender: addr(&sender)?,
                bundle: addr(&bundle)?,
                asset_contract: addr(&asset_contract)?,
                token_ids: parse_list(&token_ids)?,
                amounts: amounts
                    .as_deref()
                    .map(parse_list)
                    .transpose()?
                    .unwrap_or_default(),
            };
            deposit_cmd(&client, req).await?;
        }

        Commands::Issue { sender, bundle } => {
            client.issue(&addr(&sender)?, &addr(&bundle)?).await?;
            println!("Bundle issued");
        }

        Commands::Refund { sender, bundle, to } => {
            client
                .refund(&addr(&sender)?, &addr(&bundle)?, &addr(&to)?)
                .await?;
            println!("Bundle refunded to {}", to);
        }

        Commands::Bid {
            sender,
            bundle,
            index,
            amount,
        } => {
            client
                .bid(&addr(&sender)?, &addr(&bundle)?, index, amount)
                .await?;
            info!("Bid of {} placed on item {}", amount, index);
            println!("Bid of {} is the new top on item {}", amount, index);
        }

        Commands::Unbid {
            sender,
            bundle,
            index,
        } => {
            let paid = client.unbid(&addr(&sender)?, &addr(&bundle)?, index).await?;
            println!("Unbid on item {} returned {}", index, paid);
        }

        Commands::Claim {
            sender,
            bundle,
            index,
        } => {
            client.claim(&addr(&sender)?, &addr(&bundle)?, index).await?;
            println!("Item {} claimed", index);
        }

        Commands::ApproveUnlock {
            sender,
            bundle,
            amount,
        } => {
            let votes = client
                .approve_unlock(&addr(&sender)?, &addr(&bundle)?, amount)
                .await?;
            println!("Locked {}; aggregate unlock votes: {}", amount, votes);
        }

        Commands::UnapproveUnlock {
            sender,
            bundle,
            amount,
        } => {
            let votes = client
                .unapprove_unlock(&addr(&sender)?, &addr(&bundle)?, amount)
                .await?;
            println!("Unlocked {}; aggregate unlock votes: {}", amount, votes);
        }

        Commands::Redeem {
            sender,
            bundle,
            amount,
        } => {
            let payout = client
                .redeem(&addr(&sender)?, &addr(&bundle)?, amount)
                .await?;
            println!("Redeemed for {} native currency", payout);
        }

        Commands::TransferToken {
            sender,
            bundle,
            to,
            amount,
        } => {
            client
                .transfer_token(&addr(&sender)?, &addr(&bundle)?, &addr(&to)?, amount)
                .await?;
            println!("Transferred {} claim tokens to {}", amount, to);
        }

        Commands::SetFeeTo { sender, fee_to } => {
            let fee_to = fee_to.as_deref().map(addr).transpose()?;
            client.set_fee_to(&addr(&sender)?, fee_to.as_deref()).await?;
            println!("Fee recipient updated");
        }

        Commands::ListBundles => {
            list_bundles_cmd(&client).await?;
        }

        Commands::GetParams { bundle } => {
            get_params_cmd(&client, &addr(&bundle)?).await?;
        }

        Commands::GetSummary { bundle } => {
            get_summary_cmd(&client, &addr(&bundle)?).await?;
        }

        Commands::GetItems { bundle } => {
            get_items_cmd(&client, &addr(&bundle)?).await?;
        }

        Commands::GetTopBid { bundle, index } => {
            match client.top_bid(&addr(&bundle)?, index).await? {
                Some(bid) => {
                    println!("Top bid on item {}:", index);
                    println!("  Bidder: {}", bid.bidder);
                    println!("  Amount: {}", bid.amount);
                    println!("  Placed at: {}", bid.placed_at);
                }
                None => println!("No bid on item {}", index),
            }
        }

        Commands::GetRefund {
            bundle,
            index,
            bidder,
        } => {
            let owed = client
                .refund_owed(&addr(&bundle)?, index, &addr(&bidder)?)
                .await?;
            println!("Refund owed on item {}: {}", index, owed);
        }

        Commands::GetLocked { bundle, holder } => {
            let locked = client
                .locked_balance(&addr(&bundle)?, &addr(&holder)?)
                .await?;
            println!("Locked claim tokens: {}", locked);
        }

        Commands::GetTokenBalance { bundle, owner } => {
            let balance = client
                .token_balance(&addr(&bundle)?, &addr(&owner)?)
                .await?;
            println!("Claim-token balance: {}", balance);
        }

        Commands::GetBankBalance { address } => {
            let balance = client.bank_balance(&addr(&address)?).await?;
            println!("Native balance: {}", balance);
        }

        Commands::GetEvents => {
            get_events_cmd(&client).await?;
        }

        Commands::BlockInfo => {
            let info = client.block_info().await?;
            println!("Block height={}, timestamp={}", info.height, info.timestamp);
        }

        Commands::AdvanceBlock => {
            let info = client.advance_block().await?;
            println!(
                "Block advanced: height={}, timestamp={}",
                info.height, info.timestamp
            );
        }

        Commands::SetTimestamp { timestamp } => {
            client.set_timestamp(timestamp).await?;
            println!("Timestamp set to {}", timestamp);
        }

        Commands::Fund { address, amount } => {
            client.fund(&addr(&address)?, amount).await?;
            println!("Funded {} with {}", address, amount);
        }

        Commands::CreateAssetContract { address, kind } => {
            client.create_asset_contract(&addr(&address)?, &kind).await?;
            println!("Asset contract {} created ({})", address, kind);
        }

        Commands::MintAsset {
            contract,
            token_id,
            to,
            amount,
        } => {
            client
                .mint_asset(&addr(&contract)?, token_id, &addr(&to)?, amount)
                .await?;
            println!("Minted token {} to {}", token_id, to);
        }

        Commands::SetAssetOperator {
            contract,
            owner,
            operator,
            revoke,
        } => {
            client
                .set_asset_operator(
                    &addr(&contract)?,
                    &addr(&owner)?,
                    &addr(&operator)?,
                    !revoke,
                )
                .await?;
            println!(
                "Operator {} {} for {}",
                operator,
                if revoke { "revoked" } else { "approved" },
                owner
            );
        }
    }

    Ok(())
}
