//! Demo service: boots the engine against in-memory collaborators and
//! runs one full pool lifecycle, logging each step.

use anyhow::{Context, Result};
use config::EngineConfig;
use manaswap_engine::{Engine, InMemoryLedger, InMemoryPoolStore};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use types::{FixedPoint, UserId};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("🚀 Starting Manaswap engine demo...");

    let config = EngineConfig::load(None).context("Failed to load engine configuration")?;

    let ledger = Arc::new(InMemoryLedger::new());
    let store = Arc::new(InMemoryPoolStore::new());

    let creator = UserId::from("creator-1");
    let trader = UserId::from("trader-1");
    ledger.seed(creator.clone(), FixedPoint::from_units(1_000_000));
    ledger.seed(trader.clone(), FixedPoint::from_units(100_000));

    let engine = Engine::new(config, ledger.clone(), store);
    info!("✅ Engine initialized with in-memory ledger and pool store");

    // Bootstrap a memecoin pool: 50k mana against 100k tokens
    let pool_id = engine
        .create_pool(
            &creator,
            "DOGE",
            FixedPoint::from_units(50_000),
            FixedPoint::from_units(100_000),
        )
        .await?;

    let quote = engine
        .quote_buy(pool_id, FixedPoint::from_units(10_000))
        .await?;
    info!(
        "📊 Buy quote: 10000 mana -> {} tokens (fee {}, impact {:.4})",
        quote.tokens_out, quote.fee_amount, quote.price_impact
    );

    let buy = engine
        .execute_buy(
            pool_id,
            &trader,
            FixedPoint::from_units(10_000),
            quote.tokens_out,
        )
        .await?;
    info!(
        "💰 Bought {} tokens for {} mana",
        buy.output_amount, buy.input_amount
    );

    // Provide liquidity from the trader's mana and freshly bought tokens
    let deposit_quote = engine
        .quote_deposit(pool_id, FixedPoint::from_units(5_000))
        .await?;
    let deposit = engine
        .deposit(
            pool_id,
            &trader,
            FixedPoint::from_units(5_000),
            deposit_quote.token_in_required,
        )
        .await?;
    info!(
        "➕ Deposit of 5000 mana + {} tokens minted {} LP shares",
        deposit.token_in, deposit.lp_shares_minted
    );

    let withdrawal = engine
        .withdraw(pool_id, &trader, deposit.lp_shares_minted)
        .await?;
    info!(
        "➖ Withdrawal burned {} shares for {} mana + {} tokens",
        withdrawal.lp_shares_burned, withdrawal.mana_out, withdrawal.token_out
    );

    // Sell everything still held; fees make the round trip a net loss
    let held = engine.token_balance_of(pool_id, &trader);
    let sell = engine
        .execute_sell(pool_id, &trader, held, FixedPoint::ZERO)
        .await?;
    info!(
        "💰 Sold {} tokens back for {} mana",
        sell.input_amount, sell.output_amount
    );

    for summary in engine.list_pools(0, 10).await? {
        info!(
            "🏊 Pool {}: reserves {}/{} (spot {:?}), version {}",
            summary.symbol,
            summary.reserves.mana,
            summary.reserves.token,
            summary.spot_price,
            summary.version
        );
    }

    let trades = engine.trades_for_pool(pool_id, 0, 10);
    info!(
        "📜 Trade log has {} entries; last price {:?}; trader balance {}",
        trades.len(),
        engine.last_price(pool_id),
        ledger.balance_of(&trader)
    );
    info!("✅ Demo complete");

    Ok(())
}
