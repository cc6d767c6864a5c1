//! Build, sign and optionally submit every transaction kind.
//!
//! Run with:
//! ```
//! LIGHTER_BASE_URL=https://... LIGHTER_API_PRIVATE_KEY=0x... cargo run --example basic_usage
//! LIGHTER_BASE_URL=https://... LIGHTER_API_PRIVATE_KEY=0x... cargo run --example basic_usage -- --submit
//! ```
//!
//! Without `--submit` nothing is sent to the exchange.

use lighter_sdk::types::{
    usdc_to_base_units, CancelOrderTxReq, CreateGroupedOrdersTxReq, CreateOrderTxReq,
    GroupingType, ModifyOrderTxReq, OrderType, TimeInForce, TransactOpts,
};
use lighter_sdk::{ClientConfig, KeyManager, LighterClient};
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const ACCOUNT_INDEX: u64 = 0;
const API_KEY_INDEX: u8 = 0;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "basic_usage=info,lighter_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let submit = std::env::args().any(|arg| arg == "--submit");

    let client = LighterClient::builder()
        .config(ClientConfig::from_env()?)
        .key_manager(KeyManager::from_env()?)
        .build()?;

    let opts = TransactOpts::new(ACCOUNT_INDEX, API_KEY_INDEX);

    let nonce = if submit {
        client.get_next_nonce(ACCOUNT_INDEX, API_KEY_INDEX).await?
    } else {
        0
    };
    info!(nonce, "Starting nonce");

    // Limit buy: 1.0 base at 50_000 price units.
    let buy_order = client
        .create_limit_order(0, 1, 1_000_000, 50_000, false, opts.with_nonce(nonce))
        .await?;
    info!(tx_hash = %buy_order.tx_hash(), "Buy order created");

    // Limit sell: 0.5 base at 55_000.
    let sell_order = client
        .create_limit_order(0, 2, 500_000, 55_000, true, opts.with_nonce(nonce + 1))
        .await?;
    info!(tx_hash = %sell_order.tx_hash(), "Sell order created");

    let market_order = client
        .create_market_order(0, 3, 200_000, false, opts.with_nonce(nonce + 2))
        .await?;
    info!(tx_hash = %market_order.tx_hash(), "Market order created");

    let transfer = client
        .transfer_usdc(
            1,
            usdc_to_base_units(Decimal::ONE)?,
            opts.with_nonce(nonce + 3),
        )
        .await?;
    info!(tx_hash = %transfer.tx_hash(), "Transfer created");

    let cancel = client
        .construct_cancel_order_tx(
            CancelOrderTxReq {
                market_index: 0,
                index: 12345,
            },
            opts.with_nonce(nonce + 4),
        )
        .await?;
    info!(tx_hash = %cancel.tx_hash(), "Cancel created");

    let modify = client
        .construct_modify_order_tx(
            ModifyOrderTxReq {
                market_index: 0,
                index: 12345,
                base_amount: 1_500_000,
                price: 52_000,
                trigger_price: 0,
            },
            opts.with_nonce(nonce + 5),
        )
        .await?;
    info!(tx_hash = %modify.tx_hash(), "Modify created");

    // One-cancels-the-other stop loss and take profit.
    let leg = |order_type, client_order_index, price| CreateOrderTxReq {
        market_index: 0,
        client_order_index,
        base_amount: 1_000_000,
        price,
        is_ask: true,
        order_type,
        time_in_force: TimeInForce::GoodTillTime,
        reduce_only: true,
        trigger_price: price,
        order_expiry: 0,
    };
    let grouped = client
        .construct_create_grouped_orders_tx(
            CreateGroupedOrdersTxReq {
                grouping_type: GroupingType::OneCancelsTheOther,
                orders: vec![
                    leg(OrderType::StopLoss, 4, 48_000),
                    leg(OrderType::TakeProfit, 5, 60_000),
                ],
            },
            opts.with_nonce(nonce + 6),
        )
        .await?;
    info!(tx_hash = %grouped.tx_hash(), "Grouped orders created");

    if submit {
        let hash = client.send_transaction(&buy_order).await?;
        info!(tx_hash = %hash, "Buy order sent");

        let hashes = client.send_transactions(&[sell_order]).await?;
        info!(?hashes, "Sell order sent");
    } else {
        info!("Dry run, pass --submit to send the limit orders");
    }

    Ok(())
}
