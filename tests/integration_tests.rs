//! Integration tests for component interactions.
//!
//! These drive the public API end to end with an in-memory transport.

use async_trait::async_trait;
use rand::Rng;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use lighter_sdk::api::Transport;
use lighter_sdk::types::{
    usdc_to_base_units, CancelOrderTxReq, CreateGroupedOrdersTxReq, CreateOrderTxReq,
    GroupingType, ModifyOrderTxReq, OrderType, TimeInForce, TransactOpts, TxType,
};
use lighter_sdk::{Error, LighterClient, LocalSigner, Result, Tx, TxSigner};

const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const EXPIRED_AT: u64 = 1_700_000_600_000;

/// Transport that serves a fixed starting nonce and records submissions.
struct MemoryTransport {
    base_nonce: u64,
    nonce_fetches: AtomicUsize,
    submitted: Mutex<Vec<(u8, String)>>,
}

impl MemoryTransport {
    fn new(base_nonce: u64) -> Arc<Self> {
        Arc::new(Self {
            base_nonce,
            nonce_fetches: AtomicUsize::new(0),
            submitted: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn fetch_current_nonce(&self, _account_index: u64, _api_key_index: u8) -> Result<u64> {
        self.nonce_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.base_nonce)
    }

    async fn send_tx(&self, tx: &Tx) -> Result<String> {
        self.submitted
            .lock()
            .unwrap()
            .push((tx.tx_type().as_u8(), tx.tx_info().to_string()));
        Ok(tx.tx_hash())
    }

    async fn send_tx_batch(&self, txs: &[Tx]) -> Result<Vec<String>> {
        let mut hashes = Vec::with_capacity(txs.len());
        for tx in txs {
            hashes.push(self.send_tx(tx).await?);
        }
        Ok(hashes)
    }
}

fn client(transport: Arc<MemoryTransport>) -> LighterClient {
    LighterClient::builder()
        .base_url("https://api.example.com")
        .chain_id(304)
        .private_key(TEST_PRIVATE_KEY)
        .transport(transport)
        .build()
        .unwrap()
}

fn identity() -> LocalSigner {
    LocalSigner::from_private_key(TEST_PRIVATE_KEY).unwrap()
}

fn random_limit_order(rng: &mut impl Rng) -> CreateOrderTxReq {
    CreateOrderTxReq {
        market_index: rng.gen_range(0..64),
        client_order_index: rng.gen_range(0..(1u64 << 48)),
        base_amount: rng.gen_range(1..10_000_000),
        price: rng.gen_range(1..u32::MAX),
        is_ask: rng.gen(),
        order_type: OrderType::Limit,
        time_in_force: if rng.gen() {
            TimeInForce::GoodTillTime
        } else {
            TimeInForce::PostOnly
        },
        reduce_only: rng.gen(),
        trigger_price: 0,
        order_expiry: 0,
    }
}

fn oco_legs() -> Vec<CreateOrderTxReq> {
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
    vec![
        leg(OrderType::StopLoss, 4, 48_000),
        leg(OrderType::TakeProfit, 5, 60_000),
    ]
}

/// Same logical inputs give byte-identical payloads across independent clients.
#[tokio::test]
async fn test_construction_is_deterministic() {
    let mut rng = rand::thread_rng();

    for _ in 0..25 {
        let req = random_limit_order(&mut rng);
        let nonce = rng.gen_range(0..1_000_000);
        let opts = TransactOpts::new(rng.gen_range(0..1000), rng.gen_range(0..=254))
            .with_nonce(nonce)
            .with_expired_at(EXPIRED_AT);

        let a = client(MemoryTransport::new(0))
            .construct_create_order_tx(req.clone(), opts)
            .await
            .unwrap();
        let b = client(MemoryTransport::new(0))
            .construct_create_order_tx(req, opts)
            .await
            .unwrap();

        assert_eq!(a.tx_info(), b.tx_info());
        assert_eq!(a.tx_hash(), b.tx_hash());
        assert_eq!(a.signature(), b.signature());
    }
}

/// Every transaction kind verifies against the signing key's identity.
#[tokio::test]
async fn test_every_kind_verifies() {
    let transport = MemoryTransport::new(0);
    let client = client(transport.clone());
    let opts = TransactOpts::new(0, 0);
    let signer = identity();

    let txs = vec![
        client
            .create_limit_order(0, 1, 1_000_000, 50_000, false, opts)
            .await
            .unwrap(),
        client
            .create_market_order(0, 3, 200_000, false, opts)
            .await
            .unwrap(),
        client.transfer_usdc(1, 1_000_000, opts).await.unwrap(),
        client.withdraw_usdc(1_000_000, opts).await.unwrap(),
        client
            .construct_cancel_order_tx(
                CancelOrderTxReq {
                    market_index: 0,
                    index: 12345,
                },
                opts,
            )
            .await
            .unwrap(),
        client
            .construct_modify_order_tx(
                ModifyOrderTxReq {
                    market_index: 0,
                    index: 12345,
                    base_amount: 1_500_000,
                    price: 52_000,
                    trigger_price: 0,
                },
                opts,
            )
            .await
            .unwrap(),
        client
            .construct_create_grouped_orders_tx(
                CreateGroupedOrdersTxReq {
                    grouping_type: GroupingType::OneCancelsTheOther,
                    orders: oco_legs(),
                },
                opts,
            )
            .await
            .unwrap(),
    ];

    let nonces: Vec<u64> = txs.iter().map(|tx| tx.nonce()).collect();
    assert_eq!(nonces, (0..7).collect::<Vec<_>>());
    assert_eq!(transport.nonce_fetches.load(Ordering::SeqCst), 1);

    for tx in &txs {
        assert!(tx.verify(&signer.public_identity()), "{}", tx.tx_type());
        assert!(tx.validate().is_ok(), "{}", tx.tx_type());
    }
}

/// Inspection never changes what a transaction reports.
#[tokio::test]
async fn test_inspection_is_idempotent() {
    let client = client(MemoryTransport::new(0));
    let tx = client
        .create_limit_order(0, 1, 1_000_000, 50_000, false, TransactOpts::new(0, 0))
        .await
        .unwrap();

    let hash = tx.tx_hash();
    let info = tx.tx_info().to_string();
    for _ in 0..5 {
        assert!(tx.validate().is_ok());
        assert_eq!(tx.tx_hash(), hash);
        assert_eq!(tx.tx_info(), info);
    }
}

/// Concurrent builds on one pair get distinct nonces with no gaps.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_builds_share_one_sequence() {
    let transport = MemoryTransport::new(100);
    let client = Arc::new(client(transport.clone()));

    let handles: Vec<_> = (0..32u64)
        .map(|i| {
            let client = Arc::clone(&client);
            tokio::spawn(async move {
                client
                    .create_limit_order(0, i, 1_000, 10, false, TransactOpts::new(7, 1))
                    .await
                    .map(|tx| tx.nonce())
            })
        })
        .collect();

    let mut nonces = HashSet::new();
    for handle in handles {
        assert!(nonces.insert(handle.await.unwrap().unwrap()));
    }

    assert_eq!(nonces, (100..132).collect::<HashSet<_>>());
    assert_eq!(transport.nonce_fetches.load(Ordering::SeqCst), 1);
}

/// Limit buy from the basic flow: remote nonce 5, submitted as-is.
#[tokio::test]
async fn test_limit_buy_submission() {
    let transport = MemoryTransport::new(5);
    let client = client(transport.clone());

    let tx = client
        .create_limit_order(0, 1, 1_000_000, 50_000, false, TransactOpts::new(0, 0))
        .await
        .unwrap();
    assert_eq!(tx.nonce(), 5);
    assert_eq!(tx.tx_type(), TxType::CreateOrder);

    let hash = client.send_transaction(&tx).await.unwrap();
    assert_eq!(hash, tx.tx_hash());

    let submitted = transport.submitted.lock().unwrap();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].0, 14);
    assert_eq!(submitted[0].1, tx.tx_info());
}

/// Limit buy with a caller-chosen nonce carries exactly the normalized fields.
#[tokio::test]
async fn test_limit_buy_with_explicit_nonce_tx_info() {
    let transport = MemoryTransport::new(0);
    let client = client(transport.clone());

    let tx = client
        .create_limit_order(
            0,
            1,
            1_000_000,
            50_000,
            false,
            TransactOpts::new(0, 0).with_nonce(5),
        )
        .await
        .unwrap();
    assert_eq!(transport.nonce_fetches.load(Ordering::SeqCst), 0);

    let info: serde_json::Value = serde_json::from_str(tx.tx_info()).unwrap();
    let fields = info.as_object().unwrap();

    let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec![
            "AccountIndex",
            "ApiKeyIndex",
            "BaseAmount",
            "ClientOrderIndex",
            "ExpiredAt",
            "IsAsk",
            "MarketIndex",
            "Nonce",
            "OrderExpiry",
            "Price",
            "ReduceOnly",
            "Sig",
            "TimeInForce",
            "TriggerPrice",
            "Type",
        ]
    );

    let expected = [
        ("AccountIndex", 0u64),
        ("ApiKeyIndex", 0),
        ("MarketIndex", 0),
        ("ClientOrderIndex", 1),
        ("BaseAmount", 1_000_000),
        ("Price", 50_000),
        ("IsAsk", 0),
        ("Type", 0),
        ("TimeInForce", 1),
        ("ReduceOnly", 0),
        ("TriggerPrice", 0),
        ("OrderExpiry", 0),
        ("Nonce", 5),
    ];
    for (key, value) in expected {
        assert_eq!(fields[key].as_u64(), Some(value), "{}", key);
    }
    assert_eq!(fields["ExpiredAt"].as_u64(), Some(tx.expired_at()));

    let sig = fields["Sig"].as_str().unwrap();
    assert!(sig.starts_with("0x"));
    assert_eq!(sig.len(), 2 + 65 * 2);
}

#[tokio::test]
async fn test_invalid_requests_rejected_without_nonce() {
    let transport = MemoryTransport::new(0);
    let client = client(transport.clone());
    let opts = TransactOpts::new(0, 0);

    let market_gtt = CreateOrderTxReq {
        market_index: 0,
        client_order_index: 1,
        base_amount: 1_000,
        price: 0,
        is_ask: false,
        order_type: OrderType::Market,
        time_in_force: TimeInForce::GoodTillTime,
        reduce_only: false,
        trigger_price: 0,
        order_expiry: 0,
    };
    let err = client
        .construct_create_order_tx(market_gtt, opts)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation { field: "time_in_force", .. }));

    let mut single = oco_legs();
    single.truncate(1);
    let err = client
        .construct_create_grouped_orders_tx(
            CreateGroupedOrdersTxReq {
                grouping_type: GroupingType::OneCancelsTheOther,
                orders: single,
            },
            opts,
        )
        .await
        .unwrap_err();
    assert!(err.is_validation());

    assert_eq!(transport.nonce_fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_decimal_amounts_feed_transfers() {
    let client = client(MemoryTransport::new(0));
    let amount = usdc_to_base_units(Decimal::new(15, 1)).unwrap();
    assert_eq!(amount, 1_500_000);

    let tx = client
        .transfer_usdc(2, amount, TransactOpts::new(1, 0))
        .await
        .unwrap();
    assert!(tx.tx_info().contains(r#""USDCAmount":1500000"#));
}
