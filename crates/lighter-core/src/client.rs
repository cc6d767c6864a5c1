//! High-level client wiring configuration, keys, nonces and transport.

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::api::{HttpClient, Transport, TransportNonces};
use crate::builder::TransactionBuilder;
use crate::config::{ClientConfig, DEFAULT_CHAIN_ID};
use crate::nonce::NonceTracker;
use crate::signing::{KeyManager, TxDomain, TxSigner};
use crate::tx::Tx;
use crate::types::{
    CancelOrderTxReq, CreateGroupedOrdersTxReq, CreateOrderTxReq, ModifyOrderTxReq, OrderType,
    TimeInForce, TransactOpts, TransferTxReq, WithdrawTxReq,
};
use crate::{Error, Result};

/// Builder for [`LighterClient`].
#[derive(Default)]
pub struct LighterClientBuilder {
    config: Option<ClientConfig>,
    base_url: Option<String>,
    chain_id: Option<u64>,
    tx_expiry: Option<Duration>,
    private_key: Option<String>,
    signer: Option<Arc<dyn TxSigner>>,
    keys: Option<KeyManager>,
    transport: Option<Arc<dyn Transport>>,
}

impl LighterClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a full configuration. Individual setters still override it.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn tx_expiry(mut self, tx_expiry: Duration) -> Self {
        self.tx_expiry = Some(tx_expiry);
        self
    }

    /// Hex-encoded private key of the default api key.
    pub fn private_key(mut self, key: impl Into<String>) -> Self {
        self.private_key = Some(key.into());
        self
    }

    /// Default signer. Takes precedence over `private_key`.
    pub fn signer(mut self, signer: Arc<dyn TxSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Full key manager with per api key signers. Takes precedence over
    /// `signer` and `private_key`.
    pub fn key_manager(mut self, keys: KeyManager) -> Self {
        self.keys = Some(keys);
        self
    }

    /// Replace the HTTP transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    #[allow(clippy::result_large_err)]
    pub fn build(self) -> Result<LighterClient> {
        let keys = match (self.keys, self.signer, self.private_key) {
            (Some(keys), _, _) => keys,
            (None, Some(signer), _) => KeyManager::new(signer),
            (None, None, Some(key)) => KeyManager::from_private_key(&key)?,
            (None, None, None) => {
                return Err(Error::config("Either signer or privateKey must be provided"))
            }
        };

        let mut config = match (self.config, self.base_url) {
            (Some(mut config), Some(base_url)) => {
                config.base_url = base_url;
                config
            }
            (Some(config), None) => config,
            (None, Some(base_url)) => ClientConfig::new(base_url, DEFAULT_CHAIN_ID),
            (None, None) => return Err(Error::config("Base URL is required")),
        };
        if let Some(chain_id) = self.chain_id {
            config.chain_id = chain_id;
        }
        if let Some(tx_expiry) = self.tx_expiry {
            config.tx_expiry_secs = tx_expiry.as_secs();
        }
        config.validate()?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpClient::new(&config)?),
        };

        let nonces = Arc::new(NonceTracker::new(Arc::new(TransportNonces(Arc::clone(
            &transport,
        )))));

        let builder = TransactionBuilder::new(
            keys,
            Arc::clone(&nonces),
            &TxDomain::for_chain(config.chain_id),
            config.tx_expiry(),
        );

        info!(
            base_url = %config.base_url(),
            chain_id = config.chain_id,
            "Lighter client initialized"
        );

        Ok(LighterClient {
            config,
            builder,
            nonces,
            transport,
        })
    }
}

/// Entry point for building, signing and submitting Lighter transactions.
pub struct LighterClient {
    config: ClientConfig,
    builder: TransactionBuilder,
    nonces: Arc<NonceTracker>,
    transport: Arc<dyn Transport>,
}

impl LighterClient {
    pub fn builder() -> LighterClientBuilder {
        LighterClientBuilder::new()
    }

    /// Build a client from `LIGHTER_*` environment variables.
    #[allow(clippy::result_large_err)]
    pub fn from_env() -> Result<Self> {
        LighterClientBuilder::new()
            .config(ClientConfig::from_env()?)
            .key_manager(KeyManager::from_env()?)
            .build()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn tx_builder(&self) -> &TransactionBuilder {
        &self.builder
    }

    /// Good-till-time limit order with no order expiry.
    pub async fn create_limit_order(
        &self,
        market_index: u16,
        client_order_index: u64,
        base_amount: u64,
        price: u32,
        is_ask: bool,
        opts: TransactOpts,
    ) -> Result<Tx> {
        let req = CreateOrderTxReq {
            market_index,
            client_order_index,
            base_amount,
            price,
            is_ask,
            order_type: OrderType::Limit,
            time_in_force: TimeInForce::GoodTillTime,
            reduce_only: false,
            trigger_price: 0,
            order_expiry: 0,
        };
        self.builder.construct_create_order_tx(req, opts).await
    }

    /// Immediate-or-cancel market order.
    pub async fn create_market_order(
        &self,
        market_index: u16,
        client_order_index: u64,
        base_amount: u64,
        is_ask: bool,
        opts: TransactOpts,
    ) -> Result<Tx> {
        let req = CreateOrderTxReq {
            market_index,
            client_order_index,
            base_amount,
            price: 0,
            is_ask,
            order_type: OrderType::Market,
            time_in_force: TimeInForce::ImmediateOrCancel,
            reduce_only: false,
            trigger_price: 0,
            order_expiry: 0,
        };
        self.builder.construct_create_order_tx(req, opts).await
    }

    pub async fn construct_create_order_tx(
        &self,
        req: CreateOrderTxReq,
        opts: TransactOpts,
    ) -> Result<Tx> {
        self.builder.construct_create_order_tx(req, opts).await
    }

    pub async fn transfer_usdc(
        &self,
        to_account_index: u64,
        usdc_amount: u64,
        opts: TransactOpts,
    ) -> Result<Tx> {
        let req = TransferTxReq {
            to_account_index,
            usdc_amount,
        };
        self.builder.construct_transfer_tx(req, opts).await
    }

    pub async fn withdraw_usdc(&self, usdc_amount: u64, opts: TransactOpts) -> Result<Tx> {
        self.builder
            .construct_withdraw_tx(WithdrawTxReq { usdc_amount }, opts)
            .await
    }

    pub async fn construct_cancel_order_tx(
        &self,
        req: CancelOrderTxReq,
        opts: TransactOpts,
    ) -> Result<Tx> {
        self.builder.construct_cancel_order_tx(req, opts).await
    }

    pub async fn construct_modify_order_tx(
        &self,
        req: ModifyOrderTxReq,
        opts: TransactOpts,
    ) -> Result<Tx> {
        self.builder.construct_modify_order_tx(req, opts).await
    }

    pub async fn construct_create_grouped_orders_tx(
        &self,
        req: CreateGroupedOrdersTxReq,
        opts: TransactOpts,
    ) -> Result<Tx> {
        self.builder
            .construct_create_grouped_orders_tx(req, opts)
            .await
    }

    /// Ask the exchange for the next nonce of a pair. Read-only: the local
    /// nonce sequence is left as is.
    pub async fn get_next_nonce(&self, account_index: u64, api_key_index: u8) -> Result<u64> {
        self.transport
            .fetch_current_nonce(account_index, api_key_index)
            .await
    }

    /// Drop the local nonce sequence of a pair, e.g. after the exchange
    /// rejected a nonce. The next build refetches.
    pub fn refresh_nonce(&self, account_index: u64, api_key_index: u8) {
        self.nonces.refresh(account_index, api_key_index);
    }

    pub async fn send_transaction(&self, tx: &Tx) -> Result<String> {
        self.transport.send_tx(tx).await
    }

    pub async fn send_transactions(&self, txs: &[Tx]) -> Result<Vec<String>> {
        self.transport.send_tx_batch(txs).await
    }
}

impl std::fmt::Debug for LighterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LighterClient")
            .field("config", &self.config)
            .field("builder", &self.builder)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockTransport;
    use crate::signing::LocalSigner;
    use crate::types::{GroupingType, TxType};

    const TEST_PRIVATE_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn client_with(transport: MockTransport) -> LighterClient {
        LighterClient::builder()
            .base_url("https://api.example.com")
            .chain_id(304)
            .private_key(TEST_PRIVATE_KEY)
            .transport(Arc::new(transport))
            .build()
            .unwrap()
    }

    fn nonce_transport(base: u64) -> MockTransport {
        let mut transport = MockTransport::new();
        transport
            .expect_fetch_current_nonce()
            .times(1)
            .returning(move |_, _| Ok(base));
        transport
    }

    #[test]
    fn test_build_requires_key_material() {
        let err = LighterClient::builder()
            .base_url("https://api.example.com")
            .build()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: Either signer or privateKey must be provided"
        );
    }

    #[test]
    fn test_build_requires_base_url() {
        let err = LighterClient::builder()
            .base_url("")
            .private_key(TEST_PRIVATE_KEY)
            .transport(Arc::new(MockTransport::new()))
            .build()
            .unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: Base URL is required");
    }

    #[test]
    fn test_build_without_base_url_fails() {
        let result = LighterClient::builder()
            .private_key(TEST_PRIVATE_KEY)
            .build();
        match result {
            Err(Error::Config { message }) => assert_eq!(message, "Base URL is required"),
            other => panic!("expected config error, got {:?}", other.map(|_| ())),
        }

        let result = LighterClient::builder()
            .chain_id(304)
            .private_key(TEST_PRIVATE_KEY)
            .transport(Arc::new(MockTransport::new()))
            .build();
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_build_takes_base_url_from_config() {
        let client = LighterClient::builder()
            .config(ClientConfig::new("https://api.example.com/", 300))
            .private_key(TEST_PRIVATE_KEY)
            .transport(Arc::new(MockTransport::new()))
            .build()
            .unwrap();
        assert_eq!(client.config().base_url(), "https://api.example.com");
        assert_eq!(client.config().chain_id, 300);
    }

    #[test]
    fn test_build_rejects_bad_private_key() {
        let result = LighterClient::builder()
            .base_url("https://api.example.com")
            .private_key("0x1234")
            .build();
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[tokio::test]
    async fn test_signer_takes_precedence_over_private_key() {
        let signer = Arc::new(
            LocalSigner::from_private_key(
                "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
            )
            .unwrap(),
        );
        let client = LighterClient::builder()
            .base_url("https://api.example.com")
            .private_key(TEST_PRIVATE_KEY)
            .signer(signer.clone())
            .transport(Arc::new(nonce_transport(0)))
            .build()
            .unwrap();

        let tx = client
            .create_limit_order(0, 1, 1_000_000, 50_000, false, TransactOpts::new(0, 0))
            .await
            .unwrap();
        assert!(tx.verify(&signer.public_identity()));
    }

    #[tokio::test]
    async fn test_limit_and_market_orders() {
        let client = client_with(nonce_transport(5));
        let opts = TransactOpts::new(0, 0);

        let buy = client
            .create_limit_order(0, 1, 1_000_000, 50_000, false, opts)
            .await
            .unwrap();
        assert_eq!(buy.nonce(), 5);
        assert_eq!(buy.tx_type(), TxType::CreateOrder);

        let market = client
            .create_market_order(0, 3, 200_000, false, opts)
            .await
            .unwrap();
        assert_eq!(market.nonce(), 6);
        assert!(market.tx_info().contains(r#""TimeInForce":0"#));
        assert!(market.tx_info().contains(r#""Price":0"#));
    }

    #[tokio::test]
    async fn test_fund_movements() {
        let client = client_with(nonce_transport(0));
        let opts = TransactOpts::new(0, 0);

        let transfer = client.transfer_usdc(1, 1_000_000, opts).await.unwrap();
        assert_eq!(transfer.tx_type(), TxType::Transfer);

        let err = client.transfer_usdc(0, 1_000_000, opts).await.unwrap_err();
        assert_eq!(err.field(), Some("to_account_index"));

        let withdraw = client.withdraw_usdc(250_000, opts).await.unwrap();
        assert_eq!(withdraw.tx_type(), TxType::Withdraw);
        assert_eq!(withdraw.nonce(), transfer.nonce() + 1);
    }

    #[tokio::test]
    async fn test_get_next_nonce_is_read_only() {
        let mut transport = MockTransport::new();
        transport
            .expect_fetch_current_nonce()
            .times(2)
            .returning(|_, _| Ok(9));
        let client = client_with(transport);

        assert_eq!(client.get_next_nonce(0, 0).await.unwrap(), 9);
        assert_eq!(client.tx_builder().nonce_tracker().peek(0, 0).await, None);

        let tx = client
            .construct_cancel_order_tx(
                CancelOrderTxReq {
                    market_index: 0,
                    index: 12345,
                },
                TransactOpts::new(0, 0),
            )
            .await
            .unwrap();
        assert_eq!(tx.nonce(), 9);
    }

    #[tokio::test]
    async fn test_refresh_nonce_refetches() {
        let mut transport = MockTransport::new();
        let mut base = 0;
        transport
            .expect_fetch_current_nonce()
            .times(2)
            .returning(move |_, _| {
                base += 100;
                Ok(base)
            });
        let client = client_with(transport);
        let opts = TransactOpts::new(0, 0);

        assert_eq!(client.create_limit_order(0, 1, 1, 1, false, opts).await.unwrap().nonce(), 100);
        client.refresh_nonce(0, 0);
        assert_eq!(client.create_limit_order(0, 2, 1, 1, false, opts).await.unwrap().nonce(), 200);
    }

    #[tokio::test]
    async fn test_send_transaction_and_batch() {
        let mut transport = nonce_transport(0);
        transport
            .expect_send_tx()
            .withf(|tx| tx.tx_type() == TxType::CreateGroupedOrders)
            .times(1)
            .returning(|tx| Ok(tx.tx_hash()));
        transport
            .expect_send_tx_batch()
            .withf(|txs| txs.len() == 2)
            .times(1)
            .returning(|txs| Ok(txs.iter().map(|tx| tx.tx_hash()).collect()));
        let client = client_with(transport);
        let opts = TransactOpts::new(0, 0);

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
        let group = client
            .construct_create_grouped_orders_tx(
                CreateGroupedOrdersTxReq {
                    grouping_type: GroupingType::OneCancelsTheOther,
                    orders: vec![
                        leg(OrderType::StopLoss, 4, 48_000),
                        leg(OrderType::TakeProfit, 5, 60_000),
                    ],
                },
                opts,
            )
            .await
            .unwrap();

        assert_eq!(client.send_transaction(&group).await.unwrap(), group.tx_hash());

        let modify = client
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
            .unwrap();
        let hashes = client
            .send_transactions(&[group.clone(), modify.clone()])
            .await
            .unwrap();
        assert_eq!(hashes, vec![group.tx_hash(), modify.tx_hash()]);
    }

    #[tokio::test]
    async fn test_transport_error_surfaces_unchanged() {
        let mut transport = MockTransport::new();
        transport.expect_send_tx().returning(|_| {
            Err(Error::Api {
                message: "sendTx rejected with code 21120: invalid nonce".to_string(),
                status: None,
            })
        });
        transport
            .expect_fetch_current_nonce()
            .returning(|_, _| Ok(0));
        let client = client_with(transport);

        let tx = client
            .withdraw_usdc(1, TransactOpts::new(0, 0))
            .await
            .unwrap();
        let err = client.send_transaction(&tx).await.unwrap_err();
        assert!(err.is_transport());
        assert!(!err.is_validation());
    }
}
