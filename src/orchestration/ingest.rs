use crate::db::Repository;
use crate::datasource::SnapshotError;
use crate::domain::{
    Balance, ConversionRates, Decimal, MarketCap, OpenOrder, Platform, Side, Strategy, Symbol,
    Ticker, TimeMs, Trade,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// A fill as reported by an exchange, before USD valuation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeInput {
    #[serde(rename = "timestamp")]
    pub time_ms: TimeMs,
    pub base: Symbol,
    pub quote: Symbol,
    #[serde(rename = "type")]
    pub side: Side,
    pub price: Decimal,
    pub amount: Decimal,
    #[serde(default)]
    pub fee: Decimal,
    pub feecoin: Option<Symbol>,
    /// Exchange trade id; fills without one are keyed by content.
    #[serde(default, rename = "id")]
    pub trade_id: Option<String>,
}

/// Holdings, fills, orders and prices pulled from one platform.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformSnapshot {
    pub platform: Platform,
    #[serde(default)]
    pub balances: Vec<BalanceInput>,
    #[serde(default)]
    pub trades: Vec<TradeInput>,
    #[serde(default)]
    pub open_orders: Option<Vec<OpenOrder>>,
    #[serde(default)]
    pub tickers: Vec<Ticker>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BalanceInput {
    pub base: Symbol,
    pub balance: Decimal,
    pub available: Option<Decimal>,
}

/// Market-wide reference data shared by every platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceSnapshot {
    #[serde(default)]
    pub market_caps: Vec<MarketCap>,
    #[serde(default)]
    pub strategies: Vec<Strategy>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionResult {
    pub balances: usize,
    pub trades_received: usize,
    pub trades_new: usize,
    pub open_orders: usize,
    pub tickers: usize,
}

#[derive(Debug, Clone)]
pub struct Ingestor {
    repo: Arc<Repository>,
    rates: ConversionRates,
}

impl Ingestor {
    pub fn new(repo: Arc<Repository>, rates: ConversionRates) -> Self {
        Self { repo, rates }
    }

    /// Value a fill in USD and give it its stable key.
    pub fn to_trade(&self, platform: &Platform, input: &TradeInput) -> Trade {
        let feecoin = input.feecoin.clone().unwrap_or_else(|| input.quote.clone());
        let trade = Trade::new(
            input.time_ms,
            platform.clone(),
            input.base.clone(),
            input.quote.clone(),
            input.side,
            input.price,
            input.amount,
            input.fee,
            feecoin,
            &self.rates,
        );
        match &input.trade_id {
            Some(id) => trade.with_trade_id(id.as_str()),
            None => trade,
        }
    }

    /// Store a platform snapshot.
    ///
    /// Balances are replaced wholesale, trades are appended idempotently.
    /// Open orders are replaced only when the snapshot carries them.
    pub async fn ingest_platform(
        &self,
        snapshot: &PlatformSnapshot,
    ) -> Result<IngestionResult, IngestionError> {
        let platform = &snapshot.platform;

        let mut seen = HashSet::new();
        if let Some(dup) = snapshot.balances.iter().find(|b| !seen.insert(&b.base)) {
            return Err(IngestionError::DuplicateBalance {
                base: dup.base.clone(),
                platform: platform.clone(),
            });
        }

        let balances: Vec<Balance> = snapshot
            .balances
            .iter()
            .map(|b| {
                Balance::new(
                    b.base.clone(),
                    platform.clone(),
                    b.balance,
                    b.available.unwrap_or(b.balance),
                )
            })
            .collect();
        self.repo.replace_balances(platform, &balances).await?;

        let trades: Vec<Trade> = snapshot
            .trades
            .iter()
            .map(|t| self.to_trade(platform, t))
            .collect();
        let trades_new = self.repo.insert_trades_batch(&trades).await?;

        let mut open_orders = 0;
        if let Some(orders) = &snapshot.open_orders {
            let orders: Vec<OpenOrder> = orders
                .iter()
                .cloned()
                .map(|mut o| {
                    o.platform = platform.clone();
                    o
                })
                .collect();
            self.repo.replace_open_orders(platform, &orders).await?;
            open_orders = orders.len();
        }

        let tickers: Vec<Ticker> = snapshot
            .tickers
            .iter()
            .cloned()
            .map(|mut t| {
                t.platform = platform.clone();
                t
            })
            .collect();
        self.repo.upsert_tickers(&tickers).await?;

        let result = IngestionResult {
            balances: balances.len(),
            trades_received: trades.len(),
            trades_new,
            open_orders,
            tickers: tickers.len(),
        };
        info!(
            "Ingested {}: {} balances, {}/{} new trades, {} open orders, {} tickers",
            platform,
            result.balances,
            result.trades_new,
            result.trades_received,
            result.open_orders,
            result.tickers
        );
        Ok(result)
    }

    pub async fn ingest_reference(
        &self,
        snapshot: &ReferenceSnapshot,
    ) -> Result<(), IngestionError> {
        self.repo.upsert_market_caps(&snapshot.market_caps).await?;
        for strategy in &snapshot.strategies {
            self.repo.upsert_strategy(strategy).await?;
        }
        info!(
            "Ingested reference data: {} market caps, {} strategies",
            snapshot.market_caps.len(),
            snapshot.strategies.len()
        );
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("Duplicate balance for {base} on {platform}")]
    DuplicateBalance { base: Symbol, platform: Platform },
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use tempfile::TempDir;

    async fn setup_repo() -> (Arc<Repository>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        (Arc::new(Repository::new(pool)), temp_dir)
    }

    fn snapshot_json() -> &'static str {
        r#"{
            "platform": "Binance",
            "balances": [{"base": "eth", "balance": 2}],
            "trades": [
                {"timestamp": 1000, "base": "ETH", "quote": "USDT", "type": "buy",
                 "price": 2000, "amount": 1, "fee": 1},
                {"timestamp": 2000, "base": "ETH", "quote": "BTC", "type": "buy",
                 "price": 0.05, "amount": 1, "fee": 0, "feecoin": "BTC"}
            ],
            "tickers": [{"symbol": "ETH/USDT", "timestamp": 3000, "last": 2500, "platform": "binance"}]
        }"#
    }

    #[tokio::test]
    async fn test_ingest_platform_values_trades_with_rates() {
        let (repo, _temp) = setup_repo().await;
        let rates = ConversionRates::new().with_rate(Symbol::new("BTC"), Decimal::from(60_000));
        let ingestor = Ingestor::new(repo.clone(), rates);
        let snapshot: PlatformSnapshot = serde_json::from_str(snapshot_json()).unwrap();

        let result = ingestor.ingest_platform(&snapshot).await.unwrap();
        assert_eq!(result.balances, 1);
        assert_eq!(result.trades_new, 2);
        assert_eq!(result.open_orders, 0);

        let balances = repo.query_balances(None).await.unwrap();
        assert_eq!(balances[0].base, Symbol::new("ETH"));
        assert_eq!(balances[0].platform, Platform::new("binance"));
        assert_eq!(balances[0].available, Decimal::from(2));

        let trades = repo.query_trades(None, None).await.unwrap();
        assert_eq!(trades[0].total_usdt, Decimal::from(2000));
        assert_eq!(trades[0].feecoin, Symbol::new("USDT"));
        assert_eq!(trades[1].total_usdt, Decimal::from(3000));

        let again = ingestor.ingest_platform(&snapshot).await.unwrap();
        assert_eq!(again.trades_new, 0);
    }

    #[tokio::test]
    async fn test_missing_open_orders_keep_stored_ones() {
        let (repo, _temp) = setup_repo().await;
        let ingestor = Ingestor::new(repo.clone(), ConversionRates::new());
        let platform = Platform::new("okx");
        let order = OpenOrder {
            o_id: "42".to_string(),
            platform: platform.clone(),
            symbol: "SOL/USDT".to_string(),
            order_type: "limit".to_string(),
            side: Side::Sell,
            amount: Decimal::from(5),
            price: Decimal::from(200),
        };
        repo.replace_open_orders(&platform, &[order.clone()])
            .await
            .unwrap();

        let snapshot = PlatformSnapshot {
            platform: platform.clone(),
            balances: vec![],
            trades: vec![],
            open_orders: None,
            tickers: vec![],
        };
        ingestor.ingest_platform(&snapshot).await.unwrap();

        assert_eq!(repo.query_open_orders(Some(&platform)).await.unwrap(), vec![order]);
    }

    #[tokio::test]
    async fn test_trade_ids_keep_identical_fills_apart() {
        let (repo, _temp) = setup_repo().await;
        let ingestor = Ingestor::new(repo.clone(), ConversionRates::new());
        let snapshot: PlatformSnapshot = serde_json::from_str(
            r#"{
                "platform": "binance",
                "trades": [
                    {"id": "7001", "timestamp": 1000, "base": "ETH", "quote": "USDT", "type": "buy",
                     "price": 2000, "amount": 1},
                    {"id": "7002", "timestamp": 1000, "base": "ETH", "quote": "USDT", "type": "buy",
                     "price": 2000, "amount": 1}
                ]
            }"#,
        )
        .unwrap();

        let result = ingestor.ingest_platform(&snapshot).await.unwrap();
        assert_eq!(result.trades_new, 2);

        let trades = repo.query_trades(None, None).await.unwrap();
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].trade_key, "tid:binance:7001");
    }

    #[tokio::test]
    async fn test_duplicate_balance_rejected_before_writes() {
        let (repo, _temp) = setup_repo().await;
        let ingestor = Ingestor::new(repo.clone(), ConversionRates::new());
        let platform = Platform::new("kucoin");
        repo.replace_balances(
            &platform,
            &[Balance::new(Symbol::new("SOL"), platform.clone(), Decimal::from(1), Decimal::from(1))],
        )
        .await
        .unwrap();

        let snapshot: PlatformSnapshot = serde_json::from_str(
            r#"{
                "platform": "kucoin",
                "balances": [{"base": "ETH", "balance": 1}, {"base": "eth", "balance": 2}]
            }"#,
        )
        .unwrap();

        let err = ingestor.ingest_platform(&snapshot).await.unwrap_err();
        assert!(matches!(
            err,
            IngestionError::DuplicateBalance { ref base, .. } if base == &Symbol::new("ETH")
        ));

        let balances = repo.query_balances(Some(&platform)).await.unwrap();
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].base, Symbol::new("SOL"));
    }

    #[tokio::test]
    async fn test_ingest_reference() {
        let (repo, _temp) = setup_repo().await;
        let ingestor = Ingestor::new(repo.clone(), ConversionRates::new());
        let snapshot: ReferenceSnapshot = serde_json::from_str(
            r#"{
                "marketCaps": [{"symbol": "SOL", "name": "Solana", "price": 150,
                    "percentChange24h": 1, "percentChange7d": 2, "percentChange30d": 3,
                    "percentChange60d": 4, "percentChange90d": 5, "cmcRank": 5, "iconId": 5426}],
                "strategies": [{"asset": "SOL", "strategies": {"okx": "Shad"}, "maxExposure": {"okx": 300}}]
            }"#,
        )
        .unwrap();

        ingestor.ingest_reference(&snapshot).await.unwrap();

        assert_eq!(repo.query_market_caps().await.unwrap().len(), 1);
        let strategies = repo.query_strategies().await.unwrap();
        assert!(strategies[0].is_configured_for(&Platform::new("okx")));
    }
}
