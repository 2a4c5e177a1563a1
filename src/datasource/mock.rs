//! In-memory snapshot source for tests and local runs.

use super::{AssetStore, SnapshotError, SnapshotSource};
use crate::domain::{Asset, Balance, MarketCap, OpenOrder, Strategy, Ticker, Trade};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
pub struct MockSnapshotSource {
    balances: Vec<Balance>,
    trades: Vec<Trade>,
    open_orders: Vec<OpenOrder>,
    tickers: Vec<Ticker>,
    market_caps: Vec<MarketCap>,
    strategies: Vec<Strategy>,
    fail_with: Option<String>,
    saved: Arc<Mutex<Vec<Asset>>>,
}

impl MockSnapshotSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(mut self, balance: Balance) -> Self {
        self.balances.push(balance);
        self
    }

    pub fn with_trades(mut self, trades: Vec<Trade>) -> Self {
        self.trades.extend(trades);
        self
    }

    pub fn with_open_order(mut self, order: OpenOrder) -> Self {
        self.open_orders.push(order);
        self
    }

    pub fn with_ticker(mut self, ticker: Ticker) -> Self {
        self.tickers.push(ticker);
        self
    }

    pub fn with_market_cap(mut self, market_cap: MarketCap) -> Self {
        self.market_caps.push(market_cap);
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategies.push(strategy);
        self
    }

    /// Make every fetch fail, as an unreachable store would.
    pub fn failing(mut self, reason: &str) -> Self {
        self.fail_with = Some(reason.to_string());
        self
    }

    fn check(&self) -> Result<(), SnapshotError> {
        match &self.fail_with {
            Some(reason) => Err(SnapshotError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SnapshotSource for MockSnapshotSource {
    async fn fetch_balances(&self) -> Result<Vec<Balance>, SnapshotError> {
        self.check()?;
        Ok(self.balances.clone())
    }

    async fn fetch_trades(&self) -> Result<Vec<Trade>, SnapshotError> {
        self.check()?;
        Ok(self.trades.clone())
    }

    async fn fetch_open_orders(&self) -> Result<Vec<OpenOrder>, SnapshotError> {
        self.check()?;
        Ok(self.open_orders.clone())
    }

    async fn fetch_tickers(&self) -> Result<Vec<Ticker>, SnapshotError> {
        self.check()?;
        Ok(self.tickers.clone())
    }

    async fn fetch_market_caps(&self) -> Result<Vec<MarketCap>, SnapshotError> {
        self.check()?;
        Ok(self.market_caps.clone())
    }

    async fn fetch_strategies(&self) -> Result<Vec<Strategy>, SnapshotError> {
        self.check()?;
        Ok(self.strategies.clone())
    }
}

#[async_trait]
impl AssetStore for MockSnapshotSource {
    async fn save_assets(&self, assets: &[Asset]) -> Result<(), SnapshotError> {
        self.check()?;
        let mut saved = self
            .saved
            .lock()
            .map_err(|_| SnapshotError::Unavailable("asset store poisoned".to_string()))?;
        *saved = assets.to_vec();
        Ok(())
    }

    async fn load_assets(&self) -> Result<Vec<Asset>, SnapshotError> {
        self.check()?;
        let saved = self
            .saved
            .lock()
            .map_err(|_| SnapshotError::Unavailable("asset store poisoned".to_string()))?;
        Ok(saved.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Decimal, Platform, Symbol};

    #[test]
    fn test_mock_returns_configured_balances() {
        let mock = MockSnapshotSource::new().with_balance(Balance::new(
            Symbol::new("ETH"),
            Platform::new("binance"),
            Decimal::one(),
            Decimal::one(),
        ));
        let balances = tokio_test::block_on(mock.fetch_balances()).unwrap();
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].base, Symbol::new("ETH"));
    }

    #[tokio::test]
    async fn test_mock_failure_surfaces_as_unavailable() {
        let mock = MockSnapshotSource::new().failing("offline");
        let err = mock.fetch_trades().await.unwrap_err();
        assert!(matches!(err, SnapshotError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_mock_store_replaces_saved_assets() {
        let mock = MockSnapshotSource::new();
        let eth = Asset::new(Symbol::new("ETH"), Platform::new("binance"));
        let sol = Asset::new(Symbol::new("SOL"), Platform::new("okx"));

        mock.save_assets(&[eth.clone(), sol]).await.unwrap();
        mock.save_assets(&[eth.clone()]).await.unwrap();

        assert_eq!(mock.load_assets().await.unwrap(), vec![eth]);
    }
}
