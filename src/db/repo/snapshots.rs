//! Exchange and market snapshot operations for the repository.

use crate::datasource::SnapshotError;
use crate::domain::{
    Balance, MarketCap, OpenOrder, Platform, Strategy, Symbol, Ticker, TimeMs, Trade,
};
use sqlx::Row;
use tracing::debug;

use super::{decimal_col, side_col, Repository};

impl Repository {
    /// Replace every balance of `platform` with `balances` in one transaction.
    pub async fn replace_balances(
        &self,
        platform: &Platform,
        balances: &[Balance],
    ) -> Result<(), sqlx::Error> {
        let now = TimeMs::now().as_ms();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM balances WHERE platform = ?")
            .bind(platform.as_str())
            .execute(&mut *tx)
            .await?;

        let mut inserted = 0;
        for balance in balances.iter().filter(|b| &b.platform == platform) {
            sqlx::query(
                r#"
                INSERT INTO balances (base, platform, balance, available, updated_at)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(balance.base.as_str())
            .bind(balance.platform.as_str())
            .bind(balance.balance.to_canonical_string())
            .bind(balance.available.to_canonical_string())
            .bind(now)
            .execute(&mut *tx)
            .await?;
            inserted += 1;
        }

        tx.commit().await?;
        debug!("Replaced {} balances on {}", inserted, platform);
        Ok(())
    }

    pub async fn query_balances(
        &self,
        platform: Option<&Platform>,
    ) -> Result<Vec<Balance>, SnapshotError> {
        let rows = match platform {
            Some(p) => {
                sqlx::query(
                    "SELECT base, platform, balance, available FROM balances WHERE platform = ? ORDER BY base",
                )
                .bind(p.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT base, platform, balance, available FROM balances ORDER BY platform, base",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter()
            .map(|row| {
                Ok(Balance {
                    base: Symbol::new(row.try_get::<String, _>("base")?),
                    platform: Platform::new(row.try_get::<String, _>("platform")?),
                    balance: decimal_col(row, "balance", "balance")?,
                    available: decimal_col(row, "available", "balance")?,
                })
            })
            .collect()
    }

    /// Insert trades, ignoring ones already stored. Returns the number inserted.
    pub async fn insert_trades_batch(&self, trades: &[Trade]) -> Result<usize, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for trade in trades {
            let result = sqlx::query(
                r#"
                INSERT INTO trades (
                    trade_key, base, quote, pair, time_ms, side, price, amount,
                    total, fee, feecoin, platform, total_usdt, trade_id
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(trade_key) DO NOTHING
                "#,
            )
            .bind(trade.trade_key.as_str())
            .bind(trade.base.as_str())
            .bind(trade.quote.as_str())
            .bind(trade.pair.as_str())
            .bind(trade.time_ms.as_ms())
            .bind(trade.side.to_string())
            .bind(trade.price.to_canonical_string())
            .bind(trade.amount.to_canonical_string())
            .bind(trade.total.to_canonical_string())
            .bind(trade.fee.to_canonical_string())
            .bind(trade.feecoin.as_str())
            .bind(trade.platform.as_str())
            .bind(trade.total_usdt.to_canonical_string())
            .bind(trade.trade_id.as_deref())
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected() as usize;
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Trades ordered by time, optionally narrowed to one asset and/or platform.
    pub async fn query_trades(
        &self,
        base: Option<&Symbol>,
        platform: Option<&Platform>,
    ) -> Result<Vec<Trade>, SnapshotError> {
        let rows = sqlx::query(
            r#"
            SELECT trade_key, base, quote, pair, time_ms, side, price, amount,
                   total, fee, feecoin, platform, total_usdt, trade_id
            FROM trades
            WHERE (?1 IS NULL OR base = ?1) AND (?2 IS NULL OR platform = ?2)
            ORDER BY time_ms ASC, trade_key ASC
            "#,
        )
        .bind(base.map(|b| b.as_str()))
        .bind(platform.map(|p| p.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(Trade {
                    trade_key: row.try_get("trade_key")?,
                    base: Symbol::new(row.try_get::<String, _>("base")?),
                    quote: Symbol::new(row.try_get::<String, _>("quote")?),
                    pair: row.try_get("pair")?,
                    time_ms: TimeMs::new(row.try_get("time_ms")?),
                    side: side_col(row, "trade")?,
                    price: decimal_col(row, "price", "trade")?,
                    amount: decimal_col(row, "amount", "trade")?,
                    total: decimal_col(row, "total", "trade")?,
                    fee: decimal_col(row, "fee", "trade")?,
                    feecoin: Symbol::new(row.try_get::<String, _>("feecoin")?),
                    platform: Platform::new(row.try_get::<String, _>("platform")?),
                    total_usdt: decimal_col(row, "total_usdt", "trade")?,
                    trade_id: row.try_get("trade_id")?,
                })
            })
            .collect()
    }

    /// Replace every open order of `platform` with `orders`.
    pub async fn replace_open_orders(
        &self,
        platform: &Platform,
        orders: &[OpenOrder],
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM open_orders WHERE platform = ?")
            .bind(platform.as_str())
            .execute(&mut *tx)
            .await?;

        for order in orders.iter().filter(|o| &o.platform == platform) {
            sqlx::query(
                r#"
                INSERT INTO open_orders (o_id, platform, symbol, order_type, side, amount, price)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(o_id, platform) DO UPDATE SET
                    symbol = excluded.symbol,
                    order_type = excluded.order_type,
                    side = excluded.side,
                    amount = excluded.amount,
                    price = excluded.price
                "#,
            )
            .bind(order.o_id.as_str())
            .bind(order.platform.as_str())
            .bind(order.symbol.as_str())
            .bind(order.order_type.as_str())
            .bind(order.side.to_string())
            .bind(order.amount.to_canonical_string())
            .bind(order.price.to_canonical_string())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await
    }

    pub async fn query_open_orders(
        &self,
        platform: Option<&Platform>,
    ) -> Result<Vec<OpenOrder>, SnapshotError> {
        let rows = sqlx::query(
            r#"
            SELECT o_id, platform, symbol, order_type, side, amount, price
            FROM open_orders
            WHERE (?1 IS NULL OR platform = ?1)
            ORDER BY platform, symbol, o_id
            "#,
        )
        .bind(platform.map(|p| p.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(OpenOrder {
                    o_id: row.try_get("o_id")?,
                    platform: Platform::new(row.try_get::<String, _>("platform")?),
                    symbol: row.try_get("symbol")?,
                    order_type: row.try_get("order_type")?,
                    side: side_col(row, "open order")?,
                    amount: decimal_col(row, "amount", "open order")?,
                    price: decimal_col(row, "price", "open order")?,
                })
            })
            .collect()
    }

    /// Keep the latest ticker per (symbol, platform); older snapshots never overwrite newer ones.
    pub async fn upsert_tickers(&self, tickers: &[Ticker]) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for ticker in tickers {
            sqlx::query(
                r#"
                INSERT INTO tickers (symbol, platform, time_ms, last)
                VALUES (?, ?, ?, ?)
                ON CONFLICT(symbol, platform) DO UPDATE SET
                    time_ms = excluded.time_ms,
                    last = excluded.last
                WHERE excluded.time_ms >= tickers.time_ms
                "#,
            )
            .bind(ticker.symbol.to_ascii_uppercase())
            .bind(ticker.platform.as_str())
            .bind(ticker.time_ms.as_ms())
            .bind(ticker.last.to_canonical_string())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await
    }

    pub async fn query_tickers(&self) -> Result<Vec<Ticker>, SnapshotError> {
        let rows = sqlx::query(
            "SELECT symbol, platform, time_ms, last FROM tickers ORDER BY platform, symbol",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(Ticker {
                    symbol: row.try_get("symbol")?,
                    time_ms: TimeMs::new(row.try_get("time_ms")?),
                    last: decimal_col(row, "last", "ticker")?,
                    platform: Platform::new(row.try_get::<String, _>("platform")?),
                })
            })
            .collect()
    }

    pub async fn upsert_market_caps(&self, market_caps: &[MarketCap]) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for cap in market_caps {
            sqlx::query(
                r#"
                INSERT INTO market_caps (
                    symbol, name, price, percent_change_24h, percent_change_7d,
                    percent_change_30d, percent_change_60d, percent_change_90d,
                    cmc_rank, icon_id
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(symbol) DO UPDATE SET
                    name = excluded.name,
                    price = excluded.price,
                    percent_change_24h = excluded.percent_change_24h,
                    percent_change_7d = excluded.percent_change_7d,
                    percent_change_30d = excluded.percent_change_30d,
                    percent_change_60d = excluded.percent_change_60d,
                    percent_change_90d = excluded.percent_change_90d,
                    cmc_rank = excluded.cmc_rank,
                    icon_id = excluded.icon_id
                "#,
            )
            .bind(cap.symbol.as_str())
            .bind(cap.name.as_str())
            .bind(cap.price.to_canonical_string())
            .bind(cap.percent_change_24h.to_canonical_string())
            .bind(cap.percent_change_7d.to_canonical_string())
            .bind(cap.percent_change_30d.to_canonical_string())
            .bind(cap.percent_change_60d.to_canonical_string())
            .bind(cap.percent_change_90d.to_canonical_string())
            .bind(cap.cmc_rank)
            .bind(cap.icon_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await
    }

    pub async fn query_market_caps(&self) -> Result<Vec<MarketCap>, SnapshotError> {
        let rows = sqlx::query(
            r#"
            SELECT symbol, name, price, percent_change_24h, percent_change_7d,
                   percent_change_30d, percent_change_60d, percent_change_90d,
                   cmc_rank, icon_id
            FROM market_caps
            ORDER BY cmc_rank ASC, symbol ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(MarketCap {
                    symbol: Symbol::new(row.try_get::<String, _>("symbol")?),
                    name: row.try_get("name")?,
                    price: decimal_col(row, "price", "market cap")?,
                    percent_change_24h: decimal_col(row, "percent_change_24h", "market cap")?,
                    percent_change_7d: decimal_col(row, "percent_change_7d", "market cap")?,
                    percent_change_30d: decimal_col(row, "percent_change_30d", "market cap")?,
                    percent_change_60d: decimal_col(row, "percent_change_60d", "market cap")?,
                    percent_change_90d: decimal_col(row, "percent_change_90d", "market cap")?,
                    cmc_rank: row.try_get("cmc_rank")?,
                    icon_id: row.try_get("icon_id")?,
                })
            })
            .collect()
    }

    pub async fn upsert_strategy(&self, strategy: &Strategy) -> Result<(), SnapshotError> {
        let payload = serde_json::to_string(strategy)?;
        sqlx::query(
            r#"
            INSERT INTO strategies (asset, payload, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(asset) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(strategy.asset.as_str())
        .bind(payload)
        .bind(TimeMs::now().as_ms())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn query_strategies(&self) -> Result<Vec<Strategy>, SnapshotError> {
        let rows = sqlx::query("SELECT payload FROM strategies ORDER BY asset")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                let payload: String = row.try_get("payload")?;
                Ok(serde_json::from_str(&payload)?)
            })
            .collect()
    }
}
