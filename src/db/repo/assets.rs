//! Computed asset metrics records.

use crate::datasource::SnapshotError;
use crate::domain::{Asset, Platform, Symbol, TimeMs};
use sqlx::Row;
use tracing::info;

use super::Repository;

impl Repository {
    /// Replace the stored metrics with one freshly computed batch.
    pub async fn replace_assets(&self, assets: &[Asset]) -> Result<(), SnapshotError> {
        let computed_at = TimeMs::now().as_ms();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM asset_metrics")
            .execute(&mut *tx)
            .await?;

        for asset in assets {
            let payload = serde_json::to_string(asset)?;
            sqlx::query(
                r#"
                INSERT INTO asset_metrics (base, platform, payload, computed_at)
                VALUES (?, ?, ?, ?)
                ON CONFLICT(base, platform) DO UPDATE SET
                    payload = excluded.payload,
                    computed_at = excluded.computed_at
                "#,
            )
            .bind(asset.base.as_str())
            .bind(asset.platform.as_str())
            .bind(payload)
            .bind(computed_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!("Stored {} asset records", assets.len());
        Ok(())
    }

    pub async fn query_assets(
        &self,
        platform: Option<&Platform>,
        base: Option<&Symbol>,
    ) -> Result<Vec<Asset>, SnapshotError> {
        let rows = sqlx::query(
            r#"
            SELECT payload FROM asset_metrics
            WHERE (?1 IS NULL OR platform = ?1) AND (?2 IS NULL OR base = ?2)
            ORDER BY platform ASC, base ASC
            "#,
        )
        .bind(platform.map(|p| p.as_str()))
        .bind(base.map(|b| b.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let payload: String = row.try_get("payload")?;
                Ok(serde_json::from_str(&payload)?)
            })
            .collect()
    }

    /// Timestamp of the last stored batch, if any.
    pub async fn last_computed_at(&self) -> Result<Option<TimeMs>, sqlx::Error> {
        let row = sqlx::query("SELECT MAX(computed_at) AS computed_at FROM asset_metrics")
            .fetch_one(&self.pool)
            .await?;
        let computed_at: Option<i64> = row.try_get("computed_at")?;
        Ok(computed_at.map(TimeMs::new))
    }
}

#[cfg(test)]
mod tests {
    use crate::db::{init_db, Repository};
    use crate::domain::{Asset, Decimal, Platform, StrategyName, Symbol};
    use tempfile::TempDir;

    async fn setup_repo() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        (Repository::new(pool), temp_dir)
    }

    fn asset(base: &str, platform: &str) -> Asset {
        let mut asset = Asset::new(Symbol::new(base), Platform::new(platform));
        asset.live_data.balance = Decimal::from(3);
        asset.live_data.current_price = Decimal::from(150);
        asset.live_data.current_possession = Some(Decimal::from(450));
        asset.strat.strategy = StrategyName::Shad;
        asset
    }

    #[tokio::test]
    async fn test_replace_assets_overwrites_previous_batch() {
        let (repo, _temp) = setup_repo().await;
        assert!(repo.last_computed_at().await.unwrap().is_none());

        repo.replace_assets(&[asset("ETH", "binance"), asset("SOL", "okx")])
            .await
            .unwrap();
        repo.replace_assets(&[asset("BTC", "kucoin")]).await.unwrap();

        let stored = repo.query_assets(None, None).await.unwrap();
        assert_eq!(stored, vec![asset("BTC", "kucoin")]);
        assert!(repo.last_computed_at().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_query_assets_filters() {
        let (repo, _temp) = setup_repo().await;
        repo.replace_assets(&[
            asset("ETH", "binance"),
            asset("SOL", "binance"),
            asset("ETH", "okx"),
        ])
        .await
        .unwrap();

        let binance = repo
            .query_assets(Some(&Platform::new("binance")), None)
            .await
            .unwrap();
        assert_eq!(binance.len(), 2);

        let eth = repo
            .query_assets(None, Some(&Symbol::new("eth")))
            .await
            .unwrap();
        assert_eq!(eth.len(), 2);

        let one = repo
            .query_assets(Some(&Platform::new("okx")), Some(&Symbol::new("ETH")))
            .await
            .unwrap();
        assert_eq!(one, vec![asset("ETH", "okx")]);
    }
}
