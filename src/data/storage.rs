use {
    crate::{domain::Candle, overlay::Annotation},
    anyhow::Result,
    async_trait::async_trait,
    sqlx::{
        ConnectOptions, Pool, QueryBuilder, Row, Sqlite,
        sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    },
    std::{str::FromStr, time::Duration},
};

#[async_trait]
pub trait CandleStorage: Send + Sync {
    async fn last_candle_time(&self, symbol: &str, interval: &str) -> Result<Option<i64>>;
    async fn insert_candles(&self, symbol: &str, interval: &str, candles: &[Candle])
    -> Result<u64>;
    async fn load_candles(&self, symbol: &str, interval: &str) -> Result<Vec<Candle>>;
}

/// Durable per-user, per-symbol annotation storage. Both operations are
/// idempotent: `save` replaces the whole set for its (user, symbol) key.
#[async_trait]
pub trait AnnotationStorage: Send + Sync {
    async fn load(&self, user: &str, symbol: &str) -> Result<Vec<Annotation>>;
    async fn save(&self, user: &str, symbol: &str, annotations: &[Annotation]) -> Result<()>;
}

pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    pub async fn open(db_path: &str) -> Result<Self> {
        let connection_options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(60))
            .synchronous(SqliteSynchronous::Normal)
            .log_slow_statements(log::LevelFilter::Warn, Duration::from_secs(10));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connection_options)
            .await?;

        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS klines (
                symbol TEXT NOT NULL,
                interval TEXT NOT NULL,
                open_time INTEGER NOT NULL,
                open REAL NOT NULL,
                high REAL NOT NULL,
                low REAL NOT NULL,
                close REAL NOT NULL,
                volume REAL NOT NULL,
                PRIMARY KEY (symbol, interval, open_time)
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS annotations (
                user TEXT NOT NULL,
                symbol TEXT NOT NULL,
                payload TEXT NOT NULL,
                updated_ms INTEGER NOT NULL,
                PRIMARY KEY (user, symbol)
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl CandleStorage for SqliteStore {
    async fn last_candle_time(&self, symbol: &str, interval: &str) -> Result<Option<i64>> {
        let row = sqlx::query(
            r#"
            SELECT MAX(open_time) as last_time
            FROM klines
            WHERE symbol = ? AND interval = ?
            "#,
        )
        .bind(symbol)
        .bind(interval)
        .fetch_one(&self.pool)
        .await?;

        let last_time: Option<i64> = row.try_get("last_time")?;
        Ok(last_time)
    }

    /// Batches in chunks of 3000 rows to stay within SQLite's parameter limit.
    async fn insert_candles(
        &self,
        symbol: &str,
        interval: &str,
        candles: &[Candle],
    ) -> Result<u64> {
        if candles.is_empty() {
            return Ok(0);
        }

        for chunk in candles.chunks(3000) {
            let mut query_builder = QueryBuilder::new(
                "INSERT OR IGNORE INTO klines (symbol, interval, open_time, open, high, low, close, volume) ",
            );

            query_builder.push_values(chunk, |mut b, c| {
                b.push_bind(symbol)
                    .push_bind(interval)
                    .push_bind(c.timestamp_ms)
                    .push_bind(c.open_price)
                    .push_bind(c.high_price)
                    .push_bind(c.low_price)
                    .push_bind(c.close_price)
                    .push_bind(c.volume);
            });

            query_builder.build().execute(&self.pool).await?;
        }

        Ok(candles.len() as u64)
    }

    async fn load_candles(&self, symbol: &str, interval: &str) -> Result<Vec<Candle>> {
        let rows = sqlx::query(
            r#"
            SELECT open_time, open, high, low, close, volume
            FROM klines
            WHERE symbol = ? AND interval = ?
            ORDER BY open_time ASC
            "#,
        )
        .bind(symbol)
        .bind(interval)
        .fetch_all(&self.pool)
        .await?;

        let candles = rows
            .iter()
            .map(|row| {
                Candle::new(
                    row.get("open_time"),
                    row.get("open"),
                    row.get("high"),
                    row.get("low"),
                    row.get("close"),
                    row.get("volume"),
                )
            })
            .collect();

        Ok(candles)
    }
}

#[async_trait]
impl AnnotationStorage for SqliteStore {
    async fn load(&self, user: &str, symbol: &str) -> Result<Vec<Annotation>> {
        let row = sqlx::query(
            r#"
            SELECT payload FROM annotations
            WHERE user = ? AND symbol = ?
            "#,
        )
        .bind(user)
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let payload: String = row.try_get("payload")?;
                let annotations: Vec<Annotation> = serde_json::from_str(&payload)?;
                Ok(annotations)
            }
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, user: &str, symbol: &str, annotations: &[Annotation]) -> Result<()> {
        let payload = serde_json::to_string(annotations)?;
        sqlx::query(
            r#"
            INSERT INTO annotations (user, symbol, payload, updated_ms)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (user, symbol) DO UPDATE SET
                payload = excluded.payload,
                updated_ms = excluded.updated_ms
            "#,
        )
        .bind(user)
        .bind(symbol)
        .bind(payload)
        .bind(crate::utils::now_timestamp_ms())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::{Anchor, AnnotationKind};
    use tokio::runtime::Runtime;

    fn scratch_store(rt: &Runtime) -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let store = rt
            .block_on(SqliteStore::open(path.to_str().unwrap()))
            .unwrap();
        (dir, store)
    }

    #[test]
    fn annotations_round_trip_per_user_and_symbol() {
        let rt = Runtime::new().unwrap();
        let (_dir, store) = scratch_store(&rt);

        let anns = vec![Annotation::new(
            AnnotationKind::TrendLine,
            vec![Anchor::new(100, 50.0), Anchor::new(200, 60.0)],
        )];

        rt.block_on(store.save("local", "BTCUSDT", &anns)).unwrap();

        let loaded = rt.block_on(store.load("local", "BTCUSDT")).unwrap();
        assert_eq!(loaded, anns);

        // Symbol scoping: another ticker sees nothing.
        let other = rt.block_on(store.load("local", "ETHUSDT")).unwrap();
        assert!(other.is_empty());
    }

    #[test]
    fn save_replaces_the_whole_set() {
        let rt = Runtime::new().unwrap();
        let (_dir, store) = scratch_store(&rt);

        let first = vec![Annotation::new(
            AnnotationKind::HorizontalLine,
            vec![Anchor::new(0, 42.0)],
        )];
        rt.block_on(store.save("local", "BTCUSDT", &first)).unwrap();
        rt.block_on(store.save("local", "BTCUSDT", &[])).unwrap();

        let loaded = rt.block_on(store.load("local", "BTCUSDT")).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn candles_insert_is_idempotent() {
        let rt = Runtime::new().unwrap();
        let (_dir, store) = scratch_store(&rt);

        let candles: Vec<Candle> = (0..10)
            .map(|i| Candle::new(i * 1_000, 1.0, 2.0, 0.5, 1.5, 10.0))
            .collect();

        rt.block_on(store.insert_candles("BTCUSDT", "1h", &candles))
            .unwrap();
        rt.block_on(store.insert_candles("BTCUSDT", "1h", &candles))
            .unwrap();

        let loaded = rt.block_on(store.load_candles("BTCUSDT", "1h")).unwrap();
        assert_eq!(loaded.len(), 10);
        assert_eq!(
            rt.block_on(store.last_candle_time("BTCUSDT", "1h")).unwrap(),
            Some(9_000)
        );
    }
}
