//! Diesel-backed implementation of the snapshot sink.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use log::debug;
use std::sync::Arc;

use super::model::{IndexSnapshotDB, StockSnapshotDB};
use crate::db::get_connection;
use crate::errors::IntoCore;
use crate::schema::index_snapshots::dsl as index_snapshots_dsl;
use crate::schema::stock_snapshots::dsl as stock_snapshots_dsl;
use bistpulse_core::pipeline::{IndexSnapshot, SnapshotSink, StockSnapshot};
use bistpulse_core::Result;

/// Batch size for multi-row upserts, well below SQLite's bind variable
/// limit even at a dozen columns per row.
const CHUNK_SIZE: usize = 100;

pub struct SnapshotRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl SnapshotRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SnapshotSink for SnapshotRepository {
    async fn save_index_snapshots(&self, snapshots: &[IndexSnapshot]) -> Result<usize> {
        if snapshots.is_empty() {
            return Ok(0);
        }

        let rows: Vec<IndexSnapshotDB> = snapshots.iter().map(IndexSnapshotDB::from).collect();
        let mut conn = get_connection(&self.pool)?;

        let mut total = 0;
        for chunk in rows.chunks(CHUNK_SIZE) {
            total += diesel::replace_into(index_snapshots_dsl::index_snapshots)
                .values(chunk)
                .execute(&mut conn)
                .into_core()?;
        }

        debug!("Saved {} index snapshots", total);
        Ok(total)
    }

    async fn save_stock_snapshots(&self, snapshots: &[StockSnapshot]) -> Result<usize> {
        if snapshots.is_empty() {
            return Ok(0);
        }

        let rows: Vec<StockSnapshotDB> = snapshots.iter().map(StockSnapshotDB::from).collect();
        let mut conn = get_connection(&self.pool)?;

        let mut total = 0;
        for chunk in rows.chunks(CHUNK_SIZE) {
            total += diesel::replace_into(stock_snapshots_dsl::stock_snapshots)
                .values(chunk)
                .execute(&mut conn)
                .into_core()?;
        }

        debug!("Saved {} stock snapshots", total);
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::memory_pool;
    use bistpulse_core::changes::{ChangeSet, WindowLabel};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn changes() -> ChangeSet {
        let mut set = ChangeSet::new();
        set.insert(WindowLabel::OneDay, dec!(1.25));
        set.insert(WindowLabel::OneMonth, dec!(-3.50));
        set
    }

    fn stock(symbol: &str) -> StockSnapshot {
        StockSnapshot {
            symbol: symbol.to_string(),
            parent_indices: vec!["XU030".to_string(), "XBANK".to_string()],
            price: dec!(45.12),
            changes: changes(),
            updated_at: Utc::now(),
        }
    }

    fn index(code: &str) -> IndexSnapshot {
        IndexSnapshot {
            code: code.to_string(),
            name: "BIST 100".to_string(),
            category: "Genel".to_string(),
            last_price: dec!(9876.54),
            changes: changes(),
            volume: "123.4M".to_string(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_save_index_snapshots_round_trip() {
        let repo = SnapshotRepository::new(memory_pool());

        let saved = repo.save_index_snapshots(&[index("XU100")]).await.unwrap();
        assert_eq!(saved, 1);

        let mut conn = get_connection(&repo.pool).unwrap();
        let row: IndexSnapshotDB = index_snapshots_dsl::index_snapshots
            .find("XU100")
            .first(&mut conn)
            .unwrap();
        assert_eq!(row.name, "BIST 100");
        assert_eq!(row.change_1d, 1.25);
        assert_eq!(row.change_1m, -3.5);
        // Windows without a computed change persist as zero.
        assert_eq!(row.change_3m, 0.0);
        assert_eq!(row.volume, "123.4M");
    }

    #[tokio::test]
    async fn test_save_stock_snapshots_joins_parents() {
        let repo = SnapshotRepository::new(memory_pool());

        repo.save_stock_snapshots(&[stock("AKBNK")]).await.unwrap();

        let mut conn = get_connection(&repo.pool).unwrap();
        let row: StockSnapshotDB = stock_snapshots_dsl::stock_snapshots
            .find("AKBNK")
            .first(&mut conn)
            .unwrap();
        assert_eq!(row.parent_indices, "XU030,XBANK");
        assert_eq!(row.price, 45.12);
    }

    #[tokio::test]
    async fn test_resave_overwrites_previous_cycle() {
        let repo = SnapshotRepository::new(memory_pool());

        repo.save_stock_snapshots(&[stock("AKBNK")]).await.unwrap();

        let mut updated = stock("AKBNK");
        updated.price = dec!(46.00);
        repo.save_stock_snapshots(&[updated]).await.unwrap();

        let mut conn = get_connection(&repo.pool).unwrap();
        let rows: Vec<StockSnapshotDB> = stock_snapshots_dsl::stock_snapshots
            .load(&mut conn)
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].price, 46.0);
    }

    #[tokio::test]
    async fn test_large_batch_is_chunked() {
        let repo = SnapshotRepository::new(memory_pool());

        let batch: Vec<StockSnapshot> =
            (0..250).map(|i| stock(&format!("SYM{:03}", i))).collect();
        let saved = repo.save_stock_snapshots(&batch).await.unwrap();
        assert_eq!(saved, 250);

        let mut conn = get_connection(&repo.pool).unwrap();
        let count: i64 = stock_snapshots_dsl::stock_snapshots
            .count()
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(count, 250);
    }

    #[tokio::test]
    async fn test_empty_batches_are_noops() {
        let repo = SnapshotRepository::new(memory_pool());
        assert_eq!(repo.save_index_snapshots(&[]).await.unwrap(), 0);
        assert_eq!(repo.save_stock_snapshots(&[]).await.unwrap(), 0);
    }
}
