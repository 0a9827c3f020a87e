//! Diesel-backed implementation of the price history store.

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::model::PriceHistoryDB;
use crate::db::get_connection;
use crate::errors::IntoCore;
use crate::schema::price_history::dsl as price_history_dsl;
use bistpulse_core::pipeline::PriceHistoryStore;
use bistpulse_core::Result;

pub struct PriceHistoryRepository {
    pool: Arc<Pool<ConnectionManager<SqliteConnection>>>,
}

impl PriceHistoryRepository {
    pub fn new(pool: Arc<Pool<ConnectionManager<SqliteConnection>>>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PriceHistoryStore for PriceHistoryRepository {
    fn get(&self, symbol: &str, date: NaiveDate) -> Result<Option<Decimal>> {
        let mut conn = get_connection(&self.pool)?;

        let row = price_history_dsl::price_history
            .filter(price_history_dsl::symbol.eq(symbol))
            .filter(price_history_dsl::date.eq(date))
            .first::<PriceHistoryDB>(&mut conn)
            .optional()
            .into_core()?;

        Ok(row.map(|r| r.close_decimal()))
    }

    async fn upsert(&self, symbol: &str, date: NaiveDate, close: Decimal) -> Result<()> {
        let row = PriceHistoryDB::new(symbol, date, close)?;
        let mut conn = get_connection(&self.pool)?;

        diesel::replace_into(price_history_dsl::price_history)
            .values(&row)
            .execute(&mut conn)
            .into_core()?;

        Ok(())
    }
}
