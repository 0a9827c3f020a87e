//! Database row type for the price history table.

use bistpulse_core::errors::{DatabaseError, Error, Result};
use chrono::NaiveDate;
use diesel::prelude::*;
use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::schema::price_history;

#[derive(Debug, Clone, Queryable, Insertable, Identifiable)]
#[diesel(table_name = price_history)]
#[diesel(primary_key(symbol, date))]
pub struct PriceHistoryDB {
    pub symbol: String,
    pub date: NaiveDate,
    pub close: f64,
}

impl PriceHistoryDB {
    pub fn new(symbol: &str, date: NaiveDate, close: Decimal) -> Result<Self> {
        let close = close.to_f64().ok_or_else(|| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "close {} not representable as f64",
                close
            )))
        })?;
        Ok(Self {
            symbol: symbol.to_string(),
            date,
            close,
        })
    }

    pub fn close_decimal(&self) -> Decimal {
        Decimal::from_f64(self.close).unwrap_or(Decimal::ZERO)
    }
}
