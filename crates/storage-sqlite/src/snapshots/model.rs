//! Database row types for the snapshot tables.
//!
//! Change columns are flattened per window label; parent indices are stored
//! as a comma-joined string, which is enough for the read side and avoids a
//! join table for what is static catalog data.

use bistpulse_core::changes::WindowLabel;
use bistpulse_core::pipeline::{IndexSnapshot, StockSnapshot};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;

use crate::schema::{index_snapshots, stock_snapshots};

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

#[derive(Debug, Clone, Queryable, Insertable, Identifiable)]
#[diesel(table_name = index_snapshots)]
#[diesel(primary_key(code))]
pub struct IndexSnapshotDB {
    pub code: String,
    pub name: String,
    pub category: String,
    pub last_price: f64,
    pub change_1d: f64,
    pub change_1w: f64,
    pub change_2w: f64,
    pub change_3w: f64,
    pub change_1m: f64,
    pub change_3m: f64,
    pub volume: String,
    pub updated_at: NaiveDateTime,
}

impl From<&IndexSnapshot> for IndexSnapshotDB {
    fn from(snapshot: &IndexSnapshot) -> Self {
        Self {
            code: snapshot.code.clone(),
            name: snapshot.name.clone(),
            category: snapshot.category.clone(),
            last_price: to_f64(snapshot.last_price),
            change_1d: to_f64(snapshot.changes.percent(WindowLabel::OneDay)),
            change_1w: to_f64(snapshot.changes.percent(WindowLabel::OneWeek)),
            change_2w: to_f64(snapshot.changes.percent(WindowLabel::TwoWeeks)),
            change_3w: to_f64(snapshot.changes.percent(WindowLabel::ThreeWeeks)),
            change_1m: to_f64(snapshot.changes.percent(WindowLabel::OneMonth)),
            change_3m: to_f64(snapshot.changes.percent(WindowLabel::ThreeMonths)),
            volume: snapshot.volume.clone(),
            updated_at: snapshot.updated_at.naive_utc(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Insertable, Identifiable)]
#[diesel(table_name = stock_snapshots)]
#[diesel(primary_key(symbol))]
pub struct StockSnapshotDB {
    pub symbol: String,
    pub parent_indices: String,
    pub price: f64,
    pub change_1d: f64,
    pub change_1w: f64,
    pub change_2w: f64,
    pub change_3w: f64,
    pub change_1m: f64,
    pub change_3m: f64,
    pub updated_at: NaiveDateTime,
}

impl From<&StockSnapshot> for StockSnapshotDB {
    fn from(snapshot: &StockSnapshot) -> Self {
        Self {
            symbol: snapshot.symbol.clone(),
            parent_indices: snapshot.parent_indices.join(","),
            price: to_f64(snapshot.price),
            change_1d: to_f64(snapshot.changes.percent(WindowLabel::OneDay)),
            change_1w: to_f64(snapshot.changes.percent(WindowLabel::OneWeek)),
            change_2w: to_f64(snapshot.changes.percent(WindowLabel::TwoWeeks)),
            change_3w: to_f64(snapshot.changes.percent(WindowLabel::ThreeWeeks)),
            change_1m: to_f64(snapshot.changes.percent(WindowLabel::OneMonth)),
            change_3m: to_f64(snapshot.changes.percent(WindowLabel::ThreeMonths)),
            updated_at: snapshot.updated_at.naive_utc(),
        }
    }
}
