//! The injected instrument catalog.
//!
//! The index list and index-to-constituent mapping are static configuration
//! data, loaded once and passed into the cycle driver as a read-only object.
//! Nothing in this crate hardcodes symbols, which keeps test fixtures cheap
//! to substitute.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::Result;

/// One tracked index: symbol plus display metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexInfo {
    /// Provider symbol, e.g. "XU100.IS".
    pub code: String,
    /// Display name, e.g. "BIST 100".
    pub name: String,
    /// Grouping category, e.g. "Genel" or "Sektor".
    pub category: String,
}

/// Read-only catalog of tracked indices and their member stocks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentCatalog {
    indices: Vec<IndexInfo>,
    /// Index code -> member symbols. Stocks may appear under several indices.
    constituents: BTreeMap<String, Vec<String>>,
}

impl InstrumentCatalog {
    pub fn new(indices: Vec<IndexInfo>, constituents: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            indices,
            constituents,
        }
    }

    /// Parses a catalog from its JSON representation.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let catalog: InstrumentCatalog = serde_json::from_str(raw)?;
        Ok(catalog)
    }

    pub fn indices(&self) -> &[IndexInfo] {
        &self.indices
    }

    /// All member symbols across every index, deduplicated and sorted.
    pub fn unique_stocks(&self) -> Vec<String> {
        let mut stocks: Vec<String> = self
            .constituents
            .values()
            .flatten()
            .cloned()
            .collect();
        stocks.sort();
        stocks.dedup();
        stocks
    }

    /// The index codes (cleaned of the provider suffix) that `symbol`
    /// belongs to, in catalog order.
    pub fn parents_of(&self, symbol: &str) -> Vec<String> {
        self.constituents
            .iter()
            .filter(|(_, members)| members.iter().any(|m| m == symbol))
            .map(|(code, _)| display_symbol(code).to_string())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty() && self.constituents.is_empty()
    }
}

/// Strips the Yahoo exchange suffix for storage and display: "THYAO.IS"
/// becomes "THYAO".
pub fn display_symbol(symbol: &str) -> &str {
    symbol.strip_suffix(".IS").unwrap_or(symbol)
}
