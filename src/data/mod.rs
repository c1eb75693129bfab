//! Core data models for Trade Pulse
//!
//! This module contains the entity types served by the API: trades, the
//! politicians who disclosed them, and the issuers that were traded, plus the
//! `Snapshot` that groups all three.

pub mod feed;
pub mod seed;
pub mod source;

pub use feed::{FeedClient, FeedError};
pub use seed::{seed_issuers, seed_politicians, seed_snapshot};
pub use source::{SeedSource, SnapshotSource, SourceError};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Direction of a disclosed transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    #[serde(alias = "buy", alias = "BUY")]
    Buy,
    #[serde(alias = "sell", alias = "SELL")]
    Sell,
}

/// Chamber of Congress a member sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chamber {
    #[serde(alias = "house", alias = "HOUSE")]
    House,
    #[serde(alias = "senate", alias = "SENATE")]
    Senate,
}

/// Political party affiliation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Party {
    Democrat,
    Republican,
    Independent,
}

/// A member of Congress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Politician {
    /// Unique identifier referenced by trades
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// Full display name
    pub name: String,
    pub party: Party,
    /// Two-letter state code
    pub state: String,
    pub chamber: Chamber,
    pub avatar_url: String,
}

impl Politician {
    /// Creates a politician, deriving the full display name from its parts
    pub fn new(
        id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        party: Party,
        state: impl Into<String>,
        chamber: Chamber,
        avatar_url: impl Into<String>,
    ) -> Self {
        let first_name = first_name.into();
        let last_name = last_name.into();
        let name = format!("{} {}", first_name, last_name).trim().to_string();
        Self {
            id: id.into(),
            first_name,
            last_name,
            name,
            party,
            state: state.into(),
            chamber,
            avatar_url: avatar_url.into(),
        }
    }
}

/// A traded security
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issuer {
    /// Ticker symbol, referenced by `Trade::issuer_id`
    pub symbol: String,
    pub name: String,
    pub sector: String,
}

/// A single disclosed stock transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: String,
    /// Date the transaction took place
    pub tx_date: NaiveDate,
    /// Date the disclosure was published
    pub pub_date: NaiveDate,
    pub politician_id: String,
    /// Ticker symbol of the traded issuer
    pub issuer_id: String,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    /// Display range, e.g. "$1,001 - $15,000"
    pub amount: String,
    /// Lower bound of the disclosed range in dollars
    pub size_low: u64,
    /// Upper bound of the disclosed range, if the bracket has one
    pub size_high: Option<u64>,
    pub chamber: Chamber,
}

/// The full set of trades, politicians and issuers held at a point in time
///
/// Trades are ordered by publication date, newest first. A trade may reference
/// a politician or issuer that is not part of the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub trades: Vec<Trade>,
    pub politicians: Vec<Politician>,
    pub issuers: Vec<Issuer>,
}

impl Snapshot {
    /// Looks up a politician by id
    pub fn politician(&self, id: &str) -> Option<&Politician> {
        self.politicians.iter().find(|p| p.id == id)
    }

    /// Looks up an issuer by ticker symbol
    pub fn issuer(&self, symbol: &str) -> Option<&Issuer> {
        self.issuers.iter().find(|i| i.symbol == symbol)
    }

    /// Sorts trades newest first by publication date, keeping the relative
    /// order of trades published on the same day
    pub fn sort_trades(&mut self) {
        self.trades.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));
    }
}

/// Formats a dollar amount with thousands separators, e.g. `15001` -> `"$15,001"`
pub fn format_dollars(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    format!("${}", out)
}

/// Builds the display label for a disclosed amount range
pub fn amount_label(low: u64, high: Option<u64>) -> String {
    match high {
        Some(high) => format!("{} - {}", format_dollars(low), format_dollars(high)),
        None => format!("Over {}", format_dollars(low)),
    }
}
