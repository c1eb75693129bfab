//! Disclosure feed client
//!
//! Fetches politicians, issuers and trades from an external feed and reshapes
//! the raw records into our entity types. The feed is a base URL serving three
//! JSON documents: `politicians.json`, `issuers.json` and `trades.json`.

use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::seed::avatar_url;
use super::{amount_label, Chamber, Issuer, Party, Politician, Snapshot, Trade, TransactionType};

/// Default request timeout for feed fetches
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Sector used when the feed does not classify an issuer
const UNKNOWN_SECTOR: &str = "Unknown";

/// Errors that can occur when fetching the feed
#[derive(Debug, Error)]
pub enum FeedError {
    /// HTTP request failed (connection, timeout, body read)
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The feed answered with a non-success status
    #[error("Feed returned HTTP {status} for {url}")]
    Status { status: StatusCode, url: String },

    /// Failed to parse a feed document
    #[error("Failed to parse {document}: {source}")]
    ParseError {
        document: &'static str,
        source: serde_json::Error,
    },
}

/// A politician record as published by the feed
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FeedPolitician {
    id: String,
    first_name: String,
    last_name: String,
    #[serde(default)]
    party: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    chamber: Option<String>,
    #[serde(default)]
    avatar_url: Option<String>,
}

/// An issuer record as published by the feed
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FeedIssuer {
    ticker: String,
    name: String,
    #[serde(default)]
    sector: Option<String>,
}

/// A trade record as published by the feed
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FeedTrade {
    id: String,
    tx_date: String,
    pub_date: String,
    politician_id: String,
    ticker: String,
    tx_type: String,
    size_low: u64,
    #[serde(default)]
    size_high: Option<u64>,
    #[serde(default)]
    chamber: Option<String>,
}

/// Client for fetching the disclosure feed
#[derive(Debug, Clone)]
pub struct FeedClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Base URL the three feed documents live under
    base_url: String,
}

impl FeedClient {
    /// Creates a new FeedClient for the given base URL with the default timeout
    pub fn new(base_url: impl Into<String>) -> Result<Self, FeedError> {
        Self::with_timeout(base_url, DEFAULT_FETCH_TIMEOUT)
    }

    /// Creates a new FeedClient with a custom request timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http_client, base_url))
    }

    /// Creates a new FeedClient with a custom HTTP client
    pub fn with_client(http_client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http_client,
            base_url,
        }
    }

    /// Returns the base URL this client fetches from
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches all three feed documents concurrently and reshapes them
    ///
    /// # Returns
    /// * `Ok(Snapshot)` - Reshaped snapshot, trades sorted newest first
    /// * `Err(FeedError)` - If any document fails to download or parse
    pub async fn fetch_snapshot(&self) -> Result<Snapshot, FeedError> {
        let (politicians, issuers, trades) = futures::try_join!(
            self.fetch_document::<Vec<FeedPolitician>>("politicians.json"),
            self.fetch_document::<Vec<FeedIssuer>>("issuers.json"),
            self.fetch_document::<Vec<FeedTrade>>("trades.json"),
        )?;

        debug!(
            politicians = politicians.len(),
            issuers = issuers.len(),
            trades = trades.len(),
            "Fetched feed documents"
        );

        Ok(reshape(politicians, issuers, trades))
    }

    /// Downloads and parses one feed document
    async fn fetch_document<T: DeserializeOwned>(
        &self,
        document: &'static str,
    ) -> Result<T, FeedError> {
        let url = format!("{}/{}", self.base_url, document);

        let response = self.http_client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status { status, url });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|source| FeedError::ParseError { document, source })
    }
}

/// Reshapes raw feed records into a snapshot
///
/// Trades with unparseable dates or unsupported transaction types are dropped.
pub(crate) fn reshape(
    politicians: Vec<FeedPolitician>,
    issuers: Vec<FeedIssuer>,
    trades: Vec<FeedTrade>,
) -> Snapshot {
    let politicians: Vec<Politician> = politicians.into_iter().map(reshape_politician).collect();
    let issuers: Vec<Issuer> = issuers.into_iter().map(reshape_issuer).collect();

    let chambers: HashMap<&str, Chamber> = politicians
        .iter()
        .map(|p| (p.id.as_str(), p.chamber))
        .collect();

    let trades: Vec<Trade> = trades
        .into_iter()
        .filter_map(|record| {
            let chamber = chambers.get(record.politician_id.as_str()).copied();
            reshape_trade(record, chamber)
        })
        .collect();

    let mut snapshot = Snapshot {
        trades,
        politicians,
        issuers,
    };
    snapshot.sort_trades();
    snapshot
}

fn reshape_politician(record: FeedPolitician) -> Politician {
    let party = record.party.as_deref().map(parse_party).unwrap_or(Party::Independent);
    let chamber = record
        .chamber
        .as_deref()
        .and_then(parse_chamber)
        .unwrap_or(Chamber::House);
    let avatar = record
        .avatar_url
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| avatar_url(&record.first_name));

    Politician::new(
        record.id,
        record.first_name,
        record.last_name,
        party,
        record.state.unwrap_or_default().to_uppercase(),
        chamber,
        avatar,
    )
}

fn reshape_issuer(record: FeedIssuer) -> Issuer {
    Issuer {
        symbol: record.ticker.trim().to_uppercase(),
        name: record.name,
        sector: record
            .sector
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_SECTOR.to_string()),
    }
}

/// Reshapes a trade record, using `politician_chamber` when the record has none
fn reshape_trade(record: FeedTrade, politician_chamber: Option<Chamber>) -> Option<Trade> {
    let Some(tx_type) = parse_transaction_type(&record.tx_type) else {
        debug!(id = %record.id, tx_type = %record.tx_type, "Skipping unsupported transaction type");
        return None;
    };

    let (tx_date, pub_date) = match (parse_date(&record.tx_date), parse_date(&record.pub_date)) {
        (Some(tx), Some(publ)) => (tx, publ),
        _ => {
            warn!(id = %record.id, "Dropping feed trade with invalid dates");
            return None;
        }
    };

    let chamber = record
        .chamber
        .as_deref()
        .and_then(parse_chamber)
        .or(politician_chamber)
        .unwrap_or(Chamber::House);

    Some(Trade {
        id: record.id,
        tx_date,
        pub_date,
        politician_id: record.politician_id,
        issuer_id: record.ticker.trim().to_uppercase(),
        tx_type,
        amount: amount_label(record.size_low, record.size_high),
        size_low: record.size_low,
        size_high: record.size_high,
        chamber,
    })
}

/// Parses a party name or abbreviation, defaulting to Independent
pub(crate) fn parse_party(s: &str) -> Party {
    match s.trim().to_lowercase().as_str() {
        "d" | "dem" | "democrat" | "democratic" => Party::Democrat,
        "r" | "rep" | "republican" => Party::Republican,
        _ => Party::Independent,
    }
}

/// Parses a chamber name or abbreviation
pub(crate) fn parse_chamber(s: &str) -> Option<Chamber> {
    match s.trim().to_lowercase().as_str() {
        "house" | "h" | "representatives" => Some(Chamber::House),
        "senate" | "s" => Some(Chamber::Senate),
        _ => None,
    }
}

/// Parses a feed transaction type; exchanges and other types yield `None`
pub(crate) fn parse_transaction_type(s: &str) -> Option<TransactionType> {
    match s.trim().to_lowercase().as_str() {
        "buy" | "purchase" => Some(TransactionType::Buy),
        "sell" | "sale" | "sale (partial)" | "sale (full)" => Some(TransactionType::Sell),
        _ => None,
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}
