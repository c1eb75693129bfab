//! Trade search and filtering for the trades explorer

use serde::Deserialize;

use crate::data::{Chamber, Snapshot, Trade, TransactionType};

/// Filter parameters accepted by `GET /api/trades`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TradeFilter {
    /// Case-insensitive substring matched against politician name or ticker
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default, rename = "type")]
    pub tx_type: Option<TransactionType>,
    #[serde(default)]
    pub chamber: Option<Chamber>,
}

impl TradeFilter {
    /// Returns true if no criteria are set
    pub fn is_empty(&self) -> bool {
        self.needle().is_none() && self.tx_type.is_none() && self.chamber.is_none()
    }

    /// Lowercased, trimmed search text; `None` when blank
    fn needle(&self) -> Option<String> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase)
    }

    /// Returns the trades of `snapshot` that match, in snapshot order
    pub fn apply(&self, snapshot: &Snapshot) -> Vec<Trade> {
        let needle = self.needle();

        snapshot
            .trades
            .iter()
            .filter(|trade| self.tx_type.map_or(true, |t| trade.tx_type == t))
            .filter(|trade| self.chamber.map_or(true, |c| trade.chamber == c))
            .filter(|trade| match &needle {
                Some(needle) => matches_text(snapshot, trade, needle),
                None => true,
            })
            .cloned()
            .collect()
    }
}

/// Matches the politician's name or the ticker against a lowercased needle
fn matches_text(snapshot: &Snapshot, trade: &Trade, needle: &str) -> bool {
    if trade.issuer_id.to_lowercase().contains(needle) {
        return true;
    }
    snapshot
        .politician(&trade.politician_id)
        .is_some_and(|p| p.name.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{amount_label, seed_issuers, seed_politicians};
    use chrono::NaiveDate;

    fn trade(id: &str, politician: &str, issuer: &str, tx_type: TransactionType, chamber: Chamber) -> Trade {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        Trade {
            id: id.to_string(),
            tx_date: date,
            pub_date: date,
            politician_id: politician.to_string(),
            issuer_id: issuer.to_string(),
            tx_type,
            amount: amount_label(1_001, Some(15_000)),
            size_low: 1_001,
            size_high: Some(15_000),
            chamber,
        }
    }

    fn snapshot() -> Snapshot {
        Snapshot {
            trades: vec![
                trade("t1", "p1", "NVDA", TransactionType::Buy, Chamber::House),
                trade("t2", "p2", "XOM", TransactionType::Sell, Chamber::Senate),
                trade("t3", "ghost", "TSLA", TransactionType::Buy, Chamber::House),
                trade("t4", "p4", "AAPL", TransactionType::Sell, Chamber::Senate),
            ],
            politicians: seed_politicians(),
            issuers: seed_issuers(),
        }
    }

    fn ids(trades: &[Trade]) -> Vec<&str> {
        trades.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn test_empty_filter_returns_everything() {
        let filter = TradeFilter::default();
        assert!(filter.is_empty());
        assert_eq!(ids(&filter.apply(&snapshot())), vec!["t1", "t2", "t3", "t4"]);
    }

    #[test]
    fn test_blank_query_is_ignored() {
        let filter = TradeFilter {
            q: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&snapshot()).len(), 4);
    }

    #[test]
    fn test_query_matches_politician_name_case_insensitive() {
        let filter = TradeFilter {
            q: Some("PELOSI".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&snapshot())), vec!["t1"]);
    }

    #[test]
    fn test_query_matches_ticker_even_without_politician() {
        let filter = TradeFilter {
            q: Some("tsl".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&snapshot())), vec!["t3"]);
    }

    #[test]
    fn test_type_and_chamber_filters_combine() {
        let filter = TradeFilter {
            q: None,
            tx_type: Some(TransactionType::Sell),
            chamber: Some(Chamber::Senate),
        };
        assert_eq!(ids(&filter.apply(&snapshot())), vec!["t2", "t4"]);

        let filter = TradeFilter {
            q: Some("tuberville".to_string()),
            tx_type: Some(TransactionType::Sell),
            chamber: Some(Chamber::Senate),
        };
        assert_eq!(ids(&filter.apply(&snapshot())), vec!["t4"]);
    }

    #[test]
    fn test_filter_deserializes_from_query_fields() {
        let filter: TradeFilter =
            serde_json::from_str(r#"{"q":"nvda","type":"buy","chamber":"house"}"#).unwrap();
        assert_eq!(filter.tx_type, Some(TransactionType::Buy));
        assert_eq!(filter.chamber, Some(Chamber::House));
        assert_eq!(filter.q.as_deref(), Some("nvda"));
    }
}
