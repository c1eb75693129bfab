//! Dashboard aggregation over a snapshot
//!
//! Pure functions that turn a snapshot into the figures shown on the
//! dashboard and the politician leaderboard. Nothing here does I/O.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::data::{Issuer, Politician, Snapshot, Trade};

/// Default number of publication-date buckets in the trend series
pub const DEFAULT_TREND_WINDOW: usize = 10;

/// Default number of rows in the recent trades list
pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// Shown when no trade resolves to a sector
pub const NO_SECTOR: &str = "N/A";

/// Sizing options for the dashboard aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsOptions {
    /// Maximum number of trend buckets, most recent kept
    pub trend_window: usize,
    /// Maximum number of recent trades considered for the join
    pub recent_limit: usize,
}

impl Default for StatsOptions {
    fn default() -> Self {
        Self {
            trend_window: DEFAULT_TREND_WINDOW,
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }
}

/// Number of trades published on one date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub volume: usize,
}

/// A trade joined with its politician and issuer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedTrade {
    #[serde(flatten)]
    pub trade: Trade,
    pub politician: Politician,
    pub issuer: Issuer,
}

/// Figures shown on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_volume: String,
    pub active_traders: usize,
    pub top_sector: String,
    pub volume_trend: Vec<TrendPoint>,
    pub recent_trades: Vec<EnrichedTrade>,
}

/// One row of the politician leaderboard
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub politician: Politician,
    pub trade_count: usize,
    /// Sum of the lower bounds of the politician's trades
    pub volume_low: u64,
    /// `volume_low` formatted with `format_volume`
    pub total_volume: String,
    pub top_sector: String,
}

/// Formats a dollar total with K/M suffixes
///
/// Below 1,000 the raw amount is shown (`500` -> `"$500+"`). Below one
/// million it is rounded to whole thousands (`2500` -> `"3K+"`). Otherwise it
/// is shown in millions with one decimal (`1_500_000` -> `"1.5M+"`). A value
/// that rounds up to 1000K is shown in millions.
pub fn format_volume(total: u64) -> String {
    if total < 1_000 {
        return format!("${}+", total);
    }

    let thousands = (total as f64 / 1_000.0).round();
    if total < 1_000_000 && thousands < 1_000.0 {
        return format!("{}K+", thousands as u64);
    }

    format!("{:.1}M+", total as f64 / 1_000_000.0)
}

/// Sums the lower bounds of `trades`, saturating at `u64::MAX`
fn total_size_low<'a>(trades: impl IntoIterator<Item = &'a Trade>) -> u64 {
    trades
        .into_iter()
        .fold(0u64, |acc, t| acc.saturating_add(t.size_low))
}

/// Computes the dashboard figures for a snapshot
pub fn compute_dashboard_stats(snapshot: &Snapshot, options: &StatsOptions) -> DashboardStats {
    let total = total_size_low(&snapshot.trades);

    let active_traders = snapshot
        .trades
        .iter()
        .map(|t| t.politician_id.as_str())
        .collect::<HashSet<_>>()
        .len();

    let top_sector = top_sector(snapshot, snapshot.trades.iter())
        .unwrap_or(NO_SECTOR)
        .to_string();

    DashboardStats {
        total_volume: format_volume(total),
        active_traders,
        top_sector,
        volume_trend: volume_trend(&snapshot.trades, options.trend_window),
        recent_trades: recent_trades(snapshot, options.recent_limit),
    }
}

/// Returns the sector with the most trades among `trades`
///
/// Trades whose issuer is not in the snapshot are skipped. Ties go to the
/// sector seen first.
pub fn top_sector<'a>(
    snapshot: &'a Snapshot,
    trades: impl Iterator<Item = &'a Trade>,
) -> Option<&'a str> {
    // sector -> (count, first seen position)
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for trade in trades {
        let Some(issuer) = snapshot.issuer(&trade.issuer_id) else {
            continue;
        };
        let seen = counts.len();
        counts.entry(issuer.sector.as_str()).or_insert((0, seen)).0 += 1;
    }

    counts
        .into_iter()
        .max_by(|(_, (count_a, seen_a)), (_, (count_b, seen_b))| {
            count_a.cmp(count_b).then(seen_b.cmp(seen_a))
        })
        .map(|(sector, _)| sector)
}

/// Counts trades per publication date, ascending, keeping the last `window` dates
pub fn volume_trend(trades: &[Trade], window: usize) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for trade in trades {
        *buckets.entry(trade.pub_date).or_insert(0) += 1;
    }

    let skip = buckets.len().saturating_sub(window);
    buckets
        .into_iter()
        .skip(skip)
        .map(|(date, volume)| TrendPoint { date, volume })
        .collect()
}

/// Joins the first `limit` trades with their politician and issuer
///
/// Rows whose politician or issuer is missing from the snapshot are dropped,
/// so fewer than `limit` rows may be returned.
pub fn recent_trades(snapshot: &Snapshot, limit: usize) -> Vec<EnrichedTrade> {
    snapshot
        .trades
        .iter()
        .take(limit)
        .filter_map(|trade| {
            let politician = snapshot.politician(&trade.politician_id)?;
            let issuer = snapshot.issuer(&trade.issuer_id)?;
            Some(EnrichedTrade {
                trade: trade.clone(),
                politician: politician.clone(),
                issuer: issuer.clone(),
            })
        })
        .collect()
}

/// Ranks every politician in the snapshot by disclosed volume
///
/// Ordered by volume, then trade count, both descending, then by name.
/// Politicians without trades are included with zero totals.
pub fn politician_leaderboard(snapshot: &Snapshot) -> Vec<LeaderboardEntry> {
    let mut by_politician: HashMap<&str, Vec<&Trade>> = HashMap::new();
    for trade in &snapshot.trades {
        by_politician
            .entry(trade.politician_id.as_str())
            .or_default()
            .push(trade);
    }

    let mut entries: Vec<LeaderboardEntry> = snapshot
        .politicians
        .iter()
        .map(|politician| {
            let trades = by_politician
                .get(politician.id.as_str())
                .map(Vec::as_slice)
                .unwrap_or_default();
            let volume_low = total_size_low(trades.iter().copied());
            let top_sector = top_sector(snapshot, trades.iter().copied())
                .unwrap_or(NO_SECTOR)
                .to_string();

            LeaderboardEntry {
                rank: 0,
                politician: politician.clone(),
                trade_count: trades.len(),
                volume_low,
                total_volume: format_volume(volume_low),
                top_sector,
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.volume_low
            .cmp(&a.volume_low)
            .then(b.trade_count.cmp(&a.trade_count))
            .then_with(|| a.politician.name.cmp(&b.politician.name))
    });
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = i + 1;
    }
    entries
}
