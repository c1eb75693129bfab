//! Seed data used when no external feed is configured or reachable
//!
//! Contains a static roster of politicians and issuers, plus a generator that
//! produces a plausible batch of trades over the last 30 days.

use chrono::{Duration, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reqwest::Url;

use super::{amount_label, Chamber, Issuer, Party, Politician, Snapshot, Trade, TransactionType};

/// Number of trades generated for a seed snapshot
pub const SEED_TRADE_COUNT: usize = 50;

/// How far back generated transaction dates reach
const SEED_HISTORY_DAYS: i64 = 30;

/// Maximum delay between a transaction and its disclosure
const SEED_MAX_DISCLOSURE_LAG_DAYS: i64 = 5;

/// Base URL for generated avatars
const AVATAR_BASE_URL: &str = "https://api.dicebear.com/7.x/avataaars/svg";

/// A politician entry in the static seed roster
struct SeedPolitician {
    id: &'static str,
    first_name: &'static str,
    last_name: &'static str,
    party: Party,
    state: &'static str,
    chamber: Chamber,
    avatar_seed: &'static str,
}

/// Static roster of seed politicians
static SEED_POLITICIANS: [SeedPolitician; 5] = [
    SeedPolitician {
        id: "p1",
        first_name: "Nancy",
        last_name: "Pelosi",
        party: Party::Democrat,
        state: "CA",
        chamber: Chamber::House,
        avatar_seed: "Nancy",
    },
    SeedPolitician {
        id: "p2",
        first_name: "Markwayne",
        last_name: "Mullin",
        party: Party::Republican,
        state: "OK",
        chamber: Chamber::Senate,
        avatar_seed: "Mark",
    },
    SeedPolitician {
        id: "p3",
        first_name: "Ro",
        last_name: "Khanna",
        party: Party::Democrat,
        state: "CA",
        chamber: Chamber::House,
        avatar_seed: "Ro",
    },
    SeedPolitician {
        id: "p4",
        first_name: "Tommy",
        last_name: "Tuberville",
        party: Party::Republican,
        state: "AL",
        chamber: Chamber::Senate,
        avatar_seed: "Tommy",
    },
    SeedPolitician {
        id: "p5",
        first_name: "Josh",
        last_name: "Gottheimer",
        party: Party::Democrat,
        state: "NJ",
        chamber: Chamber::House,
        avatar_seed: "Josh",
    },
];

/// Static list of seed issuers: (symbol, name, sector)
static SEED_ISSUERS: [(&str, &str, &str); 7] = [
    ("NVDA", "Nvidia Corp", "Technology"),
    ("AAPL", "Apple Inc", "Technology"),
    ("MSFT", "Microsoft Corp", "Technology"),
    ("XOM", "Exxon Mobil Corp", "Energy"),
    ("JPM", "JPMorgan Chase & Co", "Financial Services"),
    ("LLY", "Eli Lilly and Co", "Healthcare"),
    ("TSLA", "Tesla, Inc.", "Consumer Cyclical"),
];

/// Standard disclosure brackets used for generated trades: (low, high)
static AMOUNT_BRACKETS: [(u64, u64); 4] = [
    (1_001, 15_000),
    (15_001, 50_000),
    (50_001, 100_000),
    (100_001, 250_000),
];

/// Returns the avatar URL generated for the given seed string
///
/// The seed is form-encoded into the query string.
pub fn avatar_url(seed: &str) -> String {
    match Url::parse_with_params(AVATAR_BASE_URL, &[("seed", seed)]) {
        Ok(url) => url.into(),
        Err(_) => AVATAR_BASE_URL.to_string(),
    }
}

/// Returns the seed politician roster
pub fn seed_politicians() -> Vec<Politician> {
    SEED_POLITICIANS
        .iter()
        .map(|p| {
            Politician::new(
                p.id,
                p.first_name,
                p.last_name,
                p.party,
                p.state,
                p.chamber,
                avatar_url(p.avatar_seed),
            )
        })
        .collect()
}

/// Returns the seed issuer list
pub fn seed_issuers() -> Vec<Issuer> {
    SEED_ISSUERS
        .iter()
        .map(|(symbol, name, sector)| Issuer {
            symbol: symbol.to_string(),
            name: name.to_string(),
            sector: sector.to_string(),
        })
        .collect()
}

/// Generates `count` random trades between the given politicians and issuers
///
/// Transaction dates fall within the 30 days up to `today`; each disclosure is
/// published zero to four days after its transaction. The result is sorted by
/// publication date, newest first. Returns an empty list if either roster is
/// empty.
pub fn generate_trades<R: Rng>(
    rng: &mut R,
    politicians: &[Politician],
    issuers: &[Issuer],
    today: NaiveDate,
    count: usize,
) -> Vec<Trade> {
    if politicians.is_empty() || issuers.is_empty() {
        return Vec::new();
    }

    let mut trades: Vec<Trade> = (0..count)
        .map(|i| {
            let politician = &politicians[rng.gen_range(0..politicians.len())];
            let issuer = &issuers[rng.gen_range(0..issuers.len())];
            let tx_date = today - Duration::days(rng.gen_range(0..SEED_HISTORY_DAYS));
            let pub_date = tx_date + Duration::days(rng.gen_range(0..SEED_MAX_DISCLOSURE_LAG_DAYS));
            let (low, high) = AMOUNT_BRACKETS[rng.gen_range(0..AMOUNT_BRACKETS.len())];
            let tx_type = if rng.gen_bool(0.6) {
                TransactionType::Buy
            } else {
                TransactionType::Sell
            };

            Trade {
                id: format!("t-{}", i),
                tx_date,
                pub_date,
                politician_id: politician.id.clone(),
                issuer_id: issuer.symbol.clone(),
                tx_type,
                amount: amount_label(low, Some(high)),
                size_low: low,
                size_high: Some(high),
                chamber: politician.chamber,
            }
        })
        .collect();

    trades.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));
    trades
}

/// Builds a complete seed snapshot using the given RNG and reference date
pub fn seed_snapshot_with<R: Rng>(rng: &mut R, today: NaiveDate) -> Snapshot {
    let politicians = seed_politicians();
    let issuers = seed_issuers();
    let trades = generate_trades(rng, &politicians, &issuers, today, SEED_TRADE_COUNT);
    Snapshot {
        trades,
        politicians,
        issuers,
    }
}

/// Builds a seed snapshot with fresh randomness, dated relative to today
pub fn seed_snapshot() -> Snapshot {
    let mut rng = StdRng::from_entropy();
    seed_snapshot_with(&mut rng, Utc::now().date_naive())
}
