//! Instrument domain: static catalog, generator profiles and the remote listing.

#[cfg(feature = "http")]
pub mod client;
pub mod wire;

use crate::shared::Instrument;
use serde::{Deserialize, Serialize};

/// One entry of the `/instruments` listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentInfo {
    pub symbol: String,
    pub name: String,
    pub category: String,
}

/// Where an instrument listing came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingOrigin {
    Remote,
    Catalog,
}

/// Result of listing instruments. On a failed remote call the catalog is
/// returned with the failure message attached.
#[derive(Debug, Clone)]
pub struct InstrumentListing {
    pub instruments: Vec<InstrumentInfo>,
    pub origin: ListingOrigin,
    pub error: Option<String>,
}

/// Price-path parameters for the synthetic generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstrumentProfile {
    pub base_price: f64,
    pub volatility_multiplier: f64,
}

impl Default for InstrumentProfile {
    fn default() -> Self {
        Self {
            base_price: 100.0,
            volatility_multiplier: 1.0,
        }
    }
}

const PROFILES: &[(&str, f64, f64)] = &[
    ("BTC-USD", 45_000.0, 2.0),
    ("ETH-USD", 2_800.0, 2.2),
    ("SPY", 450.0, 0.8),
    ("QQQ", 380.0, 1.0),
    ("AAPL", 175.0, 1.2),
    ("TSLA", 240.0, 1.8),
];

/// Profile for `instrument`; unknown symbols get the defaults.
pub fn profile(instrument: &Instrument) -> InstrumentProfile {
    PROFILES
        .iter()
        .find(|(symbol, _, _)| *symbol == instrument.as_str())
        .map(|&(_, base_price, volatility_multiplier)| InstrumentProfile {
            base_price,
            volatility_multiplier,
        })
        .unwrap_or_default()
}

/// `(symbol, name, category)`.
pub const CATALOG: &[(&str, &str, &str)] = &[
    ("BTC-USD", "Bitcoin (BTC)", "Major"),
    ("ETH-USD", "Ethereum (ETH)", "Major"),
    ("BNB-USD", "Binance Coin (BNB)", "Major"),
    ("XRP-USD", "Ripple (XRP)", "Major"),
    ("ADA-USD", "Cardano (ADA)", "Major"),
    ("SOL-USD", "Solana (SOL)", "Major"),
    ("DOGE-USD", "Dogecoin (DOGE)", "Major"),
    ("DOT-USD", "Polkadot (DOT)", "Major"),
    ("MATIC-USD", "Polygon (MATIC)", "Major"),
    ("SHIB-USD", "Shiba Inu (SHIB)", "Major"),
    ("UNI-USD", "Uniswap (UNI)", "DeFi"),
    ("LINK-USD", "Chainlink (LINK)", "DeFi"),
    ("AAVE-USD", "Aave (AAVE)", "DeFi"),
    ("CRV-USD", "Curve DAO (CRV)", "DeFi"),
    ("SUSHI-USD", "SushiSwap (SUSHI)", "DeFi"),
    ("COMP-USD", "Compound (COMP)", "DeFi"),
    ("MKR-USD", "Maker (MKR)", "DeFi"),
    ("SNX-USD", "Synthetix (SNX)", "DeFi"),
    ("AVAX-USD", "Avalanche (AVAX)", "Layer 1"),
    ("LUNA-USD", "Terra (LUNA)", "Layer 1"),
    ("ALGO-USD", "Algorand (ALGO)", "Layer 1"),
    ("ATOM-USD", "Cosmos (ATOM)", "Layer 1"),
    ("NEAR-USD", "NEAR Protocol (NEAR)", "Layer 1"),
    ("FTM-USD", "Fantom (FTM)", "Layer 1"),
    ("HBAR-USD", "Hedera (HBAR)", "Layer 1"),
    ("LRC-USD", "Loopring (LRC)", "Layer 2"),
    ("IMX-USD", "Immutable X (IMX)", "Layer 2"),
    ("OP-USD", "Optimism (OP)", "Layer 2"),
    ("PEPE-USD", "Pepe (PEPE)", "Meme"),
    ("FLOKI-USD", "Floki (FLOKI)", "Meme"),
    ("BABYDOGE-USD", "Baby Doge (BABYDOGE)", "Meme"),
    ("AXS-USD", "Axie Infinity (AXS)", "Gaming"),
    ("SAND-USD", "The Sandbox (SAND)", "Gaming"),
    ("MANA-USD", "Decentraland (MANA)", "Gaming"),
    ("ENJ-USD", "Enjin Coin (ENJ)", "Gaming"),
    ("GALA-USD", "Gala (GALA)", "Gaming"),
    ("XMR-USD", "Monero (XMR)", "Privacy"),
    ("ZEC-USD", "Zcash (ZEC)", "Privacy"),
    ("DASH-USD", "Dash (DASH)", "Privacy"),
    ("CRO-USD", "Cronos (CRO)", "Exchange"),
    ("FTT-USD", "FTX Token (FTT)", "Exchange"),
    ("HT-USD", "Huobi Token (HT)", "Exchange"),
    ("OKB-USD", "OKB (OKB)", "Exchange"),
    ("USDT-USD", "Tether (USDT)", "Stablecoin"),
    ("USDC-USD", "USD Coin (USDC)", "Stablecoin"),
    ("BUSD-USD", "Binance USD (BUSD)", "Stablecoin"),
    ("DAI-USD", "Dai (DAI)", "Stablecoin"),
    ("SPY", "S&P 500 ETF (SPY)", "Traditional"),
    ("QQQ", "Nasdaq ETF (QQQ)", "Traditional"),
    ("AAPL", "Apple Inc. (AAPL)", "Traditional"),
    ("TSLA", "Tesla Inc. (TSLA)", "Traditional"),
    ("MSFT", "Microsoft (MSFT)", "Traditional"),
    ("GOOGL", "Alphabet (GOOGL)", "Traditional"),
    ("AMZN", "Amazon (AMZN)", "Traditional"),
    ("META", "Meta Platforms (META)", "Traditional"),
    ("NVDA", "NVIDIA (NVDA)", "Traditional"),
    ("NFLX", "Netflix (NFLX)", "Traditional"),
];

/// The full static catalog as listing entries.
pub fn catalog() -> Vec<InstrumentInfo> {
    CATALOG
        .iter()
        .map(|&(symbol, name, category)| InstrumentInfo {
            symbol: symbol.to_string(),
            name: name.to_string(),
            category: category.to_string(),
        })
        .collect()
}

pub fn find(symbol: &str) -> Option<InstrumentInfo> {
    CATALOG
        .iter()
        .find(|(s, _, _)| *s == symbol)
        .map(|&(symbol, name, category)| InstrumentInfo {
            symbol: symbol.to_string(),
            name: name.to_string(),
            category: category.to_string(),
        })
}

/// Distinct categories in catalog order.
pub fn categories() -> Vec<&'static str> {
    let mut out: Vec<&'static str> = Vec::new();
    for &(_, _, category) in CATALOG {
        if !out.contains(&category) {
            out.push(category);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_profiles() {
        let btc = profile(&Instrument::from("BTC-USD"));
        assert_eq!(btc.base_price, 45_000.0);
        assert_eq!(btc.volatility_multiplier, 2.0);
        assert_eq!(profile(&Instrument::from("SPY")).volatility_multiplier, 0.8);
    }

    #[test]
    fn test_unknown_profile_defaults() {
        let p = profile(&Instrument::from("ZZZ"));
        assert_eq!(p, InstrumentProfile { base_price: 100.0, volatility_multiplier: 1.0 });
    }

    #[test]
    fn test_catalog_symbols_unique() {
        let all = catalog();
        let mut symbols: Vec<_> = all.iter().map(|i| i.symbol.as_str()).collect();
        symbols.sort_unstable();
        symbols.dedup();
        assert_eq!(symbols.len(), all.len());
    }

    #[test]
    fn test_find_and_categories() {
        assert_eq!(find("NVDA").unwrap().category, "Traditional");
        assert!(find("NOPE").is_none());
        let cats = categories();
        assert_eq!(cats.first(), Some(&"Major"));
        assert_eq!(cats.last(), Some(&"Traditional"));
        assert_eq!(cats.len(), 10);
    }
}
