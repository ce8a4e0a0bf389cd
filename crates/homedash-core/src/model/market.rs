// ── Market domain types ──

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum MarketKind {
    Crypto,
    Stock,
}

/// One priced asset. Pass-through formatting only; no derived state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketQuote {
    /// Coin id or ticker symbol as configured.
    pub symbol: String,
    pub kind: MarketKind,
    pub price_usd: f64,
    /// 24 h change in percent, when the upstream reports one.
    pub change_percent: Option<f64>,
}
