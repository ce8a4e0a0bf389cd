// Market-data clients: a CoinGecko-style crypto price API (no key) and
// an optional Finnhub-style stock quote API (keyed).
//
// Stocks are quoted one symbol per request; the core adapter fans those
// out concurrently and drops failed symbols without discarding the batch.

use std::collections::HashMap;

use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

const SERVICE: &str = "markets";

// ── Wire types ───────────────────────────────────────────────────────

/// `{"bitcoin": {"usd": 67123.0, "usd_24h_change": -1.2}, ...}`
pub type SimplePrices = HashMap<String, CoinPrice>;

#[derive(Debug, Clone, Deserialize)]
pub struct CoinPrice {
    #[serde(default)]
    pub usd: Option<f64>,
    #[serde(default)]
    pub usd_24h_change: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StockQuote {
    /// Current price.
    #[serde(default)]
    pub c: f64,
    /// Absolute change since previous close.
    #[serde(default)]
    pub d: Option<f64>,
    /// Percent change since previous close.
    #[serde(default)]
    pub dp: Option<f64>,
}

// ── Crypto client ────────────────────────────────────────────────────

/// Client for a CoinGecko-compatible simple-price endpoint.
pub struct CryptoClient {
    http: reqwest::Client,
    base_url: Url,
}

impl CryptoClient {
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let base_url = crate::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, Error> {
        let base_url = crate::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Fetch USD prices and 24 h change for a batch of coin ids.
    pub async fn simple_price(&self, ids: &[String]) -> Result<SimplePrices, Error> {
        let url = self.base_url.join("api/v3/simple/price")?;
        debug!("GET {url} ids={}", ids.len());

        let resp = self
            .http
            .get(url)
            .query(&[
                ("ids", ids.join(",")),
                ("vs_currencies", "usd".to_string()),
                ("include_24hr_change", "true".to_string()),
            ])
            .send()
            .await?;

        crate::handle_json_response(SERVICE, resp).await
    }
}

// ── Stock client ─────────────────────────────────────────────────────

/// Client for a Finnhub-compatible quote endpoint.
pub struct StockClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: secrecy::SecretString,
}

impl StockClient {
    pub fn new(
        base_url: &str,
        api_key: secrecy::SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let base_url = crate::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        api_key: secrecy::SecretString,
    ) -> Result<Self, Error> {
        let base_url = crate::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    /// Quote one symbol.
    pub async fn quote(&self, symbol: &str) -> Result<StockQuote, Error> {
        let url = self.base_url.join("api/v1/quote")?;
        debug!("GET {url} symbol={symbol}");

        let resp = self
            .http
            .get(url)
            .query(&[("symbol", symbol), ("token", self.api_key.expose_secret())])
            .send()
            .await?;

        crate::handle_json_response(SERVICE, resp).await
    }
}
