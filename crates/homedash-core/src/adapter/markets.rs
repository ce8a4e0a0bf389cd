// ── Market-data adapter ──
//
// Two independent upstreams per refresh: a batch crypto price call and
// one keyed stock-quote call per symbol, issued concurrently. A failed
// asset is omitted from the batch, never fatal for the rest; the fetch
// only errors when nothing at all could be priced.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use tracing::{debug, warn};

use homedash_api::markets::{CryptoClient, StockClient};

use super::{Adapter, SourceData, SourceId, SourceKind};
use crate::model::{MarketKind, MarketQuote};

/// The assets one adapter instance tracks.
#[derive(Debug, Clone, Default)]
pub struct MarketAssets {
    /// Coin ids, e.g. `"bitcoin"`.
    pub coins: Vec<String>,
    /// Ticker symbols, e.g. `"AAPL"`.
    pub stocks: Vec<String>,
}

pub struct MarketAdapter {
    id: SourceId,
    interval: Duration,
    crypto: Option<CryptoClient>,
    stocks: Option<StockClient>,
    assets: MarketAssets,
}

impl MarketAdapter {
    pub fn new(
        id: SourceId,
        crypto: Option<CryptoClient>,
        stocks: Option<StockClient>,
        assets: MarketAssets,
        interval: Duration,
    ) -> Self {
        Self {
            id,
            interval,
            crypto,
            stocks,
            assets,
        }
    }
}

#[async_trait]
impl Adapter for MarketAdapter {
    fn id(&self) -> &SourceId {
        &self.id
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Markets
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn fetch(&self) -> Result<SourceData, homedash_api::Error> {
        let crypto_fut = async {
            match (&self.crypto, self.assets.coins.is_empty()) {
                (Some(client), false) => Some(client.simple_price(&self.assets.coins).await),
                _ => None,
            }
        };

        let stock_futs = join_all(self.assets.stocks.iter().filter_map(|symbol| {
            self.stocks.as_ref().map(|client| async move {
                (symbol.clone(), client.quote(symbol).await)
            })
        }));

        let (crypto_result, stock_results) = tokio::join!(crypto_fut, stock_futs);

        let mut quotes: Vec<MarketQuote> = Vec::new();
        let mut last_err = None;

        match crypto_result {
            Some(Ok(prices)) => {
                // Preserve the configured coin order.
                for coin in &self.assets.coins {
                    let Some(price) = prices.get(coin) else {
                        warn!(source = %self.id, asset = %coin, "coin missing from price response");
                        continue;
                    };
                    let Some(usd) = price.usd else { continue };
                    quotes.push(MarketQuote {
                        symbol: coin.clone(),
                        kind: MarketKind::Crypto,
                        price_usd: usd,
                        change_percent: price.usd_24h_change,
                    });
                }
            }
            Some(Err(err)) => {
                warn!(source = %self.id, %err, "crypto batch failed");
                last_err = Some(err);
            }
            None => {}
        }

        for (symbol, result) in stock_results {
            match result {
                Ok(quote) => quotes.push(MarketQuote {
                    symbol,
                    kind: MarketKind::Stock,
                    price_usd: quote.c,
                    change_percent: quote.dp,
                }),
                Err(err) => {
                    // Omit the asset, keep the batch.
                    warn!(source = %self.id, asset = %symbol, %err, "stock quote failed");
                    last_err = Some(err);
                }
            }
        }

        if quotes.is_empty() {
            if let Some(err) = last_err {
                return Err(err);
            }
        }

        debug!(source = %self.id, count = quotes.len(), "fetched market quotes");
        Ok(SourceData::Markets(quotes))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use homedash_api::TransportConfig;
    use homedash_api::markets::StockClient;
    use secrecy::SecretString;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn stock_server(dp: serde_json::Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/quote"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "c": 190.3,
                "d": 1.2,
                "dp": dp,
            })))
            .mount(&server)
            .await;
        server
    }

    fn stock_adapter(server: &MockServer) -> MarketAdapter {
        let transport = TransportConfig::default();
        let stocks =
            StockClient::new(&server.uri(), SecretString::from("test-key"), &transport).unwrap();
        MarketAdapter::new(
            SourceId::from("markets"),
            None,
            Some(stocks),
            MarketAssets {
                coins: vec![],
                stocks: vec!["AAPL".into()],
            },
            Duration::from_secs(300),
        )
    }

    #[tokio::test]
    async fn stock_quote_carries_percent_change_through() {
        let server = stock_server(serde_json::json!(0.64)).await;
        let adapter = stock_adapter(&server);

        let SourceData::Markets(quotes) = adapter.fetch().await.unwrap() else {
            panic!("expected a markets payload");
        };
        assert_eq!(quotes[0].symbol, "AAPL");
        assert_eq!(quotes[0].change_percent, Some(0.64));
    }

    #[tokio::test]
    async fn stock_quote_without_percent_change_stays_absent() {
        let server = stock_server(serde_json::Value::Null).await;
        let adapter = stock_adapter(&server);

        let SourceData::Markets(quotes) = adapter.fetch().await.unwrap() else {
            panic!("expected a markets payload");
        };
        assert_eq!(quotes[0].change_percent, None);
    }
}
