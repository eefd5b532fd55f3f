// In crates/market-data/src/rest.rs

use crate::types::RawKline;
use crate::{Error, Result};
use core_types::{Candle, Symbol};
use serde_json::Value;

/// Client for the public (unsigned) Binance Futures market data endpoints.
#[derive(Debug, Clone)]
pub struct HistoricalClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl HistoricalClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetches historical kline (candlestick) data.
    ///
    /// This corresponds to the `GET /fapi/v1/klines` endpoint.
    ///
    /// # Arguments
    ///
    /// * `symbol`: The symbol to fetch klines for.
    /// * `interval`: The kline interval (e.g., "1m", "5m", "1h").
    /// * `start_time`: Optional start time in milliseconds.
    /// * `limit`: Optional number of klines to return (max 1500, default 500).
    pub async fn get_historical_klines(
        &self,
        symbol: &Symbol,
        interval: &str,
        start_time: Option<i64>,
        limit: Option<u16>,
    ) -> Result<Vec<Candle>> {
        let mut params = format!("symbol={}&interval={}", symbol.0, interval);
        if let Some(st) = start_time {
            params.push_str(&format!("&startTime={}", st));
        }
        if let Some(l) = limit {
            params.push_str(&format!("&limit={}", l));
        }
        let url = format!("{}/fapi/v1/klines?{}", self.base_url, params);
        tracing::debug!(url = %url, "Fetching historical klines.");

        let response_body = self.http_client.get(&url).send().await?.text().await?;
        let raw_klines = decode_klines(&response_body)?;

        // Convert everything before handing any of it out.
        let candles = raw_klines
            .into_iter()
            .map(|raw| raw.into_event(&symbol.0).to_candle())
            .collect::<core_types::Result<Vec<_>>>()?;
        tracing::info!(symbol = %symbol, count = candles.len(), "Historical klines fetched.");
        Ok(candles)
    }
}

/// Binance answers errors with `{"code": .., "msg": ..}` instead of an array.
fn decode_klines(body: &str) -> Result<Vec<RawKline>> {
    serde_json::from_str(body).map_err(|e| {
        if let Ok(value) = serde_json::from_str::<Value>(body) {
            if let Some(code) = value.get("code").and_then(Value::as_i64) {
                let msg = value.get("msg").and_then(Value::as_str).unwrap_or("").to_string();
                return Error::ApiError { code, msg };
            }
        }
        Error::DeserializationFailed(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surfaces_api_errors() {
        let err = decode_klines(r#"{"code":-1121,"msg":"Invalid symbol."}"#).unwrap_err();
        assert!(matches!(err, Error::ApiError { code: -1121, .. }));
        assert!(matches!(decode_klines("not json"), Err(Error::DeserializationFailed(_))));
    }

    #[test]
    fn decodes_kline_arrays() {
        let body = r#"[[1,"1","2","0.5","1.5","10",59999,"0",3,"0","0","0"],[60000,"1.5","2","1","1.8","7",119999,"0",2,"0","0","0"]]"#;
        let rows = decode_klines(body).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].0, 60000);
    }
}
