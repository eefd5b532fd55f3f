// In crates/market-data/src/types.rs

use crate::{Error, Result};
use core_types::CandleEvent;
use serde::Deserialize;

/// A single row of `GET /fapi/v1/klines`, which Binance sends as a JSON array of mixed types.
#[derive(Debug, Deserialize)]
pub struct RawKline(
    pub i64,    // 0: Open time
    pub String, // 1: Open
    pub String, // 2: High
    pub String, // 3: Low
    pub String, // 4: Close
    pub String, // 5: Volume
    pub i64,    // 6: Close time
    pub String, // 7: Quote asset volume
    pub i64,    // 8: Number of trades
    pub String, // 9: Taker buy base asset volume
    pub String, // 10: Taker buy quote asset volume
    pub String, // 11: Ignore
);

impl RawKline {
    /// REST klines are historical, so they are treated as closed bars.
    pub fn into_event(self, symbol: &str) -> CandleEvent {
        CandleEvent {
            timestamp: self.0,
            symbol: symbol.to_string(),
            open: self.1,
            high: self.2,
            low: self.3,
            close: self.4,
            volume: self.5,
            is_final: Some(true),
        }
    }
}

/// Represents a single kline event from a WebSocket stream.
#[derive(Debug, Deserialize, Clone)]
pub struct WsKlineEvent {
    #[serde(rename = "e")]
    pub event_type: String, // "kline"
    #[serde(rename = "E")]
    pub event_time: i64,
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "k")]
    pub kline: WsKline,
}

/// Represents the kline data within a WebSocket event. Prices stay as the exchange's strings.
#[derive(Debug, Deserialize, Clone)]
pub struct WsKline {
    #[serde(rename = "t")]
    pub open_time: i64,
    #[serde(rename = "T")]
    pub close_time: i64,
    #[serde(rename = "s")]
    pub symbol: String,
    #[serde(rename = "i")]
    pub interval: String,
    #[serde(rename = "o")]
    pub open: String,
    #[serde(rename = "c")]
    pub close: String,
    #[serde(rename = "h")]
    pub high: String,
    #[serde(rename = "l")]
    pub low: String,
    #[serde(rename = "v")]
    pub volume: String,
    #[serde(rename = "x")]
    pub is_closed: bool,
}

impl From<WsKlineEvent> for CandleEvent {
    fn from(event: WsKlineEvent) -> Self {
        let kline = event.kline;
        CandleEvent {
            timestamp: kline.open_time,
            symbol: event.symbol,
            open: kline.open,
            high: kline.high,
            low: kline.low,
            close: kline.close,
            volume: kline.volume,
            is_final: Some(kline.is_closed),
        }
    }
}

/// Either a raw stream payload or the `{"stream": .., "data": ..}` wrapper of combined streams.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum KlineMessage {
    Combined { data: WsKlineEvent },
    Raw(WsKlineEvent),
}

/// Decodes one WebSocket text frame into a `CandleEvent`.
pub fn parse_kline_message(text: &str) -> Result<CandleEvent> {
    let event = match serde_json::from_str::<KlineMessage>(text) {
        Ok(KlineMessage::Combined { data }) => data,
        Ok(KlineMessage::Raw(event)) => event,
        Err(_) => return Err(Error::UnexpectedMessage(truncate(text))),
    };
    if event.event_type != "kline" {
        return Err(Error::UnexpectedMessage(format!("event type `{}`", event.event_type)));
    }
    Ok(event.into())
}

fn truncate(text: &str) -> String {
    text.chars().take(120).collect()
}
