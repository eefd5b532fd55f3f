// In crates/market-data/src/live_connector.rs

use crate::Result;
use crate::types::parse_kline_message;
use async_stream::stream;
use core_types::{CandleEvent, Symbol};
use futures::{Stream, StreamExt};
use std::time::Duration;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

/// Delay before reconnecting after a failed connect or a dropped socket.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// A connector for receiving live kline streams from Binance.
///
/// Every kline update is forwarded, closed or not; `CandleEvent::is_final` carries the
/// exchange's flag so the consumer decides what to keep.
#[derive(Debug, Clone, Default)]
pub struct LiveConnector;

impl LiveConnector {
    pub fn new() -> Self {
        Self
    }

    /// Subscribes to `<symbol>@kline_<interval>` on `base_url` (e.g. `wss://fstream.binance.com/ws`).
    ///
    /// The stream never ends on its own: connection failures are logged and retried after
    /// `RECONNECT_DELAY`. Frames that are not kline events are yielded as errors.
    pub fn subscribe_to_klines(
        &self,
        symbol: &Symbol,
        interval: &str,
        base_url: &str,
    ) -> impl Stream<Item = Result<CandleEvent>> + Send + use<> {
        let stream_name = format!("{}@kline_{}", symbol.0.to_lowercase(), interval);
        let url = format!("{}/{}", base_url.trim_end_matches('/'), stream_name);
        Self::connect_loop(url)
    }

    fn connect_loop(url: String) -> impl Stream<Item = Result<CandleEvent>> + Send + 'static {
        stream! {
            loop {
                tracing::info!(url = %url, "Connecting to WebSocket stream...");
                let (ws_stream, _) = match connect_async(url.as_str()).await {
                    Ok(s) => s,
                    Err(e) => {
                        tracing::error!(error = %e, "WebSocket connection failed. Retrying in 5s...");
                        tokio::time::sleep(RECONNECT_DELAY).await;
                        continue;
                    }
                };
                tracing::info!("WebSocket connection successful.");

                let mut read = ws_stream.fuse();
                while let Some(message) = read.next().await {
                    match message {
                        Ok(Message::Text(text)) => {
                            let parsed = parse_kline_message(text.as_str());
                            if let Ok(event) = &parsed {
                                tracing::trace!(symbol = %event.symbol, timestamp = event.timestamp, "Kline update received.");
                            }
                            yield parsed;
                        }
                        Ok(Message::Close(frame)) => {
                            tracing::warn!(?frame, "WebSocket closed by server. Reconnecting...");
                            break;
                        }
                        // Pings are answered by tungstenite; binary frames are not used by this feed.
                        Ok(_) => {}
                        Err(e) => {
                            tracing::warn!(error = %e, "Error reading from WebSocket. Reconnecting...");
                            break;
                        }
                    }
                }
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
}
