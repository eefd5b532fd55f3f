// --- Engine events fanned out to observers (CLI printer, future UIs) ---

use core_types::{TradeRecord, ValuationSnapshot};
use serde::Serialize;
use tokio::sync::broadcast;

/// Capacity of the event channel. Slow receivers lag and skip rather than block the runners.
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Something a pair pipeline wants the outside world to know about.
/// `tag` and `content` are used by serde for a clean JSON representation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum EngineEvent {
    TradeExecuted(TradeRecord),
    Valuation(ValuationSnapshot),
    CandleRejected { symbol: String, reason: String },
}

/// Creates the broadcast channel shared by all pipelines of one engine.
pub fn channel() -> (broadcast::Sender<EngineEvent>, broadcast::Receiver<EngineEvent>) {
    broadcast::channel(EVENT_CHANNEL_CAPACITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{Side, Signal, Symbol};
    use rust_decimal_macros::dec;

    #[test]
    fn serializes_with_type_and_payload() {
        let event = EngineEvent::CandleRejected {
            symbol: "BTCUSDT".to_string(),
            reason: "timestamp went backwards".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "CandleRejected");
        assert_eq!(json["payload"]["symbol"], "BTCUSDT");
    }

    #[tokio::test]
    async fn subscribers_receive_trades() {
        let (tx, mut rx) = channel();
        let trade = TradeRecord {
            timestamp: 1,
            symbol: Symbol::from("ETHUSDT"),
            direction: Side::Buy,
            signal: Signal::GoLong,
            price: dec!(100),
            quote_delta: dec!(-10),
            base_delta: dec!(0.1),
            quote_balance_after: dec!(90),
            base_balance_after: dec!(0.1),
        };
        tx.send(EngineEvent::TradeExecuted(trade.clone())).unwrap();
        let received = rx.recv().await.unwrap();
        assert_eq!(received, EngineEvent::TradeExecuted(trade));
    }
}
