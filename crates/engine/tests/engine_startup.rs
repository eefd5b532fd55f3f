use app_config::Settings;
use engine::Engine;
use std::time::Duration;
use tokio::sync::{broadcast, watch};

fn settings(pairs: &str) -> Settings {
    let base = r#"
[app]
environment = "test"
log_level = "info"

[binance]
rest_base_url = "http://127.0.0.1:9"
ws_base_url = "ws://127.0.0.1:9/ws"

[strategy]
name = "ma_crossover"
params = { short_window = 2, long_window = 3 }

[ledger]
initial_quote_balance = "1000"
initial_base_balance = "0"
leverage = "1"
buy_fraction = "0.1"
sell_fraction = "0.1"
sizing_policy = "fractional"

[backtest]
initial_quote_balance = "1000"
"#;
    toml::from_str(&format!("{base}\n{pairs}")).unwrap()
}

#[test]
fn build_runner_rejects_a_pair_without_symbol() {
    let (tx, _rx) = events::channel();
    let settings = settings("[[pairs]]\nsymbol = \"\"\ninterval = \"1m\"\n");
    let engine = Engine::new(settings.clone(), tx);
    assert!(engine.build_runner(&settings.pairs[0]).is_err());
}

#[tokio::test]
async fn a_bad_pair_fails_startup_before_any_task_is_spawned() {
    let (tx, mut rx) = events::channel();
    let settings = settings(
        "[[pairs]]\nsymbol = \"BTCUSDT\"\ninterval = \"1m\"\n\n[[pairs]]\nsymbol = \"\"\ninterval = \"1m\"\n",
    );
    let engine = Engine::new(settings, tx);
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    assert!(engine.run(shutdown_rx).await.is_err());

    // With no runner alive, dropping the engine drops the last event sender.
    drop(engine);
    let next = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await;
    assert!(matches!(next, Ok(Err(broadcast::error::RecvError::Closed))));
}

#[tokio::test]
async fn no_enabled_pairs_is_an_error() {
    let (tx, _rx) = events::channel();
    let settings = settings("[[pairs]]\nsymbol = \"BTCUSDT\"\ninterval = \"1m\"\nenabled = false\n");
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    assert!(Engine::new(settings, tx).run(shutdown_rx).await.is_err());
}
