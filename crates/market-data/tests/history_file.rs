use core_types::Symbol;
use market_data::load_candles_csv;
use rust_decimal_macros::dec;
use std::io::Write;

#[test]
fn loads_a_csv_file_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("btc.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "datetime,close").unwrap();
    for (day, close) in ["10", "11", "12", "9"].iter().enumerate() {
        writeln!(file, "2024-03-{:02} 00:00:00,{close}", day + 1).unwrap();
    }
    drop(file);

    let candles = load_candles_csv(&path, &Symbol::from("BTCUSDT")).unwrap();
    assert_eq!(candles.len(), 4);
    assert_eq!(candles[3].close, dec!(9));
    assert!(candles.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_candles_csv(dir.path().join("nope.csv"), &Symbol::from("BTCUSDT"));
    assert!(matches!(result, Err(market_data::Error::Io(_))));
}
