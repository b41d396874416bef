//! Event normaliser
//!
//! Translates raw feed frames into canonical records. Shape translation only:
//! no filtering happens here.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

use crate::error::NormalizeError;
use crate::symbol::Symbol;
use crate::types::{
    EventKind, FeedMessage, FundingReading, LiquidationRecord, MarketEvent, Side, TradeRecord,
};

/// Normalise one feed frame into a [`MarketEvent`].
pub fn normalize(message: &FeedMessage) -> Result<MarketEvent, NormalizeError> {
    let kind = EventKind::from_kind(&message.kind)
        .ok_or_else(|| NormalizeError::UnknownKind(message.kind.clone()))?;

    match kind {
        EventKind::Liquidation => normalize_liquidation(message).map(MarketEvent::Liquidation),
        EventKind::Trade => normalize_trade(&message.data).map(MarketEvent::Trade),
        EventKind::Funding => normalize_funding(message).map(MarketEvent::Funding),
    }
}

fn normalize_liquidation(message: &FeedMessage) -> Result<LiquidationRecord, NormalizeError> {
    let data = &message.data;
    let symbol = symbol(text(data, "symbol")?)?;
    let side = side(text(data, "side")?)?;
    let price = number(data, "price")?;
    let usd_value = number(data, "usdValue")?;

    if price <= 0.0 {
        return Err(NormalizeError::OutOfRange {
            field: "price",
            value: price,
        });
    }
    if usd_value < 0.0 {
        return Err(NormalizeError::OutOfRange {
            field: "usdValue",
            value: usd_value,
        });
    }

    // Fall back to the envelope's emission time when the payload has none
    let time = match optional(data, "timestamp").or(message.timestamp.as_ref()) {
        Some(raw) => timestamp(raw)?,
        None => return Err(NormalizeError::MissingField("timestamp")),
    };

    Ok(LiquidationRecord {
        symbol,
        side,
        price,
        usd_value,
        time,
    })
}

fn normalize_trade(data: &Value) -> Result<TradeRecord, NormalizeError> {
    let symbol = symbol(text(data, "symbol")?)?;
    let direction = side(text(data, "direction")?)?;
    let usd_value = number(data, "usdValue")?;

    if usd_value < 0.0 {
        return Err(NormalizeError::OutOfRange {
            field: "usdValue",
            value: usd_value,
        });
    }

    let display_time = text(data, "timestr")?.to_string();

    Ok(TradeRecord {
        symbol,
        direction,
        usd_value,
        display_time,
    })
}

fn normalize_funding(message: &FeedMessage) -> Result<FundingReading, NormalizeError> {
    let data = &message.data;
    let raw_symbol = match message.symbol.as_deref() {
        Some(raw) => raw,
        None => text(data, "symbol")?,
    };

    Ok(FundingReading {
        symbol: symbol(raw_symbol)?,
        rate: number(data, "rate")?,
        annualized_rate: number(data, "annual")?,
        direction: text(data, "direction")?.to_string(),
    })
}

fn optional<'a>(data: &'a Value, field: &str) -> Option<&'a Value> {
    data.get(field).filter(|value| !value.is_null())
}

fn required<'a>(data: &'a Value, field: &'static str) -> Result<&'a Value, NormalizeError> {
    optional(data, field).ok_or(NormalizeError::MissingField(field))
}

fn text<'a>(data: &'a Value, field: &'static str) -> Result<&'a str, NormalizeError> {
    required(data, field)?
        .as_str()
        .ok_or(NormalizeError::MissingField(field))
}

/// Numbers may arrive as JSON numbers or numeric strings
fn number(data: &Value, field: &'static str) -> Result<f64, NormalizeError> {
    let parsed = match required(data, field)? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed
        .filter(|value| value.is_finite())
        .ok_or(NormalizeError::InvalidNumber(field))
}

fn symbol(raw: &str) -> Result<Symbol, NormalizeError> {
    raw.parse()
}

fn side(raw: &str) -> Result<Side, NormalizeError> {
    Side::parse(raw).ok_or_else(|| NormalizeError::UnknownSide(raw.to_string()))
}

/// Epoch millis (number or digit string) or ISO 8601, with or without offset
fn timestamp(raw: &Value) -> Result<DateTime<Utc>, NormalizeError> {
    let invalid = || NormalizeError::InvalidTimestamp(raw.to_string());

    match raw {
        Value::Number(number) => {
            let millis = number
                .as_i64()
                .or_else(|| number.as_f64().filter(|v| v.is_finite()).map(|v| v as i64))
                .ok_or_else(invalid)?;
            DateTime::from_timestamp_millis(millis).ok_or_else(invalid)
        }
        Value::String(text) => {
            let text = text.trim();
            if let Ok(millis) = text.parse::<i64>() {
                return DateTime::from_timestamp_millis(millis).ok_or_else(invalid);
            }
            if let Ok(time) = DateTime::parse_from_rfc3339(text) {
                return Ok(time.with_timezone(&Utc));
            }
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                .map(|naive| naive.and_utc())
                .map_err(|_| invalid())
        }
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn liquidation(data: Value) -> FeedMessage {
        FeedMessage::new("liquidation", data)
    }

    #[test]
    fn test_normalize_liquidation() {
        let message = liquidation(json!({
            "symbol": "BTCUSDT",
            "side": "SELL",
            "price": 67250.5,
            "usdValue": 1_250_000.0,
            "timestamp": 1_700_000_000_000_i64
        }));

        let event = normalize(&message).unwrap();
        let MarketEvent::Liquidation(liq) = event else {
            panic!("expected liquidation");
        };

        assert_eq!(liq.symbol, Symbol::Btc);
        assert_eq!(liq.side, Side::Sell);
        assert!(liq.is_long());
        assert_eq!(liq.price, 67250.5);
        assert_eq!(liq.usd_value, 1_250_000.0);
        assert_eq!(liq.time, Utc.timestamp_millis_opt(1_700_000_000_000).unwrap());
    }

    #[test]
    fn test_normalize_liquidation_numeric_strings_and_iso_time() {
        let message = liquidation(json!({
            "symbol": "ETHUSDT",
            "side": "BUY",
            "price": "3120.40",
            "usdValue": "250000",
            "timestamp": "2024-03-01T12:30:45.123456"
        }));

        let MarketEvent::Liquidation(liq) = normalize(&message).unwrap() else {
            panic!("expected liquidation");
        };

        assert_eq!(liq.symbol, Symbol::Eth);
        assert_eq!(liq.price, 3120.40);
        assert_eq!(liq.usd_value, 250_000.0);
        assert_eq!(liq.time.format("%H:%M:%S").to_string(), "12:30:45");
    }

    #[test]
    fn test_normalize_liquidation_falls_back_to_envelope_time() {
        let mut message = liquidation(json!({
            "symbol": "SOL",
            "side": "SELL",
            "price": 150.0,
            "usdValue": 200000.0
        }));
        message.timestamp = Some(json!("2024-03-01T08:00:00+00:00"));

        let MarketEvent::Liquidation(liq) = normalize(&message).unwrap() else {
            panic!("expected liquidation");
        };
        assert_eq!(liq.time.format("%H:%M:%S").to_string(), "08:00:00");
    }

    #[test]
    fn test_normalize_rejections() {
        struct TestCase {
            input: FeedMessage,
            expected: NormalizeError,
        }

        let base = json!({
            "symbol": "BTCUSDT",
            "side": "SELL",
            "price": 60000.0,
            "usdValue": 150000.0,
            "timestamp": 1_700_000_000_000_i64
        });
        let with = |field: &str, value: Value| {
            let mut data = base.clone();
            data[field] = value;
            liquidation(data)
        };
        let without = |field: &str| {
            let mut data = base.clone();
            data.as_object_mut().unwrap().remove(field);
            liquidation(data)
        };

        let tests = vec![
            TestCase {
                // TC0: unknown symbol
                input: with("symbol", json!("PEPEUSDT")),
                expected: NormalizeError::UnknownSymbol("PEPEUSDT".to_string()),
            },
            TestCase {
                // TC1: missing usd value
                input: without("usdValue"),
                expected: NormalizeError::MissingField("usdValue"),
            },
            TestCase {
                // TC2: null price is treated as missing
                input: with("price", Value::Null),
                expected: NormalizeError::MissingField("price"),
            },
            TestCase {
                // TC3: non-numeric string
                input: with("price", json!("abc")),
                expected: NormalizeError::InvalidNumber("price"),
            },
            TestCase {
                // TC4: non-finite string
                input: with("usdValue", json!("NaN")),
                expected: NormalizeError::InvalidNumber("usdValue"),
            },
            TestCase {
                // TC5: unknown side
                input: with("side", json!("HOLD")),
                expected: NormalizeError::UnknownSide("HOLD".to_string()),
            },
            TestCase {
                // TC6: zero price
                input: with("price", json!(0.0)),
                expected: NormalizeError::OutOfRange {
                    field: "price",
                    value: 0.0,
                },
            },
            TestCase {
                // TC7: negative usd value
                input: with("usdValue", json!(-5.0)),
                expected: NormalizeError::OutOfRange {
                    field: "usdValue",
                    value: -5.0,
                },
            },
            TestCase {
                // TC8: no timestamp anywhere
                input: without("timestamp"),
                expected: NormalizeError::MissingField("timestamp"),
            },
            TestCase {
                // TC9: garbage timestamp
                input: with("timestamp", json!("yesterday")),
                expected: NormalizeError::InvalidTimestamp("\"yesterday\"".to_string()),
            },
            TestCase {
                // TC10: unknown kind
                input: FeedMessage::new("open_interest", base.clone()),
                expected: NormalizeError::UnknownKind("open_interest".to_string()),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = normalize(&test.input).unwrap_err();
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_normalize_trade() {
        let message = FeedMessage::new(
            "trade",
            json!({
                "symbol": "SOLUSDT",
                "direction": "BUY",
                "usdValue": 750000,
                "timestr": "14:02:31"
            }),
        );

        let MarketEvent::Trade(trade) = normalize(&message).unwrap() else {
            panic!("expected trade");
        };

        assert_eq!(trade.symbol, Symbol::Sol);
        assert_eq!(trade.direction, Side::Buy);
        assert_eq!(trade.usd_value, 750_000.0);
        assert_eq!(trade.display_time, "14:02:31");
    }

    #[test]
    fn test_normalize_trade_without_direction_is_dropped() {
        let message = FeedMessage::new(
            "trade",
            json!({ "symbol": "BTCUSDT", "usdValue": 750000 }),
        );
        assert_eq!(
            normalize(&message),
            Err(NormalizeError::MissingField("direction"))
        );
    }

    #[test]
    fn test_missing_display_fields_are_dropped() {
        struct TestCase {
            input: FeedMessage,
            expected: NormalizeError,
        }

        let tests = vec![
            TestCase {
                // TC0: trade without its pre-formatted time
                input: FeedMessage::new(
                    "trade",
                    json!({ "symbol": "BTCUSDT", "direction": "SELL", "usdValue": 900000 }),
                ),
                expected: NormalizeError::MissingField("timestr"),
            },
            TestCase {
                // TC1: trade time that is not a string
                input: FeedMessage::new(
                    "trade",
                    json!({
                        "symbol": "BTCUSDT",
                        "direction": "SELL",
                        "usdValue": 900000,
                        "timestr": 1400
                    }),
                ),
                expected: NormalizeError::MissingField("timestr"),
            },
            TestCase {
                // TC2: funding without a trend label
                input: FeedMessage::new("funding", json!({ "rate": 0.0001, "annual": 10.9 }))
                    .with_symbol("BTCUSDT"),
                expected: NormalizeError::MissingField("direction"),
            },
            TestCase {
                // TC3: funding with a null trend label
                input: FeedMessage::new(
                    "funding",
                    json!({ "rate": 0.0001, "annual": 10.9, "direction": null }),
                )
                .with_symbol("ETHUSDT"),
                expected: NormalizeError::MissingField("direction"),
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = normalize(&test.input).unwrap_err();
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_normalize_funding() {
        let message = FeedMessage::new(
            "funding",
            json!({ "rate": -0.0012, "annual": -4.38, "direction": "bearish" }),
        )
        .with_symbol("ETHUSDT");

        let MarketEvent::Funding(reading) = normalize(&message).unwrap() else {
            panic!("expected funding");
        };

        assert_eq!(reading.symbol, Symbol::Eth);
        assert_eq!(reading.rate, -0.0012);
        assert_eq!(reading.annualized_rate, -4.38);
        assert_eq!(reading.direction, "bearish");
    }

    #[test]
    fn test_normalize_funding_requires_symbol() {
        let message = FeedMessage::new("funding", json!({ "rate": 0.0001, "annual": 10.9 }));
        assert_eq!(
            normalize(&message),
            Err(NormalizeError::MissingField("symbol"))
        );
    }
}
