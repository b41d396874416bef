//! Pure projection from session state to display rows
//!
//! Everything the terminal adapter draws is computed here, so the formatting
//! rules can be tested without a terminal.

use std::fmt::Display;

use chrono::{TimeZone, Utc};

use crate::funding::FundingSlot;
use crate::session::{Session, SessionStats};
use crate::symbol::Symbol;
use crate::types::{LiquidationRecord, TradeRecord};

/// Liquidations at or above this USD value are highlighted
pub const LARGE_LIQUIDATION_USD: f64 = 1_000_000.0;

/// Trades at or above this USD value are highlighted
pub const LARGE_TRADE_USD: f64 = 3_000_000.0;

/// Placeholder for any funding field without a reading
pub const NO_DATA: &str = "--";

/// Colour class of an event row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowTone {
    LongLiquidation,
    ShortLiquidation,
    Buy,
    Sell,
}

/// One display row of the liquidation or trade panel
#[derive(Debug, Clone, PartialEq)]
pub struct EventRow {
    pub time: String,
    pub symbol: Symbol,
    pub kind_label: &'static str,
    /// Price for liquidations, absent for trades
    pub detail: Option<String>,
    pub value: String,
    pub tone: RowTone,
    pub large: bool,
}

/// Sign class of a funding card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FundingTone {
    Positive,
    Negative,
    Flat,
}

/// One funding card, in active-symbol order
#[derive(Debug, Clone, PartialEq)]
pub struct FundingCard {
    pub symbol: Symbol,
    pub title: String,
    pub rate: String,
    pub annualized: String,
    pub direction: String,
    pub tone: FundingTone,
    pub extreme: bool,
    pub has_data: bool,
}

/// Everything the dashboard draws for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub liquidations: Vec<EventRow>,
    pub trades: Vec<EventRow>,
    pub funding: Vec<FundingCard>,
    pub stats: SessionStats,
}

/// Project the whole session with times in UTC. Reads only.
pub fn project(session: &Session) -> DashboardView {
    project_with_zone(session, &Utc)
}

/// Project the whole session, rendering liquidation times in `zone`
pub fn project_with_zone<Tz>(session: &Session, zone: &Tz) -> DashboardView
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    DashboardView {
        liquidations: session
            .liquidations()
            .iter()
            .map(|record| liquidation_row_in(record, zone))
            .collect(),
        trades: trade_rows(session.trades().iter()),
        funding: funding_cards(session.funding().iter()),
        stats: session.stats(),
    }
}

pub fn liquidation_rows<'a>(
    records: impl IntoIterator<Item = &'a LiquidationRecord>,
) -> Vec<EventRow> {
    records.into_iter().map(liquidation_row).collect()
}

pub fn trade_rows<'a>(records: impl IntoIterator<Item = &'a TradeRecord>) -> Vec<EventRow> {
    records.into_iter().map(trade_row).collect()
}

pub fn funding_cards<'a>(
    slots: impl IntoIterator<Item = (Symbol, &'a FundingSlot)>,
) -> Vec<FundingCard> {
    slots
        .into_iter()
        .map(|(symbol, slot)| funding_card(symbol, slot))
        .collect()
}

pub fn liquidation_row(record: &LiquidationRecord) -> EventRow {
    liquidation_row_in(record, &Utc)
}

pub fn liquidation_row_in<Tz>(record: &LiquidationRecord, zone: &Tz) -> EventRow
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let (kind_label, tone) = if record.is_long() {
        ("LONG LIQ", RowTone::LongLiquidation)
    } else {
        ("SHORT LIQ", RowTone::ShortLiquidation)
    };

    EventRow {
        time: record.time.with_timezone(zone).format("%H:%M:%S").to_string(),
        symbol: record.symbol,
        kind_label,
        detail: Some(format!("@ ${}", format_price(record.price))),
        value: format!("${}", format_value(record.usd_value)),
        tone,
        large: record.usd_value >= LARGE_LIQUIDATION_USD,
    }
}

pub fn trade_row(record: &TradeRecord) -> EventRow {
    let tone = if record.direction.is_buy() {
        RowTone::Buy
    } else {
        RowTone::Sell
    };

    EventRow {
        time: record.display_time.clone(),
        symbol: record.symbol,
        kind_label: record.direction.as_str(),
        detail: None,
        value: format!("${}", format_value(record.usd_value)),
        tone,
        large: record.usd_value >= LARGE_TRADE_USD,
    }
}

pub fn funding_card(symbol: Symbol, slot: &FundingSlot) -> FundingCard {
    let title = symbol.pair_label();
    match slot.reading() {
        None => FundingCard {
            symbol,
            title,
            rate: NO_DATA.to_string(),
            annualized: NO_DATA.to_string(),
            direction: NO_DATA.to_string(),
            tone: FundingTone::Flat,
            extreme: false,
            has_data: false,
        },
        Some(reading) => FundingCard {
            symbol,
            title,
            rate: format_rate(reading.rate),
            annualized: format_annualized(reading.annualized_rate),
            direction: reading.direction.clone(),
            tone: if reading.rate > 0.0 {
                FundingTone::Positive
            } else if reading.rate < 0.0 {
                FundingTone::Negative
            } else {
                FundingTone::Flat
            },
            extreme: slot.is_extreme(),
            has_data: slot.has_data(),
        },
    }
}

/// Compact USD amount: "1.25M", "250K", "999".
///
/// Rounds the exact binary value, halves away from zero (see [`to_fixed`]).
pub fn format_value(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{}M", to_fixed(value / 1_000_000.0, 2))
    } else if value >= 1_000.0 {
        format!("{}K", to_fixed(value / 1_000.0, 0))
    } else {
        to_fixed(value, 0)
    }
}

/// Grouped price with at most three decimals, trailing zeros dropped
pub fn format_price(price: f64) -> String {
    let fixed = to_fixed(price, 3);
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let fraction = fraction.trim_end_matches('0');

    if fraction.is_empty() {
        format!("{sign}{}", group_thousands(whole))
    } else {
        format!("{sign}{}.{fraction}", group_thousands(whole))
    }
}

/// Per-interval rate as a percentage: 0.0001 -> "+0.01%"
pub fn format_rate(rate: f64) -> String {
    let sign = if rate > 0.0 { "+" } else { "" };
    format!("{sign}{}%", to_fixed(rate * 100.0, 2))
}

/// Annualised percentage with one decimal: -4.38 -> "-4.4%"
pub fn format_annualized(annualized: f64) -> String {
    let sign = if annualized > 0.0 { "+" } else { "" };
    format!("{sign}{}%", to_fixed(annualized, 1))
}

/// Fixed-point rendering of the exact binary value of `value`.
///
/// Digits beyond `digits` are rounded from the exact expansion, so 2.675
/// (stored as 2.67499999...) gives "2.67". Only exact ties round away from
/// zero. A result with no non-zero digit carries no sign.
pub fn to_fixed(value: f64, digits: usize) -> String {
    let magnitude = value.abs();
    let fixed = if is_exact_tie(magnitude, digits) {
        // The tie terminates at digit `digits + 1`, so this expansion is exact
        let exact = format!("{:.*}", digits + 1, magnitude);
        let truncated = exact[..exact.len() - 1].trim_end_matches('.');
        increment_last_digit(truncated)
    } else {
        format!("{:.*}", digits, magnitude)
    };

    if value < 0.0 && fixed.bytes().any(|b| matches!(b, b'1'..=b'9')) {
        format!("-{fixed}")
    } else {
        fixed
    }
}

/// True when `magnitude` lies exactly halfway between two multiples of
/// 10^-digits. Such a value is an odd multiple of 2^-(digits + 1).
fn is_exact_tie(magnitude: f64, digits: usize) -> bool {
    let scaled = magnitude * 2f64.powi(digits as i32 + 1);
    scaled.is_finite() && scaled.fract() == 0.0 && scaled % 2.0 == 1.0
}

/// Add one unit in the last place of a plain decimal string
fn increment_last_digit(decimal: &str) -> String {
    let mut bytes = decimal.as_bytes().to_vec();
    for i in (0..bytes.len()).rev() {
        match bytes[i] {
            b'.' => continue,
            b'9' => bytes[i] = b'0',
            digit => {
                bytes[i] = digit + 1;
                return String::from_utf8_lossy(&bytes).into_owned();
            }
        }
    }
    format!("1{}", String::from_utf8_lossy(&bytes))
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FundingReading, Side};
    use chrono::FixedOffset;

    #[test]
    fn test_format_value() {
        struct TestCase {
            input: f64,
            expected: &'static str,
        }

        let tests = vec![
            TestCase {
                // TC0: millions, two decimals
                input: 1_250_000.0,
                expected: "1.25M",
            },
            TestCase {
                // TC1: exactly one million
                input: 1_000_000.0,
                expected: "1.00M",
            },
            TestCase {
                // TC2: thousands, no decimals
                input: 250_000.0,
                expected: "250K",
            },
            TestCase {
                // TC3: half rounds up
                input: 1_500.0,
                expected: "2K",
            },
            TestCase {
                // TC4: exactly one thousand
                input: 1_000.0,
                expected: "1K",
            },
            TestCase {
                // TC5: below a thousand
                input: 999.0,
                expected: "999",
            },
            TestCase {
                // TC6: fractional small value
                input: 12.5,
                expected: "13",
            },
            TestCase {
                // TC7: zero
                input: 0.0,
                expected: "0",
            },
            TestCase {
                // TC8: just under a million stays in K
                input: 999_400.0,
                expected: "999K",
            },
            TestCase {
                // TC9: large values keep the M suffix
                input: 12_345_678.0,
                expected: "12.35M",
            },
            TestCase {
                // TC10: 2.675 is stored below the tie
                input: 2_675_000.0,
                expected: "2.67M",
            },
            TestCase {
                // TC11: 1.115 is stored below the tie
                input: 1_115_000.0,
                expected: "1.11M",
            },
            TestCase {
                // TC12: exact tie in thousands rounds up
                input: 2_500.0,
                expected: "3K",
            },
            TestCase {
                // TC13: exact tie below a thousand rounds up
                input: 0.5,
                expected: "1",
            },
            TestCase {
                // TC14: 1.125 is exact, so the tie rounds up
                input: 1_125_000.0,
                expected: "1.13M",
            },
        ];

        for (index, test) in tests.iter().enumerate() {
            assert_eq!(format_value(test.input), test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_to_fixed() {
        assert_eq!(to_fixed(1.005, 2), "1.00");
        assert_eq!(to_fixed(0.125, 2), "0.13");
        assert_eq!(to_fixed(-0.125, 2), "-0.13");
        assert_eq!(to_fixed(9.995, 2), "9.99");
        assert_eq!(to_fixed(9.5, 0), "10");
        assert_eq!(to_fixed(99.95, 1), "100.0");
        assert_eq!(to_fixed(-0.0001, 2), "0.00");
        assert_eq!(to_fixed(0.0, 1), "0.0");
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(67_250.5), "67,250.5");
        assert_eq!(format_price(67_250.0), "67,250");
        assert_eq!(format_price(0.12345), "0.123");
        assert_eq!(format_price(1_234_567.891), "1,234,567.891");
        assert_eq!(format_price(999.9999), "1,000");
        assert_eq!(format_price(3.1), "3.1");
    }

    #[test]
    fn test_format_rates() {
        assert_eq!(format_rate(0.0001), "+0.01%");
        assert_eq!(format_rate(-0.0012), "-0.12%");
        assert_eq!(format_rate(0.0), "0.00%");
        assert_eq!(format_rate(-0.000001), "0.00%");
        assert_eq!(format_annualized(10.96), "+11.0%");
        assert_eq!(format_annualized(-4.38), "-4.4%");
        assert_eq!(format_annualized(0.0), "0.0%");
    }

    #[test]
    fn test_liquidation_row() {
        let record = LiquidationRecord {
            symbol: Symbol::Btc,
            side: Side::Sell,
            price: 67_250.5,
            usd_value: 1_250_000.0,
            time: Utc.with_ymd_and_hms(2024, 3, 1, 14, 5, 9).unwrap(),
        };

        let row = liquidation_row(&record);
        assert_eq!(row.time, "14:05:09");
        assert_eq!(row.kind_label, "LONG LIQ");
        assert_eq!(row.tone, RowTone::LongLiquidation);
        assert_eq!(row.detail.as_deref(), Some("@ $67,250.5"));
        assert_eq!(row.value, "$1.25M");
        assert!(row.large);

        let short = liquidation_row(&LiquidationRecord {
            side: Side::Buy,
            usd_value: 999_999.0,
            ..record
        });
        assert_eq!(short.kind_label, "SHORT LIQ");
        assert_eq!(short.tone, RowTone::ShortLiquidation);
        assert!(!short.large);
    }

    #[test]
    fn test_liquidation_time_in_zone() {
        struct TestCase {
            offset_secs: i32,
            expected: &'static str,
        }

        let record = LiquidationRecord {
            symbol: Symbol::Eth,
            side: Side::Buy,
            price: 3_500.0,
            usd_value: 200_000.0,
            time: Utc.with_ymd_and_hms(2024, 3, 1, 14, 5, 9).unwrap(),
        };

        let tests = vec![
            TestCase {
                // TC0: UTC is unchanged
                offset_secs: 0,
                expected: "14:05:09",
            },
            TestCase {
                // TC1: east of UTC
                offset_secs: 2 * 3600,
                expected: "16:05:09",
            },
            TestCase {
                // TC2: west of UTC wraps past midnight
                offset_secs: -(14 * 3600 + 30 * 60),
                expected: "23:35:09",
            },
        ];

        for (index, test) in tests.iter().enumerate() {
            let zone = FixedOffset::east_opt(test.offset_secs).unwrap();
            let row = liquidation_row_in(&record, &zone);
            assert_eq!(row.time, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_trade_row() {
        let row = trade_row(&TradeRecord {
            symbol: Symbol::Eth,
            direction: Side::Sell,
            usd_value: 3_000_000.0,
            display_time: "09:30:00".to_string(),
        });

        assert_eq!(row.time, "09:30:00");
        assert_eq!(row.kind_label, "SELL");
        assert_eq!(row.tone, RowTone::Sell);
        assert_eq!(row.detail, None);
        assert_eq!(row.value, "$3.00M");
        assert!(row.large);

        let buy = trade_row(&TradeRecord {
            symbol: Symbol::Btc,
            direction: Side::Buy,
            usd_value: 2_675_000.0,
            display_time: "09:30:01".to_string(),
        });
        assert_eq!(buy.kind_label, "BUY");
        assert_eq!(buy.tone, RowTone::Buy);
        assert_eq!(buy.value, "$2.67M");
        assert!(!buy.large);
    }

    #[test]
    fn test_funding_card_with_reading() {
        let slot = FundingSlot::Reading(FundingReading {
            symbol: Symbol::Eth,
            rate: -0.0012,
            annualized_rate: -4.38,
            direction: "bearish".to_string(),
        });

        let card = funding_card(Symbol::Eth, &slot);
        assert_eq!(card.title, "ETH/USDT");
        assert_eq!(card.rate, "-0.12%");
        assert_eq!(card.annualized, "-4.4%");
        assert_eq!(card.direction, "bearish");
        assert_eq!(card.tone, FundingTone::Negative);
        assert!(!card.extreme);
        assert!(card.has_data);
    }

    #[test]
    fn test_funding_card_placeholder() {
        let card = funding_card(Symbol::Sol, &FundingSlot::NoData);
        assert_eq!(card.title, "SOL/USDT");
        assert_eq!(card.rate, NO_DATA);
        assert_eq!(card.annualized, NO_DATA);
        assert_eq!(card.direction, NO_DATA);
        assert_eq!(card.tone, FundingTone::Flat);
        assert!(!card.has_data);
    }

    #[test]
    fn test_extreme_card() {
        let slot = FundingSlot::Reading(FundingReading {
            symbol: Symbol::Doge,
            rate: 0.001,
            annualized_rate: 109.5,
            direction: "bullish".to_string(),
        });
        let card = funding_card(Symbol::Doge, &slot);
        assert_eq!(card.rate, "+0.10%");
        assert_eq!(card.annualized, "+109.5%");
        assert_eq!(card.tone, FundingTone::Positive);
        assert!(card.extreme);
    }
}
