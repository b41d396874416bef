use thiserror::Error;

/// Reasons an inbound feed payload is rejected by the normaliser.
///
/// None of these are fatal: the [`Session`](crate::session::Session) drops the
/// payload, counts it and keeps consuming the stream.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    #[error("unknown event kind: {0}")]
    UnknownKind(String),

    #[error("symbol not in catalog: {0}")]
    UnknownSymbol(String),

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("non-numeric or non-finite value for field: {0}")]
    InvalidNumber(&'static str),

    #[error("unknown side: {0}")]
    UnknownSide(String),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("value out of range for {field}: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

/// Errors surfaced by the dashboard binary.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration for {key}: {value}")]
    Config { key: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_error_display() {
        struct TestCase {
            input: NormalizeError,
            expected: &'static str,
        }

        let tests = vec![
            TestCase {
                // TC0: unknown symbol carries the raw pair
                input: NormalizeError::UnknownSymbol("PEPEUSDT".to_string()),
                expected: "symbol not in catalog: PEPEUSDT",
            },
            TestCase {
                // TC1: missing field names the field
                input: NormalizeError::MissingField("usdValue"),
                expected: "missing field: usdValue",
            },
            TestCase {
                // TC2: out of range reports field and value
                input: NormalizeError::OutOfRange {
                    field: "price",
                    value: -1.0,
                },
                expected: "value out of range for price: -1",
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            assert_eq!(test.input.to_string(), test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_dashboard_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no tty");
        let error = DashboardError::from(io);
        assert!(matches!(error, DashboardError::Io(_)));
        assert_eq!(error.to_string(), "I/O error: no tty");
    }
}
