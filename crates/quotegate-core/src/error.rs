use thiserror::Error;

use crate::provider::Operation;
use crate::Symbol;

/// Request-parameter failures caught before any provider call is made.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },

    #[error(
        "invalid period '{value}', expected one of 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max"
    )]
    InvalidPeriod { value: String },
}

/// Operation-layer result error. Exactly two outcomes exist: the symbol
/// yielded no data, or the upstream provider call failed. The HTTP boundary
/// translates these to 404 and 500 respectively.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("no {operation} data found for symbol {symbol}")]
    NotFound { operation: Operation, symbol: Symbol },

    #[error("Error fetching {operation}: {message}")]
    Upstream { operation: Operation, message: String },
}

impl GatewayError {
    pub fn not_found(operation: Operation, symbol: &Symbol) -> Self {
        Self::NotFound {
            operation,
            symbol: symbol.clone(),
        }
    }

    pub fn upstream(operation: Operation, message: impl Into<String>) -> Self {
        Self::Upstream {
            operation,
            message: message.into(),
        }
    }

    pub const fn operation(&self) -> Operation {
        match self {
            Self::NotFound { operation, .. } | Self::Upstream { operation, .. } => *operation,
        }
    }
}
