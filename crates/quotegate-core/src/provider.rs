use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{Period, Symbol};

/// Normalized provider output: a JSON mapping with no fixed schema across
/// symbols. Different instruments legitimately yield different key sets.
pub type QueryResult = serde_json::Map<String, serde_json::Value>;

/// One identifier per gateway operation, used for routing, banners and
/// error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Info,
    History,
    Financials,
    Earnings,
    Holders,
    Recommendations,
    Calendar,
}

impl Operation {
    pub const ALL: [Self; 7] = [
        Self::Info,
        Self::History,
        Self::Financials,
        Self::Earnings,
        Self::Holders,
        Self::Recommendations,
        Self::Calendar,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::History => "history",
            Self::Financials => "financials",
            Self::Earnings => "earnings",
            Self::Holders => "holders",
            Self::Recommendations => "recommendations",
            Self::Calendar => "calendar",
        }
    }

    /// Route template for the banner listing.
    pub const fn route(self) -> &'static str {
        match self {
            Self::Info => "/api/info/{symbol}",
            Self::History => "/api/history/{symbol}",
            Self::Financials => "/api/financials/{symbol}",
            Self::Earnings => "/api/earnings/{symbol}",
            Self::Holders => "/api/holders/{symbol}",
            Self::Recommendations => "/api/recommendations/{symbol}",
            Self::Calendar => "/api/calendar/{symbol}",
        }
    }

    pub const fn describe(self) -> &'static str {
        match self {
            Self::Info => "instrument attributes",
            Self::History => "price history (period query, default 1mo)",
            Self::Financials => "annual financial statements",
            Self::Earnings => "earnings figures",
            Self::Holders => "major and institutional holders",
            Self::Recommendations => "analyst recommendation trend",
            Self::Calendar => "calendar events",
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider-level error classification. A structured not-found must survive
/// to the boundary unchanged; everything else is an upstream failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    NotFound,
    Upstream,
}

/// Structured error raised by a market-data provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    kind: ProviderErrorKind,
    message: String,
}

impl ProviderError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::NotFound,
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Upstream,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> ProviderErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ProviderError {}

/// One normalized price-history record. Key casing matches the tabular
/// export shape consumers of this API already rely on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Open")]
    pub open: f64,
    #[serde(rename = "High")]
    pub high: f64,
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Volume")]
    pub volume: Option<u64>,
}

/// Holder data as returned by the provider. Either block may be missing on
/// its own; the operation layer decides when the whole result counts as
/// absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HoldersSnapshot {
    pub major_holders: Option<QueryResult>,
    pub institutional_holders: Option<QueryResult>,
}

impl HoldersSnapshot {
    pub fn is_empty(&self) -> bool {
        fn absent(block: &Option<QueryResult>) -> bool {
            block.as_ref().is_none_or(QueryResult::is_empty)
        }
        absent(&self.major_holders) && absent(&self.institutional_holders)
    }
}

/// Market-data provider contract: one read-only accessor per operation.
///
/// Implementations return normalized shapes and raise `ProviderError`; they
/// do not decide emptiness semantics, which belong to the operation layer.
pub trait MarketData: Send + Sync {
    fn info<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<QueryResult, ProviderError>> + Send + 'a>>;

    fn history<'a>(
        &'a self,
        symbol: &'a Symbol,
        period: Period,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<HistoryRow>, ProviderError>> + Send + 'a>>;

    fn financials<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<QueryResult, ProviderError>> + Send + 'a>>;

    fn earnings<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<QueryResult, ProviderError>> + Send + 'a>>;

    fn holders<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<HoldersSnapshot, ProviderError>> + Send + 'a>>;

    fn recommendations<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<QueryResult, ProviderError>> + Send + 'a>>;

    fn calendar<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<QueryResult, ProviderError>> + Send + 'a>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_operation_has_a_distinct_route() {
        let mut routes: Vec<&str> = Operation::ALL.iter().map(|op| op.route()).collect();
        routes.sort_unstable();
        routes.dedup();
        assert_eq!(routes.len(), Operation::ALL.len());
    }

    #[test]
    fn holders_snapshot_with_empty_blocks_counts_as_absent() {
        let snapshot = HoldersSnapshot {
            major_holders: Some(QueryResult::new()),
            institutional_holders: None,
        };
        assert!(snapshot.is_empty());
    }

    #[test]
    fn holders_snapshot_with_one_block_is_present() {
        let mut block = QueryResult::new();
        block.insert("insidersPercentHeld".into(), serde_json::json!(0.02));
        let snapshot = HoldersSnapshot {
            major_holders: Some(block),
            institutional_holders: None,
        };
        assert!(!snapshot.is_empty());
    }
}
