//! Operation layer: one method per endpoint, uniform emptiness rule.
//!
//! Every operation resolves to either a payload, a `NotFound`, or an
//! `Upstream` failure. "Absent or zero-length" counts as not found across
//! all operations; a structured not-found raised by the provider passes
//! through without being re-wrapped.

use std::sync::Arc;

use serde::Serialize;

use crate::error::GatewayError;
use crate::provider::{
    HistoryRow, MarketData, Operation, ProviderError, ProviderErrorKind, QueryResult,
};
use crate::{Period, Symbol};

/// Stateless front end over a market-data provider. Holds no per-request
/// state; cheap to share across handlers behind an `Arc`.
pub struct QuoteGateway {
    provider: Arc<dyn MarketData>,
}

/// History payload with the echoed request parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryReport {
    pub symbol: Symbol,
    pub period: Period,
    pub count: usize,
    pub data: Vec<HistoryRow>,
}

/// `{symbol, data}` wrapper used by the tabular operations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableReport {
    pub symbol: Symbol,
    pub data: QueryResult,
}

/// Holder payload; an absent block is omitted from the body entirely.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldersReport {
    pub symbol: Symbol,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major_holders: Option<QueryResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institutional_holders: Option<QueryResult>,
}

impl QuoteGateway {
    pub fn new(provider: Arc<dyn MarketData>) -> Self {
        Self { provider }
    }

    /// Instrument attributes as a bare mapping.
    pub async fn info(&self, symbol: &Symbol) -> Result<QueryResult, GatewayError> {
        let data = self
            .provider
            .info(symbol)
            .await
            .map_err(|e| translate(Operation::Info, symbol, e))?;
        require_mapping(Operation::Info, symbol, data)
    }

    /// Daily price history over the requested period.
    pub async fn history(
        &self,
        symbol: &Symbol,
        period: Period,
    ) -> Result<HistoryReport, GatewayError> {
        let data = self
            .provider
            .history(symbol, period)
            .await
            .map_err(|e| translate(Operation::History, symbol, e))?;
        if data.is_empty() {
            return Err(GatewayError::not_found(Operation::History, symbol));
        }
        Ok(HistoryReport {
            symbol: symbol.clone(),
            period,
            count: data.len(),
            data,
        })
    }

    /// Annual statement line items, column-oriented by period end date.
    pub async fn financials(&self, symbol: &Symbol) -> Result<TableReport, GatewayError> {
        let data = self
            .provider
            .financials(symbol)
            .await
            .map_err(|e| translate(Operation::Financials, symbol, e))?;
        table(Operation::Financials, symbol, data)
    }

    /// Yearly earnings figures.
    pub async fn earnings(&self, symbol: &Symbol) -> Result<TableReport, GatewayError> {
        let data = self
            .provider
            .earnings(symbol)
            .await
            .map_err(|e| translate(Operation::Earnings, symbol, e))?;
        table(Operation::Earnings, symbol, data)
    }

    /// Major and institutional holders; partial presence is allowed, both
    /// blocks empty is a not-found.
    pub async fn holders(&self, symbol: &Symbol) -> Result<HoldersReport, GatewayError> {
        let snapshot = self
            .provider
            .holders(symbol)
            .await
            .map_err(|e| translate(Operation::Holders, symbol, e))?;
        if snapshot.is_empty() {
            return Err(GatewayError::not_found(Operation::Holders, symbol));
        }
        Ok(HoldersReport {
            symbol: symbol.clone(),
            major_holders: snapshot.major_holders.filter(|block| !block.is_empty()),
            institutional_holders: snapshot
                .institutional_holders
                .filter(|block| !block.is_empty()),
        })
    }

    /// Analyst recommendation trend keyed by period.
    pub async fn recommendations(&self, symbol: &Symbol) -> Result<TableReport, GatewayError> {
        let data = self
            .provider
            .recommendations(symbol)
            .await
            .map_err(|e| translate(Operation::Recommendations, symbol, e))?;
        table(Operation::Recommendations, symbol, data)
    }

    /// Calendar events as a bare mapping.
    pub async fn calendar(&self, symbol: &Symbol) -> Result<QueryResult, GatewayError> {
        let data = self
            .provider
            .calendar(symbol)
            .await
            .map_err(|e| translate(Operation::Calendar, symbol, e))?;
        require_mapping(Operation::Calendar, symbol, data)
    }
}

fn translate(operation: Operation, symbol: &Symbol, error: ProviderError) -> GatewayError {
    match error.kind() {
        ProviderErrorKind::NotFound => GatewayError::not_found(operation, symbol),
        ProviderErrorKind::Upstream => GatewayError::upstream(operation, error.message()),
    }
}

fn require_mapping(
    operation: Operation,
    symbol: &Symbol,
    data: QueryResult,
) -> Result<QueryResult, GatewayError> {
    if data.is_empty() {
        return Err(GatewayError::not_found(operation, symbol));
    }
    Ok(data)
}

fn table(
    operation: Operation,
    symbol: &Symbol,
    data: QueryResult,
) -> Result<TableReport, GatewayError> {
    if data.is_empty() {
        return Err(GatewayError::not_found(operation, symbol));
    }
    Ok(TableReport {
        symbol: symbol.clone(),
        data,
    })
}
