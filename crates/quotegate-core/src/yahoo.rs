//! Yahoo Finance provider.
//!
//! Yahoo's unofficial API wants a session cookie from `fc.yahoo.com` and a
//! crumb token from the query hosts. The crumb is cached with a TTL; when
//! Yahoo rejects a session the cache is invalidated and the request fails
//! as an upstream error — the next request re-authenticates. No retries.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Instant;

use serde::Deserialize;
use serde_json::Value;

use crate::http_client::{HttpClient, HttpRequest};
use crate::normalize;
use crate::provider::{
    HistoryRow, HoldersSnapshot, MarketData, ProviderError, QueryResult,
};
use crate::{Period, Symbol};

const QUERY1: &str = "https://query1.finance.yahoo.com";
const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URLS: [&str; 2] = [
    "https://query1.finance.yahoo.com/v1/test/getcrumb",
    "https://query2.finance.yahoo.com/v1/test/getcrumb",
];
const REFERER: &str = "https://finance.yahoo.com/";
const REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Cookie/crumb session state with a freshness TTL.
#[derive(Debug)]
pub struct YahooAuth {
    crumb: Mutex<Option<CrumbState>>,
    ttl_secs: u64,
}

#[derive(Debug, Clone)]
struct CrumbState {
    value: String,
    fetched_at: Instant,
}

impl Default for YahooAuth {
    fn default() -> Self {
        Self {
            crumb: Mutex::new(None),
            ttl_secs: 3_600,
        }
    }
}

impl YahooAuth {
    fn cached(&self) -> Option<String> {
        let guard = self.crumb.lock().expect("crumb lock poisoned");
        guard
            .as_ref()
            .filter(|state| state.fetched_at.elapsed().as_secs() < self.ttl_secs)
            .map(|state| state.value.clone())
    }

    fn store(&self, value: String) {
        let mut guard = self.crumb.lock().expect("crumb lock poisoned");
        *guard = Some(CrumbState {
            value,
            fetched_at: Instant::now(),
        });
    }

    /// Drop the cached crumb so the next request re-authenticates.
    pub fn invalidate(&self) {
        let mut guard = self.crumb.lock().expect("crumb lock poisoned");
        *guard = None;
    }

    /// Return a usable crumb, fetching a fresh session when the cache is
    /// cold or stale. An env override skips the cookie flow entirely.
    async fn crumb(&self, http: &Arc<dyn HttpClient>) -> Result<String, ProviderError> {
        if let Some(value) = env_crumb() {
            return Ok(value);
        }
        if let Some(value) = self.cached() {
            return Ok(value);
        }

        // Visit fc.yahoo.com first so the cookie jar picks up a session.
        let cookie_request = HttpRequest::get(COOKIE_URL)
            .with_header("referer", REFERER)
            .with_timeout_ms(REQUEST_TIMEOUT_MS);
        http.execute(cookie_request).await.map_err(|e| {
            ProviderError::upstream(format!("failed to fetch yahoo cookie: {}", e.message()))
        })?;

        for url in CRUMB_URLS {
            let request = HttpRequest::get(url)
                .with_header("referer", REFERER)
                .with_timeout_ms(REQUEST_TIMEOUT_MS);
            let Ok(response) = http.execute(request).await else {
                continue;
            };
            if !response.is_success() || response.body.is_empty() {
                continue;
            }

            let body = response.body.trim();
            if body.contains("<html") || body.contains("<!DOCTYPE") {
                continue;
            }
            if body.to_lowercase().contains("too many requests") {
                return Err(ProviderError::upstream(
                    "yahoo rate limited while fetching crumb",
                ));
            }
            if !body.is_empty() && body.len() < 100 && !body.contains(' ') {
                self.store(body.to_owned());
                return Ok(body.to_owned());
            }
        }

        Err(ProviderError::upstream(
            "failed to fetch yahoo crumb from all endpoints",
        ))
    }
}

fn env_crumb() -> Option<String> {
    std::env::var("YAHOO_CRUMB").ok().filter(|v| !v.is_empty())
}

/// Market-data provider backed by Yahoo's chart and quoteSummary endpoints.
pub struct YahooProvider {
    http: Arc<dyn HttpClient>,
    auth: YahooAuth,
}

impl YahooProvider {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self {
            http,
            auth: YahooAuth::default(),
        }
    }

    async fn send(&self, url: String) -> Result<String, ProviderError> {
        tracing::debug!(%url, "yahoo request");
        let request = HttpRequest::get(url)
            .with_header("referer", REFERER)
            .with_timeout_ms(REQUEST_TIMEOUT_MS);

        let response = self.http.execute(request).await.map_err(|e| {
            ProviderError::upstream(format!("yahoo transport error: {}", e.message()))
        })?;

        if response.status == 401 || response.status == 429 {
            // Session no longer accepted; next request starts fresh.
            self.auth.invalidate();
            return Err(ProviderError::upstream(format!(
                "yahoo rejected the session (status {})",
                response.status
            )));
        }
        if !response.is_success() {
            return Err(ProviderError::upstream(format!(
                "yahoo returned status {}",
                response.status
            )));
        }

        Ok(response.body)
    }

    /// Fetch one quoteSummary result object. `Ok(None)` means Yahoo answered
    /// without data and without a structured error.
    async fn quote_summary(
        &self,
        symbol: &Symbol,
        modules: &str,
    ) -> Result<Option<Value>, ProviderError> {
        let crumb = self.auth.crumb(&self.http).await?;
        let url = format!(
            "{QUERY1}/v10/finance/quoteSummary/{}?modules={}&crumb={}",
            urlencoding::encode(symbol.as_str()),
            modules,
            urlencoding::encode(&crumb)
        );

        let body = self.send(url).await?;
        let envelope: QuoteSummaryEnvelope = serde_json::from_str(&body).map_err(|e| {
            ProviderError::upstream(format!("failed to parse yahoo summary response: {e}"))
        })?;

        if let Some(error) = envelope.quote_summary.error {
            return Err(error.into_provider_error());
        }
        Ok(envelope
            .quote_summary
            .result
            .into_iter()
            .flatten()
            .next())
    }

    async fn chart(
        &self,
        symbol: &Symbol,
        period: Period,
    ) -> Result<Option<ChartResult>, ProviderError> {
        let crumb = self.auth.crumb(&self.http).await?;
        let url = format!(
            "{QUERY1}/v8/finance/chart/{}?range={}&interval=1d&crumb={}",
            urlencoding::encode(symbol.as_str()),
            period,
            urlencoding::encode(&crumb)
        );

        let body = self.send(url).await?;
        let envelope: ChartEnvelope = serde_json::from_str(&body).map_err(|e| {
            ProviderError::upstream(format!("failed to parse yahoo chart response: {e}"))
        })?;

        if let Some(error) = envelope.chart.error {
            return Err(error.into_provider_error());
        }
        Ok(envelope.chart.result.into_iter().flatten().next())
    }

    async fn summary_mapping(
        &self,
        symbol: &Symbol,
        modules: &str,
        reshape: fn(&Value) -> QueryResult,
    ) -> Result<QueryResult, ProviderError> {
        let result = self.quote_summary(symbol, modules).await?;
        Ok(result.as_ref().map(reshape).unwrap_or_default())
    }
}

impl MarketData for YahooProvider {
    fn info<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<QueryResult, ProviderError>> + Send + 'a>> {
        Box::pin(async move {
            let modules = normalize::INFO_MODULES.join(",");
            self.summary_mapping(symbol, &modules, normalize::info).await
        })
    }

    fn history<'a>(
        &'a self,
        symbol: &'a Symbol,
        period: Period,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<HistoryRow>, ProviderError>> + Send + 'a>> {
        Box::pin(async move {
            let result = self.chart(symbol, period).await?;
            Ok(result
                .as_ref()
                .map(normalize::history_rows)
                .unwrap_or_default())
        })
    }

    fn financials<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<QueryResult, ProviderError>> + Send + 'a>> {
        Box::pin(async move {
            self.summary_mapping(symbol, "incomeStatementHistory", normalize::financials)
                .await
        })
    }

    fn earnings<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<QueryResult, ProviderError>> + Send + 'a>> {
        Box::pin(async move {
            self.summary_mapping(symbol, "earnings", normalize::earnings)
                .await
        })
    }

    fn holders<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<HoldersSnapshot, ProviderError>> + Send + 'a>> {
        Box::pin(async move {
            let result = self
                .quote_summary(symbol, "majorHoldersBreakdown,institutionOwnership")
                .await?;
            Ok(result.as_ref().map(normalize::holders).unwrap_or_default())
        })
    }

    fn recommendations<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<QueryResult, ProviderError>> + Send + 'a>> {
        Box::pin(async move {
            self.summary_mapping(symbol, "recommendationTrend", normalize::recommendations)
                .await
        })
    }

    fn calendar<'a>(
        &'a self,
        symbol: &'a Symbol,
    ) -> Pin<Box<dyn Future<Output = Result<QueryResult, ProviderError>> + Send + 'a>> {
        Box::pin(async move {
            self.summary_mapping(symbol, "calendarEvents", normalize::calendar)
                .await
        })
    }
}

// Wire envelopes for the two Yahoo endpoints.

#[derive(Debug, Deserialize)]
struct QuoteSummaryEnvelope {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryBody,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryBody {
    #[serde(default)]
    result: Option<Vec<Value>>,
    #[serde(default)]
    error: Option<YahooApiError>,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<YahooApiError>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChartResult {
    #[serde(default)]
    pub(crate) timestamp: Option<Vec<i64>>,
    #[serde(default)]
    pub(crate) indicators: ChartIndicators,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ChartIndicators {
    #[serde(default)]
    pub(crate) quote: Vec<ChartQuote>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ChartQuote {
    #[serde(default)]
    pub(crate) open: Vec<Option<f64>>,
    #[serde(default)]
    pub(crate) high: Vec<Option<f64>>,
    #[serde(default)]
    pub(crate) low: Vec<Option<f64>>,
    #[serde(default)]
    pub(crate) close: Vec<Option<f64>>,
    #[serde(default)]
    pub(crate) volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct YahooApiError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl YahooApiError {
    fn into_provider_error(self) -> ProviderError {
        let message = self
            .description
            .or(self.code.clone())
            .unwrap_or_else(|| String::from("yahoo API error"));
        let is_not_found = self
            .code
            .as_deref()
            .is_some_and(|code| code.eq_ignore_ascii_case("not found"));
        if is_not_found {
            ProviderError::not_found(message)
        } else {
            ProviderError::upstream(format!("yahoo API error: {message}"))
        }
    }
}
