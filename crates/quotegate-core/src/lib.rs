//! # Quotegate Core
//!
//! Domain contracts and the Yahoo Finance provider for the quote gateway.
//!
//! The gateway is a stateless HTTP front end over a read-only market-data
//! provider: each request parses a symbol (and optionally a period), makes
//! one provider call, normalizes the result into a JSON mapping, and maps
//! failures to exactly two outcomes (not found, upstream failure).
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`domain`] | Request-side types (`Symbol`, `Period`) |
//! | [`error`] | Validation and operation-layer errors |
//! | [`gateway`] | Operation layer with the uniform emptiness rule |
//! | [`http_client`] | Transport seam (reqwest in production, scripted in tests) |
//! | [`normalize`] | Per-operation payload normalizers |
//! | [`provider`] | Provider contract and normalized shapes |
//! | [`yahoo`] | Yahoo Finance provider (cookie/crumb session) |

pub mod domain;
pub mod error;
pub mod gateway;
pub mod http_client;
pub mod normalize;
pub mod provider;
pub mod yahoo;

pub use domain::{Period, Symbol};
pub use error::{GatewayError, ValidationError};
pub use gateway::{HistoryReport, HoldersReport, QuoteGateway, TableReport};
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient};
pub use provider::{
    HistoryRow, HoldersSnapshot, MarketData, Operation, ProviderError, ProviderErrorKind,
    QueryResult,
};
pub use yahoo::{YahooAuth, YahooProvider};
