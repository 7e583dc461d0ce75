use std::sync::Arc;

use quotegate_core::{MarketData, QuoteGateway};

/// Shared handler state: just the operation layer behind an `Arc`. Nothing
/// here mutates between requests.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<QuoteGateway>,
}

impl AppState {
    pub fn new(provider: Arc<dyn MarketData>) -> Self {
        Self {
            gateway: Arc::new(QuoteGateway::new(provider)),
        }
    }
}
