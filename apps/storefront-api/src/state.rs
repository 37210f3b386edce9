//! Application state - shared across all handlers.

use std::sync::Arc;

use haven_core::domain::{PolicyTable, ThrottleScope};
use haven_core::ports::{LeadSink, ListingSearch, PasswordResetSender, RateLimiter, Throttle};
use haven_infra::{
    InMemoryLeadSink, InMemoryListingIndex, InMemoryPasswordResetSender, InMemoryRateLimiter,
};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub limiter: Arc<dyn RateLimiter>,
    pub policies: PolicyTable,
    pub listings: Arc<dyn ListingSearch>,
    pub leads: Arc<dyn LeadSink>,
    pub password_resets: Arc<dyn PasswordResetSender>,
    pub admin_token: Option<Arc<str>>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    ///
    /// One limiter is created here and shared by every worker, so all
    /// throttled actions in this process see the same counters.
    pub async fn new(config: &AppConfig) -> Self {
        let limiter: Arc<dyn RateLimiter> = Arc::new(InMemoryRateLimiter::new());

        let listings: Arc<dyn ListingSearch> = match &config.listings_path {
            Some(path) => match InMemoryListingIndex::from_file(path).await {
                Ok(index) => Arc::new(index),
                Err(e) => {
                    tracing::error!(
                        "Failed to load listings from {}: {}. Search will return no results.",
                        path.display(),
                        e
                    );
                    Arc::new(InMemoryListingIndex::default())
                }
            },
            None => {
                tracing::warn!("LISTINGS_PATH not set. Search will return no results.");
                Arc::new(InMemoryListingIndex::default())
            }
        };

        let (leads, password_resets) = Self::forwarders(config);

        tracing::info!("Application state initialized");

        Self {
            limiter,
            policies: config.policies.clone(),
            listings,
            leads,
            password_resets,
            admin_token: config.admin_token.as_deref().map(Arc::from),
        }
    }

    #[cfg(feature = "webhook")]
    fn forwarders(config: &AppConfig) -> (Arc<dyn LeadSink>, Arc<dyn PasswordResetSender>) {
        use haven_infra::{WebhookConfig, WebhookForwarder};

        let webhook = |url: &Option<String>| {
            url.as_ref()
                .and_then(|url| match WebhookForwarder::new(WebhookConfig::new(url.clone())) {
                    Ok(forwarder) => Some(Arc::new(forwarder)),
                    Err(e) => {
                        tracing::error!("Failed to build webhook client: {}. Using in-memory fallback.", e);
                        None
                    }
                })
        };

        let leads: Arc<dyn LeadSink> = match webhook(&config.lead_webhook_url) {
            Some(forwarder) => forwarder,
            None => Arc::new(InMemoryLeadSink::new()),
        };
        let password_resets: Arc<dyn PasswordResetSender> =
            match webhook(&config.password_reset_webhook_url) {
                Some(forwarder) => forwarder,
                None => Arc::new(InMemoryPasswordResetSender::new()),
            };

        (leads, password_resets)
    }

    #[cfg(not(feature = "webhook"))]
    fn forwarders(_config: &AppConfig) -> (Arc<dyn LeadSink>, Arc<dyn PasswordResetSender>) {
        tracing::info!("Running without webhook feature - using in-memory forwarders");
        (
            Arc::new(InMemoryLeadSink::new()),
            Arc::new(InMemoryPasswordResetSender::new()),
        )
    }

    /// The throttle for `subject` under `scope`, with the configured policy.
    pub fn throttle(&self, scope: ThrottleScope, subject: &str) -> Throttle<'_> {
        Throttle::new(self.limiter.as_ref(), scope.key(subject), *self.policies.get(scope))
    }
}
