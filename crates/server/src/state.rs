use std::sync::Arc;

use podcatalog_core::{AccountService, Authenticator, Config, PodcastService, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn Authenticator>,
    podcasts: PodcastService,
    accounts: AccountService,
}

impl AppState {
    pub fn new(
        config: Config,
        authenticator: Arc<dyn Authenticator>,
        podcasts: PodcastService,
        accounts: AccountService,
    ) -> Self {
        Self {
            config,
            authenticator,
            podcasts,
            accounts,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    /// Realm announced in `WWW-Authenticate` challenges.
    pub fn realm(&self) -> &str {
        &self.config.auth.realm
    }

    pub fn podcasts(&self) -> &PodcastService {
        &self.podcasts
    }

    pub fn accounts(&self) -> &AccountService {
        &self.accounts
    }
}
