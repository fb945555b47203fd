pub mod account;
pub mod auth;
pub mod config;
pub mod podcast;
pub mod store;
pub mod testing;

pub use account::{AccountError, AccountService, CreateAccountInput, User, UserId, UserRole};
pub use auth::{
    basic_authorization, create_authenticator, AuthError, AuthRequest, Authenticator,
    BasicAuthenticator, Identity, NoneAuthenticator,
};
pub use config::{
    load_config, load_config_from_str, validate_config, AuthConfig, AuthMethod, Config,
    ConfigError, DatabaseConfig, SanitizedConfig, ServerConfig,
};
pub use podcast::{
    CatalogStats, CreateEpisodeInput, CreatePodcastInput, CreateReviewInput, Episode, EpisodeId,
    Podcast, PodcastError, PodcastId, PodcastRelations, PodcastService, Review, ReviewId,
    SearchPage, UpdateEpisodeFields, UpdatePodcastPayload, INTERNAL_ERROR_MESSAGE,
    SEARCH_PAGE_SIZE,
};
pub use store::{CatalogStore, SqliteCatalogStore, StoreError};
