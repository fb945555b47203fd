//! Podcast catalog: entities and the operations exposed over them.

mod error;
mod service;
mod types;

pub use error::{PodcastError, INTERNAL_ERROR_MESSAGE};
pub use service::PodcastService;
pub use types::*;
