pub mod episodes;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod output;
pub mod podcasts;
pub mod routes;
pub mod users;

pub use routes::create_router;
