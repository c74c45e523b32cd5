pub mod handlers;
pub mod query_extractor;
pub mod routes;

pub use handlers::*;
pub use routes::*;
