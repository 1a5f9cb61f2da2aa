// src/api/mod.rs
pub mod handlers;
pub mod routes;
pub mod state;

pub use handlers::WsBroker;
pub use routes::configure_routes;
pub use state::AppState;
