// App layer: actix-web routes wired to the core services.

pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use state::AppState;
