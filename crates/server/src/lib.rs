pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use state::AppState;
