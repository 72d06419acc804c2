pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;
pub mod state;
pub mod users;

pub use error::ApiError;
pub use server::{build_router, run_server};
pub use state::AppState;
