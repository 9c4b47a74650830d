pub mod dto;
pub mod error;
pub mod handlers;
pub mod server;
pub mod state;


pub use server::{build_router, serve, shutdown_signal, start_server};
pub use state::AppState;
