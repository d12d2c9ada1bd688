//! Translation workflow operations shared by the HTTP server and the CLI.

pub mod auto_skip;
pub mod build;
pub mod error;
pub mod keys;
pub mod state;
pub mod translation;

pub use error::ServiceError;
pub use state::ServerState;
