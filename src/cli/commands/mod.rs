//! CLI command implementations.

mod ask;
mod chat;
mod config;
mod models;
mod pipeline;
mod pull;
mod search;
mod serve;
mod sources;

pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use models::run_models;
pub use pull::run_pull;
pub use search::run_search;
pub use serve::run_serve;
pub use sources::run_sources;
