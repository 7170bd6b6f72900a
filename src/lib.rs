pub mod card;
pub mod config;
pub mod error;
pub mod generator;
pub mod http_client;
pub mod metrics;
pub mod nba_client;
pub mod player;
pub mod player_cache;
pub mod retrieval;
pub mod retry;

pub use error::{CardError, ErrorKind, FetchError};
pub use generator::CardGenerator;
