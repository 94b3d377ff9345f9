pub mod cli;
pub mod config;
pub mod handlers;
pub mod server;
pub mod state;
pub mod storage;
pub mod stream;

pub use config::ServerConfig;
pub use state::ServerState;
pub use stream::{BroadcastRegistry, EventGenerator, GeneratorConfig};
