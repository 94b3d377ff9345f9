mod analytics;
mod chat;
mod dashboard;
mod detection;
mod health;
mod incidents;
mod reports;
mod sos;

pub use analytics::*;
pub use chat::*;
pub use dashboard::*;
pub use detection::*;
pub use health::*;
pub use incidents::*;
pub use reports::*;
pub use sos::*;
