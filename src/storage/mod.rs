mod memory;
mod sos;
mod traits;
mod types;

pub use memory::InMemoryIncidentStore;
pub use sos::InMemorySosRecordingStore;
pub use traits::{IncidentStore, SosRecordingStore, StorageError, StorageResult};
pub use types::*;
