pub mod acquire;
pub mod engine;
pub mod error;
pub mod guard;
pub mod memory;
pub mod source;

pub use acquire::{Acquisition, PageFailure};
pub use engine::{EngineSettings, ReconcileEngine};
pub use error::PipelineError;
pub use guard::{RunGuard, RunPermit};
pub use memory::MemoryStore;
pub use source::PageSource;
