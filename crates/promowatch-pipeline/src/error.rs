use thiserror::Error;

/// Errors that prevent a run from starting. Failures during a run are
/// reported through the run summary instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("a reconciliation run is already in progress")]
    AlreadyRunning,
}
