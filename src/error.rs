use thiserror::Error;

/// The error kinds the FSM Orchestrator can surface. Each variant maps to
/// either a terminal `End(error)` transition or a documented degraded
/// fallback, as described in the error-handling design: `InvalidRequest` and
/// `ExecutorFailure` and `CancellationRequested` are always terminal;
/// `CardNotFound` and `VectorStoreUnavailable` are handled by the component
/// that raises them and rarely escape to this level; `AgentFailure` degrades
/// per-mode rather than terminating.
#[derive(Debug, Error, Clone)]
pub enum OrchestratorError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("card not found: {0}")]
    CardNotFound(String),

    #[error("agent failure: {0}")]
    AgentFailure(String),

    #[error("plan executor could not reach target deck size: {0}")]
    ExecutorFailure(String),

    #[error("vector store unavailable: {0}")]
    VectorStoreUnavailable(String),

    #[error("request was cancelled")]
    CancellationRequested,

    #[error("unknown format: {0}")]
    UnknownFormat(String),
}

impl OrchestratorError {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrchestratorError::InvalidRequest(_)
                | OrchestratorError::ExecutorFailure(_)
                | OrchestratorError::CancellationRequested
                | OrchestratorError::UnknownFormat(_)
        )
    }
}
