pub mod client;
pub mod types;

use crate::models::Question;
use async_trait::async_trait;
use thiserror::Error;

// Public API exports
pub use client::HttpBackend;
pub use types::{
    ChatTurnRequest, ChatTurnResponse, CompileRunRequest, CompileRunResponse,
    IllustrationResponse, SearchResponse, WireMessage,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status}: {detail}")]
    Status { status: u16, detail: String },
    /// The backend answered `ok: false`.
    #[error("{0}")]
    Backend(String),
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("backend worker is not running")]
    WorkerGone,
}

/// The endpoints the workspace consumes.
#[async_trait]
pub trait WorkspaceBackend: Send + Sync {
    /// `GET /api/ping-db`
    async fn fetch_questions(&self) -> Result<Vec<Question>, ApiError>;

    /// `POST /api/tools/chat`. Returns the body as sent, including `ok: false`.
    async fn chat(&self, request: &ChatTurnRequest) -> Result<ChatTurnResponse, ApiError>;

    /// `GET /api/get-illustration-by-id`
    async fn illustration(
        &self,
        question_id: i64,
        render: bool,
    ) -> Result<IllustrationResponse, ApiError>;

    /// `POST /api/compile-run-cpp`
    async fn compile_run(&self, code: &str) -> Result<CompileRunResponse, ApiError>;

    /// `GET /api/db?q=`: trigram similarity search over problem slugs.
    async fn search(&self, query: &str) -> Result<SearchResponse, ApiError>;
}
