use super::types::{
    ChatTurnRequest, ChatTurnResponse, CompileRunRequest, CompileRunResponse, IllustrationResponse,
    SearchResponse,
};
use super::{ApiError, WorkspaceBackend};
use crate::config::WorkspaceConfig;
use crate::models::Question;
use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument, warn};

const CLIENT_USER_AGENT: &str = "dsa-workspace/0.1";

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &WorkspaceConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(res: reqwest::Response) -> Result<T, ApiError> {
        let status = res.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                detail: status_detail(status, res.text().await),
            });
        }

        res.json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Text for a non-2xx answer: the FastAPI `detail`, else the raw body, else
/// the status reason. A body that cannot be read is logged and skipped.
fn status_detail<E: std::fmt::Display>(status: StatusCode, body: Result<String, E>) -> String {
    let body = body.unwrap_or_else(|e| {
        warn!(
            target: "api",
            status = status.as_u16(),
            error = %e,
            "Could not read error body"
        );
        String::new()
    });
    extract_detail(&body).unwrap_or_else(|| {
        if body.trim().is_empty() {
            status.canonical_reason().unwrap_or("request failed").to_string()
        } else {
            body
        }
    })
}

/// Pull `detail` out of a `{"detail": ...}` error body.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl WorkspaceBackend for HttpBackend {
    #[instrument(level = "info", skip(self))]
    async fn fetch_questions(&self) -> Result<Vec<Question>, ApiError> {
        let res = self
            .client
            .get(self.url("/api/ping-db"))
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .send()
            .await?;
        let questions: Vec<Question> = Self::decode(res).await?;
        info!(target: "api", count = questions.len(), "Questions fetched");
        Ok(questions)
    }

    #[instrument(level = "info", skip(self, request), fields(messages = request.messages.len()))]
    async fn chat(&self, request: &ChatTurnRequest) -> Result<ChatTurnResponse, ApiError> {
        let start = Instant::now();
        let res = self
            .client
            .post(self.url("/api/tools/chat"))
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .json(request)
            .send()
            .await?;
        let result = Self::decode::<ChatTurnResponse>(res).await;
        let elapsed = start.elapsed();
        match &result {
            Ok(body) => info!(target: "api", ?elapsed, ok = body.ok, "Tool chat answered"),
            Err(e) => error!(target: "api", ?elapsed, error = %e, "Tool chat failed"),
        }
        result
    }

    #[instrument(level = "info", skip(self))]
    async fn illustration(
        &self,
        question_id: i64,
        render: bool,
    ) -> Result<IllustrationResponse, ApiError> {
        let start = Instant::now();
        let res = self
            .client
            .get(self.url("/api/get-illustration-by-id"))
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .query(&[("id", question_id.to_string()), ("render", render.to_string())])
            .send()
            .await?;
        let body: IllustrationResponse = Self::decode(res).await?;
        info!(
            target: "api",
            elapsed = ?start.elapsed(),
            has_video = body.video_url.is_some(),
            has_warning = body.warning.is_some(),
            "Illustration received"
        );
        Ok(body)
    }

    #[instrument(level = "info", skip(self, code), fields(code_len = code.len()))]
    async fn compile_run(&self, code: &str) -> Result<CompileRunResponse, ApiError> {
        let res = self
            .client
            .post(self.url("/api/compile-run-cpp"))
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .json(&CompileRunRequest { code })
            .send()
            .await?;
        Self::decode(res).await
    }

    #[instrument(level = "info", skip(self))]
    async fn search(&self, query: &str) -> Result<SearchResponse, ApiError> {
        let res = self
            .client
            .get(self.url("/api/db"))
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .query(&[("q", query)])
            .send()
            .await?;
        let body: SearchResponse = Self::decode(res).await?;
        info!(
            target: "api",
            found = body.most_probable_question.is_some(),
            others = body.other_probable_questions.len(),
            "Search answered"
        );
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_detail_string() {
        assert_eq!(
            extract_detail(r#"{"detail": "Problem not found"}"#),
            Some("Problem not found".to_string())
        );
    }

    #[test]
    fn test_extract_detail_structured() {
        let detail = extract_detail(r#"{"detail": [{"loc": ["query", "id"]}]}"#).unwrap();
        assert!(detail.contains("query"));
    }

    #[test]
    fn test_extract_detail_absent_or_invalid() {
        assert_eq!(extract_detail("Internal Server Error"), None);
        assert_eq!(extract_detail(r#"{"message": "nope"}"#), None);
        assert_eq!(extract_detail(r#"{"detail": null}"#), None);
    }

    #[test]
    fn test_status_detail_fallbacks() {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        assert_eq!(
            status_detail(status, Ok::<_, String>(r#"{"detail": "db down"}"#.to_string())),
            "db down"
        );
        assert_eq!(
            status_detail(status, Ok::<_, String>(r#"{"error":"g++ not found"}"#.to_string())),
            r#"{"error":"g++ not found"}"#
        );
        assert_eq!(
            status_detail(status, Err::<String, _>("connection reset")),
            "Internal Server Error"
        );
        assert_eq!(
            status_detail(StatusCode::BAD_GATEWAY, Ok::<_, String>("  ".to_string())),
            "Bad Gateway"
        );
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = WorkspaceConfig {
            api_base_url: "http://localhost:3000/".to_string(),
            ..WorkspaceConfig::default()
        };
        let backend = HttpBackend::new(&config).unwrap();
        assert_eq!(backend.url("/api/ping-db"), "http://localhost:3000/api/ping-db");
    }
}
