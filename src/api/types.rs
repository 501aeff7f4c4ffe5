use super::ApiError;
use crate::models::Question;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: String,
    pub content: String,
}

impl WireMessage {
    pub fn new(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatTurnRequest {
    pub user_id: String,
    pub messages: Vec<WireMessage>,
    pub toolkits: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChatTurnResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub assistant_text: Option<String>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ChatTurnResponse {
    /// Turn an `ok: false` body into an error carrying the backend's detail.
    pub fn into_result(self) -> Result<Self, ApiError> {
        if self.ok {
            Ok(self)
        } else {
            Err(ApiError::Backend(
                self.detail
                    .filter(|d| !d.trim().is_empty())
                    .unwrap_or_else(|| "Request failed".to_string()),
            ))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IllustrationResponse {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub storage_key: Option<String>,
    #[serde(default)]
    pub warning: Option<String>,
    #[serde(default)]
    pub render_error: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompileRunRequest<'a> {
    pub code: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CompileRunResponse {
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `GET /api/db?q=` answer. Rows carry an extra `score` column that is ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub most_probable_question: Option<Question>,
    #[serde(default)]
    pub other_probable_questions: Vec<Question>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_omits_missing_model() {
        let request = ChatTurnRequest {
            user_id: "u-1".to_string(),
            messages: vec![WireMessage::user("hello")],
            toolkits: vec!["CODEINTERPRETER".to_string()],
            model: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("model").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["toolkits"][0], "CODEINTERPRETER");
    }

    #[test]
    fn test_chat_response_missing_text_is_not_an_error() {
        let response: ChatTurnResponse = serde_json::from_str(r#"{"ok": true}"#).unwrap();
        let response = response.into_result().unwrap();
        assert!(response.assistant_text.is_none());
    }

    #[test]
    fn test_chat_response_ok_false_uses_detail() {
        let response: ChatTurnResponse =
            serde_json::from_str(r#"{"ok": false, "detail": "quota exceeded"}"#).unwrap();
        let err = response.into_result().unwrap_err();
        assert_eq!(err.to_string(), "quota exceeded");

        let bare: ChatTurnResponse = serde_json::from_str(r#"{"ok": false}"#).unwrap();
        assert_eq!(bare.into_result().unwrap_err().to_string(), "Request failed");
    }

    #[test]
    fn test_illustration_response_partial_fields() {
        let response: IllustrationResponse = serde_json::from_str(
            r#"{"question": "two-sum", "code": "from manim import *", "warning": null}"#,
        )
        .unwrap();
        assert_eq!(response.code.as_deref(), Some("from manim import *"));
        assert!(response.warning.is_none());
        assert!(response.video_url.is_none());
    }

    #[test]
    fn test_search_response_ranked_rows() {
        let response: SearchResponse = serde_json::from_str(
            r#"{
                "query": "two sum",
                "most_probable_question": {"id": 4, "title": "Arrays", "difficulty": "Easy", "question": "two-sum", "score": 0.8},
                "other_probable_questions": [{"id": 9, "question": "three-sum", "score": 0.4}]
            }"#,
        )
        .unwrap();
        assert_eq!(response.most_probable_question.unwrap().id, 4);
        assert_eq!(response.other_probable_questions[0].question, "three-sum");
    }
}
