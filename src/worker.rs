use crate::api::WorkspaceBackend;
use crate::models::{BackendRequest, BackendResponse};
use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info};

/// Spawn the thread that performs all network calls.
///
/// One tokio runtime lives for the lifetime of the thread and every request
/// runs as its own task, so a slow illustration render never holds up chat.
/// The thread exits once `request_rx` is disconnected.
pub fn spawn_backend_worker<B>(
    backend: B,
    response_tx: Sender<BackendResponse>,
    request_rx: Receiver<BackendRequest>,
) -> std::io::Result<thread::JoinHandle<()>>
where
    B: WorkspaceBackend + 'static,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()?;
    let backend: Arc<dyn WorkspaceBackend> = Arc::new(backend);

    thread::Builder::new()
        .name("dsa-workspace::backend_worker".to_string())
        .spawn(move || {
            while let Ok(request) = request_rx.recv() {
                debug!(target: "worker", ?request, "Worker received request");
                let backend = Arc::clone(&backend);
                let response_tx = response_tx.clone();
                runtime.spawn(async move {
                    let response = handle_request(backend.as_ref(), request).await;
                    if response_tx.send(response).is_err() {
                        debug!(target: "worker", "UI dropped, discarding response");
                    }
                });
            }
            info!(target: "worker", "Request channel disconnected, exiting");
            runtime.shutdown_background();
        })
}

pub async fn handle_request(
    backend: &dyn WorkspaceBackend,
    request: BackendRequest,
) -> BackendResponse {
    match request {
        BackendRequest::FetchQuestions => {
            BackendResponse::Questions(backend.fetch_questions().await)
        }
        BackendRequest::Chat {
            request_id,
            purpose,
            payload,
        } => BackendResponse::Chat {
            request_id,
            purpose,
            result: backend.chat(&payload).await,
        },
        BackendRequest::Illustration {
            request_id,
            question_id,
            render,
        } => BackendResponse::Illustration {
            request_id,
            result: backend.illustration(question_id, render).await,
        },
        BackendRequest::CompileRun { run_id, code } => BackendResponse::CompileRun {
            run_id,
            result: backend.compile_run(&code).await,
        },
        BackendRequest::Search { request_id, query } => BackendResponse::Search {
            request_id,
            result: backend.search(&query).await,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{
        ApiError, ChatTurnRequest, ChatTurnResponse, CompileRunResponse, IllustrationResponse,
        SearchResponse, WireMessage,
    };
    use crate::models::{ChatPurpose, Question};
    use async_trait::async_trait;
    use crossbeam_channel::unbounded;
    use std::time::Duration;

    struct MockBackend;

    #[async_trait]
    impl WorkspaceBackend for MockBackend {
        async fn fetch_questions(&self) -> Result<Vec<Question>, ApiError> {
            Ok(vec![Question {
                id: 1,
                title: "Arrays".to_string(),
                difficulty: "Easy".to_string(),
                question: "two-sum".to_string(),
                markdown: String::new(),
                created_at: None,
            }])
        }

        async fn chat(&self, request: &ChatTurnRequest) -> Result<ChatTurnResponse, ApiError> {
            let last = request
                .messages
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default();
            Ok(ChatTurnResponse {
                ok: true,
                assistant_text: Some(format!("echo: {}", last)),
                ..ChatTurnResponse::default()
            })
        }

        async fn illustration(
            &self,
            question_id: i64,
            _render: bool,
        ) -> Result<IllustrationResponse, ApiError> {
            Err(ApiError::Status {
                status: 404,
                detail: format!("Problem {} not found", question_id),
            })
        }

        async fn compile_run(&self, code: &str) -> Result<CompileRunResponse, ApiError> {
            Ok(CompileRunResponse {
                stdout: Some(format!("{} bytes", code.len())),
                ..CompileRunResponse::default()
            })
        }

        async fn search(&self, query: &str) -> Result<SearchResponse, ApiError> {
            let mut rows = self.fetch_questions().await?;
            let best = rows.iter().position(|q| q.question.contains(query)).map(|i| rows.remove(i));
            Ok(SearchResponse {
                query: query.to_string(),
                most_probable_question: best,
                other_probable_questions: rows,
            })
        }
    }

    #[tokio::test]
    async fn test_handle_request_preserves_correlation() {
        let response = handle_request(
            &MockBackend,
            BackendRequest::Chat {
                request_id: 7,
                purpose: ChatPurpose::CodeRun,
                payload: ChatTurnRequest {
                    user_id: "u".to_string(),
                    messages: vec![WireMessage::user("hi")],
                    toolkits: vec![],
                    model: None,
                },
            },
        )
        .await;
        match response {
            BackendResponse::Chat {
                request_id,
                purpose,
                result,
            } => {
                assert_eq!(request_id, 7);
                assert_eq!(purpose, ChatPurpose::CodeRun);
                assert_eq!(result.unwrap().assistant_text.as_deref(), Some("echo: hi"));
            }
            other => panic!("unexpected {:?}", other),
        }

        match handle_request(
            &MockBackend,
            BackendRequest::Illustration {
                request_id: 11,
                question_id: 9,
                render: true,
            },
        )
        .await
        {
            BackendResponse::Illustration {
                request_id,
                result: Err(ApiError::Status { status, detail }),
            } => {
                assert_eq!(request_id, 11);
                assert_eq!(status, 404);
                assert!(detail.contains('9'));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_search_request_carries_best_match() {
        match handle_request(
            &MockBackend,
            BackendRequest::Search {
                request_id: 5,
                query: "two".to_string(),
            },
        )
        .await
        {
            BackendResponse::Search {
                request_id,
                result: Ok(response),
            } => {
                assert_eq!(request_id, 5);
                assert_eq!(response.query, "two");
                assert_eq!(response.most_probable_question.map(|q| q.id), Some(1));
                assert!(response.other_probable_questions.is_empty());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_worker_thread_round_trip_and_exit() {
        let (request_tx, request_rx) = unbounded();
        let (response_tx, response_rx) = unbounded();
        let handle = spawn_backend_worker(MockBackend, response_tx, request_rx).unwrap();

        request_tx.send(BackendRequest::FetchQuestions).unwrap();
        request_tx
            .send(BackendRequest::CompileRun {
                run_id: 3,
                code: "int main(){}".to_string(),
            })
            .unwrap();

        let mut saw_questions = false;
        let mut saw_compile = false;
        for _ in 0..2 {
            match response_rx.recv_timeout(Duration::from_secs(5)).unwrap() {
                BackendResponse::Questions(Ok(questions)) => {
                    assert_eq!(questions.len(), 1);
                    saw_questions = true;
                }
                BackendResponse::CompileRun { run_id, result } => {
                    assert_eq!(run_id, 3);
                    assert_eq!(result.unwrap().stdout.as_deref(), Some("12 bytes"));
                    saw_compile = true;
                }
                other => panic!("unexpected {:?}", other),
            }
        }
        assert!(saw_questions && saw_compile);

        drop(request_tx);
        handle.join().unwrap();
    }
}
