use crate::api::{ApiError, IllustrationResponse};
use crate::chat::{ChatSession, MessageClock};
use crate::layout::LayoutState;
use crate::models::{BackendRequest, PanelId, Sender};
use crossbeam_channel::Sender as ChannelSender;
use tracing::{error, info, warn};

/// What the video panel shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoPanel {
    pub video_url: Option<String>,
    pub storage_key: Option<String>,
    pub question: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Flight {
    request_id: u64,
    question_id: i64,
}

/// Lives for the whole app run so a render started in an earlier visit to
/// the workspace still holds the single slot.
#[derive(Debug)]
pub struct IllustrationFlow {
    pub video: VideoPanel,
    bound_question: Option<i64>,
    in_flight: Option<Flight>,
    clock: MessageClock,
    backend_tx: Option<ChannelSender<BackendRequest>>,
}

/// One transcript line per field present in the response.
pub fn summary_lines(response: &IllustrationResponse) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(url) = &response.video_url {
        lines.push(format!("Video: {}", url));
    }
    if let Some(warning) = &response.warning {
        lines.push(format!("Warning: {}", warning));
    }
    if let Some(render_error) = &response.render_error {
        lines.push(format!("Render error: {}", render_error));
    }
    if let Some(code) = &response.code {
        lines.push(format!("Code:\n```python\n{}\n```", code.trim_end()));
    }
    lines
}

impl IllustrationFlow {
    pub fn new(backend_tx: Option<ChannelSender<BackendRequest>>) -> Self {
        Self {
            video: VideoPanel::default(),
            bound_question: None,
            in_flight: None,
            clock: MessageClock::default(),
            backend_tx,
        }
    }

    /// Point the panel at a newly opened question. The video is cleared; a
    /// running render keeps its slot.
    pub fn bind(&mut self, question_id: i64) {
        self.video = VideoPanel::default();
        self.bound_question = Some(question_id);
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether the running render belongs to the bound question.
    pub fn is_rendering_bound(&self) -> bool {
        self.in_flight
            .is_some_and(|flight| Some(flight.question_id) == self.bound_question)
    }

    /// Request a rendered illustration for the bound question. No-op without
    /// one or while any generation is already running.
    pub fn generate(&mut self, chat: &mut ChatSession) -> bool {
        let Some(question_id) = self.bound_question else {
            return false;
        };
        if self.in_flight.is_some() {
            return false;
        }

        let request_id = self.clock.next_id();
        self.in_flight = Some(Flight {
            request_id,
            question_id,
        });
        chat.clear_error();
        info!(target: "illustration", request_id, question_id, "Requesting illustration");

        let dispatched = self.backend_tx.as_ref().is_some_and(|tx| {
            tx.send(BackendRequest::Illustration {
                request_id,
                question_id,
                render: true,
            })
            .is_ok()
        });
        if !dispatched {
            self.apply_result(request_id, Err(ApiError::WorkerGone), chat, None);
        }
        true
    }

    /// Reduce a finished generation. On a video URL the video panel is
    /// updated and, when a layout is given, brought into focus.
    pub fn apply_result(
        &mut self,
        request_id: u64,
        result: Result<IllustrationResponse, ApiError>,
        chat: &mut ChatSession,
        layout: Option<&mut LayoutState>,
    ) {
        let Some(flight) = self.in_flight.filter(|f| f.request_id == request_id) else {
            warn!(target: "illustration", request_id, "Ignoring illustration that is not in flight");
            return;
        };
        self.in_flight = None;
        if Some(flight.question_id) != self.bound_question {
            info!(
                target: "illustration",
                request_id,
                question_id = flight.question_id,
                "Dropping illustration for a question that is no longer open"
            );
            return;
        }

        match result {
            Ok(response) => {
                let lines = summary_lines(&response);
                if let Some(url) = response.video_url {
                    self.video = VideoPanel {
                        video_url: Some(url),
                        storage_key: response.storage_key,
                        question: response.question,
                    };
                    if let Some(layout) = layout {
                        layout.focus(PanelId::Video);
                    }
                }
                if !lines.is_empty() {
                    chat.push_message(Sender::Bot, lines.join("\n"));
                }
            }
            Err(e) => {
                error!(target: "illustration", request_id, error = %e, "Illustration failed");
                chat.set_error(e.to_string());
            }
        }
    }
}
