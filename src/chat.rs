use crate::api::{ApiError, ChatTurnRequest, ChatTurnResponse, WireMessage};
use crate::input::TextInput;
use crate::models::{BackendRequest, ChatMessage, ChatPurpose, Sender};
use crossbeam_channel::Sender as ChannelSender;
use ratatui::text::Line;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, error, info, warn};

pub const GREETING: &str =
    "Hi! Ask me anything about this problem. Press Ctrl+G for an animated illustration.";

pub const CODE_FORMAT_INSTRUCTION: &str = "Always put code in fenced Markdown blocks with a \
language tag (for example ```cpp). Keep prose short and give time/space complexity after the code.";

fn question_context(question_id: i64) -> String {
    format!(
        "The user is working on the question with id {}. Use the question lookup tool with \
         this id whenever you need the full problem statement or reference solution.",
        question_id
    )
}

/// Time-derived ids that never repeat or go backwards within a session.
#[derive(Debug, Default, Clone)]
pub struct MessageClock {
    last: u64,
}

impl MessageClock {
    pub fn next_id(&mut self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        self.last = now.max(self.last + 1);
        self.last
    }
}

#[derive(Debug)]
pub struct ChatSession {
    pub messages: Vec<ChatMessage>,
    pub input: TextInput,
    pub error: Option<String>,
    pub question_id: Option<i64>,
    pub scroll_y: u16,
    pub max_scroll: u16,
    pub rendered_lines_cache: Vec<Line<'static>>,
    pub cached_message_count: usize,
    user_id: String,
    toolkits: Vec<String>,
    model: Option<String>,
    in_flight: Option<u64>,
    clock: MessageClock,
    backend_tx: Option<ChannelSender<BackendRequest>>,
}

impl ChatSession {
    pub fn new(
        user_id: String,
        question_id: Option<i64>,
        toolkits: Vec<String>,
        model: Option<String>,
        backend_tx: Option<ChannelSender<BackendRequest>>,
    ) -> Self {
        let mut session = Self {
            messages: Vec::new(),
            input: TextInput::default(),
            error: None,
            question_id,
            scroll_y: 0,
            max_scroll: 0,
            rendered_lines_cache: Vec::new(),
            cached_message_count: 0,
            user_id,
            toolkits,
            model,
            in_flight: None,
            clock: MessageClock::default(),
            backend_tx,
        };
        session.push_message(Sender::Bot, GREETING.to_string());
        session
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn push_message(&mut self, sender: Sender, text: String) {
        let id = self.clock.next_id();
        self.messages.push(ChatMessage { id, text, sender });
    }

    pub fn set_error(&mut self, message: String) {
        self.error = Some(message);
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Outbound payload for the current transcript.
    pub fn build_request(&self) -> ChatTurnRequest {
        let mut messages = vec![WireMessage::system(CODE_FORMAT_INSTRUCTION)];
        if let Some(id) = self.question_id {
            messages.push(WireMessage::system(question_context(id)));
        }
        messages.extend(
            self.messages
                .iter()
                .map(|m| WireMessage::new(m.sender.role(), m.text.clone())),
        );

        ChatTurnRequest {
            user_id: self.user_id.clone(),
            messages,
            toolkits: self.toolkits.clone(),
            model: self.model.clone(),
        }
    }

    /// Send the input buffer. Rejected (input untouched) when it is blank or a
    /// request is already in flight.
    pub fn send(&mut self) -> bool {
        if self.in_flight.is_some() || self.input.is_blank() {
            return false;
        }

        let text = self.input.text().trim().to_string();
        self.push_message(Sender::User, text);
        self.input.clear();
        self.error = None;

        let request_id = self.clock.next_id();
        let payload = self.build_request();
        self.in_flight = Some(request_id);
        info!(target: "chat", request_id, messages = payload.messages.len(), "Sending chat turn");

        let dispatched = self.backend_tx.as_ref().is_some_and(|tx| {
            tx.send(BackendRequest::Chat {
                request_id,
                purpose: ChatPurpose::Conversation,
                payload,
            })
            .is_ok()
        });
        if !dispatched {
            self.apply_reply(request_id, Err(ApiError::WorkerGone));
        }
        true
    }

    /// Reduce the outcome of request `request_id` into the transcript.
    pub fn apply_reply(&mut self, request_id: u64, result: Result<ChatTurnResponse, ApiError>) {
        if self.in_flight != Some(request_id) {
            warn!(target: "chat", request_id, "Ignoring reply for a request that is not in flight");
            return;
        }
        self.in_flight = None;

        match result.and_then(ChatTurnResponse::into_result) {
            Ok(reply) => {
                let text = reply.assistant_text.unwrap_or_default();
                debug!(target: "chat", request_id, len = text.len(), "Chat reply received");
                self.push_message(Sender::Bot, text);
            }
            Err(e) => {
                error!(target: "chat", request_id, error = %e, "Chat request failed");
                self.error = Some(e.to_string());
            }
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll_y = self.scroll_y.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        if self.scroll_y < self.max_scroll {
            self.scroll_y += 1;
        }
    }
}
