use crate::api::{ApiError, SearchResponse};
use crate::chat::MessageClock;
use crate::input::TextInput;
use crate::models::{BackendRequest, Question};
use crossbeam_channel::Sender as ChannelSender;
use tracing::{error, info, warn};

/// The similarity search rejects shorter queries.
pub const MIN_QUERY_CHARS: usize = 2;

/// Search box on the list page. A reply moves the selection to the most
/// probable question; the runners-up are kept for display.
#[derive(Debug, Default)]
pub struct QuestionSearch {
    pub input: TextInput,
    pub active: bool,
    pub error: Option<String>,
    pub alternatives: Vec<Question>,
    in_flight: Option<u64>,
    clock: MessageClock,
}

impl QuestionSearch {
    pub fn open(&mut self) {
        self.active = true;
        self.error = None;
    }

    /// Leave search mode. A reply still on the way is ignored.
    pub fn close(&mut self) {
        self.active = false;
        self.in_flight = None;
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn submit(&mut self, backend_tx: Option<&ChannelSender<BackendRequest>>) -> bool {
        let query = self.input.text().trim().to_string();
        if self.in_flight.is_some() || query.chars().count() < MIN_QUERY_CHARS {
            return false;
        }

        let request_id = self.clock.next_id();
        self.in_flight = Some(request_id);
        self.error = None;
        self.alternatives.clear();
        info!(target: "search", request_id, %query, "Searching questions");

        let dispatched = backend_tx
            .is_some_and(|tx| tx.send(BackendRequest::Search { request_id, query }).is_ok());
        if !dispatched {
            self.apply_result(request_id, Err(ApiError::WorkerGone));
        }
        true
    }

    /// Reduce a search reply. Returns the best match to jump to.
    pub fn apply_result(
        &mut self,
        request_id: u64,
        result: Result<SearchResponse, ApiError>,
    ) -> Option<Question> {
        if self.in_flight != Some(request_id) {
            warn!(target: "search", request_id, "Ignoring search result that is not in flight");
            return None;
        }
        self.in_flight = None;

        match result {
            Ok(response) => {
                self.alternatives = response.other_probable_questions;
                if response.most_probable_question.is_none() {
                    self.error = Some(format!("No question matches \"{}\"", response.query));
                }
                response.most_probable_question
            }
            Err(e) => {
                error!(target: "search", request_id, error = %e, "Search failed");
                self.error = Some(e.to_string());
                None
            }
        }
    }
}
