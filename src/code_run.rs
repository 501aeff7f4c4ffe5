use crate::api::{ApiError, ChatTurnRequest, ChatTurnResponse, CompileRunResponse, WireMessage};
use crate::chat::MessageClock;
use crate::input::TextInput;
use crate::models::{BackendRequest, ChatPurpose};
use crossbeam_channel::Sender as ChannelSender;
use serde_json::Value;
use tracing::{error, info, warn};

pub const CPP_TEMPLATE: &str = r#"#include <iostream>
using namespace std;

int main() {
    cout << "Hello, DSA!" << endl;
    return 0;
}
"#;

const TOOL_RUN_INSTRUCTION: &str = "Execute the user's C++ program exactly as given using the \
code execution tool. Do not modify it. Report the program's stdout and stderr.";

const COMPILER_NAMES: [&str; 4] = ["compiler", "g++", "clang", "gcc"];
const MISSING_MARKERS: [&str; 5] = [
    "not found",
    "unavailable",
    "not installed",
    "no such file",
    "not recognized",
];

fn reports_missing_compiler(text: &str) -> bool {
    let text = text.to_lowercase();
    COMPILER_NAMES.iter().any(|name| text.contains(name))
        && MISSING_MARKERS.iter().any(|marker| text.contains(marker))
}

/// Single decision point for the fallback chain: does the compile service
/// report that no compiler is available?
///
/// The service has no structured code for "compiler absent", so this matches
/// text in three places: its `error` field, the `stderr` of a run that printed
/// nothing, and the body of a non-2xx answer.
pub fn needs_tool_fallback(result: &Result<CompileRunResponse, ApiError>) -> bool {
    match result {
        Ok(response) => {
            let printed_nothing = response.stdout.as_deref().is_none_or(|s| s.trim().is_empty());
            response.error.as_deref().is_some_and(reports_missing_compiler)
                || (printed_nothing
                    && response.stderr.as_deref().is_some_and(reports_missing_compiler))
        }
        Err(ApiError::Status { detail, .. }) => reports_missing_compiler(detail),
        Err(_) => false,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOutput {
    pub stdout: Option<String>,
    pub stderr: Option<String>,
}

/// Find the first object carrying `stdout`/`stderr` anywhere in a tool result.
/// String values holding JSON documents are parsed and searched too.
pub fn extract_run_output(value: &Value) -> Option<RunOutput> {
    match value {
        Value::Object(map) => {
            let stdout = map.get("stdout").and_then(Value::as_str);
            let stderr = map.get("stderr").and_then(Value::as_str);
            if stdout.is_some() || stderr.is_some() {
                return Some(RunOutput {
                    stdout: stdout.map(str::to_string),
                    stderr: stderr.map(str::to_string),
                });
            }
            map.values().find_map(extract_run_output)
        }
        Value::Array(items) => items.iter().find_map(extract_run_output),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.starts_with('{') || trimmed.starts_with('[') {
                serde_json::from_str::<Value>(trimmed)
                    .ok()
                    .and_then(|nested| extract_run_output(&nested))
            } else {
                None
            }
        }
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    CompileService { run_id: u64 },
    ToolChat { request_id: u64 },
}

#[derive(Debug)]
pub struct CodeRunPanel {
    pub editor: TextInput,
    pub output: RunOutput,
    pub error: Option<String>,
    pub used_fallback: bool,
    pub scroll_y: u16,
    user_id: String,
    toolkits: Vec<String>,
    model: Option<String>,
    in_flight: Option<RunStage>,
    clock: MessageClock,
    backend_tx: Option<ChannelSender<BackendRequest>>,
}

impl CodeRunPanel {
    pub fn new(
        user_id: String,
        toolkits: Vec<String>,
        model: Option<String>,
        backend_tx: Option<ChannelSender<BackendRequest>>,
    ) -> Self {
        Self {
            editor: TextInput::with_text(CPP_TEMPLATE),
            output: RunOutput::default(),
            error: None,
            used_fallback: false,
            scroll_y: 0,
            user_id,
            toolkits,
            model,
            in_flight: None,
            clock: MessageClock::default(),
            backend_tx,
        }
    }

    pub fn stage(&self) -> Option<RunStage> {
        self.in_flight
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    fn dispatch(&mut self, request: BackendRequest) -> bool {
        self.backend_tx
            .as_ref()
            .is_some_and(|tx| tx.send(request).is_ok())
    }

    /// Run the editor contents through the fast path.
    pub fn run(&mut self) -> bool {
        if self.in_flight.is_some() || self.editor.is_blank() {
            return false;
        }
        self.output = RunOutput::default();
        self.error = None;
        self.used_fallback = false;
        self.scroll_y = 0;
        let run_id = self.clock.next_id();
        self.in_flight = Some(RunStage::CompileService { run_id });
        info!(target: "code_run", run_id, len = self.editor.text().len(), "Running code");

        let code = self.editor.text().to_string();
        if !self.dispatch(BackendRequest::CompileRun { run_id, code }) {
            self.apply_compile_result(run_id, Err(ApiError::WorkerGone));
        }
        true
    }

    pub fn tool_request(&self) -> ChatTurnRequest {
        ChatTurnRequest {
            user_id: self.user_id.clone(),
            messages: vec![
                WireMessage::system(TOOL_RUN_INSTRUCTION),
                WireMessage::user(format!("```cpp\n{}\n```", self.editor.text())),
            ],
            toolkits: self.toolkits.clone(),
            model: self.model.clone(),
        }
    }

    pub fn apply_compile_result(
        &mut self,
        run_id: u64,
        result: Result<CompileRunResponse, ApiError>,
    ) {
        if self.in_flight != Some(RunStage::CompileService { run_id }) {
            warn!(target: "code_run", run_id, "Ignoring compile result that is not in flight");
            return;
        }
        self.in_flight = None;

        if needs_tool_fallback(&result) {
            info!(target: "code_run", run_id, "Compiler unavailable, falling back to tool chat");
            self.start_tool_fallback();
            return;
        }
        match result {
            Ok(response) => {
                self.output = RunOutput {
                    stdout: response.stdout,
                    stderr: response.stderr,
                };
                if let Some(e) = response.error {
                    self.error = Some(e);
                }
            }
            Err(e) => {
                error!(target: "code_run", error = %e, "Compile service failed");
                self.error = Some(e.to_string());
            }
        }
    }

    fn start_tool_fallback(&mut self) {
        let request_id = self.clock.next_id();
        self.used_fallback = true;
        self.in_flight = Some(RunStage::ToolChat { request_id });

        let payload = self.tool_request();
        if !self.dispatch(BackendRequest::Chat {
            request_id,
            purpose: ChatPurpose::CodeRun,
            payload,
        }) {
            self.apply_tool_result(request_id, Err(ApiError::WorkerGone));
        }
    }

    pub fn apply_tool_result(&mut self, request_id: u64, result: Result<ChatTurnResponse, ApiError>) {
        if self.in_flight != Some(RunStage::ToolChat { request_id }) {
            warn!(target: "code_run", request_id, "Ignoring tool result that is not in flight");
            return;
        }
        self.in_flight = None;

        match result.and_then(ChatTurnResponse::into_result) {
            Ok(response) => {
                self.output = response
                    .result
                    .as_ref()
                    .and_then(extract_run_output)
                    .unwrap_or_else(|| RunOutput {
                        stdout: response.assistant_text.clone(),
                        stderr: None,
                    });
            }
            Err(e) => {
                error!(target: "code_run", request_id, error = %e, "Tool execution failed");
                self.error = Some(e.to_string());
            }
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll_y = self.scroll_y.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.scroll_y = self.scroll_y.saturating_add(1);
    }
}
