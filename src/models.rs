use crate::api::{
    ApiError, ChatTurnRequest, ChatTurnResponse, CompileRunResponse, IllustrationResponse,
    SearchResponse,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One practice problem as returned by the question database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    /// Topic name, used as the first grouping level.
    #[serde(default)]
    pub title: String,
    /// Raw difficulty label. Only values accepted by [`Difficulty::parse`] are grouped.
    #[serde(default)]
    pub difficulty: String,
    /// Slug / short body of the problem.
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub markdown: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

// The hosted database returns either RFC 3339 or naive timestamps.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Bucket order used everywhere difficulties are listed.
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

/// The three fixed workspace panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelId {
    Chat,
    Compiler,
    Video,
}

impl PanelId {
    /// Cyclic focus order: chat -> compiler -> video -> chat.
    pub const ALL: [PanelId; 3] = [PanelId::Chat, PanelId::Compiler, PanelId::Video];

    pub fn next(self) -> Self {
        match self {
            PanelId::Chat => PanelId::Compiler,
            PanelId::Compiler => PanelId::Video,
            PanelId::Video => PanelId::Chat,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            PanelId::Chat => "Chat",
            PanelId::Compiler => "Code Runner",
            PanelId::Video => "Illustration",
        }
    }

    /// The two panels other than `self`, in cyclic order.
    pub fn others(self) -> [PanelId; 2] {
        [self.next(), self.next().next()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    /// Role name used on the wire.
    pub fn role(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: u64,
    pub text: String,
    pub sender: Sender,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Which flow a tool-chat response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatPurpose {
    Conversation,
    CodeRun,
}

#[derive(Debug)]
pub enum BackendRequest {
    FetchQuestions,
    Chat {
        request_id: u64,
        purpose: ChatPurpose,
        payload: ChatTurnRequest,
    },
    Illustration {
        request_id: u64,
        question_id: i64,
        render: bool,
    },
    CompileRun {
        run_id: u64,
        code: String,
    },
    Search {
        request_id: u64,
        query: String,
    },
}

#[derive(Debug)]
pub enum BackendResponse {
    Questions(Result<Vec<Question>, ApiError>),
    Chat {
        request_id: u64,
        purpose: ChatPurpose,
        result: Result<ChatTurnResponse, ApiError>,
    },
    Illustration {
        request_id: u64,
        result: Result<IllustrationResponse, ApiError>,
    },
    CompileRun {
        run_id: u64,
        result: Result<CompileRunResponse, ApiError>,
    },
    Search {
        request_id: u64,
        result: Result<SearchResponse, ApiError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    QuestionList,
    Workspace,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_parse_is_case_insensitive() {
        assert_eq!(Difficulty::parse("EASY"), Some(Difficulty::Easy));
        assert_eq!(Difficulty::parse(" Medium "), Some(Difficulty::Medium));
        assert_eq!(Difficulty::parse("hArD"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::parse("expert"), None);
        assert_eq!(Difficulty::parse(""), None);
    }

    #[test]
    fn test_panel_cycle_has_order_three() {
        for panel in PanelId::ALL {
            assert_eq!(panel.next().next().next(), panel);
            assert_ne!(panel.next(), panel);
        }
    }

    #[test]
    fn test_panel_others_excludes_self() {
        for panel in PanelId::ALL {
            let others = panel.others();
            assert!(!others.contains(&panel));
            assert_ne!(others[0], others[1]);
        }
    }

    #[test]
    fn test_question_deserializes_supabase_row() {
        let json = r#"{
            "id": 7,
            "title": "Arrays",
            "difficulty": "Easy",
            "question": "two-sum",
            "markdown": "Find two numbers...",
            "created_at": "2024-08-01T12:30:00.123456+00:00"
        }"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.id, 7);
        assert_eq!(q.title, "Arrays");
        assert!(q.created_at.is_some());
    }

    #[test]
    fn test_question_tolerates_naive_and_missing_fields() {
        let json = r#"{"id": 1, "created_at": "2024-08-01T12:30:00"}"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert!(q.markdown.is_empty());
        assert!(q.created_at.is_some());

        let json = r#"{"id": 2, "created_at": "not a date"}"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert!(q.created_at.is_none());
    }

    #[test]
    fn test_theme_roundtrip() {
        assert_eq!(Theme::parse(Theme::Light.as_str()), Some(Theme::Light));
        assert_eq!(Theme::parse(Theme::Dark.as_str()), Some(Theme::Dark));
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::parse("solarized"), None);
    }
}
