use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::{
    ChatMessage, PendingRevision, ResearchMode, Roadmap, RoadmapSection, Snapshot,
};

#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub message: String,
}

/// Everything the front-end needs to redraw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    pub idea: String,
    pub research_mode: ResearchMode,
    pub mock_mode: bool,
    pub api_key_configured: bool,
    pub loading: bool,
    pub current_step: Option<String>,
    pub roadmap: Option<Roadmap>,
    pub chat_messages: Vec<ChatMessage>,
    pub chat_loading: bool,
    pub pending_revision: Option<PendingRevision>,
    pub history_count: usize,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadmapView {
    pub idea: String,
    pub loading: bool,
    pub current_step: Option<String>,
    pub current_section: Option<RoadmapSection>,
    pub completed_sections: Vec<RoadmapSection>,
    pub total_sections: usize,
    pub roadmap: Option<Roadmap>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationStarted {
    pub idea: String,
    pub sections: Vec<RoadmapSection>,
    pub mock_mode: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotSummary {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub idea: String,
    pub sections: usize,
}

impl From<&Snapshot> for SnapshotSummary {
    fn from(snapshot: &Snapshot) -> Self {
        SnapshotSummary {
            id: snapshot.id,
            timestamp: snapshot.timestamp,
            idea: snapshot.idea.clone(),
            sections: snapshot.data.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub target: RoadmapSection,
    pub revision: PendingRevision,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsView {
    pub research_mode: ResearchMode,
    pub mock_mode: bool,
    pub api_key_configured: bool,
}
