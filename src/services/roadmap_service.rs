use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use chrono::{Local, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::Config,
    constants::prompts::{revision_prompt, section_prompt},
    errors::{AppError, AppResult},
    models::{
        domain::{
            ChatMessage, PendingRevision, ResearchMode, Roadmap, RoadmapSection, Snapshot,
        },
        dto::{
            request::{ChatRequest, GenerateRoadmapRequest, UpdateSettingsRequest},
            response::{
                ChatReply, GenerationStarted, RoadmapView, SessionView, SettingsView,
                SnapshotSummary,
            },
        },
    },
    repositories::HistoryRepository,
    services::{
        export::{export_filename, render_text_export, RoadmapExport},
        model_service::{ModelService, SectionRequest},
    },
};

#[derive(Debug, Clone, Default)]
struct Session {
    idea: String,
    research_mode: ResearchMode,
    mock_mode: bool,
    loading: bool,
    current_section: Option<RoadmapSection>,
    current_step: Option<String>,
    roadmap: Option<Roadmap>,
    chat_messages: Vec<ChatMessage>,
    pending_revision: Option<PendingRevision>,
    last_error: Option<String>,
}

/// Drives roadmap generation and the revision chat for the single
/// in-process session.
pub struct RoadmapService {
    model_service: Arc<ModelService>,
    history: Arc<dyn HistoryRepository>,
    session: RwLock<Session>,
    chat_in_flight: AtomicBool,
    section_delay: Duration,
}

/// Holds the chat slot; releases it on drop so a cancelled request never
/// leaves chat locked.
struct ChatSlot<'a>(&'a AtomicBool);

impl<'a> ChatSlot<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ChatSlot(flag))
    }
}

impl Drop for ChatSlot<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn step_label(index: usize, section: RoadmapSection) -> String {
    format!(
        "{} ({}/{})",
        section.label(),
        index + 1,
        RoadmapSection::ALL.len()
    )
}

impl RoadmapService {
    pub fn new(
        model_service: Arc<ModelService>,
        history: Arc<dyn HistoryRepository>,
        config: &Config,
    ) -> Self {
        let session = Session {
            research_mode: config.research_mode,
            mock_mode: !model_service.has_credentials(),
            ..Session::default()
        };

        Self {
            model_service,
            history,
            session: RwLock::new(session),
            chat_in_flight: AtomicBool::new(false),
            section_delay: config.section_delay(),
        }
    }

    pub async fn session_view(&self) -> AppResult<SessionView> {
        let history_count = self.history.count().await?;
        let s = self.session.read().await;
        Ok(SessionView {
            idea: s.idea.clone(),
            research_mode: s.research_mode,
            mock_mode: s.mock_mode,
            api_key_configured: self.model_service.has_credentials(),
            loading: s.loading,
            current_step: s.current_step.clone(),
            roadmap: s.roadmap.clone(),
            chat_messages: s.chat_messages.clone(),
            chat_loading: self.chat_in_flight.load(Ordering::Acquire),
            pending_revision: s.pending_revision.clone(),
            history_count,
            last_error: s.last_error.clone(),
        })
    }

    pub async fn roadmap_view(&self) -> RoadmapView {
        let s = self.session.read().await;
        RoadmapView {
            idea: s.idea.clone(),
            loading: s.loading,
            current_step: s.current_step.clone(),
            current_section: s.current_section,
            completed_sections: s
                .roadmap
                .as_ref()
                .map(|r| r.iter().map(|(section, _)| section).collect::<Vec<_>>())
                .unwrap_or_default(),
            total_sections: RoadmapSection::ALL.len(),
            roadmap: s.roadmap.clone(),
        }
    }

    /// Validates the idea and resets the session for a new run. The caller
    /// then drives [`RoadmapService::run_generation`].
    pub async fn start_generation(
        &self,
        request: GenerateRoadmapRequest,
    ) -> AppResult<GenerationStarted> {
        request.validate()?;

        let mut s = self.session.write().await;
        if s.loading {
            return Err(AppError::Conflict(
                "A roadmap is already being generated".to_string(),
            ));
        }

        s.idea = request.idea.trim().to_string();
        s.loading = true;
        s.roadmap = None;
        s.chat_messages.clear();
        s.pending_revision = None;
        s.current_section = None;
        s.current_step = None;
        s.last_error = None;

        log::info!(
            "Starting roadmap generation (mode={}, mock={})",
            s.research_mode,
            s.mock_mode
        );

        Ok(GenerationStarted {
            idea: s.idea.clone(),
            sections: RoadmapSection::ALL.to_vec(),
            mock_mode: s.mock_mode,
        })
    }

    /// Generates every section in order, publishing the partial roadmap after
    /// each one, then snapshots the result. Always clears the loading state.
    pub async fn run_generation(&self) -> AppResult<Roadmap> {
        let result = self.generate_sections().await;

        let mut s = self.session.write().await;
        s.loading = false;
        s.current_section = None;
        s.current_step = None;
        match &result {
            Ok(_) => log::info!("Roadmap generated successfully for '{}'", s.idea),
            Err(err) => {
                log::error!("Generation error: {}", err);
                s.last_error = Some(err.to_string());
            }
        }
        result
    }

    /// Convenience for callers that want to wait for the whole roadmap.
    pub async fn generate(&self, request: GenerateRoadmapRequest) -> AppResult<Roadmap> {
        self.start_generation(request).await?;
        self.run_generation().await
    }

    async fn generate_sections(&self) -> AppResult<Roadmap> {
        let (idea, research_mode, mock_mode) = {
            let s = self.session.read().await;
            if !s.loading {
                return Err(AppError::Conflict(
                    "Generation was not started".to_string(),
                ));
            }
            (s.idea.clone(), s.research_mode, s.mock_mode)
        };

        let mut generated = Roadmap::new();
        for (index, section) in RoadmapSection::ALL.into_iter().enumerate() {
            let label = step_label(index, section);
            log::info!("Generating {}", label);
            {
                let mut s = self.session.write().await;
                s.current_section = Some(section);
                s.current_step = Some(label);
            }

            if index > 0 && !self.section_delay.is_zero() {
                tokio::time::sleep(self.section_delay).await;
            }

            let request = SectionRequest {
                section,
                prompt: section_prompt(section, &idea),
                idea: idea.clone(),
                use_web_search: section.uses_web_search(),
                research_mode,
                mock_mode,
            };
            let content = self.model_service.generate_section(&request).await;
            generated.insert(section, content);

            self.session.write().await.roadmap = Some(generated.clone());
        }

        self.history.push(Snapshot::new(&idea, &generated)).await?;
        Ok(generated)
    }

    /// Asks the model for an improved version of the section the message
    /// names, leaving it pending until applied or rejected.
    pub async fn chat(&self, request: ChatRequest) -> AppResult<ChatReply> {
        request.validate()?;
        let message = request.message;

        let (section_request, original, _slot) = {
            let mut s = self.session.write().await;
            let roadmap = s.roadmap.as_ref().ok_or_else(|| {
                AppError::ValidationError(
                    "Generate a roadmap before requesting revisions".to_string(),
                )
            })?;
            let slot = ChatSlot::acquire(&self.chat_in_flight).ok_or_else(|| {
                AppError::Conflict("A revision is already in progress".to_string())
            })?;

            let section = RoadmapSection::target_for_message(&message);
            let original = roadmap.get(section).cloned();
            let current_html = original.as_ref().map_or("", |c| c.html.as_str());

            let section_request = SectionRequest {
                section,
                prompt: revision_prompt(&s.idea, current_html, &message),
                idea: s.idea.clone(),
                use_web_search: false,
                research_mode: s.research_mode,
                mock_mode: s.mock_mode,
            };

            s.chat_messages.push(ChatMessage::user(message.as_str()));
            s.pending_revision = None;
            (section_request, original, slot)
        };

        log::info!("Revising {} section", section_request.section);
        let content = self.model_service.generate_section(&section_request).await;
        let section = section_request.section;

        let mut s = self.session.write().await;
        let revision = PendingRevision {
            section,
            content,
            original,
        };
        s.pending_revision = Some(revision.clone());
        s.chat_messages.push(ChatMessage::assistant(format!(
            "Created improved {} section. Review and apply or keep original.",
            section
        )));

        Ok(ChatReply {
            target: section,
            revision,
            messages: s.chat_messages.clone(),
        })
    }

    /// Replaces the section with the pending revision, snapshotting the
    /// previous roadmap first.
    pub async fn apply_revision(&self) -> AppResult<RoadmapView> {
        {
            let mut s = self.session.write().await;
            if s.pending_revision.is_none() {
                return Err(AppError::NotFound("No pending revision".to_string()));
            }

            let mut roadmap = s.roadmap.clone().unwrap_or_default();
            if !roadmap.is_empty() {
                self.history.push(Snapshot::new(&s.idea, &roadmap)).await?;
            }
            let Some(revision) = s.pending_revision.take() else {
                return Err(AppError::NotFound("No pending revision".to_string()));
            };
            roadmap.insert(revision.section, revision.content);
            s.roadmap = Some(roadmap);
            s.chat_messages.push(ChatMessage::assistant(format!(
                "Applied changes to {}. Previous saved to history.",
                revision.section
            )));
            log::info!("Applied revision to {} section", revision.section);
        }
        Ok(self.roadmap_view().await)
    }

    pub async fn reject_revision(&self) -> AppResult<Vec<ChatMessage>> {
        let mut s = self.session.write().await;
        if s.pending_revision.take().is_none() {
            return Err(AppError::NotFound("No pending revision".to_string()));
        }
        s.chat_messages.push(ChatMessage::assistant(
            "Kept original. Ask for different changes if needed.",
        ));
        Ok(s.chat_messages.clone())
    }

    pub async fn history(&self) -> AppResult<Vec<SnapshotSummary>> {
        let snapshots = self.history.list().await?;
        Ok(snapshots.iter().map(SnapshotSummary::from).collect())
    }

    pub async fn restore(&self, id: &Uuid) -> AppResult<RoadmapView> {
        let snapshot = self
            .history
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Snapshot with id '{}' not found", id)))?;

        {
            let mut s = self.session.write().await;
            if s.loading {
                return Err(AppError::Conflict(
                    "Cannot restore while a roadmap is being generated".to_string(),
                ));
            }
            s.roadmap = Some(snapshot.data);
        }
        log::info!("Restored snapshot {}", id);
        Ok(self.roadmap_view().await)
    }

    pub async fn update_settings(&self, request: UpdateSettingsRequest) -> AppResult<SettingsView> {
        let mut s = self.session.write().await;
        if s.loading {
            return Err(AppError::Conflict(
                "Settings cannot change while a roadmap is being generated".to_string(),
            ));
        }

        let mock_mode = request.mock_mode.unwrap_or(s.mock_mode);
        if let Some(mode) = request.research_mode {
            if mock_mode && mode != s.research_mode {
                return Err(AppError::ValidationError(
                    "Research mode cannot be changed in Demo Mode".to_string(),
                ));
            }
            s.research_mode = mode;
        }
        if mock_mode != s.mock_mode {
            log::info!("Demo Mode {}", if mock_mode { "enabled" } else { "disabled" });
        }
        s.mock_mode = mock_mode;

        Ok(SettingsView {
            research_mode: s.research_mode,
            mock_mode: s.mock_mode,
            api_key_configured: self.model_service.has_credentials(),
        })
    }

    pub async fn settings(&self) -> SettingsView {
        let s = self.session.read().await;
        SettingsView {
            research_mode: s.research_mode,
            mock_mode: s.mock_mode,
            api_key_configured: self.model_service.has_credentials(),
        }
    }

    pub async fn export_text(&self) -> AppResult<RoadmapExport> {
        let s = self.session.read().await;
        let roadmap = s
            .roadmap
            .as_ref()
            .ok_or_else(|| AppError::NotFound("No roadmap to download".to_string()))?;

        Ok(RoadmapExport {
            filename: export_filename(Utc::now().timestamp_millis()),
            content: render_text_export(
                &s.idea,
                s.research_mode,
                Local::now().date_naive(),
                roadmap,
            ),
        })
    }
}
