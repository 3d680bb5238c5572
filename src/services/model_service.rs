use std::sync::Arc;

use crate::{
    config::{Config, RetryPolicy},
    constants::prompts::TOOL_RESULT_ACKNOWLEDGEMENT,
    errors::ModelError,
    models::{
        domain::{ResearchMode, RoadmapSection, SectionContent},
        dto::messages::{ContentBlock, Message, MessagesRequest, MessagesResponse, Tool},
    },
    services::{
        anthropic_client::{ApiReply, MessagesApi},
        formatter::process_content,
        mock_content::{error_banner, mock_section},
    },
};

/// Text accompanying a tool-use stop is used as-is once it is longer than this.
const TOOL_USE_TEXT_THRESHOLD: usize = 100;

const STATUS_TOO_MANY_REQUESTS: u16 = 429;
const STATUS_OVERLOADED: u16 = 529;

fn is_throttled(status: u16) -> bool {
    status == STATUS_TOO_MANY_REQUESTS || status == STATUS_OVERLOADED
}

/// One section to draft (or redraft).
#[derive(Debug, Clone)]
pub struct SectionRequest {
    pub section: RoadmapSection,
    pub prompt: String,
    pub idea: String,
    pub use_web_search: bool,
    pub research_mode: ResearchMode,
    pub mock_mode: bool,
}

enum LiveOutcome {
    Content(SectionContent),
    RateLimited,
}

enum Attempt {
    Done(SectionContent),
    Throttled { status: u16, follow_up: bool },
}

pub struct ModelService {
    api: Arc<dyn MessagesApi>,
    model: String,
    max_tokens: u32,
    retry: RetryPolicy,
    has_credentials: bool,
}

impl ModelService {
    pub fn new(api: Arc<dyn MessagesApi>, config: &Config) -> Self {
        Self {
            api,
            model: config.anthropic_model.clone(),
            max_tokens: config.max_tokens,
            retry: config.retry.clone(),
            has_credentials: config.has_api_key(),
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.has_credentials
    }

    /// Drafts one section. Never fails: demo mode, a missing key, or
    /// persistent rate limiting yield placeholder content, and any other
    /// failure is rendered as an error banner.
    pub async fn generate_section(&self, request: &SectionRequest) -> SectionContent {
        if request.mock_mode || !self.has_credentials {
            if !request.mock_mode {
                log::warn!("ANTHROPIC_API_KEY not set. Returning mock content to avoid rate limits.");
            }
            return mock_section(request.section, &request.idea);
        }

        match self.call_live(request).await {
            Ok(LiveOutcome::Content(content)) => content,
            Ok(LiveOutcome::RateLimited) => mock_section(request.section, &request.idea),
            Err(err) => {
                log::error!("API error for {} section: {}", request.section, err);
                error_banner(&err.to_string())
            }
        }
    }

    async fn call_live(&self, request: &SectionRequest) -> Result<LiveOutcome, ModelError> {
        let tools = (request.use_web_search && request.research_mode == ResearchMode::Deep)
            .then(|| vec![Tool::web_search()]);

        let mut attempt = 0;
        loop {
            match self.attempt(&request.prompt, &tools).await? {
                Attempt::Done(content) => return Ok(LiveOutcome::Content(content)),
                Attempt::Throttled { status, follow_up } => {
                    let stage = if follow_up { " on follow-up" } else { "" };
                    if self.retry.can_retry(attempt) {
                        let wait = self.retry.backoff(attempt);
                        log::info!(
                            "Rate limited ({}){}, waiting {}ms before retry {}/{}...",
                            status,
                            stage,
                            wait.as_millis(),
                            attempt + 1,
                            self.retry.max_retries
                        );
                        tokio::time::sleep(wait).await;
                        attempt += 1;
                        continue;
                    }

                    if status == STATUS_TOO_MANY_REQUESTS {
                        log::warn!(
                            "Rate limit hit{} after retries. Falling back to mock content.",
                            stage
                        );
                        return Ok(LiveOutcome::RateLimited);
                    }

                    return Err(if follow_up {
                        ModelError::FollowUpStatus(status)
                    } else {
                        ModelError::Status(status)
                    });
                }
            }
        }
    }

    fn build_request(&self, messages: Vec<Message>, tools: &Option<Vec<Tool>>) -> MessagesRequest {
        MessagesRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages,
            tools: tools.clone(),
        }
    }

    async fn attempt(
        &self,
        prompt: &str,
        tools: &Option<Vec<Tool>>,
    ) -> Result<Attempt, ModelError> {
        let request = self.build_request(vec![Message::user_text(prompt)], tools);

        let data = match self.api.create_message(&request).await? {
            ApiReply::Success(data) => data,
            ApiReply::Failure { status, .. } if is_throttled(status) => {
                return Ok(Attempt::Throttled {
                    status,
                    follow_up: false,
                })
            }
            ApiReply::Failure { status, .. } => return Err(ModelError::Status(status)),
        };

        if data.is_tool_use() {
            if let Some(attempt) = self.resolve_tool_use(prompt, tools, &data).await? {
                return Ok(attempt);
            }
        }

        let text = data.joined_text();
        if text.trim().is_empty() {
            return Err(ModelError::EmptyResponse);
        }
        Ok(Attempt::Done(process_content(&text)))
    }

    /// Handles a response that stopped for tool use. `None` means neither the
    /// accompanying text nor a follow-up produced anything usable.
    async fn resolve_tool_use(
        &self,
        prompt: &str,
        tools: &Option<Vec<Tool>>,
        data: &MessagesResponse,
    ) -> Result<Option<Attempt>, ModelError> {
        let combined = data.joined_text();
        if combined.trim().chars().count() > TOOL_USE_TEXT_THRESHOLD {
            return Ok(Some(Attempt::Done(process_content(&combined))));
        }

        let Some(tool_use_id) = data.first_tool_use_id() else {
            return Ok(None);
        };

        log::debug!("Model paused for tool use {}, sending follow-up", tool_use_id);
        let follow_up = self.build_request(
            vec![
                Message::user_text(prompt),
                Message::assistant_blocks(data.content.clone()),
                Message::user_blocks(vec![ContentBlock::tool_result(
                    tool_use_id,
                    TOOL_RESULT_ACKNOWLEDGEMENT,
                )]),
            ],
            tools,
        );

        match self.api.create_message(&follow_up).await? {
            ApiReply::Success(follow_up_data) => {
                let text = follow_up_data.joined_text();
                if text.trim().is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(Attempt::Done(process_content(&text))))
                }
            }
            ApiReply::Failure { status, .. } if is_throttled(status) => {
                Ok(Some(Attempt::Throttled {
                    status,
                    follow_up: true,
                }))
            }
            ApiReply::Failure { status, .. } => Err(ModelError::FollowUpStatus(status)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::VecDeque,
        sync::{Arc, Mutex},
        time::Duration,
    };

    use serde_json::json;

    use super::*;
    use crate::{
        models::dto::messages::{MessageContent, MessageRole},
        services::anthropic_client::MockMessagesApi,
    };

    type Script = Vec<Result<ApiReply, ModelError>>;

    fn scripted(replies: Script) -> (MockMessagesApi, Arc<Mutex<Vec<MessagesRequest>>>) {
        let queue = Arc::new(Mutex::new(VecDeque::from(replies)));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_by_mock = Arc::clone(&seen);

        let mut api = MockMessagesApi::new();
        api.expect_create_message().returning(move |request| {
            seen_by_mock.lock().unwrap().push(request.clone());
            queue
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected extra API call")
        });
        (api, seen)
    }

    fn service(api: MockMessagesApi) -> ModelService {
        let config = Config::test_config().with_api_key("sk-ant-test");
        ModelService::new(Arc::new(api), &config)
    }

    fn text_reply(text: &str) -> Result<ApiReply, ModelError> {
        Ok(ApiReply::Success(MessagesResponse {
            content: vec![ContentBlock::text(text)],
            stop_reason: Some("end_turn".to_string()),
        }))
    }

    fn tool_use_reply(text: &str, tool_use_id: &str) -> Result<ApiReply, ModelError> {
        Ok(ApiReply::Success(MessagesResponse {
            content: vec![
                ContentBlock::text(text),
                ContentBlock::tool_use(tool_use_id, "web_search"),
            ],
            stop_reason: Some("tool_use".to_string()),
        }))
    }

    fn status(code: u16) -> Result<ApiReply, ModelError> {
        Ok(ApiReply::failure(code))
    }

    fn request(section: RoadmapSection) -> SectionRequest {
        SectionRequest {
            section,
            prompt: "Analyze this".to_string(),
            idea: "Millet snacks".to_string(),
            use_web_search: section.uses_web_search(),
            research_mode: ResearchMode::Deep,
            mock_mode: false,
        }
    }

    #[tokio::test]
    async fn test_mock_mode_never_calls_api() {
        let mut api = MockMessagesApi::new();
        api.expect_create_message().never();
        let service = service(api);

        let mut req = request(RoadmapSection::Revenue);
        req.mock_mode = true;

        let content = service.generate_section(&req).await;
        assert!(content.html.contains("<h3>Revenue Model</h3>"));
    }

    #[tokio::test]
    async fn test_missing_key_falls_back_to_mock() {
        let mut api = MockMessagesApi::new();
        api.expect_create_message().never();
        let service = ModelService::new(Arc::new(api), &Config::test_config());

        assert!(!service.has_credentials());
        let content = service.generate_section(&request(RoadmapSection::Research)).await;
        assert!(content.html.contains("competition for Millet snacks"));
    }

    #[tokio::test]
    async fn test_success_is_formatted() {
        let (api, seen) = scripted(vec![text_reply("## Overview\n- Point one")]);
        let service = service(api);

        let content = service.generate_section(&request(RoadmapSection::Executive)).await;
        assert!(content.html.contains(">Overview</h3>"));
        assert!(content.html.contains("list-disc\">Point one</li>"));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].model, "claude-3-5-sonnet-20240620");
        assert_eq!(seen[0].max_tokens, 4000);
        assert!(seen[0].tools.is_none());
    }

    #[tokio::test]
    async fn test_deep_research_sends_web_search_tool() {
        let (api, seen) = scripted(vec![text_reply("Market is large")]);
        let service = service(api);

        service.generate_section(&request(RoadmapSection::Research)).await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0].tools, Some(vec![Tool::web_search()]));
    }

    #[tokio::test]
    async fn test_fast_mode_omits_tools() {
        let (api, seen) = scripted(vec![text_reply("Market is large")]);
        let service = service(api);

        let mut req = request(RoadmapSection::Research);
        req.research_mode = ResearchMode::Fast;
        service.generate_section(&req).await;

        assert!(seen.lock().unwrap()[0].tools.is_none());
    }

    #[tokio::test]
    async fn test_retries_throttling_then_succeeds() {
        let (api, seen) = scripted(vec![
            status(429),
            status(529),
            status(429),
            text_reply("Finally"),
        ]);
        let service = service(api);

        let content = service.generate_section(&request(RoadmapSection::Scaling)).await;
        assert!(content.html.contains("Finally"));
        assert_eq!(seen.lock().unwrap().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_waits_grow_and_are_capped() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let replies = Arc::new(Mutex::new(VecDeque::from(vec![
            status(429),
            status(529),
            status(429),
            text_reply("Recovered"),
        ])));
        let seen_at = Arc::clone(&calls);
        let mut api = MockMessagesApi::new();
        api.expect_create_message().times(4).returning(move |_| {
            seen_at.lock().unwrap().push(tokio::time::Instant::now());
            replies.lock().unwrap().pop_front().unwrap()
        });

        let mut config = Config::test_config().with_api_key("sk-ant-test");
        config.retry = RetryPolicy {
            max_retries: 3,
            base_delay_ms: 4000,
            max_delay_ms: 10000,
        };
        let service = ModelService::new(Arc::new(api), &config);

        let content = service.generate_section(&request(RoadmapSection::Revenue)).await;
        assert!(content.html.contains("Recovered"));

        let calls = calls.lock().unwrap();
        let gaps: Vec<_> = calls.windows(2).map(|w| w[1] - w[0]).collect();
        assert_eq!(
            gaps,
            vec![
                Duration::from_millis(4000),
                Duration::from_millis(8000),
                Duration::from_millis(10000),
            ]
        );
    }

    #[tokio::test]
    async fn test_persistent_429_falls_back_to_mock() {
        let (api, seen) = scripted(vec![status(429), status(429), status(429), status(429)]);
        let service = service(api);

        let content = service.generate_section(&request(RoadmapSection::Scaling)).await;
        assert!(content.html.contains("<h3>Scaling Strategy</h3>"));
        assert!(content.html.contains("Sample bullet showing structure"));
        assert_eq!(seen.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_persistent_529_shows_error_banner() {
        let (api, _) = scripted(vec![status(529), status(529), status(529), status(529)]);
        let service = service(api);

        let content = service.generate_section(&request(RoadmapSection::Risks)).await;
        assert!(content
            .html
            .contains("Error: API error 529: Service temporarily unavailable."));
    }

    #[tokio::test]
    async fn test_other_status_is_not_retried() {
        let (api, seen) = scripted(vec![status(500)]);
        let service = service(api);

        let content = service.generate_section(&request(RoadmapSection::Risks)).await;
        assert!(content.html.contains("Error: API error 500"));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_transport_error_shows_banner() {
        let (api, _) = scripted(vec![Err(ModelError::Transport(
            "connection refused".to_string(),
        ))]);
        let service = service(api);

        let content = service.generate_section(&request(RoadmapSection::Revenue)).await;
        assert!(content.html.contains("Error: connection refused"));
    }

    #[tokio::test]
    async fn test_empty_response_shows_banner() {
        let (api, _) = scripted(vec![text_reply("   ")]);
        let service = service(api);

        let content = service.generate_section(&request(RoadmapSection::Revenue)).await;
        assert!(content.html.contains("Error: Empty response"));
    }

    #[tokio::test]
    async fn test_tool_use_with_enough_text_skips_follow_up() {
        let long_text = "Detailed findings. ".repeat(10);
        let (api, seen) = scripted(vec![tool_use_reply(&long_text, "toolu_1")]);
        let service = service(api);

        let content = service.generate_section(&request(RoadmapSection::Research)).await;
        assert!(content.html.contains("Detailed findings."));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_tool_use_sends_follow_up_with_tool_result() {
        let (api, seen) = scripted(vec![
            tool_use_reply("Searching...", "toolu_42"),
            text_reply("Market is worth ₹500 Cr"),
        ]);
        let service = service(api);

        let content = service.generate_section(&request(RoadmapSection::Research)).await;
        assert!(content.html.contains("Market is worth ₹500 Cr"));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);

        let follow_up = &seen[1];
        assert_eq!(follow_up.messages.len(), 3);
        assert_eq!(follow_up.messages[0], Message::user_text("Analyze this"));
        assert_eq!(follow_up.messages[1].role, MessageRole::Assistant);
        assert_eq!(follow_up.tools, Some(vec![Tool::web_search()]));

        let MessageContent::Blocks(blocks) = &follow_up.messages[2].content else {
            panic!("tool result should be sent as content blocks");
        };
        assert_eq!(
            blocks[0].0,
            json!({
                "type": "tool_result",
                "tool_use_id": "toolu_42",
                "content": "Search completed. Provide detailed analysis."
            })
        );
    }

    #[tokio::test]
    async fn test_follow_up_throttling_restarts_whole_call() {
        let (api, seen) = scripted(vec![
            tool_use_reply("Searching...", "toolu_1"),
            status(529),
            tool_use_reply("Searching again...", "toolu_2"),
            text_reply("Recovered"),
        ]);
        let service = service(api);

        let content = service.generate_section(&request(RoadmapSection::Research)).await;
        assert!(content.html.contains("Recovered"));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[2].messages.len(), 1);
    }

    #[tokio::test]
    async fn test_follow_up_failure_shows_banner() {
        let (api, _) = scripted(vec![
            tool_use_reply("Searching...", "toolu_1"),
            status(400),
        ]);
        let service = service(api);

        let content = service.generate_section(&request(RoadmapSection::Research)).await;
        assert!(content.html.contains("Error: Follow-up error: 400"));
    }

    #[tokio::test]
    async fn test_empty_follow_up_falls_back_to_first_text() {
        let (api, _) = scripted(vec![
            tool_use_reply("Short note", "toolu_1"),
            text_reply(""),
        ]);
        let service = service(api);

        let content = service.generate_section(&request(RoadmapSection::Research)).await;
        assert!(content.html.contains("Short note"));
    }
}
