use std::sync::Arc;

use crate::{
    config::Config,
    errors::AppResult,
    repositories::InMemoryHistoryRepository,
    services::{
        anthropic_client::{AnthropicClient, MessagesApi},
        model_service::ModelService,
        roadmap_service::RoadmapService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub roadmap_service: Arc<RoadmapService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> AppResult<Self> {
        let api = Arc::new(AnthropicClient::new(&config)?);
        Ok(Self::with_api(config, api))
    }

    /// Builds the state around any Messages API transport.
    pub fn with_api(config: Config, api: Arc<dyn MessagesApi>) -> Self {
        let model_service = Arc::new(ModelService::new(api, &config));
        let history = Arc::new(InMemoryHistoryRepository::new());
        let roadmap_service = Arc::new(RoadmapService::new(model_service, history, &config));

        Self {
            roadmap_service,
            config: Arc::new(config),
        }
    }
}
