pub mod anthropic_client;
pub mod export;
pub mod formatter;
pub mod mock_content;
pub mod model_service;
pub mod roadmap_service;
