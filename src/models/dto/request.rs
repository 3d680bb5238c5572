use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::models::domain::ResearchMode;

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateRoadmapRequest {
    #[validate(length(min = 1, max = 4000), custom(function = "validate_not_blank"))]
    pub idea: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 2000), custom(function = "validate_not_blank"))]
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateSettingsRequest {
    pub research_mode: Option<ResearchMode>,
    pub mock_mode: Option<bool>,
}
