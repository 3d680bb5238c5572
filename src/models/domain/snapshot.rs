use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::roadmap::Roadmap;

/// A saved copy of the full roadmap and the idea it was generated for.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Snapshot {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub idea: String,
    pub data: Roadmap,
}

impl Snapshot {
    pub fn new(idea: &str, data: &Roadmap) -> Self {
        Snapshot {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            idea: idea.to_string(),
            data: data.clone(),
        }
    }
}
