use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the seven fixed business-plan topics, in generation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoadmapSection {
    Research,
    Executive,
    Revenue,
    Implementation,
    Scaling,
    Financial,
    Risks,
}

impl RoadmapSection {
    pub const ALL: [RoadmapSection; 7] = [
        RoadmapSection::Research,
        RoadmapSection::Executive,
        RoadmapSection::Revenue,
        RoadmapSection::Implementation,
        RoadmapSection::Scaling,
        RoadmapSection::Financial,
        RoadmapSection::Risks,
    ];

    pub fn key(self) -> &'static str {
        match self {
            RoadmapSection::Research => "research",
            RoadmapSection::Executive => "executive",
            RoadmapSection::Revenue => "revenue",
            RoadmapSection::Implementation => "implementation",
            RoadmapSection::Scaling => "scaling",
            RoadmapSection::Financial => "financial",
            RoadmapSection::Risks => "risks",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RoadmapSection::Research => "Market Research",
            RoadmapSection::Executive => "Executive Summary",
            RoadmapSection::Revenue => "Revenue Model",
            RoadmapSection::Implementation => "Implementation",
            RoadmapSection::Scaling => "Scaling Strategy",
            RoadmapSection::Financial => "Financials",
            RoadmapSection::Risks => "Risk Assessment",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }

    /// Only market research is allowed to reach for live web search.
    pub fn uses_web_search(self) -> bool {
        matches!(self, RoadmapSection::Research)
    }

    /// Picks the section a chat request is about: the first section (in
    /// generation order) whose key appears in the message, else the executive summary.
    pub fn target_for_message(message: &str) -> Self {
        let lower = message.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|s| lower.contains(s.key()))
            .unwrap_or(RoadmapSection::Executive)
    }
}

impl fmt::Display for RoadmapSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
