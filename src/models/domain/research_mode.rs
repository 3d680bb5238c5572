use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResearchMode {
    /// Plain completions, no tools.
    Fast,
    /// Market research may use the web search tool.
    #[default]
    Deep,
}

impl fmt::Display for ResearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResearchMode::Fast => write!(f, "fast"),
            ResearchMode::Deep => write!(f, "deep"),
        }
    }
}

impl FromStr for ResearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(ResearchMode::Fast),
            "deep" => Ok(ResearchMode::Deep),
            other => Err(format!("Unknown research mode '{}'", other)),
        }
    }
}
