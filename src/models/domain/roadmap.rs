use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::domain::section::RoadmapSection;

/// Rendered HTML for one section.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SectionContent {
    pub html: String,
}

impl SectionContent {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }
}

/// The sections generated so far. Iteration follows generation order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Roadmap {
    sections: BTreeMap<RoadmapSection, SectionContent>,
}

impl Roadmap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, section: RoadmapSection) -> Option<&SectionContent> {
        self.sections.get(&section)
    }

    /// Returns the content previously stored for `section`, if any.
    pub fn insert(
        &mut self,
        section: RoadmapSection,
        content: SectionContent,
    ) -> Option<SectionContent> {
        self.sections.insert(section, content)
    }

    pub fn contains(&self, section: RoadmapSection) -> bool {
        self.sections.contains_key(&section)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RoadmapSection, &SectionContent)> {
        self.sections.iter().map(|(s, c)| (*s, c))
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        RoadmapSection::ALL.iter().all(|s| self.contains(*s))
    }
}
