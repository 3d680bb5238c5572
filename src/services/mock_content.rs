//! Placeholder HTML served in demo mode, plus the error banner shown when a
//! live call fails outside demo mode.

use crate::{
    models::domain::{RoadmapSection, SectionContent},
    services::formatter::escape_html,
};

fn subtitle(section: RoadmapSection, idea: &str) -> String {
    match section {
        RoadmapSection::Research => {
            let idea = if idea.trim().is_empty() { "your idea" } else { idea };
            format!("Mocked market size, growth, and competition for {}", idea)
        }
        RoadmapSection::Executive => "High-level goals and positioning for investors".to_string(),
        RoadmapSection::Revenue => "Illustrative pricing and unit economics in INR".to_string(),
        RoadmapSection::Implementation => {
            "18-month phased plan with team and budget placeholders".to_string()
        }
        RoadmapSection::Scaling => "City-by-city rollout with example timelines".to_string(),
        RoadmapSection::Financial => "Placeholder projections to showcase layout".to_string(),
        RoadmapSection::Risks => "Key risks with mitigation placeholders".to_string(),
    }
}

pub fn mock_section(section: RoadmapSection, idea: &str) -> SectionContent {
    SectionContent::new(format!(
        r#"<h3>{title}</h3>
<p class="my-3 text-gray-700">{subtitle}</p>
<ul class="space-y-2 my-4">
  <li class="ml-6 my-3 pl-2"><span class="font-semibold text-indigo-600">1.</span> Sample bullet showing structure</li>
  <li class="ml-6 my-3 pl-2"><span class="font-semibold text-indigo-600">2.</span> Replace with live data once API key is set</li>
</ul>"#,
        title = section.label(),
        subtitle = escape_html(&subtitle(section, idea)),
    ))
}

pub fn error_banner(message: &str) -> SectionContent {
    SectionContent::new(format!(
        r#"<div class="bg-red-50 border-2 border-red-300 rounded-lg p-4">
  <p class="text-red-800 font-semibold mb-2">Error: {}</p>
  <p class="text-gray-600 text-sm">Please try again, or enable Demo Mode to view placeholder content.</p>
</div>"#,
        escape_html(message)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_section_uses_label() {
        let content = mock_section(RoadmapSection::Scaling, "idea");
        assert!(content.html.contains("<h3>Scaling Strategy</h3>"));
        assert!(content.html.contains("City-by-city rollout"));
        assert!(content.html.contains("Replace with live data once API key is set"));
    }

    #[test]
    fn test_research_mock_mentions_idea() {
        let content = mock_section(RoadmapSection::Research, "Solar dryers for farmers");
        assert!(content
            .html
            .contains("Mocked market size, growth, and competition for Solar dryers for farmers"));

        let blank = mock_section(RoadmapSection::Research, "  ");
        assert!(blank.html.contains("competition for your idea"));
    }

    #[test]
    fn test_every_section_has_a_mock() {
        for section in RoadmapSection::ALL {
            let content = mock_section(section, "x");
            assert!(content.html.contains(section.label()));
        }
    }

    #[test]
    fn test_error_banner_escapes_message() {
        let banner = error_banner("bad <tag>");
        assert!(banner.html.contains("Error: bad &lt;tag&gt;"));
        assert!(banner.html.contains("enable Demo Mode"));
    }
}
