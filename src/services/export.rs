use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    models::domain::{ResearchMode, Roadmap},
    services::formatter::strip_html,
};

const RULE_WIDTH: usize = 80;

/// A plain-text download of the roadmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoadmapExport {
    pub filename: String,
    pub content: String,
}

pub fn export_filename(unix_millis: i64) -> String {
    format!("roadmap-{}.txt", unix_millis)
}

pub fn render_text_export(
    idea: &str,
    mode: ResearchMode,
    date: NaiveDate,
    roadmap: &Roadmap,
) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut content = format!(
        "BUSINESS ROADMAP\nIdea: {}\nMode: {}\nDate: {}\n\n",
        idea,
        mode,
        date.format("%-d/%-m/%Y")
    );

    for (section, section_content) in roadmap.iter() {
        content.push_str(&format!(
            "\n{rule}\n{}\n{rule}\n",
            section.label().to_uppercase()
        ));
        content.push_str(&strip_html(&section_content.html));
        content.push('\n');
    }

    content
}
