use crate::models::domain::{Roadmap, RoadmapSection, SectionContent};

#[cfg(test)]
pub mod fixtures {
    use super::*;

    /// A roadmap with every section filled by a short paragraph.
    pub fn sample_roadmap() -> Roadmap {
        let mut roadmap = Roadmap::new();
        for section in RoadmapSection::ALL {
            roadmap.insert(
                section,
                SectionContent::new(format!("<p>{} notes</p>", section.label())),
            );
        }
        roadmap
    }

    /// A roadmap missing everything after the first `count` sections.
    pub fn partial_roadmap(count: usize) -> Roadmap {
        let mut roadmap = Roadmap::new();
        for section in RoadmapSection::ALL.into_iter().take(count) {
            roadmap.insert(section, SectionContent::new("<p>draft</p>"));
        }
        roadmap
    }
}

#[cfg(test)]
pub mod test_helpers {
    use actix_web::http::StatusCode;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }
}
