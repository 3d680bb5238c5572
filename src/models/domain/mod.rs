pub mod chat;
pub mod research_mode;
pub mod roadmap;
pub mod section;
pub mod snapshot;
pub use chat::{ChatMessage, ChatRole, PendingRevision};
pub use research_mode::ResearchMode;
pub use roadmap::{Roadmap, SectionContent};
pub use section::RoadmapSection;
pub use snapshot::Snapshot;
