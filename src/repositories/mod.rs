pub mod history_repository;

pub use history_repository::{HistoryRepository, InMemoryHistoryRepository, HISTORY_LIMIT};
