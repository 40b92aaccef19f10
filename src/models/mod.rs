pub mod editor_settings;
pub mod history_entry;
pub mod search;

pub use editor_settings::{EditorKind, EditorSettings};
pub use history_entry::HistoryEntry;
pub use search::{SearchMatch, SearchOutcome, SearchRequest, SearchResult};
