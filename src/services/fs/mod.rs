pub mod common;
pub mod listing;

pub use common::{common_directories, is_valid_directory, parent_directory};
pub use listing::{list_subdirectories, DirectoryEntryDto, ListParams, ListResult};
