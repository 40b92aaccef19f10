pub mod editor;
pub mod fs;
pub mod search;
pub mod store;
