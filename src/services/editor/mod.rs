//! Opening files in external editors.

pub mod launcher;
pub mod templates;

pub use launcher::{EditorLauncher, LaunchCommand};
pub use templates::{expand_custom_template, Executable};
